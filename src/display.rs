use crate::model::Roster;

pub fn display_classes(classes: &[String]) {
    if classes.is_empty() {
        println!("No class available yet.");
        return;
    }
    println!("Available classes:");
    for (n, class) in classes.iter().enumerate() {
        println!("  {}. {}", n + 1, class);
    }
}

pub fn display_roster(class: &str, roster: &Roster) {
    println!("Current roster: {class}");
    for line in roster_lines(roster) {
        println!("  - {line}");
    }
}

/// One line per student, case-insensitively sorted by name.
fn roster_lines(roster: &Roster) -> Vec<String> {
    let mut students = roster.iter().collect::<Vec<_>>();
    students.sort_by_key(|s| s.name.to_lowercase());
    students.into_iter().map(ToString::to_string).collect()
}

pub fn display_last_absent(roster: &Roster) {
    println!("Students absent last time:");
    println!("  {}", absentees(roster));
}

/// Names of absent students, case-insensitively sorted and separated by `;`.
fn absentees(roster: &Roster) -> String {
    let mut names = roster
        .absent_students()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>();
    names.sort_by_key(|name| name.to_lowercase());
    names.join("; ")
}

#[test]
fn test_absentees() {
    let mut roster = Roster::new();
    roster.add_students(["cain", "Beelzebub", "Abraham", "abel"]);
    assert_eq!(absentees(&roster), "");
    roster
        .take_attendance(&["cain", "Beelzebub", "abel"])
        .unwrap();
    assert_eq!(absentees(&roster), "abel; Beelzebub; cain");
}

#[test]
fn test_roster_lines() {
    let mut roster = Roster::new();
    roster.add_students(["Zed", "abel", "Beelzebub"]);
    roster.take_attendance(&["Zed"]).unwrap();
    assert_eq!(
        roster_lines(&roster),
        vec![
            "abel: chosen 0 times",
            "Beelzebub: chosen 0 times",
            "Zed: chosen 0 times (absent)",
        ]
    );
}
