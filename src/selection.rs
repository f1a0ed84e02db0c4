use crate::error::Error;
use crate::model::Roster;
use crate::sampler;
use crate::weights::WeightModel;
use rand::Rng;
use tracing::{debug, info};

/// A student suggested by the sampler, not yet confirmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    name: String,
}

impl Proposal {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Suggest a student. The roster is left untouched.
pub fn propose<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Result<Proposal, Error> {
    let student = sampler::pick_with(roster, rng)?;
    debug!(student = %student.name, weight = student.weight(), "student proposed");
    Ok(Proposal {
        name: student.name.clone(),
    })
}

/// Count the pick of a confirmed proposal and rescale the roster. Returns the
/// number of times the student has now been picked.
pub fn commit(roster: &mut Roster, model: &WeightModel, proposal: Proposal) -> Result<u32, Error> {
    let times_picked = roster.record_pick(&proposal.name)?;
    model.rescale(roster)?;
    info!(student = %proposal.name, times_picked, "selection committed");
    Ok(times_picked)
}

/// Propose students until `confirm` accepts one, then commit it and return its
/// name. Rejected proposals leave the roster untouched, and there is no limit
/// on the number of rejections.
pub fn choose<R, F, E>(
    roster: &mut Roster,
    model: &WeightModel,
    rng: &mut R,
    mut confirm: F,
) -> Result<String, E>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> Result<bool, E>,
    E: From<Error>,
{
    loop {
        let proposal = propose(roster, rng)?;
        if confirm(proposal.name())? {
            let name = proposal.name.clone();
            commit(roster, model, proposal)?;
            return Ok(name);
        }
        debug!(student = %proposal.name, "proposal rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Student;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn class() -> Roster {
        let mut roster = Roster::new();
        roster.add_students(["Abraham", "Beelzebub", "Cain"]);
        WeightModel::default().rescale(&mut roster).unwrap();
        roster
    }

    fn snapshot(roster: &Roster) -> Vec<Student> {
        roster.iter().cloned().collect()
    }

    #[test]
    fn propose_does_not_mutate() {
        let roster = class();
        let before = snapshot(&roster);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let proposal = propose(&roster, &mut rng).unwrap();
            assert!(roster.get(proposal.name()).is_some());
        }
        assert_eq!(snapshot(&roster), before);
    }

    #[test]
    fn commit_counts_one_pick_and_rescales() {
        let model = WeightModel::default();
        let mut roster = class();
        let proposal = Proposal {
            name: "Cain".into(),
        };
        assert_eq!(commit(&mut roster, &model, proposal), Ok(1));
        let cain = roster.get("Cain").unwrap();
        assert_eq!(cain.times_picked, 1);
        assert!(cain.weight() < roster.get("Abraham").unwrap().weight());
        let sum: f64 = roster.present_students().map(Student::weight).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rejections_leave_state_alone() {
        let model = WeightModel::default();
        let mut roster = class();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = Vec::new();
        let chosen = choose::<_, _, Error>(&mut roster, &model, &mut rng, |name| {
            seen.push(name.to_owned());
            Ok(seen.len() == 5)
        })
        .unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen.last(), Some(&chosen));
        let total: u32 = roster.iter().map(|s| s.times_picked).sum();
        assert_eq!(total, 1);
        assert_eq!(roster.get(&chosen).unwrap().times_picked, 1);

        // A confirmation failure aborts before anything is committed.
        let snapshot_before = snapshot(&roster);
        let err = choose(&mut roster, &model, &mut rng, |_| Err(Error::InvalidInput("eof".into())))
            .unwrap_err();
        assert_eq!(err, Error::InvalidInput("eof".into()));
        assert_eq!(snapshot(&roster), snapshot_before);
    }

    #[test]
    fn choose_with_nobody_present() {
        let model = WeightModel::default();
        let mut roster = class();
        roster
            .take_attendance(&["Abraham", "Beelzebub", "Cain"])
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = choose::<_, _, Error>(&mut roster, &model, &mut rng, |_| Ok(true)).unwrap_err();
        assert_eq!(err, Error::EmptyPopulation);
    }

    #[test]
    fn only_present_students_are_chosen() {
        let model = WeightModel::default();
        let mut roster = class();
        roster.take_attendance(&["Beelzebub"]).unwrap();
        model.rescale(&mut roster).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let chosen = choose::<_, _, Error>(&mut roster, &model, &mut rng, |_| Ok(true)).unwrap();
            assert_ne!(chosen, "Beelzebub");
        }
        assert_eq!(roster.get("Beelzebub").unwrap().times_picked, 0);
        let picks = roster.iter().map(|s| s.times_picked).collect::<Vec<_>>();
        assert_eq!(picks.iter().sum::<u32>(), 50);
        // The weighting keeps both present students close to each other.
        assert!(picks[0].abs_diff(picks[2]) <= 10, "uneven picks: {picks:?}");
    }
}
