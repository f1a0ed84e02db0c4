use std::fmt;

/// Weight of a student who has never been picked.
pub const BASE_WEIGHT: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Student {
    pub name: String,
    weight: f64,
    pub times_picked: u32,
    pub present: bool,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Student {
        Student {
            name: name.into(),
            weight: BASE_WEIGHT,
            times_picked: 0,
            present: true,
        }
    }

    /// Rebuild a student from a persisted record, keeping the weight computed
    /// during the last rescaling.
    pub fn restore(name: String, weight: f64, times_picked: u32, present: bool) -> Student {
        Student {
            name,
            weight,
            times_picked,
            present,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: chosen {} times", self.name, self.times_picked)?;
        if !self.present {
            write!(f, " (absent)")?;
        }
        Ok(())
    }
}

#[test]
fn test_new_student() {
    let s = Student::new("Abraham");
    assert_eq!(s.weight(), BASE_WEIGHT);
    assert_eq!(s.times_picked, 0);
    assert!(s.present);
}

#[test]
fn test_display() {
    let mut s = Student::restore("Cain".into(), 42.0, 3, true);
    assert_eq!(s.to_string(), "Cain: chosen 3 times");
    s.present = false;
    assert_eq!(s.to_string(), "Cain: chosen 3 times (absent)");
}
