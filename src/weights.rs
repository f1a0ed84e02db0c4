use crate::error::Error;
use crate::model::{BASE_WEIGHT, Roster};
use tracing::{debug, instrument};

/// Factor applied to a student's weight every time they get picked.
pub const DEFAULT_DECAY: f64 = 0.75;

/// Sum of the weights of present students after rescaling.
pub const TOTAL_WEIGHT: f64 = 100.0;

/// Turns pick counts into selection weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightModel {
    decay: f64,
}

impl Default for WeightModel {
    fn default() -> Self {
        WeightModel {
            decay: DEFAULT_DECAY,
        }
    }
}

impl WeightModel {
    pub fn new(decay: f64) -> Result<WeightModel, Error> {
        if decay > 0.0 && decay < 1.0 {
            Ok(WeightModel { decay })
        } else {
            Err(Error::InvalidInput(format!(
                "decay must lie strictly between 0 and 1, got {decay}"
            )))
        }
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Weight of a student picked `times_picked` times, before normalization.
    pub fn raw_weight(&self, times_picked: u32) -> f64 {
        BASE_WEIGHT * self.decay.powf(f64::from(times_picked))
    }

    /// Recompute every student's weight, then normalize the weights of present
    /// students so that they sum to [`TOTAL_WEIGHT`]. Absent students keep
    /// their raw weight.
    #[instrument(skip_all)]
    pub fn rescale(&self, roster: &mut Roster) -> Result<(), Error> {
        for student in roster.iter_mut() {
            student.set_weight(self.raw_weight(student.times_picked));
        }
        let Some(least_picked) = roster.present_students().map(|s| s.times_picked).min() else {
            debug!(students = roster.len(), "nobody is present, weights not normalized");
            return Err(Error::EmptyPopulation);
        };
        // Shares are computed relative to the least picked present student so
        // that the total stays above 1 even when raw weights underflow.
        let relative = |times_picked: u32| self.decay.powf(f64::from(times_picked - least_picked));
        let total: f64 = roster
            .present_students()
            .map(|s| relative(s.times_picked))
            .sum();
        for student in roster.iter_mut().filter(|s| s.present) {
            student.set_weight(relative(student.times_picked) * TOTAL_WEIGHT / total);
        }
        debug!(
            students = roster.len(),
            present = roster.present_students().count(),
            "roster rescaled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Student;

    const EPSILON: f64 = 1e-9;

    fn roster(students: &[(&str, u32, bool)]) -> Roster {
        Roster::from_students(
            students
                .iter()
                .map(|&(name, times, present)| Student::restore(name.into(), 0.0, times, present)),
        )
        .unwrap()
    }

    fn present_sum(roster: &Roster) -> f64 {
        roster.present_students().map(Student::weight).sum()
    }

    #[test]
    fn decay_must_be_a_fraction() {
        assert!(WeightModel::new(0.5).is_ok());
        for decay in [0.0, 1.0, -0.25, 1.5, f64::NAN] {
            assert!(matches!(
                WeightModel::new(decay),
                Err(Error::InvalidInput(_))
            ));
        }
        assert_eq!(WeightModel::default().decay(), DEFAULT_DECAY);
    }

    #[test]
    fn present_weights_sum_to_total() {
        let model = WeightModel::default();
        let mut r = roster(&[
            ("A", 0, true),
            ("B", 1, true),
            ("C", 7, false),
            ("D", 3, true),
            ("E", 12, true),
        ]);
        model.rescale(&mut r).unwrap();
        assert!((present_sum(&r) - TOTAL_WEIGHT).abs() < EPSILON);
    }

    #[test]
    fn weight_decreases_with_picks() {
        let model = WeightModel::default();
        let mut previous = f64::INFINITY;
        for times in 0..30 {
            let raw = model.raw_weight(times);
            assert!(raw < previous);
            previous = raw;
        }
        let mut r = roster(&[("A", 0, true), ("B", 0, true), ("C", 0, true)]);
        let mut previous = f64::INFINITY;
        for _ in 0..10 {
            model.rescale(&mut r).unwrap();
            let weight = r.get("A").unwrap().weight();
            assert!(weight < previous);
            previous = weight;
            r.record_pick("A").unwrap();
        }
    }

    #[test]
    fn rescale_is_idempotent() {
        let model = WeightModel::default();
        let mut r = roster(&[("A", 2, true), ("B", 0, false), ("C", 5, true)]);
        model.rescale(&mut r).unwrap();
        let first = r.iter().map(Student::weight).collect::<Vec<_>>();
        model.rescale(&mut r).unwrap();
        let second = r.iter().map(Student::weight).collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn single_student_decay() {
        let model = WeightModel::default();
        assert!((model.raw_weight(3) - 42.1875).abs() < EPSILON);
        let mut r = roster(&[("A", 3, true)]);
        model.rescale(&mut r).unwrap();
        assert!((r.get("A").unwrap().weight() - 100.0).abs() < EPSILON);
    }

    #[test]
    fn absent_students_keep_raw_weight() {
        let model = WeightModel::default();
        let mut r = roster(&[("A", 0, true), ("B", 1, true), ("C", 0, true)]);
        r.take_attendance(&["B"]).unwrap();
        model.rescale(&mut r).unwrap();
        assert!((r.get("A").unwrap().weight() - 50.0).abs() < EPSILON);
        assert!((r.get("C").unwrap().weight() - 50.0).abs() < EPSILON);
        assert!((r.get("B").unwrap().weight() - 75.0).abs() < EPSILON);
    }

    #[test]
    fn nobody_present_is_an_error() {
        let model = WeightModel::default();
        let mut r = roster(&[("A", 0, false), ("B", 2, false)]);
        assert_eq!(model.rescale(&mut r), Err(Error::EmptyPopulation));
        assert!(r.iter().all(|s| s.weight().is_finite()));
        assert!((r.get("B").unwrap().weight() - 56.25).abs() < EPSILON);
        assert_eq!(model.rescale(&mut Roster::new()), Err(Error::EmptyPopulation));
    }

    #[test]
    fn many_picks_do_not_underflow() {
        let model = WeightModel::default();
        let mut r = roster(&[("A", 5000, true), ("B", 5001, true)]);
        model.rescale(&mut r).unwrap();
        assert!((present_sum(&r) - TOTAL_WEIGHT).abs() < EPSILON);
        assert!(r.get("A").unwrap().weight() > r.get("B").unwrap().weight());
    }
}
