use crate::error::Error;
use crate::model::{Roster, Student};
use crate::weights::TOTAL_WEIGHT;
use rand::Rng;
use tracing::{debug, trace};

/// Map a uniform draw in `[0, 1)` onto one present student.
///
/// Present students are laid out in roster order, each one owning the
/// half-open interval `[start, start + weight)` of `[0, 100)`. A draw falling
/// exactly on a shared boundary belongs to the later student. When rounding
/// leaves the draw past the end of the last interval, the last present student
/// is chosen.
pub fn pick_one(roster: &Roster, random_unit: f64) -> Result<&Student, Error> {
    if !(0.0..1.0).contains(&random_unit) {
        return Err(Error::InvalidInput(format!(
            "random draw must lie in [0, 1), got {random_unit}"
        )));
    }
    let value = random_unit * TOTAL_WEIGHT;
    let mut start = 0.0;
    let mut last = None;
    for student in roster.present_students() {
        let end = start + student.weight();
        trace!(student = %student.name, start, end, value, "checking interval");
        if value < end {
            return Ok(student);
        }
        start = end;
        last = Some(student);
    }
    if last.is_some() {
        debug!(value, end = start, "draw past the last interval, using last student");
    }
    last.ok_or(Error::EmptyPopulation)
}

/// Draw a uniform number from `rng` and pick the corresponding student.
pub fn pick_with<'a, R: Rng + ?Sized>(roster: &'a Roster, rng: &mut R) -> Result<&'a Student, Error> {
    pick_one(roster, rng.random::<f64>())
}
