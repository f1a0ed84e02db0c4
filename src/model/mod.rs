pub use self::roster::Roster;
pub use self::student::{BASE_WEIGHT, Student};

mod roster;
mod student;
