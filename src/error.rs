use std::fmt;

/// Errors raised by the roster model and the selection engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// No student is present, so nobody can be weighted or picked.
    EmptyPopulation,
    /// A value outside of its allowed range, such as a random draw not in `[0, 1)`.
    InvalidInput(String),
    /// A name which does not belong to the roster.
    UnknownStudent(String),
    /// A name which is already part of the roster.
    DuplicateStudent(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "no student is present"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::UnknownStudent(name) => write!(f, "unknown student: {name}"),
            Self::DuplicateStudent(name) => write!(f, "student {name} is already in the roster"),
        }
    }
}

impl std::error::Error for Error {}
