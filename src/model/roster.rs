use super::Student;
use crate::error::Error;
use std::collections::BTreeMap;

/// Students of a class, keyed and ordered by name.
///
/// Iteration always follows the byte-wise order of names. The sampler relies
/// on this order to lay out its cumulative intervals.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    students: BTreeMap<String, Student>,
}

impl Roster {
    pub fn new() -> Roster {
        Roster::default()
    }

    /// Build a roster from existing students. Names must be unique.
    pub fn from_students<I>(students: I) -> Result<Roster, Error>
    where
        I: IntoIterator<Item = Student>,
    {
        let mut roster = Roster::new();
        for student in students {
            if roster.students.contains_key(&student.name) {
                return Err(Error::DuplicateStudent(student.name));
            }
            roster.students.insert(student.name.clone(), student);
        }
        Ok(roster)
    }

    /// Add fresh students to the roster. Blank names are ignored, and names
    /// already in the roster are left alone and returned.
    pub fn add_students<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rejected = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if self.students.contains_key(name) {
                rejected.push(name.to_owned());
            } else {
                self.students.insert(name.to_owned(), Student::new(name));
            }
        }
        rejected
    }

    /// Mark every student as present except the given ones. Nothing changes
    /// if one of the names is unknown.
    pub fn take_attendance<S: AsRef<str>>(&mut self, absent: &[S]) -> Result<(), Error> {
        if let Some(unknown) = absent
            .iter()
            .map(|name| name.as_ref().trim())
            .find(|name| !self.students.contains_key(*name))
        {
            return Err(Error::UnknownStudent(unknown.to_owned()));
        }
        for student in self.students.values_mut() {
            student.present = true;
        }
        for name in absent {
            if let Some(student) = self.students.get_mut(name.as_ref().trim()) {
                student.present = false;
            }
        }
        Ok(())
    }

    /// Count one more pick for a student and return the new total.
    pub fn record_pick(&mut self, name: &str) -> Result<u32, Error> {
        let student = self
            .students
            .get_mut(name)
            .ok_or_else(|| Error::UnknownStudent(name.to_owned()))?;
        student.times_picked = student.times_picked.checked_add(1).ok_or_else(|| {
            Error::InvalidInput(format!("{name} cannot be picked more than {} times", u32::MAX))
        })?;
        Ok(student.times_picked)
    }

    pub fn get(&self, name: &str) -> Option<&Student> {
        self.students.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Student> {
        self.students.values_mut()
    }

    pub fn present_students(&self) -> impl Iterator<Item = &Student> {
        self.iter().filter(|s| s.present)
    }

    pub fn absent_students(&self) -> impl Iterator<Item = &Student> {
        self.iter().filter(|s| !s.present)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
