use crate::config::Config;
use crate::model::{Roster, Student};
use eyre::{Result, WrapErr, bail, ensure};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

const DELIMITER: u8 = b';';

/// One line of a roster file: `name; weight; times_picked; absent`.
#[derive(Debug, Deserialize)]
struct StudentRecord {
    name: String,
    weight: f64,
    times_picked: u32,
    absent: u8,
}

impl StudentRecord {
    fn into_student(self) -> Result<Student> {
        ensure!(!self.name.is_empty(), "empty student name");
        ensure!(
            self.weight.is_finite() && self.weight >= 0.0,
            "invalid weight {} for {}",
            self.weight,
            self.name
        );
        let present = match self.absent {
            0 => true,
            1 => false,
            other => bail!("invalid absence flag {} for {}", other, self.name),
        };
        Ok(Student::restore(
            self.name,
            self.weight,
            self.times_picked,
            present,
        ))
    }
}

pub fn read_roster<R: Read>(reader: R) -> Result<Roster> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(DELIMITER)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let students = reader
        .deserialize::<StudentRecord>()
        .enumerate()
        .map(|(n, record)| {
            record
                .map_err(eyre::Report::from)
                .and_then(StudentRecord::into_student)
                .wrap_err_with(|| format!("malformed roster entry {}", n + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Roster::from_students(students)?)
}

/// Check that a name can be stored in a roster or index file.
pub fn is_storable(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains([';', '"', '\n', '\r'])
}

pub fn write_roster<W: Write>(roster: &Roster, mut writer: W) -> Result<()> {
    for student in roster.iter() {
        ensure!(
            is_storable(&student.name),
            "student name {:?} cannot be stored",
            student.name
        );
        writeln!(
            writer,
            "{}; {:.6}; {}; {}",
            student.name,
            student.weight(),
            student.times_picked,
            u8::from(!student.present)
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Roster files of every class, along with the index listing them.
#[derive(Debug)]
pub struct Store {
    data_dir: PathBuf,
    index_file: PathBuf,
}

impl Store {
    pub fn new(config: &Config) -> Store {
        Store {
            data_dir: config.data_dir.clone(),
            index_file: config.index_path(),
        }
    }

    /// Names of all the known classes, sorted case-insensitively.
    pub fn classes(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.index_file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(index = %self.index_file.display(), "no index file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| {
                    format!("cannot read index file {}", self.index_file.display())
                });
            }
        };
        let mut classes = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        sort_classes(&mut classes);
        Ok(classes)
    }

    #[instrument(skip(self))]
    pub fn load(&self, class: &str) -> Result<Roster> {
        ensure!(
            self.classes()?.iter().any(|c| c == class),
            "unknown class {class}"
        );
        let path = self.roster_path(class)?;
        let file = fs::File::open(&path)
            .wrap_err_with(|| format!("cannot open roster file {}", path.display()))?;
        let roster = read_roster(file)
            .wrap_err_with(|| format!("cannot load roster file {}", path.display()))?;
        debug!(students = roster.len(), "roster loaded");
        Ok(roster)
    }

    /// Save a brand new class and register it in the index.
    #[instrument(skip(self, roster))]
    pub fn create(&self, class: &str, roster: &Roster) -> Result<()> {
        let mut classes = self.classes()?;
        ensure!(
            !classes.iter().any(|c| c == class),
            "class {class} already exists"
        );
        self.write_roster_file(class, roster, true)?;
        classes.push(class.to_owned());
        sort_classes(&mut classes);
        let mut content = classes.join("\n");
        content.push('\n');
        fs::write(&self.index_file, content)
            .wrap_err_with(|| format!("cannot write index file {}", self.index_file.display()))?;
        info!(classes = classes.len(), "class registered");
        Ok(())
    }

    #[instrument(skip(self, roster))]
    pub fn save(&self, class: &str, roster: &Roster) -> Result<()> {
        self.write_roster_file(class, roster, false)
    }

    /// Write the roster file of a class. With `new_file`, an existing file of
    /// the same name is never replaced.
    fn write_roster_file(&self, class: &str, roster: &Roster, new_file: bool) -> Result<()> {
        let path = self.roster_path(class)?;
        let mut content = Vec::new();
        write_roster(roster, &mut content)?;
        fs::create_dir_all(&self.data_dir)
            .wrap_err_with(|| format!("cannot create directory {}", self.data_dir.display()))?;
        let mut file = if new_file {
            fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .wrap_err_with(|| format!("cannot create roster file {}", path.display()))?
        } else {
            fs::File::create(&path)
                .wrap_err_with(|| format!("cannot write roster file {}", path.display()))?
        };
        file.write_all(&content)
            .wrap_err_with(|| format!("cannot write roster file {}", path.display()))?;
        debug!(path = %path.display(), students = roster.len(), "roster saved");
        Ok(())
    }

    fn roster_path(&self, class: &str) -> Result<PathBuf> {
        ensure!(
            is_storable(class)
                && class.trim() == class
                && !class.contains(['/', '\\'])
                && class != "."
                && class != ".."
                && self.data_dir.join(class) != self.index_file,
            "invalid class name {class:?}"
        );
        Ok(self.data_dir.join(class))
    }
}

fn sort_classes(classes: &mut [String]) {
    classes.sort_by_key(|c| c.to_lowercase());
}
