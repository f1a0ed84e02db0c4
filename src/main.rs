use crate::config::Config;
use crate::error::Error;
use crate::model::Roster;
use crate::storage::Store;
use crate::weights::WeightModel;
use clap::{ArgAction, Parser, Subcommand};
use eyre::{Result, bail, ensure};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{Level, debug, info, warn};

mod config;
mod display;
mod error;
mod model;
mod sampler;
mod selection;
mod storage;
mod weights;

#[derive(Debug, Parser)]
#[command(
    name = "studentchooser",
    version,
    about = "Pick students at random, favoring those who have been picked the least"
)]
struct Args {
    /// Use FILE instead of studentchooser.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Set verbosity level
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List known classes
    List,
    /// Create a new class
    New {
        class: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show the roster of a class
    Show { class: String },
    /// Add students to a class
    Add {
        class: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Record absent students, everyone else being present
    Absent { class: String, names: Vec<String> },
    /// Pick a student
    Pick {
        class: String,
        /// Accept the first proposal without asking
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Ask a yes/no question on the terminal until a recognizable answer is given.
fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    let mut answer = String::new();
    loop {
        println!("{question}");
        print!("> ");
        io::stdout().flush()?;
        answer.clear();
        if stdin.lock().read_line(&mut answer)? == 0 {
            bail!("no answer given");
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Sorry, I didn't get that. Try again."),
        }
    }
}

/// Rescale a roster which is about to be saved. A class where everyone is
/// absent is fine, it only cannot be picked from.
fn rescale_roster(model: &WeightModel, roster: &mut Roster) -> Result<()> {
    match model.rescale(roster) {
        Err(Error::EmptyPopulation) => {
            warn!("everyone is absent, nobody can be picked");
            Ok(())
        }
        other => Ok(other?),
    }
}

fn add_students(roster: &mut Roster, names: &[String]) {
    let (storable, unstorable): (Vec<&String>, Vec<&String>) =
        names.iter().partition(|name| storage::is_storable(name));
    for name in unstorable {
        warn!("ignoring student name {name:?} which cannot be stored");
    }
    for name in roster.add_students(storable) {
        warn!("{name} is already in the roster");
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose);
    let config = Config::load_or_default(args.config.as_deref())?;
    let model = config.weight_model()?;
    debug!(data_dir = %config.data_dir.display(), decay = model.decay(), "configuration loaded");
    let store = Store::new(&config);
    match args.command {
        Command::List => display::display_classes(&store.classes()?),
        Command::New { class, names } => {
            let mut roster = Roster::new();
            add_students(&mut roster, &names);
            ensure!(!roster.is_empty(), "class {class} needs at least one student");
            model.rescale(&mut roster)?;
            store.create(&class, &roster)?;
            info!(class = %class, students = roster.len(), "class created");
            display::display_roster(&class, &roster);
        }
        Command::Show { class } => {
            let roster = store.load(&class)?;
            display::display_roster(&class, &roster);
        }
        Command::Add { class, names } => {
            let mut roster = store.load(&class)?;
            add_students(&mut roster, &names);
            rescale_roster(&model, &mut roster)?;
            store.save(&class, &roster)?;
            display::display_roster(&class, &roster);
        }
        Command::Absent { class, names } => {
            let mut roster = store.load(&class)?;
            display::display_last_absent(&roster);
            roster.take_attendance(names.as_slice())?;
            rescale_roster(&model, &mut roster)?;
            store.save(&class, &roster)?;
            display::display_roster(&class, &roster);
        }
        Command::Pick { class, yes } => {
            let mut roster = store.load(&class)?;
            model.rescale(&mut roster)?;
            let mut rng = rand::rng();
            let chosen = selection::choose(&mut roster, &model, &mut rng, |name| -> Result<bool> {
                if yes {
                    return Ok(true);
                }
                let accepted = confirm(&format!("{name} was selected. OK? y/n"))?;
                if !accepted {
                    println!("OK, choosing again.");
                }
                Ok(accepted)
            })?;
            store.save(&class, &roster)?;
            match roster.get(&chosen) {
                Some(student) => println!("Selected: {student}"),
                None => println!("Selected: {chosen}"),
            }
        }
    }
    Ok(())
}
