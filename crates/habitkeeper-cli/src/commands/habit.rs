//! Habit management commands for CLI.

use clap::Subcommand;
use habitkeeper_core::auth;
use habitkeeper_core::clock::SystemClock;
use habitkeeper_core::storage::Config;
use habitkeeper_core::{CheckOffOutcome, Database, Frequency, HabitTracker};

use crate::common::{parse_category, parse_frequency, resolve_habit};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Habit category
        #[arg(long)]
        category: String,
        /// Habit frequency: daily or weekly
        #[arg(long)]
        frequency: String,
    },
    /// Adopt a habit from the predefined catalog
    Adopt {
        /// Catalog habit name
        name: String,
    },
    /// List habits
    List {
        /// Filter by frequency (daily or weekly)
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Mark a habit as completed
    Complete {
        /// Habit name
        name: String,
        /// Disambiguate when the name exists as both Daily and Weekly
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Change a habit's category
    SetCategory {
        /// Habit name
        name: String,
        /// New category
        category: String,
        /// Disambiguate when the name exists as both Daily and Weekly
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Change a habit's frequency
    SetFrequency {
        /// Habit name
        name: String,
        /// New frequency: daily or weekly
        frequency: String,
        /// Disambiguate by the current frequency
        #[arg(long)]
        current: Option<String>,
    },
    /// Delete a habit and its streak history
    Delete {
        /// Habit name
        name: String,
        /// Disambiguate when the name exists as both Daily and Weekly
        #[arg(long)]
        frequency: Option<String>,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let session = auth::require_session(&db)?;
    let clock = SystemClock;
    let tracker = HabitTracker::new(&db, &clock);

    match action {
        HabitAction::Create {
            name,
            category,
            frequency,
        } => {
            let habit = tracker.create_habit(
                &session.username,
                &name,
                parse_category(&category)?,
                parse_frequency(&frequency)?,
            )?;
            println!("Success! A new habit '{}' was added.", habit.name);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Adopt { name } => {
            let config = Config::load_or_default();
            if !config.catalog.enabled {
                return Err("the predefined catalog is disabled (catalog.enabled)".into());
            }
            let habit = tracker.adopt_predefined(&session.username, &name)?;
            println!("'{}' was added to your habits.", habit.name);
        }
        HabitAction::List { frequency } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            let habits = db.list_habits(&session.username, frequency)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Complete { name, frequency } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            let habit = resolve_habit(&db, &session.username, &name, frequency)?;
            let report = tracker.check_off(&session.username, &habit.name, habit.frequency)?;
            match report.outcome {
                CheckOffOutcome::FirstCompletion => {
                    println!("Hooray! You completed '{}'. Streak started at 1.", report.name);
                }
                CheckOffOutcome::Advanced => {
                    println!(
                        "Hooray! You completed '{}'. Streak is now {}.",
                        report.name, report.streak_count
                    );
                }
                CheckOffOutcome::Rejected => match report.frequency {
                    Frequency::Daily => println!(
                        "Less than a day since the last check-off of '{}'. \
                         Only 1 streak credit is counted per day.",
                        report.name
                    ),
                    Frequency::Weekly => println!(
                        "Less than 7 days since the last check-off of '{}'. \
                         Only 1 streak credit is counted per 7 days.",
                        report.name
                    ),
                },
                CheckOffOutcome::Restarted => {
                    println!(
                        "The previous streak of '{}' had lapsed; a new streak starts at 1.",
                        report.name
                    );
                }
            }
        }
        HabitAction::SetCategory {
            name,
            category,
            frequency,
        } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            let habit = resolve_habit(&db, &session.username, &name, frequency)?;
            let category = parse_category(&category)?;
            tracker.change_category(&habit, category)?;
            println!("The category of '{}' has been updated to '{category}'.", habit.name);
        }
        HabitAction::SetFrequency {
            name,
            frequency,
            current,
        } => {
            let current = current.as_deref().map(parse_frequency).transpose()?;
            let habit = resolve_habit(&db, &session.username, &name, current)?;
            let frequency = parse_frequency(&frequency)?;
            tracker.change_frequency(&habit, frequency)?;
            println!("The frequency of '{}' has been updated to '{frequency}'.", habit.name);
        }
        HabitAction::Delete { name, frequency } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            let habit = resolve_habit(&db, &session.username, &name, frequency)?;
            tracker.delete_habit(&habit)?;
            println!("Habit '{}' has been deleted.", habit.name);
        }
    }
    Ok(())
}
