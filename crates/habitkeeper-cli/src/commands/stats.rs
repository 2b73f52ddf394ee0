//! Streak statistics commands for CLI.

use clap::Subcommand;
use habitkeeper_core::{analytics, auth, Database};

use crate::common::{parse_frequency, resolve_habit};

#[derive(Subcommand)]
pub enum StatsAction {
    /// All habits with creation and completion metadata
    Overview {
        /// Filter by frequency (daily or weekly)
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Current streaks, for all habits or one
    Current {
        /// Restrict to one habit
        #[arg(long)]
        habit: Option<String>,
        /// Disambiguate when the name exists as both Daily and Weekly
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Longest recorded runs, for all habits or one
    Longest {
        /// Restrict to one habit
        #[arg(long)]
        habit: Option<String>,
        /// Disambiguate when the name exists as both Daily and Weekly
        #[arg(long)]
        frequency: Option<String>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let session = auth::require_session(&db)?;

    match action {
        StatsAction::Overview { frequency } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            let habits = analytics::overview(&db, &session.username, frequency)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        StatsAction::Current { habit, frequency } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            match habit {
                Some(name) => {
                    let habit = resolve_habit(&db, &session.username, &name, frequency)?;
                    let row = analytics::current_streak_of(
                        &db,
                        &session.username,
                        &habit.name,
                        habit.frequency,
                    )?;
                    println!("{}", serde_json::to_string_pretty(&row)?);
                }
                None => {
                    let summary = analytics::current_streak_summary(&db, &session.username)?;
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }
        }
        StatsAction::Longest { habit, frequency } => {
            let frequency = frequency.as_deref().map(parse_frequency).transpose()?;
            match habit {
                Some(name) => {
                    let habit = resolve_habit(&db, &session.username, &name, frequency)?;
                    let row = analytics::longest_streak_of(
                        &db,
                        &session.username,
                        &habit.name,
                        habit.frequency,
                    )?;
                    println!("{}", serde_json::to_string_pretty(&row)?);
                }
                None => {
                    let summary = analytics::longest_streak_summary(&db, &session.username)?;
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }
        }
    }
    Ok(())
}
