//! Streak analytics over stored habits.
//!
//! Read-only queries behind the CLI's overview and performance views: habit
//! listings, current streak summaries, and longest-run summaries computed
//! from the run history. The core returns plain data; rendering is the
//! presentation layer's job.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::habit::{Category, Frequency, Habit};
use crate::storage::Database;

/// One row of the current streak summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStreak {
    pub name: String,
    pub category: Category,
    pub frequency: Frequency,
    pub streak_count: u32,
    pub last_completion_at: Option<chrono::NaiveDateTime>,
}

/// One row of the longest-run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongestStreak {
    pub name: String,
    pub category: Category,
    pub frequency: Frequency,
    /// Longest run recorded for the habit, open or closed. Zero means the
    /// habit has never been completed.
    pub longest_length: u32,
}

/// A user's habits, optionally restricted to one frequency.
pub fn overview(
    db: &Database,
    owner: &str,
    frequency: Option<Frequency>,
) -> Result<Vec<Habit>, CoreError> {
    Ok(db.list_habits(owner, frequency)?)
}

/// Current streak of every habit the user owns.
pub fn current_streak_summary(db: &Database, owner: &str) -> Result<Vec<CurrentStreak>, CoreError> {
    let habits = db.list_habits(owner, None)?;
    Ok(habits.into_iter().map(current_row).collect())
}

/// Current streak of one habit.
///
/// # Errors
/// Returns [`CoreError::HabitNotFound`] if the habit does not exist.
pub fn current_streak_of(
    db: &Database,
    owner: &str,
    name: &str,
    frequency: Frequency,
) -> Result<CurrentStreak, CoreError> {
    let habit = db
        .get_habit(owner, name, frequency)?
        .ok_or_else(|| CoreError::HabitNotFound {
            name: name.to_string(),
        })?;
    Ok(current_row(habit))
}

/// Longest recorded run of every habit the user owns.
pub fn longest_streak_summary(db: &Database, owner: &str) -> Result<Vec<LongestStreak>, CoreError> {
    let habits = db.list_habits(owner, None)?;
    habits.into_iter().map(|h| longest_row(db, h)).collect()
}

/// Longest recorded run of one habit.
///
/// # Errors
/// Returns [`CoreError::HabitNotFound`] if the habit does not exist.
pub fn longest_streak_of(
    db: &Database,
    owner: &str,
    name: &str,
    frequency: Frequency,
) -> Result<LongestStreak, CoreError> {
    let habit = db
        .get_habit(owner, name, frequency)?
        .ok_or_else(|| CoreError::HabitNotFound {
            name: name.to_string(),
        })?;
    longest_row(db, habit)
}

fn current_row(habit: Habit) -> CurrentStreak {
    CurrentStreak {
        name: habit.name,
        category: habit.category,
        frequency: habit.frequency,
        streak_count: habit.streak_count,
        last_completion_at: habit.last_completion_at,
    }
}

fn longest_row(db: &Database, habit: Habit) -> Result<LongestStreak, CoreError> {
    let longest_length = db.longest_run_length(&habit.id)?.unwrap_or(0);
    Ok(LongestStreak {
        name: habit.name,
        category: habit.category,
        frequency: habit.frequency,
        longest_length,
    })
}
