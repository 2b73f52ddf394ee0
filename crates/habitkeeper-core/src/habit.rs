//! Habit domain model.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fixed set of habit categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PhysicalHealth,
    EmotionalRelaxation,
    PersonalGrowth,
    Relationships,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::PhysicalHealth,
        Category::EmotionalRelaxation,
        Category::PersonalGrowth,
        Category::Relationships,
    ];

    /// Canonical display/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PhysicalHealth => "Physical Health",
            Category::EmotionalRelaxation => "Emotional Relaxation",
            Category::PersonalGrowth => "Personal Growth",
            Category::Relationships => "Relationships",
        }
    }

    /// Parse the canonical form back into a category.
    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Periodic cadence governing how much elapsed time advances, rejects, or
/// lapses a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    /// Canonical display/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
        }
    }

    /// Parse the canonical form back into a frequency.
    pub fn parse(s: &str) -> Option<Frequency> {
        match s {
            "Daily" => Some(Frequency::Daily),
            "Weekly" => Some(Frequency::Weekly),
            _ => None,
        }
    }

    /// Whole-day count that advances a streak. An elapsed count above this
    /// lapses the streak; below it, a check-off is a duplicate.
    pub fn advance_window_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One habit owned by one user.
///
/// `(name, owner, frequency)` is unique; the same name may exist with both
/// frequencies. `streak_count == 0` if and only if `last_completion_at` is
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub category: Category,
    pub frequency: Frequency,
    /// Set once at creation, immutable afterwards.
    pub created_at: NaiveDateTime,
    /// Absent means never completed, or the streak just lapsed.
    pub last_completion_at: Option<NaiveDateTime>,
    /// Consecutive successful check-offs in the current run.
    pub streak_count: u32,
}

/// One continuous span of a streak, referencing its habit by stable id.
///
/// At most one run per habit is open (`end_at` absent) at any time. While
/// open, `length` mirrors the habit's `streak_count`; it is frozen when the
/// run closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakRun {
    pub id: i64,
    pub habit_id: String,
    pub start_at: NaiveDateTime,
    pub end_at: Option<NaiveDateTime>,
    pub length: u32,
}

impl StreakRun {
    pub fn is_open(&self) -> bool {
        self.end_at.is_none()
    }
}
