//! Predefined habit catalog.
//!
//! Seven ready-made habits with fixed category and frequency. Adopting one
//! creates a normal habit row subject to the same duplicate rule as
//! user-created habits.

use serde::Serialize;

use crate::habit::{Category, Frequency};

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredefinedHabit {
    pub name: &'static str,
    pub category: Category,
    pub frequency: Frequency,
}

pub const PREDEFINED_HABITS: [PredefinedHabit; 7] = [
    PredefinedHabit {
        name: "Exercise",
        category: Category::PhysicalHealth,
        frequency: Frequency::Daily,
    },
    PredefinedHabit {
        name: "Meditation",
        category: Category::EmotionalRelaxation,
        frequency: Frequency::Daily,
    },
    PredefinedHabit {
        name: "Self-assessment",
        category: Category::PersonalGrowth,
        frequency: Frequency::Weekly,
    },
    PredefinedHabit {
        name: "Family Time",
        category: Category::Relationships,
        frequency: Frequency::Weekly,
    },
    PredefinedHabit {
        name: "Healthy Diet",
        category: Category::PhysicalHealth,
        frequency: Frequency::Daily,
    },
    PredefinedHabit {
        name: "Writing Diary",
        category: Category::PersonalGrowth,
        frequency: Frequency::Daily,
    },
    PredefinedHabit {
        name: "Cleaning House",
        category: Category::EmotionalRelaxation,
        frequency: Frequency::Weekly,
    },
];

/// Look up a catalog entry by name (case-insensitive).
pub fn find(name: &str) -> Option<PredefinedHabit> {
    PREDEFINED_HABITS
        .into_iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
}
