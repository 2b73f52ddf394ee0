//! Shared helpers for CLI commands.

use habitkeeper_core::{Category, Database, Frequency, Habit};

/// Parse a user-supplied frequency (`daily`, `weekly`, `d`, `w`, any case).
pub fn parse_frequency(s: &str) -> Result<Frequency, Box<dyn std::error::Error>> {
    match s.to_ascii_lowercase().as_str() {
        "daily" | "d" => Ok(Frequency::Daily),
        "weekly" | "w" => Ok(Frequency::Weekly),
        _ => Err(format!("unknown frequency '{s}' (expected daily or weekly)").into()),
    }
}

/// Parse a user-supplied category, tolerating case and separator variants
/// ("physical-health", "Physical Health", "physical_health").
pub fn parse_category(s: &str) -> Result<Category, Box<dyn std::error::Error>> {
    let normalized: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    Category::ALL
        .into_iter()
        .find(|c| {
            c.as_str()
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
                == normalized
        })
        .ok_or_else(|| {
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            format!("unknown category '{s}' (expected one of: {})", names.join(", ")).into()
        })
}

/// Find a habit by name, using `--frequency` to disambiguate when the same
/// name exists under both cadences.
pub fn resolve_habit(
    db: &Database,
    owner: &str,
    name: &str,
    frequency: Option<Frequency>,
) -> Result<Habit, Box<dyn std::error::Error>> {
    if let Some(frequency) = frequency {
        return db
            .get_habit(owner, name, frequency)?
            .ok_or_else(|| format!("Habit '{name}' ({frequency}) not found").into());
    }
    let mut matches: Vec<Habit> = db
        .list_habits(owner, None)?
        .into_iter()
        .filter(|h| h.name == name)
        .collect();
    match matches.len() {
        0 => Err(format!("Habit '{name}' not found").into()),
        1 => Ok(matches.remove(0)),
        _ => Err(format!("Habit '{name}' exists as both Daily and Weekly; pass --frequency").into()),
    }
}
