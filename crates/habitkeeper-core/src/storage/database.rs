//! SQLite-based habit, streak run, and user storage.
//!
//! Provides persistent storage for:
//! - Habits and their current streak state
//! - Streak run history (one row per continuous run)
//! - User accounts
//! - Key-value store for application state (active session)
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text, seconds precision,
//! no timezone. The format must round-trip exactly because the lapse and
//! advance arithmetic compares stored values against the clock.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::habit::{Category, Frequency, Habit, StreakRun};

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// === Helper Functions ===

/// Format a timestamp for database storage.
fn format_datetime(t: NaiveDateTime) -> String {
    t.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored timestamp. A value that does not round-trip is treated as
/// corruption, not silently replaced.
fn parse_datetime(column: usize, raw: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_category(column: usize, raw: &str) -> Result<Category, rusqlite::Error> {
    Category::parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            format!("unknown category '{raw}'").into(),
        )
    })
}

fn parse_frequency(column: usize, raw: &str) -> Result<Frequency, rusqlite::Error> {
    Frequency::parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            format!("unknown frequency '{raw}'").into(),
        )
    })
}

/// Build a Habit from a `SELECT id, name, owner, category, frequency,
/// created_at, last_completion_at, streak_count` row.
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let category_str: String = row.get(3)?;
    let frequency_str: String = row.get(4)?;
    let created_str: String = row.get(5)?;
    let last_str: Option<String> = row.get(6)?;
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        owner: row.get(2)?,
        category: parse_category(3, &category_str)?,
        frequency: parse_frequency(4, &frequency_str)?,
        created_at: parse_datetime(5, &created_str)?,
        last_completion_at: last_str.as_deref().map(|s| parse_datetime(6, s)).transpose()?,
        streak_count: row.get(7)?,
    })
}

/// Build a StreakRun from a `SELECT id, habit_id, start_at, end_at, length`
/// row.
fn row_to_run(row: &rusqlite::Row) -> Result<StreakRun, rusqlite::Error> {
    let start_str: String = row.get(2)?;
    let end_str: Option<String> = row.get(3)?;
    Ok(StreakRun {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        start_at: parse_datetime(2, &start_str)?,
        end_at: end_str.as_deref().map(|s| parse_datetime(3, s)).transpose()?,
        length: row.get(4)?,
    })
}

/// One registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub forename: String,
    pub surname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

/// SQLite database for habit storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitkeeper/habitkeeper.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        Self::open_at(data_dir()?.join("habitkeeper.db"))
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<std::path::Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::apply(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::apply(&conn)?;
        Ok(Self { conn })
    }

    // ── Habits ───────────────────────────────────────────────────────

    pub fn habit_exists(
        &self,
        owner: &str,
        name: &str,
        frequency: Frequency,
    ) -> Result<bool, rusqlite::Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE owner = ?1 AND name = ?2 AND frequency = ?3",
            params![owner, name, frequency.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_habit(&self, habit: &Habit) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO habits (id, name, owner, category, frequency, created_at,
                                 last_completion_at, streak_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.id,
                habit.name,
                habit.owner,
                habit.category.as_str(),
                habit.frequency.as_str(),
                format_datetime(habit.created_at),
                habit.last_completion_at.map(format_datetime),
                habit.streak_count,
            ],
        )?;
        Ok(())
    }

    pub fn get_habit(
        &self,
        owner: &str,
        name: &str,
        frequency: Frequency,
    ) -> Result<Option<Habit>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, owner, category, frequency, created_at,
                        last_completion_at, streak_count
                 FROM habits WHERE owner = ?1 AND name = ?2 AND frequency = ?3",
                params![owner, name, frequency.as_str()],
                row_to_habit,
            )
            .optional()
    }

    /// List a user's habits, optionally restricted to one frequency.
    pub fn list_habits(
        &self,
        owner: &str,
        frequency: Option<Frequency>,
    ) -> Result<Vec<Habit>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, owner, category, frequency, created_at,
                    last_completion_at, streak_count
             FROM habits
             WHERE owner = ?1 AND (?2 IS NULL OR frequency = ?2)
             ORDER BY created_at, name",
        )?;
        let rows = stmt.query_map(params![owner, frequency.map(|f| f.as_str())], row_to_habit)?;
        rows.collect()
    }

    /// Persist the mutable streak state of a habit.
    pub fn save_streak_fields(&self, habit: &Habit) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE habits SET last_completion_at = ?1, streak_count = ?2 WHERE id = ?3",
            params![
                habit.last_completion_at.map(format_datetime),
                habit.streak_count,
                habit.id,
            ],
        )?;
        Ok(())
    }

    pub fn set_category(&self, habit_id: &str, category: Category) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE habits SET category = ?1 WHERE id = ?2",
            params![category.as_str(), habit_id],
        )?;
        Ok(())
    }

    pub fn set_frequency(
        &self,
        habit_id: &str,
        frequency: Frequency,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE habits SET frequency = ?1 WHERE id = ?2",
            params![frequency.as_str(), habit_id],
        )?;
        Ok(())
    }

    /// Delete a habit and its run history as one transaction.
    pub fn delete_habit(&self, habit_id: &str) -> Result<(), rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM streak_runs WHERE habit_id = ?1", params![habit_id])?;
        tx.execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
        tx.commit()
    }

    // ── Streak runs ──────────────────────────────────────────────────

    /// Open a new run for a habit. The caller guarantees no run is
    /// currently open.
    pub fn open_run(
        &self,
        habit_id: &str,
        start_at: NaiveDateTime,
        length: u32,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO streak_runs (habit_id, start_at, end_at, length)
             VALUES (?1, ?2, NULL, ?3)",
            params![habit_id, format_datetime(start_at), length],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_open_run(&self, habit_id: &str) -> Result<Option<StreakRun>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, habit_id, start_at, end_at, length
                 FROM streak_runs WHERE habit_id = ?1 AND end_at IS NULL",
                params![habit_id],
                row_to_run,
            )
            .optional()
    }

    /// Credit one more check-off to a run, keeping it open.
    pub fn increment_run(&self, run_id: i64) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE streak_runs SET length = length + 1, end_at = NULL WHERE id = ?1",
            params![run_id],
        )?;
        Ok(())
    }

    /// Close a run, freezing its final length.
    pub fn close_run(
        &self,
        run_id: i64,
        end_at: NaiveDateTime,
        length: u32,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE streak_runs SET end_at = ?1, length = ?2 WHERE id = ?3",
            params![format_datetime(end_at), length, run_id],
        )?;
        Ok(())
    }

    /// Longest run length recorded for a habit, open or closed.
    pub fn longest_run_length(&self, habit_id: &str) -> Result<Option<u32>, rusqlite::Error> {
        self.conn.query_row(
            "SELECT MAX(length) FROM streak_runs WHERE habit_id = ?1",
            params![habit_id],
            |row| row.get(0),
        )
    }

    pub fn count_runs(&self, habit_id: &str) -> Result<i64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM streak_runs WHERE habit_id = ?1",
            params![habit_id],
            |row| row.get(0),
        )
    }

    // ── Users ────────────────────────────────────────────────────────

    pub fn user_exists(&self, username: &str) -> Result<bool, rusqlite::Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_user(&self, user: &UserAccount) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO users (username, forename, surname, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.username,
                user.forename,
                user.surname,
                user.password_hash,
                format_datetime(user.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserAccount>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT username, forename, surname, password_hash, created_at
                 FROM users WHERE username = ?1",
                params![username],
                |row| {
                    let created_str: String = row.get(4)?;
                    Ok(UserAccount {
                        username: row.get(0)?,
                        forename: row.get(1)?,
                        surname: row.get(2)?,
                        password_hash: row.get(3)?,
                        created_at: parse_datetime(4, &created_str)?,
                    })
                },
            )
            .optional()
    }

    pub fn update_forename(&self, username: &str, forename: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE users SET forename = ?1 WHERE username = ?2",
            params![forename, username],
        )?;
        Ok(())
    }

    pub fn update_surname(&self, username: &str, surname: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE users SET surname = ?1 WHERE username = ?2",
            params![surname, username],
        )?;
        Ok(())
    }

    pub fn update_password_hash(&self, username: &str, hash: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE username = ?2",
            params![hash, username],
        )?;
        Ok(())
    }

    /// Rename a user, moving habit ownership along in the same transaction.
    pub fn rename_user(&self, old: &str, new: &str) -> Result<(), rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE users SET username = ?1 WHERE username = ?2",
            params![new, old],
        )?;
        tx.execute(
            "UPDATE habits SET owner = ?1 WHERE owner = ?2",
            params![new, old],
        )?;
        tx.commit()
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
