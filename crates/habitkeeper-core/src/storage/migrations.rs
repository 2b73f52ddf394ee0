//! Database schema migrations for habitkeeper.
//!
//! The schema version lives in SQLite's `user_version` pragma and migrations
//! are applied automatically when opening the database. Streak runs
//! reference their habit by id instead of carrying copies of its descriptive
//! fields, so edits to a habit never have to fan out over history rows.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub fn apply(conn: &Connection) -> SqliteResult<()> {
    let version = current_version(conn)?;
    if version < 1 {
        migrate_v1(conn)?;
    }
    Ok(())
}

fn current_version(conn: &Connection) -> SqliteResult<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Migration v1: initial schema.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            username      TEXT PRIMARY KEY,
            forename      TEXT NOT NULL,
            surname       TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            id                 TEXT PRIMARY KEY,
            name               TEXT NOT NULL,
            owner              TEXT NOT NULL,
            category           TEXT NOT NULL,
            frequency          TEXT NOT NULL,
            created_at         TEXT NOT NULL,
            last_completion_at TEXT,
            streak_count       INTEGER NOT NULL DEFAULT 0
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_habits_owner_name_frequency
            ON habits(owner, name, frequency);

        CREATE TABLE IF NOT EXISTS streak_runs (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            start_at TEXT NOT NULL,
            end_at   TEXT,
            length   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_streak_runs_habit_id ON streak_runs(habit_id);

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        PRAGMA user_version = 1;",
    )?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        apply(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 1);
    }
}
