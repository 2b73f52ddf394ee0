//! Stateful call sites for the streak engine.
//!
//! [`HabitTracker`] owns the read-decide-write sequences around
//! [`evaluate_completion`] and [`evaluate_reset`]: it loads a habit, asks the
//! engine for an outcome, and applies the outcome's effects to the habit row
//! and its streak runs. The tracker holds no state of its own; it borrows
//! the database and an injectable clock.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::clock::Clock;
use crate::error::{CoreError, ValidationError};
use crate::habit::{Category, Frequency, Habit};
use crate::storage::Database;
use crate::streak::{evaluate_completion, evaluate_reset, CheckOffOutcome, ResetOutcome};

/// Result of one check-off, rendered by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOffReport {
    pub name: String,
    pub frequency: Frequency,
    pub outcome: CheckOffOutcome,
    pub streak_count: u32,
}

/// One habit auto-reset by a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapseReport {
    pub name: String,
    pub frequency: Frequency,
    pub closed_length: u32,
}

/// Applies streak engine outcomes to storage.
pub struct HabitTracker<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> HabitTracker<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    // ── Habit lifecycle ──────────────────────────────────────────────

    /// Create a new habit for `owner`.
    ///
    /// # Errors
    /// Returns [`CoreError::DuplicateHabit`] if a habit with the same
    /// `(name, owner, frequency)` already exists; nothing is written in
    /// that case.
    pub fn create_habit(
        &self,
        owner: &str,
        name: &str,
        category: Category,
        frequency: Frequency,
    ) -> Result<Habit, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "habit name must not be empty".into(),
            }
            .into());
        }
        if self.db.habit_exists(owner, name, frequency)? {
            return Err(CoreError::DuplicateHabit {
                name: name.to_string(),
                frequency,
            });
        }
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner: owner.to_string(),
            category,
            frequency,
            created_at: self.clock.now(),
            last_completion_at: None,
            streak_count: 0,
        };
        self.db.insert_habit(&habit)?;
        Ok(habit)
    }

    /// Adopt a habit from the predefined catalog by name.
    ///
    /// # Errors
    /// Returns [`CoreError::HabitNotFound`] for names outside the catalog
    /// and [`CoreError::DuplicateHabit`] if already adopted.
    pub fn adopt_predefined(&self, owner: &str, name: &str) -> Result<Habit, CoreError> {
        let entry = catalog::find(name).ok_or_else(|| CoreError::HabitNotFound {
            name: name.to_string(),
        })?;
        self.create_habit(owner, entry.name, entry.category, entry.frequency)
    }

    pub fn change_category(&self, habit: &Habit, category: Category) -> Result<(), CoreError> {
        self.db.set_category(&habit.id, category)?;
        Ok(())
    }

    /// Change a habit's frequency, refusing a change that would collide
    /// with an existing `(name, owner, frequency)` key.
    pub fn change_frequency(&self, habit: &Habit, frequency: Frequency) -> Result<(), CoreError> {
        if frequency == habit.frequency {
            return Ok(());
        }
        if self.db.habit_exists(&habit.owner, &habit.name, frequency)? {
            return Err(CoreError::DuplicateHabit {
                name: habit.name.clone(),
                frequency,
            });
        }
        self.db.set_frequency(&habit.id, frequency)?;
        Ok(())
    }

    /// Delete a habit together with its run history.
    pub fn delete_habit(&self, habit: &Habit) -> Result<(), CoreError> {
        self.db.delete_habit(&habit.id)?;
        Ok(())
    }

    // ── Check-off ────────────────────────────────────────────────────

    /// Mark a habit as completed now.
    ///
    /// The engine classifies the check-off; this method applies the
    /// matching effects to the habit row and its runs and reports the
    /// outcome upward.
    ///
    /// # Errors
    /// Returns [`CoreError::HabitNotFound`] if the habit does not exist.
    pub fn check_off(
        &self,
        owner: &str,
        name: &str,
        frequency: Frequency,
    ) -> Result<CheckOffReport, CoreError> {
        let mut habit = self
            .db
            .get_habit(owner, name, frequency)?
            .ok_or_else(|| CoreError::HabitNotFound {
                name: name.to_string(),
            })?;
        let now = self.clock.now();
        let outcome = evaluate_completion(habit.frequency, habit.last_completion_at, now)?;

        match outcome {
            CheckOffOutcome::FirstCompletion => {
                habit.streak_count = 1;
                habit.last_completion_at = Some(now);
                self.db.save_streak_fields(&habit)?;
                self.db.open_run(&habit.id, now, 1)?;
            }
            CheckOffOutcome::Advanced => {
                habit.streak_count += 1;
                habit.last_completion_at = Some(now);
                self.db.save_streak_fields(&habit)?;
                match self.db.get_open_run(&habit.id)? {
                    Some(run) => self.db.increment_run(run.id)?,
                    // streak_count > 0 implies an open run; reseed if the
                    // row is missing instead of aborting the check-off
                    None => {
                        self.db.open_run(&habit.id, now, habit.streak_count)?;
                    }
                }
            }
            CheckOffOutcome::Rejected => {}
            CheckOffOutcome::Restarted => {
                if let Some(run) = self.db.get_open_run(&habit.id)? {
                    self.db.close_run(run.id, now, habit.streak_count)?;
                }
                habit.streak_count = 1;
                habit.last_completion_at = Some(now);
                self.db.save_streak_fields(&habit)?;
                self.db.open_run(&habit.id, now, 1)?;
            }
        }

        Ok(CheckOffReport {
            name: habit.name,
            frequency: habit.frequency,
            outcome,
            streak_count: habit.streak_count,
        })
    }

    // ── Lapse sweeps ─────────────────────────────────────────────────

    /// Close out every daily habit whose streak has lapsed.
    pub fn sweep_daily(&self, owner: &str) -> Result<Vec<LapseReport>, CoreError> {
        self.sweep(owner, Frequency::Daily)
    }

    /// Close out every weekly habit whose streak has lapsed.
    pub fn sweep_weekly(&self, owner: &str) -> Result<Vec<LapseReport>, CoreError> {
        self.sweep(owner, Frequency::Weekly)
    }

    fn sweep(&self, owner: &str, frequency: Frequency) -> Result<Vec<LapseReport>, CoreError> {
        let now = self.clock.now();
        let mut lapses = Vec::new();
        for mut habit in self.db.list_habits(owner, Some(frequency))? {
            match evaluate_reset(habit.frequency, habit.last_completion_at, habit.streak_count, now)?
            {
                ResetOutcome::NoAction => {}
                ResetOutcome::Lapsed { length } => {
                    if let Some(run) = self.db.get_open_run(&habit.id)? {
                        self.db.close_run(run.id, now, length)?;
                    }
                    habit.streak_count = 0;
                    habit.last_completion_at = None;
                    self.db.save_streak_fields(&habit)?;
                    lapses.push(LapseReport {
                        name: habit.name.clone(),
                        frequency,
                        closed_length: length,
                    });
                }
            }
        }
        Ok(lapses)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};

    use super::*;
    use crate::clock::ManualClock;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn setup() -> (Database, ManualClock) {
        let db = Database::open_memory().unwrap();
        let clock = ManualClock::new(dt("2023-01-01 08:00:00"));
        (db, clock)
    }

    /// streak_count == 0 iff last_completion_at is absent, and an open run
    /// mirrors a positive streak. Checked after every mutation.
    fn assert_invariants(db: &Database, owner: &str) {
        for habit in db.list_habits(owner, None).unwrap() {
            assert_eq!(
                habit.streak_count == 0,
                habit.last_completion_at.is_none(),
                "streak/last-completion invariant violated for {}",
                habit.name
            );
            let open = db.get_open_run(&habit.id).unwrap();
            if habit.streak_count > 0 {
                assert_eq!(open.unwrap().length, habit.streak_count);
            }
        }
    }

    #[test]
    fn first_completion_opens_a_run() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        let habit = tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        assert_invariants(&db, "anna");

        let report = tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();
        assert_eq!(report.outcome, CheckOffOutcome::FirstCompletion);
        assert_eq!(report.streak_count, 1);
        let run = db.get_open_run(&habit.id).unwrap().unwrap();
        assert_eq!(run.length, 1);
        assert_eq!(run.start_at, clock.now());
        assert_invariants(&db, "anna");
    }

    #[test]
    fn next_day_check_off_advances() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();

        clock.advance(Duration::days(1) + Duration::minutes(5));
        let report = tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();
        assert_eq!(report.outcome, CheckOffOutcome::Advanced);
        assert_eq!(report.streak_count, 2);
        assert_invariants(&db, "anna");
    }

    #[test]
    fn duplicate_check_off_is_rejected_without_state_change() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();
        let before = db.get_habit("anna", "Exercise", Frequency::Daily).unwrap().unwrap();

        clock.advance(Duration::hours(3));
        for _ in 0..2 {
            let report = tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();
            assert_eq!(report.outcome, CheckOffOutcome::Rejected);
            assert_eq!(report.streak_count, 1);
        }
        let after = db.get_habit("anna", "Exercise", Frequency::Daily).unwrap().unwrap();
        assert_eq!(after.last_completion_at, before.last_completion_at);
        assert_eq!(after.streak_count, before.streak_count);
        assert_invariants(&db, "anna");
    }

    #[test]
    fn overshooting_the_window_closes_the_run_and_restarts() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        let habit = tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();
        clock.advance(Duration::days(1));
        tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();

        clock.advance(Duration::days(3));
        let report = tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();
        assert_eq!(report.outcome, CheckOffOutcome::Restarted);
        assert_eq!(report.streak_count, 1);

        // old run frozen at its pre-restart length, new run open at 1
        assert_eq!(db.count_runs(&habit.id).unwrap(), 2);
        assert_eq!(db.longest_run_length(&habit.id).unwrap(), Some(2));
        assert_eq!(db.get_open_run(&habit.id).unwrap().unwrap().length, 1);
        assert_invariants(&db, "anna");
    }

    #[test]
    fn weekly_sweep_closes_lapsed_run() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        let habit = tracker
            .create_habit("anna", "Family Time", Category::Relationships, Frequency::Weekly)
            .unwrap();
        tracker.check_off("anna", "Family Time", Frequency::Weekly).unwrap();
        for _ in 0..3 {
            clock.advance(Duration::days(7));
            tracker.check_off("anna", "Family Time", Frequency::Weekly).unwrap();
        }
        assert_eq!(
            db.get_habit("anna", "Family Time", Frequency::Weekly).unwrap().unwrap().streak_count,
            4
        );

        // 35 days of silence
        clock.advance(Duration::days(35));
        let lapses = tracker.sweep_weekly("anna").unwrap();
        assert_eq!(lapses.len(), 1);
        assert_eq!(lapses[0].closed_length, 4);

        let after = db.get_habit("anna", "Family Time", Frequency::Weekly).unwrap().unwrap();
        assert_eq!(after.streak_count, 0);
        assert!(after.last_completion_at.is_none());
        assert!(db.get_open_run(&habit.id).unwrap().is_none());
        assert_eq!(db.longest_run_length(&habit.id).unwrap(), Some(4));
        assert_invariants(&db, "anna");
    }

    #[test]
    fn daily_sweep_skips_habits_within_window() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        tracker
            .create_habit("anna", "Meditation", Category::EmotionalRelaxation, Frequency::Daily)
            .unwrap();
        tracker.check_off("anna", "Exercise", Frequency::Daily).unwrap();

        clock.advance(Duration::hours(30));
        tracker.check_off("anna", "Meditation", Frequency::Daily).unwrap();

        clock.advance(Duration::hours(30));
        // Exercise is now 60h stale (lapsed); Meditation 30h (still fine)
        let lapses = tracker.sweep_daily("anna").unwrap();
        assert_eq!(lapses.len(), 1);
        assert_eq!(lapses[0].name, "Exercise");
        assert_invariants(&db, "anna");
    }

    #[test]
    fn sweep_ignores_never_completed_habits() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        clock.advance(Duration::days(30));
        assert!(tracker.sweep_daily("anna").unwrap().is_empty());
        assert_invariants(&db, "anna");
    }

    #[test]
    fn duplicate_create_is_rejected_without_partial_write() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Daily)
            .unwrap();
        let err = tracker
            .create_habit("anna", "Exercise", Category::PersonalGrowth, Frequency::Daily)
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateHabit { .. }));
        assert_eq!(db.list_habits("anna", None).unwrap().len(), 1);

        // same name under the other frequency is a different habit
        tracker
            .create_habit("anna", "Exercise", Category::PhysicalHealth, Frequency::Weekly)
            .unwrap();
        assert_eq!(db.list_habits("anna", None).unwrap().len(), 2);
    }

    #[test]
    fn adopt_predefined_uses_catalog_category_and_frequency() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        let habit = tracker.adopt_predefined("anna", "meditation").unwrap();
        assert_eq!(habit.name, "Meditation");
        assert_eq!(habit.category, Category::EmotionalRelaxation);
        assert_eq!(habit.frequency, Frequency::Daily);

        let err = tracker.adopt_predefined("anna", "Juggling").unwrap_err();
        assert!(matches!(err, CoreError::HabitNotFound { .. }));
        assert_eq!(db.list_habits("anna", None).unwrap().len(), 1);
    }

    #[test]
    fn change_frequency_refuses_collision() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        let daily = tracker
            .create_habit("anna", "Reading", Category::PersonalGrowth, Frequency::Daily)
            .unwrap();
        tracker
            .create_habit("anna", "Reading", Category::PersonalGrowth, Frequency::Weekly)
            .unwrap();

        let err = tracker.change_frequency(&daily, Frequency::Weekly).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateHabit { .. }));
        let unchanged = db.get_habit("anna", "Reading", Frequency::Daily).unwrap().unwrap();
        assert_eq!(unchanged.frequency, Frequency::Daily);
    }

    #[test]
    fn check_off_unknown_habit_is_not_found() {
        let (db, clock) = setup();
        let tracker = HabitTracker::new(&db, &clock);
        let err = tracker.check_off("anna", "Ghost", Frequency::Daily).unwrap_err();
        assert!(matches!(err, CoreError::HabitNotFound { .. }));
    }
}
