//! Streak advance and lapse rules.
//!
//! Two pure decision functions classify what happens to a habit's streak:
//!
//! - [`evaluate_completion`] answers "can this check-off be credited right
//!   now" for an explicit user action
//! - [`evaluate_reset`] answers "has this habit silently lapsed since we last
//!   looked" for the periodic sweep run at login
//!
//! Both operate on `(frequency, last_completion_at, now)` alone and perform
//! no storage side effects; the call sites in [`crate::tracker`] apply the
//! outcomes. Elapsed time is measured in whole days, truncating the
//! difference of the two timestamps (calendar-day counting, not fractional
//! days): 23h59m is 0 days, 24h01m is 1 day.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::habit::Frequency;

/// Outcome of one check-off attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOffOutcome {
    /// Never completed before: streak starts at 1 and a new run opens.
    FirstCompletion,
    /// Checked off exactly one period after the last completion: streak and
    /// open run length both grow by one.
    Advanced,
    /// Already checked off within the current period. No state change;
    /// only one streak credit is granted per period.
    Rejected,
    /// The advance window was overshot. The open run closes at its current
    /// length and a fresh run starts at 1, as if the reset sweep had run
    /// first and the check-off were then a first completion.
    Restarted,
}

/// Outcome of one sweep evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Never completed, or still inside the allowed window.
    NoAction,
    /// The window was missed: the open run closes with `length` and the
    /// habit resets to zero streak / no last completion.
    Lapsed { length: u32 },
}

/// Classify a check-off of a habit with the given frequency.
///
/// `now` must not precede `last_completion_at`; a violation indicates a
/// caller or store bug and fails the operation.
///
/// # Errors
/// Returns [`ValidationError::InvalidTimeRange`] if `now` precedes
/// `last_completion_at`.
pub fn evaluate_completion(
    frequency: Frequency,
    last_completion_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Result<CheckOffOutcome, ValidationError> {
    let Some(last) = last_completion_at else {
        return Ok(CheckOffOutcome::FirstCompletion);
    };
    let days = elapsed_days(last, now)?;
    let window = frequency.advance_window_days();
    if days == window {
        Ok(CheckOffOutcome::Advanced)
    } else if days < window {
        Ok(CheckOffOutcome::Rejected)
    } else {
        Ok(CheckOffOutcome::Restarted)
    }
}

/// Classify a sweep over a habit with the given frequency.
///
/// `streak_count` is passed through into [`ResetOutcome::Lapsed`] as the
/// final length to record on the closing run.
///
/// # Errors
/// Returns [`ValidationError::InvalidTimeRange`] if `now` precedes
/// `last_completion_at`.
pub fn evaluate_reset(
    frequency: Frequency,
    last_completion_at: Option<NaiveDateTime>,
    streak_count: u32,
    now: NaiveDateTime,
) -> Result<ResetOutcome, ValidationError> {
    let Some(last) = last_completion_at else {
        return Ok(ResetOutcome::NoAction);
    };
    let days = elapsed_days(last, now)?;
    if days > frequency.advance_window_days() {
        Ok(ResetOutcome::Lapsed { length: streak_count })
    } else {
        Ok(ResetOutcome::NoAction)
    }
}

fn elapsed_days(last: NaiveDateTime, now: NaiveDateTime) -> Result<i64, ValidationError> {
    if now < last {
        return Err(ValidationError::InvalidTimeRange { last, now });
    }
    Ok((now - last).num_days())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use proptest::prelude::*;

    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn never_completed_is_first_completion() {
        for frequency in [Frequency::Daily, Frequency::Weekly] {
            let outcome = evaluate_completion(frequency, None, dt("2023-01-30 00:05:00")).unwrap();
            assert_eq!(outcome, CheckOffOutcome::FirstCompletion);
        }
    }

    #[test]
    fn same_timestamp_is_rejected() {
        let t = dt("2023-01-30 00:05:00");
        let outcome = evaluate_completion(Frequency::Daily, Some(t), t).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Rejected);
    }

    #[test]
    fn daily_rejected_just_under_one_day() {
        let last = dt("2023-01-30 00:05:00");
        let now = last + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59);
        let outcome = evaluate_completion(Frequency::Daily, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Rejected);
    }

    #[test]
    fn daily_advanced_just_over_one_day() {
        let last = dt("2023-01-30 00:05:00");
        let now = last + Duration::hours(24) + Duration::seconds(1);
        let outcome = evaluate_completion(Frequency::Daily, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Advanced);
    }

    #[test]
    fn daily_advanced_one_day_five_minutes_later() {
        let last = dt("2023-01-30 00:05:00");
        let now = dt("2023-01-31 00:10:00");
        let outcome = evaluate_completion(Frequency::Daily, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Advanced);
    }

    #[test]
    fn daily_restarts_beyond_two_days() {
        let last = dt("2023-01-30 00:05:00");
        let now = last + Duration::hours(48) + Duration::seconds(1);
        let outcome = evaluate_completion(Frequency::Daily, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Restarted);
    }

    #[test]
    fn weekly_rejected_just_under_seven_days() {
        let last = dt("2023-01-01 00:05:00");
        let now = last + Duration::days(6) + Duration::hours(23) + Duration::minutes(59);
        let outcome = evaluate_completion(Frequency::Weekly, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Rejected);
    }

    #[test]
    fn weekly_advanced_just_over_seven_days() {
        let last = dt("2023-01-01 00:05:00");
        let now = last + Duration::days(7) + Duration::minutes(1);
        let outcome = evaluate_completion(Frequency::Weekly, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Advanced);
    }

    #[test]
    fn weekly_restarts_beyond_eight_days() {
        let last = dt("2023-01-01 00:05:00");
        let now = last + Duration::days(8) + Duration::seconds(1);
        let outcome = evaluate_completion(Frequency::Weekly, Some(last), now).unwrap();
        assert_eq!(outcome, CheckOffOutcome::Restarted);
    }

    #[test]
    fn reset_no_action_when_never_completed() {
        let outcome =
            evaluate_reset(Frequency::Daily, None, 0, dt("2023-01-30 00:05:00")).unwrap();
        assert_eq!(outcome, ResetOutcome::NoAction);
    }

    #[test]
    fn reset_no_action_within_window() {
        let last = dt("2023-01-30 00:05:00");
        let now = last + Duration::days(1);
        let outcome = evaluate_reset(Frequency::Daily, Some(last), 3, now).unwrap();
        assert_eq!(outcome, ResetOutcome::NoAction);

        let now = last + Duration::days(7);
        let outcome = evaluate_reset(Frequency::Weekly, Some(last), 3, now).unwrap();
        assert_eq!(outcome, ResetOutcome::NoAction);
    }

    #[test]
    fn reset_lapses_daily_after_missed_day() {
        let last = dt("2023-01-30 00:05:00");
        let now = last + Duration::days(2);
        let outcome = evaluate_reset(Frequency::Daily, Some(last), 5, now).unwrap();
        assert_eq!(outcome, ResetOutcome::Lapsed { length: 5 });
    }

    #[test]
    fn reset_lapses_weekly_after_thirty_five_days() {
        let last = dt("2023-01-01 00:05:00");
        let now = dt("2023-02-05 00:05:00");
        let outcome = evaluate_reset(Frequency::Weekly, Some(last), 4, now).unwrap();
        assert_eq!(outcome, ResetOutcome::Lapsed { length: 4 });
    }

    #[test]
    fn weekly_eighth_day_lapses_via_reset() {
        let last = dt("2023-01-01 00:05:00");
        let now = last + Duration::days(8);
        let outcome = evaluate_reset(Frequency::Weekly, Some(last), 4, now).unwrap();
        assert_eq!(outcome, ResetOutcome::Lapsed { length: 4 });
    }

    #[test]
    fn clock_running_backwards_is_a_contract_violation() {
        let last = dt("2023-01-30 00:05:00");
        let now = last - Duration::seconds(1);
        assert!(evaluate_completion(Frequency::Daily, Some(last), now).is_err());
        assert!(evaluate_reset(Frequency::Weekly, Some(last), 2, now).is_err());
    }

    proptest! {
        /// Any forward offset classifies without error, and the outcome
        /// partitions cleanly by whole-day count.
        #[test]
        fn completion_partitions_by_elapsed_days(offset_secs in 0i64..400 * 24 * 3600) {
            let last = dt("2023-01-01 12:00:00");
            let now = last + Duration::seconds(offset_secs);
            for frequency in [Frequency::Daily, Frequency::Weekly] {
                let days = offset_secs / (24 * 3600);
                let window = frequency.advance_window_days();
                let expected = if days == window {
                    CheckOffOutcome::Advanced
                } else if days < window {
                    CheckOffOutcome::Rejected
                } else {
                    CheckOffOutcome::Restarted
                };
                let outcome = evaluate_completion(frequency, Some(last), now).unwrap();
                prop_assert_eq!(outcome, expected);
            }
        }

        /// A rejected check-off re-evaluated with the same inputs stays
        /// rejected; the decision is idempotent.
        #[test]
        fn rejection_is_idempotent(offset_secs in 0i64..24 * 3600) {
            let last = dt("2023-01-01 12:00:00");
            let now = last + Duration::seconds(offset_secs);
            let first = evaluate_completion(Frequency::Daily, Some(last), now).unwrap();
            prop_assert_eq!(first, CheckOffOutcome::Rejected);
            let second = evaluate_completion(Frequency::Daily, Some(last), now).unwrap();
            prop_assert_eq!(second, CheckOffOutcome::Rejected);
        }

        /// Reset either leaves the habit alone or records exactly the
        /// streak count it was handed.
        #[test]
        fn reset_preserves_recorded_length(
            offset_secs in 0i64..400 * 24 * 3600,
            streak in 0u32..10_000,
        ) {
            let last = dt("2023-01-01 12:00:00");
            let now = last + Duration::seconds(offset_secs);
            for frequency in [Frequency::Daily, Frequency::Weekly] {
                match evaluate_reset(frequency, Some(last), streak, now).unwrap() {
                    ResetOutcome::NoAction => {}
                    ResetOutcome::Lapsed { length } => prop_assert_eq!(length, streak),
                }
            }
        }
    }
}
