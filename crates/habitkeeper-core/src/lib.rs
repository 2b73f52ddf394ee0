//! # Habitkeeper Core Library
//!
//! This library provides the core business logic for the Habitkeeper habit
//! tracker. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary built on top of this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Pure decision functions that classify a check-off or
//!   a periodic sweep given a habit's frequency and last completion time
//! - **Storage**: SQLite-based habit/run/user storage and TOML-based
//!   configuration
//! - **Tracker**: The stateful call sites that apply engine outcomes to the
//!   store
//! - **Analytics**: Current and longest streak queries over stored habits
//!
//! ## Key Components
//!
//! - [`evaluate_completion`] / [`evaluate_reset`]: Streak decision functions
//! - [`HabitTracker`]: Applies engine outcomes to storage
//! - [`Database`]: Habit, streak run, and user persistence
//! - [`Config`]: Application configuration management
//! - [`Clock`]: Injectable time source for deterministic evaluation

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod habit;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Category, Frequency, Habit, StreakRun};
pub use storage::{Config, Database};
pub use streak::{evaluate_completion, evaluate_reset, CheckOffOutcome, ResetOutcome};
pub use tracker::{CheckOffReport, HabitTracker, LapseReport};
