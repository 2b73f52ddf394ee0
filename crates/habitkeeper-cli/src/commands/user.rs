//! Account management commands for CLI.

use clap::Subcommand;
use habitkeeper_core::auth::{self, NewUser};
use habitkeeper_core::clock::{Clock, SystemClock};
use habitkeeper_core::storage::Config;
use habitkeeper_core::{Database, HabitTracker};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account
    Register {
        /// Username (unique)
        username: String,
        /// Forename
        #[arg(long)]
        forename: String,
        /// Surname
        #[arg(long)]
        surname: String,
        /// Password (checked against the configured policy)
        #[arg(long)]
        password: String,
    },
    /// Sign in and run the lapse sweeps
    Login {
        /// Username
        username: String,
        /// Password
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Edit the signed-in user's profile
    Edit {
        /// New forename
        #[arg(long)]
        forename: Option<String>,
        /// New surname
        #[arg(long)]
        surname: Option<String>,
        /// New password (checked against the configured policy)
        #[arg(long)]
        password: Option<String>,
        /// New username (habit ownership follows the rename)
        #[arg(long)]
        username: Option<String>,
    },
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        UserAction::Register {
            username,
            forename,
            surname,
            password,
        } => {
            let user = auth::register(
                &db,
                NewUser {
                    forename,
                    surname,
                    username,
                },
                &password,
                &config.password,
                SystemClock.now(),
            )?;
            println!("Account created for '{}'. You can now log in.", user.username);
        }
        UserAction::Login { username, password } => {
            let session = auth::login(&db, &username, &password)?;
            println!("Login successful. Welcome back, {}!", session.username);

            if config.sweep.on_login {
                let clock = SystemClock;
                let tracker = HabitTracker::new(&db, &clock);
                let mut lapses = tracker.sweep_daily(&session.username)?;
                lapses.extend(tracker.sweep_weekly(&session.username)?);
                for lapse in &lapses {
                    println!(
                        "The streak of '{}' ({}) was auto-reset to 0; the run closed at length {}.",
                        lapse.name, lapse.frequency, lapse.closed_length
                    );
                }
            }
        }
        UserAction::Logout => {
            auth::logout(&db)?;
            println!("Logout successful. See you soon!");
        }
        UserAction::Whoami => match auth::current_session(&db)? {
            Some(session) => println!("{}", session.username),
            None => println!("Not signed in."),
        },
        UserAction::Edit {
            forename,
            surname,
            password,
            username,
        } => {
            let session = auth::require_session(&db)?;

            if let Some(forename) = forename {
                db.update_forename(&session.username, &forename)?;
                println!("Forename updated to '{forename}'.");
            }
            if let Some(surname) = surname {
                db.update_surname(&session.username, &surname)?;
                println!("Surname updated to '{surname}'.");
            }
            if let Some(password) = password {
                auth::change_password(&db, &session, &password, &config.password)?;
                println!("Password updated.");
            }
            if let Some(username) = username {
                let renamed = auth::change_username(&db, &session, &username)?;
                println!("Username updated to '{}'.", renamed.username);
            }
        }
    }
    Ok(())
}
