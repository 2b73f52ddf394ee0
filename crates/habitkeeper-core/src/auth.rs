//! User accounts and sign-in.
//!
//! Passwords are stored as SHA-256 hex digests and checked against a
//! configurable policy at registration and password change. The active
//! session is a single username recorded in the database's kv store; every
//! operation that needs a user receives the session explicitly instead of
//! reading ambient state.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AuthError, CoreError};
use crate::storage::{Database, PasswordPolicy, UserAccount};

const SESSION_KEY: &str = "session.username";

/// The signed-in user, threaded through every per-user operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

/// Profile fields collected at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub forename: String,
    pub surname: String,
    pub username: String,
}

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a password against the policy.
///
/// # Errors
/// Returns [`AuthError::WeakPassword`] naming the first unmet requirement.
pub fn validate_password(policy: &PasswordPolicy, password: &str) -> Result<(), AuthError> {
    if password.chars().count() < policy.min_length {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {} characters long",
            policy.min_length
        )));
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one uppercase letter".into(),
        ));
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one lowercase letter".into(),
        ));
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one number".into(),
        ));
    }
    if policy.require_symbol && password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one special character".into(),
        ));
    }
    Ok(())
}

/// Create an account.
///
/// # Errors
/// Returns [`AuthError::UsernameTaken`] or [`AuthError::WeakPassword`];
/// nothing is written in either case.
pub fn register(
    db: &Database,
    profile: NewUser,
    password: &str,
    policy: &PasswordPolicy,
    now: NaiveDateTime,
) -> Result<UserAccount, CoreError> {
    if db.user_exists(&profile.username)? {
        return Err(AuthError::UsernameTaken(profile.username).into());
    }
    validate_password(policy, password)?;
    let user = UserAccount {
        username: profile.username,
        forename: profile.forename,
        surname: profile.surname,
        password_hash: hash_password(password),
        created_at: now,
    };
    db.insert_user(&user)?;
    Ok(user)
}

/// Verify credentials and record the session.
///
/// # Errors
/// Returns [`AuthError::InvalidCredentials`] on a wrong username/password
/// pair; which of the two was wrong is not disclosed.
pub fn login(db: &Database, username: &str, password: &str) -> Result<Session, CoreError> {
    let user = db
        .get_user(username)?
        .ok_or(AuthError::InvalidCredentials)?;
    if user.password_hash != hash_password(password) {
        return Err(AuthError::InvalidCredentials.into());
    }
    db.kv_set(SESSION_KEY, &user.username)?;
    Ok(Session {
        username: user.username,
    })
}

/// Clear the recorded session.
pub fn logout(db: &Database) -> Result<(), CoreError> {
    db.kv_delete(SESSION_KEY)?;
    Ok(())
}

/// The recorded session, if any.
pub fn current_session(db: &Database) -> Result<Option<Session>, CoreError> {
    Ok(db.kv_get(SESSION_KEY)?.map(|username| Session { username }))
}

/// The recorded session, or [`AuthError::NotSignedIn`].
pub fn require_session(db: &Database) -> Result<Session, CoreError> {
    current_session(db)?.ok_or_else(|| AuthError::NotSignedIn.into())
}

/// Change the session user's password, re-validating against the policy.
pub fn change_password(
    db: &Database,
    session: &Session,
    new_password: &str,
    policy: &PasswordPolicy,
) -> Result<(), CoreError> {
    validate_password(policy, new_password)?;
    db.update_password_hash(&session.username, &hash_password(new_password))?;
    Ok(())
}

/// Rename the session user. Habit ownership follows the rename atomically,
/// and the recorded session is updated to the new name.
///
/// # Errors
/// Returns [`AuthError::UsernameTaken`] if the new name exists.
pub fn change_username(
    db: &Database,
    session: &Session,
    new_username: &str,
) -> Result<Session, CoreError> {
    if db.user_exists(new_username)? {
        return Err(AuthError::UsernameTaken(new_username.to_string()).into());
    }
    db.rename_user(&session.username, new_username)?;
    db.kv_set(SESSION_KEY, new_username)?;
    Ok(Session {
        username: new_username.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            forename: "Anna".into(),
            surname: "Berg".into(),
            username: username.into(),
        }
    }

    fn register_anna(db: &Database) {
        register(
            db,
            new_user("anna"),
            "Str0ng-pass",
            &PasswordPolicy::default(),
            dt("2023-01-01 08:00:00"),
        )
        .unwrap();
    }

    #[test]
    fn password_policy_names_the_first_unmet_rule() {
        let policy = PasswordPolicy::default();
        for (password, fragment) in [
            ("Ab1-", "8 characters"),
            ("lower-case-1", "uppercase"),
            ("UPPER-CASE-1", "lowercase"),
            ("No-Digits-Here", "number"),
            ("NoSymbols123", "special character"),
        ] {
            let err = validate_password(&policy, password).unwrap_err();
            let message = err.to_string();
            assert!(message.contains(fragment), "{password}: {message}");
        }
        assert!(validate_password(&policy, "Str0ng-pass").is_ok());
    }

    #[test]
    fn relaxed_policy_accepts_simple_passwords() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
        };
        assert!(validate_password(&policy, "abcd").is_ok());
    }

    #[test]
    fn register_then_login() {
        let db = Database::open_memory().unwrap();
        register_anna(&db);

        let session = login(&db, "anna", "Str0ng-pass").unwrap();
        assert_eq!(session.username, "anna");
        assert_eq!(current_session(&db).unwrap(), Some(session));
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let db = Database::open_memory().unwrap();
        register_anna(&db);

        let wrong_pass = login(&db, "anna", "wrong").unwrap_err().to_string();
        let unknown = login(&db, "bob", "Str0ng-pass").unwrap_err().to_string();
        assert_eq!(wrong_pass, unknown);
        assert!(current_session(&db).unwrap().is_none());
    }

    #[test]
    fn taken_username_is_rejected() {
        let db = Database::open_memory().unwrap();
        register_anna(&db);
        let err = register(
            &db,
            new_user("anna"),
            "0ther-Pass",
            &PasswordPolicy::default(),
            dt("2023-01-02 08:00:00"),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthError::UsernameTaken(_))));
    }

    #[test]
    fn logout_clears_session() {
        let db = Database::open_memory().unwrap();
        register_anna(&db);
        login(&db, "anna", "Str0ng-pass").unwrap();
        logout(&db).unwrap();
        assert!(current_session(&db).unwrap().is_none());
        assert!(require_session(&db).is_err());
    }

    #[test]
    fn change_password_requires_policy() {
        let db = Database::open_memory().unwrap();
        register_anna(&db);
        let session = login(&db, "anna", "Str0ng-pass").unwrap();

        let policy = PasswordPolicy::default();
        assert!(change_password(&db, &session, "weak", &policy).is_err());
        change_password(&db, &session, "N3w-Secret", &policy).unwrap();
        assert!(login(&db, "anna", "Str0ng-pass").is_err());
        assert!(login(&db, "anna", "N3w-Secret").is_ok());
    }

    #[test]
    fn change_username_updates_session_and_rejects_taken_names() {
        let db = Database::open_memory().unwrap();
        register_anna(&db);
        register(
            &db,
            new_user("bob"),
            "B0b-secret",
            &PasswordPolicy::default(),
            dt("2023-01-01 09:00:00"),
        )
        .unwrap();
        let session = login(&db, "anna", "Str0ng-pass").unwrap();

        assert!(change_username(&db, &session, "bob").is_err());
        let renamed = change_username(&db, &session, "annika").unwrap();
        assert_eq!(renamed.username, "annika");
        assert_eq!(current_session(&db).unwrap(), Some(renamed));
        assert!(login(&db, "annika", "Str0ng-pass").is_ok());
    }
}
