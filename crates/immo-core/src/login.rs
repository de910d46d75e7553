// Login gate in front of the assistant.
//
// There is no account backend: in `confirm` mode the user only states that
// they are registered on the brokerage website, and in `credentials` mode any
// non-empty username/password pair is accepted.

use serde::Deserialize;
use thiserror::Error;

pub const CONFIRM_QUESTION: &str =
    "Have you logged in or registered on the official website?";

pub const NOT_LOGGED_IN_WARNING: &str =
    "Please log in or register on the official website to use this service.";

/// Which login screen the gate shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    /// Yes/No confirmation that the user is registered elsewhere.
    #[default]
    Confirm,
    /// Username and password fields.
    Credentials,
}

/// What the user submitted on the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAttempt {
    Confirm { registered: bool },
    Credentials { username: String, password: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("{}", NOT_LOGGED_IN_WARNING)]
    NotRegistered,

    #[error("please enter a username")]
    MissingUsername,

    #[error("please enter a password")]
    MissingPassword,

    #[error("this screen expects {expected:?} login")]
    WrongMode { expected: LoginMode },
}

/// An unlocked, in-memory session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Present for credential logins.
    pub username: Option<String>,
}

/// Check a login attempt against the configured mode.
pub fn authenticate(mode: LoginMode, attempt: &LoginAttempt) -> Result<Session, LoginError> {
    match (mode, attempt) {
        (LoginMode::Confirm, LoginAttempt::Confirm { registered: true }) => {
            Ok(Session { username: None })
        }
        (LoginMode::Confirm, LoginAttempt::Confirm { registered: false }) => {
            Err(LoginError::NotRegistered)
        }
        (LoginMode::Credentials, LoginAttempt::Credentials { username, password }) => {
            let username = username.trim();
            if username.is_empty() {
                return Err(LoginError::MissingUsername);
            }
            if password.trim().is_empty() {
                return Err(LoginError::MissingPassword);
            }
            Ok(Session {
                username: Some(username.to_string()),
            })
        }
        (expected, _) => Err(LoginError::WrongMode { expected }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> LoginAttempt {
        LoginAttempt::Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn confirm_yes_unlocks() {
        let session =
            authenticate(LoginMode::Confirm, &LoginAttempt::Confirm { registered: true }).unwrap();
        assert!(session.username.is_none());
    }

    #[test]
    fn confirm_no_is_rejected_with_warning() {
        let err = authenticate(LoginMode::Confirm, &LoginAttempt::Confirm { registered: false })
            .unwrap_err();
        assert_eq!(err, LoginError::NotRegistered);
        assert_eq!(err.to_string(), NOT_LOGGED_IN_WARNING);
    }

    #[test]
    fn any_non_empty_pair_is_accepted() {
        let session = authenticate(LoginMode::Credentials, &creds(" anna ", "x")).unwrap();
        assert_eq!(session.username.as_deref(), Some("anna"));
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            authenticate(LoginMode::Credentials, &creds("  ", "pw")),
            Err(LoginError::MissingUsername)
        );
        assert_eq!(
            authenticate(LoginMode::Credentials, &creds("anna", "   ")),
            Err(LoginError::MissingPassword)
        );
    }

    #[test]
    fn mismatched_attempt_is_rejected() {
        assert_eq!(
            authenticate(LoginMode::Credentials, &LoginAttempt::Confirm { registered: true }),
            Err(LoginError::WrongMode {
                expected: LoginMode::Credentials
            })
        );
    }

    #[test]
    fn mode_parses_from_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: LoginMode,
        }
        let w: Wrapper = toml::from_str("mode = \"credentials\"").unwrap();
        assert_eq!(w.mode, LoginMode::Credentials);
    }
}
