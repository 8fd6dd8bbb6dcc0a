use std::error::Error;
use std::fmt;

use serde::Serialize;

use crate::domain::validation::{Checker, ValidationError};
use crate::storage::{Storage, StorageError, PASSWORD_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// No credential has ever been set.
    Locked,
    /// Credential set, settings not yet unlocked this session.
    Gated,
    Unlocked,
}

impl GateState {
    pub fn as_str(self) -> &'static str {
        match self {
            GateState::Locked => "locked",
            GateState::Gated => "gated",
            GateState::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Password gate in front of the settings view. The unlocked flag lives only
/// in memory, so every new session starts gated.
pub struct AccessGate {
    storage: Storage,
    credential: Option<String>,
    unlocked: bool,
}

impl AccessGate {
    pub fn load(storage: Storage) -> Self {
        let credential = storage
            .load_text(PASSWORD_KEY)
            .filter(|value| !value.is_empty());
        Self {
            storage,
            credential,
            unlocked: false,
        }
    }

    pub fn state(&self) -> GateState {
        match (&self.credential, self.unlocked) {
            (None, _) => GateState::Locked,
            (Some(_), false) => GateState::Gated,
            (Some(_), true) => GateState::Unlocked,
        }
    }

    pub fn submit(&mut self, candidate: &str) -> Result<GateState, GateError> {
        let Some(stored) = self.credential.as_deref() else {
            return Err(GateError::Auth(AuthError::NoCredential));
        };
        if candidate != stored {
            tracing::info!("rejected settings password");
            return Err(GateError::Auth(AuthError::Mismatch));
        }
        self.unlocked = true;
        Ok(self.state())
    }

    /// Allowed when no credential exists yet or while unlocked.
    pub fn set_credential(
        &mut self,
        value: &str,
        confirmation: Option<&str>,
    ) -> Result<GateState, GateError> {
        if self.state() == GateState::Gated {
            return Err(GateError::Auth(AuthError::Required));
        }

        let mut checker = Checker::default();
        if value.is_empty() {
            checker.fail("password", "is required");
        }
        if let Some(confirm) = confirmation {
            if confirm != value {
                checker.fail("confirm_password", "does not match");
            }
        }
        checker.finish(())?;

        self.storage.save_text(PASSWORD_KEY, value)?;
        self.credential = Some(value.to_string());
        tracing::info!(state = %self.state(), "settings password updated");
        Ok(self.state())
    }

    pub fn lock(&mut self) -> GateState {
        self.unlocked = false;
        self.state()
    }

    pub fn require_unlocked(&self) -> Result<(), AuthError> {
        match self.state() {
            GateState::Unlocked => Ok(()),
            GateState::Locked => Err(AuthError::NoCredential),
            GateState::Gated => Err(AuthError::Required),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    NoCredential,
    Mismatch,
    Required,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NoCredential => f.write_str("no settings password has been set"),
            AuthError::Mismatch => f.write_str("incorrect password"),
            AuthError::Required => f.write_str("settings are locked; unlock with the password first"),
        }
    }
}

impl Error for AuthError {}

#[derive(Debug)]
pub enum GateError {
    Auth(AuthError),
    Validation(ValidationError),
    Storage(StorageError),
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Auth(err) => write!(f, "{}", err),
            GateError::Validation(err) => write!(f, "{}", err),
            GateError::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl Error for GateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GateError::Auth(err) => Some(err),
            GateError::Validation(err) => Some(err),
            GateError::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for GateError {
    fn from(value: ValidationError) -> Self {
        GateError::Validation(value)
    }
}

impl From<StorageError> for GateError {
    fn from(value: StorageError) -> Self {
        GateError::Storage(value)
    }
}
