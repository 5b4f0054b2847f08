//! Typed error kinds for the settings layer
//!
//! Validation failures never leave the menu layer; load failures degrade
//! to defaults; apply failures are isolated per setting. Only a failed
//! reboot ends the session.

use thiserror::Error;

/// A value outside the setting's declared domain. Recoverable: the
/// operator is re-prompted for the same field.
#[derive(Debug, Error)]
#[error("invalid value for '{id}': {reason}")]
pub struct ValidationError {
    pub id: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(id: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// The device configuration could not be read at startup. Recoverable:
/// every setting falls back to its documented default.
#[derive(Debug, Error)]
#[error("reading device configuration failed: {cause}")]
pub struct LoadError {
    pub cause: anyhow::Error,
}

impl LoadError {
    pub fn new(cause: anyhow::Error) -> Self {
        Self { cause }
    }
}

/// An external mechanism failed for one setting. Recoverable and isolated:
/// other settings are unaffected and the failed one stays pending.
#[derive(Debug, Error)]
#[error("applying '{id}' failed: {cause}")]
pub struct ApplyError {
    pub id: &'static str,
    pub cause: anyhow::Error,
}

/// The reboot mechanism itself failed. Fatal to the session.
#[derive(Debug, Error)]
#[error("reboot failed: {cause}")]
pub struct RebootError {
    pub cause: anyhow::Error,
}
