//! Label store error taxonomy
//!
//! Every store operation fails with one of three kinds. Callers decide per
//! operation which kinds are fatal: a `NotFound` on label removal is an
//! expected outcome, anywhere else it is a real failure.

use thiserror::Error;

/// Errors returned by [`LabelStore`](crate::LabelStore) implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network, authentication, rate limit or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The addressed label, issue or repository does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource already exists (e.g. creating a label twice)
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    /// Classify an HTTP status code returned by the platform
    ///
    /// 422 covers every validation failure; only `already_exists` is a
    /// conflict, the rest are rejected requests.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => StoreError::NotFound(message),
            409 => StoreError::Conflict(message),
            422 if message.contains(ALREADY_EXISTS) => StoreError::Conflict(message),
            _ => StoreError::Transport(format!("HTTP {}: {}", status, message)),
        }
    }
}

const ALREADY_EXISTS: &str = "already_exists";

impl From<octocrab::Error> for StoreError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                // "Validation Failed" carries the reason in errors[].code
                let already_exists = source.errors.iter().flatten().any(|e| {
                    e.get("code").and_then(|code| code.as_str()) == Some(ALREADY_EXISTS)
                });
                if status == 422 && already_exists {
                    StoreError::Conflict(source.message.clone())
                } else {
                    StoreError::from_status(status, source.message.clone())
                }
            }
            _ => StoreError::Transport(err.to_string()),
        }
    }
}
