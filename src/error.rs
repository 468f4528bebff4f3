//! Classified upstream errors
//!
//! The model and places clients report failures the same way: a kind that
//! callers branch on plus a message for the log and the response body. Each
//! backend supplies its own kind enum and named constructors.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError<K> {
    pub kind: K,
    pub message: String,
}

impl<K> ServiceError<K> {
    pub fn new(kind: K, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
