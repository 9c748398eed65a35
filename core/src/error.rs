//! Error types for REST-backed models.
//!
//! # Design
//! Every failure a persistence call can report lands in `ModelError`. The
//! status-carrying `Http` variant keeps the raw body for debugging, but its
//! display is the short `got a <status> response` message callers match on.
//! `Validation` and `NotSaved` are raised before any request is issued.
//!
//! `ConfigError` covers mistakes made while building a model type; those are
//! reported once, at build time, instead of on every call.

use thiserror::Error;

/// Errors returned by collection operations and instance lifecycle methods.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The server answered with a status outside `200..300`.
    #[error("got a {status} response")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The model's validator rejected the instance.
    #[error("validation failed")]
    Validation,

    /// `remove()` was called on an instance that has no primary key yet.
    #[error("not saved")]
    NotSaved,

    /// The model type was built without a persistence plugin.
    #[error("model `{0}` has no REST persistence installed")]
    NotInstalled(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ModelError {
    /// Status code of an `Http` error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// A network-level failure reported by a `Transport`.
#[derive(Debug, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Errors raised while building a model type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No base path was configured for the REST plugin.
    #[error("no base path configured for model `{0}`")]
    MissingBase(String),

    #[error("model name must not be empty")]
    EmptyName,

    #[error("primary key name must not be empty")]
    EmptyPrimaryKey,
}
