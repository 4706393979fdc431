//! Portal error model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the portal crates.
pub type PortalResult<T> = Result<T, PortalError>;

/// Field-level validation messages, keyed by field name.
///
/// Ordered so that rendering and test assertions are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a `Validation` error.
    pub fn into_result(self) -> PortalResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(self))
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Portal-level error.
///
/// Backend error bodies are folded into these variants once, at the gateway
/// boundary; call sites never inspect raw response fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Field-level rejection (local pre-submit checks or server 400 fields).
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Credentials rejected, or an unauthenticated/forbidden access.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Duplicate identity or other server-reported conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transport failure (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    /// A success body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Persistent or ephemeral storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl PortalError {
    /// Single-field validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(fields) => fields.to_string(),
            Self::Auth(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Network(_) => "Unable to reach the server. Please try again.".to_string(),
            Self::Http { message, .. } => message.clone(),
            Self::Decode(_) | Self::Storage(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
