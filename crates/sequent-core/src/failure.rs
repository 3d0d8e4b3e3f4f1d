//! Structured failure payloads
//!
//! A [`Failure`] is the domain-error channel of an [`Outcome`](crate::Outcome):
//! a string-like `code` used as the dispatch key by the failure dispatcher, a
//! human-readable `message`, and an optional opaque `cause` captured at a host
//! boundary. Failures are plain values; they are never panicked and always
//! propagate by short-circuit.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Catch-all code assigned to failures captured at a host boundary.
pub const UNKNOWN_FAILURE: &str = "UNKNOWN_FAILURE";

/// Opaque cause attached to a failure captured from a host-level error.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Structured error payload carried on the failure channel.
///
/// `code` uniqueness is a per-call-site convention; nothing enforces it.
/// Equality compares `code` and `message` only, so failures carrying
/// non-comparable causes still work with assertions and dispatch tests.
#[derive(Clone, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct Failure {
    code: Cow<'static, str>,
    message: String,
    cause: Option<Cause>,
}

impl Failure {
    /// Create a failure from a code and message.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Create a failure that retains the originating opaque cause.
    pub fn with_cause(
        code: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        cause: Cause,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            cause: Some(cause),
        }
    }

    /// Capture a host-level error under the [`UNKNOWN_FAILURE`] code.
    ///
    /// The message is the rendered cause and the cause itself is retained.
    pub fn unknown(cause: Cause) -> Self {
        let message = cause.to_string();
        Self::with_cause(UNKNOWN_FAILURE, message, cause)
    }

    /// Build an [`UNKNOWN_FAILURE`] from a bare message, with no cause.
    pub fn unknown_message(message: String) -> Self {
        Self::new(UNKNOWN_FAILURE, message)
    }

    /// The dispatch key.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The opaque cause captured at a host boundary, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Replace the message, keeping code and cause.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Serialized rendering used by fatal `expect` diagnostics.
    pub fn serialized(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.message == other.message
    }
}

impl Eq for Failure {}

impl Serialize for Failure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Failure", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("cause", &self.cause.as_ref().map(|c| c.to_string()))?;
        state.end()
    }
}

/// Error type standing in for a panic payload captured at a host boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PanicCause(pub String);

impl PanicCause {
    /// Render a panic payload into a usable cause.
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        Self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn display_includes_code_and_message() {
        let failure = Failure::new("ERROR", "something broke");
        assert_eq!(failure.to_string(), "[ERROR] something broke");
    }

    #[test]
    fn unknown_renders_cause_as_message() {
        let failure = Failure::unknown(Arc::new(Boom));
        assert_eq!(failure.code(), UNKNOWN_FAILURE);
        assert_eq!(failure.message(), "boom");
        assert!(failure.cause().is_some());
    }

    #[test]
    fn equality_ignores_cause() {
        let plain = Failure::new(UNKNOWN_FAILURE, "boom");
        let caused = Failure::unknown(Arc::new(Boom));
        assert_eq!(plain, caused);
    }

    #[test]
    fn serialized_form_is_json() {
        let failure = Failure::new("ERROR", "boom");
        let json: serde_json::Value =
            serde_json::from_str(&failure.serialized()).expect("valid json");
        assert_eq!(json["code"], "ERROR");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["cause"], serde_json::Value::Null);
    }
}
