//! Explicit result type for calls into external AI collaborators.
//!
//! An embedding or generation failure never aborts an operation. Instead the
//! caller receives [`Outcome::Degraded`] carrying a deterministic fallback
//! payload plus the reason, so tests can tell a genuine answer from a
//! substituted one without intercepting errors.

use serde::{Deserialize, Serialize};

/// The value produced by a collaborator call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The collaborator answered.
    Success { value: T },
    /// The collaborator failed; `value` is the fixed fallback.
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self::Success { value }
    }

    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Success { value } | Self::Degraded { value, .. } => value,
        }
    }

    /// The failure reason, if degraded.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Success { value } | Self::Degraded { value, .. } => value,
        }
    }

    /// Split into the payload and the optional failure reason.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Self::Success { value } => (value, None),
            Self::Degraded { value, reason } => (value, Some(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_reason() {
        let outcome = Outcome::success(3);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.reason(), None);
        assert_eq!(outcome.into_value(), 3);
    }

    #[test]
    fn degraded_keeps_fallback_and_reason() {
        let outcome = Outcome::degraded(vec![0.0f32; 4], "connection refused");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value().len(), 4);
        let (value, reason) = outcome.into_parts();
        assert!(value.iter().all(|x| *x == 0.0));
        assert_eq!(reason.as_deref(), Some("connection refused"));
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_string(&Outcome::degraded(1, "down")).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("\"reason\":\"down\""));
    }
}
