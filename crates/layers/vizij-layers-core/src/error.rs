//! Error types for the layer stack and its states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Layer,
    Animation,
    State,
}

impl EntityKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Layer => "layer",
            Self::Animation => "animation",
            Self::State => "state",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by tweens, states, layers and the layer stack.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// A value, easing result or construction argument was rejected.
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// Unknown layer, animation or state name.
    #[error("No {kind} named {name:?}")]
    NotFound { kind: EntityKind, name: String },

    /// The request is valid but cannot be applied to the target.
    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },
}

impl AnimationError {
    #[inline]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    #[inline]
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "lookup",
            Self::InvalidOperation { .. } => "operation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        let err = AnimationError::not_found(EntityKind::Layer, "Face");
        assert_eq!(err.to_string(), "No layer named \"Face\"");
        assert_eq!(err.category(), "lookup");
    }

    #[test]
    fn errors_round_trip_through_json() {
        let err = AnimationError::validation("weight is NaN");
        let json = serde_json::to_string(&err).unwrap();
        let back: AnimationError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
