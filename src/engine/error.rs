// SPDX-License-Identifier: MIT

//! Typed error handling for rulekit-rs
//!
//! Registry-level failures (`InvalidInput`, `RuleNotFound`) are returned to the
//! caller. Condition-level faults are produced while checking a single leaf and
//! are folded into a `false` result by the evaluator.

use thiserror::Error;

/// Top-level error type for rulekit-rs
#[derive(Debug, Error)]
pub enum RuleError {
    /// Missing or empty rule name/text, or an unsupported combine operator
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A rule name that is not present in the registry
    #[error("Rule '{name}' does not exist.")]
    RuleNotFound { name: String },

    /// Condition text containing none of the supported comparison operators
    #[error("Malformed condition: '{0}'")]
    MalformedCondition(String),

    /// Condition references an attribute absent from the data record
    #[error("Attribute '{attribute}' not found in data record")]
    MissingAttribute { attribute: String },

    /// Attribute value has the wrong type for the comparison
    #[error("Attribute '{attribute}' is not {expected}")]
    TypeMismatch { attribute: String, expected: String },

    /// Right-hand side of a numeric comparison is not an integer
    #[error("Invalid integer literal: '{0}'")]
    InvalidLiteral(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl RuleError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a rule not found error
    pub fn rule_not_found(name: impl Into<String>) -> Self {
        Self::RuleNotFound { name: name.into() }
    }

    /// Create a missing attribute error
    pub fn missing_attribute(attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(attribute: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
