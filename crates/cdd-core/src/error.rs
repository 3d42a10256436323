//! # Error Types
//!
//! Errors raised by the core domain types. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Scoring itself never fails: missing data degrades to zero contributions.
//! The only failures at this layer are malformed identifiers and selections
//! that do not exist in the catalog.

use thiserror::Error;

/// Top-level error type for the core domain.
#[derive(Error, Debug)]
pub enum CddError {
    /// An identifier could not be parsed.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Identifier namespace (client, question, ...).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A question referenced by id is not in the catalog.
    #[error("question {0} is not in the catalog")]
    UnknownQuestion(u64),

    /// The selected option text is not one of the question's options.
    #[error("question {question} has no option {option:?}")]
    UnknownOption {
        /// Question the selection was made on.
        question: u64,
        /// Option text that was not found.
        option: String,
    },

    /// An unrecognised enumeration value.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// Enumeration name.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
