//! Error types for bank ingestion and answer submission.
//!
//! Malformed records are rejected when the bank is loaded so that scoring
//! never sees an option list of the wrong size or an unresolvable answer key.

use thiserror::Error;

/// A question record that cannot be normalized into a four-option question
/// with a single correct index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    /// The record does not carry exactly four options.
    #[error("{location}: expected 4 options, found {found}")]
    WrongOptionCount { location: String, found: usize },

    /// The numeric answer key is outside 0..4 (the parser emits -1 for
    /// passages whose key could not be read).
    #[error("{location}: answer index {index} is out of range 0..4")]
    AnswerOutOfRange { location: String, index: i64 },

    /// The literal answer key matches none of the options.
    #[error("{location}: answer {answer:?} does not match any option")]
    UnknownLiteral { location: String, answer: String },

    /// Neither `answer` nor `correct` is present.
    #[error("{location}: missing answer key")]
    MissingAnswer { location: String },
}

impl DataError {
    pub fn location(&self) -> &str {
        match self {
            DataError::WrongOptionCount { location, .. }
            | DataError::AnswerOutOfRange { location, .. }
            | DataError::UnknownLiteral { location, .. }
            | DataError::MissingAnswer { location } => location,
        }
    }
}

/// Errors raised by the live session for requests that name something the
/// session does not contain. Replayed answers are not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),

    #[error("option {0} is out of range 0..4")]
    OptionOutOfRange(usize),
}
