use thiserror::Error;

use crate::MAX_FIELDS;

/// Structural problems with the value set returned by the control plane.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("value set must not be empty")]
    Empty,
    #[error("value set too long: {0} entries (max {MAX_FIELDS})")]
    TooMany(usize),
    #[error("duplicate field name: {0}")]
    DuplicateField(String),
    #[error("malformed value set: {0}")]
    Malformed(String),
}

/// A status report that must never be sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("at least one of log or status must be provided")]
    Empty,
    #[error("failure_reason must be provided when status is FAILED")]
    MissingFailureReason,
    #[error("failure_reason must be absent when status is {0}")]
    UnexpectedFailureReason(String),
}
