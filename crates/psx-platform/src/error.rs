use psx_model::{ReportError, SchemaError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("control plane responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid value set: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid status report: {0}")]
    Report(#[from] ReportError),

    #[error("invalid preshared key: not a valid header value")]
    InvalidKey,
}

impl PlatformError {
    /// HTTP status of a rejected call, if the failure came from the control plane.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Status { status, .. } => Some(*status),
            PlatformError::HttpRequest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
