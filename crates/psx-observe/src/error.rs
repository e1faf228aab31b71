use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObserveError {
    #[error("unknown log format '{0}' (expected text, json or journald)")]
    UnknownFormat(String),
    #[error("journald output needs linux and the `journald` feature")]
    JournaldUnavailable,
    #[error("invalid log filter '{directive}': {reason}")]
    BadDirective { directive: String, reason: String },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}
