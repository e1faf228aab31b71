use psx_model::FieldType;
use psx_platform::PlatformError;
use thiserror::Error;

/// Everything that can end a run with a FAILED report.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to fetch values: {0}")]
    Fetch(#[source] PlatformError),
    #[error("output validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to upload output '{field}': {source}")]
    Upload {
        field: String,
        #[source]
        source: UploadError,
    },
    #[error("{0}")]
    Task(#[from] TaskError),
    #[error("failed to report to control plane: {0}")]
    Report(#[source] PlatformError),
}

/// Error raised by a task implementation.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{reason}")]
    Fail { reason: String },
    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task was cancelled")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TaskError {
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for TaskError {
    fn from(err: tokio::task::JoinError) -> Self {
        if !err.is_panic() {
            return TaskError::Cancelled;
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        TaskError::Panicked(message)
    }
}

/// A produced output that does not match the declared schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field name '{field}' not found in output keys: {declared}")]
    UnknownOutput { field: String, declared: String },
    #[error("missing required output fields: {}", .0.join(", "))]
    MissingOutputs(Vec<String>),
    #[error("field name '{0}' not found in values")]
    UnknownField(String),
    #[error("field name '{0}' is not an output field")]
    NotAnOutput(String),
    #[error("value for field '{field}' must be a {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("file '{value}' for field '{field}' is neither a local file nor a valid URL")]
    FileNotFound { field: String, value: String },
    #[error("file '{value}' for field '{field}' cannot be opened: {reason}")]
    FileUnreadable {
        field: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn mismatch(field: &str, expected: FieldType, found: &'static str) -> Self {
        let expected = match expected {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::File => "file path or URL",
        };
        ValidationError::TypeMismatch {
            field: field.to_string(),
            expected,
            found,
        }
    }
}

/// Failure while encoding or submitting one output.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("cannot open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
