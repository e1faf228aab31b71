use serde::{Deserialize, Serialize};

/// Lifecycle status of an execution instance as seen by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Accepted but not started.
    Pending,
    /// Currently executing.
    Running,
    /// Finished and all outputs uploaded.
    Success,
    /// Finished with an error.
    Failed,
}

impl Status {
    /// Returns `true` if no further transition is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success | Status::Failed)
    }

    /// Returns `true` if the execution is still pending or running.
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Pending | Status::Running)
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Running => "RUNNING",
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
        }
    }
}

/// Why an execution ended in [`Status::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    InputValidationError,
    ServerError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InputValidationError => "INPUT_VALIDATION_ERROR",
            FailureReason::ServerError => "SERVER_ERROR",
        }
    }
}
