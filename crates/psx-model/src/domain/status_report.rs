use serde::Serialize;

use crate::{FailureReason, ReportError, Status};

/// Body of an `update_status` call.
///
/// Carries a log line, a status transition, or both. Construct through
/// [`StatusReport::log`], [`StatusReport::status`], [`StatusReport::failed`] or
/// [`StatusReport::try_new`]; all of them uphold [`StatusReport::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_reason: Option<FailureReason>,
}

impl StatusReport {
    /// Log-only report.
    pub fn log(message: impl Into<String>) -> Self {
        Self {
            log: Some(message.into()),
            status: None,
            failure_reason: None,
        }
    }

    /// Transition to a non-failed status.
    ///
    /// Use [`StatusReport::failed`] for [`Status::Failed`]; passing it here is rejected.
    pub fn status(status: Status) -> Result<Self, ReportError> {
        Self::try_new(None, Some(status), None)
    }

    /// Transition to [`Status::Failed`] with the given reason.
    pub fn failed(reason: FailureReason) -> Self {
        Self {
            log: None,
            status: Some(Status::Failed),
            failure_reason: Some(reason),
        }
    }

    /// Build a report from raw parts, checking every payload rule.
    pub fn try_new(
        log: Option<String>,
        status: Option<Status>,
        failure_reason: Option<FailureReason>,
    ) -> Result<Self, ReportError> {
        let report = Self {
            log,
            status,
            failure_reason,
        };
        report.validate()?;
        Ok(report)
    }

    /// Check the payload rules:
    /// - at least one of log or status;
    /// - failure reason present iff status is FAILED.
    pub fn validate(&self) -> Result<(), ReportError> {
        let has_log = self.log.as_deref().is_some_and(|l| !l.is_empty());
        if !has_log && self.status.is_none() {
            return Err(ReportError::Empty);
        }
        match (self.status, self.failure_reason) {
            (Some(Status::Failed), None) => Err(ReportError::MissingFailureReason),
            (Some(Status::Failed), Some(_)) => Ok(()),
            (status, Some(_)) => Err(ReportError::UnexpectedFailureReason(
                status.map_or("absent", |s| s.as_str()).to_string(),
            )),
            (_, None) => Ok(()),
        }
    }

    pub fn log_message(&self) -> Option<&str> {
        self.log.as_deref()
    }

    pub fn status_value(&self) -> Option<Status> {
        self.status
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure_reason
    }
}
