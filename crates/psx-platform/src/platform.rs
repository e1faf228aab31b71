use async_trait::async_trait;
use psx_model::{FieldSet, StatusReport};
use tracing::info;

use crate::{OutputPayload, PlatformError};

/// The three remote calls the agent makes against the control plane.
///
/// Implementations must surface non-2xx responses as errors and must not retry.
#[async_trait]
pub trait Platform: Send + Sync {
    /// `GET values`: the declared fields of this execution instance.
    async fn fetch_values(&self) -> Result<FieldSet, PlatformError>;

    /// `POST update_status` with a log line, a status transition, or both.
    async fn update_status(&self, report: &StatusReport) -> Result<(), PlatformError>;

    /// `POST upload_output/{field_name}`.
    async fn upload_output(
        &self,
        field_name: &str,
        payload: OutputPayload,
    ) -> Result<(), PlatformError>;

    /// Echo `message` to the local log and send it as a log-only report.
    async fn report_log(&self, message: &str) -> Result<(), PlatformError> {
        info!("{}", message);
        self.update_status(&StatusReport::log(message)).await
    }
}
