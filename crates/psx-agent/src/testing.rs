use std::sync::Mutex;

use async_trait::async_trait;
use psx_model::{FailureReason, FieldSet, SchemaError, Status, StatusReport};
use psx_platform::{OutputPayload, Platform, PlatformError};
use serde_json::Value;
use tokio::io::AsyncReadExt;

/// One call observed by [`RecordingPlatform`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Log(String),
    Status(Status, Option<FailureReason>),
    Upload { field: String, body: Value },
    UploadFile {
        field: String,
        filename: String,
        bytes: Vec<u8>,
    },
}

/// In-memory control plane that records every call in order.
pub struct RecordingPlatform {
    pub values: Result<FieldSet, SchemaError>,
    pub fail_uploads: bool,
    pub fail_reports: bool,
    pub calls: Mutex<Vec<Recorded>>,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self {
            values: Err(SchemaError::Empty),
            fail_uploads: false,
            fail_reports: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingPlatform {
    pub fn with_values(values: FieldSet) -> Self {
        Self {
            values: Ok(values),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Log(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Recorded::Upload { .. } | Recorded::UploadFile { .. }))
            .count()
    }

    fn record(&self, call: Recorded) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected() -> PlatformError {
    PlatformError::Status {
        status: 503,
        body: "unavailable".into(),
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn fetch_values(&self) -> Result<FieldSet, PlatformError> {
        self.values.clone().map_err(PlatformError::from)
    }

    async fn update_status(&self, report: &StatusReport) -> Result<(), PlatformError> {
        report.validate()?;
        if self.fail_reports {
            return Err(rejected());
        }
        if let Some(log) = report.log_message() {
            self.record(Recorded::Log(log.to_string()));
        }
        if let Some(status) = report.status_value() {
            self.record(Recorded::Status(status, report.failure_reason()));
        }
        Ok(())
    }

    async fn upload_output(
        &self,
        field_name: &str,
        payload: OutputPayload,
    ) -> Result<(), PlatformError> {
        if self.fail_uploads {
            return Err(rejected());
        }
        let call = match payload {
            OutputPayload::File(mut upload) => {
                let mut bytes = Vec::new();
                upload.file.read_to_end(&mut bytes).await.unwrap();
                Recorded::UploadFile {
                    field: field_name.to_string(),
                    filename: upload.filename,
                    bytes,
                }
            }
            other => Recorded::Upload {
                field: field_name.to_string(),
                body: other.json_body().unwrap(),
            },
        };
        self.record(call);
        Ok(())
    }
}
