//! Encoding and submission of validated outputs.
use std::io::ErrorKind;
use std::path::Path;

use psx_model::FieldSpec;
use psx_platform::{FileUpload, OutputPayload, Platform};
use serde_json::Value;
use tokio::fs::File;
use tracing::{debug, info};

use crate::UploadError;

/// Filename sent when none can be derived from the local path.
pub const DEFAULT_FILENAME: &str = "default_filename";

/// Encode `value` for `field` and submit it.
///
/// `value` must already have passed [`validate`](crate::validate::validate).
pub async fn upload(
    platform: &dyn Platform,
    field: &FieldSpec,
    value: Value,
) -> Result<(), UploadError> {
    let payload = encode(field, value).await?;
    debug!(field = %field.name, kind = payload.kind(), "output encoded");

    platform.upload_output(&field.name, payload).await?;
    info!(field = %field.name, "output uploaded");
    Ok(())
}

/// Build the upload body for one output.
///
/// Scalars become `{"string"|"number"|"boolean": value}`. A FILE value is opened
/// as a local file and streamed; if no such file exists it is sent as
/// `{"file_url": value}`.
pub async fn encode(field: &FieldSpec, value: Value) -> Result<OutputPayload, UploadError> {
    if let Some(key) = field.field_type.upload_key() {
        return Ok(OutputPayload::Scalar { key, value });
    }

    let reference = match value {
        Value::String(s) => s,
        other => other.to_string(),
    };
    match File::open(&reference).await {
        Ok(file) => Ok(OutputPayload::File(FileUpload {
            filename: file_name(&reference),
            file,
        })),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(OutputPayload::FileUrl(reference)),
        Err(source) => Err(UploadError::Io {
            path: reference,
            source,
        }),
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map_or_else(|| DEFAULT_FILENAME.to_string(), str::to_string)
}
