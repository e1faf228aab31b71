use serde_json::{Map, Value};
use tokio::fs::File;

/// Encoded body of one `upload_output` call.
#[derive(Debug)]
pub enum OutputPayload {
    /// `{"<key>": value}` where key is `string`, `number` or `boolean`.
    Scalar { key: &'static str, value: Value },
    /// `{"file_url": url}`: the value references a remote file.
    FileUrl(String),
    /// Multipart body with the file under the `file` part.
    File(FileUpload),
}

/// An opened local file waiting to be streamed.
///
/// The handle is consumed by the upload and closed when it completes.
#[derive(Debug)]
pub struct FileUpload {
    pub filename: String,
    pub file: File,
}

impl OutputPayload {
    /// Form-part name used for file uploads.
    pub const FILE_PART: &'static str = "file";
    /// Content type declared for every uploaded file.
    pub const FILE_CONTENT_TYPE: &'static str = "application/octet-stream";

    /// JSON body for non-file payloads.
    pub fn json_body(&self) -> Option<Value> {
        let (key, value) = match self {
            OutputPayload::Scalar { key, value } => (*key, value.clone()),
            OutputPayload::FileUrl(url) => ("file_url", Value::String(url.clone())),
            OutputPayload::File(_) => return None,
        };
        let mut body = Map::with_capacity(1);
        body.insert(key.to_string(), value);
        Some(Value::Object(body))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OutputPayload::Scalar { .. } => "scalar",
            OutputPayload::FileUrl(_) => "file_url",
            OutputPayload::File(_) => "file",
        }
    }
}
