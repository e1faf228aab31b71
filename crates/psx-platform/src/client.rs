use std::time::Duration;

use async_trait::async_trait;
use psx_model::{ExecutionId, FieldSet, StatusReport};
use reqwest::{
    Body, Client, Response,
    header::{HeaderMap, HeaderName, HeaderValue},
    multipart::{Form, Part},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, trace};

use crate::{OutputPayload, Platform, PlatformError, routes};

/// Header carrying the pre-shared key on every request.
pub const PRESHARED_KEY_HEADER: &str = "PersoLiveServer-Preshared-Key";

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL of the control plane, e.g. `http://localhost:8000`.
    pub host: String,
    pub preshared_key: String,
    pub execution_id: ExecutionId,
    /// Per-request timeout. `None` leaves requests unbounded (the watchdog still applies).
    pub request_timeout: Option<Duration>,
}

/// HTTP binding of [`Platform`] for one execution instance.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: String,
    execution_id: ExecutionId,
}

impl PlatformClient {
    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        let name = HeaderName::from_bytes(PRESHARED_KEY_HEADER.as_bytes())
            .map_err(|_| PlatformError::InvalidKey)?;
        let mut key =
            HeaderValue::from_str(&cfg.preshared_key).map_err(|_| PlatformError::InvalidKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, key);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: cfg.host.trim_end_matches('/').to_string(),
            execution_id: cfg.execution_id.clone(),
        })
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Platform for PlatformClient {
    async fn fetch_values(&self) -> Result<FieldSet, PlatformError> {
        let url = self.url(&routes::get_values(&self.execution_id));
        debug!(%url, "fetching values");

        let response = check(self.client.get(&url).send().await?).await?;
        let body = response.bytes().await?;
        let values = FieldSet::from_slice(&body)?;

        debug!(fields = values.len(), "values fetched");
        Ok(values)
    }

    async fn update_status(&self, report: &StatusReport) -> Result<(), PlatformError> {
        report.validate()?;
        let url = self.url(&routes::update_status(&self.execution_id));
        trace!(%url, ?report, "sending status report");

        check(self.client.post(&url).json(report).send().await?).await?;
        Ok(())
    }

    async fn upload_output(
        &self,
        field_name: &str,
        payload: OutputPayload,
    ) -> Result<(), PlatformError> {
        let url = self.url(&routes::upload_output(&self.execution_id, field_name));
        debug!(%url, field = %field_name, kind = payload.kind(), "uploading output");

        let request = match payload {
            OutputPayload::File(upload) => {
                let stream = ReaderStream::new(upload.file);
                let part = Part::stream(Body::wrap_stream(stream))
                    .file_name(upload.filename)
                    .mime_str(OutputPayload::FILE_CONTENT_TYPE)?;
                let form = Form::new().part(OutputPayload::FILE_PART, part);
                self.client.post(&url).multipart(form)
            }
            other => {
                let body = other.json_body().unwrap_or_default();
                self.client.post(&url).json(&body)
            }
        };

        check(request.send().await?).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::Status {
        status: status.as_u16(),
        body,
    })
}
