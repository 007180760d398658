use crate::config::Settings;
use crate::models::{PredictionResult, SelectedFile};
use reqwest::StatusCode;
use reqwest::blocking::{Client, multipart};
use std::path::PathBuf;
use thiserror::Error;

pub const UPLOAD_FIELD: &str = "file";
pub const TSV_MIME: &str = "text/tab-separated-values";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("unsupported file type: {} (expected .tsv or .txt)", .path.display())]
    UnsupportedFile { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to prediction service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("prediction service answered {0}")]
    Status(StatusCode),
    #[error("malformed prediction response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UploadError {
    /// Failures that happen after a request was started and clear the current result.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            UploadError::Read { .. }
                | UploadError::Transport(_)
                | UploadError::Status(_)
                | UploadError::Decode(_)
        )
    }
}

pub trait PredictionClient: Send + Sync {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, UploadError>;
}

pub struct HttpPredictionClient {
    http: Client,
    endpoint: String,
}

impl HttpPredictionClient {
    pub fn new(settings: &Settings) -> Result<Self, UploadError> {
        let http = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self::with_client(http, &settings.endpoint))
    }

    pub fn with_client(http: Client, endpoint: &str) -> Self {
        HttpPredictionClient {
            http,
            endpoint: endpoint.to_string(),
        }
    }
}

impl PredictionClient for HttpPredictionClient {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, UploadError> {
        let contents = std::fs::read(&file.path).map_err(|source| UploadError::Read {
            path: file.path.clone(),
            source,
        })?;
        tracing::debug!(file = %file.file_name, bytes = contents.len(), "read upload");

        let part = multipart::Part::bytes(contents)
            .file_name(file.file_name.clone())
            .mime_str(TSV_MIME)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self.http.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status));
        }

        let body = response.bytes()?;
        let result = PredictionResult::from_slice(&body)?;
        tracing::debug!(shape = result.shape(), %status, "decoded prediction response");
        Ok(result)
    }
}
