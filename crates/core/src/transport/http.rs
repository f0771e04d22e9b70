use crate::config::Settings;
use crate::transport::error::TransportError;
use crate::transport::{AnalysisBackend, AnalyzeRequest, ChunkStream};
use anyhow::Context;
use futures::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT};
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_STREAM_PATH: &str = "/api/analyze/stream";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Streams analysis events from the pipeline's SSE endpoint.
///
/// Only the connect phase has a timeout: a full analysis can run for many
/// minutes and the body is read for as long as the server keeps it open.
#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    http: reqwest::Client,
    base_url: String,
    stream_path: String,
}

impl HttpAnalysisBackend {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let stream_path = settings
            .stream_path
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STREAM_PATH.to_string());
        let connect_timeout_secs = settings
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .context("failed to build analysis stream http client")?;

        Ok(Self {
            http,
            base_url,
            stream_path,
        })
    }

    pub fn url(&self) -> String {
        let path = if self.stream_path.starts_with('/') {
            self.stream_path.clone()
        } else {
            format!("/{}", self.stream_path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    fn name(&self) -> &'static str {
        "http_event_stream"
    }

    async fn open_stream(&self, request: AnalyzeRequest) -> anyhow::Result<ChunkStream> {
        let url = self.url();
        tracing::debug!(%url, user_message = %request.user_message, "opening analysis stream");

        let res = self
            .http
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::connect(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::status(status.as_u16()).into());
        }

        let body = res.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| anyhow::Error::from(TransportError::read(e.to_string())))
        });
        Ok(Box::pin(body))
    }
}
