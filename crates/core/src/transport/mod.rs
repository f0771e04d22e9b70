pub mod error;
pub mod http;

use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

/// Raw body chunks of one analysis stream, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = anyhow::Result<Vec<u8>>> + Send>>;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub user_message: String,
}

impl AnalyzeRequest {
    pub fn for_ticker(ticker: &str) -> Self {
        Self {
            user_message: format!("Analyze {ticker} stock"),
        }
    }
}

#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submits one analysis request and returns its event-stream body.
    async fn open_stream(&self, request: AnalyzeRequest) -> anyhow::Result<ChunkStream>;
}
