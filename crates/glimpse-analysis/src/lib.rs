mod openai;
mod request;
mod session;
mod sse;
mod stream;

pub use openai::OpenAiCompatibleProvider;
pub use request::{ChatRequest, DEFAULT_MAX_TOKENS, png_data_url};
pub use session::{AnalysisSession, SessionState, analyze};
pub use sse::{DecodeStats, SseDecoder, SseItem};
pub use stream::{DeltaStream, StreamEvent, delta_stream};

/// One screenshot plus the question to ask about it
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub png: Vec<u8>,
    pub prompt: String,
    pub api_key: String,
}

/// Vision model provider interface
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send the request and return the response as a lazy stream of deltas
    async fn analyze(&self, request: AnalysisRequest) -> Result<DeltaStream, AnalysisError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No API key configured")]
    MissingCredential,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Authentication error")]
    Authentication,
}
