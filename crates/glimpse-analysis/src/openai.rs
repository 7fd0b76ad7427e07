use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;

use crate::request::ChatRequest;
use crate::stream::{DeltaStream, delta_stream};
use crate::{AnalysisError, AnalysisRequest, ProviderMetadata, VisionProvider};

/// Any endpoint speaking the OpenAI chat-completions streaming protocol
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_url: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            model,
            max_tokens,
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiCompatibleProvider {
    async fn analyze(&self, request: AnalysisRequest) -> Result<DeltaStream, AnalysisError> {
        if request.api_key.trim().is_empty() {
            return Err(AnalysisError::MissingCredential);
        }

        let body = ChatRequest::vision(&self.model, &request.prompt, &request.png, self.max_tokens);
        tracing::debug!(
            "Requesting analysis from {} ({}, {} byte image)",
            self.api_url,
            self.model,
            request.png.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(request.api_key.trim())
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AnalysisError::RateLimited);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AnalysisError::Authentication);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("unreadable body: {}", e));
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(delta_stream(response.bytes_stream()))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "OpenAI-compatible".to_string(),
            model: self.model.clone(),
            requires_api_key: true,
        }
    }
}
