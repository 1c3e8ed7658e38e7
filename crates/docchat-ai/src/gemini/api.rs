//! GenerativeClient trait implementation for GeminiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{ApiError, GenerativeClient, Message};

use super::client::GeminiClient;

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, messages: &[Message]) -> Result<String, ApiError> {
        let body = self.build_request_body(messages);
        let url = self.api_url(false);

        debug!(model = %self.config.model, "Gemini API request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("HTTP {status}: {text}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        self.parse_response(json)
    }

    async fn generate_streaming(
        &self,
        messages: &[Message],
        on_delta: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<String, ApiError> {
        let body = self.build_request_body(messages);
        let url = format!("{}?alt=sse", self.api_url(true));

        debug!(model = %self.config.model, "Gemini API streaming request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("HTTP {status}: {text}")));
        }

        let mut full_content = String::new();

        parse_sse_stream(response, |event: SseEvent| {
            let mut chunk = String::new();

            if let Ok(data) = serde_json::from_str::<serde_json::Value>(&event.data) {
                if let Some(candidates) = data["candidates"].as_array() {
                    for candidate in candidates {
                        if let Some(parts) = candidate["content"]["parts"].as_array() {
                            for part in parts {
                                if let Some(t) = part["text"].as_str() {
                                    if !t.is_empty() {
                                        chunk.push_str(t);
                                        full_content.push_str(t);
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if !chunk.is_empty() {
                on_delta(chunk);
            }
        })
        .await?;

        Ok(full_content)
    }
}
