//! Gemini API client struct, request building, and response parsing.

use crate::{ApiError, Message, Role};

use super::config::GeminiConfig;

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(300))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub(crate) fn api_url(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!("{}/{}:{}", GEMINI_API_BASE, self.config.model, method)
    }

    /// Build the JSON request body for the Gemini API.
    ///
    /// Each message's attachments become `inline_data` parts ahead of its
    /// text part. System messages go into `systemInstruction`, not
    /// `contents`.
    pub(crate) fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        let mut contents = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
                Role::System => continue, // handled via systemInstruction
            };

            let mut parts = Vec::new();
            for doc in &msg.attachments {
                parts.push(serde_json::json!({
                    "inline_data": {
                        "mime_type": doc.mime_type,
                        "data": doc.data,
                    }
                }));
            }
            parts.push(serde_json::json!({ "text": msg.text }));

            contents.push(serde_json::json!({
                "role": role,
                "parts": parts,
            }));
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
                "temperature": self.config.temperature,
            }
        });

        // System instruction
        for msg in messages {
            if msg.role == Role::System {
                body["systemInstruction"] = serde_json::json!({
                    "parts": [{ "text": msg.text }]
                });
                break;
            }
        }

        body
    }

    /// Parse a non-streaming Gemini response into its text.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<String, ApiError> {
        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| ApiError::Parse("no candidates in response".to_string()))?;

        let first = candidates
            .first()
            .ok_or_else(|| ApiError::Parse("empty candidates".to_string()))?;

        let parts = first["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut content = String::new();
        for part in &parts {
            if let Some(text) = part["text"].as_str() {
                content.push_str(text);
            }
        }

        Ok(content)
    }
}
