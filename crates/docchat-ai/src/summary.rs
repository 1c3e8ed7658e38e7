//! One-shot document summarization.
//!
//! Independent of any chat session: a single non-streaming request
//! carrying every document payload plus a fixed instruction.

use tracing::debug;

use crate::{ChatError, DocumentPayload, GenerativeClient, Message};

/// Fixed instruction sent with the full document set.
pub const SUMMARY_INSTRUCTION: &str = "Provide a structured overview of the attached PDF \
    documents. Use markdown with a short introduction followed by bulleted sections covering \
    the key topics and the main findings of each document.";

/// Summarize the currently uploaded document set.
///
/// Does not touch conversational session state; failures are summary
/// failures, distinct from dispatch failures.
pub async fn summarize(
    client: &dyn GenerativeClient,
    documents: &[DocumentPayload],
) -> Result<String, ChatError> {
    debug!(documents = documents.len(), "requesting summary");

    let request = Message::user(SUMMARY_INSTRUCTION).with_attachments(documents.to_vec());

    client
        .generate(&[request])
        .await
        .map_err(ChatError::Summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{ApiError, Role};

    struct MockClient {
        calls: Mutex<Vec<Vec<Message>>>,
        reply: Result<&'static str, ()>,
    }

    impl MockClient {
        fn new(reply: Result<&'static str, ()>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    #[async_trait]
    impl GenerativeClient for MockClient {
        async fn generate(&self, messages: &[Message]) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(ApiError::Network("connection reset".to_string())),
            }
        }

        async fn generate_streaming(
            &self,
            _messages: &[Message],
            _on_delta: Box<dyn Fn(String) + Send + Sync>,
        ) -> Result<String, ApiError> {
            panic!("summary must use the non-streaming call shape");
        }
    }

    fn payloads() -> Vec<DocumentPayload> {
        vec![
            DocumentPayload::new("a.pdf", "application/pdf", 3, "YWFh"),
            DocumentPayload::new("b.pdf", "application/pdf", 3, "YmJi"),
        ]
    }

    #[tokio::test]
    async fn sends_all_documents_with_fixed_instruction() {
        let client = MockClient::new(Ok("- topic one\n- topic two"));
        let summary = summarize(&client, &payloads()).await.unwrap();
        assert_eq!(summary, "- topic one\n- topic two");

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].role, Role::User);
        assert_eq!(calls[0][0].text, SUMMARY_INSTRUCTION);
        assert_eq!(calls[0][0].attachments.len(), 2);
    }

    #[tokio::test]
    async fn failure_maps_to_summary_error() {
        let client = MockClient::new(Err(()));
        let err = summarize(&client, &payloads()).await.unwrap_err();
        assert!(matches!(err, ChatError::Summary(_)));
    }
}
