//! Conversation state: the turn list and the document-chat lifecycle.
//!
//! Lifecycle phases: no documents -> documents loaded -> session active,
//! with an awaiting-response phase while a send is in flight. A dispatch
//! failure is converted at the turn boundary into an assistant turn
//! flagged as an error; the conversation stays usable.

use docchat_ai::{
    encode_batch, summarize, DocumentError, DocumentPayload, DocumentSource, GenerativeClient,
    SessionManager,
};
use docchat_common::{ConversationTurn, Speaker};
use tracing::warn;

/// Shown in place of an answer when a dispatch fails. Any partial
/// streamed text is discarded, never surfaced.
pub const FAILURE_MESSAGE: &str =
    "Sorry, I ran into a problem while answering. Please try again.";

/// Shown in place of the summary when summarization fails.
pub const SUMMARY_FAILURE_MESSAGE: &str =
    "Sorry, the documents could not be summarized. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoDocuments,
    DocumentsLoaded,
    SessionActive,
    AwaitingResponse,
}

/// Owns the document set, the session manager, and the ordered turn list.
pub struct Conversation {
    documents: Vec<DocumentPayload>,
    manager: SessionManager,
    turns: Vec<ConversationTurn>,
    phase: Phase,
    model: String,
}

impl Conversation {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            documents: Vec::new(),
            manager: SessionManager::new(&model),
            turns: Vec::new(),
            phase: Phase::NoDocuments,
            model,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn documents(&self) -> &[DocumentPayload] {
        &self.documents
    }

    /// Validate and encode a new upload batch.
    ///
    /// A validation or read failure aborts the batch and leaves the
    /// current state untouched. On success the old session and turn list
    /// are abandoned and the lifecycle restarts at DocumentsLoaded.
    pub async fn load_documents(
        &mut self,
        sources: &[DocumentSource],
    ) -> Result<(), DocumentError> {
        let payloads = encode_batch(sources).await?;

        self.manager = SessionManager::new(&self.model);
        self.turns.clear();
        self.documents = payloads;
        self.phase = Phase::DocumentsLoaded;
        Ok(())
    }

    /// Discard everything and return to the upload state.
    pub fn reset(&mut self) {
        self.manager.reset();
        self.turns.clear();
        self.documents.clear();
        self.phase = Phase::NoDocuments;
    }

    /// Dispatch a user message, appending both the user turn and the
    /// resulting assistant turn.
    ///
    /// Failures are converted here: the returned turn carries the fixed
    /// failure message with `is_error` set, and the conversation remains
    /// usable.
    pub async fn send(
        &mut self,
        client: &dyn GenerativeClient,
        text: impl Into<String>,
        on_progress: Box<dyn Fn(String) + Send + Sync>,
    ) -> &ConversationTurn {
        let text = text.into();
        self.turns.push(ConversationTurn::new(Speaker::User, &text));
        self.phase = Phase::AwaitingResponse;

        let result = match self.manager.ensure(&self.documents) {
            Ok(session) => session.send(client, text, on_progress).await,
            Err(e) => Err(e),
        };

        let turn = match result {
            Ok(full) => ConversationTurn::new(Speaker::Assistant, full),
            Err(e) => {
                warn!("dispatch failed: {e}");
                ConversationTurn::error(FAILURE_MESSAGE)
            }
        };

        // The phase reflects the real session state: if creation itself
        // failed there is no active session to claim.
        self.phase = if self.manager.is_active() {
            Phase::SessionActive
        } else {
            Phase::DocumentsLoaded
        };
        self.turns.push(turn);
        self.turns.last().expect("turn just pushed")
    }

    /// One-shot summary of the current document set. Session state is
    /// untouched; a failure is replaced by the fixed summary failure
    /// message.
    pub async fn summarize(&self, client: &dyn GenerativeClient) -> String {
        match summarize(client, &self.documents).await {
            Ok(text) => text,
            Err(e) => {
                warn!("summary failed: {e}");
                SUMMARY_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use docchat_ai::{ApiError, Message, ACCEPTED_MIME};

    use super::*;

    /// Scripted client: each streaming call pops the next reply.
    struct MockClient {
        replies: Mutex<Vec<Result<&'static str, ()>>>,
        summary: Result<&'static str, ()>,
    }

    impl MockClient {
        fn streaming(replies: Vec<Result<&'static str, ()>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                summary: Ok("summary"),
            }
        }

        fn summarizer(summary: Result<&'static str, ()>) -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
                summary,
            }
        }
    }

    #[async_trait]
    impl GenerativeClient for MockClient {
        async fn generate(&self, _messages: &[Message]) -> Result<String, ApiError> {
            match self.summary {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(ApiError::Network("down".to_string())),
            }
        }

        async fn generate_streaming(
            &self,
            _messages: &[Message],
            on_delta: Box<dyn Fn(String) + Send + Sync>,
        ) -> Result<String, ApiError> {
            let mut replies = self.replies.lock().unwrap();
            match replies.remove(0) {
                Ok(text) => {
                    on_delta(text.to_string());
                    Ok(text.to_string())
                }
                Err(()) => {
                    on_delta("Hel".to_string());
                    Err(ApiError::Network("connection reset".to_string()))
                }
            }
        }
    }

    fn sources() -> Vec<DocumentSource> {
        vec![DocumentSource::from_bytes(
            "report.pdf",
            ACCEPTED_MIME,
            b"%PDF".to_vec(),
        )]
    }

    fn sink() -> Box<dyn Fn(String) + Send + Sync> {
        Box::new(|_| {})
    }

    #[tokio::test]
    async fn lifecycle_phases() {
        let client = MockClient::streaming(vec![Ok("answer")]);
        let mut convo = Conversation::new("gemini-2.5-flash");
        assert_eq!(convo.phase(), Phase::NoDocuments);

        convo.load_documents(&sources()).await.unwrap();
        assert_eq!(convo.phase(), Phase::DocumentsLoaded);

        convo.send(&client, "question", sink()).await;
        assert_eq!(convo.phase(), Phase::SessionActive);
        assert_eq!(convo.turns().len(), 2);

        convo.reset();
        assert_eq!(convo.phase(), Phase::NoDocuments);
        assert!(convo.turns().is_empty());
        assert!(convo.documents().is_empty());
    }

    #[tokio::test]
    async fn invalid_batch_leaves_state_untouched() {
        let mut convo = Conversation::new("gemini-2.5-flash");
        convo.load_documents(&sources()).await.unwrap();

        let bad = vec![DocumentSource::from_bytes(
            "notes.txt",
            "text/plain",
            b"x".to_vec(),
        )];
        assert!(convo.load_documents(&bad).await.is_err());

        // Previous documents survive a rejected upload.
        assert_eq!(convo.phase(), Phase::DocumentsLoaded);
        assert_eq!(convo.documents().len(), 1);
        assert_eq!(convo.documents()[0].name, "report.pdf");
    }

    #[tokio::test]
    async fn new_batch_abandons_old_session_and_turns() {
        let client = MockClient::streaming(vec![Ok("a"), Ok("b")]);
        let mut convo = Conversation::new("gemini-2.5-flash");
        convo.load_documents(&sources()).await.unwrap();
        convo.send(&client, "q1", sink()).await;
        assert_eq!(convo.turns().len(), 2);

        convo.load_documents(&sources()).await.unwrap();
        assert!(convo.turns().is_empty());
        assert_eq!(convo.phase(), Phase::DocumentsLoaded);
    }

    #[tokio::test]
    async fn dispatch_failure_becomes_error_turn_without_partial() {
        let client = MockClient::streaming(vec![Err(()), Ok("recovered")]);
        let mut convo = Conversation::new("gemini-2.5-flash");
        convo.load_documents(&sources()).await.unwrap();

        let turn = convo.send(&client, "question", sink()).await;
        assert!(turn.is_error);
        assert_eq!(turn.text, FAILURE_MESSAGE);
        assert_eq!(turn.speaker, Speaker::Assistant);

        // Non-fatal: the next send works.
        let turn = convo.send(&client, "again", sink()).await;
        assert!(!turn.is_error);
        assert_eq!(turn.text, "recovered");
        assert_eq!(convo.turns().len(), 4);
    }

    #[tokio::test]
    async fn failed_session_creation_does_not_claim_active_phase() {
        let client = MockClient::streaming(vec![]);
        // An empty model id makes session creation fail.
        let mut convo = Conversation::new("");
        convo.load_documents(&sources()).await.unwrap();

        let turn = convo.send(&client, "question", sink()).await;
        assert!(turn.is_error);
        assert_eq!(turn.text, FAILURE_MESSAGE);
        assert_eq!(convo.phase(), Phase::DocumentsLoaded);
    }

    #[tokio::test]
    async fn summary_failure_is_replaced_by_fixed_message() {
        let mut convo = Conversation::new("gemini-2.5-flash");
        convo.load_documents(&sources()).await.unwrap();

        let client = MockClient::summarizer(Ok("- key topics"));
        assert_eq!(convo.summarize(&client).await, "- key topics");

        let client = MockClient::summarizer(Err(()));
        assert_eq!(convo.summarize(&client).await, SUMMARY_FAILURE_MESSAGE);

        // Summary never touches conversation state.
        assert!(convo.turns().is_empty());
        assert_eq!(convo.phase(), Phase::DocumentsLoaded);
    }
}
