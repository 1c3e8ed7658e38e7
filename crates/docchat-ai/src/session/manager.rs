//! ChatSession struct and the get-or-create SessionManager.

use std::sync::atomic::AtomicBool;

use tracing::debug;

use crate::{ApiError, ChatError, DocumentPayload, Message, Role};

/// Fixed system instruction for every chat session. The assistant is
/// scoped to the supplied documents and must say when they do not contain
/// the answer.
pub const SYSTEM_INSTRUCTION: &str = "You are a document analysis assistant. Answer questions \
    using only the content of the PDF documents provided in this conversation. If the documents \
    do not contain the information needed to answer, say so explicitly instead of guessing. \
    Format answers as structured markdown (headings, bullet points, tables) when it improves \
    readability.";

/// A conversational session bound to a model identifier, the fixed system
/// instruction, and one document set.
///
/// Documents are attached to the first message sent through the session
/// and never again: the pending set is taken on first dispatch, so
/// re-attachment is impossible by construction.
#[derive(Debug)]
pub struct ChatSession {
    /// Opaque handle identity, stable for the session's lifetime.
    pub(super) id: String,
    /// Model this session is bound to.
    pub(super) model: String,
    /// Conversation message history (user/assistant only).
    pub(super) messages: Vec<Message>,
    /// Documents awaiting the first dispatch. `None` once consumed.
    pub(super) pending_documents: Option<Vec<DocumentPayload>>,
    /// Whether a send is currently in flight.
    pub(super) busy: AtomicBool,
}

impl ChatSession {
    fn new(model: impl Into<String>, documents: Vec<DocumentPayload>) -> Self {
        Self {
            id: docchat_common::new_id(),
            model: model.into(),
            messages: Vec::new(),
            pending_documents: Some(documents),
            busy: AtomicBool::new(false),
        }
    }

    /// Opaque session identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The full conversation history, system instruction excluded.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// True until the first message has been dispatched.
    pub fn documents_pending(&self) -> bool {
        self.pending_documents.is_some()
    }

    pub(super) fn build_messages(&self) -> Vec<Message> {
        let mut msgs = Vec::with_capacity(self.messages.len() + 1);
        msgs.push(Message {
            role: Role::System,
            text: SYSTEM_INSTRUCTION.to_string(),
            attachments: Vec::new(),
        });
        msgs.extend(self.messages.iter().cloned());
        msgs
    }
}

/// Owns at most one live [`ChatSession`] per document set.
pub struct SessionManager {
    model: String,
    session: Option<ChatSession>,
}

impl SessionManager {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            session: None,
        }
    }

    /// Get-or-create accessor. The first call creates a session bound to
    /// the manager's model and the given documents; later calls return
    /// the existing session and ignore the argument, so a caller
    /// mistakenly supplying documents again cannot re-attach them.
    pub fn ensure(
        &mut self,
        documents: &[DocumentPayload],
    ) -> Result<&mut ChatSession, ChatError> {
        if self.session.is_none() {
            if self.model.is_empty() {
                return Err(ChatError::SessionInit(ApiError::Api(
                    "no model configured".to_string(),
                )));
            }
            debug!(model = %self.model, documents = documents.len(), "creating chat session");
            self.session = Some(ChatSession::new(&self.model, documents.to_vec()));
        }
        // Just created above when absent.
        self.session
            .as_mut()
            .ok_or_else(|| ChatError::SessionInit(ApiError::Api("session unavailable".into())))
    }

    /// Abandon the current session and its pending documents. Called when
    /// a new upload batch replaces the document set.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("chat session abandoned");
        }
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}
