//! Message dispatch: the streaming send path for a ChatSession.

use std::sync::Mutex;

use tracing::debug;

use crate::streaming::Assembler;
use crate::{ChatError, GenerativeClient, Message, Role};

use super::manager::ChatSession;
use super::types::BusyGuard;

impl ChatSession {
    /// Dispatch a user message and stream the reply.
    ///
    /// The pending document payloads are attached if and only if this is
    /// the session's first dispatch. Fragments are accumulated into a
    /// running total and `on_progress` receives the complete total after
    /// every fragment; the returned value equals the last total.
    ///
    /// On failure the partial total is discarded: the user message is
    /// rolled back off the history (restoring its attachments as pending)
    /// and the error is reported as a dispatch failure. Exactly one send
    /// may be in flight at a time.
    pub async fn send(
        &mut self,
        client: &dyn GenerativeClient,
        text: impl Into<String>,
        on_progress: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<String, ChatError> {
        let _guard = BusyGuard::acquire(&self.busy).map_err(ChatError::Dispatch)?;

        let attachments = self.pending_documents.take().unwrap_or_default();
        self.messages.push(Message {
            role: Role::User,
            text: text.into(),
            attachments,
        });

        let request = self.build_messages();
        debug!(
            session = %self.id,
            history = self.messages.len(),
            "dispatching message"
        );

        let assembler = Mutex::new(Assembler::new());
        let on_delta: Box<dyn Fn(String) + Send + Sync> = Box::new(move |delta| {
            let mut assembler = assembler.lock().unwrap_or_else(|p| p.into_inner());
            let total = assembler.push(&delta).to_string();
            on_progress(total);
        });

        match client.generate_streaming(&request, on_delta).await {
            Ok(full) => {
                self.messages.push(Message::assistant(full.clone()));
                Ok(full)
            }
            Err(e) => {
                // Discard the partial answer and roll the user turn back so
                // the history never contains an unanswered message. If this
                // was the first dispatch, its documents become pending again
                // and ride along with the next attempt.
                if let Some(user_msg) = self.messages.pop() {
                    if !user_msg.attachments.is_empty() {
                        self.pending_documents = Some(user_msg.attachments);
                    }
                }
                Err(ChatError::Dispatch(e))
            }
        }
    }
}
