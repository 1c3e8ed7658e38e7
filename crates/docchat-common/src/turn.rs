//! Conversation turn types shared between the core and the app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::TurnId;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Upper-case label used in the plain-text transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "USER",
            Speaker::Assistant => "ASSISTANT",
        }
    }
}

/// A single entry in the conversation history.
///
/// Turns are append-only. The in-flight streaming turn is replaced
/// wholesale as new cumulative text arrives; a finished turn is never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub speaker: Speaker,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            speaker,
            text: text.into(),
            created_at: Utc::now(),
            is_error: false,
        }
    }

    /// An assistant turn carrying a failure message instead of an answer.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Speaker::Assistant, text)
        }
    }

    /// Replace the text, keeping id and timestamp. Used for the streaming
    /// turn, which is updated with the running total after each fragment.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            speaker: self.speaker,
            text: text.into(),
            created_at: self.created_at,
            is_error: self.is_error,
        }
    }
}
