//! Transcript export: plain text and JSON.
//!
//! The shapes here are a boundary contract: a header block with document
//! names and export timestamp followed by `[time] ROLE: text` blocks for
//! the text form, and `{ exported_at, files, turns }` for the JSON form.

use std::path::Path;

use chrono::{DateTime, Utc};
use docchat_ai::DocumentPayload;
use docchat_common::{ConversationTurn, DocChatError};
use serde::Serialize;

#[derive(Serialize)]
struct JsonExport<'a> {
    exported_at: DateTime<Utc>,
    files: Vec<JsonFile<'a>>,
    turns: Vec<JsonTurn<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    name: &'a str,
    size_bytes: u64,
}

#[derive(Serialize)]
struct JsonTurn<'a> {
    role: &'a str,
    text: &'a str,
    timestamp: DateTime<Utc>,
}

/// Render the plain-text transcript.
pub fn render_text(
    documents: &[DocumentPayload],
    turns: &[ConversationTurn],
    exported_at: DateTime<Utc>,
) -> String {
    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();

    let mut out = String::new();
    out.push_str("=== docchat transcript ===\n");
    out.push_str(&format!("Documents: {}\n", names.join(", ")));
    out.push_str(&format!(
        "Exported: {}\n",
        exported_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str("==========================\n\n");

    for turn in turns {
        out.push_str(&format!(
            "[{}] {}: {}\n\n",
            turn.created_at.format("%H:%M:%S"),
            turn.speaker.label(),
            turn.text
        ));
    }

    out
}

/// Render the JSON transcript (pretty-printed).
pub fn render_json(
    documents: &[DocumentPayload],
    turns: &[ConversationTurn],
    exported_at: DateTime<Utc>,
) -> Result<String, DocChatError> {
    let export = JsonExport {
        exported_at,
        files: documents
            .iter()
            .map(|d| JsonFile {
                name: &d.name,
                size_bytes: d.size_bytes,
            })
            .collect(),
        turns: turns
            .iter()
            .map(|t| JsonTurn {
                role: match t.speaker {
                    docchat_common::Speaker::User => "user",
                    docchat_common::Speaker::Assistant => "assistant",
                },
                text: &t.text,
                timestamp: t.created_at,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&export).map_err(|e| DocChatError::Export(e.to_string()))
}

/// Write the text transcript to a file.
pub fn write_text(
    path: impl AsRef<Path>,
    documents: &[DocumentPayload],
    turns: &[ConversationTurn],
) -> Result<(), DocChatError> {
    let content = render_text(documents, turns, Utc::now());
    std::fs::write(path.as_ref(), content).map_err(|e| DocChatError::Export(e.to_string()))
}

/// Write the JSON transcript to a file.
pub fn write_json(
    path: impl AsRef<Path>,
    documents: &[DocumentPayload],
    turns: &[ConversationTurn],
) -> Result<(), DocChatError> {
    let content = render_json(documents, turns, Utc::now())?;
    std::fs::write(path.as_ref(), content).map_err(|e| DocChatError::Export(e.to_string()))
}
