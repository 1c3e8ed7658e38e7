//! Server-Sent Events (SSE) streaming parser and fragment assembly.
//!
//! The Gemini API streams responses as SSE when asked with `alt=sse`.
//! The parser here is generic over any buffered async reader so it can be
//! driven by a reqwest response stream in production and by an in-memory
//! cursor in tests.

use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone)]
pub struct SseEvent {
    /// The event type, if the stream tags one.
    pub event: Option<String>,
    /// The event data (JSON string).
    pub data: String,
}

/// Parse an SSE stream from a reqwest response, calling `on_event` for
/// each event.
pub async fn parse_sse_stream(
    response: reqwest::Response,
    on_event: impl FnMut(SseEvent),
) -> Result<(), crate::ApiError> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    parse_sse_reader(reader, on_event).await
}

/// Parse SSE events from any buffered reader.
///
/// `data:` lines accumulate (joined with `\n`) until an empty line ends
/// the event; `event:` tags the next event; other fields are ignored. A
/// trailing unterminated event is flushed at end of stream.
pub async fn parse_sse_reader(
    reader: impl AsyncBufRead + Unpin,
    mut on_event: impl FnMut(SseEvent),
) -> Result<(), crate::ApiError> {
    let mut lines = reader.lines();

    let mut current_event: Option<String> = None;
    let mut current_data = String::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| crate::ApiError::Network(e.to_string()))?
    {
        if line.is_empty() {
            // Empty line = end of event
            if !current_data.is_empty() {
                on_event(SseEvent {
                    event: current_event.take(),
                    data: std::mem::take(&mut current_data),
                });
            }
            current_event = None;
            continue;
        }

        if let Some(event_type) = line.strip_prefix("event: ") {
            current_event = Some(event_type.to_string());
        } else if let Some(data) = line.strip_prefix("data: ") {
            if !current_data.is_empty() {
                current_data.push('\n');
            }
            current_data.push_str(data);
        }
        // Ignore other fields (id:, retry:, comments)
    }

    // Flush any remaining event
    if !current_data.is_empty() {
        on_event(SseEvent {
            event: current_event,
            data: current_data,
        });
    }

    Ok(())
}

/// Accumulates streamed text deltas into a running total.
///
/// Every `push` appends a delta and returns the complete text so far, so
/// a progress observer always sees the full cumulative answer, never a
/// bare fragment. The total only ever grows.
#[derive(Debug, Default)]
pub struct Assembler {
    total: String,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta; returns the new running total.
    pub fn push(&mut self, delta: &str) -> &str {
        self.total.push_str(delta);
        &self.total
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}
