//! PDF upload validation and base64 payload encoding.
//!
//! A batch of uploads is validated atomically: every source is checked
//! before any byte is encoded, and the first violation rejects the whole
//! batch naming the offending file.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The single accepted upload MIME type.
pub const ACCEPTED_MIME: &str = "application/pdf";

/// Per-file size ceiling: 20 MiB.
pub const MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("'{name}' is not a PDF (got {mime_type}); only application/pdf is accepted")]
    UnsupportedType { name: String, mime_type: String },

    #[error("'{name}' is {size_bytes} bytes, over the 20 MiB limit")]
    TooLarge { name: String, size_bytes: u64 },

    #[error("failed to read '{name}': {message}")]
    Read { name: String, message: String },
}

/// A raw upload: declared metadata plus a way to get at the bytes.
///
/// Metadata is available without touching the contents, so a whole batch
/// can be validated before any file is read.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    origin: Origin,
}

#[derive(Debug, Clone)]
enum Origin {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl DocumentSource {
    /// Build a source from in-memory bytes with a declared MIME type.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            origin: Origin::Memory(bytes),
        }
    }

    /// Build a source from a file on disk. Only metadata is read here;
    /// the contents are read during encoding.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            DocumentError::Read {
                name: name.clone(),
                message: e.to_string(),
            }
        })?;

        let mime_type = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => ACCEPTED_MIME.to_string(),
            _ => "application/octet-stream".to_string(),
        };

        Ok(Self {
            name,
            mime_type,
            size_bytes: meta.len(),
            origin: Origin::Path(path.to_path_buf()),
        })
    }

    /// Check this source against the accepted type and size ceiling.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.mime_type != ACCEPTED_MIME {
            return Err(DocumentError::UnsupportedType {
                name: self.name.clone(),
                mime_type: self.mime_type.clone(),
            });
        }
        if self.size_bytes > MAX_FILE_BYTES {
            return Err(DocumentError::TooLarge {
                name: self.name.clone(),
                size_bytes: self.size_bytes,
            });
        }
        Ok(())
    }

    async fn read(&self) -> Result<Vec<u8>, DocumentError> {
        match &self.origin {
            Origin::Memory(bytes) => Ok(bytes.clone()),
            Origin::Path(path) => {
                tokio::fs::read(path).await.map_err(|e| DocumentError::Read {
                    name: self.name.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Read and encode this source into a transmittable payload.
    pub async fn encode(&self) -> Result<DocumentPayload, DocumentError> {
        let bytes = self.read().await?;
        debug!(name = %self.name, size = bytes.len(), "encoding document");
        Ok(DocumentPayload::new(
            &self.name,
            &self.mime_type,
            bytes.len() as u64,
            BASE64.encode(&bytes),
        ))
    }
}

/// An encoded attachment ready for transmission: base64 data with any
/// data-URL prefix already stripped, plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub data: String,
}

impl DocumentPayload {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        data: impl Into<String>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            data: strip_data_url(&data).to_string(),
        }
    }
}

/// Strip a `data:<mime>;base64,` header if present. The transmitted
/// payload is only the substring after the first comma.
pub fn strip_data_url(value: &str) -> &str {
    if value.starts_with("data:") {
        match value.split_once(',') {
            Some((_, payload)) => payload,
            None => value,
        }
    } else {
        value
    }
}

/// Validate and encode a whole upload batch.
///
/// All sources are validated first; the first violation aborts the batch
/// and nothing is encoded. Only a fully valid batch is read and encoded.
pub async fn encode_batch(
    sources: &[DocumentSource],
) -> Result<Vec<DocumentPayload>, DocumentError> {
    for source in sources {
        source.validate()?;
    }

    let mut payloads = Vec::with_capacity(sources.len());
    for source in sources {
        payloads.push(source.encode().await?);
    }
    debug!(count = payloads.len(), "encoded upload batch");
    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_source(name: &str, bytes: &[u8]) -> DocumentSource {
        DocumentSource::from_bytes(name, ACCEPTED_MIME, bytes.to_vec())
    }

    #[tokio::test]
    async fn encodes_pdf_bytes_to_base64() {
        let source = pdf_source("report.pdf", b"hello");
        let payload = source.encode().await.unwrap();
        assert_eq!(payload.name, "report.pdf");
        assert_eq!(payload.mime_type, ACCEPTED_MIME);
        assert_eq!(payload.size_bytes, 5);
        assert_eq!(payload.data, "aGVsbG8=");
    }

    #[test]
    fn rejects_wrong_mime_type_naming_file() {
        let source = DocumentSource::from_bytes("notes.txt", "text/plain", vec![1, 2, 3]);
        let err = source.validate().unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType { .. }));
        let msg = err.to_string();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("text/plain"));
    }

    #[test]
    fn rejects_oversized_file_naming_file() {
        let mut source = pdf_source("huge.pdf", b"x");
        source.size_bytes = MAX_FILE_BYTES + 1;
        let err = source.validate().unwrap_err();
        assert!(matches!(err, DocumentError::TooLarge { .. }));
        assert!(err.to_string().contains("huge.pdf"));
    }

    #[test]
    fn accepts_file_exactly_at_limit() {
        let mut source = pdf_source("edge.pdf", b"x");
        source.size_bytes = MAX_FILE_BYTES;
        assert!(source.validate().is_ok());
    }

    #[tokio::test]
    async fn batch_is_rejected_atomically() {
        let sources = vec![
            pdf_source("a.pdf", b"aaa"),
            DocumentSource::from_bytes("b.txt", "text/plain", b"bbb".to_vec()),
        ];
        let err = encode_batch(&sources).await.unwrap_err();
        // The valid first file must not slip through when a later one fails.
        assert!(err.to_string().contains("b.txt"));
    }

    #[tokio::test]
    async fn valid_batch_encodes_every_file() {
        let sources = vec![pdf_source("a.pdf", b"aaa"), pdf_source("b.pdf", b"bbb")];
        let payloads = encode_batch(&sources).await.unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].name, "a.pdf");
        assert_eq!(payloads[1].name, "b.pdf");
    }

    #[test]
    fn strips_data_url_prefix_at_first_comma() {
        assert_eq!(
            strip_data_url("data:application/pdf;base64,aGVsbG8="),
            "aGVsbG8="
        );
        assert_eq!(strip_data_url("aGVsbG8="), "aGVsbG8=");
        // No comma at all: value passed through untouched.
        assert_eq!(strip_data_url("data:broken"), "data:broken");
    }

    #[test]
    fn prefixed_and_bare_payloads_are_identical() {
        let bare = DocumentPayload::new("a.pdf", ACCEPTED_MIME, 5, "aGVsbG8=");
        let prefixed = DocumentPayload::new(
            "a.pdf",
            ACCEPTED_MIME,
            5,
            "data:application/pdf;base64,aGVsbG8=",
        );
        assert_eq!(bare, prefixed);
    }

    #[tokio::test]
    async fn from_path_reads_metadata_and_encodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let source = DocumentSource::from_path(&path).await.unwrap();
        assert_eq!(source.name, "report.pdf");
        assert_eq!(source.mime_type, ACCEPTED_MIME);
        assert_eq!(source.size_bytes, 13);

        let payload = source.encode().await.unwrap();
        assert_eq!(payload.data, BASE64.encode(b"%PDF-1.4 test"));
    }

    #[tokio::test]
    async fn from_path_missing_file_is_read_error() {
        let err = DocumentSource::from_path("/tmp/definitely_missing.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().contains("definitely_missing.pdf"));
    }

    #[tokio::test]
    async fn non_pdf_extension_gets_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain").unwrap();

        let source = DocumentSource::from_path(&path).await.unwrap();
        assert_eq!(source.mime_type, "application/octet-stream");
        assert!(source.validate().is_err());
    }
}
