//! Capture artifact value object

use super::encoding::file_extension;

/// Captures smaller than this are rejected before submission
pub const MIN_ARTIFACT_BYTES: usize = 1000;

/// The finalized audio produced by one recording pass.
/// Contains the concatenated recorder chunks and the negotiated encoding,
/// which is empty when negotiation fell back to the platform default.
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    bytes: Vec<u8>,
    mime_type: String,
}

impl CaptureArtifact {
    /// Create an artifact from raw bytes
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Concatenate chunks in delivery order
    pub fn from_chunks(chunks: Vec<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self::new(chunks.concat(), mime_type)
    }

    /// Get the raw audio bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Negotiated encoding, possibly empty
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Upload file extension derived from the encoding
    pub fn extension(&self) -> &'static str {
        file_extension(&self.mime_type)
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the artifact is large enough to submit
    pub fn is_valid(&self) -> bool {
        self.size_bytes() >= MIN_ARTIFACT_BYTES
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
