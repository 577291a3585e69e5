//! Error types shared across the crate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VoiceDataError>;

/// Errors produced by authentication, download, and extraction operations.
#[derive(Debug, Error)]
pub enum VoiceDataError {
    /// A caller-supplied argument was rejected before any work started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The token endpoint rejected the subscription key.
    ///
    /// `status_code` is the HTTP status of the rejection, or `0` when no
    /// HTTP response was obtained at all.
    #[error("authentication failed with status {status_code}: {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// A batch download was requested while another one was running.
    #[error("a voice-data download is already in progress")]
    DownloadInProgress,

    /// The service answered, but not with what was asked for.
    #[error("unexpected service response: {message}")]
    InvalidApiResponse {
        message: String,
        response_body: Option<String>,
    },

    /// A bin file did not start with the voice-data signature.
    #[error("invalid bin file signature: 0x{0:08X}")]
    InvalidSignature(u32),

    /// A bin file was written by a newer format revision.
    #[error("unsupported bin format version: {0}")]
    UnsupportedVersion(u16),

    /// A bin file ended before its declared contents did.
    #[error("unexpected end of bin file")]
    UnexpectedEof,

    /// A bin file is structurally valid but carries nonsense values.
    #[error("malformed bin file: {0}")]
    MalformedBinFile(String),

    /// An extracted payload does not match its recorded digest.
    #[error("checksum mismatch for entry '{entry}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        entry: String,
        expected: String,
        actual: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
