//! Error types for message composition.

use std::path::PathBuf;

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message composition errors.
///
/// Every variant is a construction failure: once a [`Message`](crate::Message)
/// or a part exists, rendering it cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed envelope field or attachment descriptor.
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// The `To` recipient was omitted or empty.
    #[error("Recipient not provided")]
    RecipientMissing,

    /// An attachment path does not exist.
    #[error("Attachment not found: {}", .0.display())]
    AttachmentNotFound(PathBuf),

    /// Attachment content is not a byte buffer.
    #[error("Attachment content is not binary")]
    ContentNotBinary,

    /// Unknown multipart type.
    #[error("Invalid multipart type: {0}")]
    InvalidMultipartType(String),

    /// An existing attachment could not be read.
    #[error("Unable to read attachment: {0}")]
    Io(#[from] std::io::Error),

    /// The nonce source failed to produce a token.
    #[error("Unable to generate nonce: {0}")]
    Nonce(String),
}
