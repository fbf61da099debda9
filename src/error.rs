//! Error types for the packet builder

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the packet builder
///
/// Only request-level failures travel through this type to the caller. Document and
/// page failures are contained by the merger and rendered as error pages.
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed packet request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request JSON could not be decoded
    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be decoded
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Document has no usable page tree
    #[error("Malformed page tree: {0}")]
    PageTree(String),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages")]
    EmptyPdf,

    /// Image could not be decoded for embedding
    #[error("Image error: {0}")]
    Image(String),

    /// The assembled packet could not be written out
    #[error("Failed to serialize packet: {0}")]
    Serialization(String),

    /// General error
    #[error("{0}")]
    General(String),
}
