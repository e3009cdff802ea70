//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A mutating action reached a document whose template is locked.
    #[error("Design is read-only, refused action: {0}")]
    ReadOnly(&'static str),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rendering surface failed to draw or rasterize.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The host could not deliver a download.
    #[error("Download failed: {0}")]
    Download(String),

    /// The host save callback rejected the design.
    #[error("Save failed: {0}")]
    Save(String),

    /// The host supplied input the editor cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
