//! Renderer error types.

use thiserror::Error;
use tile_core::EditorError;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a tile.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Rasterization was requested before any frame was presented.
    #[error("No frame presented yet")]
    NoFrame,

    /// Generated or embedded SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Pixel buffer could not be created or encoded.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Filesystem failure while writing a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for EditorError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(io) => Self::Download(io.to_string()),
            other => Self::Render(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_maps_to_download() {
        let err: EditorError =
            RenderError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).into();
        assert!(matches!(err, EditorError::Download(_)));
    }

    #[test]
    fn test_render_failures_map_to_render() {
        let err: EditorError = RenderError::NoFrame.into();
        assert!(matches!(err, EditorError::Render(msg) if msg.contains("No frame")));
    }
}
