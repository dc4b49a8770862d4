//! Error types for the code image pipeline

use thiserror::Error;

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning code into an image
#[derive(Error, Debug)]
pub enum Error {
    /// The highlighter could not process the code. Absorbed by the
    /// highlighter backends, which fall back to plain text.
    #[error("Highlighting failed: {0}")]
    Highlight(String),

    /// The SVG scene could not be rasterized or encoded
    #[error("Failed to encode image: {0}")]
    Encoding(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Copying the image to the system clipboard failed
    #[error("Clipboard copy failed: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
