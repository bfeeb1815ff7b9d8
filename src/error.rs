// Error types for the rendering engine

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mdpaint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while preparing or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading inputs or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A referenced image, emoji asset or syntax definition does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A remote resource could not be retrieved.
    #[error("Remote fetch failed for {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    /// A syntax definition exists but cannot be parsed.
    #[error("Invalid syntax definition {path}: {reason}")]
    SyntaxDefinition { path: PathBuf, reason: String },

    /// A configuration or theme file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A margin specification could not be parsed.
    #[error("Invalid margins: {0}")]
    InvalidMargins(String),

    /// The page size is not one of A3, A4 or A5.
    #[error("Unknown page size: {0}")]
    InvalidPageSize(String),

    /// A popped container would have removed the root frame.
    #[error("Container stack underflow")]
    StackUnderflow,

    /// Nesting went deeper than the container stack allows.
    #[error("Container stack overflow (depth {0})")]
    StackOverflow(usize),

    /// A node left the container stack at a different depth than it entered.
    #[error("Unbalanced container stack after {node}: entered at depth {entered}, left at {left}")]
    Unbalanced {
        node: String,
        entered: usize,
        left: usize,
    },

    /// A pushed frame sits left of its parent.
    #[error("Frame left margin {child} is left of parent margin {parent}")]
    MarginRegression { child: f64, parent: f64 },

    /// A table cell was visited while no table was being rendered.
    #[error("Table cell outside of an active table")]
    NoActiveTable,
}

impl Error {
    /// Whether the renderer may record this error and keep going.
    ///
    /// Missing resources, failed fetches and broken syntax files only degrade
    /// a single element. Everything else indicates a broken configuration or
    /// a traversal defect and aborts the render.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::ResourceNotFound(_)
                | Error::RemoteFetch { .. }
                | Error::SyntaxDefinition { .. }
        )
    }
}
