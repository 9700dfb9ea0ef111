//! Error types for the desktop editor.
use std::path::PathBuf;
use thiserror::Error;

/// Desktop editor error type.
#[derive(Error, Debug)]
pub enum GuiError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image decode error for {path}: {message}")]
    ImageDecode { path: PathBuf, message: String },

    #[error("Unsupported image location: {0}")]
    UnsupportedLocation(String),

    #[error("No note file configured; set QUICKNOTE_NOTE")]
    NoNote,
}

impl GuiError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
