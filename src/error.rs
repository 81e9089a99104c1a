//! Error types for the snake stream client.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while driving the snake client.
///
/// None of these are fatal to the process: the dispatcher logs them, updates
/// the status line where appropriate, and keeps running.
#[derive(Debug, Error)]
pub enum SnakeError {
    /// The transport could not be opened.
    #[error("connect error: {0}")]
    Connect(String),

    /// Failed to send a frame through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a frame from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was already closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// An inbound frame did not decode as a game snapshot.
    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The high-score file could not be written.
    #[error("score store error at {}: {source}", .path.display())]
    Store {
        /// Location of the score file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for snake client operations.
pub type Result<T> = std::result::Result<T, SnakeError>;
