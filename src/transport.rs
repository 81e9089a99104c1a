//! Transport abstraction for the snake game stream.
//!
//! The [`Transport`] trait defines a bidirectional text message channel between
//! the client and the game server. Snapshots arrive as JSON text frames and
//! steering commands leave as bare text frames, so every transport
//! implementation must handle message framing internally.
//!
//! # Connection Setup
//!
//! Unlike a one-shot client, the snake client reopens its stream whenever the
//! player asks to reconnect. Opening is therefore delegated to a [`Connector`],
//! which the connection manager calls once per connection attempt.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use snake_stream_client::error::SnakeError;
//! use snake_stream_client::transport::{Connector, Transport};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), SnakeError> {
//!         // Write one text frame
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, SnakeError>> {
//!         // Return None when the connection is closed cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), SnakeError> {
//!         todo!()
//!     }
//! }
//!
//! struct MyConnector;
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     type Transport = MyTransport;
//!
//!     async fn connect(&self, url: &str) -> Result<MyTransport, SnakeError> {
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::SnakeError;

/// A bidirectional text message transport.
///
/// Each call to [`send`](Transport::send) transmits one complete text frame.
/// Each call to [`recv`](Transport::recv) returns one complete text frame.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because the
/// link task polls it inside `tokio::select!`. If `recv` is cancelled before
/// completion, calling it again must not lose data.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a text frame to the server.
    ///
    /// # Errors
    ///
    /// Returns [`SnakeError::TransportSend`] if the frame could not be sent.
    async fn send(&mut self, message: String) -> Result<(), SnakeError>;

    /// Receive the next text frame from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete frame was received
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the connection was closed cleanly by the server
    async fn recv(&mut self) -> Option<Result<String, SnakeError>>;

    /// Close the transport connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations should
    /// still release resources in that case.
    async fn close(&mut self) -> Result<(), SnakeError>;
}

/// Opens a fresh [`Transport`] for each connection attempt.
///
/// The connection manager holds one connector for its whole lifetime and
/// shares it with every link task it spawns.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The transport this connector produces.
    type Transport: Transport;

    /// Open a new connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SnakeError::Connect`] (or [`SnakeError::Io`]) when the
    /// connection cannot be established.
    async fn connect(&self, url: &str) -> Result<Self::Transport, SnakeError>;
}
