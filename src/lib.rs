//! # Snake Stream Client
//!
//! Client for a server-authoritative snake game streamed over WebSocket.
//!
//! The server pushes a complete [`GameSnapshot`] on every tick; the client
//! displays the latest one, answers with bare direction frames, and keeps a
//! persisted high score on the side.
//!
//! ## Pieces
//!
//! - [`ConnectionManager`]: the `Disconnected → Connecting → Connected`
//!   lifecycle, one background link task per connection attempt
//! - [`Reconciler`]: snapshot decoding, status text and the high score
//! - [`input`]: the gate deciding whether a key may steer, reconnect or restart
//! - [`SnakeClient`]: the single-threaded dispatcher tying them together
//! - [`Transport`] / [`Connector`]: bring your own stream, or use the default
//!   `transport-websocket` feature's [`WebSocketConnector`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use snake_stream_client::{FileScoreStore, SnakeClient, SnakeConfig, WebSocketConnector};
//!
//! let mut client = SnakeClient::start(WebSocketConnector, FileScoreStore::default(), SnakeConfig::new());
//! while let Some(event) = client.next_event().await {
//!     client.dispatch(event);
//!     println!("{}", client.status());
//! }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod event;
pub mod input;
pub mod protocol;
pub mod reconcile;
pub mod score;
pub mod status;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{ClientView, SnakeClient, SnakeConfig};
pub use connection::{ConnectionManager, ConnectionPhase};
pub use error::SnakeError;
pub use event::{ClientEvent, LinkEvent};
pub use input::{Key, KeyDisposition};
pub use protocol::{Direction, GameSnapshot, GameStatus, Point};
pub use reconcile::Reconciler;
pub use score::{FileScoreStore, MemoryScoreStore, ScoreStore};
pub use transport::{Connector, Transport};

#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
