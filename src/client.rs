//! Single-threaded client dispatcher.
//!
//! [`SnakeClient`] owns the [`ConnectionManager`], the [`Reconciler`] and the
//! status line. Link tasks and key producers push [`ClientEvent`]s onto its
//! inbox; the owner takes them off one at a time with
//! [`next_event`](SnakeClient::next_event) and hands each to
//! [`dispatch`](SnakeClient::dispatch), which runs the whole transition before
//! returning. Nothing else mutates client state, so no locks are involved.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut client = SnakeClient::start(
//!     WebSocketConnector,
//!     FileScoreStore::default(),
//!     SnakeConfig::new(),
//! );
//! let keys = client.sender();
//! // ... hand `keys` to whatever reads the keyboard ...
//!
//! while let Some(event) = client.next_event().await {
//!     client.dispatch(event);
//!     render(client.view());
//! }
//! ```

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::connection::{ConnectionManager, ConnectionPhase, LinkOutcome};
use crate::event::{ClientEvent, LinkEvent};
use crate::input::{self, GateAction, Intent, Key, KeyDisposition};
use crate::protocol::{Direction, GameSnapshot};
use crate::reconcile::Reconciler;
use crate::score::ScoreStore;
use crate::status;
use crate::transport::Connector;

/// Endpoint used when no URL is configured.
pub const DEFAULT_URL: &str = "ws://localhost:8080/ws";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`SnakeClient`].
///
/// # Example
///
/// ```
/// use snake_stream_client::client::SnakeConfig;
///
/// let config = SnakeConfig::new().with_url("ws://game.example:9000/ws");
/// assert_eq!(config.url, "ws://game.example:9000/ws");
/// assert_eq!(SnakeConfig::new().url, "ws://localhost:8080/ws");
/// ```
#[derive(Debug, Clone)]
pub struct SnakeConfig {
    /// The fixed streaming endpoint every connection attempt targets.
    pub url: String,
}

impl SnakeConfig {
    pub fn new() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
        }
    }

    /// Set the streaming endpoint.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── View ────────────────────────────────────────────────────────────

/// Read-only view of everything a presentation surface needs.
#[derive(Debug, Clone, Copy)]
pub struct ClientView<'a> {
    pub phase: ConnectionPhase,
    /// Exactly the most recently reconciled snapshot, or `None` while
    /// disconnected or before the first frame.
    pub snapshot: Option<&'a GameSnapshot>,
    pub high_score: u32,
    pub status: &'a str,
}

// ── Client ──────────────────────────────────────────────────────────

/// The snake client: connection manager, reconciler and input gate behind one
/// serialized event loop.
pub struct SnakeClient<C: Connector, S: ScoreStore> {
    connection: ConnectionManager<C>,
    reconciler: Reconciler<S>,
    status: String,
    inbox_tx: mpsc::UnboundedSender<ClientEvent>,
    inbox_rx: mpsc::UnboundedReceiver<ClientEvent>,
}

impl<C: Connector, S: ScoreStore> SnakeClient<C, S> {
    /// Build a disconnected client. The high score is loaded from `store` here.
    pub fn new(connector: C, store: S, config: SnakeConfig) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            connection: ConnectionManager::new(connector, config.url, inbox_tx.clone()),
            reconciler: Reconciler::new(store),
            status: status::CONNECTING.to_string(),
            inbox_tx,
            inbox_rx,
        }
    }

    /// Build a client and issue the initial connect request.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(connector: C, store: S, config: SnakeConfig) -> Self {
        let mut client = Self::new(connector, store, config);
        client.connection.connect();
        client
    }

    /// A handle for pushing events (typically [`ClientEvent::Key`]) onto the
    /// inbox from another task or thread.
    pub fn sender(&self) -> mpsc::UnboundedSender<ClientEvent> {
        self.inbox_tx.clone()
    }

    /// Wait for the next event.
    ///
    /// The client keeps its own sender alive, so this only returns `None` if
    /// the channel is somehow torn down.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.inbox_rx.recv().await
    }

    /// Process one event to completion.
    ///
    /// Returns the key disposition for [`ClientEvent::Key`], `None` otherwise.
    pub fn dispatch(&mut self, event: ClientEvent) -> Option<KeyDisposition> {
        match event {
            ClientEvent::Link { generation, event } => {
                self.handle_link(generation, event);
                None
            }
            ClientEvent::Key(key) => Some(self.handle_key(key)),
        }
    }

    /// Run a key through the input gate and carry out the resulting action.
    pub fn handle_key(&mut self, key: Key) -> KeyDisposition {
        let Some(intent) = Intent::from_key(key) else {
            return KeyDisposition::Ignored;
        };

        let action = input::decide(intent, self.connection.phase(), self.reconciler.snapshot());
        debug!(?key, ?action, "input gate");

        match action {
            GateAction::Send(direction) => {
                if self.connection.send(direction) {
                    KeyDisposition::Consumed
                } else {
                    KeyDisposition::Ignored
                }
            }
            GateAction::Connect => {
                self.status = status::RECONNECTING.to_string();
                self.connection.connect();
                KeyDisposition::Ignored
            }
            GateAction::Close => {
                self.status = status::RESTARTING.to_string();
                self.close();
                KeyDisposition::Ignored
            }
            GateAction::Drop => KeyDisposition::Ignored,
        }
    }

    // ── Direct operations ───────────────────────────────────────────

    /// Issue a connect request. No-op unless disconnected.
    pub fn connect(&mut self) -> bool {
        self.connection.connect()
    }

    /// Send a direction. Silently dropped unless connected.
    pub fn send(&mut self, direction: Direction) -> bool {
        self.connection.send(direction)
    }

    /// Close the connection. Idempotent.
    pub fn close(&mut self) {
        if self.connection.close() {
            self.on_disconnected();
        }
    }

    // ── State accessors ─────────────────────────────────────────────

    pub fn view(&self) -> ClientView<'_> {
        ClientView {
            phase: self.connection.phase(),
            snapshot: self.reconciler.snapshot(),
            high_score: self.reconciler.high_score(),
            status: &self.status,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.connection.phase()
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.reconciler.snapshot()
    }

    pub fn high_score(&self) -> u32 {
        self.reconciler.high_score()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Number of inbound frames discarded as malformed.
    pub fn discarded_frames(&self) -> u64 {
        self.reconciler.discarded()
    }

    /// Generation of the most recent connection attempt.
    pub fn generation(&self) -> u64 {
        self.connection.generation()
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn handle_link(&mut self, generation: u64, event: LinkEvent) {
        match self.connection.on_link_event(generation, event) {
            LinkOutcome::Opened => {
                self.status = status::CONNECTED.to_string();
            }
            LinkOutcome::Frame(text) => match self.reconciler.reconcile(&text) {
                Ok(line) => self.status = line,
                Err(e) => {
                    warn!("discarding malformed snapshot: {e} (raw: {text})");
                }
            },
            LinkOutcome::Failed(_) => {
                self.status = status::CONNECTION_ERROR.to_string();
            }
            LinkOutcome::Closed => self.on_disconnected(),
            LinkOutcome::Ignored => {}
        }
    }

    fn on_disconnected(&mut self) {
        self.reconciler.clear();
        self.status = status::DISCONNECTED.to_string();
    }
}

impl<C: Connector, S: ScoreStore> fmt::Debug for SnakeClient<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnakeClient")
            .field("phase", &self.connection.phase())
            .field("generation", &self.connection.generation())
            .field("has_snapshot", &self.reconciler.snapshot().is_some())
            .field("high_score", &self.reconciler.high_score())
            .field("status", &self.status)
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::error::SnakeError;
    use crate::score::MemoryScoreStore;
    use crate::transport::Transport;
    use async_trait::async_trait;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn send(&mut self, _message: String) -> Result<(), SnakeError> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String, SnakeError>> {
            std::future::pending().await
        }

        async fn close(&mut self) -> Result<(), SnakeError> {
            Ok(())
        }
    }

    /// Connection attempts hang forever; tests inject link events directly.
    struct StalledConnector;

    #[async_trait]
    impl Connector for StalledConnector {
        type Transport = NullTransport;

        async fn connect(&self, _url: &str) -> Result<NullTransport, SnakeError> {
            std::future::pending().await
        }
    }

    fn client(high_score: u32) -> SnakeClient<StalledConnector, MemoryScoreStore> {
        SnakeClient::start(
            StalledConnector,
            MemoryScoreStore::with_score(high_score),
            SnakeConfig::new(),
        )
    }

    fn link(generation: u64, event: LinkEvent) -> ClientEvent {
        ClientEvent::Link { generation, event }
    }

    fn frame(state: &str, score: u32) -> LinkEvent {
        LinkEvent::Frame(format!(
            r#"{{"boardWidth":8,"boardHeight":8,"snakeBody":[{{"X":2,"Y":2}}],"food":null,"gameState":"{state}","score":{score}}}"#
        ))
    }

    #[tokio::test]
    async fn config_defaults() {
        let config = SnakeConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[tokio::test]
    async fn start_connects_and_shows_connecting() {
        let c = client(0);
        assert_eq!(c.phase(), ConnectionPhase::Connecting);
        assert_eq!(c.status(), "Connecting to server...");
        assert!(c.snapshot().is_none());
    }

    #[tokio::test]
    async fn new_does_not_connect() {
        let c = SnakeClient::new(StalledConnector, MemoryScoreStore::default(), SnakeConfig::new());
        assert_eq!(c.phase(), ConnectionPhase::Disconnected);
        assert_eq!(c.generation(), 0);
    }

    #[tokio::test]
    async fn open_replaces_stale_status() {
        let mut c = client(0);
        c.dispatch(link(1, LinkEvent::Failed("flaky".into())));
        assert_eq!(c.status(), status::CONNECTION_ERROR);
        c.dispatch(link(1, LinkEvent::Opened));
        assert_eq!(c.phase(), ConnectionPhase::Connected);
        assert_eq!(c.status(), "Connected! Game starting...");
    }

    #[tokio::test]
    async fn frames_update_status_and_snapshot() {
        let mut c = client(0);
        c.dispatch(link(1, LinkEvent::Opened));
        c.dispatch(link(1, frame("Running", 5)));
        assert_eq!(c.status(), "Score: 5");
        assert_eq!(c.snapshot().unwrap().score, 5);
    }

    #[tokio::test]
    async fn disconnect_clears_snapshot_and_keeps_high_score() {
        let mut c = client(2);
        c.dispatch(link(1, LinkEvent::Opened));
        c.dispatch(link(1, frame("Lost", 9)));
        assert_eq!(c.high_score(), 9);

        c.dispatch(link(1, LinkEvent::Closed { reason: None }));
        assert_eq!(c.phase(), ConnectionPhase::Disconnected);
        assert!(c.view().snapshot.is_none());
        assert_eq!(c.status(), "Disconnected. Press R to reconnect.");
        assert_eq!(c.high_score(), 9);
    }

    #[tokio::test]
    async fn malformed_frame_is_discarded() {
        let mut c = client(0);
        c.dispatch(link(1, LinkEvent::Opened));
        c.dispatch(link(1, frame("Running", 3)));
        c.dispatch(link(1, LinkEvent::Frame("<html>".into())));
        assert_eq!(c.snapshot().unwrap().score, 3);
        assert_eq!(c.status(), "Score: 3");
        assert_eq!(c.phase(), ConnectionPhase::Connected);
        assert_eq!(c.discarded_frames(), 1);
    }

    #[tokio::test]
    async fn arrow_key_is_consumed_only_when_sent() {
        let mut c = client(0);
        assert_eq!(
            c.dispatch(ClientEvent::Key(Key::ArrowUp)),
            Some(KeyDisposition::Ignored)
        );
        c.dispatch(link(1, LinkEvent::Opened));
        c.dispatch(link(1, frame("Running", 0)));
        assert_eq!(
            c.dispatch(ClientEvent::Key(Key::ArrowUp)),
            Some(KeyDisposition::Consumed)
        );
        assert_eq!(
            c.dispatch(ClientEvent::Key(Key::Char('x'))),
            Some(KeyDisposition::Ignored)
        );
    }

    #[tokio::test]
    async fn recover_after_loss_closes_then_reconnects() {
        let mut c = client(0);
        c.dispatch(link(1, LinkEvent::Opened));
        c.dispatch(link(1, frame("Lost", 4)));

        c.handle_key(Key::Char('R'));
        assert_eq!(c.phase(), ConnectionPhase::Disconnected);
        assert_eq!(c.status(), status::DISCONNECTED);
        assert!(c.snapshot().is_none());

        c.handle_key(Key::Char('r'));
        assert_eq!(c.phase(), ConnectionPhase::Connecting);
        assert_eq!(c.generation(), 2);
        assert_eq!(c.status(), "Reconnecting...");
    }

    #[tokio::test]
    async fn recover_mid_game_is_a_no_op() {
        let mut c = client(0);
        c.dispatch(link(1, LinkEvent::Opened));
        c.dispatch(link(1, frame("Running", 1)));
        c.handle_key(Key::Char('r'));
        assert_eq!(c.phase(), ConnectionPhase::Connected);
        assert_eq!(c.status(), "Score: 1");
    }

    #[tokio::test]
    async fn direct_close_is_idempotent() {
        let mut c = client(0);
        c.close();
        assert_eq!(c.phase(), ConnectionPhase::Disconnected);
        c.close();
        assert_eq!(c.phase(), ConnectionPhase::Disconnected);
        assert!(!c.send(Direction::Down));
    }

    #[tokio::test]
    async fn debug_impl_for_client() {
        let c = client(0);
        let debug_str = format!("{c:?}");
        assert!(debug_str.contains("SnakeClient"));
        assert!(debug_str.contains("Connecting"));
    }
}
