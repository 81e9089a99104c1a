//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] is the only writer of [`ConnectionPhase`]. Each
//! [`connect`](ConnectionManager::connect) spawns a background *link task* for
//! a new connection generation; the task opens the transport through the
//! [`Connector`], then multiplexes outgoing direction frames and incoming
//! snapshot frames, reporting everything back to the client inbox as
//! [`LinkEvent`]s tagged with its generation.
//!
//! ```text
//!                connect()              Opened
//!  Disconnected ──────────▶ Connecting ────────▶ Connected
//!       ▲                       │                    │
//!       └──── Closed / close() ─┴────────────────────┘
//! ```
//!
//! There is no automatic reconnect and no timeout anywhere: recovery from
//! `Disconnected` only ever happens through another explicit `connect()`.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::event::{ClientEvent, LinkEvent};
use crate::protocol::Direction;
use crate::transport::{Connector, Transport};

/// Lifecycle stage of the game stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionPhase::Disconnected => "disconnected",
            ConnectionPhase::Connecting => "connecting",
            ConnectionPhase::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// What a [`LinkEvent`] meant for the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// `Connecting → Connected`.
    Opened,
    /// A frame from the live link, ready to be reconciled.
    Frame(String),
    /// The live link reported an error; the phase is unchanged.
    Failed(String),
    /// `Connecting/Connected → Disconnected`.
    Closed,
    /// The event belonged to a replaced or already-closed link, or made no
    /// sense in the current phase.
    Ignored,
}

/// Handle to the link task of the current generation.
///
/// Dropping `frames_tx` is the close signal: the task sees its command
/// channel end, closes the transport and exits.
struct Link {
    generation: u64,
    frames_tx: mpsc::UnboundedSender<String>,
}

/// Owns the connection phase and the live link, if any.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    url: String,
    phase: ConnectionPhase,
    link: Option<Link>,
    generation: u64,
    inbox: mpsc::UnboundedSender<ClientEvent>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager in the `Disconnected` phase.
    ///
    /// Link events are delivered to `inbox`.
    pub fn new(
        connector: C,
        url: impl Into<String>,
        inbox: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            connector: Arc::new(connector),
            url: url.into(),
            phase: ConnectionPhase::Disconnected,
            link: None,
            generation: 0,
            inbox,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Generation of the most recent connection attempt (`0` before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new connection attempt.
    ///
    /// Only valid from `Disconnected`; in any other phase this is a no-op and
    /// returns `false`. Must be called inside a Tokio runtime.
    pub fn connect(&mut self) -> bool {
        if self.phase != ConnectionPhase::Disconnected {
            debug!(phase = %self.phase, "connect ignored, link already active");
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();

        tokio::spawn(link_loop(
            Arc::clone(&self.connector),
            self.url.clone(),
            generation,
            frames_rx,
            self.inbox.clone(),
        ));

        self.link = Some(Link {
            generation,
            frames_tx,
        });
        self.phase = ConnectionPhase::Connecting;
        info!(url = %self.url, generation, "connecting");
        true
    }

    /// Queue a direction frame on the live link.
    ///
    /// Admitted only when the phase is exactly `Connected`. Anything else is
    /// dropped silently and reported as `false`.
    pub fn send(&mut self, direction: Direction) -> bool {
        if self.phase != ConnectionPhase::Connected {
            debug!(%direction, phase = %self.phase, "send dropped, not connected");
            return false;
        }
        let Some(link) = &self.link else {
            return false;
        };
        match link.frames_tx.send(direction.as_wire().to_string()) {
            Ok(()) => true,
            Err(_) => {
                // The task already exited; its Closed event is on the way.
                debug!(%direction, "send dropped, link task gone");
                false
            }
        }
    }

    /// Close the live link, if any.
    ///
    /// Idempotent: returns `false` and does nothing while `Disconnected`.
    /// Otherwise the phase becomes `Disconnected` immediately and the link task
    /// closes the transport in the background.
    pub fn close(&mut self) -> bool {
        if self.phase == ConnectionPhase::Disconnected {
            return false;
        }
        info!(generation = self.generation, "closing connection");
        self.link = None;
        self.phase = ConnectionPhase::Disconnected;
        true
    }

    /// Apply an event produced by the link task of `generation`.
    pub fn on_link_event(&mut self, generation: u64, event: LinkEvent) -> LinkOutcome {
        let live = self
            .link
            .as_ref()
            .is_some_and(|link| link.generation == generation);
        if !live {
            debug!(generation, ?event, "ignoring event from stale link");
            return LinkOutcome::Ignored;
        }

        match event {
            LinkEvent::Opened => {
                if self.phase != ConnectionPhase::Connecting {
                    return LinkOutcome::Ignored;
                }
                self.phase = ConnectionPhase::Connected;
                info!(generation, "connected");
                LinkOutcome::Opened
            }
            LinkEvent::Frame(text) => {
                if self.phase != ConnectionPhase::Connected {
                    warn!(generation, "frame before open, ignoring");
                    return LinkOutcome::Ignored;
                }
                LinkOutcome::Frame(text)
            }
            LinkEvent::Failed(reason) => {
                warn!(generation, "connection error: {reason}");
                LinkOutcome::Failed(reason)
            }
            LinkEvent::Closed { reason } => {
                info!(generation, reason = reason.as_deref().unwrap_or("server closed"), "disconnected");
                self.link = None;
                self.phase = ConnectionPhase::Disconnected;
                LinkOutcome::Closed
            }
        }
    }
}

impl<C: Connector> fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.url)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("has_link", &self.link.is_some())
            .finish()
    }
}

// ── Link task ───────────────────────────────────────────────────────

/// Background task driving one connection generation.
///
/// Always ends with exactly one [`LinkEvent::Closed`]. Exits when:
/// - the connector fails to open the transport
/// - the frame channel closes (the manager dropped the link)
/// - the transport returns `None` (server closed the stream)
/// - a transport send or receive error occurs
async fn link_loop<C: Connector>(
    connector: Arc<C>,
    url: String,
    generation: u64,
    mut frames_rx: mpsc::UnboundedReceiver<String>,
    inbox: mpsc::UnboundedSender<ClientEvent>,
) {
    let emit = |event: LinkEvent| {
        if inbox.send(ClientEvent::Link { generation, event }).is_err() {
            debug!(generation, "client inbox closed, dropping link event");
        }
    };

    debug!(generation, "link task started");

    let mut transport = tokio::select! {
        opened = connector.connect(&url) => match opened {
            Ok(transport) => transport,
            Err(e) => {
                error!(generation, "failed to open transport: {e}");
                emit(LinkEvent::Failed(e.to_string()));
                emit(LinkEvent::Closed { reason: Some(format!("connect failed: {e}")) });
                return;
            }
        },
        () = link_dropped(&mut frames_rx) => {
            debug!(generation, "link dropped while connecting");
            emit(LinkEvent::Closed { reason: Some("cancelled".into()) });
            return;
        }
    };

    emit(LinkEvent::Opened);

    loop {
        tokio::select! {
            frame = frames_rx.recv() => match frame {
                Some(text) => {
                    debug!(generation, frame = %text, "sending frame");
                    if let Err(e) = transport.send(text).await {
                        error!(generation, "transport send error: {e}");
                        emit(LinkEvent::Failed(e.to_string()));
                        emit(LinkEvent::Closed { reason: Some(format!("transport send error: {e}")) });
                        break;
                    }
                }
                None => {
                    debug!(generation, "link dropped, closing transport");
                    if let Err(e) = transport.close().await {
                        debug!(generation, "transport close failed: {e}");
                    }
                    emit(LinkEvent::Closed { reason: Some("closed by client".into()) });
                    break;
                }
            },

            incoming = transport.recv() => match incoming {
                Some(Ok(text)) => emit(LinkEvent::Frame(text)),
                Some(Err(e)) => {
                    error!(generation, "transport receive error: {e}");
                    emit(LinkEvent::Failed(e.to_string()));
                    emit(LinkEvent::Closed { reason: Some(format!("transport receive error: {e}")) });
                    break;
                }
                None => {
                    debug!(generation, "transport closed by server");
                    emit(LinkEvent::Closed { reason: None });
                    break;
                }
            },
        }
    }

    debug!(generation, "link task exited");
}

/// Resolves once every sender of `frames_rx` is gone.
///
/// Nothing is admitted for sending before the link opens, so frames drained
/// here can only be leftovers and are discarded.
async fn link_dropped(frames_rx: &mut mpsc::UnboundedReceiver<String>) {
    while frames_rx.recv().await.is_some() {}
}

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
    use async_trait::async_trait;

    /// A transport that never yields and accepts every send.
    struct IdleTransport;

    #[async_trait]
    impl Transport for IdleTransport {
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

    /// A connector whose connection attempts never complete, so tests can
    /// drive the state machine with synthetic link events.
    struct StalledConnector;

    #[async_trait]
    impl Connector for StalledConnector {
        type Transport = IdleTransport;

        async fn connect(&self, _url: &str) -> Result<IdleTransport, SnakeError> {
            std::future::pending().await
        }
    }

    fn manager() -> (
        ConnectionManager<StalledConnector>,
        mpsc::UnboundedReceiver<ClientEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionManager::new(StalledConnector, "ws://test/ws", tx), rx)
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let (m, _rx) = manager();
        assert_eq!(m.phase(), ConnectionPhase::Disconnected);
        assert_eq!(m.generation(), 0);
        assert_eq!(m.url(), "ws://test/ws");
    }

    #[tokio::test]
    async fn connect_enters_connecting_once() {
        let (mut m, _rx) = manager();
        assert!(m.connect());
        assert_eq!(m.phase(), ConnectionPhase::Connecting);
        assert_eq!(m.generation(), 1);

        // Re-entry while a link is active is a no-op.
        assert!(!m.connect());
        assert_eq!(m.generation(), 1);
    }

    #[tokio::test]
    async fn opened_moves_to_connected() {
        let (mut m, _rx) = manager();
        m.connect();
        let outcome = m.on_link_event(1, LinkEvent::Opened);
        assert_eq!(outcome, LinkOutcome::Opened);
        assert_eq!(m.phase(), ConnectionPhase::Connected);

        // A duplicate open changes nothing.
        assert_eq!(m.on_link_event(1, LinkEvent::Opened), LinkOutcome::Ignored);
        assert!(!m.connect());
    }

    #[tokio::test]
    async fn closed_from_connecting_and_connected() {
        let (mut m, _rx) = manager();
        m.connect();
        let outcome = m.on_link_event(1, LinkEvent::Closed { reason: Some("refused".into()) });
        assert_eq!(outcome, LinkOutcome::Closed);
        assert_eq!(m.phase(), ConnectionPhase::Disconnected);

        m.connect();
        m.on_link_event(2, LinkEvent::Opened);
        let outcome = m.on_link_event(2, LinkEvent::Closed { reason: None });
        assert_eq!(outcome, LinkOutcome::Closed);
        assert_eq!(m.phase(), ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn failure_does_not_transition() {
        let (mut m, _rx) = manager();
        m.connect();
        m.on_link_event(1, LinkEvent::Opened);
        let outcome = m.on_link_event(1, LinkEvent::Failed("reset".into()));
        assert_eq!(outcome, LinkOutcome::Failed("reset".into()));
        assert_eq!(m.phase(), ConnectionPhase::Connected);
    }

    #[tokio::test]
    async fn stale_generation_is_ignored() {
        let (mut m, _rx) = manager();
        m.connect();
        m.close();
        m.connect();
        assert_eq!(m.generation(), 2);

        // The first link's late events must not touch the second attempt.
        assert_eq!(m.on_link_event(1, LinkEvent::Opened), LinkOutcome::Ignored);
        assert_eq!(
            m.on_link_event(1, LinkEvent::Closed { reason: None }),
            LinkOutcome::Ignored
        );
        assert_eq!(m.phase(), ConnectionPhase::Connecting);
    }

    #[tokio::test]
    async fn events_after_close_are_ignored() {
        let (mut m, _rx) = manager();
        m.connect();
        m.on_link_event(1, LinkEvent::Opened);
        assert!(m.close());
        assert_eq!(
            m.on_link_event(1, LinkEvent::Frame("{}".into())),
            LinkOutcome::Ignored
        );
        assert_eq!(
            m.on_link_event(1, LinkEvent::Closed { reason: None }),
            LinkOutcome::Ignored
        );
        assert_eq!(m.phase(), ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn frame_before_open_is_ignored() {
        let (mut m, _rx) = manager();
        m.connect();
        assert_eq!(
            m.on_link_event(1, LinkEvent::Frame("{}".into())),
            LinkOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn send_is_admitted_only_when_connected() {
        let (mut m, _rx) = manager();
        assert!(!m.send(Direction::Up));

        m.connect();
        assert!(!m.send(Direction::Up));

        m.on_link_event(1, LinkEvent::Opened);
        assert!(m.send(Direction::Up));

        m.close();
        assert!(!m.send(Direction::Up));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (mut m, _rx) = manager();
        assert!(!m.close());
        m.connect();
        assert!(m.close());
        assert!(!m.close());
        assert_eq!(m.phase(), ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn close_while_connecting_cancels_the_attempt() {
        let (mut m, mut rx) = manager();
        m.connect();
        m.close();

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ClientEvent::Link {
                generation: 1,
                event: LinkEvent::Closed {
                    reason: Some("cancelled".into())
                },
            }
        );
    }
}
