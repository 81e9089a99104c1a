#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for snake client integration tests.
//!
//! Provides a channel-driven [`MockTransport`], a [`MockConnector`] that hands
//! out scripted connection results, and helpers for building snapshot JSON.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use snake_stream_client::{
    ClientEvent, Connector, GameSnapshot, GameStatus, Point, ScoreStore, SnakeClient, SnakeError,
    Transport,
};
use tokio::sync::mpsc;

// ── MockTransport ───────────────────────────────────────────────────

/// What the test side of a [`MockTransport`] can push into `recv()`.
pub type Incoming = Option<Result<String, SnakeError>>;

/// A transport whose inbound frames are pushed by the test through a channel.
///
/// `recv()` is cancel-safe because it only awaits `mpsc::Receiver::recv`.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Incoming>,
    sent: Arc<StdMutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

/// The test's end of a [`MockTransport`].
#[derive(Clone)]
pub struct ServerHandle {
    incoming: mpsc::UnboundedSender<Incoming>,
    /// Frames the client wrote.
    pub sent: Arc<StdMutex<Vec<String>>>,
    /// Number of `close()` calls the client made.
    pub closes: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> (Self, ServerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closes = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            incoming: rx,
            sent: Arc::clone(&sent),
            closes: Arc::clone(&closes),
        };
        let handle = ServerHandle {
            incoming: tx,
            sent,
            closes,
        };
        (transport, handle)
    }
}

impl ServerHandle {
    /// Deliver a text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.incoming.send(Some(Ok(frame.into())));
    }

    /// Make `recv()` fail with a receive error.
    pub fn fail(&self, reason: &str) {
        let _ = self
            .incoming
            .send(Some(Err(SnakeError::TransportReceive(reason.into()))));
    }

    /// Close the stream cleanly from the server side.
    pub fn hang_up(&self) {
        let _ = self.incoming.send(None);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), SnakeError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, SnakeError>> {
        match self.incoming.recv().await {
            Some(item) => item,
            // The test dropped its handle; behave like an idle server.
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), SnakeError> {
        self.closes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// Hands out scripted results, one per connection attempt.
///
/// When the script is exhausted, further attempts never complete, leaving the
/// client in the connecting phase.
#[derive(Clone, Default)]
pub struct MockConnector {
    script: Arc<StdMutex<VecDeque<Result<MockTransport, SnakeError>>>>,
    attempts: Arc<AtomicUsize>,
    urls: Arc<StdMutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful connection and return its server handle.
    pub fn accept(&self) -> ServerHandle {
        let (transport, handle) = MockTransport::new();
        self.script.lock().unwrap().push_back(Ok(transport));
        handle
    }

    /// Queue a refused connection.
    pub fn refuse(&self, reason: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(SnakeError::Connect(reason.into())));
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, url: &str) -> Result<MockTransport, SnakeError> {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        self.urls.lock().unwrap().push(url.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

// ── Dispatch helpers ────────────────────────────────────────────────

/// Take the next event off the client's inbox and dispatch it.
///
/// Panics if nothing arrives within a second.
pub async fn pump<C: Connector, S: ScoreStore>(client: &mut SnakeClient<C, S>) -> ClientEvent {
    let event = tokio::time::timeout(Duration::from_secs(1), client.next_event())
        .await
        .expect("timed out waiting for a client event")
        .expect("client inbox closed");
    client.dispatch(event.clone());
    event
}

/// Dispatch events until `done` holds for the client.
pub async fn pump_until<C: Connector, S: ScoreStore>(
    client: &mut SnakeClient<C, S>,
    mut done: impl FnMut(&SnakeClient<C, S>) -> bool,
) {
    while !done(client) {
        pump(client).await;
    }
}

/// Wait until the server side has observed `count` frames.
pub async fn wait_for_sent(server: &ServerHandle, count: usize) -> Vec<String> {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let sent = server.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for sent frames")
}

// ── JSON helper functions ───────────────────────────────────────────

/// A snapshot with a three-segment snake and food on the board.
pub fn snapshot(game_state: GameStatus, score: u32) -> GameSnapshot {
    GameSnapshot {
        board_width: 30,
        board_height: 20,
        snake_body: vec![Point::new(5, 5), Point::new(4, 5), Point::new(3, 5)],
        food: Some(Point::new(12, 9)),
        game_state,
        score,
    }
}

/// JSON for a `Running` snapshot with the given score.
pub fn running_json(score: u32) -> String {
    serde_json::to_string(&snapshot(GameStatus::Running, score)).expect("running_json serialization")
}

/// JSON for a `Lost` snapshot with the given score.
pub fn lost_json(score: u32) -> String {
    serde_json::to_string(&snapshot(GameStatus::Lost, score)).expect("lost_json serialization")
}
