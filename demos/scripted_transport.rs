//! # Scripted Transport Example
//!
//! Shows how to implement [`Transport`] and [`Connector`] over in-process
//! channels and drive a [`SnakeClient`] against a fake server that plays a
//! short game and loses. Useful for:
//!
//! - **Testing**: exercise the client without a real game server
//! - **Custom backends**: adapt any I/O layer to the client
//!
//! ## Running
//!
//! ```sh
//! cargo run --example scripted_transport
//! ```

use async_trait::async_trait;
use snake_stream_client::{
    ClientEvent, Connector, GameSnapshot, GameStatus, Key, MemoryScoreStore, Point, SnakeClient,
    SnakeConfig, SnakeError, Transport,
};
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────
// Step 1: A channel-based loopback transport
// ─────────────────────────────────────────────────────────────────────

/// Client half of the loopback.
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Server half of the loopback.
pub struct LoopbackServer {
    /// Frames the client sent.
    pub rx: mpsc::UnboundedReceiver<String>,
    /// Frames to deliver to the client. Dropping it ends the stream.
    pub tx: mpsc::UnboundedSender<String>,
}

fn loopback_pair() -> (LoopbackTransport, LoopbackServer) {
    let (client_tx, server_rx) = mpsc::unbounded_channel();
    let (server_tx, client_rx) = mpsc::unbounded_channel();
    (
        LoopbackTransport {
            tx: client_tx,
            rx: client_rx,
        },
        LoopbackServer {
            rx: server_rx,
            tx: server_tx,
        },
    )
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, message: String) -> Result<(), SnakeError> {
        self.tx
            .send(message)
            .map_err(|e| SnakeError::TransportSend(e.to_string()))
    }

    /// Cancel-safe because `mpsc::UnboundedReceiver::recv` is.
    async fn recv(&mut self) -> Option<Result<String, SnakeError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), SnakeError> {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: A connector that spins up a fake server per connection
// ─────────────────────────────────────────────────────────────────────

struct LoopbackConnector;

#[async_trait]
impl Connector for LoopbackConnector {
    type Transport = LoopbackTransport;

    async fn connect(&self, url: &str) -> Result<LoopbackTransport, SnakeError> {
        tracing::info!("opening loopback session for {url}");
        let (transport, server) = loopback_pair();
        tokio::spawn(fake_server(server));
        Ok(transport)
    }
}

/// Moves the snake right a few cells, echoing any direction it receives, then
/// runs it into the wall.
async fn fake_server(mut server: LoopbackServer) {
    let mut head = Point::new(2, 2);
    for score in 0..4 {
        let frame = GameSnapshot {
            board_width: 8,
            board_height: 5,
            snake_body: vec![head, Point::new(head.x - 1, head.y)],
            food: Some(Point::new(6, 3)),
            game_state: GameStatus::Running,
            score,
        };
        if let Ok(json) = serde_json::to_string(&frame) {
            let _ = server.tx.send(json);
        }
        while let Ok(command) = server.rx.try_recv() {
            tracing::info!("server received {command}");
        }
        head.x += 1;
        tokio::task::yield_now().await;
    }

    let lost = GameSnapshot {
        board_width: 8,
        board_height: 5,
        snake_body: vec![head],
        food: None,
        game_state: GameStatus::Lost,
        score: 4,
    };
    if let Ok(json) = serde_json::to_string(&lost) {
        let _ = server.tx.send(json);
    }

    // Keep the session open until the client hangs up.
    while server.rx.recv().await.is_some() {}
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: Drive the client
// ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut client = SnakeClient::start(
        LoopbackConnector,
        MemoryScoreStore::with_score(3),
        SnakeConfig::new().with_url("loopback://snake"),
    );
    let keys = client.sender();

    while let Some(event) = client.next_event().await {
        client.dispatch(event);
        let view = client.view();
        println!(
            "[{}] {} (high score {})",
            view.phase, view.status, view.high_score
        );

        match view.snapshot.map(|s| s.game_state) {
            // Steer once per running frame, as a player would.
            Some(GameStatus::Running) => {
                let _ = keys.send(ClientEvent::Key(Key::ArrowDown));
            }
            // Game over: restart, which ends this session.
            Some(GameStatus::Lost) => {
                let _ = keys.send(ClientEvent::Key(Key::Char('r')));
            }
            None if client.generation() > 0 && view.status.starts_with("Disconnected") => break,
            None => {}
        }
    }

    println!("final high score: {}", client.high_score());
}
