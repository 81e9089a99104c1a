//! # Terminal Snake Client
//!
//! Plays against a real game server from the terminal:
//!
//! 1. Connects to the snake server over WebSocket
//! 2. Draws every snapshot with crossterm
//! 3. Forwards arrow keys / WASD; `R` reconnects or restarts
//! 4. Keeps the high score in `snake_high_score.toml`
//!
//! `Esc`, `q` or `Ctrl+C` quits.
//!
//! ## Running
//!
//! ```sh
//! # Start the game server on localhost:8080, then:
//! cargo run --example terminal
//!
//! # Verbose logs go to stderr:
//! RUST_LOG=debug cargo run --example terminal 2>snake.log
//! ```

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use snake_stream_client::{
    ClientEvent, ClientView, FileScoreStore, Key, Point, SnakeClient, SnakeConfig,
    WebSocketConnector,
};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // ── Terminal ────────────────────────────────────────────────────
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run(&mut out).await;

    execute!(out, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

async fn run(out: &mut io::Stdout) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = SnakeClient::start(
        WebSocketConnector,
        FileScoreStore::default(),
        SnakeConfig::new(),
    );

    // Keyboard reading blocks, so it lives on its own thread and feeds the
    // client inbox like any other event source.
    let keys = client.sender();
    let (quit_tx, mut quit_rx) = mpsc::unbounded_channel::<()>();
    std::thread::spawn(move || read_keys(keys, quit_tx));

    render(out, client.view())?;
    loop {
        tokio::select! {
            event = client.next_event() => {
                let Some(event) = event else { break };
                client.dispatch(event);
                render(out, client.view())?;
            }
            _ = quit_rx.recv() => break,
        }
    }

    client.close();
    Ok(())
}

/// Forward key presses to the client until a quit key is pressed.
fn read_keys(keys: mpsc::UnboundedSender<ClientEvent>, quit: mpsc::UnboundedSender<()>) {
    loop {
        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_quit(&key) {
            let _ = quit.send(());
            return;
        }
        if keys.send(ClientEvent::Key(map_key(key.code))).is_err() {
            return;
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn render(out: &mut io::Stdout, view: ClientView<'_>) -> io::Result<()> {
    queue!(
        out,
        terminal::Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        Print("Snake Game"),
        cursor::MoveTo(0, 1),
        Print(format!("{}   High Score: {}", view.status, view.high_score)),
    )?;

    let Some(snapshot) = view.snapshot else {
        queue!(out, cursor::MoveTo(0, 3), Print("Loading game board..."))?;
        return out.flush();
    };

    let width = usize::try_from(snapshot.board_width).unwrap_or(0);
    let height = usize::try_from(snapshot.board_height).unwrap_or(0);
    let head = snapshot.head();

    for y in 0..height {
        let mut row = String::with_capacity(width * 2);
        for x in 0..width {
            let cell = Point::new(x as i32, y as i32);
            let glyph = if Some(cell) == head {
                "@ "
            } else if snapshot.snake_body.contains(&cell) {
                "o "
            } else if snapshot.food == Some(cell) {
                "* "
            } else {
                ". "
            };
            row.push_str(glyph);
        }
        queue!(out, cursor::MoveTo(0, 3 + y as u16), Print(row))?;
    }
    out.flush()
}
