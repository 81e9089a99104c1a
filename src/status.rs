//! User-facing status line texts.

/// Shown while the very first connection attempt is in flight.
pub const CONNECTING: &str = "Connecting to server...";
/// Shown once the transport opens; replaces any stale status.
pub const CONNECTED: &str = "Connected! Game starting...";
/// Shown after any transition to disconnected.
pub const DISCONNECTED: &str = "Disconnected. Press R to reconnect.";
/// Shown when the transport reports an error.
pub const CONNECTION_ERROR: &str = "Connection error. Check if the backend server is running.";
/// Shown when the player asks to reconnect.
pub const RECONNECTING: &str = "Reconnecting...";
/// Shown when the player restarts a finished game.
pub const RESTARTING: &str = "Restarting...";

pub fn running(score: u32) -> String {
    format!("Score: {score}")
}

pub fn game_over(score: u32) -> String {
    format!("Game Over! Score: {score}. Press R to play again.")
}

pub fn new_high_score(score: u32) -> String {
    format!("Game Over! New High Score: {score}! Press R to play again.")
}
