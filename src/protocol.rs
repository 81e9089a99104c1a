//! Wire types for the snake game stream.
//!
//! Inbound frames carry a complete [`GameSnapshot`] encoded as JSON with
//! camelCase top-level keys and upper-case point coordinates (`X`, `Y`).
//! Outbound frames are one of the bare strings produced by
//! [`Direction::as_wire`], with no envelope.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ── Enums ───────────────────────────────────────────────────────────

/// Whether the server-side game is still in play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    /// The snake is alive and accepting steering commands.
    Running,
    /// The snake collided; the session is over.
    Lost,
}

/// A steering command sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The exact text frame body the server expects for this direction.
    pub fn as_wire(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

// ── Structs ─────────────────────────────────────────────────────────

/// A board cell coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Point {
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A complete, self-contained description of the game at one instant.
///
/// Each snapshot replaces the previous one wholesale; the client never merges
/// or patches snapshots and never constructs one outside of tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board_width: u32,
    pub board_height: u32,
    /// Snake segments, head first.
    pub snake_body: Vec<Point>,
    /// `null` on the wire when there is no food on the board.
    pub food: Option<Point>,
    pub game_state: GameStatus,
    pub score: u32,
}

impl GameSnapshot {
    /// Decode a snapshot from an inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`SnakeError::Decode`](crate::SnakeError::Decode) if the frame
    /// is not JSON or does not match the snapshot shape exactly.
    pub fn from_frame(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns `true` while the game accepts steering commands.
    pub fn is_running(&self) -> bool {
        self.game_state == GameStatus::Running
    }

    /// The snake's head, if the body is non-empty.
    pub fn head(&self) -> Option<Point> {
        self.snake_body.first().copied()
    }
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

    #[test]
    fn decodes_server_frame() {
        let json = r#"{
            "boardWidth": 30,
            "boardHeight": 20,
            "snakeBody": [{"X": 5, "Y": 4}, {"X": 4, "Y": 4}, {"X": 3, "Y": 4}],
            "food": {"X": 10, "Y": 7},
            "score": 2,
            "gameState": "Running"
        }"#;
        let snapshot = GameSnapshot::from_frame(json).unwrap();
        assert_eq!(snapshot.board_width, 30);
        assert_eq!(snapshot.board_height, 20);
        assert_eq!(snapshot.head(), Some(Point::new(5, 4)));
        assert_eq!(snapshot.snake_body.len(), 3);
        assert_eq!(snapshot.food, Some(Point::new(10, 7)));
        assert!(snapshot.is_running());
    }

    #[test]
    fn null_food_is_absent() {
        let json = r#"{"boardWidth":3,"boardHeight":3,"snakeBody":[],"food":null,"gameState":"Lost","score":0}"#;
        let snapshot = GameSnapshot::from_frame(json).unwrap();
        assert!(snapshot.food.is_none());
        assert!(snapshot.head().is_none());
        assert_eq!(snapshot.game_state, GameStatus::Lost);
    }

    #[test]
    fn unknown_game_state_is_rejected() {
        let json = r#"{"boardWidth":3,"boardHeight":3,"snakeBody":[],"food":null,"gameState":"Paused","score":0}"#;
        assert!(GameSnapshot::from_frame(json).is_err());
    }

    #[test]
    fn negative_score_is_rejected() {
        let json = r#"{"boardWidth":3,"boardHeight":3,"snakeBody":[],"food":null,"gameState":"Running","score":-1}"#;
        assert!(GameSnapshot::from_frame(json).is_err());
    }

    #[test]
    fn lowercase_point_keys_are_rejected() {
        let json = r#"{"boardWidth":3,"boardHeight":3,"snakeBody":[{"x":1,"y":1}],"food":null,"gameState":"Running","score":0}"#;
        assert!(GameSnapshot::from_frame(json).is_err());
    }

    #[test]
    fn direction_wire_strings() {
        assert_eq!(Direction::Up.as_wire(), "UP");
        assert_eq!(Direction::Down.as_wire(), "DOWN");
        assert_eq!(Direction::Left.as_wire(), "LEFT");
        assert_eq!(Direction::Right.as_wire(), "RIGHT");
        assert_eq!(Direction::Left.to_string(), "LEFT");
    }
}
