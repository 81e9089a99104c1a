#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Wire-format tests for the snake stream protocol.
//!
//! Checks snapshot decoding against JSON fixtures shaped exactly like the game
//! server's output, and the outbound direction frames.

use snake_stream_client::protocol::{Direction, GameSnapshot, GameStatus, Point};
use snake_stream_client::SnakeError;

// ════════════════════════════════════════════════════════════════════
// Fixtures
// ════════════════════════════════════════════════════════════════════

/// A frame as emitted by the game server mid-game (field order follows the
/// server's payload struct, not ours).
const SERVER_RUNNING_FRAME: &str = r#"{"boardWidth":30,"boardHeight":20,"snakeBody":[{"X":15,"Y":10},{"X":14,"Y":10},{"X":13,"Y":10}],"food":{"X":3,"Y":17},"score":0,"gameState":"Running"}"#;

/// The final frame the server sends before closing a lost session.
const SERVER_LOST_FRAME: &str = r#"{"boardWidth":30,"boardHeight":20,"snakeBody":[{"X":29,"Y":4},{"X":28,"Y":4},{"X":27,"Y":4},{"X":26,"Y":4}],"food":{"X":8,"Y":2},"score":1,"gameState":"Lost"}"#;

// ════════════════════════════════════════════════════════════════════
// Inbound snapshots
// ════════════════════════════════════════════════════════════════════

#[test]
fn server_running_frame_decodes() {
    let snapshot = GameSnapshot::from_frame(SERVER_RUNNING_FRAME).expect("decode");
    assert_eq!(snapshot.board_width, 30);
    assert_eq!(snapshot.board_height, 20);
    assert_eq!(
        snapshot.snake_body,
        vec![Point::new(15, 10), Point::new(14, 10), Point::new(13, 10)]
    );
    assert_eq!(snapshot.food, Some(Point::new(3, 17)));
    assert_eq!(snapshot.game_state, GameStatus::Running);
    assert_eq!(snapshot.score, 0);
}

#[test]
fn server_lost_frame_decodes() {
    let snapshot = GameSnapshot::from_frame(SERVER_LOST_FRAME).expect("decode");
    assert_eq!(snapshot.game_state, GameStatus::Lost);
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.head(), Some(Point::new(29, 4)));
    assert!(!snapshot.is_running());
}

#[test]
fn snake_body_keeps_segment_order() {
    let json = r#"{"boardWidth":5,"boardHeight":5,"snakeBody":[{"X":0,"Y":0},{"X":0,"Y":1},{"X":1,"Y":1},{"X":1,"Y":0}],"food":null,"gameState":"Running","score":3}"#;
    let snapshot = GameSnapshot::from_frame(json).unwrap();
    let xs: Vec<(i32, i32)> = snapshot.snake_body.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(xs, vec![(0, 0), (0, 1), (1, 1), (1, 0)]);
}

#[test]
fn serialized_snapshot_uses_wire_field_names() {
    let snapshot = GameSnapshot {
        board_width: 2,
        board_height: 3,
        snake_body: vec![Point::new(1, 2)],
        food: None,
        game_state: GameStatus::Lost,
        score: 4,
    };
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "boardWidth": 2,
            "boardHeight": 3,
            "snakeBody": [{"X": 1, "Y": 2}],
            "food": null,
            "gameState": "Lost",
            "score": 4
        })
    );
}

#[test]
fn rejected_frames() {
    let cases = [
        ("not json", "garbage"),
        ("[]", "array instead of object"),
        ("{}", "empty object"),
        (
            r#"{"boardWidth":1,"boardHeight":1,"snakeBody":[],"food":null,"gameState":"running","score":0}"#,
            "lower-case game state",
        ),
        (
            r#"{"boardWidth":1,"boardHeight":1,"snakeBody":[],"food":null,"gameState":"Won","score":0}"#,
            "game state outside Running/Lost",
        ),
        (
            r#"{"boardWidth":1,"boardHeight":1,"snakeBody":[],"food":null,"score":0}"#,
            "missing game state",
        ),
        (
            r#"{"boardWidth":1,"boardHeight":1,"snakeBody":[{"X":"1","Y":0}],"food":null,"gameState":"Running","score":0}"#,
            "string coordinate",
        ),
        (
            r#"{"board_width":1,"board_height":1,"snake_body":[],"food":null,"game_state":"Running","score":0}"#,
            "snake_case keys",
        ),
    ];

    for (json, label) in cases {
        let err = GameSnapshot::from_frame(json).expect_err(label);
        assert!(matches!(err, SnakeError::Decode(_)), "{label}: {err:?}");
    }
}

// ════════════════════════════════════════════════════════════════════
// Outbound commands
// ════════════════════════════════════════════════════════════════════

#[test]
fn direction_frames_are_bare_upper_case_words() {
    let frames: Vec<&str> = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .map(Direction::as_wire)
        .collect();
    assert_eq!(frames, vec!["UP", "DOWN", "LEFT", "RIGHT"]);
}
