//! Input gate: keys to intents, intents to actions.
//!
//! The gate is pure. It reads the current phase and snapshot and says what
//! should happen; [`SnakeClient::handle_key`](crate::SnakeClient::handle_key)
//! carries the action out.

use crate::connection::ConnectionPhase;
use crate::protocol::{Direction, GameSnapshot, GameStatus};

/// A key press, independent of any terminal or windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
    /// Any key the gate has no mapping for.
    Other,
}

/// What the player meant by a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Steer(Direction),
    /// Reconnect when disconnected, restart when the game is over.
    Recover,
}

impl Intent {
    /// Map a key to an intent; unmapped keys yield `None`.
    ///
    /// Letter steering keys are lower-case only, the recovery key accepts both
    /// cases.
    pub fn from_key(key: Key) -> Option<Self> {
        let intent = match key {
            Key::ArrowUp | Key::Char('w') => Intent::Steer(Direction::Up),
            Key::ArrowDown | Key::Char('s') => Intent::Steer(Direction::Down),
            Key::ArrowLeft | Key::Char('a') => Intent::Steer(Direction::Left),
            Key::ArrowRight | Key::Char('d') => Intent::Steer(Direction::Right),
            Key::Char('r') | Key::Char('R') => Intent::Recover,
            _ => return None,
        };
        Some(intent)
    }
}

/// What the client should do about an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Forward the direction to the server.
    Send(Direction),
    /// Open a fresh connection.
    Connect,
    /// Close the connection to end the finished session.
    Close,
    /// Not eligible right now.
    Drop,
}

/// Whether the triggering key's default effect must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// A direction was forwarded; the key must not also scroll or type.
    Consumed,
    Ignored,
}

/// Decide what an intent does given the connection phase and the snapshot on
/// display.
pub fn decide(intent: Intent, phase: ConnectionPhase, snapshot: Option<&GameSnapshot>) -> GateAction {
    let game_state = snapshot.map(|s| s.game_state);
    match intent {
        Intent::Steer(direction) => {
            if phase == ConnectionPhase::Connected && game_state == Some(GameStatus::Running) {
                GateAction::Send(direction)
            } else {
                GateAction::Drop
            }
        }
        Intent::Recover => match (phase, game_state) {
            (ConnectionPhase::Disconnected, _) => GateAction::Connect,
            (ConnectionPhase::Connected, Some(GameStatus::Lost)) => GateAction::Close,
            _ => GateAction::Drop,
        },
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

    fn snapshot(game_state: GameStatus) -> GameSnapshot {
        GameSnapshot {
            board_width: 10,
            board_height: 10,
            snake_body: vec![],
            food: None,
            game_state,
            score: 0,
        }
    }

    const PHASES: [ConnectionPhase; 3] = [
        ConnectionPhase::Disconnected,
        ConnectionPhase::Connecting,
        ConnectionPhase::Connected,
    ];

    #[test]
    fn key_mapping() {
        assert_eq!(Intent::from_key(Key::ArrowUp), Some(Intent::Steer(Direction::Up)));
        assert_eq!(Intent::from_key(Key::Char('w')), Some(Intent::Steer(Direction::Up)));
        assert_eq!(Intent::from_key(Key::ArrowDown), Some(Intent::Steer(Direction::Down)));
        assert_eq!(Intent::from_key(Key::Char('s')), Some(Intent::Steer(Direction::Down)));
        assert_eq!(Intent::from_key(Key::ArrowLeft), Some(Intent::Steer(Direction::Left)));
        assert_eq!(Intent::from_key(Key::Char('a')), Some(Intent::Steer(Direction::Left)));
        assert_eq!(Intent::from_key(Key::ArrowRight), Some(Intent::Steer(Direction::Right)));
        assert_eq!(Intent::from_key(Key::Char('d')), Some(Intent::Steer(Direction::Right)));
        assert_eq!(Intent::from_key(Key::Char('r')), Some(Intent::Recover));
        assert_eq!(Intent::from_key(Key::Char('R')), Some(Intent::Recover));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        for key in [Key::Other, Key::Char('W'), Key::Char('x'), Key::Char(' '), Key::Char('q')] {
            assert_eq!(Intent::from_key(key), None, "{key:?}");
        }
    }

    #[test]
    fn steering_requires_connected_and_running() {
        let running = snapshot(GameStatus::Running);
        let lost = snapshot(GameStatus::Lost);
        for phase in PHASES {
            for snap in [None, Some(&running), Some(&lost)] {
                let action = decide(Intent::Steer(Direction::Left), phase, snap);
                let eligible = phase == ConnectionPhase::Connected
                    && snap.map(|s| s.game_state) == Some(GameStatus::Running);
                if eligible {
                    assert_eq!(action, GateAction::Send(Direction::Left));
                } else {
                    assert_eq!(action, GateAction::Drop, "{phase:?} {snap:?}");
                }
            }
        }
    }

    #[test]
    fn recover_branches_on_phase() {
        let running = snapshot(GameStatus::Running);
        let lost = snapshot(GameStatus::Lost);

        assert_eq!(decide(Intent::Recover, ConnectionPhase::Disconnected, None), GateAction::Connect);
        assert_eq!(
            decide(Intent::Recover, ConnectionPhase::Connected, Some(&lost)),
            GateAction::Close
        );
        assert_eq!(
            decide(Intent::Recover, ConnectionPhase::Connected, Some(&running)),
            GateAction::Drop
        );
        assert_eq!(decide(Intent::Recover, ConnectionPhase::Connected, None), GateAction::Drop);
        assert_eq!(
            decide(Intent::Recover, ConnectionPhase::Connecting, Some(&lost)),
            GateAction::Drop
        );
    }
}
