//! Events processed by the client's dispatch loop.
//!
//! Every state change in the client is driven by exactly one [`ClientEvent`]
//! taken off the inbox. Link tasks push [`ClientEvent::Link`]; whatever reads
//! the keyboard pushes [`ClientEvent::Key`].

use crate::input::Key;

/// A single unit of work for [`SnakeClient::dispatch`](crate::SnakeClient::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Something happened on a connection attempt.
    Link {
        /// Generation of the connection attempt that produced the event.
        generation: u64,
        event: LinkEvent,
    },
    /// A key was pressed.
    Key(Key),
}

/// Notifications from one link task, in the order its transport produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The transport finished opening.
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// The transport reported an error. A [`Closed`](LinkEvent::Closed)
    /// always follows.
    Failed(String),
    /// The transport is gone. Always the last event of a link.
    Closed {
        /// Human-readable reason, if the close was not a clean server close.
        reason: Option<String>,
    },
}
