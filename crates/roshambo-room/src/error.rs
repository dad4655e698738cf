//! Error types for the room layer.

use roshambo_protocol::{RoomCode, Slot};

/// Errors that can occur during room operations.
///
/// All of them are scoped to one connection or one room; none is fatal
/// to the server.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Both slots are taken. The joiner is turned away; the room and its
    /// participants are untouched.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The submitted move is not one of `r`, `p`, `s`.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// No participant occupies this slot.
    #[error("no participant in slot {0}")]
    UnknownSlot(Slot),

    /// The slot already has a move for the current round. The first move
    /// stands.
    #[error("slot {0} already moved this round")]
    DuplicateMove(Slot),

    /// The room is in a phase that doesn't allow this operation, e.g.
    /// moving before an opponent has joined.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// A [`RoomConfig`](crate::RoomConfig) value no room could run with.
    #[error("invalid room config: {0}")]
    InvalidConfig(String),

    /// The room's actor has shut down (or is shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
