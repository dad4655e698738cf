//! Unified error type for the Roshambo server.

use roshambo_protocol::ProtocolError;
use roshambo_room::RoomError;
use roshambo_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RoshamboError {
    /// A transport-level error (bind, send, recv, close).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad room code).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, bad move, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
