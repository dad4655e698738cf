//! Wire protocol for Roshambo.
//!
//! This crate defines the "language" that browser clients and the server
//! speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Move`], [`Slot`],
//!   [`Scores`], [`RoomCode`]) — what travels on the wire, and the
//!   identifiers the wire refers to.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Room (match state)
//! ```
//!
//! The protocol layer knows nothing about connections or rooms.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, GAME_STARTED_TEXT, INVALID_CODE_TEXT, MAX_ROOM_CODE_LEN,
    Move, ROOM_FULL_TEXT, RoomCode, RoomId, Scores, ServerMessage, Slot,
};
