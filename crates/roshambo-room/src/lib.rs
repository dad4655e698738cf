//! Room coordination for Roshambo.
//!
//! Each room runs as an isolated Tokio task (actor model) that exclusively
//! owns one match: who's seated, the current round's moves, and the score.
//!
//! # Key types
//!
//! - [`resolve`] — the round resolver, a pure function over two moves
//! - [`ScoreTracker`] — cumulative wins and the match threshold
//! - [`Room`] — the synchronous match state machine
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] — code → room mapping, safe under concurrent joins
//! - [`RoomPhase`] / [`RoomConfig`] — lifecycle and settings

mod actor;
mod config;
mod error;
mod registry;
mod room;
mod rules;
mod score;

pub use actor::{PlayerSender, RoomHandle, RoomInfo};
pub use config::{RoomConfig, RoomPhase, WINNING_POINTS};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{LeaveOutcome, Room, RoundResult};
pub use rules::{Outcome, resolve};
pub use score::ScoreTracker;
