//! Room configuration and phase state machine.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Score at which a match ends.
pub const WINNING_POINTS: u32 = 3;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Wins needed to take the match.
    pub winning_points: u32,

    /// Capacity of each room actor's command channel. Senders wait when
    /// it fills up.
    pub command_buffer: usize,

    /// How many times a join is retried when it races with a room under
    /// the same code shutting down.
    pub join_attempts: usize,
}

impl RoomConfig {
    /// Checks every field is usable.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] for a zero `winning_points` (every
    /// room would start out concluded), a zero `command_buffer`, or a
    /// zero `join_attempts`.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.winning_points == 0 {
            return Err(RoomError::InvalidConfig(
                "winning_points must be at least 1".into(),
            ));
        }
        if self.command_buffer == 0 {
            return Err(RoomError::InvalidConfig(
                "command_buffer must be at least 1".into(),
            ));
        }
        if self.join_attempts == 0 {
            return Err(RoomError::InvalidConfig(
                "join_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            winning_points: WINNING_POINTS,
            command_buffer: 64,
            join_attempts: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its lifecycle.
///
/// ```text
/// Empty → Filling → Active ⇄ RoundPending → Concluded
///            │         │          │
///            ▼         └────┬─────┘
///          Empty            ▼
///                       Abandoned
/// ```
///
/// - **Empty**: no participants. A fresh room, or one whose only
///   participant left before an opponent arrived.
/// - **Filling**: one participant waiting for an opponent.
/// - **Active**: both joined, no move yet this round.
/// - **RoundPending**: one move is in for the current round.
/// - **Concluded**: a score reached the threshold. Terminal.
/// - **Abandoned**: a participant left a started match. Terminal.
///
/// The phase is derived from the room's data rather than stored, so it
/// can't drift out of sync with membership or moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Empty,
    Filling,
    Active,
    RoundPending,
    Concluded,
    Abandoned,
}

impl RoomPhase {
    /// Returns `true` if a new participant may join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Empty | Self::Filling)
    }

    /// Returns `true` while moves are being collected.
    pub fn accepts_moves(&self) -> bool {
        matches!(self, Self::Active | Self::RoundPending)
    }

    /// Returns `true` if a single operation may move a room from `self`
    /// to `target`.
    pub fn can_transition_to(self, target: Self) -> bool {
        use RoomPhase::*;
        matches!(
            (self, target),
            (Empty, Filling)
                | (Filling, Active)
                | (Filling, Empty)
                | (Active, RoundPending)
                | (Active, Abandoned)
                | (RoundPending, Active)
                | (RoundPending, Concluded)
                | (RoundPending, Abandoned)
        )
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Filling => write!(f, "Filling"),
            Self::Active => write!(f, "Active"),
            Self::RoundPending => write!(f, "RoundPending"),
            Self::Concluded => write!(f, "Concluded"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}
