//! Round resolution: who wins a single throw.

use roshambo_protocol::{Move, Slot};

/// Result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Tie,
    Winner(Slot),
}

impl Outcome {
    /// The winning slot, or `None` on a tie. This is the `winner` field of
    /// a `result` message.
    pub fn winner(self) -> Option<Slot> {
        match self {
            Self::Tie => None,
            Self::Winner(slot) => Some(slot),
        }
    }
}

/// Resolves slot 0's move against slot 1's.
///
/// Pure and total over all nine pairs.
pub fn resolve(zero: Move, one: Move) -> Outcome {
    if zero == one {
        Outcome::Tie
    } else if zero.beats(one) {
        Outcome::Winner(Slot::Zero)
    } else {
        Outcome::Winner(Slot::One)
    }
}
