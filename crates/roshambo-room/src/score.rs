//! Cumulative match score.

use roshambo_protocol::{Scores, Slot};

/// Win counts for one room, plus the threshold that ends the match.
///
/// Counts only ever go up. Rounds reset; the score doesn't.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    scores: Scores,
    winning_points: u32,
}

impl ScoreTracker {
    /// Starts at {0: 0, 1: 0}.
    pub fn new(winning_points: u32) -> Self {
        Self {
            scores: Scores::default(),
            winning_points,
        }
    }

    /// Credits a round win to `slot`. Never called for a tie.
    pub fn increment(&mut self, slot: Slot) {
        self.scores[slot] += 1;
    }

    /// `true` once either side has reached the threshold.
    pub fn has_concluded(&self) -> bool {
        self.winner().is_some()
    }

    /// The slot that reached the threshold, if any.
    pub fn winner(&self) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.scores[*slot] == self.winning_points)
    }

    pub fn snapshot(&self) -> Scores {
        self.scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_tracker_starts_at_zero() {
        let tracker = ScoreTracker::new(3);
        assert_eq!(tracker.snapshot(), Scores::new(0, 0));
        assert!(!tracker.has_concluded());
        assert_eq!(tracker.winner(), None);
    }

    #[test]
    fn test_score_tracker_concludes_exactly_at_threshold() {
        let mut tracker = ScoreTracker::new(3);
        tracker.increment(Slot::One);
        tracker.increment(Slot::Zero);
        tracker.increment(Slot::One);
        assert!(!tracker.has_concluded(), "2 points is not 3");

        tracker.increment(Slot::One);
        assert!(tracker.has_concluded());
        assert_eq!(tracker.winner(), Some(Slot::One));
        assert_eq!(tracker.snapshot(), Scores::new(1, 3));
    }

    #[test]
    fn test_score_tracker_custom_threshold() {
        let mut tracker = ScoreTracker::new(1);
        tracker.increment(Slot::Zero);
        assert_eq!(tracker.winner(), Some(Slot::Zero));
    }
}
