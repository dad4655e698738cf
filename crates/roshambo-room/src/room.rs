//! The room state machine: membership, move collection, and scoring for
//! a single match.
//!
//! `Room` is plain synchronous data. It never touches the network and has
//! no locking of its own; the room actor owns it exclusively and feeds it
//! one command at a time, which is what makes every operation here atomic
//! with respect to the other participant.

use roshambo_protocol::{Move, RoomCode, Scores, Slot};

use crate::rules::{self, Outcome};
use crate::{RoomError, RoomPhase, ScoreTracker};

/// Everything a resolved round produced.
///
/// Captured before the pending moves are cleared, so it can be used to
/// notify both participants after the room has already moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub outcome: Outcome,
    /// Scores after this round was counted.
    pub scores: Scores,
    /// The moves that were resolved, indexed by slot.
    pub moves: [Move; 2],
    /// Set when this round ended the match.
    pub match_winner: Option<Slot>,
}

impl RoundResult {
    /// The move `slot`'s opponent played, i.e. `opponent_move` in the
    /// message sent to `slot`.
    pub fn opponent_move(&self, slot: Slot) -> Move {
        self.moves[slot.opponent().index()]
    }

    pub fn concluded(&self) -> bool {
        self.match_winner.is_some()
    }
}

/// What a departure did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Nobody is left.
    Empty,
    /// A started match lost a participant; the one remaining can never
    /// finish it.
    Abandoned,
}

/// One match: up to two participants, the current round's moves, and the
/// running score.
///
/// `P` is whatever the owner uses to reach a participant (the actor uses
/// an outbound message channel).
#[derive(Debug)]
pub struct Room<P> {
    code: RoomCode,
    participants: [Option<P>; 2],
    pending: [Option<Move>; 2],
    scores: ScoreTracker,
    /// Set by the first departure. A vacated room never takes new joins.
    vacated: bool,
}

impl<P> Room<P> {
    pub fn new(code: RoomCode, winning_points: u32) -> Self {
        Self {
            code,
            participants: [None, None],
            pending: [None, None],
            scores: ScoreTracker::new(winning_points),
            vacated: false,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// The slot the next [`join`](Self::join) would take.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when both slots are taken,
    /// [`RoomError::InvalidState`] when the room has concluded or been
    /// vacated.
    pub fn open_slot(&self) -> Result<Slot, RoomError> {
        if self.is_closed() {
            return Err(RoomError::InvalidState(format!(
                "cannot join room {} in phase {}",
                self.code,
                self.phase()
            )));
        }
        if !self.phase().is_joinable() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        Slot::ALL
            .into_iter()
            .find(|slot| self.participants[slot.index()].is_none())
            .ok_or_else(|| RoomError::RoomFull(self.code.clone()))
    }

    /// Seats a new participant in the lowest free slot.
    ///
    /// # Errors
    /// As [`open_slot`](Self::open_slot).
    pub fn join(&mut self, participant: P) -> Result<Slot, RoomError> {
        let slot = self.open_slot()?;
        self.participants[slot.index()] = Some(participant);
        Ok(slot)
    }

    /// Records `slot`'s move for the current round.
    ///
    /// # Errors
    /// - [`RoomError::UnknownSlot`] if nobody sits in `slot`
    /// - [`RoomError::InvalidState`] before both have joined, or once the
    ///   room is closed
    /// - [`RoomError::InvalidMove`] if `raw` isn't `r`, `p` or `s`
    /// - [`RoomError::DuplicateMove`] if `slot` already moved this round
    pub fn submit_move(&mut self, slot: Slot, raw: &str) -> Result<(), RoomError> {
        if self.participants[slot.index()].is_none() {
            return Err(RoomError::UnknownSlot(slot));
        }
        let phase = self.phase();
        if !phase.accepts_moves() {
            return Err(RoomError::InvalidState(format!(
                "room {} is not accepting moves in phase {phase}",
                self.code
            )));
        }
        let choice: Move = raw
            .parse()
            .map_err(|_| RoomError::InvalidMove(raw.to_string()))?;
        let pending = &mut self.pending[slot.index()];
        if pending.is_some() {
            return Err(RoomError::DuplicateMove(slot));
        }
        *pending = Some(choice);
        Ok(())
    }

    /// `true` when every joined slot (both of them) has moved.
    pub fn round_ready(&self) -> bool {
        self.participant_count() == 2 && self.pending.iter().all(Option::is_some)
    }

    /// Resolves the round, counts the score, and clears the moves for the
    /// next round, all in one step.
    ///
    /// # Errors
    /// [`RoomError::InvalidState`] if the round isn't ready.
    pub fn resolve_round(&mut self) -> Result<RoundResult, RoomError> {
        let (Some(zero), Some(one)) = (self.pending[0], self.pending[1]) else {
            return Err(RoomError::InvalidState(format!(
                "round in room {} is not ready",
                self.code
            )));
        };
        if self.participant_count() != 2 {
            return Err(RoomError::InvalidState(format!(
                "round in room {} is missing a participant",
                self.code
            )));
        }

        let outcome = rules::resolve(zero, one);
        if let Outcome::Winner(slot) = outcome {
            self.scores.increment(slot);
        }
        self.pending = [None, None];

        Ok(RoundResult {
            outcome,
            scores: self.scores.snapshot(),
            moves: [zero, one],
            match_winner: self.scores.winner(),
        })
    }

    pub fn match_concluded(&self) -> bool {
        self.scores.has_concluded()
    }

    /// Removes the participant in `slot` and abandons any unresolved
    /// round.
    ///
    /// # Errors
    /// [`RoomError::UnknownSlot`] if nobody sits in `slot`.
    pub fn leave(&mut self, slot: Slot) -> Result<LeaveOutcome, RoomError> {
        if self.participants[slot.index()].take().is_none() {
            return Err(RoomError::UnknownSlot(slot));
        }
        self.pending = [None, None];
        self.vacated = true;
        Ok(if self.participant_count() == 0 {
            LeaveOutcome::Empty
        } else {
            LeaveOutcome::Abandoned
        })
    }

    /// `true` once the room can make no further progress and should be
    /// evicted.
    pub fn is_closed(&self) -> bool {
        self.vacated || self.match_concluded()
    }

    pub fn phase(&self) -> RoomPhase {
        if self.match_concluded() {
            return RoomPhase::Concluded;
        }
        match self.participant_count() {
            0 => RoomPhase::Empty,
            1 if self.vacated => RoomPhase::Abandoned,
            1 => RoomPhase::Filling,
            _ if self.pending.iter().any(Option::is_some) => {
                RoomPhase::RoundPending
            }
            _ => RoomPhase::Active,
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_some()).count()
    }

    pub fn participant(&self, slot: Slot) -> Option<&P> {
        self.participants[slot.index()].as_ref()
    }

    /// Joined participants with their slots, slot 0 first.
    pub fn participants(&self) -> impl Iterator<Item = (Slot, &P)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.participant(slot).map(|p| (slot, p)))
    }

    /// Whether `slot` has moved in the current round.
    pub fn has_moved(&self, slot: Slot) -> bool {
        self.pending[slot.index()].is_some()
    }

    pub fn scores(&self) -> Scores {
        self.scores.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room<&'static str> {
        Room::new(RoomCode::parse("4821").unwrap(), 3)
    }

    fn full_room() -> Room<&'static str> {
        let mut room = room();
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        room
    }

    fn play(room: &mut Room<&'static str>, zero: &str, one: &str) -> RoundResult {
        room.submit_move(Slot::Zero, zero).unwrap();
        room.submit_move(Slot::One, one).unwrap();
        assert!(room.round_ready());
        room.resolve_round().unwrap()
    }

    // =====================================================================
    // join
    // =====================================================================

    #[test]
    fn test_join_assigns_slots_in_arrival_order() {
        let mut room = room();
        assert_eq!(room.phase(), RoomPhase::Empty);
        assert_eq!(room.join("alice").unwrap(), Slot::Zero);
        assert_eq!(room.phase(), RoomPhase::Filling);
        assert_eq!(room.join("bob").unwrap(), Slot::One);
        assert_eq!(room.phase(), RoomPhase::Active);
        assert_eq!(room.participant(Slot::One), Some(&"bob"));
    }

    #[test]
    fn test_third_join_is_room_full_and_changes_nothing() {
        let mut room = full_room();
        let err = room.join("carol").unwrap_err();
        assert!(matches!(err, RoomError::RoomFull(_)));
        assert_eq!(room.participant_count(), 2);
        let seated: Vec<_> = room.participants().map(|(_, p)| *p).collect();
        assert_eq!(seated, vec!["alice", "bob"]);
    }

    #[test]
    fn test_open_slot_peeks_without_seating() {
        let mut room = room();
        assert_eq!(room.open_slot().unwrap(), Slot::Zero);
        assert_eq!(room.open_slot().unwrap(), Slot::Zero);
        assert_eq!(room.participant_count(), 0);
        room.join("alice").unwrap();
        assert_eq!(room.open_slot().unwrap(), Slot::One);
        room.join("bob").unwrap();
        assert!(matches!(room.open_slot(), Err(RoomError::RoomFull(_))));
    }

    // =====================================================================
    // submit_move
    // =====================================================================

    #[test]
    fn test_submit_before_opponent_joins_is_rejected() {
        let mut room = room();
        room.join("alice").unwrap();
        let err = room.submit_move(Slot::Zero, "r").unwrap_err();
        assert!(matches!(err, RoomError::InvalidState(_)));
        assert!(!room.has_moved(Slot::Zero));
    }

    #[test]
    fn test_submit_unknown_slot() {
        let mut room = room();
        room.join("alice").unwrap();
        let err = room.submit_move(Slot::One, "r").unwrap_err();
        assert!(matches!(err, RoomError::UnknownSlot(Slot::One)));
    }

    #[test]
    fn test_submit_invalid_move_leaves_round_untouched() {
        let mut room = full_room();
        for bad in ["x", "rock", "", "R"] {
            let err = room.submit_move(Slot::Zero, bad).unwrap_err();
            assert!(matches!(err, RoomError::InvalidMove(_)), "{bad:?}");
        }
        assert_eq!(room.phase(), RoomPhase::Active);
    }

    #[test]
    fn test_duplicate_move_keeps_the_first() {
        let mut room = full_room();
        room.submit_move(Slot::Zero, "r").unwrap();
        assert_eq!(room.phase(), RoomPhase::RoundPending);

        let err = room.submit_move(Slot::Zero, "p").unwrap_err();
        assert!(matches!(err, RoomError::DuplicateMove(Slot::Zero)));

        room.submit_move(Slot::One, "s").unwrap();
        let result = room.resolve_round().unwrap();
        assert_eq!(result.moves, [Move::Rock, Move::Scissors]);
    }

    // =====================================================================
    // resolve_round
    // =====================================================================

    #[test]
    fn test_resolve_before_ready_is_rejected() {
        let mut room = full_room();
        room.submit_move(Slot::One, "p").unwrap();
        assert!(!room.round_ready());
        assert!(matches!(
            room.resolve_round(),
            Err(RoomError::InvalidState(_))
        ));
    }

    #[test]
    fn test_rock_beats_scissors_example() {
        let mut room = full_room();
        let result = play(&mut room, "r", "s");
        assert_eq!(result.outcome, Outcome::Winner(Slot::Zero));
        assert_eq!(result.scores, Scores::new(1, 0));
        assert_eq!(result.opponent_move(Slot::Zero), Move::Scissors);
        assert_eq!(result.opponent_move(Slot::One), Move::Rock);
        assert!(!result.concluded());
    }

    #[test]
    fn test_resolve_resets_round_but_not_score() {
        let mut room = full_room();
        play(&mut room, "p", "r");
        assert_eq!(room.phase(), RoomPhase::Active);
        assert!(!room.has_moved(Slot::Zero));
        assert!(!room.has_moved(Slot::One));
        assert_eq!(room.scores(), Scores::new(1, 0));
    }

    #[test]
    fn test_tie_increments_neither() {
        let mut room = full_room();
        let result = play(&mut room, "s", "s");
        assert_eq!(result.outcome, Outcome::Tie);
        assert_eq!(result.scores, Scores::new(0, 0));
    }

    #[test]
    fn test_match_concludes_on_third_win_not_before() {
        let mut room = full_room();
        let first = play(&mut room, "r", "p");
        let second = play(&mut room, "r", "r");
        let third = play(&mut room, "s", "r");
        assert!(!first.concluded());
        assert!(!second.concluded());
        assert!(!third.concluded());
        assert_eq!(third.scores, Scores::new(0, 2));

        let last = play(&mut room, "p", "s");
        assert_eq!(last.match_winner, Some(Slot::One));
        assert_eq!(last.scores, Scores::new(0, 3));
        assert!(room.match_concluded());
        assert_eq!(room.phase(), RoomPhase::Concluded);
        assert!(room.is_closed());
    }

    #[test]
    fn test_scores_are_monotonic_one_side_per_decisive_round() {
        let mut room = Room::new(RoomCode::parse("long").unwrap(), 100);
        room.join("alice").unwrap();
        room.join("bob").unwrap();

        let mut previous = room.scores();
        for zero in Move::ALL {
            for one in Move::ALL {
                let result = play(&mut room, zero.symbol(), one.symbol());
                let gained: Vec<Slot> = Slot::ALL
                    .into_iter()
                    .filter(|s| result.scores[*s] > previous[*s])
                    .collect();
                match result.outcome {
                    Outcome::Tie => assert!(gained.is_empty()),
                    Outcome::Winner(slot) => {
                        assert_eq!(gained, vec![slot]);
                        assert_eq!(result.scores[slot], previous[slot] + 1);
                    }
                }
                previous = result.scores;
            }
        }
    }

    #[test]
    fn test_concluded_room_refuses_moves_and_joins() {
        let mut room = Room::new(RoomCode::parse("quick").unwrap(), 1);
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        play(&mut room, "r", "s");

        assert!(matches!(
            room.submit_move(Slot::Zero, "r"),
            Err(RoomError::InvalidState(_))
        ));
        assert!(matches!(room.join("carol"), Err(RoomError::InvalidState(_))));
    }

    // =====================================================================
    // leave
    // =====================================================================

    #[test]
    fn test_solo_leave_empties_the_room() {
        let mut room = room();
        room.join("alice").unwrap();
        assert_eq!(room.leave(Slot::Zero).unwrap(), LeaveOutcome::Empty);
        assert_eq!(room.phase(), RoomPhase::Empty);
        assert!(room.is_closed());
    }

    #[test]
    fn test_leave_mid_round_abandons_the_round() {
        let mut room = full_room();
        room.submit_move(Slot::One, "r").unwrap();

        assert_eq!(room.leave(Slot::Zero).unwrap(), LeaveOutcome::Abandoned);
        assert_eq!(room.phase(), RoomPhase::Abandoned);
        assert!(!room.has_moved(Slot::One), "pending move is discarded");
        assert!(!room.round_ready());
        assert!(matches!(
            room.submit_move(Slot::One, "p"),
            Err(RoomError::InvalidState(_))
        ));
    }

    #[test]
    fn test_leave_unknown_slot() {
        let mut room = room();
        assert!(matches!(
            room.leave(Slot::One),
            Err(RoomError::UnknownSlot(Slot::One))
        ));
        assert!(!room.is_closed());
    }

    #[test]
    fn test_vacated_room_refuses_new_joins() {
        let mut room = room();
        room.join("alice").unwrap();
        room.leave(Slot::Zero).unwrap();
        assert!(matches!(room.join("bob"), Err(RoomError::InvalidState(_))));
    }
}
