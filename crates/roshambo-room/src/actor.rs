//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel. Commands are handled one at a time, so a join, a move, or a
//! departure is never interleaved with another operation on the same room.
//! Notifications to participants go out through their own unbounded
//! channels; the actor never waits on a slow client.

use roshambo_protocol::{RoomCode, RoomId, Scores, ServerMessage, Slot};
use tokio::sync::{mpsc, oneshot};

use crate::room::{LeaveOutcome, Room, RoundResult};
use crate::{RoomConfig, RoomError, RoomPhase, RoomRegistry};

/// Channel sender for delivering outbound messages to a participant.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    /// Seat a new participant.
    Join {
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Slot, RoomError>>,
    },

    /// Record a move; resolves the round if it was the second one.
    Submit {
        slot: Slot,
        choice: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a participant.
    Leave {
        slot: Slot,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Stop the room without notifying anyone.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub code: RoomCode,
    pub phase: RoomPhase,
    pub player_count: usize,
    pub scores: Scores,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the registry holds one per room and each session keeps
/// its own copy after joining.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room instance's unique ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Asks the room to seat a participant whose notifications go to
    /// `sender`.
    pub async fn join(&self, sender: PlayerSender) -> Result<Slot, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Join { sender, reply }, rx).await?
    }

    /// Submits `slot`'s raw move for the current round.
    pub async fn submit(
        &self,
        slot: Slot,
        choice: impl Into<String>,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        let cmd = RoomCommand::Submit {
            slot,
            choice: choice.into(),
            reply,
        };
        self.request(cmd, rx).await?
    }

    /// Removes `slot` from the room.
    pub async fn leave(&self, slot: Slot) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Leave { slot, reply }, rx).await?
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::GetInfo { reply }, rx).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        cmd: RoomCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())?;
        rx.await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    room: Room<PlayerSender>,
    registry: RoomRegistry,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until the room closes or is shut down.
    ///
    /// When a command closes the room, the registry entry is removed
    /// before the command's reply is sent, so the caller never sees a
    /// stale room under this code once its call returns. A join is
    /// answered first and seated second; a room nobody ever sat in stops
    /// as soon as its only joiner gives up.
    async fn run(mut self) {
        tracing::debug!(room_id = %self.room_id, code = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            let before = self.room.phase();
            match cmd {
                RoomCommand::Join { sender, reply } => {
                    // Seat only once the joiner has its slot, so a joiner
                    // that gave up never reaches the room.
                    let seat = self.room.open_slot();
                    let offered = seat.as_ref().ok().copied();
                    match (reply.send(seat), offered) {
                        (Ok(()), Some(_)) => {
                            if let Err(e) = self.handle_join(sender) {
                                tracing::warn!(room_id = %self.room_id, error = %e, "seating failed");
                            }
                            self.track_phase(before);
                        }
                        (Err(_), Some(slot)) => {
                            tracing::debug!(room_id = %self.room_id, %slot, "joiner went away before being seated");
                            if self.room.participant_count() == 0 {
                                self.registry.evict(self.room.code(), self.room_id);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                RoomCommand::Submit { slot, choice, reply } => {
                    let result = self.handle_submit(slot, &choice);
                    self.track_phase(before);
                    self.evict_if_closed();
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { slot, reply } => {
                    let result = self.handle_leave(slot);
                    self.track_phase(before);
                    self.evict_if_closed();
                    let _ = reply.send(result);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    self.registry.evict(self.room.code(), self.room_id);
                    break;
                }
            }

            if self.room.is_closed() {
                self.evict_if_closed();
                break;
            }
        }

        tracing::debug!(room_id = %self.room_id, "room actor stopped");
        // Dropping the room drops every participant's sender, which is how
        // a remaining session learns the room is gone.
    }

    fn handle_join(&mut self, sender: PlayerSender) -> Result<Slot, RoomError> {
        let slot = self.room.join(sender)?;
        tracing::info!(
            room_id = %self.room_id,
            code = %self.room.code(),
            %slot,
            players = self.room.participant_count(),
            "player joined"
        );

        if self.room.participant_count() == 2 {
            tracing::info!(room_id = %self.room_id, "match started");
            for (slot, participant) in self.room.participants() {
                let _ = participant.send(ServerMessage::game_started(slot));
            }
        }
        Ok(slot)
    }

    fn handle_submit(&mut self, slot: Slot, choice: &str) -> Result<(), RoomError> {
        self.room.submit_move(slot, choice)?;
        tracing::debug!(room_id = %self.room_id, %slot, "move received");

        if self.room.round_ready() {
            let result = self.room.resolve_round()?;
            self.announce(&result);
        }
        Ok(())
    }

    fn handle_leave(&mut self, slot: Slot) -> Result<(), RoomError> {
        let outcome = self.room.leave(slot)?;
        tracing::info!(
            room_id = %self.room_id,
            code = %self.room.code(),
            %slot,
            players = self.room.participant_count(),
            "player left"
        );
        if outcome == LeaveOutcome::Abandoned {
            tracing::info!(room_id = %self.room_id, "match abandoned");
        }
        Ok(())
    }

    /// Queues the round's outcome for both participants: per-recipient
    /// `result` messages, or `game_over` if this round ended the match.
    /// Never both.
    fn announce(&self, result: &RoundResult) {
        match result.match_winner {
            Some(winner) => {
                tracing::info!(
                    room_id = %self.room_id,
                    %winner,
                    scores = ?result.scores,
                    "match concluded"
                );
                for (_, participant) in self.room.participants() {
                    let _ = participant.send(ServerMessage::GameOver { winner });
                }
            }
            None => {
                tracing::info!(
                    room_id = %self.room_id,
                    outcome = ?result.outcome,
                    scores = ?result.scores,
                    "round resolved"
                );
                for (slot, participant) in self.room.participants() {
                    let _ = participant.send(ServerMessage::Result {
                        winner: result.outcome.winner(),
                        scores: result.scores,
                        opponent_move: result.opponent_move(slot),
                    });
                }
            }
        }
    }

    fn track_phase(&self, before: RoomPhase) {
        let after = self.room.phase();
        if after != before {
            debug_assert!(
                before.can_transition_to(after),
                "illegal phase change {before} -> {after}"
            );
            tracing::debug!(room_id = %self.room_id, %before, %after, "room phase changed");
        }
    }

    fn evict_if_closed(&self) {
        if self.room.is_closed() {
            self.registry.evict(self.room.code(), self.room_id);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            code: self.room.code().clone(),
            phase: self.room.phase(),
            player_count: self.room.participant_count(),
            scores: self.room.scores(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    code: RoomCode,
    config: &RoomConfig,
    registry: RoomRegistry,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let actor = RoomActor {
        room_id,
        room: Room::new(code.clone(), config.winning_points),
        registry,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        code,
        sender: tx,
    }
}
