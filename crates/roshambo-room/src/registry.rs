//! Room registry: maps room codes to running room actors.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use roshambo_protocol::{RoomCode, RoomId, Slot};

use crate::actor::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle};

/// Counter for generating unique room instance IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Every live room, keyed by code.
///
/// Cheap to clone: clones share one map. The server owns one registry and
/// hands clones to each session and each room actor (rooms remove their
/// own entry when they close).
///
/// The map is sharded, so work on different codes doesn't contend.
/// Creation goes through the map's entry API, which makes "look up or
/// insert" a single step: two first joiners racing on an unseen code
/// always end up in the same room.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomCode, RoomHandle>>,
    config: Arc<RoomConfig>,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms use `config`.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] if `config` fails
    /// [`RoomConfig::validate`].
    pub fn new(config: RoomConfig) -> Result<Self, RoomError> {
        config.validate()?;
        Ok(Self {
            rooms: Arc::new(DashMap::new()),
            config: Arc::new(config),
        })
    }

    /// Returns the room for `code`, spawning it if none exists.
    pub fn get_or_create(&self, code: &RoomCode) -> RoomHandle {
        self.rooms
            .entry(code.clone())
            .or_insert_with(|| {
                let room_id =
                    RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
                tracing::info!(%room_id, %code, "room created");
                spawn_room(room_id, code.clone(), &self.config, self.clone())
            })
            .value()
            .clone()
    }

    /// Finds or creates the room for `code` and seats a participant in it.
    ///
    /// A room that closed between lookup and join answers `Unavailable`;
    /// its stale entry is dropped and the join is retried against a fresh
    /// room, up to `join_attempts` times.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] if both slots are taken, or
    /// [`RoomError::Unavailable`] if every attempt raced a closing room.
    pub async fn join(
        &self,
        code: &RoomCode,
        sender: PlayerSender,
    ) -> Result<(RoomHandle, Slot), RoomError> {
        for attempt in 1..=self.config.join_attempts {
            let handle = self.get_or_create(code);
            match handle.join(sender.clone()).await {
                Ok(slot) => return Ok((handle, slot)),
                Err(RoomError::Unavailable(_)) => {
                    tracing::warn!(
                        %code,
                        room_id = %handle.room_id(),
                        attempt,
                        "room closed while joining, retrying"
                    );
                    self.evict(code, handle.room_id());
                }
                Err(e) => return Err(e),
            }
        }
        Err(RoomError::Unavailable(code.clone()))
    }

    /// Removes the room for `code` and shuts its actor down. Idempotent:
    /// returns `false` if there was nothing to remove.
    pub async fn remove(&self, code: &RoomCode) -> bool {
        let Some((_, handle)) = self.rooms.remove(code) else {
            return false;
        };
        tracing::info!(%code, room_id = %handle.room_id(), "room removed");
        let _ = handle.shutdown().await;
        true
    }

    /// Removes `code`'s entry only if it still belongs to room instance
    /// `room_id`. Used by rooms evicting themselves, so a closing room can
    /// never remove a successor created under the same code.
    pub(crate) fn evict(&self, code: &RoomCode, room_id: RoomId) {
        if self
            .rooms
            .remove_if(code, |_, handle| handle.room_id() == room_id)
            .is_some()
        {
            tracing::info!(%code, %room_id, "room evicted");
        }
    }

    /// Returns the handle for `code` without creating anything.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            config: Arc::new(RoomConfig::default()),
        }
    }
}
