//! In-memory implementation of [`SessionStore`].
//!
//! Backs the test suites and storeless local runs. One mutex guards the
//! whole state, which makes every trait operation trivially atomic — the
//! same guarantee the Redis commands give.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use game_types::{GuessRow, RoomId, SocketId};

use crate::error::StoreError;
use crate::store::{GameRecord, PlayerRecord, SessionStore};

#[derive(Default)]
struct Inner {
    players: HashMap<SocketId, PlayerRecord>,
    guess_rows: HashMap<SocketId, Vec<GuessRow>>,
    games: HashMap<RoomId, GameRecord>,
    members: HashMap<RoomId, HashSet<SocketId>>,
    available_rooms: HashSet<RoomId>,
    seeded: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put_player(&self, player: &PlayerRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.players.insert(player.socket_id, player.clone());
        Ok(())
    }

    async fn get_player(&self, socket_id: SocketId) -> Result<PlayerRecord, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .players
            .get(&socket_id)
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound(format!("player:{socket_id}")))
    }

    async fn delete_player(&self, socket_id: SocketId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.players.remove(&socket_id);
        inner.guess_rows.remove(&socket_id);
        Ok(())
    }

    async fn push_guess_row(&self, socket_id: SocketId, row: &GuessRow) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .guess_rows
            .entry(socket_id)
            .or_default()
            .push(row.clone());
        Ok(())
    }

    async fn guess_rows(&self, socket_id: SocketId) -> Result<Vec<GuessRow>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.guess_rows.get(&socket_id).cloned().unwrap_or_default())
    }

    async fn clear_guess_rows(&self, socket_id: SocketId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.guess_rows.remove(&socket_id);
        Ok(())
    }

    async fn put_game(&self, game: &GameRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.games.insert(game.room_id.clone(), game.clone());
        Ok(())
    }

    async fn get_game(&self, room_id: &RoomId) -> Result<Option<GameRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.games.get(room_id).cloned())
    }

    async fn delete_game(&self, room_id: &RoomId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.games.remove(room_id);
        inner.members.remove(room_id);
        Ok(())
    }

    async fn add_member(&self, room_id: &RoomId, socket_id: SocketId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .members
            .entry(room_id.clone())
            .or_default()
            .insert(socket_id);
        Ok(())
    }

    async fn remove_member(
        &self,
        room_id: &RoomId,
        socket_id: SocketId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(members) = inner.members.get_mut(room_id) {
            members.remove(&socket_id);
        }
        Ok(())
    }

    async fn members(&self, room_id: &RoomId) -> Result<Vec<SocketId>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .members
            .get(room_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn seed_rooms(&self, ids: &[RoomId]) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.seeded {
            return Ok(false);
        }
        inner.seeded = true;
        inner.available_rooms.extend(ids.iter().cloned());
        Ok(true)
    }

    async fn allocate_room(&self) -> Result<Option<RoomId>, StoreError> {
        // Pop happens under the single store lock, matching SPOP atomicity.
        let mut inner = self.inner.lock().await;
        let picked = inner.available_rooms.iter().next().cloned();
        if let Some(ref id) = picked {
            inner.available_rooms.remove(id);
        }
        Ok(picked)
    }

    async fn release_room(&self, room_id: &RoomId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.available_rooms.insert(room_id.clone());
        Ok(())
    }
}
