//! Redis-compatible implementation of [`SessionStore`].
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `player:{socket}` | JSON | Player scalar record |
//! | `player:{socket}:guesses` | List | Evaluated guess rows, oldest first |
//! | `game:{room}` | JSON | Game scalar record |
//! | `room:{room}:members` | Set | Member socket ids |
//! | `rooms:available` | Set | Unassigned room ids |
//! | `rooms:seeded` | String | Marker: the pool was seeded once |

use async_trait::async_trait;
use fred::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use game_types::{GuessRow, RoomId, SocketId};

use crate::error::StoreError;
use crate::store::{GameRecord, PlayerRecord, SessionStore};

/// Connection handle to a Redis-compatible instance.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Connect using the Redis URL scheme, `redis://host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed and
    /// [`StoreError::Backend`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("invalid store URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("connected to session store");
        Ok(Self { client })
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let value: Option<String> = self.client.get(key).await?;
        value
            .map(|s| serde_json::from_str(&s).map_err(StoreError::from))
            .transpose()
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }
}

fn player_key(socket_id: SocketId) -> String {
    format!("player:{socket_id}")
}

fn guesses_key(socket_id: SocketId) -> String {
    format!("player:{socket_id}:guesses")
}

fn game_key(room_id: &RoomId) -> String {
    format!("game:{room_id}")
}

fn members_key(room_id: &RoomId) -> String {
    format!("room:{room_id}:members")
}

const AVAILABLE_ROOMS_KEY: &str = "rooms:available";
const SEEDED_MARKER_KEY: &str = "rooms:seeded";

#[async_trait]
impl SessionStore for RedisStore {
    async fn put_player(&self, player: &PlayerRecord) -> Result<(), StoreError> {
        self.set_json(&player_key(player.socket_id), player).await
    }

    async fn get_player(&self, socket_id: SocketId) -> Result<PlayerRecord, StoreError> {
        let key = player_key(socket_id);
        self.get_json(&key)
            .await?
            .ok_or(StoreError::KeyNotFound(key))
    }

    async fn delete_player(&self, socket_id: SocketId) -> Result<(), StoreError> {
        self.delete(&player_key(socket_id)).await?;
        self.delete(&guesses_key(socket_id)).await
    }

    async fn push_guess_row(&self, socket_id: SocketId, row: &GuessRow) -> Result<(), StoreError> {
        let json = serde_json::to_string(row)?;
        let _: u64 = self
            .client
            .rpush(guesses_key(socket_id), json.as_str())
            .await?;
        Ok(())
    }

    async fn guess_rows(&self, socket_id: SocketId) -> Result<Vec<GuessRow>, StoreError> {
        let values: Vec<String> = self
            .client
            .lrange(guesses_key(socket_id), 0, -1)
            .await?;
        let mut rows = Vec::with_capacity(values.len());
        for v in &values {
            rows.push(serde_json::from_str(v)?);
        }
        Ok(rows)
    }

    async fn clear_guess_rows(&self, socket_id: SocketId) -> Result<(), StoreError> {
        self.delete(&guesses_key(socket_id)).await
    }

    async fn put_game(&self, game: &GameRecord) -> Result<(), StoreError> {
        self.set_json(&game_key(&game.room_id), game).await
    }

    async fn get_game(&self, room_id: &RoomId) -> Result<Option<GameRecord>, StoreError> {
        self.get_json(&game_key(room_id)).await
    }

    async fn delete_game(&self, room_id: &RoomId) -> Result<(), StoreError> {
        self.delete(&game_key(room_id)).await?;
        self.delete(&members_key(room_id)).await
    }

    async fn add_member(&self, room_id: &RoomId, socket_id: SocketId) -> Result<(), StoreError> {
        let _: u32 = self
            .client
            .sadd(members_key(room_id), socket_id.to_string().as_str())
            .await?;
        Ok(())
    }

    async fn remove_member(
        &self,
        room_id: &RoomId,
        socket_id: SocketId,
    ) -> Result<(), StoreError> {
        let _: u32 = self
            .client
            .srem(members_key(room_id), socket_id.to_string().as_str())
            .await?;
        Ok(())
    }

    async fn members(&self, room_id: &RoomId) -> Result<Vec<SocketId>, StoreError> {
        let members: Vec<String> = self.client.smembers(members_key(room_id)).await?;
        let mut ids = Vec::with_capacity(members.len());
        for m in &members {
            let id = m.parse::<Uuid>().map_err(|e| {
                StoreError::Config(format!("invalid socket id in member set: {e}"))
            })?;
            ids.push(SocketId(id));
        }
        Ok(ids)
    }

    async fn seed_rooms(&self, ids: &[RoomId]) -> Result<bool, StoreError> {
        // SET NX marker: only the first boot against this store gets to seed,
        // so ids held by live games are never re-added after a restart.
        let claimed: Option<String> = self
            .client
            .set(
                SEEDED_MARKER_KEY,
                "1",
                None,
                Some(fred::types::SetOptions::NX),
                false,
            )
            .await?;
        if claimed.is_none() {
            return Ok(false);
        }

        let values: Vec<String> = ids.iter().map(|id| id.0.clone()).collect();
        let _: u64 = self.client.sadd(AVAILABLE_ROOMS_KEY, values).await?;
        Ok(true)
    }

    async fn allocate_room(&self) -> Result<Option<RoomId>, StoreError> {
        // Single SPOP: atomic at the store, so two concurrent allocators can
        // never receive the same id.
        let popped: Option<String> = self.client.spop(AVAILABLE_ROOMS_KEY, None).await?;
        Ok(popped.map(RoomId))
    }

    async fn release_room(&self, room_id: &RoomId) -> Result<(), StoreError> {
        // SADD of a present member is a no-op, which makes double-release safe.
        let _: u32 = self
            .client
            .sadd(AVAILABLE_ROOMS_KEY, room_id.0.as_str())
            .await?;
        Ok(())
    }
}
