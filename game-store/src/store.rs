use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use game_types::{Game, GameStatus, GuessRow, Player, PlayerStatus, RoomId, SocketId};

use crate::error::StoreError;

/// Scalar fields of a [`Player`], persisted as one record. The guess history
/// is kept in its own ordered list so rows can be appended without rewriting
/// the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub socket_id: SocketId,
    pub room_id: Option<RoomId>,
    pub name: String,
    pub score: u32,
    pub status: PlayerStatus,
    pub created_at: String,
}

impl PlayerRecord {
    pub fn into_player(self, guess_result_history: Vec<GuessRow>) -> Player {
        Player {
            socket_id: self.socket_id,
            room_id: self.room_id,
            name: self.name,
            score: self.score,
            guess_result_history,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        Self {
            socket_id: player.socket_id,
            room_id: player.room_id.clone(),
            name: player.name.clone(),
            score: player.score,
            status: player.status,
            created_at: player.created_at.clone(),
        }
    }
}

/// Scalar fields of a [`Game`]. Players are referenced through the room's
/// member set, and the leader/chooser are stored as ids, never embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub room_id: RoomId,
    pub leader: SocketId,
    pub status: GameStatus,
    pub chooser: Option<SocketId>,
    pub current_answer: String,
    pub speed_bonus_winner: Option<SocketId>,
    pub past_choosers: Vec<SocketId>,
}

impl From<&Game> for GameRecord {
    fn from(game: &Game) -> Self {
        Self {
            room_id: game.room_id.clone(),
            leader: game.leader,
            status: game.status,
            chooser: game.chooser,
            current_answer: game.current_answer.clone(),
            speed_bonus_winner: game.speed_bonus_winner,
            past_choosers: game.past_choosers.clone(),
        }
    }
}

/// Atomic, entity-level operations on the shared session store.
///
/// Every write here lands as a single store command, so a multi-field update
/// to one entity (e.g. "set status to playing AND set the answer") can never
/// be observed half-applied. Cross-entity sequencing is the coordinator's
/// job, via its per-room serialization.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write a player's scalar record, replacing any previous one.
    async fn put_player(&self, player: &PlayerRecord) -> Result<(), StoreError>;
    /// Read a player's scalar record. Missing players are a
    /// [`StoreError::KeyNotFound`]; a connected socket always has one.
    async fn get_player(&self, socket_id: SocketId) -> Result<PlayerRecord, StoreError>;
    async fn delete_player(&self, socket_id: SocketId) -> Result<(), StoreError>;

    /// Append one evaluated row to a player's per-round history.
    async fn push_guess_row(&self, socket_id: SocketId, row: &GuessRow) -> Result<(), StoreError>;
    /// All rows for the current round, oldest first.
    async fn guess_rows(&self, socket_id: SocketId) -> Result<Vec<GuessRow>, StoreError>;
    async fn clear_guess_rows(&self, socket_id: SocketId) -> Result<(), StoreError>;

    /// Write a game's scalar record, replacing any previous one.
    async fn put_game(&self, game: &GameRecord) -> Result<(), StoreError>;
    /// Read a game's scalar record. `None` simply means the room does not
    /// exist, which is a normal outcome for join requests.
    async fn get_game(&self, room_id: &RoomId) -> Result<Option<GameRecord>, StoreError>;
    async fn delete_game(&self, room_id: &RoomId) -> Result<(), StoreError>;

    async fn add_member(&self, room_id: &RoomId, socket_id: SocketId) -> Result<(), StoreError>;
    async fn remove_member(&self, room_id: &RoomId, socket_id: SocketId)
        -> Result<(), StoreError>;
    async fn members(&self, room_id: &RoomId) -> Result<Vec<SocketId>, StoreError>;

    /// Populate the available-room set, exactly once per store lifetime.
    /// Returns false when a previous boot already seeded it.
    async fn seed_rooms(&self, ids: &[RoomId]) -> Result<bool, StoreError>;
    /// Atomically pop one arbitrary available room id, or `None` when the
    /// pool is exhausted. This must be a single store-level pop, never a
    /// read-then-delete pair.
    async fn allocate_room(&self) -> Result<Option<RoomId>, StoreError>;
    /// Return a room id to the pool. Re-releasing an id already present is a
    /// no-op.
    async fn release_room(&self, room_id: &RoomId) -> Result<(), StoreError>;
}
