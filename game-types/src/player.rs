use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::game::{GuessRow, RoomId};

/// Per-connection identity. One socket, one player record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SocketId(pub Uuid);

impl SocketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PlayerStatus {
    Playing,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub socket_id: SocketId,
    pub room_id: Option<RoomId>,
    pub name: String,
    pub score: u32,
    /// Colored result rows for the current round, oldest first. Rows carry
    /// statuses only, never the guessed letters, so the whole history is
    /// broadcast to the room.
    pub guess_result_history: Vec<GuessRow>,
    pub status: PlayerStatus,
    pub created_at: String, // ISO 8601 string
}

impl Player {
    /// A freshly connected player: no name, no room, nothing guessed yet.
    pub fn new(socket_id: SocketId, created_at: String) -> Self {
        Self {
            socket_id,
            room_id: None,
            name: String::new(),
            score: 0,
            guess_result_history: Vec::new(),
            status: PlayerStatus::Playing,
            created_at,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
