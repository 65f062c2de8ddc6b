use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Client-visible game faults, carried inside `ServerMessage::Error`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    GameNotFound { room_id: String },
    PlayerNotFound { socket_id: String },
    RoomFull { room_id: String },
    InvalidWord { word: String },
    RateLimitExceeded,
    InvalidGameState { current_state: String },
}
