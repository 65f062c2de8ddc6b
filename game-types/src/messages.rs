use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{EvaluationResponse, RoomId, SafeGame};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    RequestNewGame,
    RequestJoinGame { room_id: RoomId },
    DeclareName { name: String },
    RequestBeginGame,
    CheckChosenWordValid { word: String },
    ChooseWord { word: String },
    Guess { word: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum JoinOutcome {
    Joined,
    DoesNotExist,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    NewGameCreated { room_id: RoomId },
    NoRoomsAvailable,
    JoinResult { outcome: JoinOutcome },
    GameDoesNotExist,
    NameResult { accepted: bool, duplicate: bool },
    BeginGame,
    UpdateGameState { game: SafeGame },
    WordCheckResult { valid: bool },
    Evaluation { response: EvaluationResponse },
    Error { message: String },
}
