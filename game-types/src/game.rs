use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::player::{Player, SocketId};

/// Zero-padded numeric room identifier, e.g. `"0427"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameStatus {
    Lobby,    // Players gathering, leader may start
    Choosing, // Chooser is picking the secret word
    Playing,  // Guessers are solving the word
    End,      // Every player has had a turn as chooser
}

/// Per-letter feedback for one guessed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LetterStatus {
    Hit,  // correct letter, correct position
    Has,  // correct letter, wrong position
    Miss, // letter not present / already accounted for
}

/// One evaluated guess: a status per position, length fixed at the word length.
pub type GuessRow = Vec<LetterStatus>;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Game {
    pub room_id: RoomId,
    pub leader: SocketId,
    pub status: GameStatus,
    pub chooser: Option<SocketId>,
    pub current_answer: String,
    pub speed_bonus_winner: Option<SocketId>,
    /// Players who have already served as chooser this game, in rotation order.
    pub past_choosers: Vec<SocketId>,
    pub players: Vec<Player>,
}

impl Game {
    pub fn player(&self, socket_id: SocketId) -> Option<&Player> {
        self.players.iter().find(|p| p.socket_id == socket_id)
    }

    pub fn player_mut(&mut self, socket_id: SocketId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.socket_id == socket_id)
    }

    pub fn is_chooser(&self, socket_id: SocketId) -> bool {
        self.chooser == Some(socket_id)
    }
}

/// Safe version of Game that doesn't expose the secret word
/// Used for room broadcasts where we need to protect game integrity
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SafeGame {
    pub room_id: RoomId,
    pub leader: SocketId,
    pub status: GameStatus,
    pub chooser: Option<SocketId>,
    pub speed_bonus_winner: Option<SocketId>,
    pub players: Vec<Player>,
}

impl From<&Game> for SafeGame {
    fn from(game: &Game) -> Self {
        SafeGame {
            room_id: game.room_id.clone(),
            leader: game.leader,
            status: game.status,
            chooser: game.chooser,
            speed_bonus_winner: game.speed_bonus_winner,
            players: game.players.clone(),
        }
    }
}

/// Reply to a single guess submission.
///
/// `accepted = false` means the word never reached color evaluation (wrong
/// length, not in the dictionary, guesser out of turns) and both result
/// fields are absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvaluationResponse {
    pub accepted: bool,
    pub correct: bool,
    pub result_by_position: Option<GuessRow>,
    /// Best status per guessed letter (Hit > Has > Miss), for keyboard coloring.
    pub result_by_letter: Option<BTreeMap<char, LetterStatus>>,
}

impl EvaluationResponse {
    pub fn rejected() -> Self {
        Self {
            accepted: false,
            correct: false,
            result_by_position: None,
            result_by_letter: None,
        }
    }
}
