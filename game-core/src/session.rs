use anyhow::{anyhow, ensure, Result};
use game_types::{Game, GameStatus, GuessRow, Player, PlayerStatus, RoomId, SocketId};

use crate::{ChooserStrategy, GuessEvaluator, ScoringEngine, GUESSES_PER_PLAYER, MAX_PLAYERS, MIN_PLAYERS};

/// What a single applied guess did to the round.
#[derive(Debug, Clone, Copy)]
pub struct GuessOutcome {
    pub correct: bool,
    /// The round finished (everyone solved or ran out of guesses) and the
    /// session rotated to the next chooser, clearing per-round state.
    pub round_completed: bool,
    /// The rotation was exhausted and the game moved to `End`.
    pub game_over: bool,
}

/// What removing a player left behind.
#[derive(Debug, Clone, Copy)]
pub enum RemovalOutcome {
    /// No players remain; the caller deletes the game and releases the room.
    Empty,
    Remaining {
        round_reset: bool,
        game_over: bool,
    },
}

/// One room's mutable state and its round state machine:
/// `lobby -> choosing -> playing -> choosing ... -> end`.
///
/// Methods assume the caller has already settled authorization (who may
/// begin, choose, guess) and word acceptance; violated preconditions here are
/// programming faults and fail loudly.
pub struct GameSession {
    pub game: Game,
}

impl GameSession {
    /// A fresh lobby with the creating player as leader.
    pub fn create(room_id: RoomId, leader: Player) -> Self {
        let leader_id = leader.socket_id;
        Self {
            game: Game {
                room_id,
                leader: leader_id,
                status: GameStatus::Lobby,
                chooser: None,
                current_answer: String::new(),
                speed_bonus_winner: None,
                past_choosers: Vec::new(),
                players: vec![leader],
            },
        }
    }

    pub fn from_game(game: Game) -> Self {
        Self { game }
    }

    pub fn is_full(&self) -> bool {
        self.game.players.len() >= MAX_PLAYERS
    }

    pub fn add_player(&mut self, player: Player) -> Result<()> {
        ensure!(!self.is_full(), "room {} is full", self.game.room_id);
        ensure!(
            self.game.player(player.socket_id).is_none(),
            "player {} already in room {}",
            player.socket_id,
            self.game.room_id
        );
        self.game.players.push(player);
        Ok(())
    }

    /// The start predicate: player count within the configured window and
    /// every player named.
    pub fn can_begin(&self) -> bool {
        let count = self.game.players.len();
        self.game.status == GameStatus::Lobby
            && (MIN_PLAYERS..=MAX_PLAYERS).contains(&count)
            && self.game.players.iter().all(Player::has_name)
    }

    /// Leave the lobby: designate the first chooser and start choosing.
    pub fn begin(&mut self, strategy: &dyn ChooserStrategy) -> Result<()> {
        ensure!(
            self.can_begin(),
            "room {} cannot begin from {:?}",
            self.game.room_id,
            self.game.status
        );
        let chooser = strategy
            .next_chooser(&self.game)
            .ok_or_else(|| anyhow!("no eligible chooser in room {}", self.game.room_id))?;
        self.game.chooser = Some(chooser);
        self.game.status = GameStatus::Choosing;
        Ok(())
    }

    /// Lock in the chooser's (already dictionary-validated) word and start
    /// the guessing phase.
    pub fn set_answer(&mut self, word: &str) -> Result<()> {
        ensure!(
            self.game.status == GameStatus::Choosing,
            "room {} is not choosing",
            self.game.room_id
        );
        ensure!(
            self.game.chooser.is_some(),
            "room {} is choosing without a chooser",
            self.game.room_id
        );
        self.game.current_answer = word.trim().to_lowercase();
        self.game.status = GameStatus::Playing;
        Ok(())
    }

    fn guessers(&self) -> impl Iterator<Item = &Player> {
        let chooser = self.game.chooser;
        self.game
            .players
            .iter()
            .filter(move |p| Some(p.socket_id) != chooser)
    }

    /// Every non-chooser player has solved the word.
    pub fn all_guessers_solved(&self) -> bool {
        self.guessers().all(|p| p.status == PlayerStatus::Finished)
    }

    /// Every non-chooser player is done with the round, solved or not.
    pub fn round_complete(&self) -> bool {
        self.guessers()
            .all(|p| p.status == PlayerStatus::Finished
                || p.guess_result_history.len() >= GUESSES_PER_PLAYER)
    }

    /// Record one accepted, evaluated guess and settle its scoring: the
    /// guesser's efficiency points and speed bonus on a solve, the chooser's
    /// per-guess credit past the guesser's first attempt, and the
    /// round-completion check.
    pub fn apply_guess(
        &mut self,
        socket_id: SocketId,
        row: GuessRow,
        strategy: &dyn ChooserStrategy,
    ) -> Result<GuessOutcome> {
        ensure!(
            self.game.status == GameStatus::Playing,
            "room {} is not in play",
            self.game.room_id
        );
        let chooser_id = self
            .game
            .chooser
            .ok_or_else(|| anyhow!("room {} playing without a chooser", self.game.room_id))?;
        ensure!(
            socket_id != chooser_id,
            "chooser {} cannot guess in room {}",
            socket_id,
            self.game.room_id
        );

        let correct = GuessEvaluator::is_correct(&row);
        let player_count = self.game.players.len();
        let speed_bonus_open = self.game.speed_bonus_winner.is_none();

        let mut claimed_speed_bonus = false;
        let guesses_taken = {
            let player = self
                .game
                .player_mut(socket_id)
                .ok_or_else(|| anyhow!("player {} not in room", socket_id))?;
            ensure!(
                player.status == PlayerStatus::Playing,
                "player {} already finished this round",
                socket_id
            );
            ensure!(
                player.guess_result_history.len() < GUESSES_PER_PLAYER,
                "player {} is out of guesses",
                socket_id
            );

            player.guess_result_history.push(row);
            let taken = player.guess_result_history.len();
            if correct {
                player.status = PlayerStatus::Finished;
                player.score += ScoringEngine::efficiency_points(taken);
                if speed_bonus_open {
                    player.score += ScoringEngine::speed_bonus();
                    claimed_speed_bonus = true;
                }
            }
            taken
        };

        if claimed_speed_bonus {
            self.game.speed_bonus_winner = Some(socket_id);
        }

        // The chooser profits from every accepted guess after a guesser's first.
        if guesses_taken > 1 {
            let reward = ScoringEngine::chooser_reward(player_count);
            let chooser = self
                .game
                .player_mut(chooser_id)
                .ok_or_else(|| anyhow!("chooser {} not in player list", chooser_id))?;
            chooser.score += reward;
        }

        let round_completed = self.round_complete();
        let game_over = if round_completed {
            self.reset_round(strategy)
        } else {
            false
        };

        Ok(GuessOutcome {
            correct,
            round_completed,
            game_over,
        })
    }

    /// Close out the round: retire the chooser into the rotation history,
    /// clear per-round state, and either designate the next chooser or end
    /// the game when everyone has had a turn. Returns true when the game
    /// ended.
    pub fn reset_round(&mut self, strategy: &dyn ChooserStrategy) -> bool {
        if let Some(done) = self.game.chooser.take() {
            if !self.game.past_choosers.contains(&done) {
                self.game.past_choosers.push(done);
            }
        }
        self.game.speed_bonus_winner = None;
        self.game.current_answer.clear();
        for player in &mut self.game.players {
            player.status = PlayerStatus::Playing;
            player.guess_result_history.clear();
        }

        match strategy.next_chooser(&self.game) {
            Some(next) => {
                tracing::debug!("room {}: next chooser {}", self.game.room_id, next);
                self.game.chooser = Some(next);
                self.game.status = GameStatus::Choosing;
                false
            }
            None => {
                tracing::debug!("room {}: rotation exhausted, game over", self.game.room_id);
                self.game.status = GameStatus::End;
                true
            }
        }
    }

    /// Drop a departing player and repair the session around the hole:
    /// leadership moves to the earliest remaining member, a departed chooser
    /// abandons the round, and a departed guesser may complete it.
    pub fn remove_player(
        &mut self,
        socket_id: SocketId,
        strategy: &dyn ChooserStrategy,
    ) -> Result<RemovalOutcome> {
        let was_chooser = self.game.is_chooser(socket_id);
        let before = self.game.players.len();
        self.game.players.retain(|p| p.socket_id != socket_id);
        ensure!(
            self.game.players.len() < before,
            "player {} not in room {}",
            socket_id,
            self.game.room_id
        );

        if self.game.players.is_empty() {
            return Ok(RemovalOutcome::Empty);
        }

        if self.game.leader == socket_id {
            self.game.leader = self.game.players[0].socket_id;
        }

        let mut round_reset = false;
        let mut game_over = false;
        if was_chooser
            && matches!(self.game.status, GameStatus::Choosing | GameStatus::Playing)
        {
            // The secret walked out the door; abandon the round.
            game_over = self.reset_round(strategy);
            round_reset = true;
        } else if self.game.status == GameStatus::Playing && self.round_complete() {
            game_over = self.reset_round(strategy);
            round_reset = true;
        }

        Ok(RemovalOutcome::Remaining {
            round_reset,
            game_over,
        })
    }
}
