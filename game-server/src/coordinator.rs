use std::sync::Arc;

use anyhow::{ensure, Result};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use game_core::{
    ChooserStrategy, GameSession, GuessEvaluator, RemovalOutcome, RoundRobinChooser, WordList,
    GUESSES_PER_PLAYER, WORD_LENGTH,
};
use game_store::{GameRecord, PlayerRecord, RoomAllocator, SessionStore};
use game_types::{
    EvaluationResponse, Game, GameStatus, JoinOutcome, Player, PlayerStatus, RoomId,
    ServerMessage, SocketId,
};

use crate::websocket::ConnectionManager;

/// The request-handler layer: receives inbound client events, drives the
/// game-core state machine against store-backed state, and emits outbound
/// broadcasts. The only component that talks to both the store and the
/// transport.
///
/// Every room-scoped unit of work runs under that room's async mutex, held
/// across load, mutation, persistence, and broadcast. That serializes racing
/// guesses, disconnects, and joins within a room, and gives every member a
/// total order of observed states. Rooms never share locks, so distinct
/// rooms proceed in parallel.
pub struct SessionCoordinator {
    store: Arc<dyn SessionStore>,
    allocator: RoomAllocator,
    connections: Arc<ConnectionManager>,
    words: Arc<WordList>,
    strategy: Box<dyn ChooserStrategy>,
    // One entry per room id ever touched; bounded by the pool universe.
    room_locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl SessionCoordinator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        connections: Arc<ConnectionManager>,
        words: Arc<WordList>,
    ) -> Self {
        Self {
            allocator: RoomAllocator::new(store.clone()),
            store,
            connections,
            words,
            strategy: Box::new(RoundRobinChooser),
            room_locks: DashMap::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ChooserStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    fn room_lock(&self, room_id: &RoomId) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// A new socket gets an empty player record: no name, no room.
    pub async fn handle_connect(&self, socket_id: SocketId) -> Result<()> {
        let player = Player::new(socket_id, chrono::Utc::now().to_rfc3339());
        self.store.put_player(&PlayerRecord::from(&player)).await?;
        info!("player record created for {}", socket_id);
        Ok(())
    }

    pub async fn request_new_game(&self, socket_id: SocketId) -> Result<()> {
        let mut player = self.load_player(socket_id).await?;
        if player.room_id.is_some() {
            debug!("{} requested a new game while already in a room", socket_id);
            return Ok(());
        }

        let Some(room_id) = self.allocator.allocate().await? else {
            self.send(socket_id, ServerMessage::NoRoomsAvailable).await;
            return Ok(());
        };

        let lock = self.room_lock(&room_id);
        let _guard = lock.lock().await;

        player.room_id = Some(room_id.clone());
        let session = GameSession::create(room_id.clone(), player);

        self.store
            .put_game(&GameRecord::from(&session.game))
            .await?;
        self.store.add_member(&room_id, socket_id).await?;
        self.store
            .put_player(&PlayerRecord::from(&session.game.players[0]))
            .await?;
        self.connections
            .set_connection_room(socket_id, Some(room_id.clone()))
            .await;

        info!("room {} created by {}", room_id, socket_id);
        self.send(
            socket_id,
            ServerMessage::NewGameCreated {
                room_id: room_id.clone(),
            },
        )
        .await;
        self.broadcast_state(&session).await;
        Ok(())
    }

    pub async fn request_join_game(&self, socket_id: SocketId, room_id: RoomId) -> Result<()> {
        let lock = self.room_lock(&room_id);
        let _guard = lock.lock().await;

        let Some(mut session) = self.load_session(&room_id).await? else {
            self.send(
                socket_id,
                ServerMessage::JoinResult {
                    outcome: JoinOutcome::DoesNotExist,
                },
            )
            .await;
            self.send(socket_id, ServerMessage::GameDoesNotExist).await;
            return Ok(());
        };

        if session.is_full() {
            self.send(
                socket_id,
                ServerMessage::JoinResult {
                    outcome: JoinOutcome::Full,
                },
            )
            .await;
            return Ok(());
        }

        let mut player = self.load_player(socket_id).await?;
        if player.room_id.is_some() {
            debug!("{} tried to join {} while already in a room", socket_id, room_id);
            return Ok(());
        }
        player.room_id = Some(room_id.clone());

        self.store.put_player(&PlayerRecord::from(&player)).await?;
        session.add_player(player)?;
        self.store.add_member(&room_id, socket_id).await?;
        self.connections
            .set_connection_room(socket_id, Some(room_id.clone()))
            .await;

        info!("{} joined room {}", socket_id, room_id);
        self.send(
            socket_id,
            ServerMessage::JoinResult {
                outcome: JoinOutcome::Joined,
            },
        )
        .await;
        self.broadcast_state(&session).await;
        Ok(())
    }

    pub async fn declare_name(&self, socket_id: SocketId, name: String) -> Result<()> {
        let name = name.trim().to_string();
        if name.is_empty() {
            self.send(
                socket_id,
                ServerMessage::NameResult {
                    accepted: false,
                    duplicate: false,
                },
            )
            .await;
            return Ok(());
        }

        let player = self.load_player(socket_id).await?;
        let Some(room_id) = player.room_id.clone() else {
            // Not in a room yet; just remember the name.
            let mut player = player;
            player.name = name;
            self.store.put_player(&PlayerRecord::from(&player)).await?;
            self.send(
                socket_id,
                ServerMessage::NameResult {
                    accepted: true,
                    duplicate: false,
                },
            )
            .await;
            return Ok(());
        };

        let lock = self.room_lock(&room_id);
        let _guard = lock.lock().await;

        let Some(mut session) = self.load_session(&room_id).await? else {
            warn!("{} declared a name in missing room {}", socket_id, room_id);
            return Ok(());
        };

        let duplicate = session.game.players.iter().any(|p| {
            p.socket_id != socket_id && p.name.eq_ignore_ascii_case(&name)
        });
        if duplicate {
            self.send(
                socket_id,
                ServerMessage::NameResult {
                    accepted: false,
                    duplicate: true,
                },
            )
            .await;
            return Ok(());
        }

        let member = session
            .game
            .player_mut(socket_id)
            .ok_or_else(|| anyhow::anyhow!("{} not a member of room {}", socket_id, room_id))?;
        member.name = name;
        self.store
            .put_player(&PlayerRecord::from(&*member))
            .await?;

        self.send(
            socket_id,
            ServerMessage::NameResult {
                accepted: true,
                duplicate: false,
            },
        )
        .await;
        self.broadcast_state(&session).await;
        Ok(())
    }

    /// Leader-only; a request from anyone else (or before the start
    /// predicate holds) changes nothing and answers nothing.
    pub async fn request_begin_game(&self, socket_id: SocketId) -> Result<()> {
        let player = self.load_player(socket_id).await?;
        let Some(room_id) = player.room_id else {
            debug!("{} asked to begin with no room", socket_id);
            return Ok(());
        };

        let lock = self.room_lock(&room_id);
        let _guard = lock.lock().await;

        let Some(mut session) = self.load_session(&room_id).await? else {
            return Ok(());
        };

        if session.game.leader != socket_id {
            debug!("{} asked to begin room {} without being leader", socket_id, room_id);
            return Ok(());
        }
        if !session.can_begin() {
            debug!("room {} does not satisfy the start predicate", room_id);
            return Ok(());
        }

        session.begin(self.strategy.as_ref())?;
        self.persist_session(&session).await?;

        info!("room {} begins, chooser {:?}", room_id, session.game.chooser);
        self.connections
            .send_to_room(&room_id, ServerMessage::BeginGame)
            .await;
        self.broadcast_state(&session).await;
        Ok(())
    }

    /// Pre-validation only: the same membership test `ChooseWord` applies,
    /// with no state touched.
    pub async fn check_chosen_word_valid(&self, socket_id: SocketId, word: String) -> Result<()> {
        let valid = self.is_legal_word(&word);
        self.send(socket_id, ServerMessage::WordCheckResult { valid })
            .await;
        Ok(())
    }

    pub async fn choose_word(&self, socket_id: SocketId, word: String) -> Result<()> {
        let player = self.load_player(socket_id).await?;
        let Some(room_id) = player.room_id else {
            debug!("{} chose a word with no room", socket_id);
            return Ok(());
        };

        let lock = self.room_lock(&room_id);
        let _guard = lock.lock().await;

        let Some(mut session) = self.load_session(&room_id).await? else {
            return Ok(());
        };

        if session.game.status != GameStatus::Choosing || !session.game.is_chooser(socket_id) {
            debug!("{} may not choose the word for room {}", socket_id, room_id);
            return Ok(());
        }
        if !self.is_legal_word(&word) {
            // The chooser client pre-validates via CheckChosenWordValid.
            debug!("room {}: rejected secret word candidate", room_id);
            return Ok(());
        }

        session.set_answer(&word)?;
        self.persist_session(&session).await?;

        info!("room {} is now playing", room_id);
        self.broadcast_state(&session).await;
        Ok(())
    }

    pub async fn guess(&self, socket_id: SocketId, word: String) -> Result<()> {
        let player = self.load_player(socket_id).await?;
        let Some(room_id) = player.room_id else {
            debug!("{} guessed with no room", socket_id);
            return Ok(());
        };

        let lock = self.room_lock(&room_id);
        let _guard = lock.lock().await;

        let Some(mut session) = self.load_session(&room_id).await? else {
            return Ok(());
        };

        if session.game.status != GameStatus::Playing {
            debug!("room {} is not accepting guesses", room_id);
            return Ok(());
        }
        if session.game.is_chooser(socket_id) {
            debug!("chooser {} tried to guess in room {}", socket_id, room_id);
            return Ok(());
        }

        let normalized = word.trim().to_lowercase();
        let member = session
            .game
            .player(socket_id)
            .ok_or_else(|| anyhow::anyhow!("{} not a member of room {}", socket_id, room_id))?;
        let out_of_turns = member.status == PlayerStatus::Finished
            || member.guess_result_history.len() >= GUESSES_PER_PLAYER;

        // Acceptance is settled before any color computation.
        if out_of_turns
            || normalized.chars().count() != WORD_LENGTH
            || !self.words.contains(&normalized)
        {
            self.send(
                socket_id,
                ServerMessage::Evaluation {
                    response: EvaluationResponse::rejected(),
                },
            )
            .await;
            return Ok(());
        }

        let row = GuessEvaluator::evaluate(&normalized, &session.game.current_answer);
        let summary = GuessEvaluator::letter_summary(&normalized, &row);
        let outcome = session.apply_guess(socket_id, row.clone(), self.strategy.as_ref())?;

        // Persist the round bookkeeping: a completed round wipes everyone's
        // rows, an ongoing one appends the new row.
        if outcome.round_completed {
            for p in &session.game.players {
                self.store.clear_guess_rows(p.socket_id).await?;
            }
        } else {
            self.store.push_guess_row(socket_id, &row).await?;
        }
        self.persist_session(&session).await?;

        self.send(
            socket_id,
            ServerMessage::Evaluation {
                response: EvaluationResponse {
                    accepted: true,
                    correct: outcome.correct,
                    result_by_position: Some(row),
                    result_by_letter: Some(summary),
                },
            },
        )
        .await;

        if outcome.game_over {
            info!("room {} finished its chooser rotation", room_id);
        }
        self.broadcast_state(&session).await;
        Ok(())
    }

    /// Implicit on socket close: tear the player down and repair or retire
    /// the room around them.
    pub async fn handle_disconnect(&self, socket_id: SocketId) -> Result<()> {
        let player = match self.store.get_player(socket_id).await {
            Ok(record) => record,
            Err(game_store::StoreError::KeyNotFound(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if let Some(room_id) = player.room_id.clone() {
            let lock = self.room_lock(&room_id);
            let _guard = lock.lock().await;

            if let Some(mut session) = self.load_session(&room_id).await? {
                match session.remove_player(socket_id, self.strategy.as_ref())? {
                    RemovalOutcome::Empty => {
                        self.store.delete_game(&room_id).await?;
                        self.allocator.release(&room_id).await?;
                        info!("room {} emptied and returned to the pool", room_id);
                    }
                    RemovalOutcome::Remaining { round_reset, .. } => {
                        self.store.remove_member(&room_id, socket_id).await?;
                        if round_reset {
                            for p in &session.game.players {
                                self.store.clear_guess_rows(p.socket_id).await?;
                            }
                        }
                        self.persist_session(&session).await?;
                        self.broadcast_state(&session).await;
                    }
                }
            }
        }

        self.store.delete_player(socket_id).await?;
        info!("player record removed for {}", socket_id);
        Ok(())
    }

    fn is_legal_word(&self, word: &str) -> bool {
        let normalized = word.trim().to_lowercase();
        normalized.chars().count() == WORD_LENGTH && self.words.contains(&normalized)
    }

    async fn load_player(&self, socket_id: SocketId) -> Result<Player> {
        let record = self.store.get_player(socket_id).await?;
        let rows = self.store.guess_rows(socket_id).await?;
        Ok(record.into_player(rows))
    }

    /// Assemble the full aggregate: game scalars, member set, one player per
    /// member. Member sets are unordered, so join order is recovered from
    /// creation timestamps.
    async fn load_session(&self, room_id: &RoomId) -> Result<Option<GameSession>> {
        let Some(record) = self.store.get_game(room_id).await? else {
            return Ok(None);
        };

        let member_ids = self.store.members(room_id).await?;
        let mut players = Vec::with_capacity(member_ids.len());
        for id in member_ids {
            players.push(self.load_player(id).await?);
        }
        players.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.socket_id.0.cmp(&b.socket_id.0))
        });

        ensure!(
            players.iter().any(|p| p.socket_id == record.leader),
            "game {} has no resolvable leader",
            room_id
        );

        Ok(Some(GameSession::from_game(Game {
            room_id: record.room_id,
            leader: record.leader,
            status: record.status,
            chooser: record.chooser,
            current_answer: record.current_answer,
            speed_bonus_winner: record.speed_bonus_winner,
            past_choosers: record.past_choosers,
            players,
        })))
    }

    async fn persist_session(&self, session: &GameSession) -> Result<()> {
        self.store
            .put_game(&GameRecord::from(&session.game))
            .await?;
        for player in &session.game.players {
            self.store.put_player(&PlayerRecord::from(player)).await?;
        }
        Ok(())
    }

    async fn broadcast_state(&self, session: &GameSession) {
        self.connections
            .send_to_room(
                &session.game.room_id,
                ServerMessage::UpdateGameState {
                    game: (&session.game).into(),
                },
            )
            .await;
    }

    async fn send(&self, socket_id: SocketId, message: ServerMessage) {
        if let Err(e) = self.connections.send_to_connection(socket_id, message).await {
            warn!("failed to send to {}: {}", socket_id, e);
        }
    }
}
