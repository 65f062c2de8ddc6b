use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use game_core::WordList;
use game_server::coordinator::SessionCoordinator;
use game_server::websocket::ConnectionManager;
use game_store::{MemoryStore, RoomAllocator, SessionStore};
use game_types::{RoomId, SafeGame, ServerMessage, SocketId};

/// Known dictionary for predictable testing
pub const TEST_WORDS: &[&str] = &[
    "crane", "slate", "about", "above", "after", "again", "beach", "black",
    "brown", "chair", "close", "early", "house", "place", "right", "round",
    "today", "which", "world", "wrong",
];

/// Test setup that provides all necessary components, backed by the
/// in-memory store.
pub struct TestSetup {
    pub connection_manager: Arc<ConnectionManager>,
    pub store: Arc<MemoryStore>,
    pub coordinator: Arc<SessionCoordinator>,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self::with_pool_size(16).await
    }

    pub async fn with_pool_size(pool_size: u32) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let store = Arc::new(MemoryStore::new());
        let store_dyn: Arc<dyn SessionStore> = store.clone();

        RoomAllocator::new(store_dyn.clone())
            .seed(pool_size)
            .await
            .expect("failed to seed test pool");

        let words = Arc::new(WordList::new(&TEST_WORDS.join("\n")));
        let coordinator = Arc::new(SessionCoordinator::new(
            store_dyn,
            connection_manager.clone(),
            words,
        ));

        Self {
            connection_manager,
            store,
            coordinator,
        }
    }

    /// Open a connection and create its player record.
    pub async fn connect(&self) -> (SocketId, UnboundedReceiver<ServerMessage>) {
        let socket_id = SocketId::new();
        let receiver = self.connection_manager.create_connection(socket_id).await;
        self.coordinator.handle_connect(socket_id).await.unwrap();
        (socket_id, receiver)
    }

    /// Create a room with `leader`, join the rest, name everyone, and begin.
    /// Returns the room id.
    pub async fn setup_started_game(
        &self,
        leader: SocketId,
        others: &[(SocketId, &str)],
        leader_name: &str,
    ) -> RoomId {
        self.coordinator.request_new_game(leader).await.unwrap();
        let room_id = room_of(self, leader).await;

        for (socket_id, _) in others {
            self.coordinator
                .request_join_game(*socket_id, room_id.clone())
                .await
                .unwrap();
        }
        self.coordinator
            .declare_name(leader, leader_name.to_string())
            .await
            .unwrap();
        for (socket_id, name) in others {
            self.coordinator
                .declare_name(*socket_id, name.to_string())
                .await
                .unwrap();
        }
        self.coordinator.request_begin_game(leader).await.unwrap();
        room_id
    }
}

pub async fn room_of(setup: &TestSetup, socket_id: SocketId) -> RoomId {
    let player = setup.store.get_player(socket_id).await.unwrap();
    player.room_id.expect("player should be in a room")
}

/// Pull everything currently queued on a connection's outbound channel.
pub fn drain(receiver: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}

/// The most recent broadcast game state among drained messages.
pub fn last_state(messages: &[ServerMessage]) -> SafeGame {
    messages
        .iter()
        .rev()
        .find_map(|m| match m {
            ServerMessage::UpdateGameState { game } => Some(game.clone()),
            _ => None,
        })
        .expect("expected an UpdateGameState broadcast")
}

pub fn created_room(messages: &[ServerMessage]) -> RoomId {
    messages
        .iter()
        .find_map(|m| match m {
            ServerMessage::NewGameCreated { room_id } => Some(room_id.clone()),
            _ => None,
        })
        .expect("expected a NewGameCreated message")
}

pub fn find_evaluation(messages: &[ServerMessage]) -> Option<game_types::EvaluationResponse> {
    messages.iter().find_map(|m| match m {
        ServerMessage::Evaluation { response } => Some(response.clone()),
        _ => None,
    })
}
