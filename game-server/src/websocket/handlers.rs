use std::sync::Arc;
use tracing::info;

use crate::coordinator::SessionCoordinator;
use game_types::{ClientMessage, SocketId};

/// Per-connection dispatcher: every inbound event is a closed enum variant,
/// matched exhaustively into a coordinator call.
#[derive(Clone)]
pub struct MessageHandler {
    socket_id: SocketId,
    coordinator: Arc<SessionCoordinator>,
}

impl MessageHandler {
    pub fn new(socket_id: SocketId, coordinator: Arc<SessionCoordinator>) -> Self {
        Self {
            socket_id,
            coordinator,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> anyhow::Result<()> {
        match message {
            ClientMessage::RequestNewGame => {
                self.coordinator.request_new_game(self.socket_id).await
            }
            ClientMessage::RequestJoinGame { room_id } => {
                self.coordinator
                    .request_join_game(self.socket_id, room_id)
                    .await
            }
            ClientMessage::DeclareName { name } => {
                self.coordinator.declare_name(self.socket_id, name).await
            }
            ClientMessage::RequestBeginGame => {
                self.coordinator.request_begin_game(self.socket_id).await
            }
            ClientMessage::CheckChosenWordValid { word } => {
                self.coordinator
                    .check_chosen_word_valid(self.socket_id, word)
                    .await
            }
            ClientMessage::ChooseWord { word } => {
                self.coordinator.choose_word(self.socket_id, word).await
            }
            ClientMessage::Guess { word } => {
                self.coordinator.guess(self.socket_id, word).await
            }
        }
    }

    pub async fn handle_disconnect(&self) {
        info!("handling disconnect for connection {}", self.socket_id);

        if let Err(e) = self.coordinator.handle_disconnect(self.socket_id).await {
            tracing::error!(
                "failed to handle disconnect for {}: {:#}",
                self.socket_id,
                e
            );
        }
    }
}
