use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::coordinator::SessionCoordinator;
use game_types::{ClientMessage, SocketId};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;

pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    coordinator: Arc<SessionCoordinator>,
) {
    let socket_id = SocketId::new();
    info!("new WebSocket connection: {}", socket_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let rate_limiter = RateLimiter::new();

    // Create connection and get receiver for outgoing messages
    let message_receiver = connection_manager.create_connection(socket_id).await;

    if let Err(e) = coordinator.handle_connect(socket_id).await {
        error!("failed to set up player for {}: {:#}", socket_id, e);
        connection_manager.remove_connection(socket_id).await;
        return;
    }

    let message_handler = MessageHandler::new(socket_id, coordinator.clone());

    // Handle incoming messages
    let incoming_handler = {
        let connection_manager = connection_manager.clone();
        let message_handler = message_handler.clone();
        let mut rate_limiter = rate_limiter.clone();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        // A failed handler invocation is fatal to that request
                        // only; the connection stays open for the next event.
                        if let Err(e) = handle_message(
                            msg,
                            &mut rate_limiter,
                            &message_handler,
                            &connection_manager,
                            socket_id,
                        )
                        .await
                        {
                            error!("error handling message for {}: {:#}", socket_id, e);
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", socket_id, e);
                        break;
                    }
                }
            }
        }
    };

    // Handle outgoing messages
    let outgoing_handler = {
        async move {
            let mut receiver = message_receiver;

            while let Some(message) = receiver.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("failed to serialize message: {:?}", e);
                        continue;
                    }
                };

                if let Err(e) = ws_sender.send(Message::text(json)).await {
                    warn!("failed to send message to {}: {:?}", socket_id, e);
                    break;
                }
            }
        }
    };

    // Run both handlers concurrently
    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    // Cleanup connection
    info!("connection {} disconnected", socket_id);
    message_handler.handle_disconnect().await;
    connection_manager.remove_connection(socket_id).await;
}

async fn handle_message(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &MessageHandler,
    connection_manager: &ConnectionManager,
    socket_id: SocketId,
) -> anyhow::Result<()> {
    // Check rate limiting
    if !rate_limiter.try_acquire() {
        warn!("rate limit exceeded for connection {}", socket_id);
        let _ = connection_manager
            .send_to_connection(
                socket_id,
                game_types::ServerMessage::Error {
                    message: "rate limit exceeded".to_string(),
                },
            )
            .await;
        anyhow::bail!("rate limit exceeded");
    }

    // Only handle text messages
    if !msg.is_text() {
        return Ok(());
    }

    let text = msg
        .to_str()
        .map_err(|_| anyhow::anyhow!("invalid text message"))?;

    // Parse client message
    let client_message: ClientMessage = serde_json::from_str(text)
        .map_err(|e| anyhow::anyhow!("invalid JSON message: {}", e))?;

    // Handle the message
    message_handler.handle_message(client_message).await
}
