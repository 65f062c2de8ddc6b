use std::sync::Arc;
use tokio::signal;
use tracing::info;

use game_core::WordList;
use game_server::{
    config::Config, coordinator::SessionCoordinator, create_routes, websocket::ConnectionManager,
};
use game_store::{RedisStore, RoomAllocator, SessionStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting game server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());

    info!("Loading word list from: {}", config.word_list_path);
    let words = match std::fs::read_to_string(&config.word_list_path) {
        Ok(text) => {
            let words = WordList::new(&text);
            if words.is_empty() {
                tracing::error!(
                    "Word list '{}' contains no usable words.",
                    config.word_list_path
                );
                std::process::exit(1);
            }
            info!("Loaded {} words", words.len());
            Arc::new(words)
        }
        Err(e) => {
            tracing::error!(
                "Failed to read word list '{}': {}",
                config.word_list_path,
                e
            );
            tracing::error!("The server requires a word list to function.");
            tracing::error!("Set WORD_LIST_PATH to a newline-separated dictionary file.");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn SessionStore> = match RedisStore::connect(&config.store_url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to connect to store at {}: {}", config.store_url, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = RoomAllocator::new(store.clone())
        .seed(config.room_pool_size)
        .await
    {
        tracing::error!("Failed to seed the room pool: {}", e);
        std::process::exit(1);
    }

    let coordinator = Arc::new(SessionCoordinator::new(
        store,
        connection_manager.clone(),
        words,
    ));

    let routes = create_routes(
        connection_manager.clone(),
        coordinator.clone(),
        config.allowed_origin.clone(),
    );

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
