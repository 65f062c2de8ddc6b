use std::sync::Arc;
use warp::Filter;

use crate::coordinator::SessionCoordinator;
use crate::websocket::ConnectionManager;

pub mod config;
pub mod coordinator;
pub mod websocket;

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    coordinator: Arc<SessionCoordinator>,
    allowed_origin: String,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let coordinator_filter = warp::any().map({
        let coordinator = coordinator.clone();
        move || coordinator.clone()
    });

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter.clone())
        .and(coordinator_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr, coordinator| {
            ws.on_upgrade(move |socket| {
                websocket::handle_connection(socket, conn_mgr, coordinator)
            })
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // CORS configuration
    let cors = if allowed_origin == "*" {
        warp::cors().allow_any_origin()
    } else {
        warp::cors().allow_origin(allowed_origin.as_str())
    };
    let cors = cors
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET"]);

    websocket.or(health).with(cors).with(warp::log("game_server"))
}
