//! Request handlers for the relay's HTTP and WebSocket endpoints

pub mod websocket;

use log::debug;
use std::convert::Infallible;
use warp::Filter;

use crate::constants::WS_PATH;
use crate::core::server::SharedChatServer;

// Re-export the websocket handler
pub use websocket::handle_ws_client;

/// All routes served by the relay: `/ws`, `/health` and `/stats`
pub fn routes(
    server: SharedChatServer,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let ws_route = warp::path(WS_PATH)
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_server(server.clone()))
        .map(|ws: warp::ws::Ws, server: SharedChatServer| {
            debug!("New websocket connection");
            ws.on_upgrade(move |socket| handle_ws_client(socket, server))
        });

    let health_route = warp::path("health").and(warp::path::end()).map(|| "OK");

    let stats_route = warp::path("stats")
        .and(warp::path::end())
        .and(with_server(server))
        .and_then(stats_handler);

    ws_route.or(health_route).or(stats_route)
}

async fn stats_handler(server: SharedChatServer) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&server.stats().await))
}

// Helper function to include the shared server in a request
fn with_server(
    server: SharedChatServer,
) -> impl Filter<Extract = (SharedChatServer,), Error = Infallible> + Clone {
    warp::any().map(move || server.clone())
}
