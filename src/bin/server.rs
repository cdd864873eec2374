use log::{error, info, warn};
use std::net::SocketAddr;

use anon_chat::config::ChatConfig;
use anon_chat::core::server::create_chat_server;
use anon_chat::handlers::routes;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Initialize env
    match dotenvy::dotenv() {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Load config from env
    let config = match ChatConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, rate limit={} per {:?}, {} named rooms",
        config.host,
        config.port,
        config.rate_limit_messages,
        config.rate_limit_window,
        config.named_rooms.len()
    );

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    let cleanup_period = config.rate_limit_window * 5;
    let server = create_chat_server(config);
    server.clone().start_cleanup_task(cleanup_period);

    info!("Starting anonymous chat relay on {}", addr);
    warp::serve(routes(server)).run(addr).await;
}
