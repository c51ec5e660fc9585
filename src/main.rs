use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use promo_studio::{api, config, GeminiGenerator, WorkflowController};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    config::Config::dotenv_load();
    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };
    config.print_env_vars();

    let generator = Arc::new(GeminiGenerator::from_config(&config));
    let controller = WorkflowController::new(generator);
    let app = api::router(api::AppState::new(controller));

    // Run our application with safe parsing
    let ip: std::net::IpAddr = config.api_host.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_HOST '{}', falling back to 127.0.0.1", config.api_host);
        std::net::IpAddr::from([127, 0, 0, 1])
    });
    let port: u16 = config.api_port.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_PORT '{}', falling back to 8190", config.api_port);
        8190
    });
    let socket_address = SocketAddr::new(ip, port);
    tracing::info!("listening on {}", socket_address);
    if let Err(e) = axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}
