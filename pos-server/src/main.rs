use pos_server::config::Config;
use pos_server::core::ServerState;
use pos_server::{api, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and configuration
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // 2. Logging; production logs to rolling files under the work dir
    if config.is_production() {
        let log_dir = format!("{}/logs", config.work_dir);
        std::fs::create_dir_all(&log_dir).ok();
        utils::logger::init_logger_with_file(Some("info"), Some(log_dir.as_str()));
    } else {
        utils::logger::init_logger();
    }

    // 3. Services
    let state = ServerState::initialize(&config)?;

    // 4. HTTP server
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!(%addr, epoch = %state.orders.epoch(), "pos-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
