use swaad_server::core::{Config, Server, ServerState};
use swaad_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting Swaad Sagar server"
    );

    let state = ServerState::initialize(config).await?;
    Server::new(state).run().await?;
    Ok(())
}
