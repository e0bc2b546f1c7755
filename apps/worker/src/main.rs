use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibecheck_worker::config::Config;
use vibecheck_worker::jobs::cycle::{self, CycleRequest};
use vibecheck_worker::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(config.log_level())
                .unwrap_or_else(|_| "vibecheck_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(environment = %config.environment(), "Starting Vibecheck worker");

    let state = AppState::new(config.spotify())?;
    let request = CycleRequest {
        session: config.session.clone(),
        peer_session: config.peer_session.clone(),
        playlist_id: config.playlist_id.clone(),
    };

    let summary = cycle::run(&state, &request).await.map_err(|e| {
        e.log();
        e
    })?;

    println!("{}", summary.to_json()?);

    Ok(())
}
