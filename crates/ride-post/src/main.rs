use ride_post::{config::Config, run_server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;

    tracing::info!(
        port = config.port,
        meeting_points = config.settings.meeting_points.len(),
        "Starting ride-post"
    );

    run_server(config).await
}
