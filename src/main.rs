//! QuickDesk server.
//!
//! Starts the REST API over a fresh in-memory store.
//!
//! Usage:
//!   cargo run --bin quickdesk         # start the server
//!   cargo run --bin load_data         # seed + query demo, in-process
//!   # Then drive it with quickdesk-cli or curl

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickdesk::config::Config;
use quickdesk::rest::create_router;
use quickdesk::seed;
use quickdesk::storage::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        addr = %config.addr,
        latency_ms = config.latency.as_millis() as u64,
        seed_demo = config.seed_demo,
        "starting quickdesk"
    );

    let store = Store::new(config.latency);
    if config.seed_demo {
        seed::seed_demo(&store).await?;
        tracing::info!("seeded demo dataset");
    }

    let app = create_router(store, config.jwt_secret.clone());
    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
