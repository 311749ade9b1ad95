//! Storyforge server binary.
//!
//! Loads `.env`, installs logging, resolves [`ServerConfig`] from the environment and runs the
//! REST persistence service.
//!
//! # Environment Variables
//! - `STORYFORGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
//! - `STORYFORGE_DATA_FILE`: JSON file backing the store (default: in-memory)
//! - `STORYFORGE_ANON_KEY`: key required in the `apikey` header on signup (default: none)
//! - `RUST_LOG`: extra tracing directives

use api_rest::config::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storyforge=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServerConfig::from_env()?;
    match cfg.data_file() {
        Some(path) => tracing::info!("++ Story data file: {}", path.display()),
        None => tracing::info!("++ Story data kept in memory"),
    }
    if cfg.anon_key().is_some() {
        tracing::info!("++ Signup requires the anonymous key");
    }

    api_rest::serve(cfg).await
}
