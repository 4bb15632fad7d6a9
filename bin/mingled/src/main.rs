//! `mingled` — the Mingle server binary.
//!
//! Usage:
//!   mingled -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/mingle/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use mingle_core::Module;
use tracing::info;

use config::ServerConfig;

/// Mingle server.
#[derive(Parser, Debug)]
#[command(name = "mingled", about = "Mingle social server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = mingle_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn mingle_sql::SQLStore> = Arc::new(
        mingle_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize the social module.
    let social_config = social::service::SocialConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        access_token_ttl: server_config.jwt.expire_secs,
        ..Default::default()
    };
    let social_module = social::SocialModule::new(Arc::clone(&sql), social_config)
        .map_err(|e| anyhow::anyhow!("failed to initialize social module: {}", e))?;
    info!("Social module initialized");

    let module_routes = vec![(social_module.name(), social_module.routes())];

    // Build router.
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Mingle server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
