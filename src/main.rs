use tracing_subscriber::EnvFilter;

use medtrack::api::server::start_server;
use medtrack::api::types::{ApiContext, Database};
use medtrack::{config, db};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Medtrack starting v{}", config::APP_VERSION);

    let data_dir = config::app_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!("Cannot create data directory {}: {e}", data_dir.display());
        std::process::exit(1);
    }

    // Open once up front so migrations run before the first request.
    let db_path = config::database_path();
    if let Err(e) = db::open_database(&db_path) {
        tracing::error!("Cannot open database {}: {e}", db_path.display());
        std::process::exit(1);
    }

    let ctx = ApiContext::new(Database::new(db_path));
    let mut server = match start_server(ctx, config::bind_addr()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Cannot start API server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
}
