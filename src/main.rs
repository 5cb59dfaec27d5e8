use opsdesk_api::config;
use opsdesk_api::database::DatabaseManager;
use opsdesk_api::routes;
use opsdesk_api::services::TenantService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    init_tracing(config.logging.json);
    tracing::info!("Starting OpsDesk API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; login and protected routes will fail");
    }

    // Registry schema and tenant template. The server still starts without a
    // database so /health can report the outage.
    match DatabaseManager::migrate_main().await {
        Ok(()) => {
            if let Err(e) = TenantService::ensure_template(&config.database.tenant_template).await {
                tracing::warn!(template = %config.database.tenant_template, "Tenant template not prepared: {}", e);
            }
        }
        Err(e) => tracing::warn!("Registry migrations skipped: {}", e),
    }

    let app = routes::app();

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("OpsDesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    DatabaseManager::close_all().await;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("opsdesk_api=info,tower_http=info,sqlx=warn"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
