use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use tenant_api::state::{AppState, Repositories};
use tenant_infrastructure::database::{
    run_migrations, PgActivityRepository, PgBillingLogRepository, PgUsageRepository, PgWorkspaceRepository,
};
use tenant_infrastructure::shard::{ShardPool, ShardRouter};
use tenant_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes the file writer on drop
    let _log_guard = tenant_shared::telemetry::init_telemetry(&config.telemetry)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    // Shard pools are lazy; a missing primary is fatal here
    let pool = match ShardPool::init(&config.shards) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Shard configuration invalid: {}", e);
            std::process::exit(1);
        }
    };
    let router = Arc::new(ShardRouter::new(
        pool,
        Duration::from_millis(config.shards.probe_timeout_ms),
    ));

    if let Err(e) = run_migrations(&router).await {
        warn!("Migrations did not complete on every shard: {}", e);
    }

    let repos = Repositories {
        workspaces: Arc::new(PgWorkspaceRepository::new(router.clone())),
        billing_logs: Arc::new(PgBillingLogRepository::new(router.clone())),
        usage: Arc::new(PgUsageRepository::new(router.clone())),
        activities: Arc::new(PgActivityRepository::new(router.clone())),
    };
    let state = AppState::new(&config, repos, router.clone());
    let app = tenant_api::build_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    router.pool().shutdown().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
