use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use notifier_service::config::Settings;
use notifier_service::dispatch::{
    MemoryUserDirectory, NotificationManager, PostgresUserDirectory, RedisChannel, UserDirectory,
};
use notifier_service::notification::create_notification_store;
use notifier_service::notifier::NotifierService;
use notifier_service::postgres::PostgresPool;
use notifier_service::server::{create_app, AppState};
use notifier_service::telemetry::init_telemetry;
use notifier_service::template::TemplateRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    let _telemetry_guard = init_telemetry(&settings.telemetry)?;
    tracing::info!("Configuration loaded");

    // Connect to PostgreSQL when the store needs it
    let postgres_pool = if settings.store.backend == "postgres" {
        let pool = PostgresPool::new(&settings.database).await?;
        tracing::info!(url = %pool.database_url_masked(), "PostgreSQL pool created");

        if settings.database.run_migrations {
            pool.run_migrations().await?;
        }
        Some(pool)
    } else {
        None
    };

    let store = create_notification_store(&settings.store, postgres_pool.as_ref());
    let templates = Arc::new(TemplateRegistry::from_config(&settings.notifier));

    let directory: Arc<dyn UserDirectory> = match postgres_pool {
        Some(ref pool) => Arc::new(PostgresUserDirectory::new(
            pool.pool().clone(),
            settings.notifier.users_table.clone(),
        )?),
        None => {
            tracing::warn!("No users table available, role recipients resolve to nobody");
            Arc::new(MemoryUserDirectory::new())
        }
    };

    let mut manager = NotificationManager::new(store.clone(), directory, templates.clone())
        .strict_templates(settings.notifier.strict_templates);

    if settings.redis.enabled {
        let channel = RedisChannel::connect(&settings.redis).await?;
        manager = manager.with_channel(Arc::new(channel));
    }
    tracing::info!(channels = ?manager.channel_names(), "Dispatch manager initialized");

    let notifier = NotifierService::new(store, Arc::new(manager), templates);

    // Create application state
    let mut state = AppState::new(settings.clone(), notifier);
    if let Some(pool) = postgres_pool.clone() {
        state = state.with_postgres(pool);
    }
    tracing::info!("Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
