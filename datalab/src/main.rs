use anyhow::Result;
use axum::{routing::get, Router};
use datalab_core::StaticRecords;
use datalab_workflow::{TaskRegistry, TaskRunner, WorkFactory};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the log level can seed the filter
    let config = config::Config::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Data Lab server");
    tracing::info!(
        max_concurrent_tasks = config.tasks.max_concurrent_tasks,
        timeout_secs = ?config.tasks.timeout_secs,
        "Configuration loaded"
    );

    // Build the task machinery
    let registry = TaskRegistry::from_config(&config.tasks);
    let runner = TaskRunner::new(registry.clone()).with_default_timeout(config.tasks.timeout());

    let edge_cases = catalog::edge_cases();
    let records = catalog::records(&edge_cases);
    tracing::info!(records = records.len(), "Catalog seeded");

    let factory = WorkFactory::from_config(&config.tasks, edge_cases);
    let api_state = datalab_api::AppState::new(
        registry.clone(),
        runner,
        factory,
        Arc::new(StaticRecords::new(records)),
    );

    tokio::spawn(prune_finished_tasks(
        registry,
        config.tasks.retention(),
        config.tasks.prune_interval(),
    ));

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", datalab_api::routes(api_state))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn prune_finished_tasks(registry: TaskRegistry, retention: Duration, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let pruned = registry.prune_terminal(retention).await;
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned finished tasks");
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
