use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use release_gate::config::GateConfig;
use release_gate::intake::ReleaseRouter;
use release_gate::registry::RepositoryRegistry;
use release_gate::server::{AppState, build_router};
use release_gate::store::ReleaseStore;
use release_gate::worker::{LogProcessor, ReleaseProcessor, release_queue, run_worker};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "release_gate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GateConfig::from_env();

    let store = ReleaseStore::new();
    let registry = RepositoryRegistry::new();
    for repo in &config.repositories {
        tracing::info!(id = %repo.github_id, name = %repo.name, enabled = repo.enabled, "registering repository");
        registry.register(repo.clone());
    }

    let (queue_tx, queue_rx) = release_queue(config.queue_capacity);
    let processor: Arc<dyn ReleaseProcessor> = Arc::new(LogProcessor);

    let router = Arc::new(
        ReleaseRouter::new(store.clone(), registry, queue_tx, Arc::clone(&processor))
            .with_async_mode(config.async_mode),
    );

    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(run_worker(
        queue_rx,
        store.clone(),
        processor,
        shutdown.clone(),
    ));

    let app = build_router(AppState::new(router, config.webhook_secret.clone()));

    tracing::info!(addr = %config.bind_addr, async_mode = config.async_mode, "listening");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();

    shutdown.cancel();
    let _ = worker.await;
}
