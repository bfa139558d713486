use alumni_sync::config::CONFIG;
use alumni_sync::db::LocalStore;
use alumni_sync::remote::{CollectionReader, FirestoreReader};
use alumni_sync::server::router::{SyncApiState, sync_router};
use alumni_sync::sync::{SyncTimeouts, SyncWorker, scheduler};
use mimalloc::MiMalloc;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel,
        remote_base_url = %cfg.remote.base_url,
        remote_project_id = %cfg.remote.project_id,
        remote_proxy = %cfg.remote.proxy.as_ref().map_or("<none>", url::Url::as_str),
        "Configuration loaded"
    );

    let store = alumni_sync::db::spawn(&cfg.basic.database_url).await?;
    let reader: Arc<dyn CollectionReader> = Arc::new(FirestoreReader::new(&cfg.remote)?);
    let local: Arc<dyn LocalStore> = Arc::new(store.clone());
    let worker = Arc::new(SyncWorker::new(
        reader,
        local,
        SyncTimeouts::from(&cfg.sync),
    ));
    let scheduler = scheduler::spawn(worker, cfg.sync.clone()).await?;

    let admin_key: Arc<str> = Arc::from(cfg.basic.admin_key.as_str());
    let state = SyncApiState::new(scheduler.clone(), store, admin_key);
    let app = sync_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Admin HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
