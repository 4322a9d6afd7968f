use clap::Parser;
use cloud_file_storage::config::AppConfig;
use cloud_file_storage::infrastructure::{database, storage};
use cloud_file_storage::services::blob_store::BlobStore;
use cloud_file_storage::services::metadata_store::{MetadataStore, SeaOrmMetadataStore};
use cloud_file_storage::services::reconcile::Reconciler;
use cloud_file_storage::services::worker::BackgroundWorker;
use cloud_file_storage::{AppState, create_app};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service type to run (api, reconcile, all)
    #[arg(short, long, default_value = "all")]
    mode: String,

    /// Port for the API server
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_file_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if !matches!(args.mode.as_str(), "api" | "reconcile" | "all") {
        anyhow::bail!("unknown mode '{}': expected api, reconcile or all", args.mode);
    }

    info!("🚀 Starting Cloud File Storage [Mode: {}]...", args.mode);

    let config = AppConfig::from_env()?;
    info!(
        "🛡️  Config: Max Size={}MB, URL TTL={}s, Admin Role={}",
        config.max_file_size / 1024 / 1024,
        config.download_url_ttl_secs,
        config.admin_role
    );

    let db = database::setup_database().await?;
    let blobs: Arc<dyn BlobStore> = storage::setup_storage().await?;
    let metadata: Arc<dyn MetadataStore> = Arc::new(SeaOrmMetadataStore::new(db));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut handles = Vec::new();

    if args.mode == "reconcile" || args.mode == "all" {
        let reconciler = Reconciler::new(blobs.clone(), metadata.clone(), &config);
        let worker = BackgroundWorker::new(
            reconciler,
            std::time::Duration::from_secs(config.reconcile_interval_secs),
            shutdown_rx.clone(),
        );
        handles.push(tokio::spawn(worker.run()));
        info!(
            "👷 Reconciliation worker initialized (repair: {}).",
            config.reconcile_repair
        );
    }

    if args.mode == "api" || args.mode == "all" {
        let state = AppState::new(blobs.clone(), metadata.clone(), config.clone());

        let app = create_app(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("✅ API Server listening on: http://0.0.0.0:{}", args.port);
        info!(
            "📖 Swagger UI documentation: http://localhost:{}/swagger-ui",
            args.port
        );

        let mut server_shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = server_shutdown.changed().await;
                })
                .await
            {
                error!("❌ Server runtime error: {}", e);
            }
        }));
    }

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    info!("🛑 Shutting down services...");
    for handle in handles {
        let _ = handle.await;
    }

    info!("👋 Exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
