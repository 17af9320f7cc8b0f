use anyhow::Context;
use clap::Parser;
use okra_uom::config::{AppConfig, StoreBackend};
use okra_uom::utils::{logger, validation::Validate};
use okra_uom::{
    router, AppState, DocumentStore, DocumentUomRepository, LocalDocumentStore,
    MemoryDocumentStore, UomService,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "okra-uom")]
#[command(about = "Unit of Measure CRUD service")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "okra.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the listening port from config
    #[arg(long)]
    port: Option<u16>,

    /// Override the store backend from config (memory or local)
    #[arg(long)]
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(store) = args.store {
        config.store.backend = store;
    }

    logger::init_logger(&config.logging, args.verbose);
    tracing::info!("🚀 Starting okra-uom");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }
    if !config.validation.require_enabled {
        tracing::warn!("Disabled uoms are accepted (validation.require_enabled = false)");
    }

    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("📦 Using in-memory document store");
            serve(MemoryDocumentStore::new(), &config).await
        }
        StoreBackend::Local => {
            tracing::info!("📁 Using local document store at {}", config.store.data_dir.display());
            serve(LocalDocumentStore::new(config.store.data_dir.clone()), &config).await
        }
    }
}

async fn serve<S: DocumentStore + 'static>(store: S, config: &AppConfig) -> anyhow::Result<()> {
    let repo = DocumentUomRepository::with_collection(store, config.store.collection.clone());
    let service = UomService::new(repo).with_rules(config.uom_rules());
    let state = Arc::new(AppState {
        service,
        request_timeout: config.request_timeout(),
    });
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("✅ HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
}
