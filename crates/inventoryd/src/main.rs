use std::net::IpAddr;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use inventoryd::config::StorageConfig;
use inventoryd::device::DeviceRepository;
use inventoryd::storage::InMemoryDeviceRepository;
use inventoryd::storage::JsonFileDeviceRepository;
use inventoryd::Config;
use inventoryd::DeviceRegistrationService;

/// Device inventory daemon.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config files, merged in order
    #[arg(value_name = "CONFIG", default_value = "inventoryd.toml")]
    configs: Vec<PathBuf>,

    /// Address to listen on, overriding api.listen
    #[arg(long)]
    listen: Option<IpAddr>,

    /// Port to listen on, overriding api.port
    #[arg(long)]
    port: Option<u16>,

    /// Validate the config and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, warnings) = match Config::from_files(&args.configs) {
        Ok(loaded) => loaded,
        Err(diagnostics) => {
            eprint!("{}", diagnostics);
            anyhow::bail!("invalid configuration");
        }
    };
    if !warnings.is_empty() {
        eprint!("{}", warnings);
    }

    if args.check {
        println!("Configuration OK");
        return Ok(());
    }

    if let Some(listen) = args.listen {
        config.api.listen = listen;
    }
    if let Some(port) = args.port {
        anyhow::ensure!(port != 0, "--port must be non-zero");
        config.api.port = port;
    }

    inventoryd::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("inventoryd starting");
    tracing::info!("Loaded config from: {:?}", args.configs);

    let repository = open_repository(&config.storage).await?;
    let service = Arc::new(DeviceRegistrationService::with_default_factory(repository));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received shutdown signal"),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    let addr = SocketAddr::new(config.api.listen, config.api.port);
    inventoryd::api::serve(addr, service, shutdown_rx)
        .await
        .with_context(|| format!("HTTP API server on {} failed", addr))?;

    tracing::info!("inventoryd shutdown complete");
    Ok(())
}

async fn open_repository(storage: &StorageConfig) -> anyhow::Result<Arc<dyn DeviceRepository>> {
    match storage {
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; devices are lost on restart");
            Ok(Arc::new(InMemoryDeviceRepository::new()))
        }
        StorageConfig::JsonFile { path } => {
            let repository = JsonFileDeviceRepository::open(path.clone())
                .await
                .with_context(|| format!("failed to open device store {}", path.display()))?;
            tracing::info!(
                "Opened device store {} ({} device(s))",
                path.display(),
                repository.len().await
            );
            Ok(Arc::new(repository))
        }
    }
}
