// # hostsyncd - NetBox hosts webhook daemon
//
// Thin integration layer around hostsync-core. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Building the Kubernetes client (fatal if it fails)
// 3. Wiring the NetBox source and ConfigMap store into a SyncEngine
// 4. Serving `POST /webhook` until SIGTERM/SIGINT
//
// All sync logic lives in hostsync-core.
//
// ## Configuration
//
// ### Inventory
// - `NETBOX_API_URL`: NetBox base URL (required)
// - `NETBOX_API_TOKEN`: NetBox API token (required)
// - `HOSTSYNC_PAGINATION`: `first-page` (default) or `follow`
// - `HOSTSYNC_INVENTORY_TIMEOUT_SECS`: Fetch deadline (default 30)
//
// ### Target ConfigMap
// - `K8S_NAMESPACE`: Namespace (default `kube-system`)
// - `K8S_CONFIGMAP`: ConfigMap name (default `netbox-hosts`)
// - `KUBECONFIG`: Kubeconfig path when running outside the cluster
// - `HOSTSYNC_STORE_TIMEOUT_SECS`: Deadline per ConfigMap call (default 10)
//
// ### Server
// - `HOSTSYNC_LISTEN_ADDR`: Listen address (default `0.0.0.0:$PORT`, `PORT` defaulting to 8080)
// - `HOSTSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export NETBOX_API_URL=https://netbox.example.com
// export NETBOX_API_TOKEN=0123456789abcdef
// export K8S_NAMESPACE=kube-system
// export K8S_CONFIGMAP=netbox-hosts
//
// hostsyncd
// curl -X POST http://localhost:8080/webhook
// ```

mod webhook;

use anyhow::{Context, Result};
use hostsync_core::{PaginationMode, SyncConfig, SyncEngine, TargetConfig};
use hostsync_inventory_netbox::NetboxInventory;
use hostsync_store_configmap::ConfigMapStore;
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Port used when neither `HOSTSYNC_LISTEN_ADDR` nor `PORT` is set
const DEFAULT_PORT: u16 = 8080;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<HostsyncExitCode> for ExitCode {
    fn from(code: HostsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
#[derive(Debug)]
struct Config {
    sync: SyncConfig,
    listen_addr: SocketAddr,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut sync = SyncConfig::new(
            var("NETBOX_API_URL").context("NETBOX_API_URL is required")?,
            var("NETBOX_API_TOKEN").context("NETBOX_API_TOKEN is required")?,
        );

        if let Some(mode) = var("HOSTSYNC_PAGINATION") {
            sync.inventory.pagination = mode.parse::<PaginationMode>()?;
        }
        if let Some(secs) = var("HOSTSYNC_INVENTORY_TIMEOUT_SECS") {
            sync.inventory.timeout_secs = parse_secs("HOSTSYNC_INVENTORY_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("HOSTSYNC_STORE_TIMEOUT_SECS") {
            sync.store.call_timeout_secs = parse_secs("HOSTSYNC_STORE_TIMEOUT_SECS", &secs)?;
        }
        sync.target = TargetConfig::with_fallback(var("K8S_NAMESPACE"), var("K8S_CONFIGMAP"));

        let listen_addr = match var("HOSTSYNC_LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("HOSTSYNC_LISTEN_ADDR '{}' is not a socket address", addr))?,
            None => {
                let port = match var("PORT") {
                    Some(port) => port
                        .parse()
                        .with_context(|| format!("PORT '{}' is not a valid port", port))?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let log_level = match var("HOSTSYNC_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "HOSTSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        Ok(Self {
            sync,
            listen_addr,
            log_level,
        })
    }

    /// Validate the configuration
    ///
    /// The NetBox URL is only checked for presence. A malformed URL fails
    /// each webhook call with a request construction error instead.
    fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .with_context(|| format!("{} must be a number of seconds. Got: {}", key, value))
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HostsyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return HostsyncExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HostsyncExitCode::ConfigError.into();
    }

    info!("Starting hostsyncd");
    info!(
        "Publishing into ConfigMap {}/{}",
        config.sync.target.namespace, config.sync.target.name
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HostsyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the engine and serve the webhook until a shutdown signal arrives
async fn run_daemon(config: Config) -> HostsyncExitCode {
    // The store client is the only process-fatal dependency
    let store = match ConfigMapStore::try_default().await {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            return HostsyncExitCode::ConfigError;
        }
    };

    let engine = match NetboxInventory::from_config(&config.sync.inventory)
        .and_then(|inventory| SyncEngine::new(Box::new(inventory), Box::new(store), config.sync))
    {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("Failed to build sync engine: {}", e);
            return HostsyncExitCode::ConfigError;
        }
    };

    match serve(engine, config.listen_addr).await {
        Ok(()) => HostsyncExitCode::CleanShutdown,
        Err(e) => {
            error!("Daemon error: {:#}", e);
            HostsyncExitCode::RuntimeError
        }
    }
}

async fn serve(engine: Arc<SyncEngine>, listen_addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;

    info!("Listening for webhook calls on {}", listen_addr);

    axum::serve(listener, webhook::webhook_router(engine))
        .with_graceful_shutdown(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => error!("Shutdown signal handler failed: {}", e),
            }
        })
        .await
        .context("Webhook server failed")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
