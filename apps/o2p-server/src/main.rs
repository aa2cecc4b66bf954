//! O2P Server - HTTP front for the O2P record store.
//!
//! Accepts invocation events (`{"operation", "arguments"}` or AppSync resolver
//! events) and answers with the operation's JSON result.
//!
//! # Usage
//!
//! ```text
//! O2P_LISTEN=0.0.0.0:4000 O2P_BACKEND=dynamodb o2p-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `O2P_LISTEN` | `0.0.0.0:4000` | Bind address |
//! | `O2P_TABLE_NAME` | `o2p` | Backing table |
//! | `O2P_BACKEND` | `memory` | `memory` or `dynamodb` |
//! | `O2P_DYNAMODB_ENDPOINT` | *(unset)* | DynamoDB endpoint override |
//! | `DEFAULT_REGION` | `us-east-1` | AWS region |
//! | `O2P_STRICT_OPERATIONS` | `false` | Reject unknown operations and missing arguments |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use o2p_core::{BackendKind, Dispatcher, MemoryBackend, RecordBackend, RecordStore, StoreConfig};
use o2p_http::{InvocationHttpConfig, InvocationHttpService};

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

/// Construct the configured storage backend.
async fn build_backend(config: &StoreConfig) -> Result<Arc<dyn RecordBackend>> {
    match config.backend {
        BackendKind::Memory => {
            Ok(Arc::new(MemoryBackend::new().with_table(config.table_name.clone())))
        }
        #[cfg(feature = "dynamodb")]
        BackendKind::DynamoDb => Ok(Arc::new(
            o2p_core::DynamoDbBackend::from_config(config).await,
        )),
        #[cfg(not(feature = "dynamodb"))]
        BackendKind::DynamoDb => {
            anyhow::bail!("the dynamodb backend is not compiled in; rebuild with --features dynamodb")
        }
    }
}

/// Perform a health check by requesting the health endpoint.
///
/// Succeeds if the response is 200 OK and reports `"running"`.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

/// Read the listen address from the environment.
fn listen_addr() -> String {
    std::env::var("O2P_LISTEN").unwrap_or_else(|_| "0.0.0.0:4000".to_owned())
}

/// Read the log level from the environment.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned())
}

/// Whether `LOG_FORMAT` asks for JSON lines.
fn log_format_is_json(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let listen_addr = listen_addr();

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = listen_addr.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let json_logs = log_format_is_json(std::env::var("LOG_FORMAT").ok().as_deref());
    init_tracing(&log_level(), json_logs)?;

    let config = StoreConfig::from_env();
    info!(
        table = %config.table_name,
        backend = %config.backend,
        endpoint = ?config.dynamodb_endpoint,
        region = %config.region,
        strict_operations = config.strict_operations,
        "initializing record store",
    );

    let backend = build_backend(&config).await?;
    let store = RecordStore::new(backend, config.table_name.clone());
    let dispatcher = Dispatcher::new(store).with_strict_operations(config.strict_operations);
    let service = InvocationHttpService::new(
        Arc::new(dispatcher),
        InvocationHttpConfig {
            version: VERSION.to_owned(),
            ..InvocationHttpConfig::default()
        },
    );

    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid bind address: {listen_addr}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, version = VERSION, "starting O2P Server");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };
    o2p_http::serve(listener, service, shutdown).await;

    Ok(())
}
