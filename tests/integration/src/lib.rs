//! Integration tests for the O2P server.
//!
//! The HTTP tests boot the service in-process on an ephemeral port and need
//! nothing else. The DynamoDB tests need a DynamoDB-compatible endpoint at
//! `localhost:8000` (or `O2P_DYNAMODB_ENDPOINT`) and are marked `#[ignore]`.
//!
//! Run them with:
//! ```text
//! cargo test -p o2p-integration -- --ignored
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use o2p_core::{Dispatcher, MemoryBackend, RecordBackend, RecordStore};
use o2p_http::{InvocationHttpConfig, InvocationHttpService};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A server running on a background task.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

/// Serve `dispatcher` on an ephemeral local port.
pub async fn spawn_server(dispatcher: Dispatcher) -> TestServer {
    spawn_server_with_config(dispatcher, InvocationHttpConfig::default()).await
}

/// Serve `dispatcher` with a custom HTTP configuration.
pub async fn spawn_server_with_config(
    dispatcher: Dispatcher,
    config: InvocationHttpConfig,
) -> TestServer {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    let service = InvocationHttpService::new(Arc::new(dispatcher), config);
    let (shutdown, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        o2p_http::serve(listener, service, async {
            let _ = rx.await;
        })
        .await;
    });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Dispatcher over `backend` and `table`.
#[must_use]
pub fn dispatcher(backend: Arc<dyn RecordBackend>, table: &str, strict: bool) -> Dispatcher {
    Dispatcher::new(RecordStore::new(backend, table)).with_strict_operations(strict)
}

/// Compatibility-mode dispatcher over a fresh in-memory `o2p` table.
#[must_use]
pub fn memory_dispatcher() -> Dispatcher {
    dispatcher(Arc::new(MemoryBackend::new().with_table("o2p")), "o2p", false)
}

/// POST `event` to the server, returning the status and decoded JSON body.
pub async fn invoke(
    client: &reqwest::Client,
    server: &TestServer,
    event: &serde_json::Value,
) -> (reqwest::StatusCode, serde_json::Value) {
    let resp = client
        .post(server.url("/"))
        .json(event)
        .send()
        .await
        .expect("request sent");
    let status = resp.status();
    let body = resp.json().await.expect("JSON response body");
    (status, body)
}

/// Endpoint URL for DynamoDB.
fn dynamodb_endpoint() -> String {
    std::env::var("O2P_DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_owned())
}

/// Create a configured DynamoDB client pointing at the local endpoint.
#[must_use]
pub fn dynamodb_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(dynamodb_endpoint())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_dynamodb;
mod test_records;
