//! Hyper `Service` decoding invocation events and encoding their results.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use tracing::{debug, warn};

use o2p_model::{InboundEvent, InvocationEvent};

use crate::dispatch::InvocationHandler;
use crate::response::{
    CONTENT_TYPE, REQUEST_ID_HEADER, dispatch_error_to_response, error_response, json_response,
};
use crate::router::{Route, resolve_route};

/// Default request body limit, matching the Lambda synchronous payload cap.
pub const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct InvocationHttpConfig {
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Version reported by the health endpoint.
    pub version: String,
}

impl Default for InvocationHttpConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Hyper `Service` implementation wrapping an [`InvocationHandler`].
#[derive(Debug)]
pub struct InvocationHttpService<H: InvocationHandler> {
    handler: Arc<H>,
    config: Arc<InvocationHttpConfig>,
}

impl<H: InvocationHandler> InvocationHttpService<H> {
    /// Create a new `InvocationHttpService`.
    pub fn new(handler: Arc<H>, config: InvocationHttpConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }
}

impl<H: InvocationHandler> Clone for InvocationHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: InvocationHandler> hyper::service::Service<http::Request<Incoming>>
    for InvocationHttpService<H>
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = process_request(req, handler.as_ref(), &config, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

async fn process_request<H: InvocationHandler>(
    req: http::Request<Incoming>,
    handler: &H,
    config: &InvocationHttpConfig,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    let (parts, incoming) = req.into_parts();

    match resolve_route(&parts.method, parts.uri.path()) {
        Route::Invoke => invoke(incoming, handler, config, request_id).await,
        Route::Health => health_response(config, request_id),
        Route::MethodNotAllowed => error_response(
            http::StatusCode::METHOD_NOT_ALLOWED,
            "MethodNotAllowed",
            &format!("{} is not allowed on {}", parts.method, parts.uri.path()),
            request_id,
        ),
        Route::NotFound => error_response(
            http::StatusCode::NOT_FOUND,
            "NotFound",
            &format!("no route for {} {}", parts.method, parts.uri.path()),
            request_id,
        ),
    }
}

async fn invoke<H: InvocationHandler>(
    incoming: Incoming,
    handler: &H,
    config: &InvocationHttpConfig,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    // 1. Collect body.
    let body = match collect_body(incoming, config.max_body_bytes, request_id).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    // 2. Decode the event.
    let event: InvocationEvent = match serde_json::from_slice::<InboundEvent>(&body) {
        Ok(event) => event.into(),
        Err(e) => {
            debug!(request_id, error = %e, "undecodable invocation event");
            return error_response(
                http::StatusCode::BAD_REQUEST,
                "SerializationException",
                &e.to_string(),
                request_id,
            );
        }
    };
    debug!(request_id, operation = %event.operation, "invocation received");

    // 3. Dispatch.
    let output = match handler.handle_event(event).await {
        Ok(output) => output,
        Err(err) => {
            warn!(request_id, error = %err, "invocation rejected");
            return dispatch_error_to_response(&err, request_id);
        }
    };

    match serde_json::to_vec(&output) {
        Ok(json) => json_response(json, request_id),
        Err(e) => error_response(
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            &format!("failed to encode result: {e}"),
            request_id,
        ),
    }
}

/// Collect the request body, refusing anything over `limit` bytes.
async fn collect_body<B>(
    body: B,
    limit: usize,
    request_id: &str,
) -> Result<Bytes, http::Response<Full<Bytes>>>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => Err(error_response(
            http::StatusCode::PAYLOAD_TOO_LARGE,
            "RequestEntityTooLarge",
            &format!("request body exceeds {limit} bytes"),
            request_id,
        )),
        Err(e) => Err(error_response(
            http::StatusCode::BAD_REQUEST,
            "BadRequest",
            &format!("failed to read request body: {e}"),
            request_id,
        )),
    }
}

fn health_response(
    config: &InvocationHttpConfig,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    let json = serde_json::json!({
        "status": "running",
        "version": config.version,
    });
    json_response(json.to_string().into_bytes(), request_id)
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<Full<Bytes>>,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry(http::header::CONTENT_TYPE)
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static("o2p"));

    response
}
