//! Response serialization and error formatting.

use bytes::Bytes;
use http_body_util::Full;
use o2p_model::DispatchError;

/// Content type of every response.
pub const CONTENT_TYPE: &str = "application/json";

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Serialize an error into a JSON body:
///
/// ```json
/// {"__type": "SerializationException", "message": "expected value at line 1 column 1"}
/// ```
#[must_use]
pub fn error_to_json(error_type: &str, message: &str) -> Vec<u8> {
    serde_json::json!({
        "__type": error_type,
        "message": message,
    })
    .to_string()
    .into_bytes()
}

/// Build a complete error response.
#[must_use]
pub fn error_response(
    status: http::StatusCode,
    error_type: &str,
    message: &str,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    json_response_with_status(status, error_to_json(error_type, message), request_id)
}

/// Convert a dispatcher rejection into a `400` response.
#[must_use]
pub fn dispatch_error_to_response(
    error: &DispatchError,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    error_response(
        http::StatusCode::BAD_REQUEST,
        error.error_type(),
        &error.to_string(),
        request_id,
    )
}

/// Build a `200` response from JSON bytes.
#[must_use]
pub fn json_response(json: Vec<u8>, request_id: &str) -> http::Response<Full<Bytes>> {
    json_response_with_status(http::StatusCode::OK, json, request_id)
}

fn json_response_with_status(
    status: http::StatusCode,
    json: Vec<u8>,
    request_id: &str,
) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(CONTENT_TYPE),
    );
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, hv);
    }
    response
}
