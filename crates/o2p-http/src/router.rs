//! Request routing.
//!
//! ```text
//! POST /          invoke an operation (also POST /invoke)
//! GET  /health    liveness probe
//! ```

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Decode the body as an invocation event and dispatch it.
    Invoke,
    /// Report liveness.
    Health,
    /// Known path, wrong method.
    MethodNotAllowed,
    /// Unknown path.
    NotFound,
}

/// Resolve the route for a request.
#[must_use]
pub fn resolve_route(method: &http::Method, path: &str) -> Route {
    match (path, method) {
        ("/" | "/invoke", &http::Method::POST) => Route::Invoke,
        ("/health", &http::Method::GET | &http::Method::HEAD) => Route::Health,
        ("/" | "/invoke" | "/health", _) => Route::MethodNotAllowed,
        _ => Route::NotFound,
    }
}
