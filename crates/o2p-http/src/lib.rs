//! HTTP transport for the O2P record store.
//!
//! - **Router**: maps method and path to a [`router::Route`]
//! - **Handler trait**: the boundary between HTTP and the dispatcher
//! - **Service**: hyper `Service` decoding invocation events
//! - **Server**: accept loop with graceful shutdown
#![allow(missing_docs)]

pub mod dispatch;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use dispatch::InvocationHandler;
pub use server::serve;
pub use service::{InvocationHttpConfig, InvocationHttpService};
