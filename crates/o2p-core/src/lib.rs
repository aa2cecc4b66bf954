//! Record store, storage backends and operation dispatch for O2P.
//!
//! - [`store::RecordStore`]: the five record operations over one table
//! - [`dispatcher::Dispatcher`]: routes invocation events to the store
//! - [`backend::RecordBackend`]: the storage seam, implemented by
//!   [`memory::MemoryBackend`] and, with the `dynamodb` feature,
//!   `dynamodb::DynamoDbBackend`
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod dispatcher;
#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod error;
pub mod expression;
pub mod handler;
pub mod memory;
pub mod store;
pub mod update;

pub use backend::RecordBackend;
pub use config::{BackendKind, StoreConfig};
pub use dispatcher::Dispatcher;
#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbBackend;
pub use error::{BackendError, StoreError};
pub use memory::MemoryBackend;
pub use store::RecordStore;
pub use update::UpdatePlan;
