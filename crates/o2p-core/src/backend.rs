//! Storage backend abstraction.
//!
//! The record store speaks to its table through [`RecordBackend`]. Items are
//! plain attribute maps keyed by the string attribute `id`.

use async_trait::async_trait;

use o2p_model::Item;

use crate::error::BackendError;
use crate::update::UpdatePlan;

/// A key-value table of records, keyed by the string attribute `id`.
#[async_trait]
pub trait RecordBackend: Send + Sync + std::fmt::Debug {
    /// Store `item`, replacing any item with the same `id`.
    async fn put(&self, table: &str, item: Item) -> Result<(), BackendError>;

    /// Fetch the item with the given `id`.
    async fn get(&self, table: &str, id: &str) -> Result<Option<Item>, BackendError>;

    /// Apply `plan` to the item with the given `id`, creating it if absent.
    ///
    /// Returns the attributes that were written.
    async fn update(&self, table: &str, id: &str, plan: &UpdatePlan)
    -> Result<Item, BackendError>;

    /// Delete the item with the given `id`; deleting a missing item succeeds.
    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError>;

    /// Every item in the table, in no particular order.
    async fn scan(&self, table: &str) -> Result<Vec<Item>, BackendError>;
}
