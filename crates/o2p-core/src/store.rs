//! Record store facade.
//!
//! Five logical operations over one table. Each exists twice: a `try_`
//! variant returning `Result<_, StoreError>`, and a variant that logs any
//! failure and answers with the operation's empty value instead (absent
//! record, empty list, absent id). The upstream router only understands the
//! latter.

use std::sync::Arc;

use tracing::{debug, error, warn};

use o2p_model::{ChangeSet, Record, RecordOperation};

use crate::backend::RecordBackend;
use crate::error::{BackendError, StoreError};
use crate::update::UpdatePlan;

/// Record operations against a single table.
#[derive(Debug, Clone)]
pub struct RecordStore {
    backend: Arc<dyn RecordBackend>,
    table_name: String,
}

impl RecordStore {
    /// Create a store over `table_name` on `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordBackend>, table_name: impl Into<String>) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
        }
    }

    /// Name of the backing table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Store `record`, replacing any record with the same `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyId` for an empty key, or the backend failure.
    pub async fn try_create(&self, record: Record) -> Result<Record, StoreError> {
        let op = RecordOperation::Create;
        require_id(op, &record.id)?;
        self.backend
            .put(&self.table_name, record.clone().into_item())
            .await
            .map_err(|source| backend_failure(op, source))?;
        debug!(table = %self.table_name, id = %record.id, "record stored");
        Ok(record)
    }

    /// Fetch the record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyId` for an empty key, or the backend failure.
    pub async fn try_get_by_id(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let op = RecordOperation::GetById;
        require_id(op, id)?;
        let item = self
            .backend
            .get(&self.table_name, id)
            .await
            .map_err(|source| backend_failure(op, source))?;
        item.map(Record::from_item)
            .transpose()
            .map_err(|e| backend_failure(op, BackendError::MalformedItem(e)))
    }

    /// Every record in the table, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or `MalformedItem` if any stored item
    /// lacks a string `id`.
    pub async fn try_get_all(&self) -> Result<Vec<Record>, StoreError> {
        let op = RecordOperation::GetAll;
        let items = self
            .backend
            .scan(&self.table_name)
            .await
            .map_err(|source| backend_failure(op, source))?;
        items
            .into_iter()
            .map(Record::from_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| backend_failure(op, BackendError::MalformedItem(e)))
    }

    /// Delete the record with the given `id`, returning the `id`. Deleting a
    /// missing record succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyId` for an empty key, or the backend failure.
    pub async fn try_remove(&self, id: &str) -> Result<String, StoreError> {
        let op = RecordOperation::Remove;
        require_id(op, id)?;
        self.backend
            .delete(&self.table_name, id)
            .await
            .map_err(|source| backend_failure(op, source))?;
        debug!(table = %self.table_name, id, "record removed");
        Ok(id.to_owned())
    }

    /// Set each attribute in `changes` on the record `id`, leaving every
    /// other attribute untouched. A missing record is created.
    ///
    /// Returns `id` plus the changes as requested, not the stored record. An
    /// empty change set succeeds without calling the backend.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyId` for an empty key, or the backend failure.
    pub async fn try_update(&self, id: &str, changes: ChangeSet) -> Result<Record, StoreError> {
        let op = RecordOperation::Update;
        require_id(op, id)?;

        let Some(plan) = UpdatePlan::build(&changes) else {
            debug!(table = %self.table_name, id, "empty change set, skipping backend update");
            return Ok(Record::new(id));
        };

        debug!(
            table = %self.table_name,
            id,
            expression = %plan.expression,
            names = ?plan.names,
            values = ?plan.values,
            "update parameters"
        );

        let updated = self
            .backend
            .update(&self.table_name, id, &plan)
            .await
            .map_err(|source| backend_failure(op, source))?;
        debug!(table = %self.table_name, id, updated = ?updated, "record updated");

        Ok(Record {
            id: id.to_owned(),
            attributes: changes.into_attributes(),
        })
    }

    /// [`RecordStore::try_update`] taking the whole record: its `id` selects
    /// the record and its other attributes form the change set.
    ///
    /// # Errors
    ///
    /// As `try_update`, plus `StoreError::InvalidChange` if the attributes
    /// cannot form a change set.
    pub async fn try_update_record(&self, record: Record) -> Result<Record, StoreError> {
        let (id, attributes) = record.into_parts();
        let changes = ChangeSet::try_from(attributes).map_err(|source| StoreError::InvalidChange {
            operation: RecordOperation::Update,
            source,
        })?;
        self.try_update(&id, changes).await
    }

    /// [`RecordStore::try_create`], answering `None` on failure.
    pub async fn create(&self, record: Record) -> Option<Record> {
        self.try_create(record)
            .await
            .inspect_err(|e| self.log_failure(e))
            .ok()
    }

    /// [`RecordStore::try_get_by_id`], answering `None` on failure too.
    pub async fn get_by_id(&self, id: &str) -> Option<Record> {
        self.try_get_by_id(id)
            .await
            .inspect_err(|e| self.log_failure(e))
            .ok()
            .flatten()
    }

    /// [`RecordStore::try_get_all`], answering an empty list on failure.
    pub async fn get_all(&self) -> Vec<Record> {
        self.try_get_all()
            .await
            .inspect_err(|e| self.log_failure(e))
            .unwrap_or_default()
    }

    /// [`RecordStore::try_remove`], answering `None` on failure.
    pub async fn remove(&self, id: &str) -> Option<String> {
        self.try_remove(id)
            .await
            .inspect_err(|e| self.log_failure(e))
            .ok()
    }

    /// [`RecordStore::try_update`], answering `None` on failure.
    pub async fn update(&self, id: &str, changes: ChangeSet) -> Option<Record> {
        self.try_update(id, changes)
            .await
            .inspect_err(|e| self.log_failure(e))
            .ok()
    }

    /// [`RecordStore::try_update_record`], answering `None` on failure.
    pub async fn update_record(&self, record: Record) -> Option<Record> {
        self.try_update_record(record)
            .await
            .inspect_err(|e| self.log_failure(e))
            .ok()
    }

    fn log_failure(&self, err: &StoreError) {
        if err.is_backend_failure() {
            error!(
                operation = %err.operation(),
                table = %self.table_name,
                error = %err,
                "record store backend failure"
            );
        } else {
            warn!(
                operation = %err.operation(),
                table = %self.table_name,
                error = %err,
                "record store request rejected"
            );
        }
    }
}

fn require_id(operation: RecordOperation, id: &str) -> Result<(), StoreError> {
    if id.is_empty() {
        return Err(StoreError::EmptyId { operation });
    }
    Ok(())
}

fn backend_failure(operation: RecordOperation, source: BackendError) -> StoreError {
    StoreError::Backend { operation, source }
}
