//! In-memory storage backend.
//!
//! Tables live in a [`DashMap`] keyed by name; each table is itself a
//! `DashMap` from `id` to item. Updates run inside the map's entry lock, so a
//! read-modify-write on one key never interleaves with another writer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use o2p_model::{AttributeValue, Item, KEY_ATTRIBUTE, ModelError};

use crate::backend::RecordBackend;
use crate::error::BackendError;
use crate::expression::{AttributeRef, EvalContext, ExpressionError, UpdateExpr, parse_update};
use crate::update::UpdatePlan;

/// Items of a single table, keyed by `id`.
#[derive(Debug, Default)]
pub struct TableStorage {
    items: DashMap<String, Item>,
}

impl TableStorage {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Store an item, returning the one it replaced.
    pub fn put_item(&self, id: String, item: Item) -> Option<Item> {
        self.items.insert(id, item)
    }

    /// Fetch a copy of an item.
    #[must_use]
    pub fn get_item(&self, id: &str) -> Option<Item> {
        self.items.get(id).map(|r| r.value().clone())
    }

    /// Remove an item, returning it if it existed.
    pub fn delete_item(&self, id: &str) -> Option<Item> {
        self.items.remove(id).map(|(_, item)| item)
    }

    /// Copy out every item.
    #[must_use]
    pub fn scan(&self) -> Vec<Item> {
        self.items.iter().map(|r| r.value().clone()).collect()
    }

    /// Atomically replace the item under `id` with the result of `apply`.
    ///
    /// A missing item starts out as `{id}`. `apply` returns the new item and
    /// the attributes it wrote; if it fails, the stored item is untouched.
    pub fn update_item<F>(&self, id: &str, apply: F) -> Result<Item, ExpressionError>
    where
        F: FnOnce(&Item) -> Result<(Item, Item), ExpressionError>,
    {
        match self.items.entry(id.to_owned()) {
            Entry::Occupied(mut entry) => {
                let (item, updated) = apply(entry.get())?;
                entry.insert(item);
                Ok(updated)
            }
            Entry::Vacant(entry) => {
                let base = Item::from([(KEY_ATTRIBUTE.to_owned(), AttributeValue::from(id))]);
                let (item, updated) = apply(&base)?;
                entry.insert(item);
                Ok(updated)
            }
        }
    }
}

/// Process-local record backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: DashMap<String, Arc<TableStorage>>,
}

impl MemoryBackend {
    /// Create a backend with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MemoryBackend::create_table`].
    #[must_use]
    pub fn with_table(self, name: impl Into<String>) -> Self {
        self.create_table(name);
        self
    }

    /// Create a table. Returns `false` if it already existed.
    pub fn create_table(&self, name: impl Into<String>) -> bool {
        match self.tables.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(Arc::new(TableStorage::new()));
                true
            }
        }
    }

    /// Drop a table and all of its items. Returns `false` if it did not exist.
    pub fn delete_table(&self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// All table names (sorted).
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Get a table or return `TableNotFound`.
    pub fn require_table(&self, name: &str) -> Result<Arc<TableStorage>, BackendError> {
        self.tables
            .get(name)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| BackendError::TableNotFound {
                table: name.to_owned(),
            })
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn put(&self, table: &str, item: Item) -> Result<(), BackendError> {
        let table = self.require_table(table)?;
        let id = item_key(&item)?.to_owned();
        table.put_item(id, item);
        Ok(())
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<Item>, BackendError> {
        let table = self.require_table(table)?;
        validate_key(id)?;
        Ok(table.get_item(id))
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        plan: &UpdatePlan,
    ) -> Result<Item, BackendError> {
        let table = self.require_table(table)?;
        validate_key(id)?;

        let update = parse_update(&plan.expression)?;
        validate_update(&update, &plan.names, &plan.values)?;

        let updated = table.update_item(id, |current| {
            EvalContext {
                item: current,
                names: &plan.names,
                values: &plan.values,
            }
            .apply_update(&update)
        })?;
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        let table = self.require_table(table)?;
        validate_key(id)?;
        table.delete_item(id);
        Ok(())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, BackendError> {
        Ok(self.require_table(table)?.scan())
    }
}

/// Extract and validate the `id` of an item about to be stored.
fn item_key(item: &Item) -> Result<&str, BackendError> {
    let value = item.get(KEY_ATTRIBUTE).ok_or_else(|| {
        BackendError::validation(format!(
            "One or more parameter values were invalid: Missing the key {KEY_ATTRIBUTE} in the item"
        ))
    })?;
    let id = value.as_s().ok_or_else(|| {
        BackendError::validation(format!(
            "One or more parameter values were invalid: Type mismatch for key {KEY_ATTRIBUTE} \
             expected: S actual: {}",
            value.type_descriptor()
        ))
    })?;
    validate_key(id)?;
    Ok(id)
}

fn validate_key(id: &str) -> Result<(), BackendError> {
    if id.is_empty() {
        return Err(BackendError::validation(format!(
            "One or more parameter values are not valid. The AttributeValue for a key attribute \
             cannot contain an empty string value. Key: {KEY_ATTRIBUTE}"
        )));
    }
    Ok(())
}

/// Reject updates DynamoDB itself would reject before touching the item.
fn validate_update(
    update: &UpdateExpr,
    names: &HashMap<String, String>,
    values: &HashMap<String, AttributeValue>,
) -> Result<(), BackendError> {
    validate_no_unused(
        "ExpressionAttributeNames",
        names.keys(),
        &update.collect_names(),
    )?;
    validate_no_unused(
        "ExpressionAttributeValues",
        values.keys(),
        &update.collect_values(),
    )?;

    let mut seen = HashSet::new();
    for action in &update.set_actions {
        let target = match &action.path {
            AttributeRef::Name(name) => name.as_str(),
            AttributeRef::Placeholder(ph) => match names.get(ph) {
                Some(name) => name.as_str(),
                None => continue,
            },
        };
        if target == KEY_ATTRIBUTE {
            return Err(BackendError::validation(ModelError::KeyAttribute.to_string()));
        }
        if !seen.insert(target) {
            return Err(BackendError::validation(format!(
                "Invalid UpdateExpression: Two document paths overlap with each other; must \
                 remove or rewrite one of these paths; path one: [{target}], path two: [{target}]"
            )));
        }
    }
    Ok(())
}

fn validate_no_unused<'a>(
    parameter: &str,
    provided: impl Iterator<Item = &'a String>,
    used: &HashSet<String>,
) -> Result<(), BackendError> {
    let mut unused: Vec<&str> = provided
        .filter(|k| !used.contains(k.as_str()))
        .map(String::as_str)
        .collect();
    if !unused.is_empty() {
        unused.sort_unstable();
        return Err(BackendError::validation(format!(
            "Value provided in {parameter} unused in expressions: keys: {{{}}}",
            unused.join(", ")
        )));
    }
    Ok(())
}
