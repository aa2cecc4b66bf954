//! Ordered set of attribute changes for a partial update.

use std::collections::HashMap;

use crate::attribute_value::AttributeValue;
use crate::error::ModelError;
use crate::record::{Attributes, KEY_ATTRIBUTE};

/// One attribute assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Attribute name as stored.
    pub attribute: String,
    /// New value.
    pub value: AttributeValue,
}

/// Attribute changes in the order they were requested.
///
/// Never contains the key attribute or an empty name. Setting a name twice
/// replaces the earlier value and keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
    /// Position of each attribute in `changes`.
    index: HashMap<String, usize>,
}

impl ChangeSet {
    /// Create an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a change.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when `attribute` is empty or is the key.
    pub fn set(
        &mut self,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Result<(), ModelError> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(ModelError::EmptyAttributeName);
        }
        if attribute == KEY_ATTRIBUTE {
            return Err(ModelError::KeyAttribute);
        }
        let value = value.into();
        match self.index.get(&attribute) {
            Some(&pos) => self.changes[pos].value = value,
            None => {
                self.index.insert(attribute.clone(), self.changes.len());
                self.changes.push(Change { attribute, value });
            }
        }
        Ok(())
    }

    /// Builder-style [`ChangeSet::set`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when `attribute` is empty or is the key.
    pub fn with(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Result<Self, ModelError> {
        self.set(attribute, value)?;
        Ok(self)
    }

    /// Number of distinct attributes changed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate over the changes in request order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// The changes as an attribute collection, in request order.
    #[must_use]
    pub fn into_attributes(self) -> Attributes {
        self.changes
            .into_iter()
            .map(|c| (c.attribute, c.value))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Attributes> for ChangeSet {
    type Error = ModelError;

    fn try_from(attributes: Attributes) -> Result<Self, Self::Error> {
        let mut changes = Self {
            changes: Vec::with_capacity(attributes.len()),
            index: HashMap::with_capacity(attributes.len()),
        };
        for (name, value) in attributes {
            changes.set(name, value)?;
        }
        Ok(changes)
    }
}
