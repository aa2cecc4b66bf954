//! Update expression evaluation against an item.

use std::collections::HashMap;

use o2p_model::{AttributeValue, Item};

use super::ast::{AttributeRef, UpdateExpr};
use super::parser::ExpressionError;

/// Placeholder bindings plus the item being updated.
#[derive(Debug)]
pub struct EvalContext<'a> {
    /// Current state of the item.
    pub item: &'a Item,
    /// Expression attribute names (`#attr0` to attribute name).
    pub names: &'a HashMap<String, String>,
    /// Expression attribute values (`:val0` to value).
    pub values: &'a HashMap<String, AttributeValue>,
}

impl EvalContext<'_> {
    /// Resolve an attribute reference to the attribute name it denotes.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedName` if a placeholder has no binding.
    pub fn resolve_name(&self, path: &AttributeRef) -> Result<String, ExpressionError> {
        match path {
            AttributeRef::Name(name) => Ok(name.clone()),
            AttributeRef::Placeholder(placeholder) => self
                .names
                .get(placeholder)
                .cloned()
                .ok_or_else(|| ExpressionError::UnresolvedName {
                    name: placeholder.clone(),
                }),
        }
    }

    /// Look up a value placeholder.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedValue` if the placeholder has no binding.
    pub fn resolve_value(&self, placeholder: &str) -> Result<&AttributeValue, ExpressionError> {
        self.values
            .get(placeholder)
            .ok_or_else(|| ExpressionError::UnresolvedValue {
                name: placeholder.to_owned(),
            })
    }

    /// Apply every `SET` action, returning the new item and the attributes
    /// that were written (`UPDATED_NEW`).
    ///
    /// Nothing is applied unless every placeholder resolves.
    ///
    /// # Errors
    ///
    /// Returns an `ExpressionError` for any unresolved placeholder.
    pub fn apply_update(&self, update: &UpdateExpr) -> Result<(Item, Item), ExpressionError> {
        let mut updated = Item::with_capacity(update.set_actions.len());
        for action in &update.set_actions {
            let name = self.resolve_name(&action.path)?;
            let value = self.resolve_value(&action.value)?;
            updated.insert(name, value.clone());
        }

        let mut item = self.item.clone();
        item.extend(updated.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok((item, updated))
    }
}
