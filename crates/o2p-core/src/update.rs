//! Translation of a change set into a placeholder-based update expression.

use std::collections::HashMap;

use o2p_model::{AttributeValue, ChangeSet};

/// Prefix of generated expression attribute names.
pub const NAME_PLACEHOLDER_PREFIX: &str = "#attr";
/// Prefix of generated expression attribute values.
pub const VALUE_PLACEHOLDER_PREFIX: &str = ":val";

/// A `SET` update expression with its placeholder bindings.
///
/// Every attribute name goes through a `#attrN` placeholder, so reserved
/// words and unusual characters in attribute names are always safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// e.g. `SET #attr0 = :val0, #attr1 = :val1`
    pub expression: String,
    /// Expression attribute names.
    pub names: HashMap<String, String>,
    /// Expression attribute values.
    pub values: HashMap<String, AttributeValue>,
}

impl UpdatePlan {
    /// Build the plan for `changes`, numbering placeholders in change order.
    ///
    /// Returns `None` for an empty change set, which has no valid expression.
    #[must_use]
    pub fn build(changes: &ChangeSet) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }

        let mut clauses = Vec::with_capacity(changes.len());
        let mut names = HashMap::with_capacity(changes.len());
        let mut values = HashMap::with_capacity(changes.len());

        for (i, change) in changes.iter().enumerate() {
            let name_ph = format!("{NAME_PLACEHOLDER_PREFIX}{i}");
            let value_ph = format!("{VALUE_PLACEHOLDER_PREFIX}{i}");
            clauses.push(format!("{name_ph} = {value_ph}"));
            names.insert(name_ph, change.attribute.clone());
            values.insert(value_ph, change.value.clone());
        }

        Some(Self {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values,
        })
    }
}
