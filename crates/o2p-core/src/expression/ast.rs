//! Update expression AST.

use std::collections::HashSet;
use std::fmt;

/// Left-hand side of a `SET` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeRef {
    /// A bare attribute name, e.g. `name`.
    Name(String),
    /// An expression attribute name placeholder including its `#`, e.g. `#attr0`.
    Placeholder(String),
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) | Self::Placeholder(name) => f.write_str(name),
        }
    }
}

/// One `path = :value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAction {
    /// Target attribute.
    pub path: AttributeRef,
    /// Value placeholder including its `:`, e.g. `:val0`.
    pub value: String,
}

/// A parsed update expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateExpr {
    /// Assignments in the order they were written.
    pub set_actions: Vec<SetAction>,
}

impl UpdateExpr {
    /// Name placeholders referenced by the expression.
    #[must_use]
    pub fn collect_names(&self) -> HashSet<String> {
        self.set_actions
            .iter()
            .filter_map(|action| match &action.path {
                AttributeRef::Placeholder(name) => Some(name.clone()),
                AttributeRef::Name(_) => None,
            })
            .collect()
    }

    /// Value placeholders referenced by the expression.
    #[must_use]
    pub fn collect_values(&self) -> HashSet<String> {
        self.set_actions
            .iter()
            .map(|action| action.value.clone())
            .collect()
    }
}
