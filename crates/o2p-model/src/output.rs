//! Operation results as returned to the upstream router.

use serde::Serialize;

use crate::record::Record;

/// Result of one dispatched operation.
///
/// Serializes to the bare JSON value the caller sees: a record object, an
/// array of records, an `id` string, or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    /// `getById`, `create`, `update`.
    Record(Option<Record>),
    /// `getAll`.
    Records(Vec<Record>),
    /// `remove`.
    Id(Option<String>),
    /// Unrecognized selector or unusable arguments.
    Null,
}

impl OperationOutput {
    /// Returns `true` when the result serializes to `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Record(None) | Self::Id(None))
    }
}
