//! Record operation enum.

use std::fmt;

/// The five operations the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordOperation {
    /// Fetch one record by `id`.
    GetById,
    /// Insert or replace a record.
    Create,
    /// Scan every record.
    GetAll,
    /// Delete a record by `id`.
    Remove,
    /// Partially update a record's attributes.
    Update,
}

impl RecordOperation {
    /// Every operation, in routing-table order.
    pub const ALL: [Self; 5] = [
        Self::GetById,
        Self::Create,
        Self::GetAll,
        Self::Remove,
        Self::Update,
    ];

    /// Returns the selector string used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetById => "getById",
            Self::Create => "create",
            Self::GetAll => "getAll",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }

    /// Parse a selector string into a `RecordOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "getById" => Some(Self::GetById),
            "create" => Some(Self::Create),
            "getAll" => Some(Self::GetAll),
            "remove" => Some(Self::Remove),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

impl fmt::Display for RecordOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_resolve_all_operations() {
        for op in RecordOperation::ALL {
            assert_eq!(RecordOperation::from_name(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_should_match_selectors_case_sensitively() {
        assert_eq!(RecordOperation::from_name("GetById"), None);
        assert_eq!(RecordOperation::from_name("frobnicate"), None);
        assert_eq!(RecordOperation::from_name(""), None);
    }
}
