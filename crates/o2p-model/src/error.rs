//! Model validation and dispatch errors.

use crate::operations::RecordOperation;

/// Errors raised while building or decoding model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The key attribute was named in a change set.
    #[error("Cannot update attribute (id). This attribute is part of the key")]
    KeyAttribute,
    /// An attribute name was empty.
    #[error("attribute names must not be empty")]
    EmptyAttributeName,
    /// A stored item carried no key attribute.
    #[error("item is missing the key attribute 'id'")]
    MissingKey,
    /// A stored item's key attribute was not a string.
    #[error("key attribute 'id' must be of type S, got {actual}")]
    InvalidKeyType {
        /// Type descriptor of the stored key value.
        actual: &'static str,
    },
    /// A stored attribute used a type records cannot carry.
    #[error("attribute '{attribute}' has unsupported type {actual}")]
    UnsupportedType {
        /// Attribute name.
        attribute: String,
        /// Type descriptor of the stored value.
        actual: &'static str,
    },
}

/// Dispatcher rejections, produced only when strict operation handling is on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The selector names no known operation.
    #[error("Unrecognized operation: {0}")]
    UnknownOperation(String),
    /// The operation's required argument was absent.
    #[error("Operation {operation} requires argument '{argument}'")]
    MissingArgument {
        /// Operation being dispatched.
        operation: RecordOperation,
        /// Name of the missing argument.
        argument: &'static str,
    },
}

impl DispatchError {
    /// Short error type string reported to callers.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::UnknownOperation(_) => "UnknownOperation",
            Self::MissingArgument { .. } => "MissingArgument",
        }
    }
}
