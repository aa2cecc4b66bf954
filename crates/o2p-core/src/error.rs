//! Backend and store errors.

use o2p_model::{ModelError, RecordOperation};

use crate::expression::ExpressionError;

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The configured table does not exist.
    #[error("Requested resource not found: Table: {table} not found")]
    TableNotFound {
        /// Table name.
        table: String,
    },
    /// The update expression could not be parsed or evaluated.
    #[error("Invalid UpdateExpression: {0}")]
    Expression(#[from] ExpressionError),
    /// The request was rejected before touching storage.
    #[error("{0}")]
    Validation(String),
    /// A stored item could not be decoded into a record.
    #[error("malformed stored item: {0}")]
    MalformedItem(#[from] ModelError),
    /// The remote service call failed.
    #[error("{message}")]
    Service {
        /// Human-readable summary.
        message: String,
        /// Underlying client error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BackendError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a client error.
    #[must_use]
    pub fn service<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Service {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Failure of a record store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record key was empty; the backend was not called.
    #[error("{operation}: record id must not be empty")]
    EmptyId {
        /// Operation that was attempted.
        operation: RecordOperation,
    },
    /// The requested change could not be expressed as an update.
    #[error("{operation}: {source}")]
    InvalidChange {
        /// Operation that was attempted.
        operation: RecordOperation,
        /// Validation failure.
        #[source]
        source: ModelError,
    },
    /// The backend call failed.
    #[error("{operation}: {source}")]
    Backend {
        /// Operation that was attempted.
        operation: RecordOperation,
        /// Backend failure.
        #[source]
        source: BackendError,
    },
}

impl StoreError {
    /// Operation the error was raised for.
    #[must_use]
    pub fn operation(&self) -> RecordOperation {
        match self {
            Self::EmptyId { operation }
            | Self::InvalidChange { operation, .. }
            | Self::Backend { operation, .. } => *operation,
        }
    }

    /// Returns `true` if the backend was reached and failed.
    #[must_use]
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
