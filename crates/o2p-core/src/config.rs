//! Store configuration.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Default table name when `O2P_TABLE_NAME` is unset.
pub const DEFAULT_TABLE_NAME: &str = "o2p";

/// Which storage backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local tables.
    #[default]
    Memory,
    /// A DynamoDB table reached through the AWS SDK.
    DynamoDb,
}

impl BackendKind {
    /// Returns the configuration string for this backend.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::DynamoDb => "dynamodb",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "dynamodb" => Ok(Self::DynamoDb),
            other => Err(format!("unknown backend '{other}', expected memory or dynamodb")),
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Table holding the records.
    pub table_name: String,
    /// Storage backend.
    pub backend: BackendKind,
    /// Endpoint override for the DynamoDB client (local emulators).
    pub dynamodb_endpoint: Option<String>,
    /// AWS region for the DynamoDB client.
    pub region: String,
    /// Reject unknown selectors and missing arguments instead of answering `null`.
    pub strict_operations: bool,
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// An unparseable `O2P_BACKEND` falls back to the in-memory backend with
    /// a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let backend = env::var("O2P_BACKEND").map_or(BackendKind::Memory, |v| {
            v.parse().unwrap_or_else(|err: String| {
                tracing::warn!(error = %err, "falling back to the memory backend");
                BackendKind::Memory
            })
        });

        Self {
            table_name: env::var("O2P_TABLE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_owned()),
            backend,
            dynamodb_endpoint: env::var("O2P_DYNAMODB_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty()),
            region: env::var("DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_owned()),
            strict_operations: env_bool("O2P_STRICT_OPERATIONS", false),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_owned(),
            backend: BackendKind::Memory,
            dynamodb_endpoint: None,
            region: "us-east-1".to_owned(),
            strict_operations: false,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
