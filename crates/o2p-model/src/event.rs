//! Invocation events handed to the dispatcher by the upstream router.
//!
//! Two shapes are accepted:
//!
//! ```text
//! {"operation": "getById", "arguments": {"id": "c1"}}
//! {"info": {"fieldName": "getById"}, "arguments": {"id": "c1"}}
//! ```
//!
//! The second is the AppSync resolver event. Its record argument is named
//! `chicken`, which is accepted as an alias of `record`.

use serde::{Deserialize, Serialize};

use crate::operations::RecordOperation;
use crate::record::Record;

/// Arguments payload; which members matter depends on the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    /// Record key for `getById` and `remove`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whole record for `create` and `update`.
    #[serde(default, alias = "chicken", skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
}

impl Arguments {
    /// Arguments carrying only an `id`.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            record: None,
        }
    }

    /// Arguments carrying only a record.
    #[must_use]
    pub fn with_record(record: Record) -> Self {
        Self {
            id: None,
            record: Some(record),
        }
    }
}

/// Normalized invocation event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEvent {
    /// Operation selector, e.g. `"getById"`.
    pub operation: String,
    /// Operation arguments.
    #[serde(default)]
    pub arguments: Arguments,
}

impl InvocationEvent {
    /// Build an event for a known operation.
    #[must_use]
    pub fn new(operation: RecordOperation, arguments: Arguments) -> Self {
        Self {
            operation: operation.as_str().to_owned(),
            arguments,
        }
    }
}

/// `info` block of an AppSync resolver event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSyncInfo {
    /// GraphQL field being resolved; doubles as the operation selector.
    pub field_name: String,
}

/// AppSync resolver event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppSyncEvent {
    /// Resolver metadata.
    pub info: AppSyncInfo,
    /// Field arguments.
    #[serde(default)]
    pub arguments: Arguments,
}

impl From<AppSyncEvent> for InvocationEvent {
    fn from(event: AppSyncEvent) -> Self {
        Self {
            operation: event.info.field_name,
            arguments: event.arguments,
        }
    }
}

/// Any accepted inbound event shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InboundEvent {
    /// `{"operation": ..., "arguments": ...}`
    Invocation(InvocationEvent),
    /// `{"info": {"fieldName": ...}, "arguments": ...}`
    AppSync(AppSyncEvent),
}

impl From<InboundEvent> for InvocationEvent {
    fn from(event: InboundEvent) -> Self {
        match event {
            InboundEvent::Invocation(e) => e,
            InboundEvent::AppSync(e) => e.into(),
        }
    }
}
