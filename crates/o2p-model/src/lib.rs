//! Model types for the O2P record store.
//!
//! A record is a string `id` plus an open, schema-less set of attributes. The
//! JSON wire format is plain JSON (`{"id": "c1", "name": "Henrietta"}`), which
//! is what the upstream router hands to the dispatcher.
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod change_set;
pub mod error;
pub mod event;
pub mod operations;
pub mod output;
pub mod record;

pub use attribute_value::AttributeValue;
pub use change_set::{Change, ChangeSet};
pub use error::{DispatchError, ModelError};
pub use event::{AppSyncEvent, Arguments, InboundEvent, InvocationEvent};
pub use operations::RecordOperation;
pub use output::OperationOutput;
pub use record::{Attributes, Item, KEY_ATTRIBUTE, Record};
