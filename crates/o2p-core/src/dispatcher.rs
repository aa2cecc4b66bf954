//! Operation dispatcher: routes one invocation event to the record store.

use tracing::{debug, warn};

use o2p_model::{DispatchError, InvocationEvent, OperationOutput, RecordOperation};

use crate::store::RecordStore;

/// Routes invocation events to [`RecordStore`] operations.
///
/// In the default compatibility mode an unknown selector or a missing
/// argument answers `null` without touching the store. With strict
/// operations enabled both become a [`DispatchError`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: RecordStore,
    strict: bool,
}

impl Dispatcher {
    /// Create a dispatcher in compatibility mode.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            strict: false,
        }
    }

    /// Enable or disable strict operation handling.
    #[must_use]
    pub fn with_strict_operations(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The store operations are routed to.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Dispatch one event.
    ///
    /// # Errors
    ///
    /// Only in strict mode: `UnknownOperation` for an unrecognized selector,
    /// `MissingArgument` when the operation's argument is absent.
    pub async fn dispatch(&self, event: InvocationEvent) -> Result<OperationOutput, DispatchError> {
        let Some(op) = RecordOperation::from_name(&event.operation) else {
            if self.strict {
                return Err(DispatchError::UnknownOperation(event.operation));
            }
            debug!(operation = %event.operation, "unrecognized operation, answering null");
            return Ok(OperationOutput::Null);
        };

        debug!(operation = %op, "dispatching record operation");
        let args = event.arguments;

        let output = match op {
            RecordOperation::GetById => match self.argument(op, "id", args.id)? {
                Some(id) => OperationOutput::Record(self.store.get_by_id(&id).await),
                None => OperationOutput::Null,
            },
            RecordOperation::Create => match self.argument(op, "record", args.record)? {
                Some(record) => OperationOutput::Record(self.store.create(record).await),
                None => OperationOutput::Null,
            },
            RecordOperation::GetAll => OperationOutput::Records(self.store.get_all().await),
            RecordOperation::Remove => match self.argument(op, "id", args.id)? {
                Some(id) => OperationOutput::Id(self.store.remove(&id).await),
                None => OperationOutput::Null,
            },
            RecordOperation::Update => match self.argument(op, "record", args.record)? {
                Some(record) => OperationOutput::Record(self.store.update_record(record).await),
                None => OperationOutput::Null,
            },
        };
        Ok(output)
    }

    fn argument<T>(
        &self,
        operation: RecordOperation,
        argument: &'static str,
        value: Option<T>,
    ) -> Result<Option<T>, DispatchError> {
        match value {
            Some(value) => Ok(Some(value)),
            None if self.strict => Err(DispatchError::MissingArgument {
                operation,
                argument,
            }),
            None => {
                warn!(operation = %operation, argument, "missing argument, answering null");
                Ok(None)
            }
        }
    }
}
