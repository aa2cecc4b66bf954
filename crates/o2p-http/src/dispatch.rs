//! Handler trait between the HTTP service and the dispatcher.

use std::future::Future;
use std::pin::Pin;

use o2p_model::{DispatchError, InvocationEvent, OperationOutput};

/// Business logic behind the HTTP service.
///
/// The service decodes the request into an [`InvocationEvent`] and encodes
/// whatever the handler answers; the handler never sees HTTP.
pub trait InvocationHandler: Send + Sync + 'static {
    /// Handle one invocation event.
    fn handle_event(
        &self,
        event: InvocationEvent,
    ) -> Pin<Box<dyn Future<Output = Result<OperationOutput, DispatchError>> + Send + '_>>;
}
