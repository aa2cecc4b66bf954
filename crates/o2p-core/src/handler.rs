//! Bridge from the HTTP layer to the dispatcher.

use std::future::Future;
use std::pin::Pin;

use o2p_http::dispatch::InvocationHandler;
use o2p_model::{DispatchError, InvocationEvent, OperationOutput};

use crate::dispatcher::Dispatcher;

impl InvocationHandler for Dispatcher {
    fn handle_event(
        &self,
        event: InvocationEvent,
    ) -> Pin<Box<dyn Future<Output = Result<OperationOutput, DispatchError>> + Send + '_>> {
        Box::pin(self.dispatch(event))
    }
}
