use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use codemate_model::{ModelError, ModelProvider, ModelReply, ModelRequest};
use tracing::Instrument;

type SendRequestResult = Result<ModelReply, ModelError>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync
>;

/// A wrapper around a model provider that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let started = Instant::now();
                    let result = fut.await;
                    match &result {
                        Ok(reply) => trace!(
                            "got {} bytes of reply in {:?}",
                            reply.text.len(),
                            started.elapsed()
                        ),
                        Err(err) => error!("got an error: {err:?}"),
                    }
                    result
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and waits for the complete reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe, dropping the future abandons the
    /// request.
    #[inline]
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}
