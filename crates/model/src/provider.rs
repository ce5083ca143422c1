use crate::error::ModelError;
use crate::request::ModelRequest;
use crate::response::ModelReply;

/// A type that represents a model provider, which turns a flat prompt into
/// a complete reply with one request/response exchange.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
///
/// Implementations must not retry on their own: every call to
/// [`ModelProvider::send_request`] maps to at most one exchange with the
/// backend.
pub trait ModelProvider: Send + Sync {
    /// Sends a request to the model and waits for the complete reply.
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, ModelError>> + Send + 'static;
}
