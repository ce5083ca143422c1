/// A request to be sent to the model provider.
///
/// The conversation history is already flattened into `prompt`, the
/// provider sends it verbatim. Sampling parameters and the model identifier
/// belong to the provider's own configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The fully assembled prompt.
    pub prompt: String,
}

impl ModelRequest {
    /// Creates a request with the given prompt.
    #[inline]
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}
