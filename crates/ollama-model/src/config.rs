/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default address of a locally running server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TOP_P: f32 = 0.9;

/// Builder for [`OllamaConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OllamaConfigBuilder {
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    top_p: Option<f32>,
}

impl OllamaConfigBuilder {
    /// Creates a builder with every option left at its default.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL, e.g. `http://127.0.0.1:11434`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the sampling temperature.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum number of tokens in a reply.
    #[inline]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the nucleus sampling threshold.
    #[inline]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> OllamaConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        OllamaConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            top_p: self.top_p.unwrap_or(DEFAULT_TOP_P),
        }
    }
}

/// Configuration for the Ollama provider.
#[derive(Clone, Debug, PartialEq)]
pub struct OllamaConfig {
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
    pub(crate) top_p: f32,
}

impl OllamaConfig {
    /// Returns the model identifier.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the base URL, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL of the generate endpoint.
    #[inline]
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl Default for OllamaConfig {
    #[inline]
    fn default() -> Self {
        OllamaConfigBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.model(), "llama3.2");
        assert_eq!(config.generate_url(), "http://localhost:11434/api/generate");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.top_p, 0.9);
    }

    #[test]
    fn test_trailing_slash() {
        let config = OllamaConfigBuilder::new()
            .with_base_url("http://10.0.0.2:11434/")
            .with_model("llama3.1")
            .build();
        assert_eq!(config.generate_url(), "http://10.0.0.2:11434/api/generate");
        assert_eq!(config.model(), "llama3.1");
    }
}
