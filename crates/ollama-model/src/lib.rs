//! A model provider for Ollama's `/api/generate` endpoint.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::sync::Arc;

use codemate_model::{ModelError, ModelProvider, ModelReply, ModelRequest};
use reqwest::{Client, header};

pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, OllamaConfig, OllamaConfigBuilder,
};
pub use proto::NO_RESPONSE_PLACEHOLDER;

/// Ollama model provider.
///
/// Every request is a single non-streaming POST. The provider never retries
/// and uses the transport's default timeouts.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: Client,
    config: Arc<OllamaConfig>,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider` with the given configuration.
    #[inline]
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

impl ModelProvider for OllamaProvider {
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, ModelError>> + Send + 'static
    {
        let ollama_req = proto::create_request(req, &self.config);
        let url = self.config.generate_url();
        trace!("sending request to {url}");
        let resp_fut = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&ollama_req)
            .send();

        async move {
            let resp = resp_fut.await.map_err(|err| {
                ModelError::transport(describe_error(&err))
            })?;

            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            let body = resp.text().await.map_err(|err| {
                ModelError::transport(describe_error(&err))
            })?;
            debug!("got status {status} with {} bytes", body.len());

            let reply =
                proto::parse_reply(status, content_type.as_deref(), &body);
            if let Some(stats) = reply.as_ref().ok().and_then(|r| r.stats) {
                debug!(
                    "generated {:?} tokens in {:?}",
                    stats.eval_count, stats.total_duration
                );
            }
            reply
        }
    }
}

/// Flattens an error and its sources into one line.
fn describe_error(err: &reqwest::Error) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_str = cause.to_string();
        if !description.contains(&cause_str) {
            description.push_str(": ");
            description.push_str(&cause_str);
        }
        source = cause.source();
    }
    description
}
