use std::time::Duration;

use codemate_model::{GenerationStats, ModelError, ModelReply, ModelRequest};
use mime::Mime;
use serde::{Deserialize, Serialize};

use crate::OllamaConfig;

/// Shown in place of a reply when the server omits the `response` field.
pub const NO_RESPONSE_PLACEHOLDER: &str =
    "No response available from the model.";

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GenerateResponse {
    pub response: Option<String>,
    pub eval_count: Option<u64>,
    /// Nanoseconds.
    pub total_duration: Option<u64>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OllamaConfig,
) -> GenerateRequest {
    GenerateRequest {
        model: config.model.clone(),
        prompt: req.prompt.clone(),
        stream: false,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        top_p: config.top_p,
    }
}

/// Maps a finished HTTP exchange to a reply or an error.
pub fn parse_reply(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<ModelReply, ModelError> {
    if status != 200 {
        return Err(ModelError::server(status, body));
    }

    if let Some(content_type) = content_type {
        let is_json = content_type
            .parse()
            .map(|m: Mime| {
                m.subtype() == mime::JSON
                    || m.suffix().is_some_and(|s| s == mime::JSON)
            })
            .unwrap_or(false);
        if !is_json {
            return Err(ModelError::transport(format!(
                "unexpected content type: {content_type}"
            )));
        }
    }

    let resp: GenerateResponse = serde_json::from_str(body).map_err(|err| {
        ModelError::transport(format!("invalid response body: {err}"))
    })?;

    let text = resp
        .response
        .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string());
    let reply = ModelReply::with_text(text);
    if resp.eval_count.is_none() && resp.total_duration.is_none() {
        return Ok(reply);
    }
    Ok(reply.with_stats(GenerationStats {
        eval_count: resp.eval_count,
        total_duration: resp.total_duration.map(Duration::from_nanos),
    }))
}
