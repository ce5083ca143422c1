use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A complete reply from the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelReply {
    /// The generated text.
    pub text: String,
    /// Generation statistics, if the backend reported any.
    pub stats: Option<GenerationStats>,
}

impl ModelReply {
    /// Creates a reply carrying only text.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            stats: None,
        }
    }

    /// Attaches generation statistics to the reply.
    #[inline]
    pub fn with_stats(mut self, stats: GenerationStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Statistics about how a reply was generated.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct GenerationStats {
    /// Number of tokens in the reply.
    pub eval_count: Option<u64>,
    /// Wall time the server spent on the whole request.
    pub total_duration: Option<Duration>,
}
