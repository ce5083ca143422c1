use codemate_model::ModelProvider;

use super::Controller;
use crate::conversation::Transcript;
use crate::model_client::ModelClient;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, HistoryWindow, PromptAssembler};

/// [`Controller`] builder.
pub struct ControllerBuilder {
    model_client: ModelClient,
    system_prompt: String,
    history_window: HistoryWindow,
}

impl ControllerBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            history_window: HistoryWindow::Unbounded,
        }
    }

    /// Replaces the default coding-assistant instruction.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Bounds how much history each prompt replays.
    #[inline]
    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.history_window = window;
        self
    }

    /// Builds the controller with an empty conversation.
    #[inline]
    pub fn build(self) -> Controller {
        let ControllerBuilder {
            model_client,
            system_prompt,
            history_window,
        } = self;

        Controller {
            model_client,
            assembler: PromptAssembler::new(system_prompt)
                .with_window(history_window),
            transcript: Transcript::new(),
        }
    }
}
