mod builder;
#[cfg(test)]
mod tests;

use codemate_model::{ErrorKind, ModelRequest};

use crate::conversation::{Outcome, Transcript, Turn};
use crate::model_client::ModelClient;
use crate::prompt::PromptAssembler;
pub use builder::ControllerBuilder;

/// Drives one conversation: owns the transcript and turns user actions into
/// at most one model request each.
///
/// Operations take `&mut self`, so a controller can never run two requests
/// at the same time. Hosts that can trigger actions concurrently should put
/// it behind a lock that rejects new actions while one is in flight.
///
/// Failures from the model never escape, they are recorded on the turn as
/// [`Outcome::Failed`].
pub struct Controller {
    model_client: ModelClient,
    assembler: PromptAssembler,
    transcript: Transcript,
}

impl Controller {
    /// Returns the conversation so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the prompt assembler in use.
    #[inline]
    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    /// Sends a new message and waits for the outcome.
    ///
    /// Returns `None` without contacting the model if `text` is blank.
    /// Otherwise the text is kept exactly as given, including leading
    /// indentation and trailing newlines.
    ///
    /// # Cancel safety
    ///
    /// If the future is dropped while the request is in flight, the turn
    /// stays incomplete until the next operation, which marks it failed.
    pub async fn submit(&mut self, text: &str) -> Option<&Turn> {
        if text.trim().is_empty() {
            trace!("ignored a blank message");
            return None;
        }
        self.run_turn(text.to_owned()).await
    }

    /// Sends the last message again, replacing its turn.
    ///
    /// Does nothing and returns `None` if there is no message to retry.
    pub async fn retry(&mut self) -> Option<&Turn> {
        let input = self.transcript.remove_last()?;
        debug!("retrying turn #{}", self.transcript.len() + 1);
        self.run_turn(input).await
    }

    /// Removes the last turn and hands its message back for editing.
    ///
    /// Does nothing and returns `None` if the conversation is empty.
    pub fn undo(&mut self) -> Option<String> {
        let input = self.transcript.remove_last()?;
        debug!("undid turn #{}", self.transcript.len() + 1);
        Some(input)
    }

    /// Forgets the whole conversation.
    #[inline]
    pub fn clear(&mut self) {
        self.transcript.clear();
        debug!("cleared the conversation");
    }

    async fn run_turn(&mut self, input: String) -> Option<&Turn> {
        self.settle_abandoned_turn();

        let prompt = self.assembler.assemble(self.transcript.turns(), &input);
        self.transcript.append(input);
        debug!(
            "sending turn #{} ({} bytes of prompt)",
            self.transcript.len(),
            prompt.len()
        );

        let request = ModelRequest::new(prompt);
        let result = self.model_client.send_request(request).await;
        if let Err(err) = &result {
            warn!("turn #{} failed: {err}", self.transcript.len());
        }
        self.transcript.complete_last(result.into())
    }

    /// Marks a turn left incomplete by a dropped request as failed.
    fn settle_abandoned_turn(&mut self) {
        if self.transcript.is_quiescent() {
            return;
        }
        warn!("the previous request was abandoned");
        self.transcript.complete_last(Outcome::Failed {
            kind: ErrorKind::Transport,
            message: "Request failed: the request was cancelled".to_owned(),
        });
    }
}
