//! Conversation-related types.

use codemate_model::{ErrorKind, ModelError, ModelReply};
use serde::{Deserialize, Serialize};

/// How a turn ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// The model replied.
    Reply {
        /// The reply text.
        text: String,
    },
    /// The request failed, no reply was produced.
    Failed {
        /// What went wrong.
        kind: ErrorKind,
        /// The message shown to the user in place of a reply.
        message: String,
    },
}

impl Outcome {
    /// Returns `true` if the model replied.
    #[inline]
    pub fn is_reply(&self) -> bool {
        matches!(self, Outcome::Reply { .. })
    }

    /// Returns the text to display in the assistant's position.
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            Outcome::Reply { text } => text,
            Outcome::Failed { message, .. } => message,
        }
    }
}

impl From<Result<ModelReply, ModelError>> for Outcome {
    fn from(result: Result<ModelReply, ModelError>) -> Self {
        match result {
            Ok(reply) => Outcome::Reply { text: reply.text },
            Err(err) => Outcome::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

/// One user message paired with the assistant's outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    user_text: String,
    outcome: Option<Outcome>,
}

impl Turn {
    /// Returns the user's message.
    #[inline]
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// Returns the outcome, or `None` while the request is in flight.
    #[inline]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Returns the text in the assistant's position, which is either the
    /// reply or the error message.
    #[inline]
    pub fn assistant_text(&self) -> Option<&str> {
        self.outcome.as_ref().map(Outcome::text)
    }

    /// Returns `true` if the turn has an outcome.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }
}

/// The visible conversation, together with the raw inputs that produced
/// it.
///
/// Both sequences always have the same length. Only the last turn may be
/// incomplete, and only while its request is in flight.
#[derive(Clone, Default, Debug)]
pub struct Transcript {
    turns: Vec<Turn>,
    pending_inputs: Vec<String>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all turns in conversational order.
    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the raw inputs in conversational order.
    #[inline]
    pub fn pending_inputs(&self) -> &[String] {
        &self.pending_inputs
    }

    /// Returns the number of turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if there are no turns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the last turn.
    #[inline]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Returns the most recent raw input.
    #[inline]
    pub fn last_input(&self) -> Option<&str> {
        self.pending_inputs.last().map(String::as_str)
    }

    /// Returns `true` if no turn is waiting for its outcome.
    #[inline]
    pub fn is_quiescent(&self) -> bool {
        self.turns.last().is_none_or(Turn::is_complete)
    }

    /// Appends an incomplete turn for `input`.
    pub(crate) fn append(&mut self, input: String) {
        debug_assert!(self.is_quiescent());
        self.turns.push(Turn {
            user_text: input.clone(),
            outcome: None,
        });
        self.pending_inputs.push(input);
    }

    /// Sets the outcome of the last turn, replacing any previous one.
    pub(crate) fn complete_last(&mut self, outcome: Outcome) -> Option<&Turn> {
        let turn = self.turns.last_mut()?;
        turn.outcome = Some(outcome);
        Some(turn)
    }

    /// Removes the last turn and returns its raw input.
    pub(crate) fn remove_last(&mut self) -> Option<String> {
        let input = self.pending_inputs.pop()?;
        self.turns.pop();
        Some(input)
    }

    /// Removes everything.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.turns.clear();
        self.pending_inputs.clear();
    }
}
