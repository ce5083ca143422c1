use std::error::Error;
use std::fmt::{self, Display};
use std::sync::Arc;

use codemate_core::conversation::Turn;
use codemate_core::prompt::HistoryWindow;
use codemate_core::{Controller, ControllerBuilder};
use codemate_model::ModelProvider;
use tokio::sync::Mutex;

/// Errors returned by [`Session`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionError {
    /// Another operation is still waiting for the model.
    Busy,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Busy => "a request is already in flight".fmt(f),
        }
    }
}

impl Error for SessionError {}

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    controller_builder: ControllerBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let controller_builder =
            ControllerBuilder::with_model_provider(provider);
        Self { controller_builder }
    }

    /// Sets the system prompt for the conversation.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.controller_builder =
            self.controller_builder.with_system_prompt(prompt);
        self
    }

    /// Bounds how much history is replayed to the model.
    #[inline]
    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.controller_builder =
            self.controller_builder.with_history_window(window);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        Session {
            controller: Arc::new(Mutex::new(self.controller_builder.build())),
        }
    }
}

/// A chat session, like a window that displays messages and has a input box.
///
/// The session can be cloned and shared with whatever drives the UI. Only
/// one operation runs at a time: while a request is in flight, every other
/// operation fails fast with [`SessionError::Busy`] instead of queueing, the
/// same way a UI disables its input box.
#[derive(Clone)]
pub struct Session {
    controller: Arc<Mutex<Controller>>,
}

impl Session {
    /// Sends a message and waits for the completed turn.
    ///
    /// Returns `Ok(None)` if the message is blank.
    pub async fn submit(
        &self,
        text: &str,
    ) -> Result<Option<Turn>, SessionError> {
        let mut controller = self.lock()?;
        Ok(controller.submit(text).await.cloned())
    }

    /// Sends the last message again.
    ///
    /// Returns `Ok(None)` if there is nothing to retry.
    pub async fn retry(&self) -> Result<Option<Turn>, SessionError> {
        let mut controller = self.lock()?;
        Ok(controller.retry().await.cloned())
    }

    /// Removes the last turn and returns its message for editing.
    pub fn undo(&self) -> Result<Option<String>, SessionError> {
        Ok(self.lock()?.undo())
    }

    /// Forgets the whole conversation.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.lock()?.clear();
        Ok(())
    }

    /// Returns a snapshot of all turns.
    pub fn turns(&self) -> Result<Vec<Turn>, SessionError> {
        Ok(self.lock()?.transcript().turns().to_vec())
    }

    /// Returns `true` while a request is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.controller.try_lock().is_err()
    }

    fn lock(
        &self,
    ) -> Result<tokio::sync::MutexGuard<'_, Controller>, SessionError> {
        self.controller.try_lock().map_err(|_| {
            debug!("rejected an operation while busy");
            SessionError::Busy
        })
    }
}
