//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use codemate_model::{ModelError, ModelProvider, ModelReply, ModelRequest};
use tokio::time::sleep;

pub use preset::*;

#[derive(Default)]
struct Inner {
    script: VecDeque<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request in order. Every request consumes
/// one step. If there are no enough steps in the script, a transport error
/// is returned.
///
/// All requests are recorded, so tests can check the exact prompts the
/// conversation produced. Clones share the same script and records.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    inner: Arc<Mutex<Inner>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Creates a provider with the given script.
    #[inline]
    pub fn with_script(
        script: impl IntoIterator<Item = PresetResponse>,
    ) -> Self {
        let provider = Self::default();
        provider.lock().script.extend(script);
        provider
    }

    /// Appends a step to the script.
    #[inline]
    pub fn add_response(&self, preset: PresetResponse) {
        self.lock().script.push_back(preset);
    }

    /// Makes every request wait for `duration` before answering.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the prompts of all requests received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|req| req.prompt.clone())
            .collect()
    }

    /// Returns the number of steps not consumed yet.
    #[inline]
    pub fn remaining_steps(&self) -> usize {
        self.lock().script.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModelProvider for TestModelProvider {
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, ModelError>> + Send + 'static
    {
        let step = {
            let mut inner = self.lock();
            inner.requests.push(req.clone());
            inner.script.pop_front()
        };
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match step {
                Some(preset) => preset.to_result(),
                None => Err(ModelError::transport("no enough steps")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use codemate_model::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::with_script([
            PresetResponse::reply("Hello, world!"),
            PresetResponse::server_error(500, "internal error"),
        ]);

        let reply = provider
            .send_request(&ModelRequest::new("User: Hi\nAssistant:"))
            .await
            .unwrap();
        assert_eq!(reply.text, "Hello, world!");

        let err = provider
            .send_request(&ModelRequest::new("User: Again\nAssistant:"))
            .await
            .unwrap_err();
        assert_eq!(err, ModelError::server(500, "internal error"));

        let err = provider
            .send_request(&ModelRequest::new("User: More\nAssistant:"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        assert_eq!(
            provider.prompts(),
            vec![
                "User: Hi\nAssistant:",
                "User: Again\nAssistant:",
                "User: More\nAssistant:",
            ]
        );
        assert_eq!(provider.remaining_steps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let mut provider =
            TestModelProvider::with_script([PresetResponse::reply("late")]);
        provider.set_delay(Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let reply = provider
            .send_request(&ModelRequest::new("User: Hi\nAssistant:"))
            .await
            .unwrap();
        assert_eq!(reply.text, "late");
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
