//! Scripted model client for tests.

use super::ModelClient;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replies are handed out in order, one per `generate` call. Running out of
/// replies yields a 500 so over-calling shows up as a failure.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((model.to_string(), prompt.to_string()));
        self.replies
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::Upstream {
                    status: 500,
                    message: "no scripted reply left".to_string(),
                })
            })
    }
}
