//! Offline reasoning client with scripted behaviour
//!
//! Replies are chosen by matching substrings of the prompt, which contains the
//! agent's name for meeting reactions. Handy for the CLI and for tests that
//! need a mix of successes, failures, slow calls and calls that never return.

use super::{ReasoningClient, ReasoningError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ScriptedClient {
    default_reply: String,
    replies: Vec<(String, String)>,
    failing: Vec<String>,
    hanging: Vec<String>,
    flaky: Mutex<HashMap<String, u32>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            default_reply: default_reply.into(),
            ..Self::default()
        }
    }

    /// Reply with `text` to prompts containing `key`
    pub fn with_reply(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.replies.push((key.into(), text.into()));
        self
    }

    /// Fail every prompt containing `key`
    pub fn failing_for(mut self, key: impl Into<String>) -> Self {
        self.failing.push(key.into());
        self
    }

    /// Fail the first `failures` prompts containing `key`, then behave normally
    pub fn flaky_for(mut self, key: impl Into<String>, failures: u32) -> Self {
        if let Ok(flaky) = self.flaky.get_mut() {
            flaky.insert(key.into(), failures);
        }
        self
    }

    /// Never answer prompts containing `key`
    pub fn hanging_for(mut self, key: impl Into<String>) -> Self {
        self.hanging.push(key.into());
        self
    }

    /// Delay every answer
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of `complete` calls so far (every attempt counts)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn take_flaky_failure(&self, prompt: &str) -> bool {
        let Ok(mut flaky) = self.flaky.lock() else {
            return false;
        };
        for (key, remaining) in flaky.iter_mut() {
            if prompt.contains(key.as_str()) && *remaining > 0 {
                *remaining -= 1;
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl ReasoningClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hanging.iter().any(|key| prompt.contains(key.as_str())) {
            return futures::future::pending().await;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.iter().any(|key| prompt.contains(key.as_str())) {
            return Err(ReasoningError::Failed("scripted failure".to_string()));
        }
        if self.take_flaky_failure(prompt) {
            return Err(ReasoningError::Failed("scripted transient failure".to_string()));
        }

        let reply = self
            .replies
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, text)| text.clone())
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(reply)
    }
}
