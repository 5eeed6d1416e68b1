//! Retry with exponential backoff, and the never-failing reaction service

use super::prompt::{chat_prompt, clean_reply, next_state_prompt, reaction_prompt};
use super::state::{parse_next_state, NextState};
use super::{ReasoningClient, ReasoningError};
use crate::config::OfficeConfig;
use std::time::Duration;
use tracing::{debug, warn};

/// How hard to try before giving up on a request
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled after every further failure
    pub initial_backoff: Duration,
    /// Upper bound on one attempt (`None` = wait as long as the client takes)
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            attempt_timeout: Some(Duration::from_millis(10_000)),
        }
    }
}

impl RetryPolicy {
    /// Worst-case wall time of one request under this policy
    ///
    /// Only defined when attempts are bounded by a timeout.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use virtual_office_core::reasoning::RetryPolicy;
    ///
    /// let policy = RetryPolicy {
    ///     max_retries: 2,
    ///     initial_backoff: Duration::from_millis(100),
    ///     attempt_timeout: Some(Duration::from_millis(1000)),
    /// };
    /// // 3 attempts × 1000 ms + backoffs of 100 ms and 200 ms
    /// assert_eq!(policy.worst_case(), Some(Duration::from_millis(3300)));
    /// ```
    pub fn worst_case(&self) -> Option<Duration> {
        let timeout = self.attempt_timeout?;
        let attempts = self.max_retries + 1;
        let mut total = timeout * attempts;
        let mut delay = self.initial_backoff;
        for _ in 0..self.max_retries {
            total += delay;
            delay = delay.saturating_mul(2);
        }
        Some(total)
    }
}

/// Wraps a reasoning client with retries and fallbacks
///
/// `react_to`, `respond_to_chat` and `reason_next_state` never fail: terminal failures turn into
/// the configured fallback text.
pub struct ReactionService<C> {
    client: C,
    policy: RetryPolicy,
    reaction_fallback: String,
    empty_reaction: String,
    chat_fallback: String,
}

impl<C: ReasoningClient> ReactionService<C> {
    pub fn new(client: C, config: &OfficeConfig) -> Self {
        let reasoning = &config.reasoning;
        let attempt_timeout = if reasoning.attempt_timeout_ms == 0 {
            None
        } else {
            Some(reasoning.attempt_timeout())
        };
        Self {
            client,
            policy: RetryPolicy {
                max_retries: reasoning.max_retries,
                initial_backoff: reasoning.initial_backoff(),
                attempt_timeout,
            },
            reaction_fallback: config.meeting.fallback_reaction.clone(),
            empty_reaction: reasoning.empty_reaction.clone(),
            chat_fallback: reasoning.chat_fallback.clone(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn attempt(&self, prompt: &str) -> Result<String, ReasoningError> {
        match self.policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.client.complete(prompt)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ReasoningError::Timeout {
                    after_ms: limit.as_millis() as u64,
                }),
            },
            None => self.client.complete(prompt).await,
        }
    }

    /// Run `prompt` until it succeeds or the retry budget is spent
    pub async fn complete_with_retry(&self, prompt: &str) -> Result<String, ReasoningError> {
        let mut delay = self.policy.initial_backoff;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if attempts > self.policy.max_retries => {
                    return Err(ReasoningError::Exhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    debug!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %err, "Retrying reasoning request");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }

    /// One-line reaction of `agent_name` to a meeting notice
    pub async fn try_react_to(&self, agent_name: &str, context: &str) -> Result<String, ReasoningError> {
        let raw = self.complete_with_retry(&reaction_prompt(agent_name, context)).await?;
        Ok(clean_reply(&raw).unwrap_or_else(|| self.empty_reaction.clone()))
    }

    /// Like `try_react_to`, but resolves to the fallback text on failure
    pub async fn react_to(&self, agent_name: &str, context: &str) -> String {
        match self.try_react_to(agent_name, context).await {
            Ok(text) => text,
            Err(err) => {
                warn!(agent = agent_name, error = %err, "Reaction request failed, using fallback");
                self.reaction_fallback.clone()
            }
        }
    }

    /// Chat reply to a user message; never fails
    pub async fn respond_to_chat(&self, message: &str) -> String {
        match self.complete_with_retry(&chat_prompt(message)).await {
            Ok(raw) => clean_reply(&raw).unwrap_or_else(|| self.chat_fallback.clone()),
            Err(err) => {
                warn!(error = %err, "Chat request failed, using fallback");
                self.chat_fallback.clone()
            }
        }
    }

    /// Decide an agent's next state in reply to a chat message
    ///
    /// Transport failures are retried; a reply that is not a `NextState`
    /// fails with `ReasoningError::Malformed` without retrying.
    pub async fn try_reason_next_state(
        &self,
        agent_name: &str,
        tags: &[String],
        message: &str,
    ) -> Result<NextState, ReasoningError> {
        let raw = self
            .complete_with_retry(&next_state_prompt(agent_name, tags, message))
            .await?;
        let mut state = parse_next_state(&raw)?;
        state.message = clean_reply(&state.message).unwrap_or_else(|| self.chat_fallback.clone());
        Ok(state)
    }

    /// Like `try_reason_next_state`, but falls back to a tagless chat reply
    pub async fn reason_next_state(&self, agent_name: &str, tags: &[String], message: &str) -> NextState {
        match self.try_reason_next_state(agent_name, tags, message).await {
            Ok(state) => state,
            Err(err) => {
                warn!(agent = agent_name, error = %err, "Next-state request failed, using fallback");
                NextState::fallback(self.chat_fallback.clone())
            }
        }
    }
}
