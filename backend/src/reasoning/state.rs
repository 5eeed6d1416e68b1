//! Structured "what next" reply for a chat turn
//!
//! The model answers a chat message with a JSON object carrying its
//! reasoning, one thought tag, one action tag and the line to say back.

use super::ReasoningError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextState {
    /// Why the agent thinks what it thinks; shown in the thought bubble
    pub reasoning: String,
    pub thought_tag: String,
    pub action_tag: String,
    /// Reply line for the chat
    pub message: String,
}

impl NextState {
    /// Reply-only state used when no usable answer came back
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            reasoning: String::new(),
            thought_tag: String::new(),
            action_tag: String::new(),
            message: message.into(),
        }
    }

    /// Non-empty tags, thought first
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        [self.thought_tag.as_str(), self.action_tag.as_str()]
            .into_iter()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

/// Parse a model reply, tolerating a Markdown code fence around the JSON
///
/// # Example
/// ```
/// use virtual_office_core::reasoning::state::parse_next_state;
///
/// let raw = r#"{"reasoning":"user waved","thoughtTag":"happy","actionTag":"wave","message":"Beep, hi!"}"#;
/// let state = parse_next_state(raw).unwrap();
/// assert_eq!(state.action_tag, "wave");
/// assert!(parse_next_state("not json").is_err());
/// ```
pub fn parse_next_state(raw: &str) -> Result<NextState, ReasoningError> {
    let body = raw.trim();
    let body = body
        .strip_prefix("```json")
        .or_else(|| body.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(body);

    serde_json::from_str(body.trim())
        .map_err(|e| ReasoningError::Malformed(format!("next state: {}", e)))
}
