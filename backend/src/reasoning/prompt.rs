//! Prompt templates

/// Ask an agent for a one-line reaction to an emergency meeting notice
///
/// # Example
/// ```
/// use virtual_office_core::reasoning::prompt::reaction_prompt;
///
/// let prompt = reaction_prompt("Robo", "fire drill");
/// assert!(prompt.contains("\"Robo\""));
/// assert!(prompt.contains("\"fire drill\""));
/// ```
pub fn reaction_prompt(agent_name: &str, notice_content: &str) -> String {
    format!(
        "You are \"{agent_name}\", a cute office robot. An emergency meeting notice \
         saying \"{notice_content}\" was just pinned to the bulletin board. React in a \
         single short line (at most 15 characters): surprised, fired up, or worried. \
         End with a robot sound like \"beep\" or \"bzzt\"."
    )
}

/// Ask the office robot to answer a chat message
pub fn chat_prompt(message: &str) -> String {
    format!(
        "You are a small, kind and slightly clumsy office robot. Keep answers short and \
         cheerful, and sprinkle in robot sounds like \"beep!\". The user says: \"{message}\""
    )
}

/// Ask an agent to decide its next state in reply to a chat message
///
/// The reply must be a JSON object shaped like `NextState`.
pub fn next_state_prompt(agent_name: &str, tags: &[String], message: &str) -> String {
    let tags = if tags.is_empty() {
        "none".to_string()
    } else {
        tags.join(", ")
    };
    format!(
        "Agent: {agent_name}\n\
         Current state tags: {tags}\n\
         User input: \"{message}\"\n\n\
         Answer with JSON only, in this shape:\n\
         {{\"reasoning\": \"why you think so\", \"thoughtTag\": \"inferred thought tag id\", \
         \"actionTag\": \"chosen action tag id\", \"message\": \"your reply to the user\"}}"
    )
}

/// Normalise a model reply for display: drop double quotes, trim whitespace
///
/// Returns `None` when nothing is left.
pub fn clean_reply(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| *c != '"').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_reply_strips_quotes() {
        assert_eq!(clean_reply("  \"On it, beep!\" \n"), Some("On it, beep!".to_string()));
    }

    #[test]
    fn test_next_state_prompt_lists_tags() {
        let prompt = next_state_prompt("Bolt", &["happy".to_string(), "wave".to_string()], "hi");
        assert!(prompt.contains("Agent: Bolt"));
        assert!(prompt.contains("Current state tags: happy, wave"));
        assert!(prompt.contains("\"thoughtTag\""));
        assert!(next_state_prompt("Bolt", &[], "hi").contains("Current state tags: none"));
    }

    #[test]
    fn test_clean_reply_empty() {
        assert_eq!(clean_reply(" \"\" "), None);
        assert_eq!(clean_reply(""), None);
    }
}
