//! Vague follow-ups ("how to do it", "what about that") turned into a
//! clarification that quotes the user's previous message.

use crate::message::ConversationHistory;
use crate::text::{contains_any_word, contains_phrase, normalize_for_match};

const PRONOUNS: &[&str] = &["it", "that", "this", "they", "them"];

pub fn detect(utterance: &str, history: &ConversationHistory) -> Option<String> {
    let normalized = normalize_for_match(utterance);
    if normalized.is_empty() || !contains_any_word(&normalized, PRONOUNS) {
        return None;
    }

    let last_user = history.last_user_message()?;

    if contains_phrase(&normalized, "how to") {
        return Some(format!(
            "Do you want steps for {last_user}? If so, say: \"how to make {last_user}\"."
        ));
    }
    Some(format!("Do you mean: {last_user}? Please clarify."))
}
