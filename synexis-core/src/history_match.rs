//! Answer reuse: find the earlier user question most similar to the new one
//! and hand back the model answer that followed it.
//!
//! Similarity is symmetric token containment:
//! min(|A ∩ B| / |A|, |A ∩ B| / |B|) over unique word sets.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::message::{ConversationHistory, Role};
use crate::text::{contains_any_word, contains_phrase, is_numeric_only, normalize_for_match};

/// Minimum pair score for a cached answer to be offered.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.45;

const LAST_ANSWER_PHRASES: &[&str] = &[
    "last answer",
    "previous answer",
    "previous response",
    "last response",
    "what did you say",
    "what did you tell",
];

const MATH_KEYWORDS: &[&str] = &[
    "add", "plus", "subtract", "subract", "substract", "minus", "multiply", "times", "divide",
    "sum", "total", "result", "answer", "calculate",
];

const MATH_SYMBOLS: &[char] = &['+', '-', '*', '/', 'x'];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub match_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// Fraction of `query`'s unique tokens that also appear in `target`.
/// Both inputs are expected to be normalized.
pub fn overlap_score(query: &str, target: &str) -> f64 {
    if query.is_empty() || target.is_empty() {
        return 0.0;
    }
    let query_tokens: HashSet<&str> = query.split(' ').collect();
    let target_tokens: HashSet<&str> = target.split(' ').collect();
    let overlap = query_tokens.intersection(&target_tokens).count();
    overlap as f64 / query_tokens.len() as f64
}

pub fn pair_score(a: &str, b: &str) -> f64 {
    overlap_score(a, b).min(overlap_score(b, a))
}

/// Whether normalized text reads like an arithmetic request.
pub fn looks_like_math(normalized: &str) -> bool {
    contains_any_word(normalized, MATH_KEYWORDS) || normalized.contains(MATH_SYMBOLS)
}

/// Look up a previously given answer for `utterance`.
pub fn find_cached_answer(
    utterance: &str,
    history: &ConversationHistory,
    config: &MatchConfig,
) -> Option<String> {
    let normalized = normalize_for_match(utterance);
    if normalized.is_empty() {
        return None;
    }

    if LAST_ANSWER_PHRASES.iter().any(|p| contains_phrase(&normalized, p)) {
        if let Some(previous) = history.last_with_role(Role::Model) {
            return Some(previous.content.clone());
        }
    }

    let mut best_score = 0.0;
    let mut best_answer: Option<&str> = None;
    for pair in history.messages().windows(2) {
        let (question, answer) = (&pair[0], &pair[1]);
        if question.role != Role::User || answer.role != Role::Model {
            continue;
        }
        let candidate = normalize_for_match(&question.content);
        if candidate.is_empty() {
            continue;
        }
        let score = pair_score(&normalized, &candidate);
        if score > best_score {
            best_score = score;
            best_answer = Some(answer.content.as_str());
        }
    }

    if best_score < config.match_threshold {
        return None;
    }
    let answer = best_answer?;
    if is_numeric_only(answer) && !looks_like_math(&normalized) {
        debug!("dropping numeric cached answer {:?} for non-math question", answer.trim());
        return None;
    }
    debug!("cached answer hit (score {:.3})", best_score);
    Some(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatMessage;

    fn words(prefix: &str, range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("{prefix}{i}")).collect()
    }

    fn qa(question: &str, answer: &str) -> ConversationHistory {
        vec![ChatMessage::user(question), ChatMessage::model(answer)].into()
    }

    #[test]
    fn test_repeated_question_returns_previous_answer() {
        let history = qa("What is a random forest?", "An ensemble of decision trees.");
        let hit = find_cached_answer("what is a RANDOM forest", &history, &MatchConfig::default());
        assert_eq!(hit.as_deref(), Some("An ensemble of decision trees."));
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // 9 shared tokens out of 20 on both sides.
        let utterance = words("w", 0..20).join(" ");
        let mut candidate = words("w", 0..9);
        candidate.extend(words("z", 9..20));
        let candidate = candidate.join(" ");
        assert_eq!(pair_score(&utterance, &candidate), 0.45);

        let history = qa(&candidate, "a prose answer");
        let hit = find_cached_answer(&utterance, &history, &MatchConfig::default());
        assert_eq!(hit.as_deref(), Some("a prose answer"));
    }

    #[test]
    fn test_just_below_threshold_is_rejected() {
        // 11 shared tokens out of 25 on both sides.
        let utterance = words("w", 0..25).join(" ");
        let mut candidate = words("w", 0..11);
        candidate.extend(words("z", 11..25));
        let candidate = candidate.join(" ");
        assert_eq!(pair_score(&utterance, &candidate), 0.44);

        let history = qa(&candidate, "a prose answer");
        assert_eq!(find_cached_answer(&utterance, &history, &MatchConfig::default()), None);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let history = qa("how do I train a model", "Upload a dataset first.");
        let strict = MatchConfig { match_threshold: 0.9 };
        let loose = MatchConfig { match_threshold: 0.3 };
        assert_eq!(find_cached_answer("how do I evaluate a model", &history, &strict), None);
        assert_eq!(
            find_cached_answer("how do I evaluate a model", &history, &loose).as_deref(),
            Some("Upload a dataset first.")
        );
    }

    #[test]
    fn test_numeric_answer_dropped_for_non_math_question() {
        let history = qa("what is the capital of France?", "42");
        assert_eq!(
            find_cached_answer("what is the capital of France?", &history, &MatchConfig::default()),
            None
        );
    }

    #[test]
    fn test_numeric_answer_kept_for_math_question() {
        let history = qa("what is the total of my bill", "42");
        assert_eq!(
            find_cached_answer("what is the total of my bill", &history, &MatchConfig::default()).as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_last_answer_phrase_returns_latest_model_message() {
        let history: ConversationHistory = vec![
            ChatMessage::model("Hello! I'm Gojo."),
            ChatMessage::user("hi"),
            ChatMessage::model("How can I help?"),
        ]
        .into();
        let hit = find_cached_answer("What did you say?", &history, &MatchConfig::default());
        assert_eq!(hit.as_deref(), Some("How can I help?"));
    }

    #[test]
    fn test_last_answer_phrase_without_model_message_falls_through() {
        let history: ConversationHistory = vec![ChatMessage::user("previous answer please")].into();
        assert_eq!(
            find_cached_answer("previous answer please", &history, &MatchConfig::default()),
            None
        );
    }

    #[test]
    fn test_first_best_pair_wins_ties() {
        let history: ConversationHistory = vec![
            ChatMessage::user("explain overfitting"),
            ChatMessage::model("first"),
            ChatMessage::user("explain overfitting"),
            ChatMessage::model("second"),
        ]
        .into();
        let hit = find_cached_answer("explain overfitting", &history, &MatchConfig::default());
        assert_eq!(hit.as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_or_unrelated_input() {
        let history = qa("what is a random forest", "An ensemble.");
        assert_eq!(find_cached_answer("?!", &history, &MatchConfig::default()), None);
        assert_eq!(find_cached_answer("show my datasets", &history, &MatchConfig::default()), None);
    }

    #[test]
    fn test_looks_like_math() {
        assert!(looks_like_math("what is the sum"));
        assert!(looks_like_math("6 x 7"));
        assert!(!looks_like_math("what is the capital of france"));
    }
}
