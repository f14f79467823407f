//! One chat session: the conversation, its last numeric result, and the turn
//! protocol that ties the local heuristics to the remote responder.
//!
//! A turn is `begin_turn` (hints are computed against the history as it was
//! before the new message, then the message is appended) followed by either
//! `record_reply` or `record_failure`.

use log::{debug, info};

use crate::followup;
use crate::history_match::{find_cached_answer, MatchConfig};
use crate::math_intent::{self, LastResult};
use crate::message::{ChatMessage, ConversationHistory, Role};
use crate::payload::{ChatRequest, ClientHints, WireMessage};
use crate::text::parse_number;

pub const DEFAULT_GREETING: &str = "Hello! I'm Gojo. Ask me anything about your Synexis ML projects.";

#[derive(Debug, Clone)]
pub struct ChatSession {
    history: ConversationHistory,
    last_result: LastResult,
    matcher: MatchConfig,
    greeting: String,
}

impl ChatSession {
    /// Fresh session opened with the greeting.
    pub fn new(greeting: impl Into<String>, matcher: MatchConfig) -> Self {
        Self::resume(ConversationHistory::new(), greeting, matcher)
    }

    /// Continue a stored conversation. An empty one starts over with the greeting.
    pub fn resume(history: ConversationHistory, greeting: impl Into<String>, matcher: MatchConfig) -> Self {
        let mut session = Self {
            history,
            last_result: LastResult::new(),
            matcher,
            greeting: greeting.into(),
        };
        if session.history.is_empty() {
            session.push_greeting();
        }
        session
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn last_result(&self) -> Option<f64> {
        self.last_result.get()
    }

    /// Run every local heuristic against `utterance` without appending it.
    pub fn hints(&mut self, utterance: &str) -> ClientHints {
        let local_math = math_intent::resolve(utterance, &self.history, &mut self.last_result);
        let cached_match = find_cached_answer(utterance, &self.history, &self.matcher);
        let followup_suggestion = followup::detect(utterance, &self.history);
        let last_user_message = self.history.last_user_message().map(str::to_string);

        debug!(
            "hints: math={} cached={} followup={}",
            local_math.is_some(),
            cached_match.is_some(),
            followup_suggestion.is_some()
        );

        ClientHints {
            local_math,
            cached_match,
            followup_suggestion,
            last_user_message,
        }
    }

    /// Start a turn. Blank input is ignored.
    pub fn begin_turn(&mut self, utterance: &str) -> Option<ChatRequest> {
        let message = utterance.trim();
        if message.is_empty() {
            return None;
        }
        let client_cache = self.hints(message);
        self.history.push(ChatMessage::user(message));

        Some(ChatRequest {
            message: message.to_string(),
            messages: self.history.messages().iter().map(WireMessage::from).collect(),
            client_cache,
        })
    }

    /// Append the reply. A purely numeric reply becomes the new last result so
    /// "add 3" keeps working after the remote side did the arithmetic.
    pub fn record_reply(&mut self, text: &str) {
        if let Some(value) = parse_number(text) {
            self.last_result.set(value);
        }
        self.history.push(ChatMessage::model(text));
    }

    /// Append an apology for a failed turn and return its text.
    pub fn record_failure(&mut self, reason: &str) -> String {
        let text = format!("Sorry, I encountered an error: {reason}. Please try again.");
        self.history.push(ChatMessage::new(Role::Model, text.clone()));
        text
    }

    pub fn clear(&mut self) {
        info!("clearing chat ({} messages)", self.history.len());
        self.history.clear();
        self.last_result.clear();
        self.push_greeting();
    }

    fn push_greeting(&mut self) {
        self.history.push(ChatMessage::model(self.greeting.clone()));
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING, MatchConfig::default())
    }
}
