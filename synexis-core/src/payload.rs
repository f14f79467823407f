//! JSON shapes exchanged with the remote chat endpoint.

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, Role};

/// Locally precomputed signals sent along with each message. The remote
/// responder may use or ignore any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHints {
    pub local_math: Option<String>,
    pub cached_match: Option<String>,
    pub followup_suggestion: Option<String>,
    pub last_user_message: Option<String>,
}

impl ClientHints {
    /// Best locally available reply, in order: math, cached answer, clarification.
    pub fn local_reply(&self) -> Option<&str> {
        self.local_math
            .as_deref()
            .or(self.cached_match.as_deref())
            .or(self.followup_suggestion.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(m: &ChatMessage) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub messages: Vec<WireMessage>,
    pub client_cache: ClientHints,
}

/// Body returned by the chat endpoint, for both success and failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub text: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
    /// Set by the endpoint when it answered with its own canned text.
    #[serde(default)]
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let req = ChatRequest {
            message: "5 + 7".to_string(),
            messages: vec![WireMessage {
                role: Role::User,
                content: "5 + 7".to_string(),
            }],
            client_cache: ClientHints {
                local_math: Some("12".to_string()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["message"], "5 + 7");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["client_cache"]["local_math"], "12");
        assert!(json["client_cache"]["cached_match"].is_null());
        assert!(json["client_cache"]["followup_suggestion"].is_null());
        assert!(json["client_cache"]["last_user_message"].is_null());
    }

    #[test]
    fn test_reply_parses_success_and_error_bodies() {
        let ok: ChatReply = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(ok.text.as_deref(), Some("hi"));
        assert!(!ok.fallback);

        let err: ChatReply =
            serde_json::from_str(r#"{"error":"Upstream API error: 503","details":"busy"}"#).unwrap();
        assert_eq!(err.text, None);
        assert_eq!(err.error.as_deref(), Some("Upstream API error: 503"));
        assert_eq!(err.details.as_deref(), Some("busy"));
    }

    #[test]
    fn test_local_reply_order() {
        let hints = ClientHints {
            local_math: None,
            cached_match: Some("cached".to_string()),
            followup_suggestion: Some("clarify".to_string()),
            last_user_message: Some("prev".to_string()),
        };
        assert_eq!(hints.local_reply(), Some("cached"));
        assert_eq!(ClientHints::default().local_reply(), None);
    }
}
