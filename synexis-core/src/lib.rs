//! synexis-core: the local heuristic responder behind the Synexis chat assistant.
//!
//! Everything here is deterministic and synchronous. A [`ChatSession`] runs the
//! leaf heuristics on each new message and packages their results as
//! [`ClientHints`] for the remote responder:
//! - [`math_intent`]: arithmetic and "add 3"-style follow-ups
//! - [`history_match`]: reuse of an earlier answer to a similar question
//! - [`followup`]: clarification for vague "it/that" questions

pub mod arithmetic;
pub mod followup;
pub mod history_match;
pub mod math_intent;
pub mod message;
pub mod payload;
pub mod session;
pub mod text;

pub use arithmetic::{compute_binary, evaluate, EvalError, Operator};
pub use history_match::{find_cached_answer, MatchConfig, DEFAULT_MATCH_THRESHOLD};
pub use math_intent::{resolve, resolve_with_rule, LastResult, MathAnswer, MathRule, DIVIDE_BY_ZERO_REPLY};
pub use message::{ChatMessage, ConversationHistory, Role};
pub use payload::{ChatReply, ChatRequest, ClientHints, WireMessage};
pub use session::{ChatSession, DEFAULT_GREETING};
pub use text::format_number;
