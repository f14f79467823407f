//! Math follow-ups: "5 + 7", "what is the result?", "add 3", "divide by 2".
//!
//! Resolution walks an ordered rule table and the first rule whose pattern
//! applies decides the outcome. A rule that recognizes the phrasing but has
//! nothing to work with (no base value) ends resolution without an answer.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::arithmetic::{compute_binary, evaluate, EvalError, Operator};
use crate::message::ConversationHistory;
use crate::text::format_number;

/// Reply for any rule that divides by zero.
pub const DIVIDE_BY_ZERO_REPLY: &str = "Cannot divide by 0.";

/// Verb keywords for relative operations, with the operator each maps to.
/// "subract" and "substract" are common misspellings users type.
pub const OPERATION_WORDS: &[(&str, Operator)] = &[
    ("add", Operator::Add),
    ("plus", Operator::Add),
    ("subtract", Operator::Sub),
    ("subract", Operator::Sub),
    ("substract", Operator::Sub),
    ("minus", Operator::Sub),
    ("multiply", Operator::Mul),
    ("times", Operator::Mul),
    ("divide", Operator::Div),
];

static RESULT_QUERY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(what\s+is\s+the\s+result|result\?|what\s+is\s+it|what\s+is\s+the\s+answer)\b")
        .expect("valid result query pattern")
});

static DIRECT_BINARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?[0-9]+(?:\.[0-9]+)?)\s*([+\-*/x])\s*(-?[0-9]+(?:\.[0-9]+)?)")
        .expect("valid binary pattern")
});

static RELATIVE_OPERATION_RE: Lazy<Regex> = Lazy::new(|| {
    let words = OPERATION_WORDS
        .iter()
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({words})\b\s*(?:by\s*)?(-?[0-9]+(?:\.[0-9]+)?)"))
        .expect("valid relative operation pattern")
});

/// The most recently established numeric value of a chat session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LastResult(Option<f64>);

impl LastResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<f64> {
        self.0
    }

    pub fn set(&mut self, value: f64) {
        self.0 = Some(value);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathRule {
    ResultQuery,
    FullExpression,
    DirectBinary,
    RelativeOperation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MathAnswer {
    pub rule: MathRule,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Verdict {
    /// Pattern does not apply; try the next rule.
    Pass,
    Answer(String),
    /// Pattern applies but no answer can be produced.
    Unresolved,
}

type RuleHandler = fn(&str, &ConversationHistory, &mut LastResult) -> Verdict;

const RULES: [(MathRule, RuleHandler); 4] = [
    (MathRule::ResultQuery, result_query),
    (MathRule::FullExpression, full_expression),
    (MathRule::DirectBinary, direct_binary),
    (MathRule::RelativeOperation, relative_operation),
];

/// Resolve a math intent, reporting which rule produced the answer.
pub fn resolve_with_rule(
    utterance: &str,
    history: &ConversationHistory,
    last: &mut LastResult,
) -> Option<MathAnswer> {
    let text = utterance.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    for (rule, handler) in RULES {
        match handler(&text, history, last) {
            Verdict::Pass => continue,
            Verdict::Answer(answer) => {
                debug!("math rule {:?} answered {:?}", rule, answer);
                return Some(MathAnswer { rule, text: answer });
            }
            Verdict::Unresolved => {
                debug!("math rule {:?} matched without a value", rule);
                return None;
            }
        }
    }
    None
}

/// Resolve a math intent from `utterance`, updating `last` when a new value
/// is computed.
pub fn resolve(utterance: &str, history: &ConversationHistory, last: &mut LastResult) -> Option<String> {
    resolve_with_rule(utterance, history, last).map(|a| a.text)
}

fn base_value(history: &ConversationHistory, last: &LastResult) -> Option<f64> {
    last.get()
        .filter(|v| v.is_finite())
        .or_else(|| history.last_number())
}

fn operator_for_word(word: &str) -> Option<Operator> {
    OPERATION_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, op)| *op)
}

fn store_and_format(value: f64, last: &mut LastResult) -> Verdict {
    last.set(value);
    match format_number(value) {
        Some(text) => Verdict::Answer(text),
        None => Verdict::Unresolved,
    }
}

fn apply_operation(left: f64, op: Operator, right: f64, last: &mut LastResult) -> Verdict {
    match compute_binary(left, op, right) {
        Ok(value) => store_and_format(value, last),
        Err(EvalError::DivisionByZero) => Verdict::Answer(DIVIDE_BY_ZERO_REPLY.to_string()),
        Err(EvalError::NotAnExpression) => Verdict::Unresolved,
    }
}

fn result_query(text: &str, history: &ConversationHistory, last: &mut LastResult) -> Verdict {
    if !RESULT_QUERY_RE.is_match(text) {
        return Verdict::Pass;
    }
    match base_value(history, last).and_then(format_number) {
        Some(answer) => Verdict::Answer(answer),
        None => Verdict::Unresolved,
    }
}

fn full_expression(text: &str, _history: &ConversationHistory, last: &mut LastResult) -> Verdict {
    match evaluate(text) {
        Ok(value) => store_and_format(value, last),
        Err(_) => Verdict::Pass,
    }
}

fn direct_binary(text: &str, _history: &ConversationHistory, last: &mut LastResult) -> Verdict {
    let Some(caps) = DIRECT_BINARY_RE.captures(text) else {
        return Verdict::Pass;
    };
    let left = caps[1].parse::<f64>().ok();
    let op = caps[2].chars().next().and_then(Operator::from_symbol);
    let right = caps[3].parse::<f64>().ok();
    match (left, op, right) {
        (Some(left), Some(op), Some(right)) => apply_operation(left, op, right, last),
        _ => Verdict::Unresolved,
    }
}

fn relative_operation(text: &str, history: &ConversationHistory, last: &mut LastResult) -> Verdict {
    let Some(caps) = RELATIVE_OPERATION_RE.captures(text) else {
        return Verdict::Pass;
    };
    let (Some(op), Ok(operand)) = (operator_for_word(&caps[1]), caps[2].parse::<f64>()) else {
        return Verdict::Unresolved;
    };
    match base_value(history, last) {
        Some(base) => apply_operation(base, op, operand, last),
        None => Verdict::Unresolved,
    }
}
