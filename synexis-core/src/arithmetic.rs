//! Arithmetic evaluation for short free-text expressions like `2+3*4` or `6 x 7`.
//!
//! Two precedence levels, left associative, evaluated with an operand stack
//! and an operator stack (shunting-yard).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EXPRESSION_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-*/x.]+$").expect("valid expression charset"));

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9]+(?:\.[0-9]+)?|[+\-*/x]").expect("valid token pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("not an arithmetic expression")]
    NotAnExpression,
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// `x` is accepted as multiplication.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' | 'x' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }
}

/// Apply one operator. A right operand of exactly zero fails division.
pub fn compute_binary(left: f64, op: Operator, right: f64) -> Result<f64, EvalError> {
    match op {
        Operator::Add => Ok(left + right),
        Operator::Sub => Ok(left - right),
        Operator::Mul => Ok(left * right),
        Operator::Div if right == 0.0 => Err(EvalError::DivisionByZero),
        Operator::Div => Ok(left / right),
    }
}

fn operator_token(token: &str) -> Option<Operator> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Operator::from_symbol(c),
        _ => None,
    }
}

fn apply_top(operands: &mut Vec<f64>, operators: &mut Vec<Operator>) -> Result<(), EvalError> {
    let op = operators.pop().ok_or(EvalError::NotAnExpression)?;
    let right = operands.pop().ok_or(EvalError::NotAnExpression)?;
    let left = operands.pop().ok_or(EvalError::NotAnExpression)?;
    operands.push(compute_binary(left, op, right)?);
    Ok(())
}

/// Evaluate `expression` after stripping all whitespace.
///
/// Numbers carry their own leading minus, so `5-3` tokenizes as `5`, `-3`
/// and does not reduce to a single value.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let sanitized: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if sanitized.is_empty() || !EXPRESSION_CHARS_RE.is_match(&sanitized) {
        return Err(EvalError::NotAnExpression);
    }

    let mut operands: Vec<f64> = Vec::new();
    let mut operators: Vec<Operator> = Vec::new();
    let mut token_count = 0usize;

    for token in TOKEN_RE.find_iter(&sanitized) {
        token_count += 1;
        let token = token.as_str();
        if let Some(op) = operator_token(token) {
            while let Some(&top) = operators.last() {
                if top.precedence() < op.precedence() {
                    break;
                }
                apply_top(&mut operands, &mut operators)?;
            }
            operators.push(op);
        } else {
            let value = token.parse::<f64>().map_err(|_| EvalError::NotAnExpression)?;
            operands.push(value);
        }
    }

    if token_count == 0 {
        return Err(EvalError::NotAnExpression);
    }

    while !operators.is_empty() {
        apply_top(&mut operands, &mut operators)?;
    }

    match operands.as_slice() {
        [value] => Ok(*value),
        _ => Err(EvalError::NotAnExpression),
    }
}
