//! Error types produced by the lexer/parser (syntax errors) and the
//! interpreter/function registry (evaluation errors).

use std::fmt::{self, Display, Formatter};

use crate::span::Position;

/// A lexer or parser failure, always anchored to a source position.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn unexpected_eof(expected: &str, position: Position) -> Self {
        Self::new(format!("unexpected end of input, expected {expected}"), position)
    }

    pub fn unexpected_token(found: impl Display, expected: &str, position: Position) -> Self {
        Self::new(
            format!("unexpected token '{found}', expected {expected}"),
            position,
        )
    }

    pub fn unterminated_string(position: Position) -> Self {
        Self::new("unterminated string literal", position)
    }

    pub fn unknown_character(ch: char, position: Position) -> Self {
        Self::new(format!("unknown character '{ch}'"), position)
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for SyntaxError {}

/// A failure raised while walking the AST or while the function registry
/// services a call. Unlike [`SyntaxError`], no source position is carried —
/// the interpreter has no obligation to track one.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
pub enum EvalError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("no such field '{field}' on {on}")]
    NoSuchField { field: String, on: &'static str },

    #[error("index {index} out of bounds for a sequence of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    #[error("bad argument to '{function}': {message}")]
    BadArgument { function: String, message: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("unknown method '{name}' on {receiver}")]
    UnknownMethod { name: String, receiver: &'static str },
}

impl EvalError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn bad_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadArgument {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// The union of everything that can go wrong end-to-end through the
/// `compile` + `evaluate` facade (syntax errors precede
/// evaluation and are never interleaved with it, so this is a plain enum
/// rather than anything richer).
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
pub enum CelError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_error_serializes_for_structured_reporting() {
        let err = EvalError::UndefinedVariable { name: "x".to_string() };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["UndefinedVariable"]["name"], "x");
    }

    #[test]
    fn syntax_error_serializes_with_its_position() {
        let err = SyntaxError::new("unexpected token", Position::new(2, 5));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["position"]["line"], 2);
        assert_eq!(json["position"]["column"], 5);
    }
}
