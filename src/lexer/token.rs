use crate::span::Position;

/// The kind of a lexed token. `text` on the owning [`Token`] preserves the
/// raw lexeme so the parser can decode string/bytes literals itself (see
/// `crate::parser::strings`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `null`
    Null,
    /// `true`
    True,
    /// `false`
    False,
    /// A decimal or hex integer literal, no `u`/`U` suffix.
    Int,
    /// A decimal or hex integer literal with a `u`/`U` suffix.
    Uint,
    /// A floating point literal.
    Double,
    /// A (possibly raw, possibly triple-quoted) string literal, quotes and
    /// prefix included in `text`.
    String,
    /// A `b"..."`/`B'''...'''` bytes literal.
    Bytes,
    /// Any identifier that isn't a reserved word.
    Ident,
    /// `in`
    In,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,
    Bang,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Question,

    Eof,
}

/// A single lexed token: its kind, the raw source text it came from, and the
/// 1-based line/column of its first character.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn eof(position: Position) -> Self {
        Self::new(TokenKind::Eof, "", position)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{}", self.text)
        }
    }
}
