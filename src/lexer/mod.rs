pub mod token;

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub use token::{Token, TokenKind};

use crate::error::SyntaxError;
use crate::span::Position;

/// Reserved words that lex to their own token kind instead of `Ident`.
static RESERVED: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("null", TokenKind::Null);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("in", TokenKind::In);
    m
});

/// Character-stream tokenizer for CEL-shaped expressions.
///
/// Maintains `(position, line, column)` internally and exposes [`Lexer::next`]
/// and [`Lexer::peek`], the latter buffering up to `k` tokens ahead in a ring
/// buffer so the parser's two-token-lookahead disambiguation never has to
/// re-scan source text.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    lookahead: VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            lookahead: VecDeque::new(),
        }
    }

    /// Consume and return the next token, decoding it from the lookahead
    /// buffer first if anything has already been scanned.
    pub fn next(&mut self) -> Result<Token, SyntaxError> {
        if let Some(tok) = self.lookahead.pop_front() {
            return Ok(tok);
        }
        self.scan_token()
    }

    /// Look `k` tokens ahead (0 = the next token to be returned by
    /// [`Lexer::next`]) without consuming anything.
    pub fn peek(&mut self, k: usize) -> Result<Token, SyntaxError> {
        while self.lookahead.len() <= k {
            let tok = self.scan_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            self.lookahead.push_back(tok);
            if is_eof {
                break;
            }
        }
        Ok(self
            .lookahead
            .get(k)
            .cloned()
            .unwrap_or_else(|| Token::eof(self.position())))
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.chars.clone().nth(offset)
    }

    fn eat_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\r' {
                // CRLF counts as a single newline; consume the '\r' without
                // advancing the line counter, let the following '\n' do it.
                self.chars.next();
                self.column = 1;
                continue;
            }
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, SyntaxError> {
        self.eat_whitespace();
        let start = self.position();

        let Some(c) = self.peek_char() else {
            return Ok(Token::eof(start));
        };

        match c {
            '0'..='9' => self.scan_number(start),
            c if is_ident_start(c) => self.scan_ident_or_prefixed_literal(start),
            '"' | '\'' => self.scan_string(start, String::new(), false, false),
            _ => self.scan_operator(start),
        }
    }

    fn scan_ident_or_prefixed_literal(&mut self, start: Position) -> Result<Token, SyntaxError> {
        // A leading `r`/`R`/`b`/`B` run of at most two distinct letters may
        // introduce a string/bytes literal instead of an identifier; only
        // commit to that reading if a quote actually follows.
        let mut raw = false;
        let mut bytes = false;
        let mut prefix = String::new();
        let mut offset = 0usize;
        loop {
            match self.peek_char_at(offset) {
                Some(c @ ('r' | 'R')) if !raw => {
                    raw = true;
                    prefix.push(c);
                    offset += 1;
                }
                Some(c @ ('b' | 'B')) if !bytes => {
                    bytes = true;
                    prefix.push(c);
                    offset += 1;
                }
                _ => break,
            }
        }
        if (raw || bytes) && matches!(self.peek_char_at(offset), Some('"') | Some('\'')) {
            for _ in 0..offset {
                self.bump();
            }
            return self.scan_string(start, prefix, raw, bytes);
        }

        self.scan_ident(start)
    }

    fn scan_ident(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let kind = RESERVED.get(text.as_str()).cloned().unwrap_or(TokenKind::Ident);
        Ok(Token::new(kind, text, start))
    }

    fn scan_number(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let mut text = String::new();

        if self.peek_char() == Some('0')
            && matches!(self.peek_char_at(1), Some('x') | Some('X'))
        {
            text.push(self.bump().unwrap());
            text.push(self.bump().unwrap());
            while let Some(c) = self.peek_char() {
                if c.is_ascii_hexdigit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = self.scan_uint_suffix(&mut text);
            return Ok(Token::new(kind, text, start));
        }

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let mut is_double = false;

        if self.peek_char() == Some('.') && matches!(self.peek_char_at(1), Some(c) if c.is_ascii_digit())
        {
            is_double = true;
            text.push(self.bump().unwrap());
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_char_at(1), Some('+') | Some('-')) {
                lookahead += 1;
            }
            if matches!(self.peek_char_at(lookahead), Some(c) if c.is_ascii_digit()) {
                is_double = true;
                text.push(self.bump().unwrap());
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    text.push(self.bump().unwrap());
                }
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        if is_double {
            return Ok(Token::new(TokenKind::Double, text, start));
        }

        let kind = self.scan_uint_suffix(&mut text);
        Ok(Token::new(kind, text, start))
    }

    fn scan_uint_suffix(&mut self, text: &mut String) -> TokenKind {
        if matches!(self.peek_char(), Some('u') | Some('U')) {
            text.push(self.bump().unwrap());
            TokenKind::Uint
        } else {
            TokenKind::Int
        }
    }

    fn scan_string(
        &mut self,
        start: Position,
        prefix: String,
        raw: bool,
        bytes: bool,
    ) -> Result<Token, SyntaxError> {
        let mut text = prefix;

        let quote = self.peek_char().ok_or_else(|| SyntaxError::unterminated_string(start))?;
        let triple = self.peek_char_at(1) == Some(quote) && self.peek_char_at(2) == Some(quote);

        let delim_len = if triple { 3 } else { 1 };
        for _ in 0..delim_len {
            text.push(self.bump().ok_or_else(|| SyntaxError::unterminated_string(start))?);
        }

        loop {
            let Some(c) = self.peek_char() else {
                return Err(SyntaxError::unterminated_string(start));
            };

            if !raw && c == '\\' {
                text.push(self.bump().unwrap());
                match self.bump() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(SyntaxError::unterminated_string(start)),
                }
                continue;
            }

            if c == quote {
                if triple {
                    if self.peek_char_at(1) == Some(quote) && self.peek_char_at(2) == Some(quote) {
                        for _ in 0..3 {
                            text.push(self.bump().unwrap());
                        }
                        break;
                    }
                    text.push(self.bump().unwrap());
                    continue;
                }
                text.push(self.bump().unwrap());
                break;
            }

            text.push(self.bump().unwrap());
        }

        let kind = if bytes { TokenKind::Bytes } else { TokenKind::String };
        Ok(Token::new(kind, text, start))
    }

    fn scan_operator(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let c = self.bump().expect("peeked a character");

        let single = match c {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '.' => Some(TokenKind::Dot),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            '?' => Some(TokenKind::Question),
            '!' => Some(TokenKind::Bang),
            '<' => Some(TokenKind::Less),
            '>' => Some(TokenKind::Greater),
            _ => None,
        };

        // `=`, `&`, `|` only ever appear as the first half of a two-char
        // operator in this grammar; `<`, `>`, `!` may stand alone.
        let followed_by_eq = self.peek_char() == Some('=');
        let kind = match c {
            '=' if followed_by_eq => {
                self.bump();
                TokenKind::EqEq
            }
            '!' if followed_by_eq => {
                self.bump();
                TokenKind::NotEq
            }
            '<' if followed_by_eq => {
                self.bump();
                TokenKind::LessEq
            }
            '>' if followed_by_eq => {
                self.bump();
                TokenKind::GreaterEq
            }
            '&' if self.peek_char() == Some('&') => {
                self.bump();
                TokenKind::AndAnd
            }
            '|' if self.peek_char() == Some('|') => {
                self.bump();
                TokenKind::OrOr
            }
            _ => match single {
                Some(kind) => kind,
                None => return Err(SyntaxError::unknown_character(c, start)),
            },
        };

        let text = match kind {
            TokenKind::EqEq | TokenKind::NotEq | TokenKind::LessEq | TokenKind::GreaterEq => {
                format!("{c}=")
            }
            TokenKind::AndAnd => "&&".to_string(),
            TokenKind::OrOr => "||".to_string(),
            _ => c.to_string(),
        };

        Ok(Token::new(kind, text, start))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut kinds = vec![];
        loop {
            let tok = lexer.next().unwrap();
            let done = tok.kind == TokenKind::Eof;
            kinds.push(tok.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        assert_eq!(
            lex_all("foo null true false in"),
            vec![
                TokenKind::Ident,
                TokenKind::Null,
                TokenKind::True,
                TokenKind::False,
                TokenKind::In,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_integers_and_hex() {
        let mut lexer = Lexer::new("42 0x2A 7u 0x2Au");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Int);
        let hex = lexer.next().unwrap();
        assert_eq!(hex.kind, TokenKind::Int);
        assert_eq!(hex.text, "0x2A");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Uint);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Uint);
    }

    #[test]
    fn lexes_doubles() {
        let mut lexer = Lexer::new("3.14 2e10 1.5e-3");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Double);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Double);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Double);
    }

    #[test]
    fn negative_sign_is_not_part_of_integer_lexeme() {
        let mut lexer = Lexer::new("-5");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Minus);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Int);
    }

    #[test]
    fn lexes_plain_and_raw_strings() {
        let mut lexer = Lexer::new(r#" "a\"b" r"c\d" "#);
        let first = lexer.next().unwrap();
        assert_eq!(first.kind, TokenKind::String);
        assert_eq!(first.text, r#""a\"b""#);
        let second = lexer.next().unwrap();
        assert_eq!(second.kind, TokenKind::String);
        assert_eq!(second.text, r#"r"c\d""#);
    }

    #[test]
    fn lexes_triple_quoted_strings_spanning_newlines() {
        let mut lexer = Lexer::new("\"\"\"a\nb\"\"\"");
        let tok = lexer.next().unwrap();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.text, "\"\"\"a\nb\"\"\"");
    }

    #[test]
    fn lexes_bytes_literal() {
        let mut lexer = Lexer::new(r#"b"abc""#);
        let tok = lexer.next().unwrap();
        assert_eq!(tok.kind, TokenKind::Bytes);
    }

    #[test]
    fn unterminated_string_errors_at_opening_quote() {
        let mut lexer = Lexer::new("\"abc");
        let err = lexer.next().unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("1 + 2");
        assert_eq!(lexer.peek(0).unwrap().kind, TokenKind::Int);
        assert_eq!(lexer.peek(1).unwrap().kind, TokenKind::Plus);
        assert_eq!(lexer.peek(2).unwrap().kind, TokenKind::Int);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Int);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Plus);
    }

    #[test]
    fn crlf_counts_as_one_newline() {
        let mut lexer = Lexer::new("a\r\nb");
        let a = lexer.next().unwrap();
        let b = lexer.next().unwrap();
        assert_eq!(a.position, Position::new(1, 1));
        assert_eq!(b.position, Position::new(2, 1));
    }
}
