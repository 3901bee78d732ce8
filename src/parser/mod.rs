//! Recursive-descent parser: turns a token stream from [`crate::lexer`] into
//! an [`ast::Expr`] tree.
//!
//! Precedence climbs in one direction only, from `parse_expr` down to
//! `parse_unary`/`parse_member`/`parse_primary`, matching the grammar order:
//! conditional, or, and, relation, addition, multiplication, unary, member,
//! primary.

pub mod ast;
pub mod strings;

use crate::error::SyntaxError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Position;
use crate::value::Value;

use ast::{BinaryOp, Expr, FieldInit, MapEntry, UnaryOp};

/// Parse a complete expression, requiring the whole input to be consumed.
pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
    let mut parser = Parser::new(source);
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

fn is_macro_name(name: &str) -> bool {
    matches!(name, "map" | "filter" | "all" | "exists" | "existsOne")
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

/// The result of parsing a primary expression before the member-access loop
/// has had a chance to run: either a concrete expression, or a bare chain of
/// identifiers (`a.b.c`) that hasn't yet been resolved into field selects —
/// kept open because a `{` immediately following reinterprets the whole
/// chain as a qualified struct type name instead.
enum MemberBase {
    Path(Vec<String>, Position),
    Expr(Expr),
}

impl MemberBase {
    fn into_expr(self) -> Expr {
        match self {
            MemberBase::Expr(e) => e,
            MemberBase::Path(segments, position) => fold_path(segments, position),
        }
    }
}

fn fold_path(segments: Vec<String>, position: Position) -> Expr {
    let mut iter = segments.into_iter();
    let first = iter.next().expect("path has at least one segment");
    let mut expr = Expr::Identifier {
        name: first,
        position,
    };
    for field in iter {
        expr = Expr::Select {
            operand: Some(Box::new(expr)),
            field,
            is_test: false,
            position,
        };
    }
    expr
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    fn peek(&mut self) -> Result<Token, SyntaxError> {
        self.lexer.peek(0)
    }

    fn bump(&mut self) -> Result<Token, SyntaxError> {
        self.lexer.next()
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, SyntaxError> {
        let tok = self.bump()?;
        let position = tok.position;
        if tok.kind == kind {
            Ok(tok)
        } else if tok.kind == TokenKind::Eof {
            Err(SyntaxError::unexpected_eof(expected, position))
        } else {
            Err(SyntaxError::unexpected_token(tok, expected, position))
        }
    }

    fn expect_eof(&mut self) -> Result<(), SyntaxError> {
        let tok = self.bump()?;
        let position = tok.position;
        if tok.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(SyntaxError::unexpected_token(tok, "end of input", position))
        }
    }

    fn check(&mut self, kind: TokenKind) -> Result<bool, SyntaxError> {
        Ok(self.peek()?.kind == kind)
    }

    fn eat(&mut self, kind: TokenKind) -> Result<Option<Token>, SyntaxError> {
        if self.check(kind)? {
            Ok(Some(self.bump()?))
        } else {
            Ok(None)
        }
    }

    // Expr = ConditionalOr ["?" ConditionalOr ":" Expr]
    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let condition = self.parse_conditional_or()?;
        if self.eat(TokenKind::Question)?.is_some() {
            let position = condition.position();
            let then_branch = self.parse_conditional_or()?;
            self.expect(TokenKind::Colon, "':' in conditional expression")?;
            let else_branch = self.parse_expr()?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                position,
            });
        }
        Ok(condition)
    }

    // ConditionalOr = ConditionalAnd {"||" ConditionalAnd}
    fn parse_conditional_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_conditional_and()?;
        while self.check(TokenKind::OrOr)? {
            let position = left.position();
            self.bump()?;
            let right = self.parse_conditional_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    // ConditionalAnd = Relation {"&&" Relation}
    fn parse_conditional_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_relation()?;
        while self.check(TokenKind::AndAnd)? {
            let position = left.position();
            self.bump()?;
            let right = self.parse_relation()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    // Relation = Addition {relop Addition}
    fn parse_relation(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEq => BinaryOp::Le,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEq => BinaryOp::Ge,
                TokenKind::In => BinaryOp::In,
                _ => break,
            };
            let position = left.position();
            self.bump()?;
            let right = self.parse_addition()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    // Addition = Multiplication {("+"|"-") Multiplication}
    fn parse_addition(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let position = left.position();
            self.bump()?;
            let right = self.parse_multiplication()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    // Multiplication = Unary {("*"|"/"|"%") Unary}
    fn parse_multiplication(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let position = left.position();
            self.bump()?;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    // Unary = ("!" | "-")* Member
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.peek()?;
        let op = match tok.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Negate),
            _ => None,
        };
        if let Some(op) = op {
            self.bump()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                position: tok.position,
            });
        }
        self.parse_member()
    }

    // Member = Primary {"." Ident ["(" Args ")"] | "[" Expr "]"}
    fn parse_member(&mut self) -> Result<Expr, SyntaxError> {
        let mut base = self.parse_primary_base()?;
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Dot => {
                    self.bump()?;
                    let name_tok = self.expect(TokenKind::Ident, "a field or method name")?;
                    base = self.extend_after_dot(base, name_tok)?;
                }
                TokenKind::LBracket => {
                    let expr = base.into_expr();
                    let position = expr.position();
                    self.bump()?;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    base = MemberBase::Expr(Expr::Index {
                        operand: Box::new(expr),
                        index: Box::new(index),
                        position,
                    });
                }
                _ => break,
            }
        }
        Ok(base.into_expr())
    }

    fn extend_after_dot(&mut self, base: MemberBase, name_tok: Token) -> Result<MemberBase, SyntaxError> {
        let name = name_tok.text;
        match base {
            MemberBase::Path(mut segments, position) => {
                if self.check(TokenKind::LBrace)? {
                    segments.push(name);
                    let type_name = segments.join(".");
                    self.bump()?;
                    let fields = self.parse_struct_fields()?;
                    Ok(MemberBase::Expr(Expr::Struct {
                        type_name: Some(type_name),
                        fields,
                        position,
                    }))
                } else if self.check(TokenKind::LParen)? {
                    let receiver = fold_path(segments, position);
                    self.bump()?;
                    let args = self.parse_args()?;
                    Ok(MemberBase::Expr(self.finish_call(Some(receiver), name, args, position)?))
                } else {
                    segments.push(name);
                    Ok(MemberBase::Path(segments, position))
                }
            }
            MemberBase::Expr(expr) => {
                let position = expr.position();
                if self.check(TokenKind::LParen)? {
                    self.bump()?;
                    let args = self.parse_args()?;
                    Ok(MemberBase::Expr(self.finish_call(Some(expr), name, args, position)?))
                } else {
                    Ok(MemberBase::Expr(Expr::Select {
                        operand: Some(Box::new(expr)),
                        field: name,
                        is_test: false,
                        position,
                    }))
                }
            }
        }
    }

    /// Build a `Call`, desugaring the five recognized macro method names
    /// into `Comprehension` nodes instead.
    fn finish_call(
        &self,
        target: Option<Expr>,
        function: String,
        mut args: Vec<Expr>,
        position: Position,
    ) -> Result<Expr, SyntaxError> {
        if let Some(range) = target.clone() {
            if is_macro_name(&function) && !args.is_empty() {
                let iter_var = match args.remove(0) {
                    Expr::Identifier { name, .. } => name,
                    other => {
                        return Err(SyntaxError::new(
                            format!("'{function}' requires an identifier as its first argument"),
                            other.position(),
                        ))
                    }
                };
                return Ok(desugar_macro(&function, range, iter_var, args, position));
            }
        }
        Ok(Expr::Call {
            target: target.map(Box::new),
            function,
            args,
            position,
        })
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = vec![];
        if self.check(TokenKind::RParen)? {
            self.bump()?;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat(TokenKind::Comma)?.is_some() {
                if self.check(TokenKind::RParen)? {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn parse_struct_fields(&mut self) -> Result<Vec<FieldInit>, SyntaxError> {
        let mut fields = vec![];
        if self.check(TokenKind::RBrace)? {
            self.bump()?;
            return Ok(fields);
        }
        loop {
            let name_tok = self.expect(TokenKind::Ident, "a field name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expr()?;
            fields.push(FieldInit {
                name: name_tok.text,
                value,
            });
            if self.eat(TokenKind::Comma)?.is_some() {
                if self.check(TokenKind::RBrace)? {
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(fields)
    }

    /// Parses a primary expression, returning a [`MemberBase`] so the
    /// caller can keep a bare identifier chain open for the qualified-type
    /// lookahead in [`Self::extend_after_dot`].
    fn parse_primary_base(&mut self) -> Result<MemberBase, SyntaxError> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Ident | TokenKind::In => {
                self.bump()?;
                if self.check(TokenKind::LParen)? {
                    self.bump()?;
                    let args = self.parse_args()?;
                    return Ok(MemberBase::Expr(self.finish_call(None, tok.text, args, tok.position)?));
                }
                if self.check(TokenKind::LBrace)? {
                    self.bump()?;
                    let fields = self.parse_struct_fields()?;
                    return Ok(MemberBase::Expr(Expr::Struct {
                        type_name: Some(tok.text),
                        fields,
                        position: tok.position,
                    }));
                }
                Ok(MemberBase::Path(vec![tok.text], tok.position))
            }
            _ => Ok(MemberBase::Expr(self.parse_primary()?)),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Null => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: Value::Null,
                    position: tok.position,
                })
            }
            TokenKind::True => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: Value::Bool(true),
                    position: tok.position,
                })
            }
            TokenKind::False => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: Value::Bool(false),
                    position: tok.position,
                })
            }
            TokenKind::Int => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: Value::Int(parse_int_literal(&tok.text, tok.position)?),
                    position: tok.position,
                })
            }
            TokenKind::Uint => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: Value::Uint(parse_uint_literal(&tok.text, tok.position)?),
                    position: tok.position,
                })
            }
            TokenKind::Double => {
                self.bump()?;
                let text = tok.text.trim_end_matches(['f', 'F']);
                let parsed: f64 = text
                    .parse()
                    .map_err(|_| SyntaxError::new(format!("invalid double literal '{}'", tok.text), tok.position))?;
                Ok(Expr::Literal {
                    value: Value::Double(parsed),
                    position: tok.position,
                })
            }
            TokenKind::String => {
                self.bump()?;
                let decoded = strings::decode_string(&tok.text, tok.position)?;
                Ok(Expr::Literal {
                    value: Value::String(decoded),
                    position: tok.position,
                })
            }
            TokenKind::Bytes => {
                self.bump()?;
                let decoded = strings::decode_bytes(&tok.text, tok.position)?;
                Ok(Expr::Literal {
                    value: Value::Bytes(decoded),
                    position: tok.position,
                })
            }
            TokenKind::LParen => {
                self.bump()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_map(),
            TokenKind::Eof => Err(SyntaxError::unexpected_eof("an expression", tok.position)),
            _ => Err(SyntaxError::unexpected_token(tok.clone(), "an expression", tok.position)),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::LBracket, "'['")?;
        let mut elements = vec![];
        if !self.check(TokenKind::RBracket)? {
            loop {
                elements.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma)?.is_some() {
                    if self.check(TokenKind::RBracket)? {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::List {
            elements,
            position: start.position,
        })
    }

    /// Parses a `{...}` literal. When every key parses as a bare identifier
    /// followed directly by `:`, the literal is ambiguous between a map
    /// with string keys and a type-less struct; both read the same way, so
    /// it's represented as `Map` (see `ast::Expr::Struct` doc comment).
    fn parse_map(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::LBrace, "'{'")?;
        let mut entries = vec![];
        if !self.check(TokenKind::RBrace)? {
            loop {
                let key = self.parse_expr()?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_expr()?;
                entries.push(MapEntry { key, value });
                if self.eat(TokenKind::Comma)?.is_some() {
                    if self.check(TokenKind::RBrace)? {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::Map {
            entries,
            position: start.position,
        })
    }
}

/// Desugars a recognized macro method call into the generalized
/// `Comprehension` fold that implements it.
///
/// `filter`/`map` thread their accumulator through a synthetic
/// `__append__(list, item)` call rather than a literal `Expr::List` splice —
/// the interpreter implements `__append__` directly (see
/// `crate::interpreter`) so these stay regular function dispatches instead
/// of a third expression shape.
fn desugar_macro(name: &str, range: Expr, iter_var: String, mut args: Vec<Expr>, position: Position) -> Expr {
    let accu_var = "__result__".to_string();
    match name {
        "all" => {
            let predicate = args.remove(0);
            Expr::Comprehension {
                iter_var,
                range: Box::new(range),
                accu_var: accu_var.clone(),
                init: Box::new(Expr::Literal {
                    value: Value::Bool(true),
                    position,
                }),
                condition: Box::new(Expr::Identifier {
                    name: accu_var.clone(),
                    position,
                }),
                step: Box::new(Expr::Binary {
                    op: BinaryOp::And,
                    left: Box::new(Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    }),
                    right: Box::new(predicate),
                    position,
                }),
                result: Box::new(Expr::Identifier { name: accu_var, position }),
                position,
            }
        }
        "exists" => {
            let predicate = args.remove(0);
            Expr::Comprehension {
                iter_var,
                range: Box::new(range),
                accu_var: accu_var.clone(),
                init: Box::new(Expr::Literal {
                    value: Value::Bool(false),
                    position,
                }),
                condition: Box::new(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    }),
                    position,
                }),
                step: Box::new(Expr::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    }),
                    right: Box::new(predicate),
                    position,
                }),
                result: Box::new(Expr::Identifier { name: accu_var, position }),
                position,
            }
        }
        "existsOne" => {
            let predicate = args.remove(0);
            Expr::Comprehension {
                iter_var,
                range: Box::new(range),
                accu_var: accu_var.clone(),
                init: Box::new(Expr::Literal {
                    value: Value::Int(0),
                    position,
                }),
                condition: Box::new(Expr::Literal {
                    value: Value::Bool(true),
                    position,
                }),
                step: Box::new(Expr::Conditional {
                    condition: Box::new(predicate),
                    then_branch: Box::new(Expr::Binary {
                        op: BinaryOp::Add,
                        left: Box::new(Expr::Identifier {
                            name: accu_var.clone(),
                            position,
                        }),
                        right: Box::new(Expr::Literal {
                            value: Value::Int(1),
                            position,
                        }),
                        position,
                    }),
                    else_branch: Box::new(Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    }),
                    position,
                }),
                result: Box::new(Expr::Binary {
                    op: BinaryOp::Eq,
                    left: Box::new(Expr::Identifier { name: accu_var, position }),
                    right: Box::new(Expr::Literal {
                        value: Value::Int(1),
                        position,
                    }),
                    position,
                }),
                position,
            }
        }
        "filter" => {
            let predicate = args.remove(0);
            Expr::Comprehension {
                iter_var: iter_var.clone(),
                range: Box::new(range),
                accu_var: accu_var.clone(),
                init: Box::new(Expr::List {
                    elements: vec![],
                    position,
                }),
                condition: Box::new(Expr::Literal {
                    value: Value::Bool(true),
                    position,
                }),
                step: Box::new(Expr::Conditional {
                    condition: Box::new(predicate),
                    then_branch: Box::new(Expr::Call {
                        target: None,
                        function: "__append__".to_string(),
                        args: vec![
                            Expr::Identifier {
                                name: accu_var.clone(),
                                position,
                            },
                            Expr::Identifier { name: iter_var, position },
                        ],
                        position,
                    }),
                    else_branch: Box::new(Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    }),
                    position,
                }),
                result: Box::new(Expr::Identifier { name: accu_var, position }),
                position,
            }
        }
        "map" => {
            // Both the 2-arg `map(x, transform)` and 3-arg
            // `map(x, filter, transform)` forms desugar here; `args` holds
            // whatever is left after the iteration variable was stripped.
            let (filter, transform) = if args.len() == 2 {
                (Some(args.remove(0)), args.remove(0))
            } else {
                (None, args.remove(0))
            };
            let transformed = Expr::Call {
                target: None,
                function: "__append__".to_string(),
                args: vec![
                    Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    },
                    transform,
                ],
                position,
            };
            let step = match filter {
                Some(predicate) => Expr::Conditional {
                    condition: Box::new(predicate),
                    then_branch: Box::new(transformed),
                    else_branch: Box::new(Expr::Identifier {
                        name: accu_var.clone(),
                        position,
                    }),
                    position,
                },
                None => transformed,
            };
            Expr::Comprehension {
                iter_var,
                range: Box::new(range),
                accu_var: accu_var.clone(),
                init: Box::new(Expr::List {
                    elements: vec![],
                    position,
                }),
                condition: Box::new(Expr::Literal {
                    value: Value::Bool(true),
                    position,
                }),
                step: Box::new(step),
                result: Box::new(Expr::Identifier { name: accu_var, position }),
                position,
            }
        }
        _ => unreachable!("is_macro_name gates this to known names"),
    }
}

fn parse_int_literal(text: &str, position: Position) -> Result<i64, SyntaxError> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16)
            .map_err(|_| SyntaxError::new(format!("invalid hex integer literal '{text}'"), position));
    }
    text.parse()
        .map_err(|_| SyntaxError::new(format!("invalid integer literal '{text}'"), position))
}

fn parse_uint_literal(text: &str, position: Position) -> Result<u64, SyntaxError> {
    let trimmed = text.trim_end_matches(['u', 'U']);
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map_err(|_| SyntaxError::new(format!("invalid hex uint literal '{text}'"), position));
    }
    trimmed
        .parse()
        .map_err(|_| SyntaxError::new(format!("invalid uint literal '{text}'"), position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Expr {
        parse(src).unwrap_or_else(|e| panic!("expected '{src}' to parse, got {e}"))
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let expr = parse_ok("1 + 2 * 3");
        match expr {
            Expr::Binary { op: BinaryOp::Add, right, .. } => match *right {
                Expr::Binary { op: BinaryOp::Mul, .. } => {}
                other => panic!("expected nested multiplication, got {other:?}"),
            },
            other => panic!("expected addition at the top, got {other:?}"),
        }
    }

    #[test]
    fn parses_conditional() {
        let expr = parse_ok("x ? 1 : 2");
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn parses_member_select_chain() {
        let expr = parse_ok("a.b.c");
        match expr {
            Expr::Select { field, .. } => assert_eq!(field, "c"),
            other => panic!("expected a select chain, got {other:?}"),
        }
    }

    #[test]
    fn parses_qualified_struct_literal() {
        let expr = parse_ok("google.type.Date{year: 2024}");
        match expr {
            Expr::Struct { type_name, fields, .. } => {
                assert_eq!(type_name.as_deref(), Some("google.type.Date"));
                assert_eq!(fields.len(), 1);
            }
            other => panic!("expected a qualified struct literal, got {other:?}"),
        }
    }

    #[test]
    fn parses_method_call_on_select_chain() {
        let expr = parse_ok("a.b.startsWith(\"x\")");
        match expr {
            Expr::Call { target: Some(_), function, .. } => assert_eq!(function, "startsWith"),
            other => panic!("expected a method call, got {other:?}"),
        }
    }

    #[test]
    fn parses_index_expression() {
        let expr = parse_ok("a[0]");
        assert!(matches!(expr, Expr::Index { .. }));
    }

    #[test]
    fn desugars_exists_macro_into_comprehension() {
        let expr = parse_ok("items.exists(x, x > 0)");
        assert!(matches!(expr, Expr::Comprehension { .. }));
    }

    #[test]
    fn desugars_map_macro_into_comprehension() {
        let expr = parse_ok("items.map(x, x * 2)");
        assert!(matches!(expr, Expr::Comprehension { .. }));
    }

    #[test]
    fn rejects_macro_with_non_identifier_first_argument() {
        let err = parse("items.exists(1, true)").unwrap_err();
        assert!(err.message.contains("identifier"));
    }

    #[test]
    fn trailing_comma_allowed_in_list_literal() {
        let expr = parse_ok("[1, 2, 3,]");
        match expr {
            Expr::List { elements, .. } => assert_eq!(elements.len(), 3),
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[test]
    fn struct_literal_without_namespace() {
        let expr = parse_ok("Point{x: 1, y: 2}");
        match expr {
            Expr::Struct { type_name, .. } => assert_eq!(type_name.as_deref(), Some("Point")),
            other => panic!("expected a struct literal, got {other:?}"),
        }
    }

    #[test]
    fn map_literal_with_bare_keys_stays_a_map() {
        let expr = parse_ok("{a: 1, b: 2}");
        assert!(matches!(expr, Expr::Map { .. }));
    }

    #[test]
    fn parses_in_operator() {
        let expr = parse_ok("1 in [1, 2, 3]");
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::In, .. }));
    }

    #[test]
    fn unary_negate_binds_tighter_than_multiplication() {
        let expr = parse_ok("-1 * 2");
        match expr {
            Expr::Binary { op: BinaryOp::Mul, left, .. } => assert!(matches!(*left, Expr::Unary { op: UnaryOp::Negate, .. })),
            other => panic!("expected a multiplication at the top, got {other:?}"),
        }
    }
}
