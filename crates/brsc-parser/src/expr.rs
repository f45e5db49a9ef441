//! Expression parser - Pratt precedence climbing.

use crate::{ParseMode, Parser};
use brsc_ast::ast::{AaMember, BinaryOp, DottedName, Expression, Name, UnaryOp};
use brsc_ast::catalog;
use brsc_ast::Diagnostic;
use brsc_lexer::TokenKind;

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// Binary operator metadata (precedence, associativity, operator).
///
/// Higher precedence binds tighter. Single source of truth for binary
/// operator parsing.
fn binary_op_info(kind: TokenKind) -> Option<(u8, Assoc, BinaryOp)> {
    match kind {
        TokenKind::Or => Some((10, Assoc::Left, BinaryOp::Or)),
        TokenKind::And => Some((20, Assoc::Left, BinaryOp::And)),
        TokenKind::Equal => Some((30, Assoc::Left, BinaryOp::Eq)),
        TokenKind::NotEqual => Some((30, Assoc::Left, BinaryOp::Ne)),
        TokenKind::Less => Some((30, Assoc::Left, BinaryOp::Less)),
        TokenKind::LessEqual => Some((30, Assoc::Left, BinaryOp::LessEq)),
        TokenKind::Greater => Some((30, Assoc::Left, BinaryOp::Greater)),
        TokenKind::GreaterEqual => Some((30, Assoc::Left, BinaryOp::GreaterEq)),
        TokenKind::LeftShift => Some((35, Assoc::Left, BinaryOp::ShiftLeft)),
        TokenKind::RightShift => Some((35, Assoc::Left, BinaryOp::ShiftRight)),
        TokenKind::Plus => Some((40, Assoc::Left, BinaryOp::Add)),
        TokenKind::Minus => Some((40, Assoc::Left, BinaryOp::Sub)),
        TokenKind::Star => Some((50, Assoc::Left, BinaryOp::Mul)),
        TokenKind::Slash => Some((50, Assoc::Left, BinaryOp::Div)),
        TokenKind::Backslash => Some((50, Assoc::Left, BinaryOp::IntDiv)),
        TokenKind::Mod => Some((50, Assoc::Left, BinaryOp::Mod)),
        TokenKind::Caret => Some((60, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

impl Parser {
    /// Parse a full expression.
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, Diagnostic> {
        self.parse_pratt(0)
    }

    /// Precedence climbing over binary operators.
    fn parse_pratt(&mut self, min_prec: u8) -> Result<Expression, Diagnostic> {
        let left = self.parse_prefix()?;
        self.continue_pratt(left, min_prec)
    }

    /// Continue precedence climbing with an already-parsed left operand.
    /// The statement parser uses this after ruling out an assignment.
    pub(crate) fn continue_pratt(
        &mut self,
        mut left: Expression,
        min_prec: u8,
    ) -> Result<Expression, Diagnostic> {
        while let Some((prec, assoc, op)) = binary_op_info(self.stream.peek_kind()) {
            if prec < min_prec {
                break;
            }
            self.stream.advance();
            let next_prec = if assoc == Assoc::Left { prec + 1 } else { prec };
            let right = self.parse_pratt(next_prec)?;
            let range = left.range().union(&right.range());
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                range,
            };
        }

        Ok(left)
    }

    /// Prefix expressions: unary operators, then postfix chains.
    fn parse_prefix(&mut self) -> Result<Expression, Diagnostic> {
        match self.stream.peek_kind() {
            TokenKind::Minus | TokenKind::Not => {
                let token = self.stream.advance();
                let op = if token.kind == TokenKind::Minus {
                    UnaryOp::Negate
                } else {
                    UnaryOp::Not
                };
                let operand = self.parse_prefix()?;
                let range = token.range.union(&operand.range());
                Ok(Expression::Unary {
                    op,
                    operand: Box::new(operand),
                    range,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    /// Postfix chains: member access, indexing, calls.
    pub(crate) fn parse_postfix(&mut self) -> Result<Expression, Diagnostic> {
        let mut expr = self.parse_atom()?;

        loop {
            match self.stream.peek_kind() {
                TokenKind::Dot => {
                    self.stream.advance();
                    let name = self.expect_member_name()?;
                    let range = expr.range().union(&name.range);
                    expr = Expression::DottedGet {
                        object: Box::new(expr),
                        name,
                        range,
                    };
                }
                TokenKind::LeftBracket => {
                    self.stream.advance();
                    self.stream.skip_newlines();
                    let index = self.parse_expression()?;
                    self.stream.skip_newlines();
                    let close = self.stream.expect(TokenKind::RightBracket)?;
                    let range = expr.range().union(&close.range);
                    expr = Expression::IndexedGet {
                        object: Box::new(expr),
                        index: Box::new(index),
                        range,
                    };
                }
                TokenKind::LeftParen => {
                    let (args, close_range) = self.parse_call_args()?;
                    let range = expr.range().union(&close_range);
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        args,
                        range,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Member name after a dot. Reserved words are allowed here (`node.next`,
    /// `config.end` are legal member accesses).
    fn expect_member_name(&mut self) -> Result<Name, Diagnostic> {
        let token = self.stream.peek().clone();
        let identifier_shaped = token.kind.is_identifier_like()
            || (token.kind.is_reserved()
                && token
                    .text
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_'));
        if identifier_shaped {
            self.stream.advance();
            Ok(Name::new(token.text, token.range))
        } else {
            Err(
                catalog::syntax_error(format!("expected name after '.', found {}", token.kind))
                    .at(token.range),
            )
        }
    }

    /// Parenthesized argument list. Newlines are absorbed between arguments.
    /// Returns the arguments and the close paren's range.
    fn parse_call_args(
        &mut self,
    ) -> Result<(Vec<Expression>, brsc_ast::Range), Diagnostic> {
        self.stream.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        self.stream.skip_newlines();
        while !self.stream.check(TokenKind::RightParen) {
            if self.stream.at_end() {
                let range = self.stream.peek().range;
                return Err(catalog::syntax_error("expected ')', found end of file").at(range));
            }
            args.push(self.parse_expression()?);
            self.stream.skip_newlines();
            if self.stream.consume(TokenKind::Comma).is_some() {
                self.stream.skip_newlines();
            } else {
                break;
            }
        }
        let close = self.stream.expect(TokenKind::RightParen)?;
        Ok((args, close.range))
    }

    /// Atoms: literals, identifiers, grouping, bracketed literals,
    /// anonymous functions, `new` expressions.
    fn parse_atom(&mut self) -> Result<Expression, Diagnostic> {
        let token = self.stream.peek().clone();
        match token.kind {
            TokenKind::IntegerLiteral => {
                self.stream.advance();
                let value = parse_integer(&token.text);
                Ok(Expression::IntegerLiteral {
                    value,
                    range: token.range,
                })
            }
            TokenKind::FloatLiteral => {
                self.stream.advance();
                let value = token.text.parse::<f64>().unwrap_or(0.0);
                Ok(Expression::FloatLiteral {
                    value,
                    range: token.range,
                })
            }
            TokenKind::StringLiteral => {
                self.stream.advance();
                Ok(Expression::StringLiteral {
                    value: unquote(&token.text),
                    range: token.range,
                })
            }
            TokenKind::True | TokenKind::False => {
                self.stream.advance();
                Ok(Expression::BooleanLiteral {
                    value: token.kind == TokenKind::True,
                    range: token.range,
                })
            }
            TokenKind::Invalid => {
                self.stream.advance();
                Ok(Expression::InvalidLiteral { range: token.range })
            }
            TokenKind::New if self.stream.peek_nth(1).kind.is_identifier_like() => {
                self.parse_new_expression()
            }
            TokenKind::Sub | TokenKind::Function => {
                let func = self.parse_function_declaration(false)?;
                Ok(Expression::AnonymousFunction(Box::new(func)))
            }
            kind if kind.is_identifier_like() => {
                self.stream.advance();
                Ok(Expression::Identifier(Name::new(token.text, token.range)))
            }
            TokenKind::LeftParen => {
                self.stream.advance();
                self.stream.skip_newlines();
                let inner = self.parse_expression()?;
                self.stream.skip_newlines();
                let close = self.stream.expect(TokenKind::RightParen)?;
                Ok(Expression::Grouping {
                    inner: Box::new(inner),
                    range: token.range.union(&close.range),
                })
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_aa_literal(),
            _ => Err(catalog::syntax_error(format!(
                "expected expression, found {}",
                token.kind
            ))
            .at(token.range)),
        }
    }

    /// `new Dotted.Name(args)`. A baseline-mode diagnostic is raised but the
    /// expression still parses, which keeps recovery local.
    fn parse_new_expression(&mut self) -> Result<Expression, Diagnostic> {
        let keyword = self.stream.advance();
        if self.mode == ParseMode::Baseline {
            self.diagnostics
                .push(catalog::not_allowed_in_baseline("new").at(keyword.range));
        }
        let class_name = self.parse_dotted_name()?;
        let (args, close_range) = if self.stream.check(TokenKind::LeftParen) {
            self.parse_call_args()?
        } else {
            (Vec::new(), class_name.range)
        };
        let range = keyword.range.union(&close_range);
        Ok(Expression::New {
            class_name,
            args,
            range,
        })
    }

    /// A dotted identifier chain: `A`, `A.B.C`.
    pub(crate) fn parse_dotted_name(&mut self) -> Result<DottedName, Diagnostic> {
        let mut parts = Vec::new();
        loop {
            let token = self.stream.peek().clone();
            if !token.kind.is_identifier_like() {
                return Err(catalog::syntax_error(format!(
                    "expected name, found {}",
                    token.kind
                ))
                .at(token.range));
            }
            self.stream.advance();
            parts.push(Name::new(token.text, token.range));
            if self.stream.check(TokenKind::Dot)
                && self.stream.peek_nth(1).kind.is_identifier_like()
            {
                self.stream.advance();
            } else {
                break;
            }
        }
        Ok(DottedName::new(parts))
    }

    /// `[ item, item ]` — items separate by commas, newlines, or both;
    /// trailing separators are tolerated. The node's range spans from the
    /// opening bracket to the closing bracket, across any blank lines.
    fn parse_array_literal(&mut self) -> Result<Expression, Diagnostic> {
        let open = self.stream.expect(TokenKind::LeftBracket)?;
        let mut elements = Vec::new();

        loop {
            self.skip_literal_separators();
            if self.stream.check(TokenKind::RightBracket) {
                break;
            }
            if self.stream.at_end() {
                let range = self.stream.peek().range;
                return Err(catalog::syntax_error("expected ']', found end of file").at(range));
            }
            elements.push(self.parse_expression()?);
            if !self.at_literal_separator() && !self.stream.check(TokenKind::RightBracket) {
                let found = self.stream.peek().clone();
                return Err(catalog::syntax_error(format!(
                    "expected ',' or ']', found {}",
                    found.kind
                ))
                .at(found.range));
            }
        }

        let close = self.stream.expect(TokenKind::RightBracket)?;
        Ok(Expression::ArrayLiteral {
            elements,
            range: open.range.union(&close.range),
        })
    }

    /// `{ key: value, ... }` — same separator rules as array literals. Keys
    /// may be identifiers, reserved words, or string literals.
    fn parse_aa_literal(&mut self) -> Result<Expression, Diagnostic> {
        let open = self.stream.expect(TokenKind::LeftBrace)?;
        let mut members = Vec::new();

        loop {
            self.skip_literal_separators();
            if self.stream.check(TokenKind::RightBrace) {
                break;
            }
            if self.stream.at_end() {
                let range = self.stream.peek().range;
                return Err(catalog::syntax_error("expected '}', found end of file").at(range));
            }

            let key_token = self.stream.peek().clone();
            let key = if key_token.kind == TokenKind::StringLiteral {
                self.stream.advance();
                Name::new(unquote(&key_token.text), key_token.range)
            } else {
                self.expect_member_name()?
            };
            self.stream.expect(TokenKind::Colon)?;
            self.stream.skip_newlines();
            let value = self.parse_expression()?;
            let range = key.range.union(&value.range());
            members.push(AaMember { key, value, range });

            if !self.at_literal_separator() && !self.stream.check(TokenKind::RightBrace) {
                let found = self.stream.peek().clone();
                return Err(catalog::syntax_error(format!(
                    "expected ',' or '}}', found {}",
                    found.kind
                ))
                .at(found.range));
            }
        }

        let close = self.stream.expect(TokenKind::RightBrace)?;
        Ok(Expression::AaLiteral {
            members,
            range: open.range.union(&close.range),
        })
    }

    fn at_literal_separator(&self) -> bool {
        matches!(
            self.stream.peek_kind(),
            TokenKind::Comma | TokenKind::Newline
        )
    }

    fn skip_literal_separators(&mut self) {
        while self.at_literal_separator() {
            self.stream.advance();
        }
    }
}

/// Decimal or `&h` hexadecimal integer text.
fn parse_integer(text: &str) -> i64 {
    if let Some(hex) = text
        .strip_prefix("&h")
        .or_else(|| text.strip_prefix("&H"))
    {
        i64::from_str_radix(hex, 16).unwrap_or(0)
    } else {
        text.parse().unwrap_or(0)
    }
}

/// Strip surrounding quotes and collapse doubled quotes.
pub(crate) fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    inner.replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), 42);
        assert_eq!(parse_integer("&hFF"), 255);
        assert_eq!(parse_integer("&H10"), 16);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""plain""#), "plain");
        assert_eq!(unquote(r#""say ""hi""""#), "say \"hi\"");
    }
}
