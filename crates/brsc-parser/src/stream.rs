//! Token stream wrapper for the hand-written parser.

use brsc_ast::catalog;
use brsc_ast::{Diagnostic, Range};
use brsc_lexer::{Token, TokenKind};

/// Token stream with lookahead, expectation checking, and recovery.
///
/// Comment tokens are filtered on construction (the code file re-reads them
/// from the raw token list for suppression directives); newline tokens stay,
/// they are statement terminators. The final token is always `Eof`, and the
/// cursor never moves past it.
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: &[Token]) -> Self {
        let mut tokens: Vec<Token> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .cloned()
            .collect();
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let range = tokens.last().map(|t| t.range).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                range: Range::new(range.end, range.end),
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Current token without consuming it. At the end this is the `Eof`
    /// sentinel.
    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Lookahead without consuming; saturates at `Eof`.
    pub fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token. The `Eof` sentinel is returned
    /// forever once reached.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consume the current token if it matches.
    pub fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or produce a syntax diagnostic at
    /// the current token.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(catalog::syntax_error(format!(
                "expected {}, found {}",
                kind.describe(),
                found.kind.describe()
            ))
            .at(found.range))
        }
    }

    pub fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// True at a statement separator (newline or colon) or at `Eof`.
    pub fn at_separator(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Colon | TokenKind::Eof
        )
    }

    /// Skip newline tokens.
    pub fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skip newline and colon separators.
    pub fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Colon) {
            self.advance();
        }
    }

    /// Index of the current token, for later range computation.
    pub fn mark(&self) -> usize {
        self.pos
    }

    /// Range spanning from the token at `mark` through the last consumed
    /// token. Falls back to the mark token's own range when nothing was
    /// consumed since.
    pub fn range_from(&self, mark: usize) -> Range {
        let start = self.tokens[mark.min(self.tokens.len() - 1)].range;
        if self.pos > mark {
            let end = self.tokens[self.pos - 1].range;
            start.union(&end)
        } else {
            start
        }
    }

    /// Range of the most recently consumed token.
    pub fn prev_range(&self) -> Range {
        if self.pos > 0 {
            self.tokens[self.pos - 1].range
        } else {
            self.tokens[0].range
        }
    }

    /// Recover to the next statement boundary: a newline or colon at
    /// bracket depth zero, or a close bracket that would leave the depth
    /// the recovery started at. The boundary token itself is not consumed.
    pub fn synchronize(&mut self) {
        let mut depth: i32 = 0;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::Colon if depth <= 0 => return,
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    if depth <= 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}
