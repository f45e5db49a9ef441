// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Hand-written recursive descent parser for the dialect.
//!
//! ## Architecture
//!
//! - `stream`: token stream wrapper with lookahead and recovery
//! - `expr`: expression parser using Pratt precedence climbing
//! - `stmt`: statement parsers (keyword-dispatched)
//!
//! The parser never fails as a whole: source-level problems become ranged
//! diagnostics in the result and parsing continues at the next statement
//! boundary. Newline tokens terminate statements except inside bracketed
//! literals, where they are absorbed.

mod expr;
mod stmt;
mod stream;

use brsc_ast::{Diagnostic, Statement};
use brsc_lexer::Token;
use serde::{Deserialize, Serialize};
use stream::TokenStream;

/// Grammar flavor. Superset mode accepts namespaces, classes, `new`
/// expressions, and imports; baseline mode flags them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Baseline,
    Superset,
}

/// Parser output: top-level statements plus every diagnostic raised while
/// parsing.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub statements: Vec<Statement>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a token stream (which must end in an `Eof` sentinel, as produced
/// by `brsc_lexer::tokenize`).
pub fn parse(tokens: &[Token], mode: ParseMode) -> ParseResult {
    let mut parser = Parser::new(tokens, mode);
    let statements = parser.parse_program();
    ParseResult {
        statements,
        diagnostics: parser.diagnostics,
    }
}

pub(crate) struct Parser {
    stream: TokenStream,
    mode: ParseMode,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn new(tokens: &[Token], mode: ParseMode) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            mode,
            diagnostics: Vec::new(),
        }
    }
}
