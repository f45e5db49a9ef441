// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for the dialect, using logos.
//!
//! Unlike most lexers, newlines and comments are real tokens here: newlines
//! terminate statements, and comments carry the suppression directives the
//! diagnostic filter reads. Horizontal whitespace is skipped.
//!
//! Keywords match case-insensitively (`Function`, `FUNCTION`, `function`
//! are all the same token). `namespace`, `class`, `import`, and `new` are
//! *contextual*: they lex as their own kinds but are not reserved, so the
//! parser can still accept them as identifiers where the grammar allows.

use brsc_ast::range::{Position, Range};
use logos::Logos;
use std::fmt;

/// Token kind. A closed set; the tokenizer appends an [`TokenKind::Eof`]
/// sentinel to every stream.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t]+")]
pub enum TokenKind {
    // === Reserved keywords ===
    #[token("and", ignore(ascii_case))]
    And,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("dim", ignore(ascii_case))]
    Dim,
    #[token("each", ignore(ascii_case))]
    Each,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("elseif", ignore(ascii_case))]
    ElseIf,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("endfor", ignore(ascii_case))]
    EndFor,
    #[token("endfunction", ignore(ascii_case))]
    EndFunction,
    #[token("endif", ignore(ascii_case))]
    EndIf,
    #[token("endsub", ignore(ascii_case))]
    EndSub,
    #[token("endwhile", ignore(ascii_case))]
    EndWhile,
    #[token("exit", ignore(ascii_case))]
    Exit,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("goto", ignore(ascii_case))]
    Goto,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("invalid", ignore(ascii_case))]
    Invalid,
    #[token("mod", ignore(ascii_case))]
    Mod,
    #[token("next", ignore(ascii_case))]
    Next,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("print", ignore(ascii_case))]
    Print,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("step", ignore(ascii_case))]
    Step,
    #[token("stop", ignore(ascii_case))]
    Stop,
    #[token("sub", ignore(ascii_case))]
    Sub,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("while", ignore(ascii_case))]
    While,

    // === Contextual keywords (superset constructs; not reserved) ===
    #[token("class", ignore(ascii_case))]
    Class,
    #[token("import", ignore(ascii_case))]
    Import,
    #[token("namespace", ignore(ascii_case))]
    Namespace,
    #[token("new", ignore(ascii_case))]
    New,

    // === Literals ===
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    FloatLiteral,
    #[regex(r"[0-9]+")]
    #[regex(r"&[hH][0-9a-fA-F]+")]
    IntegerLiteral,
    #[regex(r#""([^"\r\n]|"")*""#)]
    StringLiteral,

    /// Identifier with optional type-designator suffix (`count%`, `name$`).
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*[$%!#&]?")]
    Identifier,

    // === Operators and punctuation ===
    #[token("=")]
    Equal,
    #[token("<>")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("\\")]
    Backslash,
    #[token("^")]
    Caret,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("\\=")]
    BackslashEqual,
    #[token("<<=")]
    LeftShiftEqual,
    #[token(">>=")]
    RightShiftEqual,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("?")]
    Question,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,

    // === Trivia kept as tokens ===
    #[token("\n")]
    #[token("\r\n")]
    Newline,
    #[regex(r"'[^\r\n]*")]
    #[regex(r"(?i)rem([ \t][^\r\n]*)?", priority = 10)]
    Comment,

    /// End-of-file sentinel, appended by [`tokenize`].
    Eof,
}

impl TokenKind {
    /// True for reserved words that can never be used as identifiers.
    /// Contextual keywords (`class`, `import`, `namespace`, `new`) are not
    /// reserved.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::As
                | TokenKind::Dim
                | TokenKind::Each
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::End
                | TokenKind::EndFor
                | TokenKind::EndFunction
                | TokenKind::EndIf
                | TokenKind::EndSub
                | TokenKind::EndWhile
                | TokenKind::Exit
                | TokenKind::False
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::Goto
                | TokenKind::If
                | TokenKind::In
                | TokenKind::Invalid
                | TokenKind::Mod
                | TokenKind::Next
                | TokenKind::Not
                | TokenKind::Or
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Step
                | TokenKind::Stop
                | TokenKind::Sub
                | TokenKind::Then
                | TokenKind::To
                | TokenKind::True
                | TokenKind::While
        )
    }

    /// True for kinds the parser may accept in identifier position.
    pub fn is_identifier_like(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Class
                | TokenKind::Import
                | TokenKind::Namespace
                | TokenKind::New
        )
    }

    /// Short description for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of file",
            TokenKind::Identifier => "identifier",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Comment => "comment",
            TokenKind::Equal => "'='",
            TokenKind::NotEqual => "'<>'",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::LeftShift => "'<<'",
            TokenKind::RightShift => "'>>'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Backslash => "'\\'",
            TokenKind::Caret => "'^'",
            TokenKind::PlusEqual => "'+='",
            TokenKind::MinusEqual => "'-='",
            TokenKind::StarEqual => "'*='",
            TokenKind::SlashEqual => "'/='",
            TokenKind::BackslashEqual => "'\\='",
            TokenKind::LeftShiftEqual => "'<<='",
            TokenKind::RightShiftEqual => "'>>='",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Question => "'?'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::And => "'and'",
            TokenKind::As => "'as'",
            TokenKind::Dim => "'dim'",
            TokenKind::Each => "'each'",
            TokenKind::Else => "'else'",
            TokenKind::ElseIf => "'else if'",
            TokenKind::End => "'end'",
            TokenKind::EndFor => "'end for'",
            TokenKind::EndFunction => "'end function'",
            TokenKind::EndIf => "'end if'",
            TokenKind::EndSub => "'end sub'",
            TokenKind::EndWhile => "'end while'",
            TokenKind::Exit => "'exit'",
            TokenKind::False => "'false'",
            TokenKind::For => "'for'",
            TokenKind::Function => "'function'",
            TokenKind::Goto => "'goto'",
            TokenKind::If => "'if'",
            TokenKind::In => "'in'",
            TokenKind::Invalid => "'invalid'",
            TokenKind::Mod => "'mod'",
            TokenKind::Next => "'next'",
            TokenKind::Not => "'not'",
            TokenKind::Or => "'or'",
            TokenKind::Print => "'print'",
            TokenKind::Return => "'return'",
            TokenKind::Step => "'step'",
            TokenKind::Stop => "'stop'",
            TokenKind::Sub => "'sub'",
            TokenKind::Then => "'then'",
            TokenKind::To => "'to'",
            TokenKind::True => "'true'",
            TokenKind::While => "'while'",
            TokenKind::Class => "'class'",
            TokenKind::Import => "'import'",
            TokenKind::Namespace => "'namespace'",
            TokenKind::New => "'new'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A lexical token: kind, verbatim text, and source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub range: Range,
}

impl Token {
    pub fn is_reserved(&self) -> bool {
        self.kind.is_reserved()
    }
}

/// A lexical error. The code file turns these into parser-sourced
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub text: String,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnexpectedCharacter,
}

/// Tokenizer output.
#[derive(Debug, Clone, Default)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Byte-offset to line/character conversion.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        Position::new(line as u32, (offset - self.line_starts[line]) as u32)
    }

    fn range(&self, span: std::ops::Range<usize>) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }
}

/// Tokenize a source file.
///
/// A UTF-8 BOM is stripped before lexing; CRLF and LF line endings both
/// produce a single [`TokenKind::Newline`] token. The returned stream always
/// ends with an [`TokenKind::Eof`] sentinel whose range is the zero-length
/// range at the end of input.
pub fn tokenize(source: &str) -> LexResult {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let index = LineIndex::new(source);

    let mut result = LexResult::default();
    let mut lexer = TokenKind::lexer(source);

    while let Some(outcome) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice().to_string();
        match outcome {
            Ok(kind) => result.tokens.push(Token {
                kind,
                text,
                range: index.range(span),
            }),
            Err(()) => {
                let kind = if text.starts_with('"') {
                    LexErrorKind::UnterminatedString
                } else {
                    LexErrorKind::UnexpectedCharacter
                };
                result.errors.push(LexError {
                    kind,
                    text,
                    range: index.range(span),
                });
            }
        }
    }

    let end = index.position(source.len());
    result.tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        range: Range::new(end, end),
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_source_yields_eof() {
        let result = tokenize("");
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].kind, TokenKind::Eof);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_assignment_tokens() {
        assert_eq!(
            kinds("_ = []"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("FUNCTION Function function"),
            vec![
                TokenKind::Function,
                TokenKind::Function,
                TokenKind::Function,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newlines_are_tokens() {
        assert_eq!(
            kinds("x = 1\ny = 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::IntegerLiteral,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::IntegerLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_crlf_is_one_newline() {
        let result = tokenize("x = 1\r\ny = 2");
        let newlines: Vec<_> = result
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .collect();
        assert_eq!(newlines.len(), 1);
    }

    #[test]
    fn test_token_ranges() {
        let result = tokenize("x = [\n\n]");
        let open = &result.tokens[2];
        assert_eq!(open.kind, TokenKind::LeftBracket);
        assert_eq!(open.range, Range::of(0, 4, 0, 5));
        let close = &result.tokens[5];
        assert_eq!(close.kind, TokenKind::RightBracket);
        assert_eq!(close.range, Range::of(2, 0, 2, 1));
    }

    #[test]
    fn test_comment_tokens() {
        let result = tokenize("x = 1 ' trailing note\nrem whole line");
        let comments: Vec<_> = result
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .collect();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "' trailing note");
        assert_eq!(comments[1].text, "rem whole line");
    }

    #[test]
    fn test_rem_does_not_eat_identifiers() {
        assert_eq!(
            kinds("remove = 1"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::IntegerLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literal_with_escaped_quote() {
        let result = tokenize(r#"s = "say ""hi""""#);
        let string = result
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::StringLiteral)
            .unwrap();
        assert_eq!(string.text, r#""say ""hi""""#);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let result = tokenize("s = \"oops");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_hex_literal() {
        let result = tokenize("flags = &hFF");
        assert_eq!(result.tokens[2].kind, TokenKind::IntegerLiteral);
        assert_eq!(result.tokens[2].text, "&hFF");
    }

    #[test]
    fn test_type_designator_suffix() {
        let result = tokenize("count% = 0");
        assert_eq!(result.tokens[0].kind, TokenKind::Identifier);
        assert_eq!(result.tokens[0].text, "count%");
    }

    #[test]
    fn test_bom_is_stripped() {
        let result = tokenize("\u{feff}x = 1");
        assert_eq!(result.tokens[0].kind, TokenKind::Identifier);
        assert_eq!(result.tokens[0].range, Range::of(0, 0, 0, 1));
    }

    #[test]
    fn test_reserved_classification() {
        assert!(TokenKind::Function.is_reserved());
        assert!(TokenKind::While.is_reserved());
        assert!(!TokenKind::Class.is_reserved());
        assert!(!TokenKind::Namespace.is_reserved());
        assert!(!TokenKind::Identifier.is_reserved());
        assert!(TokenKind::Class.is_identifier_like());
    }
}
