//! Expression nodes.

use super::stmt::{DottedName, FunctionStatement, Name};
use crate::range::Range;
use serde::{Deserialize, Serialize};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Not,
}

/// Binary operators, loosest to tightest: `or`, `and`, comparisons,
/// shifts, additive, multiplicative, exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    ShiftLeft,
    ShiftRight,
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
}

/// One `key: value` entry of an associative-array literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AaMember {
    pub key: Name,
    pub value: Expression,
    pub range: Range,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    IntegerLiteral {
        value: i64,
        range: Range,
    },
    FloatLiteral {
        value: f64,
        range: Range,
    },
    StringLiteral {
        value: String,
        range: Range,
    },
    BooleanLiteral {
        value: bool,
        range: Range,
    },
    InvalidLiteral {
        range: Range,
    },
    Identifier(Name),
    DottedGet {
        object: Box<Expression>,
        name: Name,
        range: Range,
    },
    IndexedGet {
        object: Box<Expression>,
        index: Box<Expression>,
        range: Range,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        range: Range,
    },
    New {
        class_name: DottedName,
        args: Vec<Expression>,
        range: Range,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        range: Range,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        range: Range,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        range: Range,
    },
    AaLiteral {
        members: Vec<AaMember>,
        range: Range,
    },
    Grouping {
        inner: Box<Expression>,
        range: Range,
    },
    AnonymousFunction(Box<FunctionStatement>),
}

impl Expression {
    /// The source range of this expression.
    pub fn range(&self) -> Range {
        match self {
            Expression::IntegerLiteral { range, .. }
            | Expression::FloatLiteral { range, .. }
            | Expression::StringLiteral { range, .. }
            | Expression::BooleanLiteral { range, .. }
            | Expression::InvalidLiteral { range }
            | Expression::DottedGet { range, .. }
            | Expression::IndexedGet { range, .. }
            | Expression::Call { range, .. }
            | Expression::New { range, .. }
            | Expression::Unary { range, .. }
            | Expression::Binary { range, .. }
            | Expression::ArrayLiteral { range, .. }
            | Expression::AaLiteral { range, .. }
            | Expression::Grouping { range, .. } => *range,
            Expression::Identifier(name) => name.range,
            Expression::AnonymousFunction(func) => func.range,
        }
    }

    /// When this expression is a plain or dotted identifier chain
    /// (`foo`, `Acme.Widgets.spin`), return its full dotted text and the
    /// range covering the chain. Call-site collection uses this to turn a
    /// callee expression into a name.
    pub fn as_dotted_name(&self) -> Option<(String, Range)> {
        match self {
            Expression::Identifier(name) => Some((name.text.clone(), name.range)),
            Expression::DottedGet { object, name, .. } => {
                let (base, base_range) = object.as_dotted_name()?;
                Some((
                    format!("{}.{}", base, name.text),
                    base_range.union(&name.range),
                ))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str, range: Range) -> Expression {
        Expression::Identifier(Name::new(text, range))
    }

    #[test]
    fn test_as_dotted_name_plain() {
        let expr = ident("doThing", Range::of(1, 4, 1, 11));
        let (name, range) = expr.as_dotted_name().unwrap();
        assert_eq!(name, "doThing");
        assert_eq!(range, Range::of(1, 4, 1, 11));
    }

    #[test]
    fn test_as_dotted_name_chain() {
        let expr = Expression::DottedGet {
            object: Box::new(Expression::DottedGet {
                object: Box::new(ident("Acme", Range::of(0, 0, 0, 4))),
                name: Name::new("Widgets", Range::of(0, 5, 0, 12)),
                range: Range::of(0, 0, 0, 12),
            }),
            name: Name::new("spin", Range::of(0, 13, 0, 17)),
            range: Range::of(0, 0, 0, 17),
        };
        let (name, range) = expr.as_dotted_name().unwrap();
        assert_eq!(name, "Acme.Widgets.spin");
        assert_eq!(range, Range::of(0, 0, 0, 17));
    }

    #[test]
    fn test_as_dotted_name_rejects_computed_base() {
        let expr = Expression::DottedGet {
            object: Box::new(Expression::Call {
                callee: Box::new(ident("getObj", Range::zero())),
                args: vec![],
                range: Range::zero(),
            }),
            name: Name::new("method", Range::zero()),
            range: Range::zero(),
        };
        assert!(expr.as_dotted_name().is_none());
    }
}
