//! Statement and expression trees.
//!
//! AST nodes are closed sums: consumers match exhaustively, so adding a new
//! node kind is a compile error at every consumer rather than a silently
//! unhandled case. Every node carries the range from its first to its last
//! consumed token.

mod expr;
mod stmt;
pub mod walk;

pub use expr::{AaMember, BinaryOp, Expression, UnaryOp};
pub use stmt::{
    AccessModifier, AssignmentStatement, ClassField, ClassMethod, ClassStatement, DimStatement,
    DottedName, ForEachStatement, ForStatement, FunctionKind, FunctionStatement, IfStatement,
    ImportStatement, Name, NamespaceStatement, Param, PrintStatement, ReturnStatement,
    SetStatement, Statement, TypeExpression, WhileStatement,
};
