//! Tree walking utilities.
//!
//! Shared pre-order traversal so analysis passes don't each re-implement
//! recursion. Visitors are plain `FnMut` closures; the few passes that need
//! to stop at function boundaries do their own targeted descent instead.

use super::expr::Expression;
use super::stmt::Statement;

/// Walk an expression tree in pre-order, calling `visitor` for every node.
pub fn walk_expr<V>(expr: &Expression, visitor: &mut V)
where
    V: FnMut(&Expression),
{
    visitor(expr);

    match expr {
        Expression::DottedGet { object, .. } => walk_expr(object, visitor),
        Expression::IndexedGet { object, index, .. } => {
            walk_expr(object, visitor);
            walk_expr(index, visitor);
        }
        Expression::Call { callee, args, .. } => {
            walk_expr(callee, visitor);
            for arg in args {
                walk_expr(arg, visitor);
            }
        }
        Expression::New { args, .. } => {
            for arg in args {
                walk_expr(arg, visitor);
            }
        }
        Expression::Unary { operand, .. } => walk_expr(operand, visitor),
        Expression::Binary { left, right, .. } => {
            walk_expr(left, visitor);
            walk_expr(right, visitor);
        }
        Expression::ArrayLiteral { elements, .. } => {
            for element in elements {
                walk_expr(element, visitor);
            }
        }
        Expression::AaLiteral { members, .. } => {
            for member in members {
                walk_expr(&member.value, visitor);
            }
        }
        Expression::Grouping { inner, .. } => walk_expr(inner, visitor),
        Expression::AnonymousFunction(func) => {
            for param in &func.params {
                if let Some(default) = &param.default {
                    walk_expr(default, visitor);
                }
            }
            walk_statements(&func.body, &mut |_| {}, visitor);
        }
        Expression::IntegerLiteral { .. }
        | Expression::FloatLiteral { .. }
        | Expression::StringLiteral { .. }
        | Expression::BooleanLiteral { .. }
        | Expression::InvalidLiteral { .. }
        | Expression::Identifier(_) => {}
    }
}

/// Walk a statement list in pre-order. `on_stmt` fires for every statement
/// (including nested bodies and function bodies), `on_expr` for every
/// expression node reached from those statements.
pub fn walk_statements<S, E>(statements: &[Statement], on_stmt: &mut S, on_expr: &mut E)
where
    S: FnMut(&Statement),
    E: FnMut(&Expression),
{
    for statement in statements {
        on_stmt(statement);
        match statement {
            Statement::FunctionDeclaration(func) => {
                for param in &func.params {
                    if let Some(default) = &param.default {
                        walk_expr(default, on_expr);
                    }
                }
                walk_statements(&func.body, on_stmt, on_expr);
            }
            Statement::Namespace(ns) => walk_statements(&ns.body, on_stmt, on_expr),
            Statement::Class(class) => {
                for field in &class.fields {
                    if let Some(init) = &field.initializer {
                        walk_expr(init, on_expr);
                    }
                }
                for method in &class.methods {
                    for param in &method.func.params {
                        if let Some(default) = &param.default {
                            walk_expr(default, on_expr);
                        }
                    }
                    walk_statements(&method.func.body, on_stmt, on_expr);
                }
            }
            Statement::Assignment(s) => walk_expr(&s.value, on_expr),
            Statement::Set(s) => {
                walk_expr(&s.target, on_expr);
                walk_expr(&s.value, on_expr);
            }
            Statement::Expression(e) => walk_expr(e, on_expr),
            Statement::If(s) => {
                walk_expr(&s.condition, on_expr);
                walk_statements(&s.then_branch, on_stmt, on_expr);
                for (condition, branch) in &s.else_ifs {
                    walk_expr(condition, on_expr);
                    walk_statements(branch, on_stmt, on_expr);
                }
                if let Some(branch) = &s.else_branch {
                    walk_statements(branch, on_stmt, on_expr);
                }
            }
            Statement::While(s) => {
                walk_expr(&s.condition, on_expr);
                walk_statements(&s.body, on_stmt, on_expr);
            }
            Statement::For(s) => {
                walk_expr(&s.start, on_expr);
                walk_expr(&s.end, on_expr);
                if let Some(step) = &s.step {
                    walk_expr(step, on_expr);
                }
                walk_statements(&s.body, on_stmt, on_expr);
            }
            Statement::ForEach(s) => {
                walk_expr(&s.collection, on_expr);
                walk_statements(&s.body, on_stmt, on_expr);
            }
            Statement::Print(s) => {
                for arg in &s.args {
                    walk_expr(arg, on_expr);
                }
            }
            Statement::Return(s) => {
                if let Some(value) = &s.value {
                    walk_expr(value, on_expr);
                }
            }
            Statement::Dim(s) => {
                for dim in &s.dimensions {
                    walk_expr(dim, on_expr);
                }
            }
            Statement::Import(_)
            | Statement::ExitWhile { .. }
            | Statement::ExitFor { .. }
            | Statement::Goto { .. }
            | Statement::Stop { .. }
            | Statement::End { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignmentStatement, Name};
    use crate::range::Range;

    #[test]
    fn test_walk_counts_calls_in_nested_expressions() {
        let call = |name: &str| Expression::Call {
            callee: Box::new(Expression::Identifier(Name::new(name, Range::zero()))),
            args: vec![],
            range: Range::zero(),
        };
        let expr = Expression::Binary {
            op: crate::ast::BinaryOp::Add,
            left: Box::new(call("a")),
            right: Box::new(Expression::ArrayLiteral {
                elements: vec![call("b")],
                range: Range::zero(),
            }),
            range: Range::zero(),
        };

        let mut count = 0;
        walk_expr(&expr, &mut |e| {
            if matches!(e, Expression::Call { .. }) {
                count += 1;
            }
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn test_walk_statements_reaches_assignment_value() {
        let statements = vec![Statement::Assignment(Box::new(AssignmentStatement {
            name: Name::new("x", Range::zero()),
            value: Expression::IntegerLiteral {
                value: 3,
                range: Range::zero(),
            },
            range: Range::zero(),
        }))];

        let mut saw_literal = false;
        walk_statements(&statements, &mut |_| {}, &mut |e| {
            if matches!(e, Expression::IntegerLiteral { value: 3, .. }) {
                saw_literal = true;
            }
        });
        assert!(saw_literal);
    }
}
