//! Statement nodes.

use super::expr::Expression;
use crate::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identifier with its source range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub text: String,
    pub range: Range,
}

impl Name {
    pub fn new(text: impl Into<String>, range: Range) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    /// Lower-cased lookup key.
    pub fn key(&self) -> String {
        self.text.to_lowercase()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A dotted name such as `Acme.Widgets.Spinner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DottedName {
    pub parts: Vec<Name>,
    pub range: Range,
}

impl DottedName {
    pub fn new(parts: Vec<Name>) -> Self {
        let range = match (parts.first(), parts.last()) {
            (Some(first), Some(last)) => first.range.union(&last.range),
            _ => Range::zero(),
        };
        Self { parts, range }
    }

    /// Full dotted text, case preserved.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Lower-cased dotted lookup key.
    pub fn key(&self) -> String {
        self.text().to_lowercase()
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// `sub` vs `function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionKind {
    Sub,
    Function,
}

/// A declared type annotation, e.g. `as integer` or `as function`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpression {
    pub text: String,
    pub range: Range,
}

impl TypeExpression {
    /// True when the annotation names a callable value type.
    pub fn is_function_type(&self) -> bool {
        self.text.eq_ignore_ascii_case("function")
    }
}

/// A function parameter. Parameters with a default expression are optional;
/// optional parameters follow required ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Name,
    pub type_expr: Option<TypeExpression>,
    pub default: Option<Expression>,
    pub range: Range,
}

impl Param {
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// A `sub`/`function` declaration. `name` is `None` for anonymous function
/// expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionStatement {
    pub kind: FunctionKind,
    pub name: Option<Name>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpression>,
    pub body: Vec<Statement>,
    pub range: Range,
}

impl FunctionStatement {
    /// Count of required parameters.
    pub fn min_params(&self) -> usize {
        self.params.iter().filter(|p| !p.is_optional()).count()
    }

    /// Total parameter count.
    pub fn max_params(&self) -> usize {
        self.params.len()
    }
}

/// Class member access level. Members default to public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessModifier {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessModifier::Public => write!(f, "public"),
            AccessModifier::Protected => write!(f, "protected"),
            AccessModifier::Private => write!(f, "private"),
        }
    }
}

/// A class field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassField {
    pub access: AccessModifier,
    pub name: Name,
    pub type_expr: Option<TypeExpression>,
    pub initializer: Option<Expression>,
    pub range: Range,
}

/// A class method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMethod {
    pub access: AccessModifier,
    pub is_override: bool,
    pub is_final: bool,
    pub func: FunctionStatement,
    pub range: Range,
}

impl ClassMethod {
    /// Method name; methods are always named.
    pub fn name(&self) -> &Name {
        self.func
            .name
            .as_ref()
            .unwrap_or_else(|| unreachable!("class methods always carry a name"))
    }
}

/// A `class ... end class` declaration (superset mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatement {
    pub name: Name,
    pub parent_name: Option<DottedName>,
    pub fields: Vec<ClassField>,
    pub methods: Vec<ClassMethod>,
    pub range: Range,
}

/// A `namespace ... end namespace` declaration (superset mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceStatement {
    pub name: DottedName,
    pub body: Vec<Statement>,
    pub range: Range,
}

/// An `import "pkg:/..."` statement (superset mode). `path` holds the
/// unquoted string content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatement {
    pub path: Name,
    pub range: Range,
}

/// Assignment to a plain identifier: `x = expr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStatement {
    pub name: Name,
    pub value: Expression,
    pub range: Range,
}

/// Assignment through a dotted or indexed target: `obj.x = expr`,
/// `arr[i] = expr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetStatement {
    pub target: Expression,
    pub value: Expression,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Vec<Statement>,
    pub else_ifs: Vec<(Expression, Vec<Statement>)>,
    pub else_branch: Option<Vec<Statement>>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    pub counter: Name,
    pub start: Expression,
    pub end: Expression,
    pub step: Option<Expression>,
    pub body: Vec<Statement>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachStatement {
    pub item: Name,
    pub collection: Expression,
    pub body: Vec<Statement>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintStatement {
    pub args: Vec<Expression>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub range: Range,
}

/// `dim name[dims]` array pre-allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimStatement {
    pub name: Name,
    pub dimensions: Vec<Expression>,
    pub range: Range,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    FunctionDeclaration(Box<FunctionStatement>),
    Namespace(Box<NamespaceStatement>),
    Class(Box<ClassStatement>),
    Import(ImportStatement),
    Assignment(Box<AssignmentStatement>),
    Set(Box<SetStatement>),
    Expression(Expression),
    If(Box<IfStatement>),
    While(Box<WhileStatement>),
    For(Box<ForStatement>),
    ForEach(Box<ForEachStatement>),
    Print(Box<PrintStatement>),
    Return(Box<ReturnStatement>),
    Dim(Box<DimStatement>),
    ExitWhile { range: Range },
    ExitFor { range: Range },
    Goto { range: Range },
    Stop { range: Range },
    End { range: Range },
}

impl Statement {
    /// The source range of this statement.
    pub fn range(&self) -> Range {
        match self {
            Statement::FunctionDeclaration(s) => s.range,
            Statement::Namespace(s) => s.range,
            Statement::Class(s) => s.range,
            Statement::Import(s) => s.range,
            Statement::Assignment(s) => s.range,
            Statement::Set(s) => s.range,
            Statement::Expression(e) => e.range(),
            Statement::If(s) => s.range,
            Statement::While(s) => s.range,
            Statement::For(s) => s.range,
            Statement::ForEach(s) => s.range,
            Statement::Print(s) => s.range,
            Statement::Return(s) => s.range,
            Statement::Dim(s) => s.range,
            Statement::ExitWhile { range }
            | Statement::ExitFor { range }
            | Statement::Goto { range }
            | Statement::Stop { range }
            | Statement::End { range } => *range,
        }
    }
}
