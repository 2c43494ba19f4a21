//! Shape of the raw (lossless) syntax tree the semantic analyser consumes
//! (spec.md §6). Every node carries a [`SourceCode`] span.

use serde::Serialize;

use crate::source::SourceCode;

#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub globals: Vec<GlobalDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub enum GlobalDefinition {
    Type(TypeDefinition),
    Function(FunctionDefinition),
    Variables(VariablesDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Specifier {
    Native,
}

/// A raw reference to a type by name, with an optional trailing `&`.
#[derive(Debug, Clone, Serialize)]
pub struct TypeExpr {
    pub name: String,
    pub name_span: SourceCode,
    pub reference: bool,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub type_expr: TypeExpr,
    pub name: String,
    pub name_span: SourceCode,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub name_span: SourceCode,
    pub specifiers: Vec<(Specifier, SourceCode)>,
    pub members: Vec<Member>,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub enum Member {
    Field(FieldDefinition),
    Method(MethodDefinition),
    Constructor(ConstructorDefinition),
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDefinition {
    pub type_expr: TypeExpr,
    pub name: String,
    pub name_span: SourceCode,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodDefinition {
    pub specifiers: Vec<(Specifier, SourceCode)>,
    pub return_type: TypeExpr,
    pub name: String,
    pub name_span: SourceCode,
    pub params: Vec<Parameter>,
    pub body: Option<CodeBlock>,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorDefinition {
    pub specifiers: Vec<(Specifier, SourceCode)>,
    pub params: Vec<Parameter>,
    pub body: Option<CodeBlock>,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub specifiers: Vec<(Specifier, SourceCode)>,
    pub return_type: TypeExpr,
    pub name: String,
    pub name_span: SourceCode,
    /// Set when the source writes a stray `&` directly after the function
    /// name (`void foo&() {}`) — meaningless on a free function, since only
    /// types are referenced, never the function itself.
    pub reference_marker: Option<SourceCode>,
    pub params: Vec<Parameter>,
    pub body: Option<CodeBlock>,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclarator {
    pub name: String,
    pub name_span: SourceCode,
    pub initializer: Option<Expression>,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariablesDefinition {
    pub type_expr: TypeExpr,
    pub declarators: Vec<VariableDeclarator>,
    pub span: SourceCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Assign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Serialize)]
pub enum Expression {
    Paren(Box<Expression>, SourceCode),
    IntLiteral(String, SourceCode),
    DoubleLiteral(String, SourceCode),
    BoolLiteral(bool, SourceCode),
    SymbolReference(String, SourceCode),
    This(SourceCode),
    TypeReferencing(TypeExpr),
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        span: SourceCode,
    },
    MemberAccess {
        receiver: Box<Expression>,
        member: String,
        member_span: SourceCode,
        span: SourceCode,
    },
    Infix {
        op: InfixOp,
        op_span: SourceCode,
        left: Box<Expression>,
        right: Box<Expression>,
        span: SourceCode,
    },
    Prefix {
        op: PrefixOp,
        op_span: SourceCode,
        operand: Box<Expression>,
        span: SourceCode,
    },
    /// A node the parser could not make sense of; carries no further
    /// structure so the analyser can short-circuit on it without cascading.
    Malformed(SourceCode),
}

impl Expression {
    pub fn span(&self) -> SourceCode {
        match self {
            Expression::Paren(_, span)
            | Expression::IntLiteral(_, span)
            | Expression::DoubleLiteral(_, span)
            | Expression::BoolLiteral(_, span)
            | Expression::SymbolReference(_, span)
            | Expression::This(span)
            | Expression::Call { span, .. }
            | Expression::MemberAccess { span, .. }
            | Expression::Infix { span, .. }
            | Expression::Prefix { span, .. }
            | Expression::Malformed(span) => span.clone(),
            Expression::TypeReferencing(type_expr) => type_expr.span.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum Statement {
    Expression(Expression),
    Block(CodeBlock),
    VariableDefinition(VariablesDefinition),
    IfElse {
        condition: Expression,
        then_branch: CodeBlock,
        else_branch: Option<CodeBlock>,
        span: SourceCode,
    },
    While {
        condition: Expression,
        body: CodeBlock,
        span: SourceCode,
    },
    Return {
        value: Option<Expression>,
        span: SourceCode,
    },
}

impl Statement {
    pub fn span(&self) -> SourceCode {
        match self {
            Statement::Expression(expr) => expr.span(),
            Statement::Block(block) => block.span.clone(),
            Statement::VariableDefinition(def) => def.span.clone(),
            Statement::IfElse { span, .. } | Statement::While { span, .. } | Statement::Return { span, .. } => {
                span.clone()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeBlock {
    pub statements: Vec<Statement>,
    pub span: SourceCode,
}
