//! The typed expression/statement tree (spec.md §3's "Typed expression" and
//! "Statement" capability sets). Infix/prefix operators and `=` never get
//! their own node here: spec.md §4.4 desugars them to `MethodCall`s before
//! the tree is built, so the backend walker only ever sees calls.

use crate::sema::symbol::{CallableRef, OverloadSet, TypeRef, VariableRef};
use crate::source::SourceCode;

#[derive(Debug, Clone)]
pub enum TypedExpression {
    IntLiteral {
        value: i32,
        ty: TypeRef,
        site: SourceCode,
    },
    DoubleLiteral {
        value: f64,
        ty: TypeRef,
        site: SourceCode,
    },
    BoolLiteral {
        value: bool,
        ty: TypeRef,
        site: SourceCode,
    },
    /// A name resolving to a plain variable: yields a reference-typed result
    /// (spec.md's "VariableReference always yields a reference type").
    VariableReference {
        variable: VariableRef,
        ty: TypeRef,
        site: SourceCode,
    },
    /// A name resolving to a variable that is *already* reference-typed: no
    /// extra indirection is added.
    ReferenceVariableReference {
        variable: VariableRef,
        ty: TypeRef,
        site: SourceCode,
    },
    FunctionReference {
        function: CallableRef,
        ty: TypeRef,
        site: SourceCode,
    },
    OverloadedFunctionReference {
        overload_set: OverloadSet,
        ty: TypeRef,
        site: SourceCode,
    },
    /// `this` inside a method; reference-typed over the containing type.
    ThisReference {
        ty: TypeRef,
        site: SourceCode,
    },
    FunctionCall {
        callee: CallableRef,
        args: Vec<TypedExpression>,
        ty: TypeRef,
        site: SourceCode,
    },
    MethodCall {
        method: CallableRef,
        instance: Box<TypedExpression>,
        args: Vec<TypedExpression>,
        ty: TypeRef,
        site: SourceCode,
    },
    /// A cast `T(e)` resolved to a concrete conversion constructor/function.
    ConstructorCall {
        constructor: CallableRef,
        args: Vec<TypedExpression>,
        ty: TypeRef,
        site: SourceCode,
    },
    FieldAccess {
        instance: Box<TypedExpression>,
        field: VariableRef,
        ty: TypeRef,
        site: SourceCode,
    },
    /// Inserted explicitly whenever an rvalue is required from a
    /// reference-typed expression (spec.md §9: "keeps the back-end purely
    /// mechanical").
    ImplicitDereferencing {
        inner: Box<TypedExpression>,
        ty: TypeRef,
        site: SourceCode,
    },
    /// Type `unknownType`; propagates silently through every conversion
    /// check so one root-cause diagnostic doesn't cascade.
    Invalid {
        ty: TypeRef,
        site: SourceCode,
    },
}

impl TypedExpression {
    pub fn ty(&self) -> TypeRef {
        match self {
            TypedExpression::IntLiteral { ty, .. }
            | TypedExpression::DoubleLiteral { ty, .. }
            | TypedExpression::BoolLiteral { ty, .. }
            | TypedExpression::VariableReference { ty, .. }
            | TypedExpression::ReferenceVariableReference { ty, .. }
            | TypedExpression::FunctionReference { ty, .. }
            | TypedExpression::OverloadedFunctionReference { ty, .. }
            | TypedExpression::ThisReference { ty, .. }
            | TypedExpression::FunctionCall { ty, .. }
            | TypedExpression::MethodCall { ty, .. }
            | TypedExpression::ConstructorCall { ty, .. }
            | TypedExpression::FieldAccess { ty, .. }
            | TypedExpression::ImplicitDereferencing { ty, .. }
            | TypedExpression::Invalid { ty, .. } => ty.clone(),
        }
    }

    pub fn site(&self) -> SourceCode {
        match self {
            TypedExpression::IntLiteral { site, .. }
            | TypedExpression::DoubleLiteral { site, .. }
            | TypedExpression::BoolLiteral { site, .. }
            | TypedExpression::VariableReference { site, .. }
            | TypedExpression::ReferenceVariableReference { site, .. }
            | TypedExpression::FunctionReference { site, .. }
            | TypedExpression::OverloadedFunctionReference { site, .. }
            | TypedExpression::ThisReference { site, .. }
            | TypedExpression::FunctionCall { site, .. }
            | TypedExpression::MethodCall { site, .. }
            | TypedExpression::ConstructorCall { site, .. }
            | TypedExpression::FieldAccess { site, .. }
            | TypedExpression::ImplicitDereferencing { site, .. }
            | TypedExpression::Invalid { site, .. } => site.clone(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, TypedExpression::Invalid { .. })
    }
}

#[derive(Debug, Clone)]
pub enum TypedStatement {
    Expression(TypedExpression),
    Block(TypedCodeBlock),
    /// Synthesised at every variable-definition site (spec.md §4.5): picks
    /// the constructor overload that matches the initializer, if any.
    VariableConstructorCall {
        variable: VariableRef,
        constructor: Option<CallableRef>,
        args: Vec<TypedExpression>,
        site: SourceCode,
    },
    IfElse {
        condition: TypedExpression,
        then_branch: TypedCodeBlock,
        else_branch: Option<TypedCodeBlock>,
        site: SourceCode,
    },
    While {
        condition: TypedExpression,
        body: TypedCodeBlock,
        site: SourceCode,
    },
    Return {
        value: Option<TypedExpression>,
        site: SourceCode,
    },
}

/// Whether a statement unconditionally returns on every path through it
/// (spec.md §4.5's return-path analysis).
pub fn statement_always_returns(statement: &TypedStatement) -> bool {
    match statement {
        TypedStatement::Return { .. } => true,
        TypedStatement::Block(block) => block_always_returns(block),
        TypedStatement::IfElse {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => block_always_returns(then_branch) && block_always_returns(else_branch),
        _ => false,
    }
}

pub fn block_always_returns(block: &TypedCodeBlock) -> bool {
    block.statements.last().is_some_and(statement_always_returns)
}

#[derive(Debug, Clone, Default)]
pub struct TypedCodeBlock {
    pub statements: Vec<TypedStatement>,
}

impl TypedCodeBlock {
    pub fn empty() -> TypedCodeBlock {
        TypedCodeBlock { statements: vec![] }
    }
}
