//! Raw syntax tree builder (spec.md §1, §6: an external collaborator of the
//! core). Hand-rolled recursive descent over the [`crate::lexer`]'s token
//! stream, grounded in the shape of the teacher's combinator-based
//! `src/parser/combinators.rs` (peek/expect/recover helpers) but without its
//! generic `Combinator` trait machinery, since CO's grammar is small enough
//! to write directly.

pub mod raw;

use std::rc::Rc;

use crate::{
    diagnostics::{Diagnostics, Issue},
    lexer::{Token, TokenKind},
    source::SourceCode,
};
use raw::*;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Diagnostics,
    issues: Vec<Issue>,
    file: Rc<str>,
}

impl Parser {
    pub fn new(file: impl Into<Rc<str>>, tokens: Vec<Token>, diagnostics: Diagnostics) -> Parser {
        Parser {
            tokens,
            pos: 0,
            diagnostics,
            issues: vec![],
            file: file.into(),
        }
    }

    pub fn parse(mut self) -> (Program, Vec<Issue>) {
        let mut globals = vec![];
        while !self.at_eof() {
            let before = self.pos;
            match self.parse_global() {
                Some(global) => globals.push(global),
                None => {
                    // Always make progress, even on total garbage, so a
                    // malformed file can't hang the parser.
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        (Program { globals }, self.issues)
    }

    // ---- token plumbing ---------------------------------------------------

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn here(&self) -> SourceCode {
        self.peek().span.before()
    }

    /// Consume a required token, reporting `MissingClosingDelimiter` if it's
    /// one of the closing-bracket kinds, `MissingNode` otherwise.
    fn expect(&mut self, kind: TokenKind, what: &str) -> SourceCode {
        if let Some(token) = self.eat(&kind) {
            return token.span;
        }
        let at = self.here();
        let description = kind.describe();
        let issue = match kind {
            TokenKind::RBrace | TokenKind::RParen => self.diagnostics.missing_closing_delimiter(at.clone(), &description),
            _ => self.diagnostics.missing_node(at.clone(), what),
        };
        self.issues.push(issue);
        at
    }

    /// Consume an identifier, tolerating a keyword spelled where a name is
    /// expected (`KeywordUsedAsIdentifier`) so parsing can keep going.
    fn expect_identifier(&mut self) -> (String, SourceCode) {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                (name, span)
            }
            other if TokenKind::keyword(&other.describe()).is_some() => {
                let span = self.advance().span;
                self.issues
                    .push(self.diagnostics.keyword_used_as_identifier(span.clone(), &other.describe()));
                (other.describe(), span)
            }
            _ => {
                let at = self.here();
                self.issues.push(self.diagnostics.missing_node(at.clone(), "an identifier"));
                (String::new(), at)
            }
        }
    }

    // ---- globals ------------------------------------------------------------

    fn parse_specifiers(&mut self) -> Vec<(Specifier, SourceCode)> {
        let mut specifiers = vec![];
        while let TokenKind::KwNative = self.peek().kind {
            let span = self.advance().span;
            specifiers.push((Specifier::Native, span));
        }
        specifiers
    }

    fn parse_global(&mut self) -> Option<GlobalDefinition> {
        if self.check(&TokenKind::KwType) {
            return self.parse_type_definition().map(GlobalDefinition::Type);
        }

        let specifiers = self.parse_specifiers();
        let start = specifiers.first().map(|(_, s)| s.clone()).unwrap_or_else(|| self.here());

        if !self.looks_like_type_expr() {
            let at = self.here();
            self.issues.push(self.diagnostics.malformed_node(at, "a global definition"));
            return None;
        }

        let type_expr = self.parse_type_expr();
        let (name, name_span) = self.expect_identifier();
        let reference_marker = self.eat(&TokenKind::Amp).map(|t| t.span);

        if self.check(&TokenKind::LParen) {
            let function = self.parse_function_tail(specifiers, type_expr, name, name_span, reference_marker, start);
            Some(GlobalDefinition::Function(function))
        } else {
            let variables = self.parse_variables_tail(type_expr, start);
            Some(GlobalDefinition::Variables(variables))
        }
    }

    fn looks_like_type_expr(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Identifier(_) | TokenKind::KwVoid | TokenKind::KwBool | TokenKind::KwInt | TokenKind::KwDouble
        )
    }

    fn parse_type_expr(&mut self) -> TypeExpr {
        let (name, name_span) = match self.peek().kind.clone() {
            TokenKind::KwVoid => (String::from("void"), self.advance().span),
            TokenKind::KwBool => (String::from("bool"), self.advance().span),
            TokenKind::KwInt => (String::from("int"), self.advance().span),
            TokenKind::KwDouble => (String::from("double"), self.advance().span),
            _ => self.expect_identifier(),
        };
        let reference = self.eat(&TokenKind::Amp).is_some();
        let span = if reference {
            name_span.concat(&self.tokens[self.pos - 1].span)
        } else {
            name_span.clone()
        };
        TypeExpr {
            name,
            name_span,
            reference,
            span,
        }
    }

    fn parse_params(&mut self) -> Vec<Parameter> {
        let mut params = vec![];
        self.expect(TokenKind::LParen, "(");
        if !self.check(&TokenKind::RParen) {
            loop {
                let type_expr = self.parse_type_expr();
                let (name, name_span) = self.expect_identifier();
                let span = type_expr.span.concat(&name_span);
                params.push(Parameter {
                    type_expr,
                    name,
                    name_span,
                    span,
                });
                if self.eat(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")");
        params
    }

    fn parse_function_tail(
        &mut self,
        specifiers: Vec<(Specifier, SourceCode)>,
        return_type: TypeExpr,
        name: String,
        name_span: SourceCode,
        reference_marker: Option<SourceCode>,
        start: SourceCode,
    ) -> FunctionDefinition {
        let params = self.parse_params();
        let body = self.parse_optional_body();
        let end = body
            .as_ref()
            .map(|b| b.span.clone())
            .unwrap_or_else(|| self.expect(TokenKind::Semicolon, ";"));
        FunctionDefinition {
            specifiers,
            return_type,
            name,
            name_span,
            reference_marker,
            params,
            body,
            span: start.concat(&end),
        }
    }

    fn parse_optional_body(&mut self) -> Option<CodeBlock> {
        if self.check(&TokenKind::LBrace) {
            Some(self.parse_block())
        } else {
            None
        }
    }

    fn parse_variables_tail(&mut self, type_expr: TypeExpr, start: SourceCode) -> VariablesDefinition {
        let mut declarators = vec![];
        loop {
            let (name, name_span) = self.expect_identifier();
            let mut span = name_span.clone();
            let initializer = if let Some(eq) = self.eat(&TokenKind::Assign) {
                match self.parse_expression_required() {
                    Some(expr) => {
                        span = span.concat(&expr.span());
                        Some(expr)
                    }
                    None => {
                        self.issues.push(self.diagnostics.missing_variable_initializer(eq.span.after()));
                        None
                    }
                }
            } else {
                None
            };
            declarators.push(VariableDeclarator {
                name,
                name_span,
                initializer,
                span,
            });
            if self.eat(&TokenKind::Comma).is_none() {
                break;
            }
        }
        let end = self.expect(TokenKind::Semicolon, ";");
        VariablesDefinition {
            type_expr,
            declarators,
            span: start.concat(&end),
        }
    }

    // ---- type definitions ---------------------------------------------------

    fn parse_type_definition(&mut self) -> Option<TypeDefinition> {
        let start = self.advance().span; // `type`
        let (name, name_span) = self.expect_identifier();
        self.expect(TokenKind::LBrace, "{");

        let mut members = vec![];
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            if let Some(member) = self.parse_member(&name) {
                members.push(member);
            }
            if self.pos == before {
                self.advance();
            }
        }
        let end = self.expect(TokenKind::RBrace, "}");

        Some(TypeDefinition {
            name,
            name_span,
            specifiers: vec![],
            members,
            span: start.concat(&end),
        })
    }

    fn parse_member(&mut self, container_name: &str) -> Option<Member> {
        let specifiers = self.parse_specifiers();
        let start = specifiers.first().map(|(_, s)| s.clone()).unwrap_or_else(|| self.here());

        let is_constructor = matches!(&self.peek().kind, TokenKind::Identifier(name) if name == container_name)
            && matches!(self.peek_at(1).kind, TokenKind::LParen);

        if is_constructor {
            self.advance();
            let params = self.parse_params();
            let body = self.parse_optional_body();
            let end = body
                .as_ref()
                .map(|b| b.span.clone())
                .unwrap_or_else(|| self.expect(TokenKind::Semicolon, ";"));
            return Some(Member::Constructor(ConstructorDefinition {
                specifiers,
                params,
                body,
                span: start.concat(&end),
            }));
        }

        if !self.looks_like_type_expr() {
            let at = self.here();
            self.issues.push(self.diagnostics.malformed_node(at, "a member definition"));
            return None;
        }

        let type_expr = self.parse_type_expr();
        let (name, name_span) = self.expect_identifier();

        if self.check(&TokenKind::LParen) {
            let params = self.parse_params();
            let body = self.parse_optional_body();
            let end = body
                .as_ref()
                .map(|b| b.span.clone())
                .unwrap_or_else(|| self.expect(TokenKind::Semicolon, ";"));
            Some(Member::Method(MethodDefinition {
                specifiers,
                return_type: type_expr,
                name,
                name_span,
                params,
                body,
                span: start.concat(&end),
            }))
        } else {
            let end = self.expect(TokenKind::Semicolon, ";");
            Some(Member::Field(FieldDefinition {
                type_expr,
                name,
                name_span,
                span: start.concat(&end),
            }))
        }
    }

    // ---- statements -----------------------------------------------------

    fn parse_block(&mut self) -> CodeBlock {
        let start = self.expect(TokenKind::LBrace, "{");
        let mut statements = vec![];
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let before = self.pos;
            statements.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        let end = self.expect(TokenKind::RBrace, "}");
        CodeBlock {
            statements,
            span: start.concat(&end),
        }
    }

    fn parse_statement(&mut self) -> Statement {
        match &self.peek().kind {
            TokenKind::LBrace => Statement::Block(self.parse_block()),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwReturn => self.parse_return(),
            _ if self.looks_like_variable_definition() => {
                let start = self.here();
                let type_expr = self.parse_type_expr();
                let def = self.parse_variables_tail(type_expr, start);
                Statement::VariableDefinition(def)
            }
            _ => {
                let expr = self.parse_expression_required().unwrap_or_else(|| {
                    let at = self.here();
                    self.issues.push(self.diagnostics.missing_operand(at.clone(), "<statement>"));
                    Expression::Malformed(at)
                });
                self.expect(TokenKind::Semicolon, ";");
                Statement::Expression(expr)
            }
        }
    }

    /// A variable definition starts with a type name that is *not* itself a
    /// call or member-access expression: `Foo x = ...;` vs. `foo(x);`. We
    /// look one token ahead: a bare/reference type followed by an
    /// identifier (not `(` or `.`) signals a declaration.
    fn looks_like_variable_definition(&self) -> bool {
        if !self.looks_like_type_expr() {
            return false;
        }
        let mut offset = 1;
        if self.peek_at(offset).kind == TokenKind::Amp {
            offset += 1;
        }
        matches!(self.peek_at(offset).kind, TokenKind::Identifier(_))
    }

    fn parse_if(&mut self) -> Statement {
        let start = self.advance().span; // `if`
        self.expect(TokenKind::LParen, "(");
        let condition = self.parse_expression_required().unwrap_or(Expression::Malformed(self.here()));
        self.expect(TokenKind::RParen, ")");
        let then_branch = self.parse_block();
        let mut span = start.concat(&then_branch.span);
        let else_branch = if self.eat(&TokenKind::KwElse).is_some() {
            let block = self.parse_block();
            span = span.concat(&block.span);
            Some(block)
        } else {
            None
        };
        Statement::IfElse {
            condition,
            then_branch,
            else_branch,
            span,
        }
    }

    fn parse_while(&mut self) -> Statement {
        let start = self.advance().span; // `while`
        self.expect(TokenKind::LParen, "(");
        let condition = self.parse_expression_required().unwrap_or(Expression::Malformed(self.here()));
        self.expect(TokenKind::RParen, ")");
        let body = self.parse_block();
        let span = start.concat(&body.span);
        Statement::While { condition, body, span }
    }

    fn parse_return(&mut self) -> Statement {
        let start = self.advance().span; // `return`
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            self.parse_expression_required()
        };
        let end = self.expect(TokenKind::Semicolon, ";");
        Statement::Return {
            value,
            span: start.concat(&end),
        }
    }

    // ---- expressions ------------------------------------------------------

    /// Parses an expression, reporting `MissingOperand` if none is present.
    fn parse_expression_required(&mut self) -> Option<Expression> {
        let expr = self.parse_binary(0);
        if let Expression::Malformed(span) = &expr {
            self.issues.push(self.diagnostics.missing_operand(span.clone(), "<expression>"));
            return None;
        }
        Some(expr)
    }

    fn infix_info(kind: &TokenKind) -> Option<(InfixOp, u8, bool)> {
        Some(match kind {
            TokenKind::Star => (InfixOp::Mul, 70, false),
            TokenKind::Slash => (InfixOp::Div, 70, false),
            TokenKind::Plus => (InfixOp::Add, 60, false),
            TokenKind::Minus => (InfixOp::Sub, 60, false),
            TokenKind::Lt => (InfixOp::Lt, 50, false),
            TokenKind::Gt => (InfixOp::Gt, 50, false),
            TokenKind::Le => (InfixOp::Le, 50, false),
            TokenKind::Ge => (InfixOp::Ge, 50, false),
            TokenKind::EqEq => (InfixOp::Eq, 40, false),
            TokenKind::NotEq => (InfixOp::Ne, 40, false),
            TokenKind::AndAnd => (InfixOp::And, 30, false),
            TokenKind::OrOr => (InfixOp::Or, 20, false),
            TokenKind::Assign => (InfixOp::Assign, 10, true),
            _ => return None,
        })
    }

    /// Precedence-climbing binary-expression parser (spec.md §6's table).
    /// The operand parsed for the right-hand side of an infix operator is
    /// allowed to come back `Malformed` without us reporting anything here:
    /// that becomes the semantic analyser's `MissingRightOperand` once it
    /// sees an `Infix` node whose right side carries no real structure.
    fn parse_binary(&mut self, min_prec: u8) -> Expression {
        let mut left = self.parse_unary();
        loop {
            let Some((op, prec, right_assoc)) = Self::infix_info(&self.peek().kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let op_span = self.advance().span;
            let next_min = if right_assoc { prec } else { prec + 1 };
            let right = self.parse_binary(next_min);
            let span = left.span().concat(&right.span());
            left = Expression::Infix {
                op,
                op_span,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expression {
        match &self.peek().kind {
            TokenKind::Bang => {
                let op_span = self.advance().span;
                let operand = self.parse_unary();
                let span = op_span.concat(&operand.span());
                Expression::Prefix {
                    op: PrefixOp::Not,
                    op_span,
                    operand: Box::new(operand),
                    span,
                }
            }
            TokenKind::Minus => {
                let op_span = self.advance().span;
                let operand = self.parse_unary();
                let span = op_span.concat(&operand.span());
                Expression::Prefix {
                    op: PrefixOp::Neg,
                    op_span,
                    operand: Box::new(operand),
                    span,
                }
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Expression {
        let mut expr = self.parse_primary();
        loop {
            match &self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let (member, member_span) = self.expect_identifier();
                    let span = expr.span().concat(&member_span);
                    expr = Expression::MemberAccess {
                        receiver: Box::new(expr),
                        member,
                        member_span,
                        span,
                    };
                }
                TokenKind::LParen => {
                    let args = self.parse_args();
                    let end = self.tokens[self.pos - 1].span.clone();
                    let span = expr.span().concat(&end);
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_args(&mut self) -> Vec<Expression> {
        self.expect(TokenKind::LParen, "(");
        let mut args = vec![];
        if !self.check(&TokenKind::RParen) {
            loop {
                if let Some(arg) = self.parse_expression_required() {
                    args.push(arg);
                }
                if self.eat(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")");
        args
    }

    fn parse_primary(&mut self) -> Expression {
        match self.peek().kind.clone() {
            TokenKind::IntLiteral(text) => {
                let span = self.advance().span;
                Expression::IntLiteral(text, span)
            }
            TokenKind::DoubleLiteral(text) => {
                let span = self.advance().span;
                Expression::DoubleLiteral(text, span)
            }
            TokenKind::KwTrue => {
                let span = self.advance().span;
                Expression::BoolLiteral(true, span)
            }
            TokenKind::KwFalse => {
                let span = self.advance().span;
                Expression::BoolLiteral(false, span)
            }
            TokenKind::KwThis => {
                let span = self.advance().span;
                Expression::This(span)
            }
            TokenKind::KwVoid | TokenKind::KwBool | TokenKind::KwInt | TokenKind::KwDouble => {
                Expression::TypeReferencing(self.parse_type_expr())
            }
            TokenKind::Identifier(name) => {
                // Could be a plain symbol reference or a type reference
                // used as a cast target (`T(e)`); the parser doesn't need
                // to disambiguate — the semantic analyser resolves `name`
                // and decides whether the surrounding `Call` is a cast.
                let span = self.advance().span;
                if self.check(&TokenKind::Amp) {
                    let amp = self.advance().span;
                    Expression::TypeReferencing(TypeExpr {
                        name,
                        name_span: span.clone(),
                        reference: true,
                        span: span.concat(&amp),
                    })
                } else {
                    Expression::SymbolReference(name, span)
                }
            }
            TokenKind::LParen => {
                let start = self.advance().span;
                let inner = self.parse_expression_required().unwrap_or(Expression::Malformed(self.here()));
                let end = self.expect(TokenKind::RParen, ")");
                Expression::Paren(Box::new(inner), start.concat(&end))
            }
            _ => Expression::Malformed(self.here()),
        }
    }
}

/// Convenience: lex and parse a whole file in one call.
pub fn parse_source(file: impl Into<Rc<str>>, source: &str, diagnostics: Diagnostics) -> (Program, Vec<Issue>) {
    let file = file.into();
    let (tokens, mut issues) = crate::lexer::Lexer::new(file.clone(), source, diagnostics).lex();
    let (program, parse_issues) = Parser::new(file, tokens, diagnostics).parse();
    issues.extend(parse_issues);
    (program, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Locale;

    fn parse(source: &str) -> (Program, Vec<Issue>) {
        parse_source("test.co", source, Diagnostics::new(Locale::En))
    }

    #[test]
    fn parses_a_function_with_a_variable_and_a_call() {
        let (program, issues) = parse("void main() { int x = 5; writeIntLn(x); }");
        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(program.globals.len(), 1);
        let GlobalDefinition::Function(main) = &program.globals[0] else {
            panic!("expected a function");
        };
        assert_eq!(main.name, "main");
        let body = main.body.as_ref().unwrap();
        assert_eq!(body.statements.len(), 2);
    }

    #[test]
    fn parses_a_type_with_a_constructor_and_method() {
        let (program, issues) = parse(
            "type Point { int x; int y; Point(int x, int y) { this.x = x; this.y = y; } int sum() { return this.x + this.y; } }",
        );
        assert!(issues.is_empty(), "{issues:?}");
        let GlobalDefinition::Type(point) = &program.globals[0] else {
            panic!("expected a type");
        };
        assert_eq!(point.members.len(), 4);
    }

    #[test]
    fn reports_missing_variable_initializer() {
        let (_, issues) = parse("void main() { int x = ; }");
        assert!(issues.iter().any(|i| i.code.to_string() == "E0005"));
    }

    #[test]
    fn respects_operator_precedence() {
        let (program, issues) = parse("int a = 1 + 2 * 3;");
        assert!(issues.is_empty(), "{issues:?}");
        let GlobalDefinition::Variables(def) = &program.globals[0] else {
            panic!("expected variables");
        };
        let Some(Expression::Infix { op: InfixOp::Add, right, .. }) = &def.declarators[0].initializer else {
            panic!("expected a top-level addition");
        };
        assert!(matches!(**right, Expression::Infix { op: InfixOp::Mul, .. }));
    }

    #[test]
    fn assignment_is_right_associative_and_desugarable() {
        let (program, issues) = parse("void main() { int x = 0; x = 5; }");
        assert!(issues.is_empty(), "{issues:?}");
        let GlobalDefinition::Function(main) = &program.globals[0] else {
            panic!("expected a function");
        };
        let body = main.body.as_ref().unwrap();
        assert!(matches!(
            &body.statements[1],
            Statement::Expression(Expression::Infix { op: InfixOp::Assign, .. })
        ));
    }
}
