//! Statement validation

use std::rc::Rc;

use tracing::trace;

use super::ops::expect;
use super::TypeChecker;
use crate::ast::{Expr, Stmt, StmtKind, StructDecl, VarDecl};
use crate::environment::Scoped;
use crate::error::{Fault, Result};
use crate::token::Span;
use crate::types::Type;
use crate::value::StructDef;
use crate::Value;

impl TypeChecker {
    /// Validate one statement in the active scope.
    pub(super) fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        let span = stmt.span();
        trace!(line = span.line, column = span.column, "check");

        match &stmt.kind {
            StmtKind::Expression(expr) => self.check_expr(expr).map(|_| ()),
            StmtKind::VariableDeclaration(decl) => self.check_declaration(decl, false),
            StmtKind::StructDeclaration(decl) => self.check_struct(decl, span),
            StmtKind::Assignment { name, value } => {
                let declared = self.env.type_of(name).map_err(|e| e.at(span))?;
                if let Ok(Value::StructDef(_)) = self.env.lookup(name) {
                    return Err(Fault::type_fault(
                        format!("Cannot assign to struct type '{}'", name),
                        span,
                    ));
                }
                let ty = self.check_expr(value)?;
                self.require(name, &ty, &declared, value.span())
            }
            StmtKind::PropertyAssignment {
                object,
                field,
                value,
            } => {
                let object = self.check_expr(object)?;
                let declared = self.field_type(&object, field, span)?;
                let ty = self.check_expr(value)?;
                self.require(field, &ty, &declared, value.span())
            }
            StmtKind::While { condition, body } => {
                self.check_condition("while", condition)?;
                self.check_stmt(body)
            }
            StmtKind::Block(stmts) => {
                let scope = self.env.child("block");
                let mut checker = self.scope_guard(scope);
                checker.check_statements(stmts)
            }
            StmtKind::Defer(deferred) => self.check_defer(deferred, span),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition("if", condition)?;
                self.check_stmt(then_branch)?;
                match else_branch {
                    Some(otherwise) => self.check_stmt(otherwise),
                    None => Ok(()),
                }
            }
            StmtKind::With {
                declaration,
                then_branch,
                else_branch,
            } => {
                let scope = self.env.child("with");
                {
                    let mut checker = self.scope_guard(scope);
                    checker.check_declaration(declaration, false)?;
                    checker.check_stmt(then_branch)?;
                }
                match else_branch {
                    Some(otherwise) => self.check_stmt(otherwise),
                    None => Ok(()),
                }
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), span),
            StmtKind::TestAssert(condition) => self.check_condition("assert", condition),
        }
    }

    /// Validate statements in order, stopping at the first fault.
    pub(super) fn check_statements(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// `type name = initializer`.
    ///
    /// The name is declared before the initializer is checked, so a function
    /// literal may call itself. Struct fields may omit an initializer for any
    /// type; struct literals then have to supply the value.
    fn check_declaration(&mut self, decl: &VarDecl, is_field: bool) -> Result<()> {
        let span = decl.token.span;
        self.validate_type(&decl.ty, span)?;
        if decl.ty == Type::Void {
            return Err(Fault::type_fault(
                format!("'{}' cannot be declared void", decl.name),
                span,
            ));
        }
        self.env
            .declare(decl.name.clone(), decl.ty.clone())
            .map_err(|e| e.at(span))?;

        match &decl.initializer {
            Some(init) => {
                let ty = self.check_expr(init)?;
                self.require(&decl.name, &ty, &decl.ty, init.span())
            }
            None if is_field || Value::zero(&decl.ty).is_some() => Ok(()),
            None => Err(Fault::type_fault(
                format!(
                    "'{}' of type {} needs an initial value",
                    decl.name, decl.ty
                ),
                span,
            )),
        }
    }

    /// `struct Name { fields }`: register the type, then check each field
    /// declaration in a scope of its own.
    fn check_struct(&mut self, decl: &Rc<StructDecl>, span: Span) -> Result<()> {
        let def = StructDef::new(Rc::clone(decl), self.env.clone());
        self.env
            .define(decl.name.clone(), Value::StructDef(Rc::new(def)), Type::Type)
            .map_err(|e| e.at(span))?;

        let scope = self.env.child(decl.name.clone());
        let mut checker = self.scope_guard(scope);
        for field in &decl.fields {
            checker.check_declaration(field, true)?;
        }
        Ok(())
    }

    fn check_defer(&mut self, deferred: &Stmt, span: Span) -> Result<()> {
        match self.functions.last_mut() {
            Some(frame) => frame.defer_depth += 1,
            None => return Err(Fault::scope("Cannot defer outside of a function", span)),
        }
        let result = self.check_stmt(deferred);
        if let Some(frame) = self.functions.last_mut() {
            frame.defer_depth -= 1;
        }
        result
    }

    /// Every `return` must match the enclosing function's declared type.
    fn check_return(&mut self, value: Option<&Expr>, span: Span) -> Result<()> {
        let (ret, deferring) = match self.functions.last() {
            Some(frame) => (frame.ret.clone(), frame.defer_depth > 0),
            None => {
                return Err(Fault::scope(
                    "Cannot return from outside of a function",
                    span,
                ))
            }
        };
        if deferring {
            return Err(Fault::scope(
                "Cannot return from within a deferred statement",
                span,
            ));
        }

        match value {
            Some(expr) => {
                let ty = self.check_expr(expr)?;
                if ret == Type::Void {
                    return Err(Fault::mismatch("return value", &[Type::Void], &ty, expr.span()));
                }
                self.require("return value", &ty, &ret, expr.span())
            }
            None if ret == Type::Void => Ok(()),
            None => Err(Fault::mismatch("return value", &[ret], &Type::Void, span)),
        }
    }

    fn check_condition(&mut self, subject: &str, condition: &Expr) -> Result<()> {
        let ty = self.check_expr(condition)?;
        expect(subject, &ty, &[Type::Bool], condition.span()).map(|_| ())
    }
}
