//! Expression typing

use super::ops::{binary_type, expect, unary_type};
use super::{FunctionFrame, TypeChecker};
use crate::ast::{self, Expr, ExprKind, FieldInit, FunctionDecl};
use crate::environment::Scoped;
use crate::error::{Fault, Result};
use crate::token::{Literal, Span};
use crate::types::Type;
use crate::Value;

impl TypeChecker {
    /// Assign a type to `expr` and record it on the node.
    pub(super) fn check_expr(&mut self, expr: &Expr) -> Result<Type> {
        let ty = self.expr_type(expr)?;
        expr.set_resolved_type(ty.clone());
        Ok(ty)
    }

    fn expr_type(&mut self, expr: &Expr) -> Result<Type> {
        let span = expr.span();
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(literal_type(literal)),
            ExprKind::Grouping(inner) => self.check_expr(inner),
            ExprKind::Array(elements) => self.check_array(elements),
            ExprKind::Binary { left, op, right } => {
                let left = self.check_expr(left)?;
                let right = self.check_expr(right)?;
                binary_type(*op, &left, &right, span)
            }
            ExprKind::ShortCircuit { left, op, right } => {
                let subject = op.symbol();
                let left = self.check_expr(left)?;
                expect(subject, &left, &[Type::Bool], span)?;
                let right = self.check_expr(right)?;
                expect(subject, &right, &[Type::Bool], span)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.check_expr(operand)?;
                unary_type(*op, &operand, span)
            }
            ExprKind::Variable(name) => self.env.type_of(name).map_err(|e| e.at(span)),
            ExprKind::Function(decl) => self.check_function(decl, span),
            ExprKind::Call { callee, args } => self.check_call(callee, args, span),
            ExprKind::Index { collection, index } => {
                let collection = self.check_expr(collection)?;
                let element = match collection {
                    Type::Array(element) => *element,
                    other => {
                        return Err(Fault::type_fault(
                            format!("Cannot index into a value of type {}", other),
                            span,
                        ))
                    }
                };
                let index = self.check_expr(index)?;
                expect("index", &index, &[Type::Int], span)?;
                Ok(element)
            }
            ExprKind::Struct { name, fields } => self.check_struct_literal(name, fields, span),
            ExprKind::Property { object, field } => {
                let object = self.check_expr(object)?;
                self.field_type(&object, field, span)
            }
        }
    }

    /// `[a, b, c]` has the type of its first element; `[]` is `array<?>`.
    fn check_array(&mut self, elements: &[Expr]) -> Result<Type> {
        let Some((first, rest)) = elements.split_first() else {
            return Ok(Type::array(Type::Unresolved));
        };
        let element = self.check_expr(first)?;
        for expr in rest {
            let ty = self.check_expr(expr)?;
            self.require("array element", &ty, &element, expr.span())?;
        }
        Ok(Type::array(element))
    }

    /// Check a function literal's body and yield its signature.
    pub(super) fn check_function(&mut self, decl: &FunctionDecl, span: Span) -> Result<Type> {
        for param in &decl.params {
            self.validate_type(&param.ty, param.token.span)?;
        }
        self.validate_type(&decl.ret, span)?;

        let scope = self.env.child(decl.display_name());
        for param in &decl.params {
            scope
                .declare(param.name.clone(), param.ty.clone())
                .map_err(|e| e.at(param.token.span))?;
        }

        self.functions.push(FunctionFrame {
            ret: decl.ret.clone(),
            defer_depth: 0,
        });
        let body = {
            let mut checker = self.scope_guard(scope);
            checker.check_statements(&decl.body)
        };
        self.functions.pop();
        body?;

        if decl.ret != Type::Void && !ast::always_returns(&decl.body) {
            return Err(Fault::type_fault(
                format!(
                    "Function '{}' must return a value of type {} on every path",
                    decl.display_name(),
                    decl.ret
                ),
                span,
            ));
        }
        Ok(decl.signature())
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<Type> {
        let callee_type = self.check_expr(callee)?;
        match callee_type {
            Type::Func { params, ret } => {
                if params.len() != args.len() {
                    return Err(Fault::Argument {
                        expected: params.len(),
                        got: args.len(),
                        span,
                    });
                }
                for (position, (arg, param)) in args.iter().zip(&params).enumerate() {
                    let ty = self.check_expr(arg)?;
                    let subject = format!("argument {} of {}", position + 1, callee);
                    self.require(&subject, &ty, param, arg.span())?;
                }
                Ok(*ret)
            }
            Type::Any => {
                for arg in args {
                    self.check_expr(arg)?;
                }
                Ok(Type::Any)
            }
            other => Err(Fault::NotCallable {
                type_name: other.to_string(),
                span,
            }),
        }
    }

    /// `Name { field: value }`: only declared fields, each compatible, and
    /// every field that has neither a default nor a zero value supplied.
    fn check_struct_literal(
        &mut self,
        name: &str,
        fields: &[FieldInit],
        span: Span,
    ) -> Result<Type> {
        let def = self.lookup_struct(name, span)?;

        for (position, init) in fields.iter().enumerate() {
            let expected = def.field_type(&init.name).cloned().ok_or_else(|| {
                Fault::UndefinedField {
                    field: init.name.clone(),
                    type_name: name.to_string(),
                    span: init.token.span,
                }
            })?;
            if fields[..position].iter().any(|f| f.name == init.name) {
                return Err(Fault::type_fault(
                    format!("Field '{}' is initialised more than once", init.name),
                    init.token.span,
                ));
            }
            let ty = self.check_expr(&init.value)?;
            self.require(&init.name, &ty, &expected, init.value.span())?;
        }

        for field in &def.decl.fields {
            let supplied = fields.iter().any(|f| f.name == field.name);
            let has_default =
                field.initializer.is_some() || Value::zero(&field.ty).is_some();
            if !supplied && !has_default {
                return Err(Fault::type_fault(
                    format!("Missing value for field '{}' of {}", field.name, name),
                    span,
                ));
            }
        }

        Ok(Type::Struct(name.to_string()))
    }

    /// Type of `object.field` for an object of type `object`.
    pub(super) fn field_type(&self, object: &Type, field: &str, span: Span) -> Result<Type> {
        let name = match object {
            Type::Struct(name) => name,
            other => {
                return Err(Fault::type_fault(
                    format!("Cannot access property '{}' on a value of type {}", field, other),
                    span,
                ))
            }
        };
        let def = self.lookup_struct(name, span)?;
        def.field_type(field).cloned().ok_or_else(|| Fault::UndefinedField {
            field: field.to_string(),
            type_name: name.clone(),
            span,
        })
    }
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Int(_) => Type::Int,
        Literal::Real(_) => Type::Real,
        Literal::Str(_) => Type::String,
        Literal::Bool(_) => Type::Bool,
        Literal::None => Type::optional(Type::Unresolved),
        Literal::Type(_) => Type::Type,
    }
}
