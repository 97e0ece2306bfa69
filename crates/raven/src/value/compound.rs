//! Compound value types: arrays, struct types and struct instances

use std::rc::Rc;

use indexmap::IndexMap;

use super::Value;
use crate::ast::StructDecl;
use crate::environment::Environment;
use crate::types::Type;

/// An immutable array and its element type.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    /// Elements in order
    pub elements: Vec<Value>,

    /// Declared or inferred element type (a placeholder for `[]`)
    pub element_type: Type,
}

/// A registered struct type.
///
/// Both passes bind one of these to the struct's name in the scope where the
/// struct is declared. Default-value expressions are evaluated against
/// `scope` each time an instance is created.
#[derive(Debug)]
pub struct StructDef {
    /// The declaration, including default-value expressions
    pub decl: Rc<StructDecl>,

    /// Field name to declared type, in declaration order
    pub field_types: IndexMap<String, Type>,

    /// The defining scope
    pub scope: Environment,
}

impl StructDef {
    /// Register a struct declaration against its defining scope.
    pub fn new(decl: Rc<StructDecl>, scope: Environment) -> Self {
        let field_types = decl
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.ty.clone()))
            .collect();
        Self {
            decl,
            field_types,
            scope,
        }
    }

    /// The struct type name.
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Declared type of a field.
    pub fn field_type(&self, field: &str) -> Option<&Type> {
        self.field_types.get(field)
    }
}

/// A struct instance.
#[derive(Debug, Clone)]
pub struct StructValue {
    /// The type this instance was created from
    pub def: Rc<StructDef>,

    /// Field values in declaration order
    pub fields: IndexMap<String, Value>,
}

impl StructValue {
    /// The struct type name.
    pub fn type_name(&self) -> &str {
        self.def.name()
    }

    /// Read a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
