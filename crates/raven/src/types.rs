//! Type descriptors and the compatibility (coercion) rules
//!
//! A [`Type`] is a tag plus its ordered sub-descriptors. Any sub-descriptor
//! slot may be [`Type::Unresolved`], a placeholder that is filled in
//! positionally from an expected type during comparison. That is the only
//! inference the language has: it lets `[]` satisfy `array<int>` and `none`
//! satisfy `optional<string>`.

use std::fmt;

/// A structural type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Real,
    /// Exact fraction
    Rational,
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
    /// Accepts any value; checks against it always succeed
    Any,
    /// Absence of a value (functions without a declared return type)
    Void,
    /// The type of type values (`typeof(x)`, `int`, struct names)
    Type,
    /// Homogeneous array
    Array(Box<Type>),
    /// A value that may be `none`
    Optional(Box<Type>),
    /// Function signature
    Func {
        /// Parameter types in declaration order
        params: Vec<Type>,
        /// Declared return type
        ret: Box<Type>,
    },
    /// A user-defined struct, referenced by name
    Struct(String),
    /// Placeholder slot, filled from the expected type
    Unresolved,
}

impl Type {
    /// Build `array<element>`.
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Build `optional<inner>`.
    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    /// Build `func<(params) ret>`.
    pub fn func(params: Vec<Type>, ret: Type) -> Self {
        Type::Func {
            params,
            ret: Box::new(ret),
        }
    }

    /// The tag name of this descriptor.
    pub fn tag(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Real => "real",
            Type::Rational => "rational",
            Type::String => "string",
            Type::Bool => "bool",
            Type::Any => "any",
            Type::Void => "void",
            Type::Type => "type",
            Type::Array(_) => "array",
            Type::Optional(_) => "optional",
            Type::Func { .. } => "func",
            Type::Struct(_) => "struct",
            Type::Unresolved => "?",
        }
    }

    /// `int`, `real` or `rational`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Real | Type::Rational)
    }

    /// Whether any slot of this descriptor is still a placeholder.
    pub fn has_unresolved(&self) -> bool {
        match self {
            Type::Unresolved => true,
            Type::Array(inner) | Type::Optional(inner) => inner.has_unresolved(),
            Type::Func { params, ret } => {
                params.iter().any(Type::has_unresolved) || ret.has_unresolved()
            }
            _ => false,
        }
    }

    /// Fill placeholder slots positionally from `expected`.
    ///
    /// Slots with no counterpart in `expected` (shape mismatch) stay
    /// unresolved, so the result then fails the equality check.
    pub fn resolve_against(&self, expected: &Type) -> Type {
        match (self, expected) {
            (Type::Unresolved, _) => expected.clone(),
            (Type::Array(inner), Type::Array(target)) => Type::array(inner.resolve_against(target)),
            (Type::Optional(inner), Type::Optional(target)) => {
                Type::optional(inner.resolve_against(target))
            }
            (
                Type::Func { params, ret },
                Type::Func {
                    params: target_params,
                    ret: target_ret,
                },
            ) if params.len() == target_params.len() => Type::func(
                params
                    .iter()
                    .zip(target_params)
                    .map(|(p, t)| p.resolve_against(t))
                    .collect(),
                ret.resolve_against(target_ret),
            ),
            _ => self.clone(),
        }
    }

    /// Whether a value of type `self` may be used where `expected` is required.
    ///
    /// Rules, in priority order:
    /// 1. `any` accepts everything.
    /// 2. `int` widens to `real` and `rational`.
    /// 3. A bare `T` is accepted by `optional<T>`.
    /// 4. Placeholders in `self` are resolved from `expected`, then compared.
    /// 5. Otherwise the descriptors must be structurally equal.
    pub fn is_compatible(&self, expected: &Type) -> bool {
        if *expected == Type::Any {
            return true;
        }
        if *self == Type::Int && matches!(expected, Type::Real | Type::Rational) {
            return true;
        }
        if let Type::Optional(inner) = expected {
            if !matches!(self, Type::Optional(_)) && self.is_compatible(inner) {
                return true;
            }
        }
        if self.has_unresolved() {
            return self.resolve_against(expected) == *expected;
        }
        self == expected
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Array(inner) => write!(f, "array<{}>", inner),
            Type::Optional(inner) => write!(f, "optional<{}>", inner),
            Type::Func { params, ret } => {
                write!(f, "func<")?;
                let has_params = !params.is_empty();
                if has_params {
                    write!(f, "(")?;
                    for (i, param) in params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", param)?;
                    }
                    write!(f, ")")?;
                }
                if **ret != Type::Void {
                    if has_params {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", ret)?;
                }
                write!(f, ">")
            }
            Type::Struct(name) => write!(f, "{}", name),
            other => write!(f, "{}", other.tag()),
        }
    }
}
