//! The type model shared by every analysis pass.
//!
//! Types form a closed tree; composite variants own their children. Two
//! types are compatible when their rendered names agree, with `Any` acting
//! as a wildcard at any depth.

use std::collections::BTreeSet;
use std::fmt;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Float,
    Bool,
    String,
    Char,
    Void,
    /// Universal type used for error recovery and untyped positions
    Any,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "Int",
            Primitive::Float => "Float",
            Primitive::Bool => "Bool",
            Primitive::String => "String",
            Primitive::Char => "Char",
            Primitive::Void => "Void",
            Primitive::Any => "Any",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Int" => Primitive::Int,
            "Float" => Primitive::Float,
            "Bool" => Primitive::Bool,
            "String" => Primitive::String,
            "Char" => Primitive::Char,
            "Void" => Primitive::Void,
            "Any" => Primitive::Any,
            _ => return None,
        })
    }
}

/// Generic containers known to the analyzer without a declaration
pub const BUILTIN_GENERICS: &[&str] = &["List", "Map", "Set", "Future", "Result"];

/// A resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    /// A declared class, struct, spark, data type, trait or interface
    Named(String),
    /// `List<Int>`, `Pair<A, B>`
    Generic { base: String, args: Vec<Type> },
    Optional(Box<Type>),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Function { params: Vec<Type>, ret: Box<Type> },
    /// `T` inside a generic declaration, with the traits it must implement
    TypeParameter { name: String, bounds: BTreeSet<String> },
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(Primitive::Int)
    }

    pub fn float() -> Self {
        Type::Primitive(Primitive::Float)
    }

    pub fn bool() -> Self {
        Type::Primitive(Primitive::Bool)
    }

    pub fn string() -> Self {
        Type::Primitive(Primitive::String)
    }

    pub fn char() -> Self {
        Type::Primitive(Primitive::Char)
    }

    pub fn void() -> Self {
        Type::Primitive(Primitive::Void)
    }

    pub fn any() -> Self {
        Type::Primitive(Primitive::Any)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn generic(base: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Generic {
            base: base.into(),
            args,
        }
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Type::TypeParameter {
            name: name.into(),
            bounds: BTreeSet::new(),
        }
    }

    pub fn bounded_param<I, S>(name: impl Into<String>, bounds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Type::TypeParameter {
            name: name.into(),
            bounds: bounds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn future(inner: Type) -> Self {
        Type::generic("Future", vec![inner])
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Any))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Int))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Float))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Bool))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_int() || self.is_float()
    }

    /// The rendered name; the basis of compatibility
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// The inner type of `T?`
    pub fn optional_inner(&self) -> Option<&Type> {
        match self {
            Type::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    /// The base name used to look up fields, methods and impls
    pub fn nominal_name(&self) -> Option<&str> {
        match self {
            Type::Named(name) => Some(name),
            Type::Generic { base, .. } => Some(base),
            Type::Primitive(p) if !matches!(p, Primitive::Any | Primitive::Void) => Some(p.name()),
            _ => None,
        }
    }

    /// Element type produced by iterating over this type
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::Array(element) => Some((**element).clone()),
            Type::Generic { base, args } if base == "List" || base == "Set" => {
                Some(args.first().cloned().unwrap_or_else(Type::any))
            }
            Type::Generic { base, args } if base == "Map" => {
                Some(Type::Tuple(args.iter().take(2).cloned().collect()))
            }
            Type::Primitive(Primitive::String) => Some(Type::char()),
            Type::Primitive(Primitive::Any) => Some(Type::any()),
            _ => None,
        }
    }

    /// Result of `value[index]`
    pub fn index_type(&self) -> Option<Type> {
        match self {
            Type::Generic { base, args } if base == "Map" => {
                Some(args.get(1).cloned().unwrap_or_else(Type::any))
            }
            _ => self.element_type(),
        }
    }

    /// Whether a type parameter (bound or not) occurs anywhere in this type
    pub fn has_type_parameters(&self) -> bool {
        match self {
            Type::TypeParameter { .. } => true,
            Type::Primitive(_) | Type::Named(_) => false,
            Type::Generic { args, .. } | Type::Tuple(args) => {
                args.iter().any(Type::has_type_parameters)
            }
            Type::Optional(inner) | Type::Array(inner) => inner.has_type_parameters(),
            Type::Function { params, ret } => {
                params.iter().any(Type::has_type_parameters) || ret.has_type_parameters()
            }
        }
    }

    /// Name-based compatibility with `Any` as a wildcard at every depth.
    ///
    /// `Void?` (the `none` literal) and `[Void]` (an empty array literal)
    /// are placeholders that fit any optional or array type respectively.
    pub fn compatible(&self, other: &Type) -> bool {
        if self.is_any() || other.is_any() {
            return true;
        }
        match (self, other) {
            (Type::Optional(a), Type::Optional(b)) | (Type::Array(a), Type::Array(b)) => {
                a.is_void() || b.is_void() || a.compatible(b)
            }
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.compatible(y))
            }
            (
                Type::Generic { base: b1, args: a1 },
                Type::Generic { base: b2, args: a2 },
            ) => {
                b1 == b2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| x.compatible(y))
            }
            (
                Type::Function {
                    params: p1,
                    ret: r1,
                },
                Type::Function {
                    params: p2,
                    ret: r2,
                },
            ) => {
                p1.len() == p2.len()
                    && p1.iter().zip(p2).all(|(x, y)| x.compatible(y))
                    && r1.compatible(r2)
            }
            _ => self.name() == other.name(),
        }
    }

    /// Whether a value of type `actual` may flow into a slot of this type.
    /// Same as [`Type::compatible`], except that `T?` also accepts a `T`.
    pub fn accepts(&self, actual: &Type) -> bool {
        if self.compatible(actual) {
            return true;
        }
        match self {
            Type::Optional(inner) => inner.accepts(actual),
            _ => false,
        }
    }
}

impl From<Primitive> for Type {
    fn from(primitive: Primitive) -> Self {
        Type::Primitive(primitive)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Named(name) => f.write_str(name),
            Type::Generic { base, args } => {
                write!(f, "{base}<")?;
                write_list(f, args)?;
                f.write_str(">")
            }
            Type::Optional(inner) => match **inner {
                Type::Function { .. } => write!(f, "({inner})?"),
                _ => write!(f, "{inner}?"),
            },
            Type::Array(element) => write!(f, "[{element}]"),
            Type::Tuple(elements) => {
                f.write_str("(")?;
                write_list(f, elements)?;
                f.write_str(")")
            }
            Type::Function { params, ret } => {
                f.write_str("(")?;
                write_list(f, params)?;
                write!(f, ") -> {ret}")
            }
            Type::TypeParameter { name, .. } => f.write_str(name),
        }
    }
}
