//! Type system for idl-weld
//!
//! An [`IdlType`] is exactly one of four shapes, each independently nullable:
//!
//! | Shape | IDL syntax | Notes |
//! |-------|-----------|-------|
//! | `Named` | `long`, `DOMString`, `Node` | primitives, enums, interfaces, callbacks |
//! | `Sequence` | `sequence<T>` | element may not be a union |
//! | `Array` | `T[]` | element may not be a sequence or a union |
//! | `Union` | `(A or B)` | two or more members, none a union or an array |
//!
//! Shape invariants are enforced by the constructors, so a value that exists
//! is always well formed. Typedef substitution goes through
//! [`IdlType::resolve_typedefs`], which rebuilds composites through the same
//! constructors and therefore re-validates them.
//!
//! Classification of named types depends on facts outside the type itself
//! (which names are enums, callback functions, callback interfaces). Those
//! facts are supplied through the [`TypeLookup`] trait.

use crate::error::{IdlError, IdlResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer types, in IDL spelling
pub const INTEGER_TYPES: &[&str] = &[
    "byte",
    "octet",
    "short",
    "unsigned short",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
];

/// Non-integer types that are still converted by value
pub const NON_INTEGER_BASIC_TYPES: &[&str] = &[
    "boolean",
    "float",
    "unrestricted float",
    "double",
    "unrestricted double",
    "DOMString",
    "Date",
    "void",
];

/// Names that behave like `any`
pub const ANY_TYPES: &[&str] = &["any", "object", "Promise"];

/// Coarse classification of a type against a [`TypeLookup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeClass {
    Basic,
    Any,
    Interface,
    CallbackInterface,
    CallbackFunction,
    Enum,
    Composite,
    Union,
}

/// Per-build facts needed to classify named types
pub trait TypeLookup {
    fn is_enum(&self, _name: &str) -> bool {
        false
    }

    fn is_callback_function(&self, _name: &str) -> bool {
        false
    }

    fn is_callback_interface(&self, _name: &str) -> bool {
        false
    }
}

/// No enums, no callbacks
impl TypeLookup for () {}

/// The shape of an IDL type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    /// Primitive, enum, interface or callback name
    Named(String),
    /// sequence<T>
    Sequence(Box<IdlType>),
    /// T[]
    Array(Box<IdlType>),
    /// (A or B or ...)
    Union(Vec<IdlType>),
}

/// An IDL type: a shape plus a nullable flag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdlType {
    pub shape: TypeShape,
    #[serde(default)]
    pub nullable: bool,
}

impl IdlType {
    /// Create a named type
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            shape: TypeShape::Named(name.into()),
            nullable: false,
        }
    }

    /// Create a `sequence<T>` type
    pub fn sequence(element: IdlType) -> IdlResult<Self> {
        if element.is_union_type() {
            return Err(IdlError::unsupported(format!(
                "sequence of union '{}' is not supported",
                element
            )));
        }
        Ok(Self {
            shape: TypeShape::Sequence(Box::new(element)),
            nullable: false,
        })
    }

    /// Create a `T[]` type
    pub fn array(element: IdlType) -> IdlResult<Self> {
        match element.shape {
            TypeShape::Sequence(_) => Err(IdlError::unsupported(format!(
                "array of sequence '{}' is not supported",
                element
            ))),
            TypeShape::Union(_) => Err(IdlError::unsupported(format!(
                "array of union '{}' is not supported",
                element
            ))),
            _ => Ok(Self {
                shape: TypeShape::Array(Box::new(element)),
                nullable: false,
            }),
        }
    }

    /// Create a union type
    pub fn union(members: Vec<IdlType>) -> IdlResult<Self> {
        if members.len() < 2 {
            return Err(IdlError::unsupported(format!(
                "union needs at least two member types, found {}",
                members.len()
            )));
        }
        for member in &members {
            match member.shape {
                TypeShape::Union(_) => {
                    return Err(IdlError::unsupported(format!(
                        "nested union member '{}' is not supported",
                        member
                    )))
                }
                TypeShape::Array(_) => {
                    return Err(IdlError::unsupported(format!(
                        "array union member '{}' is not supported",
                        member
                    )))
                }
                _ => {}
            }
        }
        Ok(Self {
            shape: TypeShape::Union(members),
            nullable: false,
        })
    }

    /// Set the nullable flag
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark the type nullable
    pub fn nullable(self) -> Self {
        self.with_nullable(true)
    }

    /// Name of a `Named` type
    pub fn name(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Innermost named type of a named or composite type; `None` for unions
    pub fn base_type(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Named(name) => Some(name),
            TypeShape::Sequence(element) | TypeShape::Array(element) => element.base_type(),
            TypeShape::Union(_) => None,
        }
    }

    /// Element type of an array or sequence
    pub fn element_type(&self) -> Option<&IdlType> {
        match &self.shape {
            TypeShape::Sequence(element) | TypeShape::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Member types of a union; empty for every other shape
    pub fn member_types(&self) -> &[IdlType] {
        match &self.shape {
            TypeShape::Union(members) => members,
            _ => &[],
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.shape, TypeShape::Sequence(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape, TypeShape::Array(_))
    }

    /// Array or sequence
    pub fn is_composite(&self) -> bool {
        self.is_sequence() || self.is_array()
    }

    pub fn is_union_type(&self) -> bool {
        matches!(self.shape, TypeShape::Union(_))
    }

    /// Named integer type
    pub fn is_integer_type(&self) -> bool {
        self.name().is_some_and(|n| INTEGER_TYPES.contains(&n))
    }

    /// Named integer or non-integer basic type
    pub fn is_basic_type(&self) -> bool {
        self.name()
            .is_some_and(|n| INTEGER_TYPES.contains(&n) || NON_INTEGER_BASIC_TYPES.contains(&n))
    }

    /// Whether this is exactly the named type `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    /// WebIDL type name: `DOMString?` is `StringOrNull`, `long[]` is `LongArray`
    pub fn type_name(&self) -> String {
        let base = match &self.shape {
            TypeShape::Named(name) => type_name_of(name).to_string(),
            TypeShape::Sequence(element) => format!("{}Sequence", element.type_name()),
            TypeShape::Array(element) => format!("{}Array", element.type_name()),
            TypeShape::Union(members) => members
                .iter()
                .map(IdlType::type_name)
                .collect::<Vec<_>>()
                .join("Or"),
        };
        if self.nullable {
            format!("{}OrNull", base)
        } else {
            base
        }
    }

    /// Classify against per-build facts
    pub fn classify(&self, lookup: &dyn TypeLookup) -> TypeClass {
        let name = match &self.shape {
            TypeShape::Named(name) => name.as_str(),
            TypeShape::Sequence(_) | TypeShape::Array(_) => return TypeClass::Composite,
            TypeShape::Union(_) => return TypeClass::Union,
        };

        if self.is_basic_type() {
            TypeClass::Basic
        } else if ANY_TYPES.contains(&name) {
            TypeClass::Any
        } else if lookup.is_enum(name) {
            TypeClass::Enum
        } else if lookup.is_callback_function(name) {
            TypeClass::CallbackFunction
        } else if lookup.is_callback_interface(name) {
            TypeClass::CallbackInterface
        } else {
            TypeClass::Interface
        }
    }

    /// Interface reference (callback interfaces included)
    pub fn is_interface_type(&self, lookup: &dyn TypeLookup) -> bool {
        matches!(
            self.classify(lookup),
            TypeClass::Interface | TypeClass::CallbackInterface
        )
    }

    /// Substitute typedefs, recursively
    ///
    /// Nullability is OR-ed with the typedef target's. Names absent from the
    /// table are kept as-is. Fails on cyclic typedefs and on compositions
    /// that become invalid after substitution.
    pub fn resolve_typedefs(&self, table: &TypedefTable) -> IdlResult<IdlType> {
        self.resolve_with(table, &mut Vec::new())
    }

    fn resolve_with(&self, table: &TypedefTable, expanding: &mut Vec<String>) -> IdlResult<IdlType> {
        let resolved = match &self.shape {
            TypeShape::Named(name) => {
                let Some(target) = table.get(name) else {
                    return Ok(self.clone());
                };
                if let Some(pos) = expanding.iter().position(|n| n == name) {
                    let mut cycle = expanding[pos..].to_vec();
                    cycle.push(name.clone());
                    return Err(IdlError::CyclicTypedef(cycle));
                }
                expanding.push(name.clone());
                let resolved = target.resolve_with(table, expanding)?;
                expanding.pop();
                let nullable = resolved.nullable || self.nullable;
                return Ok(resolved.with_nullable(nullable));
            }
            TypeShape::Sequence(element) => IdlType::sequence(element.resolve_with(table, expanding)?)?,
            TypeShape::Array(element) => IdlType::array(element.resolve_with(table, expanding)?)?,
            TypeShape::Union(members) => IdlType::union(
                members
                    .iter()
                    .map(|m| m.resolve_with(table, expanding))
                    .collect::<IdlResult<Vec<_>>>()?,
            )?,
        };
        Ok(resolved.with_nullable(self.nullable))
    }
}

fn type_name_of(name: &str) -> &str {
    match name {
        "any" => "Any",
        "boolean" => "Boolean",
        "byte" => "Byte",
        "octet" => "Octet",
        "short" => "Short",
        "unsigned short" => "UnsignedShort",
        "long" => "Long",
        "unsigned long" => "UnsignedLong",
        "long long" => "LongLong",
        "unsigned long long" => "UnsignedLongLong",
        "float" => "Float",
        "unrestricted float" => "UnrestrictedFloat",
        "double" => "Double",
        "unrestricted double" => "UnrestrictedDouble",
        "DOMString" => "String",
        "object" => "Object",
        other => other,
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            TypeShape::Named(name) => write!(f, "{}", name)?,
            TypeShape::Sequence(element) => write!(f, "sequence<{}>", element)?,
            TypeShape::Array(element) => write!(f, "{}[]", element)?,
            TypeShape::Union(members) => {
                let names: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "({})", names.join(" or "))?
            }
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// Parses the `Display` form back: `T?`, `T[]`, `sequence<T>`, `(A or B)`, names.
impl FromStr for IdlType {
    type Err = IdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix('?') {
            return Ok(inner.parse::<IdlType>()?.nullable());
        }
        if let Some(inner) = s.strip_suffix("[]") {
            return IdlType::array(inner.parse()?);
        }
        if let Some(inner) = s.strip_prefix("sequence<").and_then(|r| r.strip_suffix('>')) {
            return IdlType::sequence(inner.parse()?);
        }
        if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            let members = split_union_members(inner)
                .into_iter()
                .map(str::parse)
                .collect::<IdlResult<Vec<_>>>()?;
            return IdlType::union(members);
        }
        if s.is_empty() {
            return Err(IdlError::structure("empty type name"));
        }
        Ok(IdlType::named(s.split_whitespace().collect::<Vec<_>>().join(" ")))
    }
}

/// Split on ` or ` at nesting depth zero
fn split_union_members(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'<' => depth += 1,
            b')' | b'>' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 && s[i..].starts_with(" or ") => {
                parts.push(&s[start..i]);
                i += 4;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&s[start..]);
    parts
}

/// Typedef name -> target type, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedefTable {
    entries: IndexMap<String, IdlType>,
}

impl TypedefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table from `name -> IDL type text` pairs
    pub fn from_standard(standard: &IndexMap<String, String>) -> IdlResult<Self> {
        let mut table = Self::new();
        for (name, target) in standard {
            table.insert(name.clone(), target.parse()?);
        }
        Ok(table)
    }

    /// Add or replace a typedef
    pub fn insert(&mut self, name: impl Into<String>, target: IdlType) {
        self.entries.insert(name.into(), target);
    }

    pub fn get(&self, name: &str) -> Option<&IdlType> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IdlType)> {
        self.entries.iter()
    }
}
