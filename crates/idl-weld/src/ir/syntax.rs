//! Syntax tree boundary
//!
//! The IR builder consumes any tree implementing [`SyntaxNode`]: a node has a
//! class (`Interface`, `Attribute`, `Type`, ...), an optional name, ordered
//! children and a property bag. [`AstNode`] is a plain serde-deserializable
//! implementation, so a parser living outside this crate can hand over its
//! tree as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A property value attached to a syntax node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl PropertyValue {
    /// Truthiness: `false`, `0` and `""` are false
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Bool(b) => *b,
            PropertyValue::Int(n) => *n != 0,
            PropertyValue::String(s) => !s.is_empty(),
        }
    }

    /// String form of the value
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(n) => n.to_string(),
            PropertyValue::String(s) => s.clone(),
        }
    }
}

/// A node of the parsed IDL tree
pub trait SyntaxNode {
    /// Node class, e.g. `Interface`
    fn class(&self) -> &str;

    /// Node name, if the node is named
    fn name(&self) -> Option<&str>;

    /// Ordered children
    fn children(&self) -> &[Self]
    where
        Self: Sized;

    /// Property lookup
    fn property(&self, key: &str) -> Option<&PropertyValue>;

    /// Whether a property is present and truthy
    fn has_property(&self, key: &str) -> bool {
        self.property(key).is_some_and(PropertyValue::is_truthy)
    }

    /// Whether a property key is present at all
    fn has_property_key(&self, key: &str) -> bool {
        self.property(key).is_some()
    }

    /// Name or the empty string
    fn name_or_empty(&self) -> &str {
        self.name().unwrap_or("")
    }
}

/// Owned syntax tree node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl AstNode {
    /// Create an unnamed node
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }

    /// Create a named node
    pub fn named(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(class).with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Set a boolean property to true
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.properties.insert(key.into(), PropertyValue::Bool(true));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Parse a JSON tree
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl SyntaxNode for AstNode {
    fn class(&self) -> &str {
        &self.class
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Fixture helpers for building trees the way the IDL parser shapes them
pub mod build {
    use super::{AstNode, PropertyValue};

    /// `Type` node around a primitive or interface name
    pub fn ty(name: &str) -> AstNode {
        let inner = if name == "any" {
            AstNode::new("Any")
        } else if is_primitive(name) {
            AstNode::named("PrimitiveType", name)
        } else {
            AstNode::named("Typeref", name)
        };
        AstNode::new("Type").with_child(inner)
    }

    /// Nullable `Type` node
    pub fn nullable(mut ty: AstNode) -> AstNode {
        ty.properties
            .insert("NULLABLE".to_string(), PropertyValue::Bool(true));
        ty
    }

    /// `Type` node with an `Array` suffix
    pub fn array_of(name: &str) -> AstNode {
        ty(name).with_child(AstNode::new("Array"))
    }

    /// `Type` node around `sequence<element>`
    pub fn sequence_of(element: AstNode) -> AstNode {
        AstNode::new("Type").with_child(AstNode::new("Sequence").with_child(element))
    }

    /// `Type` node around a union of member types
    pub fn union_of(members: impl IntoIterator<Item = AstNode>) -> AstNode {
        AstNode::new("Type").with_child(AstNode::new("UnionType").with_children(members))
    }

    /// `ExtAttributes` node from `(name, value)` pairs
    pub fn ext_attrs<'a>(attrs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> AstNode {
        AstNode::new("ExtAttributes").with_children(attrs.into_iter().map(|(name, value)| {
            let node = AstNode::named("ExtAttribute", name);
            match value {
                Some(v) => node.with_property("VALUE", PropertyValue::String(v.to_string())),
                None => node,
            }
        }))
    }

    /// `Argument` node
    pub fn argument(name: &str, ty: AstNode) -> AstNode {
        AstNode::named("Argument", name).with_child(ty)
    }

    /// `Arguments` node
    pub fn arguments(args: impl IntoIterator<Item = AstNode>) -> AstNode {
        AstNode::new("Arguments").with_children(args)
    }

    /// `Attribute` node
    pub fn attribute(name: &str, ty: AstNode) -> AstNode {
        AstNode::named("Attribute", name).with_child(ty)
    }

    /// `Operation` node with a return type and arguments
    pub fn operation(name: &str, return_type: AstNode, args: impl IntoIterator<Item = AstNode>) -> AstNode {
        AstNode::named("Operation", name)
            .with_child(arguments(args))
            .with_child(return_type)
    }

    /// `Const` node
    pub fn constant(name: &str, type_name: &str, value: &str) -> AstNode {
        AstNode::named("Const", name)
            .with_child(AstNode::named("PrimitiveType", type_name))
            .with_child(AstNode::named("Value", value))
    }

    /// `Interface` node
    pub fn interface(name: &str, members: impl IntoIterator<Item = AstNode>) -> AstNode {
        AstNode::named("Interface", name).with_children(members)
    }

    /// `File` root
    pub fn file(definitions: impl IntoIterator<Item = AstNode>) -> AstNode {
        AstNode::new("File").with_children(definitions)
    }

    fn is_primitive(name: &str) -> bool {
        crate::ir::INTEGER_TYPES.contains(&name)
            || crate::ir::NON_INTEGER_BASIC_TYPES.contains(&name)
            || name == "object"
    }
}
