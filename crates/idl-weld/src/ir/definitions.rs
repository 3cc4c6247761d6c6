//! IR builder
//!
//! Turns a parsed syntax tree for one source unit into [`IdlDefinitions`]:
//! interfaces and exceptions, callback functions and enums, with every
//! member typed. Typedefs are substituted once the whole unit is built and
//! are then discarded.
//!
//! Every node kind has a fixed expected shape. Anything else is a
//! [`IdlError::Structure`] raised at the node where it is found.

use crate::error::{IdlError, IdlResult};
use crate::ir::{
    CallSignature, ExtAttrValue, ExtendedAttributes, IdlType, PropertyValue, SyntaxNode,
    TypedefTable,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Special operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Special {
    Getter,
    Setter,
    Deleter,
}

impl Special {
    const KEYWORDS: [(&'static str, Special); 3] = [
        ("GETTER", Special::Getter),
        ("SETTER", Special::Setter),
        ("DELETER", Special::Deleter),
    ];
}

/// Anything holding an IDL type that may name a typedef
pub trait TypedObject {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()>;
}

/// Member access shared by interfaces and exceptions
pub trait InterfaceMembers {
    fn name(&self) -> &str;
    fn attributes(&self) -> &[IdlAttribute];
    fn constants(&self) -> &[IdlConstant];
    fn operations(&self) -> &[IdlOperation];
    fn extended_attributes(&self) -> &ExtendedAttributes;
}

/// All definitions of one source unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdlDefinitions {
    pub callback_functions: IndexMap<String, IdlCallbackFunction>,
    pub enumerations: IndexMap<String, IdlEnum>,
    pub interfaces: IndexMap<String, InterfaceDefinition>,
}

impl IdlDefinitions {
    /// Build from a `File` root with the default standard typedefs
    pub fn build<N: SyntaxNode>(root: &N) -> IdlResult<Self> {
        let mut standard = IndexMap::new();
        standard.insert("DOMTimeStamp".to_string(), "unsigned long long".to_string());
        Self::build_with_typedefs(root, &standard)
    }

    /// Build from a `File` root, seeding the typedef table with `standard_typedefs`
    pub fn build_with_typedefs<N: SyntaxNode>(
        root: &N,
        standard_typedefs: &IndexMap<String, String>,
    ) -> IdlResult<Self> {
        if root.class() != "File" {
            return Err(IdlError::unrecognized_node(root.class()));
        }

        let mut definitions = Self::default();
        let mut typedefs = TypedefTable::from_standard(standard_typedefs)?;

        for child in root.children() {
            match child.class() {
                "Interface" => {
                    let interface = IdlInterface::from_node(child)?;
                    definitions
                        .interfaces
                        .insert(interface.name.clone(), InterfaceDefinition::Interface(interface));
                }
                "Exception" => {
                    let exception = IdlException::from_node(child)?;
                    definitions
                        .interfaces
                        .insert(exception.name.clone(), InterfaceDefinition::Exception(exception));
                }
                "Typedef" => {
                    typedefs.insert(child.name_or_empty(), typedef_node_to_type(child)?);
                }
                "Enum" => {
                    let enumeration = IdlEnum::from_node(child);
                    definitions
                        .enumerations
                        .insert(enumeration.name.clone(), enumeration);
                }
                "Callback" => {
                    let callback = IdlCallbackFunction::from_node(child)?;
                    definitions
                        .callback_functions
                        .insert(callback.name.clone(), callback);
                }
                // Merged by the index resolver
                "Implements" => {}
                other => return Err(IdlError::unrecognized_node(other)),
            }
        }

        debug!(
            interfaces = definitions.interfaces.len(),
            callbacks = definitions.callback_functions.len(),
            enums = definitions.enumerations.len(),
            "idl.definitions"
        );

        definitions.resolve_typedefs(&typedefs)?;
        debug!(typedefs = typedefs.len(), "idl.definitions typedefs resolved");

        Ok(definitions)
    }

    /// Apply a typedef table to every typed member
    pub fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        for callback in self.callback_functions.values_mut() {
            callback.resolve_typedefs(table)?;
        }
        for interface in self.interfaces.values_mut() {
            interface.resolve_typedefs(table)?;
        }
        Ok(())
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDefinition> {
        self.interfaces.get(name)
    }

    /// The single interface or exception of a unit, if there is exactly one
    pub fn only_interface(&self) -> Option<&InterfaceDefinition> {
        if self.interfaces.len() == 1 {
            self.interfaces.values().next()
        } else {
            None
        }
    }
}

/// An interface or an exception; both live in the same namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterfaceDefinition {
    Interface(IdlInterface),
    Exception(IdlException),
}

impl InterfaceDefinition {
    fn members(&self) -> &dyn InterfaceMembers {
        match self {
            InterfaceDefinition::Interface(i) => i,
            InterfaceDefinition::Exception(e) => e,
        }
    }

    pub fn as_interface(&self) -> Option<&IdlInterface> {
        match self {
            InterfaceDefinition::Interface(i) => Some(i),
            InterfaceDefinition::Exception(_) => None,
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, InterfaceDefinition::Exception(_))
    }

    pub fn is_callback(&self) -> bool {
        self.as_interface().is_some_and(|i| i.is_callback)
    }

    pub fn is_partial(&self) -> bool {
        self.as_interface().is_some_and(|i| i.is_partial)
    }

    pub fn parent(&self) -> Option<&str> {
        self.as_interface().and_then(|i| i.parent.as_deref())
    }

    pub fn constructors(&self) -> &[IdlOperation] {
        self.as_interface().map(|i| i.constructors.as_slice()).unwrap_or(&[])
    }

    pub fn custom_constructors(&self) -> &[IdlOperation] {
        self.as_interface()
            .map(|i| i.custom_constructors.as_slice())
            .unwrap_or(&[])
    }
}

impl InterfaceMembers for InterfaceDefinition {
    fn name(&self) -> &str {
        self.members().name()
    }
    fn attributes(&self) -> &[IdlAttribute] {
        self.members().attributes()
    }
    fn constants(&self) -> &[IdlConstant] {
        self.members().constants()
    }
    fn operations(&self) -> &[IdlOperation] {
        self.members().operations()
    }
    fn extended_attributes(&self) -> &ExtendedAttributes {
        self.members().extended_attributes()
    }
}

impl TypedObject for InterfaceDefinition {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        match self {
            InterfaceDefinition::Interface(i) => i.resolve_typedefs(table),
            InterfaceDefinition::Exception(e) => e.resolve_typedefs(table),
        }
    }
}

/// An interface declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdlInterface {
    pub name: String,
    pub is_callback: bool,
    pub is_partial: bool,
    pub parent: Option<String>,
    pub attributes: Vec<IdlAttribute>,
    pub constants: Vec<IdlConstant>,
    pub operations: Vec<IdlOperation>,
    pub constructors: Vec<IdlOperation>,
    pub custom_constructors: Vec<IdlOperation>,
    pub extended_attributes: ExtendedAttributes,
}

impl IdlInterface {
    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let mut interface = Self {
            name: node.name_or_empty().to_string(),
            is_callback: node.has_property("CALLBACK"),
            is_partial: node.has_property("Partial"),
            ..Default::default()
        };

        for child in node.children() {
            match child.class() {
                "Attribute" => interface.attributes.push(IdlAttribute::from_node(child)?),
                "Const" => interface.constants.push(IdlConstant::from_node(child)?),
                "ExtAttributes" => {
                    let mut attrs = ext_attributes_from_node(child)?;
                    let (constructors, custom_constructors) = take_constructors(&mut attrs);
                    interface.constructors = constructors;
                    interface.custom_constructors = custom_constructors;
                    interface.extended_attributes = attrs;
                }
                "Operation" => interface.operations.push(IdlOperation::from_node(child)?),
                "Inherit" => interface.parent = child.name().map(str::to_string),
                other => return Err(IdlError::unrecognized_node(other)),
            }
        }

        Ok(interface)
    }
}

impl InterfaceMembers for IdlInterface {
    fn name(&self) -> &str {
        &self.name
    }
    fn attributes(&self) -> &[IdlAttribute] {
        &self.attributes
    }
    fn constants(&self) -> &[IdlConstant] {
        &self.constants
    }
    fn operations(&self) -> &[IdlOperation] {
        &self.operations
    }
    fn extended_attributes(&self) -> &ExtendedAttributes {
        &self.extended_attributes
    }
}

impl TypedObject for IdlInterface {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        for attribute in &mut self.attributes {
            attribute.resolve_typedefs(table)?;
        }
        for constant in &mut self.constants {
            constant.resolve_typedefs(table)?;
        }
        for operation in self
            .constructors
            .iter_mut()
            .chain(self.custom_constructors.iter_mut())
            .chain(self.operations.iter_mut())
        {
            operation.resolve_typedefs(table)?;
        }
        Ok(())
    }
}

/// An exception declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdlException {
    pub name: String,
    pub attributes: Vec<IdlAttribute>,
    pub constants: Vec<IdlConstant>,
    pub operations: Vec<IdlOperation>,
    pub extended_attributes: ExtendedAttributes,
}

impl IdlException {
    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let mut exception = Self {
            name: node.name_or_empty().to_string(),
            ..Default::default()
        };

        for child in node.children() {
            match child.class() {
                "Attribute" => exception.attributes.push(IdlAttribute::from_node(child)?),
                "Const" => exception.constants.push(IdlConstant::from_node(child)?),
                "ExtAttributes" => exception.extended_attributes = ext_attributes_from_node(child)?,
                "ExceptionOperation" => exception
                    .operations
                    .push(IdlOperation::from_exception_operation_node(child)?),
                other => return Err(IdlError::unrecognized_node(other)),
            }
        }

        Ok(exception)
    }
}

impl InterfaceMembers for IdlException {
    fn name(&self) -> &str {
        &self.name
    }
    fn attributes(&self) -> &[IdlAttribute] {
        &self.attributes
    }
    fn constants(&self) -> &[IdlConstant] {
        &self.constants
    }
    fn operations(&self) -> &[IdlOperation] {
        &self.operations
    }
    fn extended_attributes(&self) -> &ExtendedAttributes {
        &self.extended_attributes
    }
}

impl TypedObject for IdlException {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        for attribute in &mut self.attributes {
            attribute.resolve_typedefs(table)?;
        }
        for constant in &mut self.constants {
            constant.resolve_typedefs(table)?;
        }
        for operation in &mut self.operations {
            operation.resolve_typedefs(table)?;
        }
        Ok(())
    }
}

/// Callback function: `callback Name = ReturnType (args);`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlCallbackFunction {
    pub name: String,
    pub idl_type: IdlType,
    pub arguments: Vec<IdlArgument>,
}

impl IdlCallbackFunction {
    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let children = node.children();
        let [type_node, arguments_node] = children else {
            return Err(IdlError::structure(format!(
                "Expected 2 children, got {}",
                children.len()
            )));
        };
        if arguments_node.class() != "Arguments" {
            return Err(IdlError::structure(format!(
                "Expected Arguments node, got {}",
                arguments_node.class()
            )));
        }

        Ok(Self {
            name: node.name_or_empty().to_string(),
            idl_type: type_node_to_type(type_node)?,
            arguments: arguments_from_node(Some(arguments_node))?,
        })
    }
}

impl TypedObject for IdlCallbackFunction {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        self.idl_type = self.idl_type.resolve_typedefs(table)?;
        for argument in &mut self.arguments {
            argument.resolve_typedefs(table)?;
        }
        Ok(())
    }
}

/// Enumeration: name and the ordered list of its string values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlEnum {
    pub name: String,
    pub values: Vec<String>,
}

impl IdlEnum {
    pub fn from_node<N: SyntaxNode>(node: &N) -> Self {
        Self {
            name: node.name_or_empty().to_string(),
            values: node
                .children()
                .iter()
                .map(|c| c.name_or_empty().to_string())
                .collect(),
        }
    }
}

/// Attribute member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlAttribute {
    pub name: String,
    pub idl_type: IdlType,
    pub is_read_only: bool,
    pub is_static: bool,
    pub extended_attributes: ExtendedAttributes,
}

impl IdlAttribute {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type,
            is_read_only: false,
            is_static: false,
            extended_attributes: ExtendedAttributes::new(),
        }
    }

    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let mut idl_type = None;
        let mut extended_attributes = ExtendedAttributes::new();

        for child in node.children() {
            match child.class() {
                "Type" => idl_type = Some(type_node_to_type(child)?),
                "ExtAttributes" => extended_attributes = ext_attributes_from_node(child)?,
                other => return Err(IdlError::unrecognized_node(other)),
            }
        }

        let name = node.name_or_empty().to_string();
        let idl_type = idl_type
            .ok_or_else(|| IdlError::structure(format!("Attribute '{}' has no Type node", name)))?;

        Ok(Self {
            name,
            idl_type,
            is_read_only: node.has_property("READONLY"),
            is_static: node.has_property("STATIC"),
            extended_attributes,
        })
    }
}

impl TypedObject for IdlAttribute {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        self.idl_type = self.idl_type.resolve_typedefs(table)?;
        Ok(())
    }
}

/// Constant member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlConstant {
    pub name: String,
    pub idl_type: IdlType,
    /// Literal as written in the source
    pub value: String,
    pub extended_attributes: ExtendedAttributes,
}

impl IdlConstant {
    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let children = node.children();
        if !(2..=3).contains(&children.len()) {
            return Err(IdlError::structure(format!(
                "Expected 2 or 3 children, got {}",
                children.len()
            )));
        }
        let value_node = &children[1];
        if value_node.class() != "Value" {
            return Err(IdlError::structure(format!(
                "Expected Value node, got {}",
                value_node.class()
            )));
        }

        let extended_attributes = match children.get(2) {
            Some(ext) => ext_attributes_from_node(ext)?,
            None => ExtendedAttributes::new(),
        };

        Ok(Self {
            name: node.name_or_empty().to_string(),
            // Constant types are bare primitive names, no Type wrapper
            idl_type: type_node_inner_to_type(&children[0], false, false)?,
            value: value_node.name_or_empty().to_string(),
            extended_attributes,
        })
    }
}

impl TypedObject for IdlConstant {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        self.idl_type = self.idl_type.resolve_typedefs(table)?;
        Ok(())
    }
}

/// Operation member; constructors are operations without a return type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdlOperation {
    /// Empty for unnamed special operations
    pub name: String,
    pub idl_type: Option<IdlType>,
    pub is_static: bool,
    pub arguments: Vec<IdlArgument>,
    pub specials: Vec<Special>,
    pub extended_attributes: ExtendedAttributes,
}

impl IdlOperation {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type: Some(idl_type),
            ..Default::default()
        }
    }

    /// Synthetic constructor operation
    pub fn constructor(name: impl Into<String>, arguments: Vec<IdlArgument>) -> Self {
        Self {
            name: name.into(),
            arguments,
            ..Default::default()
        }
    }

    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let name = match node.name_or_empty() {
            "_unnamed_" => String::new(),
            n => n.to_string(),
        };

        let mut operation = Self {
            name,
            is_static: node.has_property("STATIC"),
            specials: Special::KEYWORDS
                .iter()
                .filter(|(keyword, _)| node.has_property_key(keyword))
                .map(|(_, special)| *special)
                .collect(),
            ..Default::default()
        };

        for child in node.children() {
            match child.class() {
                "Arguments" => operation.arguments = arguments_from_node(Some(child))?,
                "Type" => operation.idl_type = Some(type_node_to_type(child)?),
                "ExtAttributes" => operation.extended_attributes = ext_attributes_from_node(child)?,
                other => return Err(IdlError::unrecognized_node(other)),
            }
        }

        Ok(operation)
    }

    /// Exception operations: a return type and optional extended attributes
    pub fn from_exception_operation_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let children = node.children();
        if !(1..=2).contains(&children.len()) {
            return Err(IdlError::structure(format!(
                "ExceptionOperation node with {} children, expected 1 or 2",
                children.len()
            )));
        }

        let extended_attributes = match children.get(1) {
            Some(ext) => ext_attributes_from_node(ext)?,
            None => ExtendedAttributes::new(),
        };

        Ok(Self {
            name: node.name_or_empty().to_string(),
            idl_type: Some(type_node_to_type(&children[0])?),
            extended_attributes,
            ..Default::default()
        })
    }

    pub fn is_special(&self, special: Special) -> bool {
        self.specials.contains(&special)
    }
}

impl TypedObject for IdlOperation {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        if let Some(idl_type) = &self.idl_type {
            self.idl_type = Some(idl_type.resolve_typedefs(table)?);
        }
        for argument in &mut self.arguments {
            argument.resolve_typedefs(table)?;
        }
        Ok(())
    }
}

/// Operation argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlArgument {
    pub name: String,
    pub idl_type: IdlType,
    pub is_optional: bool,
    pub is_variadic: bool,
    pub extended_attributes: ExtendedAttributes,
}

impl IdlArgument {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type,
            is_optional: false,
            is_variadic: false,
            extended_attributes: ExtendedAttributes::new(),
        }
    }

    pub fn from_node<N: SyntaxNode>(node: &N) -> IdlResult<Self> {
        let mut idl_type = None;
        let mut extended_attributes = ExtendedAttributes::new();
        let mut is_variadic = false;

        for child in node.children() {
            match child.class() {
                "Type" => idl_type = Some(type_node_to_type(child)?),
                "ExtAttributes" => extended_attributes = ext_attributes_from_node(child)?,
                "Argument" => {
                    let child_name = child.name_or_empty();
                    if child_name != "..." {
                        return Err(IdlError::structure(format!(
                            "Unrecognized Argument node; expected \"...\", got \"{}\"",
                            child_name
                        )));
                    }
                    is_variadic = child.has_property("ELLIPSIS");
                }
                other => return Err(IdlError::unrecognized_node(other)),
            }
        }

        let name = node.name_or_empty().to_string();
        let idl_type = idl_type
            .ok_or_else(|| IdlError::structure(format!("Argument '{}' has no Type node", name)))?;

        Ok(Self {
            name,
            idl_type,
            is_optional: node.has_property("OPTIONAL"),
            is_variadic,
            extended_attributes,
        })
    }
}

impl TypedObject for IdlArgument {
    fn resolve_typedefs(&mut self, table: &TypedefTable) -> IdlResult<()> {
        self.idl_type = self.idl_type.resolve_typedefs(table)?;
        Ok(())
    }
}

/// `None` (a bare `[Constructor]`) means an empty argument list
fn arguments_from_node<N: SyntaxNode>(node: Option<&N>) -> IdlResult<Vec<IdlArgument>> {
    match node {
        None => Ok(Vec::new()),
        Some(node) => node.children().iter().map(IdlArgument::from_node).collect(),
    }
}

/// Build extended attributes, accumulating constructor overloads under the
/// plural keys `Constructors` / `CustomConstructors`
pub fn ext_attributes_from_node<N: SyntaxNode>(node: &N) -> IdlResult<ExtendedAttributes> {
    let mut constructors = Vec::new();
    let mut custom_constructors = Vec::new();
    let mut attrs = ExtendedAttributes::new();

    for attr_node in node.children() {
        let name = attr_node.name_or_empty();
        let children = attr_node.children();
        if children.len() > 1 {
            return Err(IdlError::structure(format!(
                "ExtAttributes node with {} children, expected at most 1",
                children.len()
            )));
        }
        let child = children.first();
        let child_class = child.map(|c| c.class());

        match name {
            "Constructor" | "CustomConstructor" => {
                if let Some(class) = child_class.filter(|c| *c != "Arguments") {
                    return Err(IdlError::structure(format!(
                        "[{}] only supports Arguments as child, but has child of class: {}",
                        name, class
                    )));
                }
                let overload = arguments_from_node(child)?;
                if name == "Constructor" {
                    constructors.push(overload);
                } else {
                    custom_constructors.push(overload);
                }
            }
            "NamedConstructor" => match child {
                Some(call) if call.class() == "Call" => {
                    attrs.insert(name, ExtAttrValue::Call(call_signature(call)?));
                }
                Some(other) => {
                    return Err(IdlError::structure(format!(
                        "[NamedConstructor] only supports Call as child, but has child of class: {}",
                        other.class()
                    )))
                }
                None => {
                    attrs.insert(name, plain_value(attr_node));
                }
            },
            "SetWrapperReferenceTo" => match child {
                Some(args) if args.class() == "Arguments" => {
                    attrs.insert(name, ExtAttrValue::Arguments(arguments_from_node(Some(args))?));
                }
                Some(other) => {
                    return Err(IdlError::structure(format!(
                        "[SetWrapperReferenceTo] only supports Arguments as child, but has child of class: {}",
                        other.class()
                    )))
                }
                None => {
                    return Err(IdlError::structure(
                        "[SetWrapperReferenceTo] requires a child, but has none.",
                    ))
                }
            },
            _ if child.is_some() => {
                return Err(IdlError::structure(format!(
                    "ExtAttributes node with unexpected children: {}",
                    name
                )))
            }
            _ => {
                attrs.insert(name, plain_value(attr_node));
            }
        }
    }

    if !constructors.is_empty() {
        attrs.insert("Constructors", ExtAttrValue::Overloads(constructors));
    }
    if !custom_constructors.is_empty() {
        attrs.insert("CustomConstructors", ExtAttrValue::Overloads(custom_constructors));
    }

    Ok(attrs)
}

fn plain_value<N: SyntaxNode>(node: &N) -> ExtAttrValue {
    match node.property("VALUE") {
        Some(PropertyValue::Bool(_)) | None => ExtAttrValue::Flag,
        Some(value) => ExtAttrValue::Value(value.to_text()),
    }
}

fn call_signature<N: SyntaxNode>(call: &N) -> IdlResult<CallSignature> {
    let children = call.children();
    let [arguments] = children else {
        return Err(IdlError::structure(format!(
            "NamedConstructor node expects 1 child, got {}.",
            children.len()
        )));
    };
    Ok(CallSignature {
        name: call.name_or_empty().to_string(),
        arguments: arguments_from_node(Some(arguments))?,
    })
}

/// Turn accumulated constructor overloads into synthetic operations
///
/// The plural keys are replaced by singleton `Constructor` / `CustomConstructor`
/// flags and a named constructor's value becomes its call name.
fn take_constructors(attrs: &mut ExtendedAttributes) -> (Vec<IdlOperation>, Vec<IdlOperation>) {
    let overloads = |value: Option<ExtAttrValue>| match value {
        Some(ExtAttrValue::Overloads(list)) => list,
        _ => Vec::new(),
    };

    let had_constructors = attrs.contains("Constructors");
    let had_custom = attrs.contains("CustomConstructors");

    let mut constructors: Vec<IdlOperation> = overloads(attrs.remove("Constructors"))
        .into_iter()
        .map(|args| IdlOperation::constructor("Constructor", args))
        .collect();
    let custom_constructors = overloads(attrs.remove("CustomConstructors"))
        .into_iter()
        .map(|args| IdlOperation::constructor("CustomConstructor", args))
        .collect();

    if let Some(ExtAttrValue::Call(call)) = attrs.get("NamedConstructor").cloned() {
        attrs.insert("NamedConstructor", ExtAttrValue::Value(call.name));
        constructors.push(IdlOperation::constructor("NamedConstructor", call.arguments));
    }

    if had_constructors {
        attrs.insert("Constructor", ExtAttrValue::Flag);
    }
    if had_custom {
        attrs.insert("CustomConstructor", ExtAttrValue::Flag);
    }

    (constructors, custom_constructors)
}

/// `Type` node: inner type plus optional `Array` suffix, `NULLABLE` property
pub fn type_node_to_type<N: SyntaxNode>(node: &N) -> IdlResult<IdlType> {
    let children = node.children();
    if !(1..=2).contains(&children.len()) {
        return Err(IdlError::structure(format!(
            "Type node expects 1 or 2 children (type + optional array []), got {} (multi-dimensional arrays are not supported).",
            children.len()
        )));
    }

    let is_array = match children.get(1) {
        Some(suffix) if suffix.class() == "Array" => true,
        Some(suffix) => {
            return Err(IdlError::structure(format!(
                "Expected Array node as TypeSuffix, got {} node.",
                suffix.class()
            )))
        }
        None => false,
    };

    type_node_inner_to_type(&children[0], is_array, node.has_property("NULLABLE"))
}

fn type_node_inner_to_type<N: SyntaxNode>(
    node: &N,
    is_array: bool,
    is_nullable: bool,
) -> IdlResult<IdlType> {
    let inner = match node.class() {
        "PrimitiveType" | "Typeref" => IdlType::named(node.name_or_empty()),
        "Any" => IdlType::named("any"),
        "Sequence" => {
            let children = node.children();
            let [element] = children else {
                return Err(IdlError::structure(format!(
                    "Sequence node expects exactly 1 child, got {}",
                    children.len()
                )));
            };
            if element.class() != "Type" {
                return Err(IdlError::unrecognized_node(element.class()));
            }
            IdlType::sequence(type_node_to_type(element)?)?
        }
        "UnionType" => IdlType::union(
            node.children()
                .iter()
                .map(type_node_to_type)
                .collect::<IdlResult<Vec<_>>>()?,
        )?,
        other => return Err(IdlError::unrecognized_node(other)),
    };

    // For `T[]?` the suffix applies to the element and nullability to the array
    if is_array {
        Ok(IdlType::array(inner)?.with_nullable(is_nullable))
    } else {
        Ok(inner.with_nullable(is_nullable))
    }
}

fn typedef_node_to_type<N: SyntaxNode>(node: &N) -> IdlResult<IdlType> {
    let children = node.children();
    let [child] = children else {
        return Err(IdlError::structure(format!(
            "Typedef node with {} children, expected 1",
            children.len()
        )));
    };
    if child.class() != "Type" {
        return Err(IdlError::unrecognized_node(child.class()));
    }
    type_node_to_type(child)
}
