//! Read-only facts shared by every generator of a build
//!
//! A [`BindingContext`] is assembled once from the global index and the
//! definitions of the unit being compiled, then borrowed immutably by the
//! type mapper and the generators.

use crate::index::InterfaceIndex;
use crate::ir::{IdlDefinitions, IdlType, InterfaceDefinition, InterfaceMembers, TypeLookup};
use std::collections::{BTreeMap, BTreeSet};

/// Override tables and per-build type facts
#[derive(Debug, Clone, Default)]
pub struct BindingContext {
    implemented_as: BTreeMap<String, String>,
    garbage_collected: BTreeSet<String>,
    callback_interfaces: BTreeSet<String>,
    ancestors: BTreeMap<String, Vec<String>>,
    enums: BTreeMap<String, Vec<String>>,
    callback_functions: BTreeSet<String>,
    referenced_interfaces: BTreeMap<String, InterfaceDefinition>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the project-wide tables from the interface index
    pub fn from_index(index: &InterfaceIndex) -> Self {
        Self {
            implemented_as: index.implemented_as_map(),
            garbage_collected: index.garbage_collected_set(),
            callback_interfaces: index.callback_interface_set(),
            ancestors: index
                .iter()
                .map(|(name, info)| (name.clone(), info.ancestors.clone()))
                .collect(),
            ..Default::default()
        }
    }

    /// Register the enums and callback functions of a unit
    pub fn with_definitions(mut self, definitions: &IdlDefinitions) -> Self {
        for (name, enumeration) in &definitions.enumerations {
            self.enums.insert(name.clone(), enumeration.values.clone());
        }
        self.callback_functions
            .extend(definitions.callback_functions.keys().cloned());
        for definition in definitions.interfaces.values() {
            if definition.is_callback() {
                self.callback_interfaces.insert(definition.name().to_string());
            }
        }
        self
    }

    /// Register an interface whose members are introspected (`[PutForwards]`)
    pub fn with_referenced_interface(mut self, definition: InterfaceDefinition) -> Self {
        self.referenced_interfaces
            .insert(definition.name().to_string(), definition);
        self
    }

    pub fn with_implemented_as(mut self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.implemented_as.insert(name.into(), class.into());
        self
    }

    pub fn with_garbage_collected(mut self, name: impl Into<String>) -> Self {
        self.garbage_collected.insert(name.into());
        self
    }

    pub fn with_callback_interface(mut self, name: impl Into<String>) -> Self {
        self.callback_interfaces.insert(name.into());
        self
    }

    pub fn with_callback_function(mut self, name: impl Into<String>) -> Self {
        self.callback_functions.insert(name.into());
        self
    }

    pub fn with_enum(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.enums.insert(name.into(), values);
        self
    }

    /// Ancestors of `name`, nearest first
    pub fn with_ancestors(mut self, name: impl Into<String>, ancestors: Vec<String>) -> Self {
        self.ancestors.insert(name.into(), ancestors);
        self
    }

    /// Class implementing `name` (`[ImplementedAs]` or the name itself)
    pub fn implemented_as<'a>(&'a self, name: &'a str) -> &'a str {
        self.implemented_as
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    pub fn is_garbage_collected(&self, name: &str) -> bool {
        self.garbage_collected.contains(name)
    }

    /// Whether the base type of `idl_type` is `[WillBeGarbageCollected]`
    pub fn is_will_be_garbage_collected(&self, idl_type: &IdlType) -> bool {
        idl_type
            .base_type()
            .is_some_and(|base| self.is_garbage_collected(base))
    }

    /// Whether `name` is `ancestor` or inherits from it
    pub fn inherits_interface(&self, name: &str, ancestor: &str) -> bool {
        name == ancestor
            || self
                .ancestors
                .get(name)
                .is_some_and(|chain| chain.iter().any(|a| a == ancestor))
    }

    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    pub fn referenced_interface(&self, name: &str) -> Option<&InterfaceDefinition> {
        self.referenced_interfaces.get(name)
    }
}

impl TypeLookup for BindingContext {
    fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    fn is_callback_function(&self, name: &str) -> bool {
        self.callback_functions.contains(name)
    }

    fn is_callback_interface(&self, name: &str) -> bool {
        self.callback_interfaces.contains(name)
    }
}
