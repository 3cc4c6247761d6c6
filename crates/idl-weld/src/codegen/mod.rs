//! Binding content generation
//!
//! This module provides:
//! - The type-mapping engine (host types, conversions, include sets)
//! - Per-member content generators for attributes and operations
//! - Interface and callback interface generators producing template contexts

pub mod attributes;
pub mod callback;
pub mod context;
pub mod includes;
pub mod interface;
pub mod methods;
pub mod types;
pub mod utilities;

pub use attributes::{AttributeContent, AttributeGenerator};
pub use callback::{CallbackInterfaceContent, CallbackInterfaceGenerator};
pub use context::BindingContext;
pub use includes::IncludeSet;
pub use interface::{InterfaceContent, InterfaceGenerator};
pub use methods::{MethodContent, MethodGenerator};
pub use types::{HostType, HostTypeOptions, Release, ReturnValueOptions, SetReturnValue, TypeMapper};
