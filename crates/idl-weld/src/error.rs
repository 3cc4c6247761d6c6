//! Error types for the IDL compiler
//!
//! Every stage fails fast: errors are raised at the point of detection and
//! never recovered locally. The batch driver in [`crate::compiler`] is the
//! only place that collects errors instead of propagating them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for idl-weld operations
pub type IdlResult<T> = Result<T, IdlError>;

/// Main error type for idl-weld
#[derive(Debug, Error)]
pub enum IdlError {
    /// Unrecognized or malformed declaration shape in the syntax tree
    #[error("Structure error: {0}")]
    Structure(String),

    /// `A implements B;` where `A` is not the interface declared by the file
    #[error("Naming error in {file}: expected '{expected}' on the left of 'implements', found '{found}'")]
    Naming {
        file: PathBuf,
        expected: String,
        found: String,
    },

    /// An implemented or referenced interface is not present in the index
    #[error("Could not find the IDL file where the following interface is defined: {0}")]
    MissingDependency(String),

    /// Disallowed type nesting (array of sequences, array of unions, ...)
    #[error("Unsupported type shape: {0}")]
    UnsupportedTypeShape(String),

    /// An extended attribute carries a value with no conversion rule
    #[error("Unrecognized value for [{name}]: '{value}'")]
    UnrecognizedTraitValue { name: String, value: String },

    /// Typedefs referring to each other in a loop
    #[error("Cyclic typedef: {}", .0.join(" -> "))]
    CyclicTypedef(Vec<String>),

    /// Parent chain that loops back on itself
    #[error("Cyclic inheritance: {}", .0.join(" -> "))]
    CyclicInheritance(Vec<String>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Template registration or rendering error
    #[error("Template error: {0}")]
    Template(String),
}

impl IdlError {
    /// Create a structure error
    pub fn structure(message: impl Into<String>) -> Self {
        IdlError::Structure(message.into())
    }

    /// Create a structure error for an unexpected node class
    pub fn unrecognized_node(class: &str) -> Self {
        IdlError::Structure(format!("Unrecognized node class: {}", class))
    }

    /// Create an unsupported type shape error
    pub fn unsupported(message: impl Into<String>) -> Self {
        IdlError::UnsupportedTypeShape(message.into())
    }

    /// Create an unrecognized extended attribute value error
    pub fn unrecognized_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        IdlError::UnrecognizedTraitValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        IdlError::Config(message.into())
    }
}

impl From<toml::de::Error> for IdlError {
    fn from(err: toml::de::Error) -> Self {
        IdlError::Config(err.to_string())
    }
}

impl From<handlebars::TemplateError> for IdlError {
    fn from(err: handlebars::TemplateError) -> Self {
        IdlError::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for IdlError {
    fn from(err: handlebars::RenderError) -> Self {
        IdlError::Template(err.to_string())
    }
}
