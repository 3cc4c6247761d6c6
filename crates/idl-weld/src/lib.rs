//! IDL-Weld: binding content generation from interface definitions
//!
//! This crate is the front half of an IDL compiler. It turns parsed interface
//! definitions into the data a template needs to emit native binding code
//! for a script engine.
//!
//! # Architecture
//!
//! - `ir`: Type system, syntax tree boundary and typed definition records
//! - `index`: Project-wide interface index built from raw IDL text
//! - `codegen`: Type mapping and per-interface content generation
//! - `render`: Template rendering boundary
//! - `compiler`: Pipeline driver sequencing the stages
//!
//! # Usage
//!
//! ```rust,ignore
//! use idl_weld::{CompilerConfig, IdlCompiler, IdlSource};
//!
//! let sources = IdlSource::read_all(&idl_paths)?;
//! let compiler = IdlCompiler::from_sources(CompilerConfig::default(), &sources)?;
//! let outcome = compiler.compile_all(&parsed_trees);
//! for (name, err) in &outcome.failures {
//!     eprintln!("{}: {}", name, err);
//! }
//! ```

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod index;
pub mod ir;
pub mod render;

// Re-export commonly used types
pub use codegen::{
    BindingContext, CallbackInterfaceContent, CallbackInterfaceGenerator, IncludeSet, InterfaceContent,
    InterfaceGenerator, TypeMapper,
};
pub use compiler::{BatchOutcome, BindingContent, CompiledBinding, IdlCompiler, SyntaxTreeSource};
pub use config::{CompilerConfig, InheritanceOrder};
pub use error::{IdlError, IdlResult};
pub use index::{IdlSource, InterfaceIndex, InterfaceInfo};
pub use ir::{AstNode, IdlDefinitions, IdlType, InterfaceDefinition, SyntaxNode};
pub use render::{render_binding, HandlebarsRenderer, RenderedBinding, TemplateRenderer};
