//! Intermediate Representation (IR) for IDL source units
//!
//! This module provides the type system, the syntax tree boundary and the
//! typed definition records built from a parsed tree.

pub mod attrs;
pub mod definitions;
pub mod syntax;
pub mod types;

pub use attrs::*;
pub use definitions::*;
pub use syntax::*;
pub use types::*;
