//! Compiler configuration
//!
//! Parsed from an optional `idl-weld.toml`. Every field has a default that
//! reproduces the built-in behavior, so an empty file (or no file at all) is
//! a valid configuration.

use crate::error::{IdlError, IdlResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extended attributes that propagate from an interface to its descendants.
pub const DEFAULT_INHERITED_EXTENDED_ATTRIBUTES: &[&str] = &[
    "ActiveDOMObject",
    "DependentLifetime",
    "WillBeGarbageCollected",
];

/// Order in which ancestors' inheritable extended attributes are overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InheritanceOrder {
    /// Own attributes, then nearest parent, ..., then the root ancestor;
    /// the most distant ancestor wins on conflicting keys.
    #[default]
    FurthestWins,
    /// The interface's own value wins, then the nearest ancestor's.
    NearestWins,
}

/// Top-level compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CompilerConfig {
    /// Root that include paths are made relative to
    pub source_root: PathBuf,
    /// Extended attributes recorded as inherited in the global index
    pub inherited_extended_attributes: Vec<String>,
    /// Overlay order for inherited extended attributes
    pub inheritance_order: InheritanceOrder,
    /// Typedefs available to every source unit (name -> IDL type name)
    pub standard_typedefs: IndexMap<String, String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let mut standard_typedefs = IndexMap::new();
        standard_typedefs.insert("DOMTimeStamp".to_string(), "unsigned long long".to_string());

        Self {
            source_root: PathBuf::new(),
            inherited_extended_attributes: DEFAULT_INHERITED_EXTENDED_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            inheritance_order: InheritanceOrder::default(),
            standard_typedefs,
        }
    }
}

impl CompilerConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> IdlResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a file path
    pub fn from_file(path: &Path) -> IdlResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IdlError::config(format!("Failed to read config at {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Set the source root
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Set the inheritance overlay order
    pub fn with_inheritance_order(mut self, order: InheritanceOrder) -> Self {
        self.inheritance_order = order;
        self
    }

    /// Whether an extended attribute is propagated to descendants
    pub fn is_inherited_extended_attribute(&self, name: &str) -> bool {
        self.inherited_extended_attributes.iter().any(|n| n == name)
    }

    fn validate(&self) -> IdlResult<()> {
        for (name, target) in &self.standard_typedefs {
            if name.trim().is_empty() || target.trim().is_empty() {
                return Err(IdlError::config(format!(
                    "standard typedef '{}' = '{}' must have a name and a target",
                    name, target
                )));
            }
        }
        Ok(())
    }
}
