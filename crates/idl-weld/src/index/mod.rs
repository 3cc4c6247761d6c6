//! Global interface index
//!
//! Built once per build from every IDL file of the project, before any code
//! generation, and read-only afterwards. Pass 1 extracts per-file facts and
//! sets aside partial interface fragments; pass 2 walks parent chains to
//! compute ancestors and inherited extended attributes, and collects each
//! interface's cross-file dependencies.
//!
//! The index serializes to JSON keyed by interface name, which is the shape
//! the persisted index takes between build steps.

pub mod extract;

use crate::config::{CompilerConfig, InheritanceOrder};
use crate::error::{IdlError, IdlResult};
use crate::ir::ExtendedAttributes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Raw text of one IDL file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlSource {
    pub path: PathBuf,
    pub contents: String,
}

impl IdlSource {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read a source from disk
    pub fn read(path: impl AsRef<Path>) -> IdlResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Ok(Self::new(path, contents))
    }

    /// Read every path of a list
    pub fn read_all<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> IdlResult<Vec<Self>> {
        paths.into_iter().map(Self::read).collect()
    }

    /// File stem, which names the interface a non-partial file declares
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Index entry for one interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub full_path: PathBuf,
    /// Header for `#include`; `None` under `[NoHeader]`
    pub include_path: Option<String>,
    pub implemented_as: Option<String>,
    pub is_callback_interface: bool,
    pub implements_interfaces: Vec<String>,
    /// Interfaces introspected during generation (`[PutForwards]` targets)
    pub referenced_interfaces: Vec<String>,
    /// Nearest first
    pub ancestors: Vec<String>,
    pub inherited_extended_attributes: ExtendedAttributes,
    pub dependencies_full_paths: Vec<PathBuf>,
    pub dependencies_include_paths: Vec<String>,
}

#[derive(Debug, Default)]
struct PartialPaths {
    full_paths: Vec<PathBuf>,
    include_paths: Vec<String>,
}

/// Project-wide interface index, keyed by interface name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceIndex {
    interfaces: BTreeMap<String, InterfaceInfo>,
}

impl InterfaceIndex {
    /// Build the index from every source of the project
    pub fn compute(sources: &[IdlSource], config: &CompilerConfig) -> IdlResult<Self> {
        let mut index = Self::default();
        let mut partials: IndexMap<String, PartialPaths> = IndexMap::new();
        let mut parents: BTreeMap<String, String> = BTreeMap::new();
        let mut own_inherited: BTreeMap<String, ExtendedAttributes> = BTreeMap::new();

        // Pass 1: per-file facts
        for source in sources {
            let stem = source.stem();
            let facts = extract::extract_facts(&source.path, &stem, &source.contents)?;
            let implemented_as = facts.extended_attributes.value("ImplementedAs").map(str::to_string);
            let include_path = if facts.extended_attributes.contains("NoHeader") {
                None
            } else {
                Some(include_path(
                    &source.path,
                    &config.source_root,
                    implemented_as.as_deref(),
                ))
            };

            if let Some(extended) = facts.partial_interface {
                trace!(path = %source.path.display(), interface = %extended, "idl.index partial");
                let paths = partials.entry(extended).or_default();
                paths.full_paths.push(source.path.clone());
                paths.include_paths.extend(include_path);
                continue;
            }

            trace!(path = %source.path.display(), interface = %stem, "idl.index file");

            let inherited: ExtendedAttributes = facts
                .extended_attributes
                .iter()
                .filter(|(name, _)| config.is_inherited_extended_attribute(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            own_inherited.insert(stem.clone(), inherited);
            if let Some(parent) = facts.parent {
                parents.insert(stem.clone(), parent);
            }

            index.interfaces.insert(
                stem,
                InterfaceInfo {
                    full_path: source.path.clone(),
                    include_path,
                    implemented_as,
                    is_callback_interface: facts.is_callback_interface,
                    implements_interfaces: facts.implemented_interfaces,
                    referenced_interfaces: facts.put_forwards_interfaces,
                    ..Default::default()
                },
            );
        }

        debug!(
            interfaces = index.interfaces.len(),
            partials = partials.len(),
            "idl.index pass 1 complete"
        );

        // Pass 2: inheritance
        let names: Vec<String> = index.interfaces.keys().cloned().collect();
        for name in &names {
            let ancestors = ancestors_of(name, &parents)?;
            let mut inherited = own_inherited.get(name).cloned().unwrap_or_default();
            for ancestor in &ancestors {
                // Ancestors outside the project contribute nothing
                let Some(attrs) = own_inherited.get(ancestor) else {
                    continue;
                };
                for (key, value) in attrs.iter() {
                    let overwrite = match config.inheritance_order {
                        InheritanceOrder::FurthestWins => true,
                        InheritanceOrder::NearestWins => !inherited.contains(key),
                    };
                    if overwrite {
                        inherited.insert(key.clone(), value.clone());
                    }
                }
            }

            if let Some(info) = index.interfaces.get_mut(name) {
                info.ancestors = ancestors;
                info.inherited_extended_attributes = inherited;
            }
        }

        // Pass 2: dependencies
        for name in &names {
            let implemented = index.interfaces[name].implements_interfaces.clone();
            let mut full_paths = Vec::new();
            let mut include_paths = Vec::new();

            if let Some(partial) = partials.get(name) {
                full_paths.extend(partial.full_paths.iter().cloned());
                include_paths.extend(partial.include_paths.iter().cloned());
            }
            for implemented_name in &implemented {
                let info = index
                    .interfaces
                    .get(implemented_name)
                    .ok_or_else(|| IdlError::MissingDependency(implemented_name.clone()))?;
                full_paths.push(info.full_path.clone());
                include_paths.extend(info.include_path.iter().cloned());
            }

            if let Some(info) = index.interfaces.get_mut(name) {
                info.dependencies_full_paths = full_paths;
                info.dependencies_include_paths = include_paths;
            }
        }

        debug!(interfaces = index.interfaces.len(), "idl.index pass 2 complete");
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, info: InterfaceInfo) {
        self.interfaces.insert(name.into(), info);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InterfaceInfo)> {
        self.interfaces.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.interfaces.keys()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Whether `name` is `ancestor` or has it among its ancestors
    pub fn inherits_interface(&self, name: &str, ancestor: &str) -> bool {
        name == ancestor
            || self
                .get(name)
                .is_some_and(|info| info.ancestors.iter().any(|a| a == ancestor))
    }

    /// Interface name -> `[ImplementedAs]` class name
    pub fn implemented_as_map(&self) -> BTreeMap<String, String> {
        self.interfaces
            .iter()
            .filter_map(|(name, info)| {
                info.implemented_as
                    .as_ref()
                    .map(|class| (name.clone(), class.clone()))
            })
            .collect()
    }

    /// Interfaces that are, or inherit being, `[WillBeGarbageCollected]`
    pub fn garbage_collected_set(&self) -> BTreeSet<String> {
        self.interfaces
            .iter()
            .filter(|(_, info)| {
                info.inherited_extended_attributes
                    .contains("WillBeGarbageCollected")
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn callback_interface_set(&self) -> BTreeSet<String> {
        self.interfaces
            .iter()
            .filter(|(_, info)| info.is_callback_interface)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn to_json(&self) -> IdlResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> IdlResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Ancestors nearest first, failing if the chain loops
fn ancestors_of(name: &str, parents: &BTreeMap<String, String>) -> IdlResult<Vec<String>> {
    let mut chain = vec![name.to_string()];
    let mut current = name;
    while let Some(parent) = parents.get(current) {
        if chain.contains(parent) {
            chain.push(parent.clone());
            return Err(IdlError::CyclicInheritance(chain));
        }
        chain.push(parent.clone());
        current = parent;
    }
    chain.remove(0);
    Ok(chain)
}

/// `<dir relative to source_root>/<class>.h`, always with `/` separators
pub fn include_path(path: &Path, source_root: &Path, implemented_as: Option<&str>) -> String {
    let relative = path.strip_prefix(source_root).unwrap_or(path);
    let mut parts: Vec<String> = relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    Component::ParentDir => Some("..".to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let class = match implemented_as {
        Some(class) => class.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    parts.push(format!("{}.h", class));
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ExtAttrValue;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn config() -> CompilerConfig {
        CompilerConfig::default().with_source_root("Source")
    }

    fn sources() -> Vec<IdlSource> {
        vec![
            IdlSource::new(
                "Source/core/events/EventTarget.idl",
                "[Custom=ToV8, WillBeGarbageCollected=Root] interface EventTarget {};",
            ),
            IdlSource::new(
                "Source/core/dom/Node.idl",
                "[DependentLifetime, WillBeGarbageCollected=Node] interface Node : EventTarget {};\n\
                 Node implements ParentNode;",
            ),
            IdlSource::new(
                "Source/core/dom/ParentNode.idl",
                "[NoInterfaceObject, ImplementedAs=ParentNodeImpl] interface ParentNode {};",
            ),
            IdlSource::new(
                "Source/core/dom/Element.idl",
                "[ActiveDOMObject] interface Element : Node {};",
            ),
            IdlSource::new(
                "Source/modules/fullscreen/ElementFullscreen.idl",
                "[NoHeader] partial interface Element { void requestFullscreen(); };",
            ),
            IdlSource::new(
                "Source/modules/quota/ElementQuota.idl",
                "partial interface Element { };",
            ),
        ]
    }

    #[test]
    fn test_pass_one_facts() {
        let index = InterfaceIndex::compute(&sources(), &config()).unwrap();

        let names: Vec<&String> = index.names().collect();
        assert_eq!(names, vec!["Element", "EventTarget", "Node", "ParentNode"]);

        let parent_node = index.get("ParentNode").unwrap();
        assert_eq!(parent_node.implemented_as.as_deref(), Some("ParentNodeImpl"));
        assert_eq!(parent_node.include_path.as_deref(), Some("core/dom/ParentNodeImpl.h"));
        assert!(parent_node.inherited_extended_attributes.is_empty());

        // Partial fragments are never indexed under their own identity
        assert!(!index.contains("ElementFullscreen"));
        assert!(!index.contains("ElementQuota"));
    }

    #[test]
    fn test_inheritance_furthest_wins() {
        let index = InterfaceIndex::compute(&sources(), &config()).unwrap();

        let element = index.get("Element").unwrap();
        assert_eq!(element.ancestors, vec!["Node", "EventTarget"]);
        let attrs = &element.inherited_extended_attributes;
        assert!(attrs.contains("ActiveDOMObject"));
        assert!(attrs.contains("DependentLifetime"));
        assert_eq!(attrs.value("WillBeGarbageCollected"), Some("Root"));
        assert!(!attrs.contains("Custom"));

        assert!(index.inherits_interface("Element", "EventTarget"));
        assert!(index.inherits_interface("Element", "Element"));
        assert!(!index.inherits_interface("EventTarget", "Node"));
    }

    #[test]
    fn test_inheritance_nearest_wins() {
        let config = config().with_inheritance_order(InheritanceOrder::NearestWins);
        let index = InterfaceIndex::compute(&sources(), &config).unwrap();
        let attrs = &index.get("Element").unwrap().inherited_extended_attributes;
        assert_eq!(attrs.value("WillBeGarbageCollected"), Some("Node"));
    }

    #[test]
    fn test_base_derived_scenario() {
        let sources = vec![
            IdlSource::new("Base.idl", "[ActiveDOMObject] interface Base {};"),
            IdlSource::new("Derived.idl", "interface Derived : Base {};"),
        ];
        let index = InterfaceIndex::compute(&sources, &CompilerConfig::default()).unwrap();
        let derived = index.get("Derived").unwrap();
        assert_eq!(derived.ancestors, vec!["Base"]);
        assert_eq!(
            derived.inherited_extended_attributes.get("ActiveDOMObject"),
            Some(&ExtAttrValue::Flag)
        );
        assert_eq!(derived.include_path.as_deref(), Some("Derived.h"));
    }

    #[test]
    fn test_missing_ancestor_contributes_nothing() {
        let sources = vec![IdlSource::new(
            "Orphan.idl",
            "[DependentLifetime] interface Orphan : Generated {};",
        )];
        let index = InterfaceIndex::compute(&sources, &CompilerConfig::default()).unwrap();
        let orphan = index.get("Orphan").unwrap();
        assert_eq!(orphan.ancestors, vec!["Generated"]);
        assert_eq!(orphan.inherited_extended_attributes.len(), 1);
    }

    #[test]
    fn test_dependencies() {
        let index = InterfaceIndex::compute(&sources(), &config()).unwrap();

        let element = index.get("Element").unwrap();
        assert_eq!(
            element.dependencies_full_paths,
            vec![
                PathBuf::from("Source/modules/fullscreen/ElementFullscreen.idl"),
                PathBuf::from("Source/modules/quota/ElementQuota.idl"),
            ]
        );
        // [NoHeader] fragment contributes its path but no header
        assert_eq!(element.dependencies_include_paths, vec!["modules/quota/ElementQuota.h"]);

        let node = index.get("Node").unwrap();
        assert_eq!(node.implements_interfaces, vec!["ParentNode"]);
        assert_eq!(
            node.dependencies_full_paths,
            vec![PathBuf::from("Source/core/dom/ParentNode.idl")]
        );
        assert_eq!(node.dependencies_include_paths, vec!["core/dom/ParentNodeImpl.h"]);
    }

    #[test]
    fn test_missing_dependency() {
        let sources = vec![IdlSource::new("Foo.idl", "interface Foo {};\nFoo implements Baz;")];
        match InterfaceIndex::compute(&sources, &CompilerConfig::default()) {
            Err(IdlError::MissingDependency(name)) => assert_eq!(name, "Baz"),
            other => panic!("expected missing dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_cyclic_inheritance() {
        let sources = vec![
            IdlSource::new("A.idl", "interface A : B {};"),
            IdlSource::new("B.idl", "interface B : A {};"),
        ];
        match InterfaceIndex::compute(&sources, &CompilerConfig::default()) {
            Err(IdlError::CyclicInheritance(chain)) => assert_eq!(chain, vec!["A", "B", "A"]),
            other => panic!("expected cyclic inheritance, got {:?}", other),
        }
    }

    #[test]
    fn test_derived_sets() {
        let index = InterfaceIndex::compute(&sources(), &config()).unwrap();
        assert_eq!(
            index.implemented_as_map().get("ParentNode").map(String::as_str),
            Some("ParentNodeImpl")
        );
        let gc: Vec<String> = index.garbage_collected_set().into_iter().collect();
        assert_eq!(gc, vec!["Element", "EventTarget", "Node"]);
        assert!(index.callback_interface_set().is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let index = InterfaceIndex::compute(&sources(), &config()).unwrap();
        let json = index.to_json().unwrap();
        assert!(json.find("\"Element\"").unwrap() < json.find("\"Node\"").unwrap());
        assert_eq!(InterfaceIndex::from_json(&json).unwrap(), index);
    }

    #[test]
    fn test_read_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Window.idl");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "callback interface Window {{ }};").unwrap();

        let sources = IdlSource::read_all([&path]).unwrap();
        assert_eq!(sources[0].stem(), "Window");

        let index = InterfaceIndex::compute(&sources, &CompilerConfig::default()).unwrap();
        assert!(index.get("Window").unwrap().is_callback_interface);

        assert!(matches!(
            IdlSource::read(dir.path().join("Missing.idl")),
            Err(IdlError::Io(_))
        ));
    }

    #[test]
    fn test_include_path() {
        assert_eq!(
            include_path(Path::new("/src/core/dom/Node.idl"), Path::new("/src"), None),
            "core/dom/Node.h"
        );
        assert_eq!(
            include_path(Path::new("/src/core/dom/Node.idl"), Path::new("/src"), Some("NodeImpl")),
            "core/dom/NodeImpl.h"
        );
        assert_eq!(include_path(Path::new("Node.idl"), Path::new(""), None), "Node.h");
    }
}
