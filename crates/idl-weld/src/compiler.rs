//! Compiler driver
//!
//! [`IdlCompiler`] sequences the stages for one interface at a time: load the
//! interface's syntax tree, build its definitions, overlay the inherited
//! extended attributes recorded in the global index, merge partial and
//! implemented interface fragments, register referenced interfaces, then run
//! the matching content generator.
//!
//! Parsing stays outside the crate. Trees are requested by path from a
//! [`SyntaxTreeSource`], using the paths the index recorded.

use crate::codegen::{
    BindingContext, CallbackInterfaceContent, CallbackInterfaceGenerator, InterfaceContent, InterfaceGenerator,
};
use crate::config::CompilerConfig;
use crate::error::{IdlError, IdlResult};
use crate::index::{IdlSource, InterfaceIndex};
use crate::ir::{IdlDefinitions, InterfaceDefinition, SyntaxNode};
use crate::render::{render_binding, RenderedBinding, TemplateRenderer};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extended attributes a dependency's interface passes on to its members
const DEPENDENCY_EXTENDED_ATTRIBUTES: &[&str] = &["Conditional", "PerContextEnabled", "RuntimeEnabled"];

/// Supplies parsed syntax trees by source path
pub trait SyntaxTreeSource {
    type Node: SyntaxNode;

    fn load(&self, path: &Path) -> IdlResult<Self::Node>;
}

impl<N: SyntaxNode + Clone> SyntaxTreeSource for BTreeMap<PathBuf, N> {
    type Node = N;

    fn load(&self, path: &Path) -> IdlResult<N> {
        self.get(path)
            .cloned()
            .ok_or_else(|| IdlError::MissingDependency(path.display().to_string()))
    }
}

impl<N: SyntaxNode + Clone> SyntaxTreeSource for HashMap<PathBuf, N> {
    type Node = N;

    fn load(&self, path: &Path) -> IdlResult<N> {
        self.get(path)
            .cloned()
            .ok_or_else(|| IdlError::MissingDependency(path.display().to_string()))
    }
}

/// Generated content of one binding
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BindingContent {
    Interface(Box<InterfaceContent>),
    CallbackInterface(CallbackInterfaceContent),
}

impl BindingContent {
    /// Logical template name (`interface`, `callback_interface`)
    pub fn template_name(&self) -> &'static str {
        match self {
            BindingContent::Interface(_) => "interface",
            BindingContent::CallbackInterface(_) => "callback_interface",
        }
    }
}

/// Result of compiling one interface
#[derive(Debug, Clone, Serialize)]
pub struct CompiledBinding {
    pub name: String,
    pub content: BindingContent,
}

impl CompiledBinding {
    /// Render the header and implementation through `renderer`
    pub fn render<R: TemplateRenderer + ?Sized>(&self, renderer: &R) -> IdlResult<RenderedBinding> {
        render_binding(renderer, self.content.template_name(), &self.content)
    }
}

/// Successes and failures of a batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub compiled: Vec<CompiledBinding>,
    pub failures: Vec<(String, IdlError)>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pipeline driver over a computed global index
pub struct IdlCompiler {
    config: CompilerConfig,
    index: InterfaceIndex,
}

impl IdlCompiler {
    pub fn new(config: CompilerConfig, index: InterfaceIndex) -> Self {
        Self { config, index }
    }

    /// Compute the global index from every source of the project
    pub fn from_sources(config: CompilerConfig, sources: &[IdlSource]) -> IdlResult<Self> {
        let index = InterfaceIndex::compute(sources, &config)?;
        debug!(interfaces = index.len(), "idl.compile index ready");
        Ok(Self::new(config, index))
    }

    /// Load the configuration from a TOML file, then compute the index
    pub fn from_config_file(path: &Path, sources: &[IdlSource]) -> IdlResult<Self> {
        Self::from_sources(CompilerConfig::from_file(path)?, sources)
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn index(&self) -> &InterfaceIndex {
        &self.index
    }

    /// Definitions of one tree, typedefs resolved
    pub fn build_definitions<N: SyntaxNode>(&self, root: &N) -> IdlResult<IdlDefinitions> {
        IdlDefinitions::build_with_typedefs(root, &self.config.standard_typedefs)
    }

    /// Compile the interface `name`
    pub fn compile<S: SyntaxTreeSource>(&self, name: &str, trees: &S) -> IdlResult<CompiledBinding> {
        let info = self
            .index
            .get(name)
            .ok_or_else(|| IdlError::MissingDependency(name.to_string()))?;

        let mut definitions = self.build_definitions(&trees.load(&info.full_path)?)?;
        let mut target = definitions
            .interfaces
            .shift_remove(name)
            .ok_or_else(|| IdlError::structure(format!("{} does not declare interface '{}'", info.full_path.display(), name)))?;

        for (key, value) in info.inherited_extended_attributes.iter() {
            extended_attributes_mut(&mut target).insert(key.clone(), value.clone());
        }

        for path in &info.dependencies_full_paths {
            let dependency_definitions = self.build_definitions(&trees.load(path)?)?;
            merge_dependency(&mut definitions, &mut target, dependency_definitions, path)?;
        }

        let mut context = BindingContext::from_index(&self.index).with_definitions(&definitions);
        for referenced in &info.referenced_interfaces {
            let referenced_info = self
                .index
                .get(referenced)
                .ok_or_else(|| IdlError::MissingDependency(referenced.clone()))?;
            let referenced_definitions = self.build_definitions(&trees.load(&referenced_info.full_path)?)?;
            for (_, definition) in referenced_definitions.interfaces {
                context = context.with_referenced_interface(definition);
            }
        }
        if target.is_callback() {
            context = context.with_callback_interface(name);
        }

        debug!(
            interface = %name,
            dependencies = info.dependencies_full_paths.len(),
            referenced = info.referenced_interfaces.len(),
            "idl.compile"
        );

        let content = if target.is_callback() {
            BindingContent::CallbackInterface(CallbackInterfaceGenerator::new(&context).generate(&target)?)
        } else {
            BindingContent::Interface(Box::new(InterfaceGenerator::new(&context).generate(&target)?))
        };
        Ok(CompiledBinding {
            name: name.to_string(),
            content,
        })
    }

    /// Compile every interface in `names`, collecting failures instead of stopping
    pub fn compile_batch<'n, S, I>(&self, names: I, trees: &S) -> BatchOutcome
    where
        S: SyntaxTreeSource,
        I: IntoIterator<Item = &'n str>,
    {
        let mut outcome = BatchOutcome::default();
        for name in names {
            match self.compile(name, trees) {
                Ok(binding) => outcome.compiled.push(binding),
                Err(err) => {
                    warn!(interface = %name, error = %err, "idl.compile failed");
                    outcome.failures.push((name.to_string(), err));
                }
            }
        }
        debug!(
            compiled = outcome.compiled.len(),
            failed = outcome.failures.len(),
            "idl.compile batch complete"
        );
        outcome
    }

    /// Compile every interface in the index
    pub fn compile_all<S: SyntaxTreeSource>(&self, trees: &S) -> BatchOutcome {
        let names: Vec<String> = self.index.names().cloned().collect();
        self.compile_batch(names.iter().map(String::as_str), trees)
    }
}

fn extended_attributes_mut(definition: &mut InterfaceDefinition) -> &mut crate::ir::ExtendedAttributes {
    match definition {
        InterfaceDefinition::Interface(interface) => &mut interface.extended_attributes,
        InterfaceDefinition::Exception(exception) => &mut exception.extended_attributes,
    }
}

/// Fold a partial or implemented interface file into `target`
///
/// Members inherit the fragment's gating attributes unless they set their own;
/// members of a partial interface are implemented by the fragment's class.
fn merge_dependency(
    definitions: &mut IdlDefinitions,
    target: &mut InterfaceDefinition,
    dependency: IdlDefinitions,
    path: &Path,
) -> IdlResult<()> {
    let IdlDefinitions {
        callback_functions,
        enumerations,
        interfaces,
    } = dependency;
    definitions.callback_functions.extend(callback_functions);
    definitions.enumerations.extend(enumerations);

    let basename = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let Some((_, InterfaceDefinition::Interface(mut fragment))) = interfaces.into_iter().next() else {
        return Err(IdlError::structure(format!(
            "{} does not declare an interface",
            path.display()
        )));
    };
    let InterfaceDefinition::Interface(target) = target else {
        return Err(IdlError::structure(format!(
            "exceptions cannot take members from {}",
            path.display()
        )));
    };

    let mut transferred: Vec<(String, crate::ir::ExtAttrValue)> = fragment
        .extended_attributes
        .iter()
        .filter(|(key, _)| DEPENDENCY_EXTENDED_ATTRIBUTES.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if fragment.is_partial {
        let implemented_by = fragment
            .extended_attributes
            .value("ImplementedAs")
            .map(str::to_string)
            .unwrap_or(basename);
        transferred.push(("ImplementedBy".to_string(), crate::ir::ExtAttrValue::Value(implemented_by)));
    }

    let member_attributes = fragment
        .attributes
        .iter_mut()
        .map(|a| &mut a.extended_attributes)
        .chain(fragment.constants.iter_mut().map(|c| &mut c.extended_attributes))
        .chain(fragment.operations.iter_mut().map(|o| &mut o.extended_attributes));
    for attributes in member_attributes {
        for (key, value) in &transferred {
            if !attributes.contains(key) {
                attributes.insert(key.clone(), value.clone());
            }
        }
    }

    target.attributes.append(&mut fragment.attributes);
    target.constants.append(&mut fragment.constants);
    target.operations.append(&mut fragment.operations);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::{attribute, ext_attrs, file, interface, operation, ty};
    use crate::ir::{AstNode, InterfaceMembers};
    use pretty_assertions::assert_eq;

    fn project() -> (Vec<IdlSource>, BTreeMap<PathBuf, AstNode>) {
        let sources = vec![
            IdlSource::new("core/Base.idl", "[ActiveDOMObject] interface Base {};"),
            IdlSource::new("core/Derived.idl", "interface Derived : Base {};"),
            IdlSource::new(
                "modules/DerivedExtras.idl",
                "[RuntimeEnabled=Extras] partial interface Derived {};",
            ),
            IdlSource::new("core/VoidCallback.idl", "callback interface VoidCallback {};"),
            IdlSource::new("core/BadCallback.idl", "callback interface BadCallback {};"),
        ];

        let mut trees = BTreeMap::new();
        trees.insert(
            PathBuf::from("core/Base.idl"),
            file([interface("Base", [ext_attrs([("ActiveDOMObject", None)])])]),
        );
        trees.insert(
            PathBuf::from("core/Derived.idl"),
            file([interface(
                "Derived",
                [
                    AstNode::named("Inherit", "Base"),
                    attribute("size", ty("unsigned long")).with_flag("READONLY"),
                ],
            )]),
        );
        trees.insert(
            PathBuf::from("modules/DerivedExtras.idl"),
            file([interface(
                "Derived",
                [
                    ext_attrs([("RuntimeEnabled", Some("Extras"))]),
                    operation("extra", ty("void"), []),
                ],
            )
            .with_flag("Partial")]),
        );
        trees.insert(
            PathBuf::from("core/VoidCallback.idl"),
            file([interface("VoidCallback", [operation("handleEvent", ty("void"), [])]).with_flag("CALLBACK")]),
        );
        trees.insert(
            PathBuf::from("core/BadCallback.idl"),
            file([interface("BadCallback", [operation("handleEvent", ty("long"), [])]).with_flag("CALLBACK")]),
        );
        (sources, trees)
    }

    fn compiler() -> (IdlCompiler, BTreeMap<PathBuf, AstNode>) {
        let (sources, trees) = project();
        (IdlCompiler::from_sources(CompilerConfig::default(), &sources).unwrap(), trees)
    }

    fn interface_content(binding: &CompiledBinding) -> &InterfaceContent {
        match &binding.content {
            BindingContent::Interface(content) => content.as_ref(),
            other => panic!("expected interface content, got {}", other.template_name()),
        }
    }

    #[test]
    fn test_compile_merges_inherited_and_partial() {
        let (compiler, trees) = compiler();
        let binding = compiler.compile("Derived", &trees).unwrap();
        let content = interface_content(&binding);

        assert!(content.is_active_dom_object);
        assert_eq!(content.parent_interface.as_deref(), Some("Base"));
        assert_eq!(content.attributes[0].name, "size");

        let extra = &content.methods[0];
        assert_eq!(extra.name, "extra");
        assert_eq!(
            extra.runtime_enabled_function.as_deref(),
            Some("RuntimeEnabledFeatures::extrasEnabled")
        );
        assert!(extra.is_implemented_by);
        assert_eq!(extra.cpp_value, "DerivedExtras::extra(*imp)");
    }

    #[test]
    fn test_compile_callback_interface() {
        let (compiler, trees) = compiler();
        let binding = compiler.compile("VoidCallback", &trees).unwrap();
        assert_eq!(binding.content.template_name(), "callback_interface");
        match &binding.content {
            BindingContent::CallbackInterface(content) => {
                assert_eq!(content.v8_class, "V8VoidCallback");
                assert_eq!(content.methods[0].cpp_type, "void");
            }
            BindingContent::Interface(_) => panic!("expected callback content"),
        }
    }

    #[test]
    fn test_unknown_interface() {
        let (compiler, trees) = compiler();
        let err = compiler.compile("Nowhere", &trees).unwrap_err();
        assert!(matches!(err, IdlError::MissingDependency(name) if name == "Nowhere"));
    }

    #[test]
    fn test_missing_tree() {
        let (compiler, mut trees) = compiler();
        trees.remove(&PathBuf::from("modules/DerivedExtras.idl"));
        let err = compiler.compile("Derived", &trees).unwrap_err();
        assert!(matches!(err, IdlError::MissingDependency(_)));
    }

    #[test]
    fn test_compile_batch_collects_failures() {
        let (compiler, trees) = compiler();
        let outcome = compiler.compile_batch(["Base", "BadCallback", "Derived"], &trees);

        assert!(!outcome.is_success());
        let compiled: Vec<&str> = outcome.compiled.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(compiled, vec!["Base", "Derived"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "BadCallback");
        assert!(matches!(outcome.failures[0].1, IdlError::UnsupportedTypeShape(_)));
    }

    #[test]
    fn test_compile_all() {
        let (compiler, trees) = compiler();
        let outcome = compiler.compile_all(&trees);
        // Partial fragments are never compiled on their own
        assert_eq!(outcome.compiled.len() + outcome.failures.len(), 4);
        assert_eq!(outcome.failures.len(), 1);
    }

    #[test]
    fn test_render_compiled_binding() {
        let (compiler, trees) = compiler();
        let binding = compiler.compile("Base", &trees).unwrap();

        let mut renderer = crate::render::HandlebarsRenderer::new();
        renderer
            .register_template_string("interface.h", "class {{v8_class}}{{#if is_active_dom_object}} : ActiveDOMObject{{/if}};")
            .unwrap();
        renderer
            .register_template_string("interface.cpp", "{{cpp_class}}")
            .unwrap();

        let rendered = binding.render(&renderer).unwrap();
        assert_eq!(rendered.header, "class V8Base : ActiveDOMObject;");
        assert_eq!(rendered.body, "Base");
    }

    #[test]
    fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idl.toml");
        std::fs::write(&path, "inheritance_order = \"nearest-wins\"\n").unwrap();

        let (sources, _) = project();
        let compiler = IdlCompiler::from_config_file(&path, &sources).unwrap();
        assert_eq!(
            compiler.config().inheritance_order,
            crate::config::InheritanceOrder::NearestWins
        );
        assert!(compiler.index().contains("Derived"));
        assert!(!compiler.index().contains("DerivedExtras"));
    }

    #[test]
    fn test_build_definitions_uses_standard_typedefs() {
        let (compiler, _) = compiler();
        let tree = file([interface("Event", [attribute("timeStamp", ty("DOMTimeStamp"))])]);
        let definitions = compiler.build_definitions(&tree).unwrap();
        let event = definitions.interface("Event").unwrap();
        assert_eq!(event.attributes()[0].idl_type.to_string(), "unsigned long long");
    }
}
