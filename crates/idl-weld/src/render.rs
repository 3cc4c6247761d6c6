//! Template rendering boundary
//!
//! Generated contents are plain serializable values. A [`TemplateRenderer`]
//! turns one of them into text; [`render_binding`] produces the header and
//! implementation pair for a binding from the `<name>.h` and `<name>.cpp`
//! templates.
//!
//! [`HandlebarsRenderer`] is the bundled adapter. It runs in strict mode so a
//! template referring to a field the content does not have fails instead of
//! rendering an empty string, and it never HTML-escapes.

use crate::error::IdlResult;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Renders a named template against a JSON context
pub trait TemplateRenderer {
    fn render(&self, template_name: &str, context: &serde_json::Value) -> IdlResult<String>;
}

/// Header and implementation text of one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBinding {
    pub header: String,
    pub body: String,
}

/// Render `content` through the `<template>.h` and `<template>.cpp` templates
pub fn render_binding<R, C>(renderer: &R, template: &str, content: &C) -> IdlResult<RenderedBinding>
where
    R: TemplateRenderer + ?Sized,
    C: Serialize,
{
    let context = serde_json::to_value(content)?;
    let header = renderer.render(&format!("{}.h", template), &context)?;
    let body = renderer.render(&format!("{}.cpp", template), &context)?;
    debug!(template = %template, header_len = header.len(), body_len = body.len(), "idl.render");
    Ok(RenderedBinding { header, body })
}

/// Handlebars-backed renderer
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Register a template from source under a logical name
    pub fn register_template_string(&mut self, name: &str, source: &str) -> IdlResult<()> {
        self.registry.register_template_string(name, source)?;
        Ok(())
    }

    /// Register a template file under a logical name
    pub fn register_template_file(&mut self, name: &str, path: impl AsRef<Path>) -> IdlResult<()> {
        self.registry.register_template_file(name, path.as_ref())?;
        Ok(())
    }

    /// Register `<name>.h` and `<name>.cpp` from `dir`
    pub fn register_binding_templates(&mut self, dir: impl AsRef<Path>, name: &str) -> IdlResult<()> {
        let dir = dir.as_ref();
        for extension in ["h", "cpp"] {
            let logical = format!("{}.{}", name, extension);
            self.register_template_file(&logical, dir.join(&logical))?;
        }
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template_name: &str, context: &serde_json::Value) -> IdlResult<String> {
        Ok(self.registry.render(template_name, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdlError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_render_binding() {
        let mut renderer = HandlebarsRenderer::new();
        renderer
            .register_template_string("interface.h", "class {{v8_class}} {};")
            .unwrap();
        renderer
            .register_template_string(
                "interface.cpp",
                "{{#each cpp_includes}}#include \"{{this}}\"\n{{/each}}",
            )
            .unwrap();

        let content = json!({
            "v8_class": "V8Node",
            "cpp_includes": ["V8Node.h", "wtf/RefPtr.h"],
        });
        let rendered = render_binding(&renderer, "interface", &content).unwrap();

        assert_eq!(rendered.header, "class V8Node {};");
        assert_eq!(rendered.body, "#include \"V8Node.h\"\n#include \"wtf/RefPtr.h\"\n");
    }

    #[test]
    fn test_no_escaping() {
        let mut renderer = HandlebarsRenderer::new();
        renderer.register_template_string("t", "{{value}}").unwrap();
        let text = renderer
            .render("t", &json!({ "value": "Vector<RefPtr<Node> >& a && b" }))
            .unwrap();
        assert_eq!(text, "Vector<RefPtr<Node> >& a && b");
    }

    #[test]
    fn test_strict_mode() {
        let mut renderer = HandlebarsRenderer::new();
        renderer.register_template_string("t", "{{missing}}").unwrap();
        let result = renderer.render("t", &json!({}));
        assert!(matches!(result, Err(IdlError::Template(_))));
    }

    #[test]
    fn test_register_binding_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("callback_interface.h"), "// {{cpp_class}}").unwrap();
        std::fs::write(dir.path().join("callback_interface.cpp"), "{{v8_class}}").unwrap();

        let mut renderer = HandlebarsRenderer::default();
        renderer
            .register_binding_templates(dir.path(), "callback_interface")
            .unwrap();
        assert!(renderer.has_template("callback_interface.h"));

        let rendered = render_binding(
            &renderer,
            "callback_interface",
            &json!({ "cpp_class": "VoidCallback", "v8_class": "V8VoidCallback" }),
        )
        .unwrap();
        assert_eq!(rendered.header, "// VoidCallback");
        assert_eq!(rendered.body, "V8VoidCallback");
    }

    #[test]
    fn test_missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = HandlebarsRenderer::new();
        assert!(renderer.register_binding_templates(dir.path(), "interface").is_err());
    }
}
