//! Attribute content
//!
//! Getter and setter expressions for one attribute, including `[Reflect]`
//! content-attribute accessors and `[PutForwards]` retargeting.

use crate::codegen::types::{HostType, HostTypeOptions, Release, ReturnValueOptions, SetReturnValue, TypeMapper};
use crate::codegen::utilities::{
    activity_logging_world_list, call_with_arguments, capitalize, conditional_string, cpp_name,
    deprecate_as, enum_validation_expression, measure_as, per_context_enabled_function_name,
    runtime_enabled_function_name, scoped_name, strip_suffix, uncapitalize, v8_class_name,
    world_suffixes,
};
use crate::codegen::{BindingContext, IncludeSet};
use crate::error::{IdlError, IdlResult};
use crate::ir::{ExtAttrValue, ExtendedAttributes, IdlAttribute, InterfaceDefinition, InterfaceMembers};
use serde::Serialize;

/// Interfaces whose `onerror` handler takes the error-event signature
const ERROR_HANDLER_INTERFACES: &[&str] = &["Window", "WorkerGlobalScope"];

fn content_attribute_getter_name(base_type: &str) -> Option<&'static str> {
    match base_type {
        "boolean" => Some("fastHasAttribute"),
        "long" => Some("getIntegralAttribute"),
        "unsigned long" => Some("getUnsignedIntegralAttribute"),
        _ => None,
    }
}

fn content_attribute_setter_name(base_type: &str) -> Option<&'static str> {
    match base_type {
        "boolean" => Some("setBooleanAttribute"),
        "long" => Some("setIntegralAttribute"),
        "unsigned long" => Some("setUnsignedIntegralAttribute"),
        _ => None,
    }
}

/// Content for one attribute
#[derive(Debug, Clone, Serialize)]
pub struct AttributeContent {
    pub access_control_list: Vec<String>,
    pub activity_logging_world_list_for_getter: Vec<String>,
    pub activity_logging_world_list_for_setter: Vec<String>,
    pub cached_attribute_validation_method: Option<String>,
    pub conditional_string: Option<String>,
    /// Constructed interface of a `FooConstructor` attribute
    pub constructor_type: Option<String>,
    pub cpp_name: String,
    pub cpp_type: HostType,
    pub deprecate_as: Option<String>,
    pub enum_validation_expression: Option<String>,
    pub has_custom_getter: bool,
    pub has_custom_setter: bool,
    pub has_setter_exception_state: bool,
    pub has_strict_type_checking: bool,
    pub idl_type: String,
    pub is_call_with_execution_context: bool,
    pub is_check_security_for_node: bool,
    pub is_custom_element_callbacks: bool,
    pub is_expose_js_accessors: bool,
    pub is_getter_raises_exception: bool,
    pub is_implemented_by: bool,
    pub is_initialized_by_event_constructor: bool,
    pub is_keep_alive_for_gc: bool,
    pub is_nullable: bool,
    pub is_per_world_bindings: bool,
    pub is_read_only: bool,
    pub is_reflect: bool,
    pub is_replaceable: bool,
    pub is_setter_call_with_execution_context: bool,
    pub is_setter_raises_exception: bool,
    pub is_static: bool,
    pub is_unforgeable: bool,
    pub is_url: bool,
    pub measure_as: Option<String>,
    pub name: String,
    pub per_context_enabled_function: Option<String>,
    pub property_attributes: Vec<String>,
    pub put_forwards: bool,
    pub reflect_empty: Option<String>,
    pub reflect_invalid: String,
    pub reflect_missing: Option<String>,
    pub reflect_only: Option<Vec<String>>,
    pub runtime_enabled_function: Option<String>,
    pub setter_callback: String,
    pub v8_type: String,
    pub world_suffixes: Vec<String>,

    // Getter
    pub cpp_value: Option<String>,
    pub cpp_value_original: Option<String>,
    pub v8_set_return_value: Option<SetReturnValue>,
    pub v8_set_return_value_for_main_world: Option<SetReturnValue>,

    // Setter
    pub cpp_setter: Option<String>,
    pub event_handler_getter_expression: Option<String>,
    pub v8_value_to_local_cpp_value: Option<String>,

    pub needs_constructor_getter_callback: bool,
}

/// Generator for the attributes of one interface
pub struct AttributeGenerator<'a> {
    context: &'a BindingContext,
    mapper: TypeMapper<'a>,
    interface: &'a InterfaceDefinition,
}

impl<'a> AttributeGenerator<'a> {
    pub fn new(context: &'a BindingContext, interface: &'a InterfaceDefinition) -> Self {
        Self {
            context,
            mapper: TypeMapper::new(context),
            interface,
        }
    }

    pub fn generate(&self, attribute: &IdlAttribute, includes: &mut IncludeSet) -> IdlResult<AttributeContent> {
        let idl_type = &attribute.idl_type;
        let base_type = idl_type.base_type().unwrap_or_default();
        let ext = &attribute.extended_attributes;

        self.mapper.add_includes_for(idl_type, includes);

        let is_check_security_for_node = ext.contains("CheckSecurity");
        if is_check_security_for_node {
            includes.add("bindings/v8/BindingSecurity.h");
        }
        let has_custom_getter = flag_or_value(ext, "Custom", "Getter");
        let has_custom_setter = !attribute.is_read_only && flag_or_value(ext, "Custom", "Setter");
        let is_custom_element_callbacks = ext.contains("CustomElementCallbacks");
        let is_reflect = ext.contains("Reflect");
        if is_custom_element_callbacks || is_reflect {
            includes.add("core/dom/custom/CustomElementCallbackDispatcher.h");
        }
        let is_getter_raises_exception = flag_or_value(ext, "RaisesException", "Getter");
        let is_setter_raises_exception = flag_or_value(ext, "RaisesException", "Setter");
        let has_strict_type_checking = (ext.contains("StrictTypeChecking")
            || self.interface.extended_attributes().contains("StrictTypeChecking"))
            && self.mapper.is_wrapper_type(idl_type);
        if self.is_error_handler(attribute) {
            includes.add("bindings/v8/V8ErrorHandler.h");
        }
        let is_constructor = is_constructor_attribute(attribute);

        let mut content = AttributeContent {
            access_control_list: access_control_list(attribute),
            activity_logging_world_list_for_getter: activity_logging_world_list(ext, Some("Getter"), includes),
            activity_logging_world_list_for_setter: activity_logging_world_list(ext, Some("Setter"), includes),
            cached_attribute_validation_method: ext.value("CachedAttribute").map(str::to_string),
            conditional_string: conditional_string(ext),
            constructor_type: is_constructor.then(|| strip_suffix(base_type, "Constructor").to_string()),
            cpp_name: cpp_name(&attribute.name, ext).to_string(),
            cpp_type: self.mapper.host_type(idl_type, &HostTypeOptions::default())?,
            deprecate_as: deprecate_as(ext, includes),
            enum_validation_expression: enum_validation_expression(self.context, idl_type),
            has_custom_getter,
            has_custom_setter,
            has_setter_exception_state: is_setter_raises_exception
                || has_strict_type_checking
                || idl_type.is_integer_type(),
            has_strict_type_checking,
            idl_type: idl_type.to_string(),
            is_call_with_execution_context: ext.has_value("CallWith", "ExecutionContext"),
            is_check_security_for_node,
            is_custom_element_callbacks,
            is_expose_js_accessors: ext.contains("ExposeJSAccessors"),
            is_getter_raises_exception,
            is_implemented_by: ext.contains("ImplementedBy"),
            is_initialized_by_event_constructor: ext.contains("InitializedByEventConstructor"),
            is_keep_alive_for_gc: self.is_keep_alive_for_gc(attribute),
            is_nullable: idl_type.nullable,
            is_per_world_bindings: ext.contains("PerWorldBindings"),
            is_read_only: attribute.is_read_only,
            is_reflect,
            is_replaceable: ext.contains("Replaceable"),
            is_setter_call_with_execution_context: ext.has_value("SetterCallWith", "ExecutionContext"),
            is_setter_raises_exception,
            is_static: attribute.is_static,
            is_unforgeable: ext.contains("Unforgeable"),
            is_url: ext.contains("URL"),
            measure_as: measure_as(ext, includes),
            name: attribute.name.clone(),
            per_context_enabled_function: per_context_enabled_function_name(ext),
            property_attributes: property_attributes(attribute),
            put_forwards: ext.contains("PutForwards"),
            reflect_empty: ext.value("ReflectEmpty").map(str::to_string),
            reflect_invalid: ext.value("ReflectInvalid").unwrap_or_default().to_string(),
            reflect_missing: ext.value("ReflectMissing").map(str::to_string),
            reflect_only: ext
                .value("ReflectOnly")
                .map(|values| values.split('|').map(str::to_string).collect()),
            runtime_enabled_function: runtime_enabled_function_name(ext),
            setter_callback: self.setter_callback_name(attribute),
            v8_type: v8_class_name(base_type),
            world_suffixes: world_suffixes(ext),
            cpp_value: None,
            cpp_value_original: None,
            v8_set_return_value: None,
            v8_set_return_value_for_main_world: None,
            cpp_setter: None,
            event_handler_getter_expression: None,
            v8_value_to_local_cpp_value: None,
            needs_constructor_getter_callback: false,
        };

        if is_constructor {
            content.needs_constructor_getter_callback =
                content.measure_as.is_some() || content.deprecate_as.is_some();
            return Ok(content);
        }
        if !has_custom_getter {
            self.generate_getter(attribute, &mut content, includes)?;
        }
        if !has_custom_setter && (!attribute.is_read_only || ext.contains("PutForwards")) {
            self.generate_setter(attribute, &mut content, includes)?;
        }
        Ok(content)
    }

    fn generate_getter(
        &self,
        attribute: &IdlAttribute,
        content: &mut AttributeContent,
        includes: &mut IncludeSet,
    ) -> IdlResult<()> {
        let idl_type = &attribute.idl_type;
        let ext = &attribute.extended_attributes;
        let is_event_handler = idl_type.base_type() == Some("EventHandler");

        let mut cpp_value = self.getter_expression(attribute, content.is_getter_raises_exception, includes)?;
        let mut release = Release::Never;
        // Values that need a local before being returned
        if idl_type.nullable || is_event_handler || ext.contains("CachedAttribute") || content.is_getter_raises_exception {
            content.cpp_value_original = Some(cpp_value);
            cpp_value = "jsValue".to_string();
            if !is_event_handler && self.mapper.is_interface_type(idl_type) {
                release = Release::Always;
            }
        }
        if ext.contains("ReflectOnly") {
            content.cpp_value_original = Some(cpp_value);
            cpp_value = "resultValue".to_string();
        }

        let (for_main_world, default) = if content.is_keep_alive_for_gc {
            let keep_alive = SetReturnValue::Single("v8SetReturnValue(info, wrapper)".to_string());
            (keep_alive.clone(), keep_alive)
        } else {
            let mut options = ReturnValueOptions {
                script_wrappable: "imp",
                release,
                for_main_world: true,
            };
            let for_main_world = self
                .mapper
                .set_return_value(idl_type, &cpp_value, ext, &options, includes)?;
            options.for_main_world = false;
            let default = self
                .mapper
                .set_return_value(idl_type, &cpp_value, ext, &options, includes)?;
            (for_main_world, default)
        };

        content.cpp_value = Some(cpp_value);
        content.v8_set_return_value_for_main_world = Some(for_main_world);
        content.v8_set_return_value = Some(default);
        Ok(())
    }

    fn getter_expression(
        &self,
        attribute: &IdlAttribute,
        is_getter_raises_exception: bool,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        let ext = &attribute.extended_attributes;
        let mut arguments = Vec::new();
        let base_name = self.getter_base_name(attribute, &mut arguments, includes);
        let getter_name = scoped_name(self.cpp_class(), attribute.is_static, ext, &base_name);

        arguments.extend(call_with_arguments(ext, "CallWith")?);
        if ext.contains("ImplementedBy") && !attribute.is_static {
            arguments.push("*imp".to_string());
        }
        if attribute.idl_type.nullable {
            arguments.push("isNull".to_string());
        }
        if is_getter_raises_exception {
            arguments.push("exceptionState".to_string());
        }
        Ok(format!("{}({})", getter_name, arguments.join(", ")))
    }

    fn getter_base_name(&self, attribute: &IdlAttribute, arguments: &mut Vec<String>, includes: &mut IncludeSet) -> String {
        let ext = &attribute.extended_attributes;
        if !ext.contains("Reflect") {
            return uncapitalize(cpp_name(&attribute.name, ext));
        }

        let content_attribute_name = content_attribute_name(attribute);
        if ["class", "id", "name"].contains(&content_attribute_name.as_str()) {
            return format!("get{}Attribute", capitalize(&content_attribute_name));
        }

        arguments.push(self.scoped_content_attribute_name(attribute, includes));
        let base_type = attribute.idl_type.base_type().unwrap_or_default();
        if let Some(name) = content_attribute_getter_name(base_type) {
            return name.to_string();
        }
        if ext.contains("URL") {
            return "getURLAttribute".to_string();
        }
        "fastGetAttribute".to_string()
    }

    fn generate_setter(
        &self,
        attribute: &IdlAttribute,
        content: &mut AttributeContent,
        includes: &mut IncludeSet,
    ) -> IdlResult<()> {
        let ext = &attribute.extended_attributes;
        let target = match ext.value("PutForwards") {
            Some(target_name) => self.put_forwards_target(attribute, target_name)?,
            None => attribute,
        };

        content.cpp_setter = Some(self.setter_expression(target, content, includes)?);
        content.v8_value_to_local_cpp_value = Some(self.mapper.to_local_host_value(
            &target.idl_type,
            ext,
            "jsValue",
            "cppValue",
            None,
            includes,
        )?);
        Ok(())
    }

    /// Attribute of the referenced interface a `[PutForwards]` setter writes to
    fn put_forwards_target(&self, attribute: &IdlAttribute, target_name: &str) -> IdlResult<&'a IdlAttribute> {
        let interface_name = attribute.idl_type.base_type().unwrap_or_default();
        let target_interface = self
            .context
            .referenced_interface(interface_name)
            .ok_or_else(|| IdlError::MissingDependency(interface_name.to_string()))?;
        target_interface
            .attributes()
            .iter()
            .find(|candidate| candidate.name == target_name)
            .ok_or_else(|| {
                IdlError::structure(format!(
                    "[PutForwards] target not found: attribute '{}' is not present in interface '{}'",
                    target_name, interface_name
                ))
            })
    }

    fn setter_expression(
        &self,
        attribute: &IdlAttribute,
        content: &mut AttributeContent,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        let ext = &attribute.extended_attributes;
        let mut arguments = call_with_arguments(ext, "SetterCallWith")?;

        let base_name = self.setter_base_name(attribute, &mut arguments, includes);
        let setter_name = scoped_name(self.cpp_class(), attribute.is_static, ext, &base_name);

        if ext.contains("ImplementedBy") && !attribute.is_static {
            arguments.push("*imp".to_string());
        }
        let idl_type = &attribute.idl_type;
        if idl_type.base_type() == Some("EventHandler") {
            let getter_name = scoped_name(
                self.cpp_class(),
                attribute.is_static,
                ext,
                cpp_name(&attribute.name, ext),
            );
            content.event_handler_getter_expression = Some(format!("{}({})", getter_name, arguments.join(", ")));
            if self.is_error_handler(attribute) {
                includes.add("bindings/v8/V8ErrorHandler.h");
                arguments.push(
                    "V8EventListenerList::findOrCreateWrapper<V8ErrorHandler>(jsValue, true, info.GetIsolate())"
                        .to_string(),
                );
            } else {
                arguments.push("V8EventListenerList::getEventListener(jsValue, true, ListenerFindOrCreate)".to_string());
            }
        } else if self.mapper.is_interface_type(idl_type) && !idl_type.is_array() {
            arguments.push("WTF::getPtr(cppValue)".to_string());
        } else {
            arguments.push("cppValue".to_string());
        }
        if content.is_setter_raises_exception {
            arguments.push("exceptionState".to_string());
        }

        Ok(format!("{}({})", setter_name, arguments.join(", ")))
    }

    fn setter_base_name(&self, attribute: &IdlAttribute, arguments: &mut Vec<String>, includes: &mut IncludeSet) -> String {
        let ext = &attribute.extended_attributes;
        if !ext.contains("Reflect") {
            return format!("set{}", capitalize(cpp_name(&attribute.name, ext)));
        }
        arguments.push(self.scoped_content_attribute_name(attribute, includes));

        let base_type = attribute.idl_type.base_type().unwrap_or_default();
        content_attribute_setter_name(base_type)
            .unwrap_or("setAttribute")
            .to_string()
    }

    /// `HTMLNames::fooAttr`, or `SVGNames::` for SVG interfaces
    fn scoped_content_attribute_name(&self, attribute: &IdlAttribute, includes: &mut IncludeSet) -> String {
        let namespace = if self.interface.name().starts_with("SVG") {
            "SVGNames"
        } else {
            "HTMLNames"
        };
        includes.add(format!("{}.h", namespace));
        format!("{}::{}Attr", namespace, content_attribute_name(attribute))
    }

    /// Readonly wrapper attributes keep their wrapper alive with the owner's
    fn is_keep_alive_for_gc(&self, attribute: &IdlAttribute) -> bool {
        let idl_type = &attribute.idl_type;
        let base_type = idl_type.base_type().unwrap_or_default();
        attribute.is_read_only
            && self.mapper.is_wrapper_type(idl_type)
            && !(self.context.inherits_interface(self.interface.name(), "Node")
                || self.context.inherits_interface(base_type, "Node")
                || attribute.name == "self"
                || base_type == "EventTarget"
                || base_type == "Window"
                || base_type.starts_with("HTML")
                || base_type.starts_with("SVG"))
    }

    fn setter_callback_name(&self, attribute: &IdlAttribute) -> String {
        let cpp_class = self.cpp_class();
        let ext = &attribute.extended_attributes;
        let put_forwards = ext.contains("PutForwards");
        if (ext.contains("Replaceable") && !put_forwards) || is_constructor_attribute(attribute) {
            return format!("{0}V8Internal::{0}ReplaceableAttributeSetterCallback", cpp_class);
        }
        if attribute.is_read_only && !put_forwards {
            return "0".to_string();
        }
        format!("{}V8Internal::{}AttributeSetterCallback", cpp_class, attribute.name)
    }

    fn is_error_handler(&self, attribute: &IdlAttribute) -> bool {
        attribute.idl_type.base_type() == Some("EventHandler")
            && ERROR_HANDLER_INTERFACES.contains(&self.interface.name())
            && attribute.name == "onerror"
    }

    fn cpp_class(&self) -> &str {
        cpp_name(self.interface.name(), self.interface.extended_attributes())
    }
}

/// Bare `[Name]` or `[Name=value]`
fn flag_or_value(ext: &ExtendedAttributes, name: &str, value: &str) -> bool {
    match ext.get(name) {
        Some(ExtAttrValue::Flag) => true,
        Some(other) => other.as_str() == Some(value),
        None => false,
    }
}

/// `[Reflect=name]`, or the attribute name lowercased
fn content_attribute_name(attribute: &IdlAttribute) -> String {
    attribute
        .extended_attributes
        .value("Reflect")
        .map(str::to_string)
        .unwrap_or_else(|| attribute.name.to_lowercase())
}

pub fn is_constructor_attribute(attribute: &IdlAttribute) -> bool {
    attribute
        .idl_type
        .base_type()
        .is_some_and(|base| base.ends_with("Constructor"))
}

/// `[DoNotCheckSecurity]`, `[Unforgeable]`
fn access_control_list(attribute: &IdlAttribute) -> Vec<String> {
    let ext = &attribute.extended_attributes;
    let mut access_control = Vec::new();
    if ext.contains("DoNotCheckSecurity") {
        if ext.value_is("DoNotCheckSecurity", "Setter") {
            access_control.push("v8::ALL_CAN_WRITE");
        } else {
            access_control.push("v8::ALL_CAN_READ");
            if !attribute.is_read_only || ext.contains("Replaceable") {
                access_control.push("v8::ALL_CAN_WRITE");
            }
        }
    }
    if ext.contains("Unforgeable") {
        access_control.push("v8::PROHIBITS_OVERWRITING");
    }
    if access_control.is_empty() {
        access_control.push("v8::DEFAULT");
    }
    access_control.into_iter().map(str::to_string).collect()
}

/// `[NotEnumerable]`, `[Unforgeable]`
fn property_attributes(attribute: &IdlAttribute) -> Vec<String> {
    let ext = &attribute.extended_attributes;
    let mut attributes = Vec::new();
    if ext.contains("NotEnumerable") || is_constructor_attribute(attribute) {
        attributes.push("v8::DontEnum");
    }
    if ext.contains("Unforgeable") {
        attributes.push("v8::DontDelete");
    }
    if attributes.is_empty() {
        attributes.push("v8::None");
    }
    attributes.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IdlInterface, IdlType};
    use pretty_assertions::assert_eq;

    fn ty(s: &str) -> IdlType {
        s.parse().unwrap()
    }

    fn interface(name: &str) -> InterfaceDefinition {
        InterfaceDefinition::Interface(IdlInterface {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn attribute(name: &str, idl_type: &str, ext: ExtendedAttributes) -> IdlAttribute {
        IdlAttribute {
            extended_attributes: ext,
            ..IdlAttribute::new(name, ty(idl_type))
        }
    }

    fn readonly(mut attribute: IdlAttribute) -> IdlAttribute {
        attribute.is_read_only = true;
        attribute
    }

    fn single(s: &str) -> Option<SetReturnValue> {
        Some(SetReturnValue::Single(s.to_string()))
    }

    #[test]
    fn test_readonly_integer() {
        let context = BindingContext::new();
        let foo = interface("Foo");
        let generator = AttributeGenerator::new(&context, &foo);
        let content = generator
            .generate(&readonly(attribute("length", "unsigned long", ExtendedAttributes::new())), &mut IncludeSet::new())
            .unwrap();

        assert_eq!(content.cpp_value.as_deref(), Some("imp->length()"));
        assert_eq!(content.v8_set_return_value, single("v8SetReturnValueUnsigned(info, imp->length())"));
        assert_eq!(content.setter_callback, "0");
        assert_eq!(content.cpp_setter, None);
        assert_eq!(content.access_control_list, vec!["v8::DEFAULT"]);
        assert_eq!(content.property_attributes, vec!["v8::None"]);
        assert!(content.has_setter_exception_state);
    }

    #[test]
    fn test_reflected_string() {
        let context = BindingContext::new();
        let element = interface("HTMLElement");
        let generator = AttributeGenerator::new(&context, &element);
        let mut includes = IncludeSet::new();
        let content = generator
            .generate(&attribute("title", "DOMString", ExtendedAttributes::new().with_flag("Reflect")), &mut includes)
            .unwrap();

        assert_eq!(content.cpp_value.as_deref(), Some("imp->fastGetAttribute(HTMLNames::titleAttr)"));
        assert_eq!(content.cpp_setter.as_deref(), Some("imp->setAttribute(HTMLNames::titleAttr, cppValue)"));
        assert_eq!(
            content.v8_value_to_local_cpp_value.as_deref(),
            Some("V8TRYCATCH_FOR_V8STRINGRESOURCE_VOID(V8StringResource<>, cppValue, jsValue)")
        );
        assert_eq!(content.setter_callback, "HTMLElementV8Internal::titleAttributeSetterCallback");
        assert!(includes.contains("HTMLNames.h"));
        assert!(includes.contains("core/dom/custom/CustomElementCallbackDispatcher.h"));

        let class_name = generator
            .generate(
                &attribute("className", "DOMString", ExtendedAttributes::new().with_value("Reflect", "class")),
                &mut includes,
            )
            .unwrap();
        assert_eq!(class_name.cpp_value.as_deref(), Some("imp->getClassAttribute()"));
        assert_eq!(class_name.cpp_setter.as_deref(), Some("imp->setAttribute(HTMLNames::classAttr, cppValue)"));
    }

    #[test]
    fn test_reflected_unsigned_is_clamped() {
        let context = BindingContext::new();
        let cell = interface("HTMLTableCellElement");
        let generator = AttributeGenerator::new(&context, &cell);
        let content = generator
            .generate(
                &attribute("colSpan", "unsigned long", ExtendedAttributes::new().with_value("Reflect", "colspan")),
                &mut IncludeSet::new(),
            )
            .unwrap();

        assert_eq!(
            content.v8_set_return_value,
            single("v8SetReturnValueUnsigned(info, std::max(0, imp->getIntegralAttribute(HTMLNames::colspanAttr)))")
        );
        assert_eq!(
            content.cpp_setter.as_deref(),
            Some("imp->setUnsignedIntegralAttribute(HTMLNames::colspanAttr, cppValue)")
        );
    }

    #[test]
    fn test_nullable_interface_getter() {
        let context = BindingContext::new().with_ancestors("Element", vec!["Node".to_string()]);
        let node = interface("Node");
        let generator = AttributeGenerator::new(&context, &node);
        let content = generator
            .generate(&readonly(attribute("parentElement", "Element?", ExtendedAttributes::new())), &mut IncludeSet::new())
            .unwrap();

        assert_eq!(content.cpp_value_original.as_deref(), Some("imp->parentElement(isNull)"));
        assert_eq!(content.cpp_value.as_deref(), Some("jsValue"));
        assert_eq!(
            content.v8_set_return_value,
            single("v8SetReturnValueFast(info, WTF::getPtr(jsValue.release()), imp)")
        );
        assert!(!content.is_keep_alive_for_gc);
    }

    #[test]
    fn test_keep_alive_for_gc() {
        let context = BindingContext::new();
        let window = interface("Window");
        let generator = AttributeGenerator::new(&context, &window);
        let content = generator
            .generate(&readonly(attribute("performance", "Performance", ExtendedAttributes::new())), &mut IncludeSet::new())
            .unwrap();

        assert!(content.is_keep_alive_for_gc);
        assert_eq!(content.v8_set_return_value, single("v8SetReturnValue(info, wrapper)"));
        assert_eq!(content.v8_set_return_value_for_main_world, single("v8SetReturnValue(info, wrapper)"));
    }

    #[test]
    fn test_put_forwards() {
        let location = InterfaceDefinition::Interface(IdlInterface {
            name: "Location".to_string(),
            attributes: vec![IdlAttribute::new("href", ty("DOMString"))],
            ..Default::default()
        });
        let context = BindingContext::new().with_referenced_interface(location);
        let document = interface("Document");
        let generator = AttributeGenerator::new(&context, &document);

        let forwarded = readonly(attribute(
            "location",
            "Location",
            ExtendedAttributes::new().with_value("PutForwards", "href"),
        ));
        let content = generator.generate(&forwarded, &mut IncludeSet::new()).unwrap();
        assert!(content.put_forwards);
        assert_eq!(content.cpp_setter.as_deref(), Some("imp->setHref(cppValue)"));
        assert_eq!(content.setter_callback, "DocumentV8Internal::locationAttributeSetterCallback");

        let missing_attribute = readonly(attribute(
            "location",
            "Location",
            ExtendedAttributes::new().with_value("PutForwards", "hash"),
        ));
        assert!(matches!(
            generator.generate(&missing_attribute, &mut IncludeSet::new()),
            Err(IdlError::Structure(_))
        ));

        let missing_interface = readonly(attribute(
            "style",
            "CSSStyleDeclaration",
            ExtendedAttributes::new().with_value("PutForwards", "cssText"),
        ));
        match generator.generate(&missing_interface, &mut IncludeSet::new()) {
            Err(IdlError::MissingDependency(name)) => assert_eq!(name, "CSSStyleDeclaration"),
            other => panic!("unexpected result: {:?}", other.map(|c| c.name)),
        }
    }

    #[test]
    fn test_error_handler() {
        let context = BindingContext::new();
        let window = interface("Window");
        let generator = AttributeGenerator::new(&context, &window);
        let mut includes = IncludeSet::new();
        let content = generator
            .generate(&attribute("onerror", "EventHandler", ExtendedAttributes::new()), &mut includes)
            .unwrap();

        assert_eq!(content.cpp_value_original.as_deref(), Some("imp->onerror()"));
        assert_eq!(content.event_handler_getter_expression.as_deref(), Some("imp->onerror()"));
        assert_eq!(
            content.cpp_setter.as_deref(),
            Some("imp->setOnerror(V8EventListenerList::findOrCreateWrapper<V8ErrorHandler>(jsValue, true, info.GetIsolate()))")
        );
        assert!(includes.contains("bindings/v8/V8ErrorHandler.h"));

        let onload = generator
            .generate(&attribute("onload", "EventHandler", ExtendedAttributes::new()), &mut includes)
            .unwrap();
        assert_eq!(
            onload.cpp_setter.as_deref(),
            Some("imp->setOnload(V8EventListenerList::getEventListener(jsValue, true, ListenerFindOrCreate))")
        );
    }

    #[test]
    fn test_constructor_attribute() {
        let context = BindingContext::new();
        let window = interface("Window");
        let generator = AttributeGenerator::new(&context, &window);
        let content = generator
            .generate(&attribute("Image", "HTMLImageElementConstructor", ExtendedAttributes::new()), &mut IncludeSet::new())
            .unwrap();

        assert_eq!(content.constructor_type.as_deref(), Some("HTMLImageElement"));
        assert_eq!(content.cpp_value, None);
        assert_eq!(content.cpp_setter, None);
        assert!(!content.needs_constructor_getter_callback);
        assert_eq!(content.property_attributes, vec!["v8::DontEnum"]);
        assert_eq!(content.setter_callback, "WindowV8Internal::WindowReplaceableAttributeSetterCallback");
    }

    #[test]
    fn test_access_control() {
        let context = BindingContext::new();
        let window = interface("Window");
        let generator = AttributeGenerator::new(&context, &window);
        let mut includes = IncludeSet::new();

        let writable = generator
            .generate(
                &attribute(
                    "location",
                    "DOMString",
                    ExtendedAttributes::new().with_flag("DoNotCheckSecurity").with_flag("Unforgeable"),
                ),
                &mut includes,
            )
            .unwrap();
        assert_eq!(
            writable.access_control_list,
            vec!["v8::ALL_CAN_READ", "v8::ALL_CAN_WRITE", "v8::PROHIBITS_OVERWRITING"]
        );
        assert_eq!(writable.property_attributes, vec!["v8::DontDelete"]);

        let setter_only = generator
            .generate(
                &attribute("opener", "DOMString", ExtendedAttributes::new().with_value("DoNotCheckSecurity", "Setter")),
                &mut includes,
            )
            .unwrap();
        assert_eq!(setter_only.access_control_list, vec!["v8::ALL_CAN_WRITE"]);
    }

    #[test]
    fn test_custom_accessors() {
        let context = BindingContext::new();
        let foo = interface("Foo");
        let generator = AttributeGenerator::new(&context, &foo);
        let mut includes = IncludeSet::new();

        let custom = generator
            .generate(&attribute("value", "any", ExtendedAttributes::new().with_flag("Custom")), &mut includes)
            .unwrap();
        assert!(custom.has_custom_getter && custom.has_custom_setter);
        assert_eq!(custom.cpp_value, None);
        assert_eq!(custom.cpp_setter, None);

        let getter_only = generator
            .generate(&attribute("value", "any", ExtendedAttributes::new().with_value("Custom", "Getter")), &mut includes)
            .unwrap();
        assert!(getter_only.has_custom_getter && !getter_only.has_custom_setter);
        assert_eq!(getter_only.cpp_setter.as_deref(), Some("imp->setValue(cppValue)"));
    }
}
