//! Interface content generator
//!
//! [`InterfaceGenerator`] produces the complete, serializable context for one
//! ordinary interface or exception: class-level flags, constructors,
//! constants, attributes, methods with their overload sets, and the indexed
//! and named property handlers.
//!
//! Each call owns its own [`IncludeSet`]; the header and implementation
//! include lists come back sorted.

use crate::codegen::attributes::{AttributeContent, AttributeGenerator};
use crate::codegen::includes::{INTERFACE_CPP_INCLUDES, INTERFACE_H_INCLUDES};
use crate::codegen::methods::{
    argument_needs_exception_state, generate_overloads, local_host_value, overload_resolution_expression,
    union_arguments, MethodContent, MethodGenerator,
};
use crate::codegen::types::{HostType, HostTypeOptions, Release, ReturnValueOptions, SetReturnValue, TypeMapper};
use crate::codegen::utilities::{
    conditional_string, cpp_name, measure_as, runtime_enabled_function_name, v8_class_name,
};
use crate::codegen::{BindingContext, IncludeSet};
use crate::error::{IdlError, IdlResult};
use crate::ir::{
    ExtAttrValue, IdlArgument, IdlConstant, IdlOperation, IdlType, InterfaceDefinition, InterfaceMembers, Special,
};
use serde::Serialize;
use tracing::debug;

/// `[SetWrapperReferenceTo]` entry
#[derive(Debug, Clone, Serialize)]
pub struct WrapperReferenceContent {
    pub name: String,
    pub cpp_type: String,
    pub idl_type: String,
    pub v8_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstantContent {
    /// `[ImplementedBy]` class holding the value
    pub cpp_class: Option<String>,
    pub name: String,
    pub reflected_name: String,
    pub runtime_enabled_function: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorArgumentContent {
    pub has_default: bool,
    /// Base type, `None` for arrays and sequences
    pub idl_type: Option<String>,
    pub index: usize,
    pub is_optional: bool,
    pub is_strict_type_checking: bool,
    pub name: String,
    pub v8_value_to_local_cpp_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorContent {
    pub argument_list: Vec<String>,
    pub arguments: Vec<ConstructorArgumentContent>,
    pub has_exception_state: bool,
    pub is_constructor: bool,
    pub is_variadic: bool,
    /// Script-visible name of a named constructor
    pub name: Option<String>,
    pub number_of_required_arguments: usize,
    pub overload_index: Option<usize>,
    pub overload_resolution_expression: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyGetterContent {
    pub cpp_type: HostType,
    pub cpp_value: String,
    pub is_custom: bool,
    pub is_custom_property_enumerator: bool,
    pub is_custom_property_query: bool,
    pub is_enumerable: bool,
    pub is_null_expression: String,
    pub is_raises_exception: bool,
    pub name: String,
    pub union_arguments: Option<Vec<String>>,
    pub v8_set_return_value: SetReturnValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySetterContent {
    pub has_exception_state: bool,
    pub has_strict_type_checking: bool,
    pub idl_type: Option<String>,
    pub is_custom: bool,
    pub is_raises_exception: bool,
    pub name: String,
    pub v8_value_to_local_cpp_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyDeleterContent {
    pub is_custom: bool,
    pub is_raises_exception: bool,
    pub name: String,
}

/// Complete template context for one interface
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceContent {
    pub conditional_string: Option<String>,
    pub cpp_class: String,
    pub cpp_includes: Vec<String>,
    pub has_custom_legacy_call_as_function: bool,
    pub has_custom_to_v8: bool,
    pub has_custom_wrap: bool,
    pub has_visit_dom_wrapper: bool,
    pub header_includes: Vec<String>,
    pub interface_name: String,
    pub is_active_dom_object: bool,
    pub is_audio_buffer: bool,
    pub is_check_security: bool,
    pub is_dependent_lifetime: bool,
    pub is_document: bool,
    pub is_event_target: bool,
    pub is_exception: bool,
    pub is_node: bool,
    pub is_will_be_garbage_collected: bool,
    pub measure_as: Option<String>,
    pub parent_interface: Option<String>,
    pub pass_ref_ptr: String,
    pub reachable_node_function: Option<String>,
    pub ref_ptr: String,
    pub runtime_enabled_function: Option<String>,
    pub set_wrapper_reference_to_list: Vec<WrapperReferenceContent>,
    pub special_wrap_for: Vec<String>,
    pub v8_class: String,

    // Constructors
    pub any_type_attributes: Vec<String>,
    pub constructors: Vec<ConstructorContent>,
    pub has_custom_constructor: bool,
    pub has_event_constructor: bool,
    pub interface_length: usize,
    pub is_constructor_call_with_document: bool,
    pub is_constructor_call_with_execution_context: bool,
    pub is_constructor_raises_exception: bool,
    pub named_constructor: Option<ConstructorContent>,

    // Constants
    pub constants: Vec<ConstantContent>,
    pub do_not_check_constants: bool,

    // Attributes
    pub attributes: Vec<AttributeContent>,
    pub has_accessors: bool,
    pub has_attribute_configuration: bool,
    pub has_constructor_attributes: bool,
    pub has_per_context_enabled_attributes: bool,
    pub has_replaceable_attributes: bool,

    // Methods
    pub has_method_configuration: bool,
    pub has_origin_safe_method_setter: bool,
    pub has_per_context_enabled_methods: bool,
    pub methods: Vec<MethodContent>,

    // Special operations
    pub indexed_property_getter: Option<PropertyGetterContent>,
    pub indexed_property_setter: Option<PropertySetterContent>,
    pub indexed_property_deleter: Option<PropertyDeleterContent>,
    pub is_override_builtins: bool,
    pub named_property_getter: Option<PropertyGetterContent>,
    pub named_property_setter: Option<PropertySetterContent>,
    pub named_property_deleter: Option<PropertyDeleterContent>,
}

/// Generator for ordinary interfaces and exceptions
pub struct InterfaceGenerator<'a> {
    context: &'a BindingContext,
    mapper: TypeMapper<'a>,
}

impl<'a> InterfaceGenerator<'a> {
    pub fn new(context: &'a BindingContext) -> Self {
        Self {
            context,
            mapper: TypeMapper::new(context),
        }
    }

    /// Generate the content of `interface`
    pub fn generate(&self, interface: &InterfaceDefinition) -> IdlResult<InterfaceContent> {
        let name = interface.name();
        let ext = interface.extended_attributes();
        let mut includes = IncludeSet::from_static(INTERFACE_CPP_INCLUDES);
        let mut header_includes = IncludeSet::from_static(INTERFACE_H_INCLUDES);

        let parent_interface = interface.parent().map(str::to_string);
        if let Some(parent) = &parent_interface {
            header_includes.extend(self.mapper.includes_for(&IdlType::named(parent.as_str())));
        }

        let is_audio_buffer = self.context.inherits_interface(name, "AudioBuffer");
        if is_audio_buffer {
            includes.add("modules/webaudio/AudioBuffer.h");
        }
        let is_document = self.context.inherits_interface(name, "Document");
        if is_document {
            includes.extend([
                "bindings/v8/ScriptController.h",
                "bindings/v8/V8WindowShell.h",
                "core/frame/LocalFrame.h",
            ]);
        }
        let is_check_security = ext.contains("CheckSecurity");
        if is_check_security {
            includes.add("bindings/v8/BindingSecurity.h");
        }
        let reachable_node_function = ext.value("SetWrapperReferenceFrom").map(str::to_string);
        if reachable_node_function.is_some() {
            includes.extend(["bindings/v8/V8GCController.h", "core/dom/Element.h"]);
        }

        let set_wrapper_reference_to_list = match ext.get("SetWrapperReferenceTo") {
            Some(ExtAttrValue::Arguments(arguments)) => arguments
                .iter()
                .map(|argument| self.wrapper_reference(argument, &mut includes))
                .collect(),
            _ => Vec::new(),
        };

        let special_wrap_for: Vec<String> = ext
            .value("SpecialWrapFor")
            .map(|value| value.split('|').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();
        for special in &special_wrap_for {
            self.mapper.add_includes_for(&IdlType::named(special.as_str()), &mut includes);
        }

        let is_will_be_garbage_collected = ext.contains("WillBeGarbageCollected");

        // Constructors
        let mut constructors = interface
            .constructors()
            .iter()
            .filter(|constructor| constructor.name == "Constructor")
            .map(|constructor| self.constructor(interface, constructor, &mut includes))
            .collect::<IdlResult<Vec<_>>>()?;
        self.constructor_overloads(interface, &mut constructors);

        let custom_required: Vec<usize> = interface
            .custom_constructors()
            .iter()
            .map(number_of_required_arguments)
            .collect();

        let has_event_constructor = ext.contains("EventConstructor");
        let any_type_attributes: Vec<String> = interface
            .attributes()
            .iter()
            .filter(|attribute| attribute.idl_type.is_named("any"))
            .map(|attribute| attribute.name.clone())
            .collect();
        if has_event_constructor {
            includes.add("bindings/v8/Dictionary.h");
            if !any_type_attributes.is_empty() {
                includes.add("bindings/v8/SerializedScriptValue.h");
            }
        }

        let named_constructor = self.named_constructor(interface, &mut includes)?;
        if !constructors.is_empty() || !custom_required.is_empty() || has_event_constructor || named_constructor.is_some() {
            includes.extend(["bindings/v8/V8ObjectConstructor.h", "core/frame/DOMWindow.h"]);
        }

        let interface_length = if has_event_constructor {
            1
        } else {
            constructors
                .iter()
                .map(|constructor| constructor.number_of_required_arguments)
                .chain(custom_required.iter().copied())
                .min()
                .unwrap_or(0)
        };

        // Constants
        let constants = interface.constants().iter().map(constant_content).collect();

        // Attributes
        let attribute_generator = AttributeGenerator::new(self.context, interface);
        let attributes = interface
            .attributes()
            .iter()
            .map(|attribute| attribute_generator.generate(attribute, &mut includes))
            .collect::<IdlResult<Vec<_>>>()?;

        // Methods; anonymous special operations only surface as property handlers
        let method_generator = MethodGenerator::new(self.context, interface);
        let operations: Vec<&IdlOperation> = interface
            .operations()
            .iter()
            .filter(|operation| !operation.name.is_empty())
            .collect();
        let mut methods = operations
            .iter()
            .map(|operation| method_generator.generate(operation, &mut includes))
            .collect::<IdlResult<Vec<_>>>()?;
        generate_overloads(&self.mapper, &mut methods, &operations);
        for method in &mut methods {
            // One accessor per overloaded name
            method.do_generate_method_configuration = method.do_not_check_signature
                && method.per_context_enabled_function.is_none()
                && method.overload_index.map_or(true, |index| index == 1);
        }

        let content = InterfaceContent {
            conditional_string: conditional_string(ext),
            cpp_class: cpp_name(name, ext).to_string(),
            has_custom_legacy_call_as_function: ext.has_value("Custom", "LegacyCallAsFunction"),
            has_custom_to_v8: ext.has_value("Custom", "ToV8"),
            has_custom_wrap: ext.has_value("Custom", "Wrap"),
            has_visit_dom_wrapper: ext.has_value("Custom", "VisitDOMWrapper")
                || reachable_node_function.is_some()
                || !set_wrapper_reference_to_list.is_empty(),
            interface_name: name.to_string(),
            is_active_dom_object: ext.contains("ActiveDOMObject"),
            is_audio_buffer,
            is_check_security,
            is_dependent_lifetime: ext.contains("DependentLifetime"),
            is_document,
            is_event_target: self.context.inherits_interface(name, "EventTarget"),
            is_exception: interface.is_exception(),
            is_node: self.context.inherits_interface(name, "Node"),
            is_will_be_garbage_collected,
            measure_as: measure_as(ext, &mut includes),
            parent_interface,
            pass_ref_ptr: if is_will_be_garbage_collected {
                "PassRefPtrWillBeRawPtr"
            } else {
                "PassRefPtr"
            }
            .to_string(),
            reachable_node_function,
            ref_ptr: if is_will_be_garbage_collected {
                "RefPtrWillBeRawPtr"
            } else {
                "RefPtr"
            }
            .to_string(),
            runtime_enabled_function: runtime_enabled_function_name(ext),
            set_wrapper_reference_to_list,
            special_wrap_for,
            v8_class: v8_class_name(name),

            any_type_attributes,
            constructors,
            has_custom_constructor: !custom_required.is_empty(),
            has_event_constructor,
            interface_length,
            is_constructor_call_with_document: ext.has_value("ConstructorCallWith", "Document"),
            is_constructor_call_with_execution_context: ext.has_value("ConstructorCallWith", "ExecutionContext"),
            is_constructor_raises_exception: ext.value_is("RaisesException", "Constructor"),
            named_constructor,

            constants,
            do_not_check_constants: ext.contains("DoNotCheckConstants"),

            has_accessors: attributes.iter().any(|a| a.is_expose_js_accessors),
            has_attribute_configuration: attributes.iter().any(|a| {
                !(a.is_expose_js_accessors
                    || a.is_static
                    || a.runtime_enabled_function.is_some()
                    || a.per_context_enabled_function.is_some())
            }),
            has_constructor_attributes: attributes.iter().any(|a| a.constructor_type.is_some()),
            has_per_context_enabled_attributes: attributes.iter().any(|a| a.per_context_enabled_function.is_some()),
            has_replaceable_attributes: attributes.iter().any(|a| a.is_replaceable),
            attributes,

            has_method_configuration: methods.iter().any(|m| m.do_generate_method_configuration),
            has_origin_safe_method_setter: methods
                .iter()
                .any(|m| m.is_check_security_for_frame && !m.is_read_only),
            has_per_context_enabled_methods: methods.iter().any(|m| m.per_context_enabled_function.is_some()),
            methods,

            indexed_property_getter: self.property_getter(
                find_special(interface, Special::Getter, 1, "unsigned long"),
                "index",
                "anonymousIndexedGetter",
                &mut includes,
            )?,
            indexed_property_setter: self.property_setter(
                find_special(interface, Special::Setter, 2, "unsigned long"),
                &mut includes,
            )?,
            indexed_property_deleter: property_deleter(find_special(interface, Special::Deleter, 1, "unsigned long"))?,
            is_override_builtins: ext.contains("OverrideBuiltins"),
            named_property_getter: self.property_getter(
                find_special(interface, Special::Getter, 1, "DOMString"),
                "propertyName",
                "anonymousNamedGetter",
                &mut includes,
            )?,
            named_property_setter: self.property_setter(
                find_special(interface, Special::Setter, 2, "DOMString"),
                &mut includes,
            )?,
            named_property_deleter: property_deleter(find_special(interface, Special::Deleter, 1, "DOMString"))?,

            cpp_includes: includes.into_sorted_vec(),
            header_includes: header_includes.into_sorted_vec(),
        };

        debug!(
            interface = %content.interface_name,
            attributes = content.attributes.len(),
            methods = content.methods.len(),
            constructors = content.constructors.len(),
            "idl.generate"
        );
        Ok(content)
    }

    fn wrapper_reference(&self, argument: &IdlArgument, includes: &mut IncludeSet) -> WrapperReferenceContent {
        let idl_type = &argument.idl_type;
        self.mapper.add_includes_for(idl_type, includes);
        WrapperReferenceContent {
            name: argument.name.clone(),
            cpp_type: format!("{}*", self.mapper.implemented_as(idl_type)),
            idl_type: idl_type.to_string(),
            v8_type: v8_class_name(idl_type.base_type().unwrap_or_default()),
        }
    }

    fn constructor(
        &self,
        interface: &InterfaceDefinition,
        constructor: &IdlOperation,
        includes: &mut IncludeSet,
    ) -> IdlResult<ConstructorContent> {
        let ext = interface.extended_attributes();
        let raises_exception = ext.value_is("RaisesException", "Constructor");

        let mut argument_list = Vec::new();
        if ext.has_value("ConstructorCallWith", "ExecutionContext") {
            argument_list.push("context".to_string());
        }
        if ext.has_value("ConstructorCallWith", "Document") {
            argument_list.push("document".to_string());
        }
        argument_list.extend(constructor.arguments.iter().map(|a| a.name.clone()));
        if raises_exception {
            argument_list.push("exceptionState".to_string());
        }

        let arguments = constructor
            .arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| {
                Ok(ConstructorArgumentContent {
                    has_default: argument.extended_attributes.contains("Default"),
                    idl_type: if argument.idl_type.is_composite() {
                        None
                    } else {
                        argument.idl_type.base_type().map(str::to_string)
                    },
                    index,
                    is_optional: argument.is_optional,
                    is_strict_type_checking: false,
                    name: argument.name.clone(),
                    v8_value_to_local_cpp_value: local_host_value(&self.mapper, argument, index, includes)?,
                })
            })
            .collect::<IdlResult<Vec<_>>>()?;

        Ok(ConstructorContent {
            argument_list,
            arguments,
            has_exception_state: raises_exception || constructor.arguments.iter().any(argument_needs_exception_state),
            is_constructor: true,
            is_variadic: false,
            name: None,
            number_of_required_arguments: number_of_required_arguments(constructor),
            overload_index: None,
            overload_resolution_expression: None,
        })
    }

    /// Number overloaded constructors from 1, when there is more than one
    fn constructor_overloads(&self, interface: &InterfaceDefinition, constructors: &mut [ConstructorContent]) {
        if constructors.len() <= 1 {
            return;
        }
        let signatures = interface
            .constructors()
            .iter()
            .filter(|constructor| constructor.name == "Constructor");
        for (position, (content, signature)) in constructors.iter_mut().zip(signatures).enumerate() {
            content.overload_index = Some(position + 1);
            content.overload_resolution_expression = Some(overload_resolution_expression(
                &self.mapper,
                &signature.arguments,
                content.is_variadic,
                false,
            ));
        }
    }

    /// `[NamedConstructor=Name(...)]`; the document is passed first
    fn named_constructor(
        &self,
        interface: &InterfaceDefinition,
        includes: &mut IncludeSet,
    ) -> IdlResult<Option<ConstructorContent>> {
        let Some(name) = interface.extended_attributes().value("NamedConstructor") else {
            return Ok(None);
        };
        let signature = interface
            .constructors()
            .iter()
            .find(|constructor| constructor.name == "NamedConstructor")
            .cloned()
            .unwrap_or_else(|| IdlOperation::constructor("NamedConstructor", Vec::new()));

        let mut constructor = self.constructor(interface, &signature, includes)?;
        constructor.argument_list.insert(0, "*document".to_string());
        constructor.name = Some(name.to_string());
        Ok(Some(constructor))
    }

    fn property_getter(
        &self,
        getter: Option<&IdlOperation>,
        key_argument: &str,
        default_name: &str,
        includes: &mut IncludeSet,
    ) -> IdlResult<Option<PropertyGetterContent>> {
        let Some(getter) = getter else {
            return Ok(None);
        };
        let ext = &getter.extended_attributes;
        let idl_type = getter.idl_type.clone().unwrap_or_else(|| IdlType::named("void"));
        let is_raises_exception = ext.contains("RaisesException");
        let name = if getter.name.is_empty() {
            default_name
        } else {
            cpp_name(&getter.name, ext)
        };

        let release = if idl_type.is_union_type() {
            Release::PerMember(
                idl_type
                    .member_types()
                    .iter()
                    .map(|member| self.mapper.is_interface_type(member))
                    .collect(),
            )
        } else if self.mapper.is_interface_type(&idl_type) {
            Release::Always
        } else {
            Release::Never
        };

        let mut cpp_arguments = vec![key_argument.to_string()];
        if is_raises_exception {
            cpp_arguments.push("exceptionState".to_string());
        }
        let union_arguments = union_arguments(&idl_type);
        if let Some(union_arguments) = &union_arguments {
            cpp_arguments.extend(union_arguments.iter().cloned());
        }

        let options = ReturnValueOptions {
            script_wrappable: "imp",
            release,
            for_main_world: false,
        };
        Ok(Some(PropertyGetterContent {
            cpp_type: self.mapper.host_type(&idl_type, &HostTypeOptions::default())?,
            cpp_value: format!("imp->{}({})", name, cpp_arguments.join(", ")),
            is_custom: matches!(ext.get("Custom"), Some(ExtAttrValue::Flag))
                || ext.has_value("Custom", "PropertyGetter"),
            is_custom_property_enumerator: ext.has_value("Custom", "PropertyEnumerator"),
            is_custom_property_query: ext.has_value("Custom", "PropertyQuery"),
            is_enumerable: !ext.contains("NotEnumerable"),
            is_null_expression: self.is_null_expression(&idl_type),
            is_raises_exception,
            name: name.to_string(),
            union_arguments,
            v8_set_return_value: self
                .mapper
                .set_return_value(&idl_type, "result", ext, &options, includes)?,
        }))
    }

    fn is_null_expression(&self, idl_type: &IdlType) -> String {
        if idl_type.is_union_type() {
            return (0..idl_type.member_types().len())
                .map(|i| format!("!result{}Enabled", i))
                .collect::<Vec<_>>()
                .join(" && ");
        }
        if idl_type.type_name() == "String" {
            return "result.isNull()".to_string();
        }
        if self.mapper.is_interface_type(idl_type) {
            return "!result".to_string();
        }
        String::new()
    }

    fn property_setter(
        &self,
        setter: Option<&IdlOperation>,
        includes: &mut IncludeSet,
    ) -> IdlResult<Option<PropertySetterContent>> {
        let Some(setter) = setter else {
            return Ok(None);
        };
        let ext = &setter.extended_attributes;
        let idl_type = &setter.arguments[1].idl_type;
        let is_raises_exception = ext.contains("RaisesException");

        Ok(Some(PropertySetterContent {
            has_exception_state: is_raises_exception || idl_type.is_integer_type(),
            has_strict_type_checking: ext.contains("StrictTypeChecking") && self.mapper.is_wrapper_type(idl_type),
            idl_type: idl_type.base_type().map(str::to_string),
            is_custom: ext.contains("Custom"),
            is_raises_exception,
            name: cpp_name(&setter.name, ext).to_string(),
            v8_value_to_local_cpp_value: self.mapper.to_local_host_value(
                idl_type,
                ext,
                "jsValue",
                "propertyValue",
                None,
                includes,
            )?,
        }))
    }
}

/// First special operation of `kind` with `arity` arguments keyed by `key_type`
fn find_special<'i>(
    interface: &'i InterfaceDefinition,
    kind: Special,
    arity: usize,
    key_type: &str,
) -> Option<&'i IdlOperation> {
    interface.operations().iter().find(|operation| {
        operation.is_special(kind)
            && operation.arguments.len() == arity
            && operation.arguments[0].idl_type.to_string() == key_type
    })
}

/// Deleters report whether the property was deleted
fn property_deleter(deleter: Option<&IdlOperation>) -> IdlResult<Option<PropertyDeleterContent>> {
    let Some(deleter) = deleter else {
        return Ok(None);
    };
    let return_type = deleter.idl_type.as_ref().map(ToString::to_string).unwrap_or_default();
    if return_type != "boolean" {
        return Err(IdlError::unsupported(format!(
            "only deleters with boolean type are allowed, but type is '{}'",
            return_type
        )));
    }
    let ext = &deleter.extended_attributes;
    Ok(Some(PropertyDeleterContent {
        is_custom: ext.contains("Custom"),
        is_raises_exception: ext.contains("RaisesException"),
        name: cpp_name(&deleter.name, ext).to_string(),
    }))
}

fn number_of_required_arguments(constructor: &IdlOperation) -> usize {
    constructor.arguments.iter().filter(|a| !a.is_optional).count()
}

/// String constants are stored unquoted and re-quoted here
fn constant_content(constant: &IdlConstant) -> ConstantContent {
    let ext = &constant.extended_attributes;
    let value = if constant.idl_type.type_name() == "String" {
        format!("\"{}\"", constant.value)
    } else {
        constant.value.clone()
    };
    ConstantContent {
        cpp_class: ext.value("ImplementedBy").map(str::to_string),
        name: constant.name.clone(),
        reflected_name: ext.value("Reflect").unwrap_or(&constant.name).to_string(),
        runtime_enabled_function: runtime_enabled_function_name(ext),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ExtendedAttributes, IdlAttribute, IdlException, IdlInterface};
    use pretty_assertions::assert_eq;

    fn ty(s: &str) -> IdlType {
        s.parse().unwrap()
    }

    fn special(kind: Special, name: &str, return_type: &str, arguments: Vec<IdlArgument>) -> IdlOperation {
        IdlOperation {
            specials: vec![kind],
            arguments,
            ..IdlOperation::new(name, ty(return_type))
        }
    }

    fn collection() -> InterfaceDefinition {
        InterfaceDefinition::Interface(IdlInterface {
            name: "HTMLCollection".to_string(),
            attributes: vec![{
                let mut length = IdlAttribute::new("length", ty("unsigned long"));
                length.is_read_only = true;
                length
            }],
            operations: vec![
                special(
                    Special::Getter,
                    "item",
                    "Element",
                    vec![IdlArgument::new("index", ty("unsigned long"))],
                ),
                special(
                    Special::Getter,
                    "",
                    "Element",
                    vec![IdlArgument::new("name", ty("DOMString"))],
                ),
                special(
                    Special::Deleter,
                    "",
                    "boolean",
                    vec![IdlArgument::new("name", ty("DOMString"))],
                ),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn test_property_handlers() {
        let context = BindingContext::new();
        let content = InterfaceGenerator::new(&context).generate(&collection()).unwrap();

        let indexed = content.indexed_property_getter.as_ref().unwrap();
        assert_eq!(indexed.cpp_value, "imp->item(index)");
        assert_eq!(indexed.is_null_expression, "!result");
        assert_eq!(
            indexed.v8_set_return_value,
            SetReturnValue::Single("v8SetReturnValueFast(info, WTF::getPtr(result.release()), imp)".to_string())
        );

        let named = content.named_property_getter.as_ref().unwrap();
        assert_eq!(named.name, "anonymousNamedGetter");
        assert_eq!(named.cpp_value, "imp->anonymousNamedGetter(propertyName)");
        assert!(named.is_enumerable);

        assert!(content.named_property_deleter.is_some());
        assert!(content.indexed_property_setter.is_none());

        // Unnamed special operations are not methods
        assert_eq!(content.methods.len(), 1);
        assert_eq!(content.methods[0].name, "item");
    }

    #[test]
    fn test_deleter_must_return_boolean() {
        let interface = InterfaceDefinition::Interface(IdlInterface {
            name: "Storage".to_string(),
            operations: vec![special(
                Special::Deleter,
                "removeItem",
                "void",
                vec![IdlArgument::new("key", ty("DOMString"))],
            )],
            ..Default::default()
        });
        let result = InterfaceGenerator::new(&BindingContext::new()).generate(&interface);
        assert!(matches!(result, Err(IdlError::UnsupportedTypeShape(_))));
    }

    #[test]
    fn test_constructors() {
        let interface = InterfaceDefinition::Interface(IdlInterface {
            name: "Blob".to_string(),
            constructors: vec![
                IdlOperation::constructor("Constructor", vec![]),
                IdlOperation::constructor(
                    "Constructor",
                    vec![
                        IdlArgument::new("parts", ty("sequence<any>")),
                        IdlArgument {
                            is_optional: true,
                            ..IdlArgument::new("options", ty("Dictionary"))
                        },
                    ],
                ),
            ],
            extended_attributes: ExtendedAttributes::new()
                .with_flag("Constructor")
                .with_value("ConstructorCallWith", "ExecutionContext")
                .with_value("RaisesException", "Constructor"),
            ..Default::default()
        });
        let content = InterfaceGenerator::new(&BindingContext::new()).generate(&interface).unwrap();

        assert_eq!(content.constructors.len(), 2);
        assert_eq!(content.interface_length, 0);
        assert!(content.is_constructor_raises_exception);

        let second = &content.constructors[1];
        assert_eq!(second.argument_list, vec!["context", "parts", "options", "exceptionState"]);
        assert_eq!(second.overload_index, Some(2));
        assert_eq!(
            second.overload_resolution_expression.as_deref(),
            Some(
                "((info.Length() == 1) && (info[0]->IsArray())) || \
                 ((info.Length() == 2) && (info[0]->IsArray()) && (info[1]->IsUndefined() || info[1]->IsObject()))"
            )
        );
        assert!(second.has_exception_state);
        assert_eq!(content.constructors[0].overload_resolution_expression.as_deref(), Some("((info.Length() == 0))"));
        assert!(content.cpp_includes.contains(&"core/frame/DOMWindow.h".to_string()));
    }

    #[test]
    fn test_named_constructor() {
        let interface = InterfaceDefinition::Interface(IdlInterface {
            name: "HTMLImageElement".to_string(),
            constructors: vec![IdlOperation::constructor(
                "NamedConstructor",
                vec![IdlArgument {
                    is_optional: true,
                    ..IdlArgument::new("width", ty("unsigned long"))
                }],
            )],
            extended_attributes: ExtendedAttributes::new().with_value("NamedConstructor", "Image"),
            ..Default::default()
        });
        let content = InterfaceGenerator::new(&BindingContext::new()).generate(&interface).unwrap();

        assert!(content.constructors.is_empty());
        let named = content.named_constructor.unwrap();
        assert_eq!(named.name.as_deref(), Some("Image"));
        assert_eq!(named.argument_list, vec!["*document", "width"]);
        assert!(named.has_exception_state);
        assert_eq!(
            named.arguments[0].v8_value_to_local_cpp_value,
            "V8TRYCATCH_EXCEPTION_VOID(unsigned, width, toUInt32(info[0], exceptionState), exceptionState)"
        );
    }

    #[test]
    fn test_interface_flags() {
        let context = BindingContext::new()
            .with_ancestors("HTMLDocument", vec!["Document".to_string(), "Node".to_string(), "EventTarget".to_string()]);
        let interface = InterfaceDefinition::Interface(IdlInterface {
            name: "HTMLDocument".to_string(),
            parent: Some("Document".to_string()),
            extended_attributes: ExtendedAttributes::new()
                .with_flag("WillBeGarbageCollected")
                .with_value("Custom", "ToV8|Wrap")
                .with_value("SpecialWrapFor", "HTMLDocument|SVGDocument"),
            ..Default::default()
        });
        let content = InterfaceGenerator::new(&context).generate(&interface).unwrap();

        assert!(content.is_node && content.is_document && content.is_event_target);
        assert!(content.has_custom_to_v8 && content.has_custom_wrap);
        assert!(!content.has_custom_legacy_call_as_function);
        assert_eq!(content.ref_ptr, "RefPtrWillBeRawPtr");
        assert_eq!(content.pass_ref_ptr, "PassRefPtrWillBeRawPtr");
        assert_eq!(content.v8_class, "V8HTMLDocument");
        assert_eq!(content.special_wrap_for, vec!["HTMLDocument", "SVGDocument"]);
        assert!(content.header_includes.contains(&"V8Document.h".to_string()));
        assert!(content.cpp_includes.contains(&"V8SVGDocument.h".to_string()));
        assert!(content.cpp_includes.contains(&"bindings/v8/V8WindowShell.h".to_string()));

        let mut sorted = content.cpp_includes.clone();
        sorted.sort();
        assert_eq!(sorted, content.cpp_includes);
    }

    #[test]
    fn test_constants_and_exceptions() {
        let exception = InterfaceDefinition::Exception(IdlException {
            name: "DOMException".to_string(),
            constants: vec![
                IdlConstant {
                    name: "INDEX_SIZE_ERR".to_string(),
                    idl_type: ty("unsigned short"),
                    value: "1".to_string(),
                    extended_attributes: ExtendedAttributes::new(),
                },
                IdlConstant {
                    name: "KIND".to_string(),
                    idl_type: ty("DOMString"),
                    value: "dom".to_string(),
                    extended_attributes: ExtendedAttributes::new().with_value("Reflect", "kind"),
                },
            ],
            ..Default::default()
        });
        let content = InterfaceGenerator::new(&BindingContext::new()).generate(&exception).unwrap();

        assert!(content.is_exception);
        assert_eq!(content.parent_interface, None);
        assert_eq!(content.constants[0].value, "1");
        assert_eq!(content.constants[1].value, "\"dom\"");
        assert_eq!(content.constants[1].reflected_name, "kind");
    }

    #[test]
    fn test_method_configuration() {
        let interface = InterfaceDefinition::Interface(IdlInterface {
            name: "Foo".to_string(),
            operations: vec![
                IdlOperation {
                    arguments: vec![IdlArgument::new("x", ty("long"))],
                    ..IdlOperation::new("f", ty("void"))
                },
                IdlOperation {
                    arguments: vec![IdlArgument::new("s", ty("DOMString"))],
                    ..IdlOperation::new("f", ty("void"))
                },
                IdlOperation {
                    extended_attributes: ExtendedAttributes::new().with_flag("NotEnumerable"),
                    ..IdlOperation::new("g", ty("void"))
                },
            ],
            ..Default::default()
        });
        let content = InterfaceGenerator::new(&BindingContext::new()).generate(&interface).unwrap();

        let flags: Vec<bool> = content.methods.iter().map(|m| m.do_generate_method_configuration).collect();
        assert_eq!(flags, vec![true, false, false]);
        assert!(content.has_method_configuration);
    }

    #[test]
    fn test_event_constructor() {
        let interface = InterfaceDefinition::Interface(IdlInterface {
            name: "PopStateEvent".to_string(),
            attributes: vec![IdlAttribute::new("state", ty("any"))],
            extended_attributes: ExtendedAttributes::new().with_flag("EventConstructor"),
            ..Default::default()
        });
        let content = InterfaceGenerator::new(&BindingContext::new()).generate(&interface).unwrap();

        assert!(content.has_event_constructor);
        assert_eq!(content.interface_length, 1);
        assert_eq!(content.any_type_attributes, vec!["state"]);
        assert!(content.cpp_includes.contains(&"bindings/v8/SerializedScriptValue.h".to_string()));
    }
}
