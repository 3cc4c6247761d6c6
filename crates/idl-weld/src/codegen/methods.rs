//! Operation content
//!
//! Builds the per-operation and per-argument records the method templates
//! consume, plus the overload resolution expressions shared with
//! constructors.

use crate::codegen::types::{
    template_type, HostType, HostTypeOptions, Release, ReturnValueOptions, SetReturnValue, TypeMapper,
};
use crate::codegen::utilities::{
    activity_logging_world_list, call_with_arguments, conditional_string, cpp_name,
    deprecate_as, enum_validation_expression, measure_as, per_context_enabled_function_name,
    runtime_enabled_function_name, scoped_name, world_suffixes,
};
use crate::codegen::{BindingContext, IncludeSet};
use crate::error::IdlResult;
use crate::ir::{IdlArgument, IdlOperation, IdlType, InterfaceDefinition, InterfaceMembers};
use indexmap::IndexMap;
use serde::Serialize;

/// Operations that always report through an exception state
const EVENT_LISTENER_METHODS: &[&str] = &["addEventListener", "removeEventListener", "dispatchEvent"];

/// Traits that disable the default signature check
const SIGNATURE_EXEMPT_ATTRIBUTES: &[&str] = &[
    "DoNotCheckSecurity",
    "DoNotCheckSignature",
    "NotEnumerable",
    "ReadOnly",
    "RuntimeEnabled",
    "Unforgeable",
];

/// Content for one operation argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentContent {
    pub cpp_type: HostType,
    /// Call with the arguments before this one, used when it is omitted
    pub cpp_value: String,
    pub enum_validation_expression: Option<String>,
    pub has_default: bool,
    /// Base type, `None` for arrays and sequences
    pub idl_type: Option<String>,
    pub index: usize,
    pub is_clamp: bool,
    pub is_callback_interface: bool,
    pub is_nullable: bool,
    pub is_optional: bool,
    pub is_strict_type_checking: bool,
    pub is_variadic_wrapper_type: bool,
    pub is_wrapper_type: bool,
    pub name: String,
    pub vector_type: String,
    pub v8_set_return_value: Option<SetReturnValue>,
    pub v8_set_return_value_for_main_world: Option<SetReturnValue>,
    pub v8_value_to_local_cpp_value: String,
}

/// One member of an overload set, as the dispatcher sees it
#[derive(Debug, Clone, Serialize)]
pub struct OverloadEntry {
    pub name: String,
    pub overload_index: usize,
    pub overload_resolution_expression: String,
    pub deprecate_as: Option<String>,
    pub measure_as: Option<String>,
}

/// Dispatch information, carried by the last overload of a name
#[derive(Debug, Clone, Serialize)]
pub struct OverloadSet {
    pub has_exception_state: bool,
    pub methods: Vec<OverloadEntry>,
    pub minimum_number_of_required_arguments: usize,
    pub name: String,
}

/// Content for one operation
#[derive(Debug, Clone, Serialize)]
pub struct MethodContent {
    pub activity_logging_world_list: Vec<String>,
    pub arguments: Vec<ArgumentContent>,
    pub conditional_string: Option<String>,
    pub cpp_type: HostType,
    pub cpp_value: String,
    pub deprecate_as: Option<String>,
    pub do_generate_method_configuration: bool,
    pub do_not_check_signature: bool,
    pub function_template: String,
    pub has_exception_state: bool,
    pub idl_type: Option<String>,
    pub is_call_with_execution_context: bool,
    pub is_call_with_script_arguments: bool,
    pub is_call_with_script_state: bool,
    pub is_check_security_for_frame: bool,
    pub is_check_security_for_node: bool,
    pub is_custom: bool,
    pub is_custom_element_callbacks: bool,
    pub is_do_not_check_security: bool,
    pub is_do_not_check_signature: bool,
    pub is_implemented_by: bool,
    pub is_per_world_bindings: bool,
    pub is_raises_exception: bool,
    pub is_read_only: bool,
    pub is_static: bool,
    pub is_strict_type_checking: bool,
    pub is_variadic: bool,
    pub measure_as: Option<String>,
    pub name: String,
    pub number_of_arguments: usize,
    pub number_of_required_arguments: usize,
    pub number_of_required_or_variadic_arguments: usize,
    pub overload_index: Option<usize>,
    pub overload_resolution_expression: Option<String>,
    pub overloads: Option<OverloadSet>,
    pub per_context_enabled_function: Option<String>,
    pub property_attributes: Vec<String>,
    pub runtime_enabled_function: Option<String>,
    pub signature: String,
    pub union_arguments: Option<Vec<String>>,
    pub v8_set_return_value: Option<SetReturnValue>,
    pub v8_set_return_value_for_main_world: Option<SetReturnValue>,
    pub world_suffixes: Vec<String>,
}

/// Generator for the operations of one interface
pub struct MethodGenerator<'a> {
    context: &'a BindingContext,
    mapper: TypeMapper<'a>,
    interface: &'a InterfaceDefinition,
}

impl<'a> MethodGenerator<'a> {
    pub fn new(context: &'a BindingContext, interface: &'a InterfaceDefinition) -> Self {
        Self {
            context,
            mapper: TypeMapper::new(context),
            interface,
        }
    }

    /// Generate the content of `method`
    pub fn generate(&self, method: &IdlOperation, includes: &mut IncludeSet) -> IdlResult<MethodContent> {
        let ext = &method.extended_attributes;
        let arguments = &method.arguments;
        let idl_type = return_type(method);
        let is_static = method.is_static;

        self.mapper.add_includes_for(&idl_type, includes);
        let cpp_value = self.cpp_value(method, arguments.len())?;

        let is_call_with_script_arguments = ext.has_value("CallWith", "ScriptArguments");
        if is_call_with_script_arguments {
            includes.extend([
                "bindings/v8/ScriptCallStackFactory.h",
                "core/inspector/ScriptArguments.h",
            ]);
        }
        let is_call_with_script_state = ext.has_value("CallWith", "ScriptState");
        if is_call_with_script_state {
            includes.add("bindings/v8/ScriptState.h");
        }
        let is_check_security_for_node = ext.contains("CheckSecurity");
        if is_check_security_for_node {
            includes.add("bindings/v8/BindingSecurity.h");
        }
        let is_custom_element_callbacks = ext.contains("CustomElementCallbacks");
        if is_custom_element_callbacks {
            includes.add("core/dom/custom/CustomElementCallbackDispatcher.h");
        }

        let interface_ext = self.interface.extended_attributes();
        let is_check_security_for_frame =
            interface_ext.contains("CheckSecurity") && !ext.contains("DoNotCheckSecurity");
        let is_raises_exception = ext.contains("RaisesException");

        let has_exception_state = is_raises_exception
            || is_check_security_for_frame
            || is_check_security_for_node
            || arguments.iter().any(argument_needs_exception_state)
            || EVENT_LISTENER_METHODS.contains(&method.name.as_str());

        let function_template = if is_static {
            "functionTemplate"
        } else if ext.contains("Unforgeable") {
            "instanceTemplate"
        } else {
            "prototypeTemplate"
        };

        let arguments_content = arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| self.generate_argument(method, argument, index, includes))
            .collect::<IdlResult<Vec<_>>>()?;

        Ok(MethodContent {
            activity_logging_world_list: activity_logging_world_list(ext, None, includes),
            arguments: arguments_content,
            conditional_string: conditional_string(ext),
            cpp_type: self.mapper.host_type(&idl_type, &HostTypeOptions::default())?,
            deprecate_as: deprecate_as(ext, includes),
            do_generate_method_configuration: false,
            do_not_check_signature: !(is_static
                || SIGNATURE_EXEMPT_ATTRIBUTES.iter().any(|name| ext.contains(name))),
            function_template: function_template.to_string(),
            has_exception_state,
            idl_type: idl_type.base_type().map(str::to_string),
            is_call_with_execution_context: ext.has_value("CallWith", "ExecutionContext"),
            is_call_with_script_arguments,
            is_call_with_script_state,
            is_check_security_for_frame,
            is_check_security_for_node,
            is_custom: ext.contains("Custom"),
            is_custom_element_callbacks,
            is_do_not_check_security: ext.contains("DoNotCheckSecurity"),
            is_do_not_check_signature: ext.contains("DoNotCheckSignature"),
            is_implemented_by: ext.contains("ImplementedBy"),
            is_per_world_bindings: ext.contains("PerWorldBindings"),
            is_raises_exception,
            is_read_only: ext.contains("ReadOnly"),
            is_static,
            is_strict_type_checking: ext.contains("StrictTypeChecking")
                || interface_ext.contains("StrictTypeChecking"),
            is_variadic: arguments.last().is_some_and(|a| a.is_variadic),
            measure_as: measure_as(ext, includes),
            name: method.name.clone(),
            number_of_arguments: arguments.len(),
            number_of_required_arguments: arguments
                .iter()
                .filter(|a| !(a.is_optional || a.is_variadic))
                .count(),
            number_of_required_or_variadic_arguments: arguments.iter().filter(|a| !a.is_optional).count(),
            overload_index: None,
            overload_resolution_expression: None,
            overloads: None,
            per_context_enabled_function: per_context_enabled_function_name(ext),
            property_attributes: property_attributes(method),
            runtime_enabled_function: runtime_enabled_function_name(ext),
            signature: if is_static || ext.contains("DoNotCheckSignature") {
                "v8::Local<v8::Signature>()".to_string()
            } else {
                "defaultSignature".to_string()
            },
            union_arguments: union_arguments(&idl_type),
            v8_set_return_value_for_main_world: self.set_return_value(method, &cpp_value, true, includes)?,
            v8_set_return_value: self.set_return_value(method, &cpp_value, false, includes)?,
            cpp_value,
            world_suffixes: world_suffixes(ext),
        })
    }

    fn generate_argument(
        &self,
        method: &IdlOperation,
        argument: &IdlArgument,
        index: usize,
        includes: &mut IncludeSet,
    ) -> IdlResult<ArgumentContent> {
        let ext = &argument.extended_attributes;
        let idl_type = &argument.idl_type;
        let cpp_value = self.cpp_value(method, index)?;
        let is_wrapper_type = self.mapper.is_wrapper_type(idl_type);
        let is_variadic_wrapper_type = argument.is_variadic && is_wrapper_type;
        let use_heap_vector_type =
            is_variadic_wrapper_type && self.mapper.is_will_be_garbage_collected(idl_type);

        Ok(ArgumentContent {
            cpp_type: self.mapper.host_type(
                idl_type,
                &HostTypeOptions::default().in_heap_object(use_heap_vector_type),
            )?,
            enum_validation_expression: enum_validation_expression(self.context, idl_type),
            has_default: ext.contains("Default"),
            idl_type: if idl_type.is_composite() {
                None
            } else {
                idl_type.base_type().map(str::to_string)
            },
            index,
            is_clamp: ext.contains("Clamp"),
            is_callback_interface: self.mapper.is_callback_interface(idl_type),
            is_nullable: idl_type.nullable,
            is_optional: argument.is_optional,
            is_strict_type_checking: ext.contains("StrictTypeChecking"),
            is_variadic_wrapper_type,
            is_wrapper_type,
            name: argument.name.clone(),
            vector_type: if use_heap_vector_type { "WillBeHeapVector" } else { "Vector" }.to_string(),
            v8_set_return_value_for_main_world: self.set_return_value(method, &cpp_value, true, includes)?,
            v8_set_return_value: self.set_return_value(method, &cpp_value, false, includes)?,
            v8_value_to_local_cpp_value: self.local_host_value(argument, index, includes)?,
            cpp_value,
        })
    }

    /// Host call of `method` with its first `number_of_arguments` arguments
    pub fn cpp_value(&self, method: &IdlOperation, number_of_arguments: usize) -> IdlResult<String> {
        let ext = &method.extended_attributes;
        let mut cpp_arguments = call_with_arguments(ext, "CallWith")?;
        if ext.contains("ImplementedBy") && !method.is_static {
            cpp_arguments.push("*imp".to_string());
        }
        cpp_arguments.extend(
            method
                .arguments
                .iter()
                .take(number_of_arguments)
                .map(|argument| self.cpp_argument(argument)),
        );
        if let Some(union_arguments) = union_arguments(&return_type(method)) {
            cpp_arguments.extend(union_arguments);
        }
        if ext.contains("RaisesException") {
            cpp_arguments.push("exceptionState".to_string());
        }

        let cpp_method_name = scoped_name(
            cpp_name(self.interface.name(), self.interface.extended_attributes()),
            method.is_static,
            ext,
            cpp_name(&method.name, ext),
        );
        Ok(format!("{}({})", cpp_method_name, cpp_arguments.join(", ")))
    }

    fn cpp_argument(&self, argument: &IdlArgument) -> String {
        let idl_type = &argument.idl_type;
        if self.mapper.is_callback_interface(idl_type) || idl_type.is_named("NodeFilter") || idl_type.is_named("XPathNSResolver") {
            format!("{}.release()", argument.name)
        } else {
            argument.name.clone()
        }
    }

    /// Return statement for `cpp_value`, `None` for `void`
    fn set_return_value(
        &self,
        method: &IdlOperation,
        cpp_value: &str,
        for_main_world: bool,
        includes: &mut IncludeSet,
    ) -> IdlResult<Option<SetReturnValue>> {
        let idl_type = return_type(method);
        if idl_type.is_named("void") {
            return Ok(None);
        }
        let ext = &method.extended_attributes;

        let mut value = cpp_value;
        let mut release = Release::Never;
        if ext.has_value("CallWith", "ScriptState") || ext.contains("RaisesException") || idl_type.is_union_type() {
            value = "result";
            release = if idl_type.is_union_type() {
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
        }

        let script_wrappable = if self.context.inherits_interface(self.interface.name(), "Node") {
            "imp"
        } else {
            ""
        };
        let options = ReturnValueOptions {
            script_wrappable,
            release,
            for_main_world,
        };
        self.mapper
            .set_return_value(&idl_type, value, ext, &options, includes)
            .map(Some)
    }

    /// Local declaration converting the script value of `argument`
    pub fn local_host_value(&self, argument: &IdlArgument, index: usize, includes: &mut IncludeSet) -> IdlResult<String> {
        local_host_value(&self.mapper, argument, index, includes)
    }
}

/// Local declaration converting argument `index` from `info`
pub fn local_host_value(
    mapper: &TypeMapper<'_>,
    argument: &IdlArgument,
    index: usize,
    includes: &mut IncludeSet,
) -> IdlResult<String> {
    let ext = &argument.extended_attributes;
    let idl_type = &argument.idl_type;
    let name = &argument.name;

    if argument.is_variadic {
        let vector_type = if mapper.is_will_be_garbage_collected(idl_type) {
            "WillBeHeapVector"
        } else {
            "Vector"
        };
        let cpp_type = mapper.host_type(idl_type, &HostTypeOptions::default())?.to_string();
        mapper.add_includes_for(idl_type, includes);
        return Ok(format!(
            "V8TRYCATCH_VOID({}, {}, {}(info, {}))",
            template_type(vector_type, &cpp_type),
            name,
            template_type("toNativeArguments", &cpp_type),
            index
        ));
    }

    let script_value = if argument.is_optional
        && idl_type.type_name() == "String"
        && ext.value_is("Default", "NullString")
    {
        format!("argumentOrNull(info, {})", index)
    } else {
        format!("info[{}]", index)
    };
    mapper.to_local_host_value(idl_type, ext, &script_value, name, Some(index), includes)
}

fn return_type(method: &IdlOperation) -> IdlType {
    method.idl_type.clone().unwrap_or_else(|| IdlType::named("void"))
}

pub(crate) fn argument_needs_exception_state(argument: &IdlArgument) -> bool {
    let ext = &argument.extended_attributes;
    argument.idl_type.type_name() == "SerializedScriptValue"
        || argument.idl_type.is_integer_type()
        || ext.contains("EnforceRange")
        || ext.contains("Clamp")
}

/// `[NotEnumerable]`, `[ReadOnly]`
fn property_attributes(method: &IdlOperation) -> Vec<String> {
    let ext = &method.extended_attributes;
    let mut attributes = Vec::new();
    if ext.contains("NotEnumerable") {
        attributes.push("v8::DontEnum".to_string());
    }
    if ext.contains("ReadOnly") {
        attributes.push("v8::ReadOnly".to_string());
    }
    if !attributes.is_empty() {
        attributes.insert(0, "v8::DontDelete".to_string());
    }
    attributes
}

/// `resultNEnabled`, `resultN` out-parameters of a union return, in member order
pub fn union_arguments(idl_type: &IdlType) -> Option<Vec<String>> {
    if !idl_type.is_union_type() {
        return None;
    }
    Some(
        (0..idl_type.member_types().len())
            .flat_map(|i| [format!("result{}Enabled", i), format!("result{}", i)])
            .collect(),
    )
}

/// OR of the argument-count checks under which an overload is selected
///
/// One term per optional argument (the call omitting it and every later
/// argument) plus, unless the last argument is variadic, the full call.
/// `strict_arguments` honors per-argument `[StrictTypeChecking]`.
pub fn overload_resolution_expression(
    mapper: &TypeMapper<'_>,
    arguments: &[IdlArgument],
    is_variadic: bool,
    strict_arguments: bool,
) -> String {
    let mut checks: Vec<String> = arguments
        .iter()
        .enumerate()
        .filter(|(_, argument)| argument.is_optional)
        .map(|(index, _)| overload_check_expression(mapper, arguments, index, strict_arguments))
        .collect();
    if !is_variadic {
        checks.push(overload_check_expression(mapper, arguments, arguments.len(), strict_arguments));
    }
    checks
        .iter()
        .map(|check| format!("({})", check))
        .collect::<Vec<_>>()
        .join(" || ")
}

fn overload_check_expression(
    mapper: &TypeMapper<'_>,
    arguments: &[IdlArgument],
    argument_count: usize,
    strict_arguments: bool,
) -> String {
    let mut checks = vec![format!("info.Length() == {}", argument_count)];
    checks.extend(
        arguments
            .iter()
            .take(argument_count)
            .enumerate()
            .filter_map(|(index, argument)| overload_check_argument(mapper, index, argument, strict_arguments)),
    );
    checks
        .iter()
        .map(|check| format!("({})", check))
        .collect::<Vec<_>>()
        .join(" && ")
}

fn overload_check_argument(
    mapper: &TypeMapper<'_>,
    index: usize,
    argument: &IdlArgument,
    strict_arguments: bool,
) -> Option<String> {
    let cpp_value = format!("info[{}]", index);
    let idl_type = &argument.idl_type;
    let is_strict = strict_arguments && argument.extended_attributes.contains("StrictTypeChecking");

    if idl_type.type_name() == "String" && is_strict {
        return Some(format!(
            "isUndefinedOrNull({0}) || {0}->IsString() || {0}->IsObject()",
            cpp_value
        ));
    }
    if idl_type.is_composite() {
        return Some(format!("{}->IsArray()", cpp_value));
    }
    if mapper.is_callback_interface(idl_type) {
        return Some(format!("{0}->IsNull() || {0}->IsFunction()", cpp_value));
    }
    if mapper.is_wrapper_type(idl_type) {
        let type_check = format!(
            "V8{}::hasInstance({}, info.GetIsolate())",
            idl_type.base_type().unwrap_or_default(),
            cpp_value
        );
        if idl_type.nullable {
            return Some(format!("{}->IsNull() || {}", cpp_value, type_check));
        }
        return Some(type_check);
    }
    if mapper.is_interface_type(idl_type) {
        // Non-wrapper objects are not distinguished by type; undefined is
        // only accepted for optional ones
        let type_check = format!("{}->IsObject()", cpp_value);
        let added_check = match (idl_type.nullable, argument.is_optional) {
            (true, true) => Some(format!("isUndefinedOrNull({})", cpp_value)),
            (true, false) => Some(format!("{}->IsNull()", cpp_value)),
            (false, true) => Some(format!("{}->IsUndefined()", cpp_value)),
            (false, false) => None,
        };
        return Some(match added_check {
            Some(check) => format!("{} || {}", check, type_check),
            None => type_check,
        });
    }
    None
}

/// Group same-named operations of one kind (static or not) into overload sets
///
/// Numbers overloads from 1 in declaration order and attaches the
/// dispatch information to the last overload of each name.
pub fn generate_overloads(mapper: &TypeMapper<'_>, methods: &mut [MethodContent], operations: &[&IdlOperation]) {
    generate_overloads_by_type(mapper, methods, operations, false);
    generate_overloads_by_type(mapper, methods, operations, true);
}

fn generate_overloads_by_type(
    mapper: &TypeMapper<'_>,
    methods: &mut [MethodContent],
    operations: &[&IdlOperation],
    is_static: bool,
) {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for method in methods.iter().filter(|m| m.is_static == is_static) {
        *counts.entry(method.name.clone()).or_default() += 1;
    }

    let mut seen: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (position, (method, operation)) in methods.iter_mut().zip(operations).enumerate() {
        if method.is_static != is_static || counts.get(&method.name).copied().unwrap_or(0) <= 1 {
            continue;
        }
        let positions = seen.entry(method.name.clone()).or_default();
        positions.push(position);
        method.overload_index = Some(positions.len());
        method.overload_resolution_expression = Some(overload_resolution_expression(
            mapper,
            &operation.arguments,
            method.is_variadic,
            true,
        ));
    }

    for (name, positions) in seen {
        let entries: Vec<OverloadEntry> = positions
            .iter()
            .map(|&position| {
                let method = &methods[position];
                OverloadEntry {
                    name: method.name.clone(),
                    overload_index: method.overload_index.unwrap_or_default(),
                    overload_resolution_expression: method.overload_resolution_expression.clone().unwrap_or_default(),
                    deprecate_as: method.deprecate_as.clone(),
                    measure_as: method.measure_as.clone(),
                }
            })
            .collect();
        let minimum_number_of_required_arguments = positions
            .iter()
            .map(|&position| methods[position].number_of_required_arguments)
            .min()
            .unwrap_or(0);

        if let Some(&last) = positions.last() {
            methods[last].overloads = Some(OverloadSet {
                has_exception_state: minimum_number_of_required_arguments > 0,
                methods: entries,
                minimum_number_of_required_arguments,
                name,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ExtendedAttributes, IdlInterface};
    use pretty_assertions::assert_eq;

    fn ty(s: &str) -> IdlType {
        s.parse().unwrap()
    }

    fn interface(name: &str, ext: ExtendedAttributes) -> InterfaceDefinition {
        InterfaceDefinition::Interface(IdlInterface {
            name: name.to_string(),
            extended_attributes: ext,
            ..Default::default()
        })
    }

    fn operation(name: &str, return_type: &str, arguments: Vec<IdlArgument>) -> IdlOperation {
        IdlOperation {
            arguments,
            ..IdlOperation::new(name, ty(return_type))
        }
    }

    fn optional(mut argument: IdlArgument) -> IdlArgument {
        argument.is_optional = true;
        argument
    }

    #[test]
    fn test_exception_state_nullable_sequence() {
        let context = BindingContext::new();
        let foo = interface("Foo", ExtendedAttributes::new());
        let generator = MethodGenerator::new(&context, &foo);
        let mut includes = IncludeSet::new();

        let strings_only = operation(
            "setNames",
            "void",
            vec![IdlArgument::new("names", ty("sequence<DOMString>?"))],
        );
        let content = generator.generate(&strings_only, &mut includes).unwrap();
        assert!(!content.has_exception_state);

        let with_integer = operation(
            "setNames",
            "void",
            vec![
                IdlArgument::new("names", ty("sequence<DOMString>?")),
                IdlArgument::new("count", ty("long")),
            ],
        );
        let content = generator.generate(&with_integer, &mut includes).unwrap();
        assert!(content.has_exception_state);
    }

    #[test]
    fn test_exception_state_triggers() {
        let context = BindingContext::new();
        let secure = interface("Window", ExtendedAttributes::new().with_flag("CheckSecurity"));
        let generator = MethodGenerator::new(&context, &secure);
        let mut includes = IncludeSet::new();

        let plain = operation("focus", "void", vec![]);
        let content = generator.generate(&plain, &mut includes).unwrap();
        assert!(content.is_check_security_for_frame);
        assert!(content.has_exception_state);

        let mut exempt = operation("focus", "void", vec![]);
        exempt.extended_attributes = ExtendedAttributes::new().with_flag("DoNotCheckSecurity");
        let content = generator.generate(&exempt, &mut includes).unwrap();
        assert!(!content.has_exception_state);

        let listener = operation("addEventListener", "void", vec![]);
        assert!(generator.generate(&listener, &mut includes).unwrap().has_exception_state);

        let mut clamped = IdlArgument::new("value", ty("double"));
        clamped.extended_attributes = ExtendedAttributes::new().with_flag("Clamp");
        let clamp = operation("scale", "void", vec![clamped]);
        assert!(generator.generate(&clamp, &mut includes).unwrap().has_exception_state);
    }

    #[test]
    fn test_union_return_slots() {
        let context = BindingContext::new();
        let foo = interface("Foo", ExtendedAttributes::new());
        let generator = MethodGenerator::new(&context, &foo);
        let method = operation("item", "(Node or DOMString or long)", vec![IdlArgument::new("index", ty("unsigned long"))]);
        let content = generator.generate(&method, &mut IncludeSet::new()).unwrap();

        assert_eq!(
            content.union_arguments,
            Some(vec![
                "result0Enabled".to_string(),
                "result0".to_string(),
                "result1Enabled".to_string(),
                "result1".to_string(),
                "result2Enabled".to_string(),
                "result2".to_string(),
            ])
        );
        assert_eq!(
            content.cpp_value,
            "imp->item(index, result0Enabled, result0, result1Enabled, result1, result2Enabled, result2)"
        );
        assert_eq!(
            content.v8_set_return_value,
            Some(SetReturnValue::PerMember(vec![
                "v8SetReturnValue(info, result0.release())".to_string(),
                "v8SetReturnValueString(info, result1, info.GetIsolate())".to_string(),
                "v8SetReturnValueInt(info, result2)".to_string(),
            ]))
        );
    }

    #[test]
    fn test_cpp_value_order() {
        let context = BindingContext::new().with_callback_interface("VoidCallback");
        let foo = interface("Foo", ExtendedAttributes::new().with_value("ImplementedAs", "FooImpl"));
        let generator = MethodGenerator::new(&context, &foo);

        let mut method = operation(
            "run",
            "Node",
            vec![
                IdlArgument::new("callback", ty("VoidCallback")),
                IdlArgument::new("filter", ty("NodeFilter")),
            ],
        );
        method.extended_attributes = ExtendedAttributes::new()
            .with_value("CallWith", "ExecutionContext")
            .with_value("ImplementedBy", "FooHelpers")
            .with_flag("RaisesException");

        assert_eq!(
            generator.cpp_value(&method, 2).unwrap(),
            "FooHelpers::run(scriptContext, *imp, callback.release(), filter.release(), exceptionState)"
        );
        assert_eq!(
            generator.cpp_value(&method, 0).unwrap(),
            "FooHelpers::run(scriptContext, *imp, exceptionState)"
        );

        method.is_static = true;
        method.extended_attributes = ExtendedAttributes::new();
        assert_eq!(generator.cpp_value(&method, 0).unwrap(), "FooImpl::run()");
    }

    #[test]
    fn test_raising_method_returns_result() {
        let context = BindingContext::new().with_ancestors("Element", vec!["Node".to_string()]);
        let element = interface("Element", ExtendedAttributes::new());
        let generator = MethodGenerator::new(&context, &element);

        let mut method = operation("closest", "Element", vec![IdlArgument::new("selectors", ty("DOMString"))]);
        method.extended_attributes = ExtendedAttributes::new().with_flag("RaisesException");
        let content = generator.generate(&method, &mut IncludeSet::new()).unwrap();

        assert_eq!(
            content.v8_set_return_value,
            Some(SetReturnValue::Single(
                "v8SetReturnValueFast(info, WTF::getPtr(result.release()), imp)".to_string()
            ))
        );
        assert_eq!(
            content.v8_set_return_value_for_main_world,
            Some(SetReturnValue::Single(
                "v8SetReturnValueForMainWorld(info, WTF::getPtr(result.release()))".to_string()
            ))
        );
        assert_eq!(content.arguments[0].cpp_value, "imp->closest(exceptionState)");
    }

    #[test]
    fn test_arguments() {
        let context = BindingContext::new().with_garbage_collected("Node");
        let foo = interface("Foo", ExtendedAttributes::new());
        let generator = MethodGenerator::new(&context, &foo);
        let mut includes = IncludeSet::new();

        let mut title = optional(IdlArgument::new("title", ty("DOMString")));
        title.extended_attributes = ExtendedAttributes::new().with_value("Default", "NullString");
        let mut nodes = IdlArgument::new("nodes", ty("Node"));
        nodes.is_variadic = true;
        let method = operation("append", "void", vec![title, nodes]);

        let content = generator.generate(&method, &mut includes).unwrap();
        assert_eq!(content.v8_set_return_value, None);
        assert!(content.is_variadic);
        assert_eq!(content.number_of_required_arguments, 0);
        assert_eq!(content.number_of_required_or_variadic_arguments, 1);

        let title = &content.arguments[0];
        assert!(title.has_default);
        assert_eq!(
            title.v8_value_to_local_cpp_value,
            "V8TRYCATCH_FOR_V8STRINGRESOURCE_VOID(V8StringResource<>, title, argumentOrNull(info, 0))"
        );

        let nodes = &content.arguments[1];
        assert!(nodes.is_variadic_wrapper_type);
        assert_eq!(nodes.vector_type, "WillBeHeapVector");
        assert_eq!(nodes.cpp_type, HostType::Simple("RefPtrWillBeMember<Node>".to_string()));
        assert_eq!(
            nodes.v8_value_to_local_cpp_value,
            "V8TRYCATCH_VOID(WillBeHeapVector<RefPtrWillBeRawPtr<Node> >, nodes, toNativeArguments<RefPtrWillBeRawPtr<Node> >(info, 1))"
        );
        assert!(includes.contains("V8Node.h"));
    }

    #[test]
    fn test_flags() {
        let context = BindingContext::new();
        let foo = interface("Foo", ExtendedAttributes::new());
        let generator = MethodGenerator::new(&context, &foo);
        let mut includes = IncludeSet::new();

        let mut method = operation("toString", "DOMString", vec![]);
        method.extended_attributes = ExtendedAttributes::new()
            .with_flag("NotEnumerable")
            .with_flag("Unforgeable")
            .with_value("CallWith", "ScriptArguments|ScriptState");
        let content = generator.generate(&method, &mut includes).unwrap();

        assert_eq!(content.function_template, "instanceTemplate");
        assert_eq!(content.property_attributes, vec!["v8::DontDelete", "v8::DontEnum"]);
        assert!(!content.do_not_check_signature);
        assert_eq!(content.signature, "defaultSignature");
        assert!(content.is_call_with_script_state);
        assert!(includes.contains("core/inspector/ScriptArguments.h"));
        assert!(includes.contains("bindings/v8/ScriptState.h"));
    }

    #[test]
    fn test_overload_resolution_expression() {
        let context = BindingContext::new().with_callback_interface("VoidCallback");
        let mapper = TypeMapper::new(&context);

        let arguments = vec![
            IdlArgument::new("node", ty("Node?")),
            optional(IdlArgument::new("options", ty("Dictionary"))),
        ];
        assert_eq!(
            overload_resolution_expression(&mapper, &arguments, false, true),
            "((info.Length() == 1) && (info[0]->IsNull() || V8Node::hasInstance(info[0], info.GetIsolate()))) || \
             ((info.Length() == 2) && (info[0]->IsNull() || V8Node::hasInstance(info[0], info.GetIsolate())) && \
             (info[1]->IsUndefined() || info[1]->IsObject()))"
        );

        let arguments = vec![
            IdlArgument::new("callback", ty("VoidCallback")),
            IdlArgument::new("ids", ty("sequence<long>")),
            IdlArgument::new("count", ty("long")),
        ];
        assert_eq!(
            overload_resolution_expression(&mapper, &arguments, false, true),
            "((info.Length() == 3) && (info[0]->IsNull() || info[0]->IsFunction()) && (info[1]->IsArray()))"
        );
    }

    #[test]
    fn test_generate_overloads() {
        let context = BindingContext::new();
        let foo = interface("Foo", ExtendedAttributes::new());
        let generator = MethodGenerator::new(&context, &foo);
        let mapper = TypeMapper::new(&context);
        let mut includes = IncludeSet::new();

        let operations = vec![
            operation("draw", "void", vec![IdlArgument::new("image", ty("Image"))]),
            operation("clear", "void", vec![]),
            operation(
                "draw",
                "void",
                vec![IdlArgument::new("x", ty("double")), IdlArgument::new("y", ty("double"))],
            ),
        ];
        let refs: Vec<&IdlOperation> = operations.iter().collect();
        let mut methods: Vec<MethodContent> = operations
            .iter()
            .map(|op| generator.generate(op, &mut includes).unwrap())
            .collect();
        generate_overloads(&mapper, &mut methods, &refs);

        assert_eq!(methods[0].overload_index, Some(1));
        assert_eq!(methods[1].overload_index, None);
        assert_eq!(methods[2].overload_index, Some(2));
        assert!(methods[0].overloads.is_none());

        let overloads = methods[2].overloads.as_ref().unwrap();
        assert_eq!(overloads.name, "draw");
        assert_eq!(overloads.minimum_number_of_required_arguments, 1);
        assert!(overloads.has_exception_state);
        assert_eq!(overloads.methods.len(), 2);
        assert_eq!(
            overloads.methods[0].overload_resolution_expression,
            "((info.Length() == 1) && (V8Image::hasInstance(info[0], info.GetIsolate())))"
        );
        assert_eq!(overloads.methods[1].overload_resolution_expression, "((info.Length() == 2))");
    }
}
