//! Type-mapping engine
//!
//! Maps IDL types to host (C++) types and produces the expressions that
//! convert values between the script engine and the host, in both
//! directions. Includes needed by a conversion are recorded into the
//! caller's [`IncludeSet`].
//!
//! Before any rule applies, types are preprocessed: enums are carried as
//! `DOMString`, and `any` and callback functions as `ScriptValue`.

use crate::codegen::includes::special_includes;
use crate::codegen::utilities::strip_suffix;
use crate::codegen::{BindingContext, IncludeSet};
use crate::error::{IdlError, IdlResult};
use crate::ir::{ExtendedAttributes, IdlType, TypeLookup};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Interface types that are not backed by a DOM wrapper
pub const NON_WRAPPER_TYPES: &[&str] = &[
    "CompareHow",
    "Dictionary",
    "EventHandler",
    "EventListener",
    "MediaQueryListListener",
    "NodeFilter",
    "SerializedScriptValue",
];

pub const TYPED_ARRAYS: &[&str] = &[
    "ArrayBuffer",
    "ArrayBufferView",
    "Float32Array",
    "Float64Array",
    "Int8Array",
    "Int16Array",
    "Int32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Uint16Array",
    "Uint32Array",
];

const CPP_TYPE_SAME_AS_IDL_TYPE: &[&str] = &["double", "float", "long long", "unsigned long long"];

const CPP_INT_TYPES: &[&str] = &["byte", "long", "short"];

const CPP_UNSIGNED_TYPES: &[&str] = &["octet", "unsigned int", "unsigned long", "unsigned short"];

/// Conversion types whose value is converted to a script value before
/// being set as a return value
const CONVERTED_BEFORE_RETURN: &[&str] = &["Date", "EventHandler", "ScriptValue", "SerializedScriptValue", "array"];

fn special_host_type(base_type: &str) -> Option<&'static str> {
    Some(match base_type {
        "CompareHow" => "Range::CompareHow",
        "Date" => "double",
        "Dictionary" => "Dictionary",
        "EventHandler" => "EventListener*",
        "MediaQueryListListener" => "RefPtrWillBeRawPtr<MediaQueryListListener>",
        "Promise" => "ScriptPromise",
        "ScriptValue" => "ScriptValue",
        "XPathNSResolver" => "RefPtrWillBeRawPtr<XPathNSResolver>",
        "boolean" => "bool",
        "unrestricted float" => "float",
        "unrestricted double" => "double",
        "void" => "void",
        _ => return None,
    })
}

/// Script value -> host value, by base type
fn to_host_template(base_type: &str) -> Option<&'static str> {
    Some(match base_type {
        "Date" => "toCoreDate({v8_value})",
        "DOMString" => "{v8_value}",
        "boolean" => "{v8_value}->BooleanValue()",
        "float" | "unrestricted float" => "static_cast<float>({v8_value}->NumberValue())",
        "double" | "unrestricted double" => "static_cast<double>({v8_value}->NumberValue())",
        "byte" => "toInt8({arguments})",
        "octet" => "toUInt8({arguments})",
        "short" => "toInt16({arguments})",
        "unsigned short" => "toUInt16({arguments})",
        "long" => "toInt32({arguments})",
        "unsigned long" => "toUInt32({arguments})",
        "long long" => "toInt64({arguments})",
        "unsigned long long" => "toUInt64({arguments})",
        "CompareHow" => "static_cast<Range::CompareHow>({v8_value}->Int32Value())",
        "Dictionary" => "Dictionary({v8_value}, info.GetIsolate())",
        "EventTarget" => "V8DOMWrapper::isDOMWrapper({v8_value}) ? toWrapperTypeInfo(v8::Handle<v8::Object>::Cast({v8_value}))->toEventTarget(v8::Handle<v8::Object>::Cast({v8_value})) : 0",
        "MediaQueryListListener" => "MediaQueryListListener::create(ScriptValue({v8_value}, info.GetIsolate()))",
        "NodeFilter" => "toNodeFilter({v8_value}, info.GetIsolate())",
        "Promise" => "ScriptPromise({v8_value}, info.GetIsolate())",
        "SerializedScriptValue" => "SerializedScriptValue::create({v8_value}, info.GetIsolate())",
        "ScriptValue" => "ScriptValue({v8_value}, info.GetIsolate())",
        "Window" => "toDOMWindow({v8_value}, info.GetIsolate())",
        "XPathNSResolver" => "toXPathNSResolver({v8_value}, info.GetIsolate())",
        _ => return None,
    })
}

/// Return-value statement, by conversion type
fn set_return_template(conversion_type: &str) -> Option<&'static str> {
    Some(match conversion_type {
        "boolean" => "v8SetReturnValueBool(info, {cpp_value})",
        "int" => "v8SetReturnValueInt(info, {cpp_value})",
        "unsigned" => "v8SetReturnValueUnsigned(info, {cpp_value})",
        "DOMString" => "v8SetReturnValueString(info, {cpp_value}, info.GetIsolate())",
        "StringOrNull" => "v8SetReturnValueStringOrNull(info, {cpp_value}, info.GetIsolate())",
        "StringOrUndefined" => "v8SetReturnValueStringOrUndefined(info, {cpp_value}, info.GetIsolate())",
        "void" => "",
        "float" | "double" => "v8SetReturnValue(info, {cpp_value})",
        "array" | "Date" | "EventHandler" | "ScriptValue" | "SerializedScriptValue" => {
            "v8SetReturnValue(info, {cpp_value})"
        }
        "DOMWrapperForMainWorld" => "v8SetReturnValueForMainWorld(info, WTF::getPtr({cpp_value}))",
        "DOMWrapperFast" => "v8SetReturnValueFast(info, WTF::getPtr({cpp_value}), {script_wrappable})",
        "DOMWrapperDefault" => "v8SetReturnValue(info, {cpp_value})",
        _ => return None,
    })
}

/// Host value -> script value, by conversion type
fn to_script_template(conversion_type: &str) -> Option<&'static str> {
    Some(match conversion_type {
        "Date" => "v8DateOrNull({cpp_value}, {isolate})",
        "DOMString" => "v8String({isolate}, {cpp_value})",
        "StringOrNull" => "{cpp_value}.isNull() ? v8::Handle<v8::Value>(v8::Null({isolate})) : v8String({isolate}, {cpp_value})",
        "StringOrUndefined" => "{cpp_value}.isNull() ? v8Undefined() : v8String({isolate}, {cpp_value})",
        "boolean" => "v8Boolean({cpp_value}, {isolate})",
        "int" => "v8::Integer::New({isolate}, {cpp_value})",
        "unsigned" => "v8::Integer::NewFromUnsigned({isolate}, {cpp_value})",
        "float" | "double" => "v8::Number::New({isolate}, {cpp_value})",
        "void" => "v8Undefined()",
        "EventHandler" => "{cpp_value} ? v8::Handle<v8::Value>(V8AbstractEventListener::cast({cpp_value})->getListenerObject(imp->executionContext())) : v8::Handle<v8::Value>(v8::Null({isolate}))",
        "ScriptValue" => "{cpp_value}.v8Value()",
        "SerializedScriptValue" => "{cpp_value} ? {cpp_value}->deserialize() : v8::Handle<v8::Value>(v8::Null({isolate}))",
        "array" => "v8Array({cpp_value}, {isolate})",
        "DOMWrapper" => "toV8({cpp_value}, {creation_context}, {isolate})",
        _ => return None,
    })
}

/// Substitute `{key}` placeholders
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{}}}", key), value)
    })
}

/// `Template<Inner>`, spacing `> >` as older compilers need
pub fn template_type(template: &str, inner: &str) -> String {
    if inner.ends_with('>') {
        format!("{}<{} >", template, inner)
    } else {
        format!("{}<{}>", template, inner)
    }
}

/// Host type of an IDL type; unions map member-wise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HostType {
    Simple(String),
    Union(Vec<HostType>),
}

impl HostType {
    pub fn as_simple(&self) -> Option<&str> {
        match self {
            HostType::Simple(name) => Some(name),
            HostType::Union(_) => None,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Simple(name) => write!(f, "{}", name),
            HostType::Union(members) => {
                let members: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "{}", members.join(", "))
            }
        }
    }
}

/// How a host type is used
#[derive(Debug, Clone, Copy, Default)]
pub struct HostTypeOptions<'a> {
    /// Consulted for `[TreatNullAs]` / `[TreatUndefinedAs]`
    pub extended_attributes: Option<&'a ExtendedAttributes>,
    /// Raw argument form (`Node*`, `V8StringResource<>`)
    pub used_as_argument: bool,
    /// Element of a heap-allocated container
    pub will_be_in_heap_object: bool,
}

impl<'a> HostTypeOptions<'a> {
    pub fn argument() -> Self {
        Self {
            used_as_argument: true,
            ..Default::default()
        }
    }

    pub fn in_heap_object(mut self, in_heap: bool) -> Self {
        self.will_be_in_heap_object = in_heap;
        self
    }

    pub fn with_extended_attributes(mut self, ext: &'a ExtendedAttributes) -> Self {
        self.extended_attributes = Some(ext);
        self
    }
}

/// Whether a returned value is released into the return slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Release {
    #[default]
    Never,
    Always,
    /// Per union member, in declaration order
    PerMember(Vec<bool>),
}

impl Release {
    fn member(&self, index: usize) -> bool {
        match self {
            Release::Never => false,
            Release::Always => true,
            Release::PerMember(flags) => flags.get(index).copied().unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReturnValueOptions<'a> {
    /// Receiver whose wrapper can be reused (`imp`), empty for none
    pub script_wrappable: &'a str,
    pub release: Release,
    pub for_main_world: bool,
}

/// Statement(s) setting a return value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SetReturnValue {
    Single(String),
    /// One statement per union member
    PerMember(Vec<String>),
}

impl SetReturnValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            SetReturnValue::Single(statement) => Some(statement),
            SetReturnValue::PerMember(_) => None,
        }
    }
}

/// Type-mapping engine over a [`BindingContext`]
pub struct TypeMapper<'a> {
    context: &'a BindingContext,
}

impl<'a> TypeMapper<'a> {
    pub fn new(context: &'a BindingContext) -> Self {
        Self { context }
    }

    /// Enums become `DOMString`; `any` and callback functions become `ScriptValue`
    pub fn preprocess(&self, idl_type: &IdlType) -> IdlType {
        match idl_type.name() {
            Some(name) if self.context.is_enum(name) => IdlType::named("DOMString"),
            Some(name) if name == "any" || self.context.is_callback_function(name) => {
                IdlType::named("ScriptValue")
            }
            _ => idl_type.clone(),
        }
    }

    pub fn context(&self) -> &'a BindingContext {
        self.context
    }

    pub fn is_callback_interface(&self, idl_type: &IdlType) -> bool {
        idl_type
            .name()
            .is_some_and(|name| self.context.is_callback_interface(name))
    }

    pub fn is_interface_type(&self, idl_type: &IdlType) -> bool {
        idl_type.is_interface_type(self.context)
    }

    /// Interface type backed by a DOM wrapper
    pub fn is_wrapper_type(&self, idl_type: &IdlType) -> bool {
        self.is_interface_type(idl_type)
            && idl_type
                .base_type()
                .is_some_and(|base| !NON_WRAPPER_TYPES.contains(&base))
    }

    pub fn is_typed_array_type(&self, idl_type: &IdlType) -> bool {
        idl_type.base_type().is_some_and(|base| TYPED_ARRAYS.contains(&base))
    }

    pub fn is_will_be_garbage_collected(&self, idl_type: &IdlType) -> bool {
        self.context.is_will_be_garbage_collected(idl_type)
    }

    /// Implementation class of the base type
    pub fn implemented_as(&self, idl_type: &IdlType) -> String {
        let base = idl_type.base_type().unwrap_or_default();
        self.context.implemented_as(base).to_string()
    }

    /// Host type of `idl_type`
    pub fn host_type(&self, idl_type: &IdlType, options: &HostTypeOptions<'_>) -> IdlResult<HostType> {
        let idl_type = self.preprocess(idl_type);

        if let Some(element) = idl_type.element_type() {
            let garbage_collected = self.is_will_be_garbage_collected(element);
            let vector = if garbage_collected { "WillBeHeapVector" } else { "Vector" };
            let inner = self.host_type(
                element,
                &HostTypeOptions::default().in_heap_object(garbage_collected),
            )?;
            return Ok(HostType::Simple(template_type(vector, &inner.to_string())));
        }

        if idl_type.is_union_type() {
            return idl_type
                .member_types()
                .iter()
                .map(|member| self.host_type(member, &HostTypeOptions::default()))
                .collect::<IdlResult<Vec<_>>>()
                .map(HostType::Union);
        }

        let base = idl_type.name().unwrap_or_default();
        let simple = |name: String| Ok(HostType::Simple(name));

        if CPP_TYPE_SAME_AS_IDL_TYPE.contains(&base) {
            return simple(base.to_string());
        }
        if CPP_INT_TYPES.contains(&base) {
            return simple("int".to_string());
        }
        if CPP_UNSIGNED_TYPES.contains(&base) {
            return simple("unsigned".to_string());
        }
        if let Some(host) = special_host_type(base) {
            return simple(host.to_string());
        }
        if NON_WRAPPER_TYPES.contains(&base) {
            return simple(template_type("RefPtr", base));
        }
        if base == "DOMString" {
            if !options.used_as_argument {
                return simple("String".to_string());
            }
            let mode = string_mode(options.extended_attributes)?;
            return simple(format!("V8StringResource<{}>", mode));
        }
        if self.is_typed_array_type(&idl_type) && options.used_as_argument {
            return simple(format!("{}*", base));
        }
        if self.is_interface_type(&idl_type) {
            let class = self.context.implemented_as(base);
            if options.used_as_argument {
                return simple(format!("{}*", class));
            }
            if self.is_will_be_garbage_collected(&idl_type) {
                let ref_ptr = if options.will_be_in_heap_object {
                    "RefPtrWillBeMember"
                } else {
                    "RefPtrWillBeRawPtr"
                };
                return simple(template_type(ref_ptr, class));
            }
            return simple(template_type("RefPtr", class));
        }
        // Native type is a pointer with the same name
        simple(format!("{}*", base))
    }

    /// Headers the host side of `idl_type` needs
    pub fn includes_for(&self, idl_type: &IdlType) -> BTreeSet<String> {
        let idl_type = self.preprocess(idl_type);

        if let Some(element) = idl_type.element_type() {
            return self.includes_for(element);
        }
        if idl_type.is_union_type() {
            return idl_type
                .member_types()
                .iter()
                .flat_map(|member| self.includes_for(member))
                .collect();
        }

        let base = idl_type.name().unwrap_or_default();
        if let Some(includes) = special_includes(base) {
            return includes.iter().map(|s| s.to_string()).collect();
        }
        if idl_type.is_basic_type() {
            return BTreeSet::new();
        }
        if self.is_typed_array_type(&idl_type) {
            return BTreeSet::from([format!("bindings/v8/custom/V8{}Custom.h", base)]);
        }
        // Named constructors have no header of their own
        if base.ends_with("ConstructorConstructor") {
            return BTreeSet::new();
        }
        let base = strip_suffix(base, "Constructor");
        BTreeSet::from([format!("V8{}.h", base)])
    }

    pub fn add_includes_for(&self, idl_type: &IdlType, includes: &mut IncludeSet) {
        includes.extend(self.includes_for(idl_type));
    }

    /// Expression converting `script_value` to a host value
    ///
    /// `index` is the argument position, `None` for attribute setters.
    pub fn to_host_expression(
        &self,
        idl_type: &IdlType,
        ext: &ExtendedAttributes,
        script_value: &str,
        index: Option<usize>,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        if let Some(element) = idl_type.element_type() {
            return self.array_to_host_expression(element, script_value, index, includes);
        }

        let idl_type = self.preprocess(idl_type);
        let Some(base) = idl_type.name() else {
            return Err(IdlError::unsupported(format!(
                "no script-to-host conversion for union type '{}'",
                idl_type
            )));
        };
        self.add_includes_for(&idl_type, includes);

        let arguments = if ext.contains("EnforceRange") {
            format!("{}, EnforceRange, exceptionState", script_value)
        } else if idl_type.is_integer_type() {
            format!("{}, exceptionState", script_value)
        } else {
            script_value.to_string()
        };

        let template = match to_host_template(base) {
            Some(template) => template,
            None if self.is_typed_array_type(&idl_type) => {
                "{v8_value}->Is{idl_type}() ? V8{idl_type}::toNative(v8::Handle<v8::{idl_type}>::Cast({v8_value})) : 0"
            }
            None => "V8{idl_type}::toNativeWithTypeCheck(info.GetIsolate(), {v8_value})",
        };

        Ok(fill(
            template,
            &[
                ("arguments", arguments.as_str()),
                ("idl_type", base),
                ("v8_value", script_value),
            ],
        ))
    }

    fn array_to_host_expression(
        &self,
        element: &IdlType,
        script_value: &str,
        index: Option<usize>,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        // 0 means "setter"; arguments are reported 1-based
        let index = index.map_or(0, |i| i + 1);

        if self.is_interface_type(element) && !element.is_named("Dictionary") {
            let ref_ptr = if self.is_will_be_garbage_collected(element) {
                "Member"
            } else {
                "RefPtr"
            };
            self.add_includes_for(element, includes);
            let name = element.base_type().unwrap_or_default();
            return Ok(format!(
                "(to{}NativeArray<{}, V8{}>({}, {}, info.GetIsolate()))",
                ref_ptr, name, name, script_value, index
            ));
        }

        let host = self.host_type(element, &HostTypeOptions::default())?;
        Ok(format!(
            "toNativeArray<{}>({}, {}, info.GetIsolate())",
            host, script_value, index
        ))
    }

    /// Local declaration converting `script_value` into `variable_name`
    pub fn to_local_host_value(
        &self,
        idl_type: &IdlType,
        ext: &ExtendedAttributes,
        script_value: &str,
        variable_name: &str,
        index: Option<usize>,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        let host = self.host_type(
            idl_type,
            &HostTypeOptions::argument().with_extended_attributes(ext),
        )?;
        let idl_type = self.preprocess(idl_type);
        let value = self.to_host_expression(&idl_type, ext, script_value, index, includes)?;

        Ok(if idl_type.is_named("DOMString") {
            format!(
                "V8TRYCATCH_FOR_V8STRINGRESOURCE_VOID({}, {}, {})",
                host, variable_name, value
            )
        } else if idl_type.is_integer_type() {
            format!(
                "V8TRYCATCH_EXCEPTION_VOID({}, {}, {}, exceptionState)",
                host, variable_name, value
            )
        } else {
            format!("V8TRYCATCH_VOID({}, {}, {})", host, variable_name, value)
        })
    }

    /// Type and value after the host-to-script adjustments
    ///
    /// `Promise` is returned as `ScriptValue`, 64-bit integers through
    /// `double`, and reflected unsigned values are clamped to be non-negative.
    pub fn preprocess_type_and_value(
        &self,
        idl_type: &IdlType,
        host_value: &str,
        ext: &ExtendedAttributes,
    ) -> (IdlType, String) {
        let mut idl_type = self.preprocess(idl_type);
        let mut value = host_value.to_string();

        if idl_type.is_named("Promise") {
            idl_type = IdlType::named("ScriptValue");
        }
        if idl_type.is_named("long long") || idl_type.is_named("unsigned long long") {
            idl_type = IdlType::named("double").with_nullable(idl_type.nullable);
            value = format!("static_cast<double>({})", value);
        }
        if ext.contains("Reflect")
            && (idl_type.is_named("unsigned long") || idl_type.is_named("unsigned short"))
        {
            value = value.replace("getUnsignedIntegralAttribute", "getIntegralAttribute");
            value = format!("std::max(0, {})", value);
        }
        (idl_type, value)
    }

    /// Conversion class used to pick a host-to-script function
    pub fn conversion_type(
        &self,
        idl_type: &IdlType,
        ext: &ExtendedAttributes,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        if let Some(element) = idl_type.element_type() {
            if self.is_interface_type(element) {
                self.add_includes_for(element, includes);
            }
            return Ok("array".to_string());
        }

        let Some(base) = idl_type.name() else {
            return Err(IdlError::unsupported(format!(
                "union type '{}' has no single conversion",
                idl_type
            )));
        };

        if CPP_INT_TYPES.contains(&base) {
            return Ok("int".to_string());
        }
        if CPP_UNSIGNED_TYPES.contains(&base) {
            return Ok("unsigned".to_string());
        }
        if base == "DOMString" {
            return match ext.get("TreatReturnedNullStringAs") {
                None => Ok("DOMString".to_string()),
                Some(value) => match value.as_str() {
                    Some("Null") => Ok("StringOrNull".to_string()),
                    Some("Undefined") => Ok("StringOrUndefined".to_string()),
                    other => Err(IdlError::unrecognized_value(
                        "TreatReturnedNullStringAs",
                        other.unwrap_or_default(),
                    )),
                },
            };
        }
        if base == "unrestricted float" {
            return Ok("float".to_string());
        }
        if base == "unrestricted double" {
            return Ok("double".to_string());
        }
        if idl_type.is_basic_type() || base == "ScriptValue" {
            return Ok(base.to_string());
        }

        self.add_includes_for(idl_type, includes);
        if set_return_template(base).is_some() {
            return Ok(base.to_string());
        }
        Ok("DOMWrapper".to_string())
    }

    /// Expression converting `host_value` to a script value
    pub fn to_script_expression(
        &self,
        idl_type: &IdlType,
        host_value: &str,
        ext: &ExtendedAttributes,
        isolate: &str,
        creation_context: &str,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        let (idl_type, value) = self.preprocess_type_and_value(idl_type, host_value, ext);
        let conversion = self.conversion_type(&idl_type, ext, includes)?;
        script_expression(&conversion, &value, isolate, creation_context)
    }

    /// Statement(s) setting `host_value` as the return value
    pub fn set_return_value(
        &self,
        idl_type: &IdlType,
        host_value: &str,
        ext: &ExtendedAttributes,
        options: &ReturnValueOptions<'_>,
        includes: &mut IncludeSet,
    ) -> IdlResult<SetReturnValue> {
        if idl_type.is_union_type() {
            return idl_type
                .member_types()
                .iter()
                .enumerate()
                .map(|(i, member)| {
                    self.single_set_return_value(
                        member,
                        &format!("{}{}", host_value, i),
                        ext,
                        options,
                        options.release.member(i),
                        includes,
                    )
                })
                .collect::<IdlResult<Vec<_>>>()
                .map(SetReturnValue::PerMember);
        }

        let release = options.release == Release::Always;
        self.single_set_return_value(idl_type, host_value, ext, options, release, includes)
            .map(SetReturnValue::Single)
    }

    fn single_set_return_value(
        &self,
        idl_type: &IdlType,
        host_value: &str,
        ext: &ExtendedAttributes,
        options: &ReturnValueOptions<'_>,
        release: bool,
        includes: &mut IncludeSet,
    ) -> IdlResult<String> {
        let (idl_type, mut value) = self.preprocess_type_and_value(idl_type, host_value, ext);
        let mut conversion = self.conversion_type(&idl_type, ext, includes)?;

        if CONVERTED_BEFORE_RETURN.contains(&conversion.as_str()) {
            value = script_expression(&conversion, &value, "info.GetIsolate()", "")?;
        }
        if conversion == "DOMWrapper" {
            conversion = if options.script_wrappable.is_empty() {
                "DOMWrapperDefault"
            } else if options.for_main_world {
                "DOMWrapperForMainWorld"
            } else {
                "DOMWrapperFast"
            }
            .to_string();
        }

        let template = set_return_template(&conversion).ok_or_else(|| {
            IdlError::unsupported(format!("no return value conversion for '{}'", conversion))
        })?;
        if release {
            value = format!("{}.release()", value);
        }
        Ok(fill(
            template,
            &[
                ("cpp_value", value.as_str()),
                ("script_wrappable", options.script_wrappable),
            ],
        ))
    }
}

fn script_expression(conversion: &str, value: &str, isolate: &str, creation_context: &str) -> IdlResult<String> {
    let template = to_script_template(conversion).ok_or_else(|| {
        IdlError::unsupported(format!("no host-to-script conversion for '{}'", conversion))
    })?;
    Ok(fill(
        template,
        &[
            ("cpp_value", value),
            ("isolate", isolate),
            ("creation_context", creation_context),
        ],
    ))
}

/// `V8StringResource` mode from `[TreatNullAs]` / `[TreatUndefinedAs]`
fn string_mode(ext: Option<&ExtendedAttributes>) -> IdlResult<&'static str> {
    let Some(ext) = ext else {
        return Ok("");
    };
    match ext.value("TreatNullAs") {
        None => return Ok(""),
        Some("NullString") => {}
        Some(other) => return Err(IdlError::unrecognized_value("TreatNullAs", other)),
    }
    match ext.value("TreatUndefinedAs") {
        None => Ok("WithNullCheck"),
        Some("NullString") => Ok("WithUndefinedOrNullCheck"),
        Some(other) => Err(IdlError::unrecognized_value("TreatUndefinedAs", other)),
    }
}
