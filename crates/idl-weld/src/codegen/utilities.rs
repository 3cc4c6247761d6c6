//! Helpers shared by the member generators
//!
//! Mostly thin readers over extended attributes that turn a trait into the
//! identifier or flag a binding template expects.

use crate::codegen::{BindingContext, IncludeSet};
use crate::error::{IdlError, IdlResult};
use crate::ir::{ExtendedAttributes, IdlType};

/// `[CallWith]` values and the host argument each one passes, in call order
const CALL_WITH_VALUES: &[(&str, &str)] = &[
    ("ScriptState", "state"),
    ("ExecutionContext", "scriptContext"),
    ("ScriptArguments", "scriptArguments.release()"),
    ("ActiveWindow", "callingDOMWindow(info.GetIsolate())"),
    ("FirstWindow", "enteredDOMWindow(info.GetIsolate())"),
];

/// Host arguments contributed by a call-with trait (`CallWith`, `SetterCallWith`)
pub fn call_with_arguments(ext: &ExtendedAttributes, attribute_name: &str) -> IdlResult<Vec<String>> {
    let values = ext.values(attribute_name);
    if let Some(unknown) = values
        .iter()
        .find(|v| !CALL_WITH_VALUES.iter().any(|(name, _)| name == *v))
    {
        return Err(IdlError::unrecognized_value(attribute_name, *unknown));
    }
    Ok(CALL_WITH_VALUES
        .iter()
        .filter(|(name, _)| values.contains(name))
        .map(|(_, argument)| argument.to_string())
        .collect())
}

/// `ENABLE(A) && ENABLE(B)` from `[Conditional=A&B]`, conditions sorted
pub fn conditional_string(ext: &ExtendedAttributes) -> Option<String> {
    let conditional = ext.value("Conditional")?;
    for operator in ['&', '|'] {
        if conditional.contains(operator) {
            let mut conditions: Vec<&str> = conditional.split(operator).map(str::trim).collect();
            conditions.sort_unstable();
            let separator = format!(" {0}{0} ", operator);
            return Some(
                conditions
                    .iter()
                    .map(|c| format!("ENABLE({})", c))
                    .collect::<Vec<_>>()
                    .join(&separator),
            );
        }
    }
    Some(format!("ENABLE({})", conditional))
}

/// `[ImplementedAs]` or the declared name
pub fn cpp_name<'a>(name: &'a str, ext: &'a ExtendedAttributes) -> &'a str {
    ext.value("ImplementedAs").unwrap_or(name)
}

/// Receiver-qualified name of a member: `ImplementedBy::name`,
/// `Class::name` for statics, `imp->name` otherwise
pub fn scoped_name(interface_cpp_name: &str, is_static: bool, ext: &ExtendedAttributes, base_name: &str) -> String {
    if let Some(implemented_by) = ext.value("ImplementedBy") {
        format!("{}::{}", implemented_by, base_name)
    } else if is_static {
        format!("{}::{}", interface_cpp_name, base_name)
    } else {
        format!("imp->{}", base_name)
    }
}

/// World suffixes that log activity for an access kind (`Getter`, `Setter`)
pub fn activity_logging_world_list(
    ext: &ExtendedAttributes,
    access: Option<&str>,
    includes: &mut IncludeSet,
) -> Vec<String> {
    let Some(logging) = ext.value("ActivityLogging") else {
        return Vec::new();
    };
    let has_logging = logging.starts_with("For") || access.is_some_and(|a| logging.starts_with(a));
    if !has_logging {
        return Vec::new();
    }
    includes.add("bindings/v8/V8DOMActivityLogger.h");
    if logging.ends_with("ForIsolatedWorlds") {
        vec![String::new()]
    } else {
        vec![String::new(), "ForMainWorld".to_string()]
    }
}

/// `['', 'ForMainWorld']` under `[PerWorldBindings]`
pub fn world_suffixes(ext: &ExtendedAttributes) -> Vec<String> {
    if ext.contains("PerWorldBindings") {
        vec![String::new(), "ForMainWorld".to_string()]
    } else {
        vec![String::new()]
    }
}

pub fn runtime_enabled_function_name(ext: &ExtendedAttributes) -> Option<String> {
    ext.value("RuntimeEnabled")
        .map(|feature| format!("RuntimeEnabledFeatures::{}Enabled", uncapitalize(feature)))
}

pub fn per_context_enabled_function_name(ext: &ExtendedAttributes) -> Option<String> {
    ext.value("PerContextEnabled")
        .map(|feature| format!("ContextFeatures::{}Enabled", uncapitalize(feature)))
}

/// `string == "a" || string == "b"` for enum-typed values
pub fn enum_validation_expression(context: &BindingContext, idl_type: &IdlType) -> Option<String> {
    let values = context.enum_values(idl_type.name()?)?;
    Some(
        values
            .iter()
            .map(|v| format!("string == \"{}\"", v))
            .collect::<Vec<_>>()
            .join(" || "),
    )
}

pub fn deprecate_as(ext: &ExtendedAttributes, includes: &mut IncludeSet) -> Option<String> {
    use_counter_value(ext, "DeprecateAs", includes)
}

pub fn measure_as(ext: &ExtendedAttributes, includes: &mut IncludeSet) -> Option<String> {
    use_counter_value(ext, "MeasureAs", includes)
}

fn use_counter_value(ext: &ExtendedAttributes, name: &str, includes: &mut IncludeSet) -> Option<String> {
    let value = ext.value(name)?;
    includes.add("core/frame/UseCounter.h");
    Some(value.to_string())
}

pub fn v8_class_name(name: &str) -> String {
    format!("V8{}", name)
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_call_with_order() {
        let ext = ExtendedAttributes::new().with_value("CallWith", "ScriptArguments&ScriptState");
        assert_eq!(
            call_with_arguments(&ext, "CallWith").unwrap(),
            vec!["state", "scriptArguments.release()"]
        );
        assert!(call_with_arguments(&ext, "SetterCallWith").unwrap().is_empty());
    }

    #[test]
    fn test_call_with_unknown() {
        let ext = ExtendedAttributes::new().with_value("CallWith", "Nonsense");
        match call_with_arguments(&ext, "CallWith") {
            Err(IdlError::UnrecognizedTraitValue { name, value }) => {
                assert_eq!(name, "CallWith");
                assert_eq!(value, "Nonsense");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_conditional_string() {
        let single = ExtendedAttributes::new().with_value("Conditional", "SVG");
        assert_eq!(conditional_string(&single).as_deref(), Some("ENABLE(SVG)"));

        let any = ExtendedAttributes::new().with_value("Conditional", "WEB_AUDIO|MEDIA");
        assert_eq!(
            conditional_string(&any).as_deref(),
            Some("ENABLE(MEDIA) || ENABLE(WEB_AUDIO)")
        );
        assert_eq!(conditional_string(&ExtendedAttributes::new()), None);
    }

    #[test]
    fn test_scoped_name() {
        let none = ExtendedAttributes::new();
        let by = ExtendedAttributes::new().with_value("ImplementedBy", "Helper");
        assert_eq!(scoped_name("Foo", false, &none, "bar"), "imp->bar");
        assert_eq!(scoped_name("Foo", true, &none, "bar"), "Foo::bar");
        assert_eq!(scoped_name("Foo", false, &by, "bar"), "Helper::bar");
    }

    #[test]
    fn test_activity_logging() {
        let mut includes = IncludeSet::new();
        let getter_only = ExtendedAttributes::new().with_value("ActivityLogging", "GetterForIsolatedWorlds");
        assert_eq!(
            activity_logging_world_list(&getter_only, Some("Getter"), &mut includes),
            vec![""]
        );
        assert!(activity_logging_world_list(&getter_only, Some("Setter"), &mut includes).is_empty());

        let all = ExtendedAttributes::new().with_value("ActivityLogging", "ForAllWorlds");
        assert_eq!(
            activity_logging_world_list(&all, None, &mut includes),
            vec!["", "ForMainWorld"]
        );
        assert!(includes.contains("bindings/v8/V8DOMActivityLogger.h"));
    }

    #[test]
    fn test_feature_names() {
        let ext = ExtendedAttributes::new()
            .with_value("RuntimeEnabled", "WebAnimations")
            .with_value("PerContextEnabled", "Touch");
        assert_eq!(
            runtime_enabled_function_name(&ext).as_deref(),
            Some("RuntimeEnabledFeatures::webAnimationsEnabled")
        );
        assert_eq!(
            per_context_enabled_function_name(&ext).as_deref(),
            Some("ContextFeatures::touchEnabled")
        );
    }

    #[test]
    fn test_enum_validation() {
        let context = BindingContext::new().with_enum("Mode", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            enum_validation_expression(&context, &IdlType::named("Mode")).as_deref(),
            Some("string == \"a\" || string == \"b\"")
        );
        assert_eq!(enum_validation_expression(&context, &IdlType::named("long")), None);
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(capitalize("href"), "Href");
        assert_eq!(uncapitalize("URL"), "uRL");
        assert_eq!(strip_suffix("NodeConstructor", "Constructor"), "Node");
    }
}
