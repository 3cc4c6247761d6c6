//! Callback interface content generator

use crate::codegen::includes::{CALLBACK_INTERFACE_CPP_INCLUDES, CALLBACK_INTERFACE_H_INCLUDES};
use crate::codegen::types::{HostTypeOptions, TypeMapper};
use crate::codegen::utilities::{conditional_string, v8_class_name};
use crate::codegen::{BindingContext, IncludeSet};
use crate::error::{IdlError, IdlResult};
use crate::ir::{IdlArgument, IdlOperation, IdlType, InterfaceDefinition, InterfaceMembers};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct CallbackArgumentContent {
    pub name: String,
    pub handle: String,
    pub cpp_value_to_v8_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackMethodContent {
    pub argument_declarations: Vec<String>,
    pub arguments: Vec<CallbackArgumentContent>,
    pub call_with_this_handle: bool,
    pub cpp_type: String,
    pub custom: bool,
    pub idl_type: String,
    pub name: String,
}

/// Complete template context for one callback interface
#[derive(Debug, Clone, Serialize)]
pub struct CallbackInterfaceContent {
    pub conditional_string: Option<String>,
    pub cpp_class: String,
    pub cpp_includes: Vec<String>,
    pub header_includes: Vec<String>,
    pub methods: Vec<CallbackMethodContent>,
    pub v8_class: String,
}

pub struct CallbackInterfaceGenerator<'a> {
    mapper: TypeMapper<'a>,
}

impl<'a> CallbackInterfaceGenerator<'a> {
    pub fn new(context: &'a BindingContext) -> Self {
        Self {
            mapper: TypeMapper::new(context),
        }
    }

    pub fn generate(&self, interface: &InterfaceDefinition) -> IdlResult<CallbackInterfaceContent> {
        let name = interface.name();
        let ext = interface.extended_attributes();
        let mut includes = IncludeSet::from_static(CALLBACK_INTERFACE_CPP_INCLUDES);

        let methods = interface
            .operations()
            .iter()
            .map(|operation| self.generate_method(operation, &mut includes))
            .collect::<IdlResult<Vec<_>>>()?;

        debug!(interface = %name, methods = methods.len(), "idl.generate.callback");
        Ok(CallbackInterfaceContent {
            conditional_string: conditional_string(ext),
            cpp_class: name.to_string(),
            cpp_includes: includes.into_sorted_vec(),
            header_includes: IncludeSet::from_static(CALLBACK_INTERFACE_H_INCLUDES).into_sorted_vec(),
            methods,
            v8_class: v8_class_name(name),
        })
    }

    fn generate_method(&self, operation: &IdlOperation, includes: &mut IncludeSet) -> IdlResult<CallbackMethodContent> {
        let ext = &operation.extended_attributes;
        let idl_type = operation.idl_type.clone().unwrap_or_else(|| IdlType::named("void"));
        let idl_type_name = idl_type.to_string();
        if idl_type_name != "boolean" && idl_type_name != "void" {
            return Err(IdlError::unsupported(format!(
                "callback operation '{}' returns '{}'; only boolean or void are allowed",
                operation.name, idl_type_name
            )));
        }

        let custom = ext.contains("Custom");
        if !custom {
            self.mapper.add_includes_for(&idl_type, includes);
            for argument in &operation.arguments {
                self.mapper.add_includes_for(&argument.idl_type, includes);
            }
        }

        let call_with_this_handle = ext.has_value("CallWith", "ThisValue");
        let mut argument_declarations = Vec::new();
        if call_with_this_handle {
            argument_declarations.push("ScriptValue thisValue".to_string());
        }
        for argument in &operation.arguments {
            argument_declarations.push(format!("{} {}", self.argument_type(&argument.idl_type)?, argument.name));
        }

        let arguments = operation
            .arguments
            .iter()
            .map(|argument| self.generate_argument(argument, includes))
            .collect::<IdlResult<Vec<_>>>()?;

        Ok(CallbackMethodContent {
            argument_declarations,
            arguments,
            call_with_this_handle,
            cpp_type: self.mapper.host_type(&idl_type, &HostTypeOptions::default())?.to_string(),
            custom,
            idl_type: idl_type_name,
            name: operation.name.clone(),
        })
    }

    fn generate_argument(&self, argument: &IdlArgument, includes: &mut IncludeSet) -> IdlResult<CallbackArgumentContent> {
        Ok(CallbackArgumentContent {
            name: argument.name.clone(),
            handle: format!("{}Handle", argument.name),
            cpp_value_to_v8_value: self.mapper.to_script_expression(
                &argument.idl_type,
                &argument.name,
                &argument.extended_attributes,
                "isolate",
                "v8::Handle<v8::Object>()",
                includes,
            )?,
        })
    }

    /// Callbacks receive raw pointers; strings and vectors by const reference
    fn argument_type(&self, idl_type: &IdlType) -> IdlResult<String> {
        if idl_type.type_name() == "String" {
            return Ok("const String&".to_string());
        }
        if idl_type.is_named("void") {
            return Ok("void".to_string());
        }
        let host = self.mapper.host_type(idl_type, &HostTypeOptions::argument())?.to_string();
        if ["Vector", "HeapVector", "WillBeHeapVector"]
            .iter()
            .any(|prefix| host.starts_with(prefix))
        {
            return Ok(format!("const {}&", host));
        }
        Ok(host)
    }
}
