//! The `RegisterVirtualOverrides(context)` body of engine classes.
//!
//! Registration chains to the base class first, so the most-base
//! registrations always run before the derived ones.

use gdmarshal_writer::IndentedWriter;

use super::{BodyError, BodyOutline, MethodBody, Parameter, Phase, Signature};
use crate::registry::TypeDb;
use crate::types::{known, TypeDescriptor};

/// A virtual method the class lets user code override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualOverride {
    pub method_name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeDescriptor>,
}

impl VirtualOverride {
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returning(mut self, ty: TypeDescriptor) -> Self {
        self.return_type = (!ty.is_void()).then_some(ty);
        self
    }
}

/// Binds every virtual override of `class` to its managed implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterVirtualOverrides {
    class: TypeDescriptor,
    overrides: Vec<VirtualOverride>,
}

impl RegisterVirtualOverrides {
    pub fn new(class: TypeDescriptor, overrides: Vec<VirtualOverride>) -> Self {
        Self { class, overrides }
    }

    fn write_override(&self, method: &VirtualOverride, writer: &mut IndentedWriter) {
        // Pointers can't be lambda parameter types of the binding delegate.
        let int_ptr = known::int_ptr().full_name_with_global();

        let mut lambda = vec![format!("{} __instance", self.class.full_name_with_global())];
        let mut arguments = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            let name = parameter.escaped_name();
            let ty = parameter.ty();
            if ty.is_pointer() {
                lambda.push(format!("{int_ptr} {name}"));
                arguments.push(format!("({}){name}", ty.full_name_with_global()));
            } else {
                lambda.push(format!("{} {name}", ty.full_name_with_global()));
                arguments.push(name);
            }
        }

        writer.write_line(&format!(
            "context.BindVirtualMethodOverride(MethodName.{}, static ({}) =>",
            method.method_name,
            lambda.join(", ")
        ));
        writer.open_block();
        let prefix = match &method.return_type {
            Some(ty) if ty.is_pointer() => format!("return ({int_ptr})"),
            Some(_) => "return ".to_string(),
            None => String::new(),
        };
        writer.write_line(&format!(
            "{prefix}__instance.{}({});",
            method.method_name,
            arguments.join(", ")
        ));
        writer.close_block_with(");");
    }
}

impl MethodBody for RegisterVirtualOverrides {
    fn write(&self, _: &TypeDb, _: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        if let Some(base) = self.class.base() {
            writer.write_line(&format!("{}.RegisterVirtualOverrides(context);", base.full_name_with_global()));
        }
        for method in &self.overrides {
            self.write_override(method, writer);
        }
        Ok(BodyOutline {
            phases: vec![Phase::Invoke],
            ..BodyOutline::default()
        })
    }
}
