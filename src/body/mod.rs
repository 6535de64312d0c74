//! Call-body synthesis.
//!
//! A call body moves the managed arguments of a generated method into the
//! engine's calling convention, performs the call and moves the result back.
//! Every body follows the same five-phase skeleton:
//!
//! 1. **Setup** - instance pointer, cached target lookup, auxiliary locals
//! 2. **MarshalIn** - managed arguments into native argument slots
//! 3. **Invoke** - the native call itself
//! 4. **MarshalOut** - native return value back into a managed local
//! 5. **Cleanup** - release what MarshalIn allocated
//!
//! MarshalIn through MarshalOut are wrapped in `try`/`finally` only when at
//! least one participating marshaller needs cleanup.
//!
//! # Module Organization
//!
//! - [`ptrcall`] - fixed-arity pointer convention ([`PtrCallStrategy`])
//! - [`vararg`] - variadic variant convention ([`VarargCallStrategy`], [`VarargLayout`])
//! - [`builtin`] - built-in class constructors, destructors, methods and operators
//! - [`method_bind`] - engine class method binds
//! - [`utility`] - global utility functions
//! - [`variant_conversion`] - `NativeGodotVariant` conversion helpers
//! - [`virtual_overrides`] - virtual method override registration
//!
//! # Example
//!
//! ```ignore
//! let signature = Signature::new("GetName").returning(known::string_name());
//! let body = MethodBind::new(2002593661);
//! let mut writer = IndentedWriter::new();
//! let outline = body.write(&db, &signature, &mut writer)?;
//! assert!(outline.guarded);
//! ```

pub mod builtin;
pub mod method_bind;
pub mod ptrcall;
pub mod utility;
pub mod vararg;
pub mod variant_conversion;
pub mod virtual_overrides;

pub use builtin::{
    BuiltInConstructor, BuiltInDestructor, BuiltInMethod, BuiltInMethodTarget, BuiltInMethodVararg, BuiltInOperator,
};
pub use method_bind::{MethodBind, MethodBindVararg};
pub use ptrcall::{write_ptrcall_body, PtrCallStrategy};
pub use utility::UtilityFunction;
pub use vararg::{write_vararg_body, ArgumentSlot, VarargBuffer, VarargCallStrategy, VarargLayout, VARARG_SPAN_THRESHOLD};
pub use variant_conversion::{ConvertToVariantCopying, ConvertToVariantTakingOwnership, CreateVariantCopying};
pub use virtual_overrides::{RegisterVirtualOverrides, VirtualOverride};

use gdmarshal_writer::IndentedWriter;
use thiserror::Error;

use crate::defaults::DefaultValueError;
use crate::logging::{debug, trace};
use crate::marshal::MarshalError;
use crate::registry::{ResolveError, TypeDb};
use crate::types::TypeDescriptor;

/// Local holding the native argument array.
pub const ARGS_VARIABLE: &str = "__args";
/// Local holding the argument count of a vararg call.
pub const ARGS_COUNT_VARIABLE: &str = "__argsCount";
/// Local holding the native instance pointer.
pub const INSTANCE_VARIABLE: &str = "__instance";
/// Default name of the managed return local.
pub const RETURN_VARIABLE: &str = "__ret";

/// Errors raised while synthesizing a body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    DefaultValue(#[from] DefaultValueError),

    #[error("Method '{method}' has an invalid signature: {reason}")]
    InvalidSignature { method: String, reason: String },

    #[error("Vararg method '{0}' must declare the variadic parameter last.")]
    MissingVarargParameter(String),

    #[error("Method '{0}' is not static but its call strategy can't pass an instance.")]
    InstanceUnsupported(String),
}

impl BodyError {
    pub(crate) fn invalid_signature(method: &str, reason: impl Into<String>) -> Self {
        BodyError::InvalidSignature {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

/// A parameter of a generated method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    ty: TypeDescriptor,
    engine_default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            engine_default: None,
        }
    }

    /// Attach the engine's default value literal.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.engine_default = Some(literal.into());
        self
    }

    /// The unescaped parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The engine's default value literal, if the engine declares one.
    pub fn engine_default(&self) -> Option<&str> {
        self.engine_default.as_deref()
    }

    pub(crate) fn escaped_name(&self) -> String {
        gdmarshal_writer::escape_identifier(&self.name)
    }
}

/// The managed method a body is written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    parameters: Vec<Parameter>,
    return_type: Option<TypeDescriptor>,
    is_static: bool,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            is_static: false,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Set the return type. `void` means no return value.
    pub fn returning(mut self, ty: TypeDescriptor) -> Self {
        self.return_type = (!ty.is_void()).then_some(ty);
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<&TypeDescriptor> {
        self.return_type.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

/// What a call strategy hands to its convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub method_name: String,
    pub is_static: bool,
    /// Parameters that travel in the argument array, in order.
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeDescriptor>,
    pub return_variable: String,
    /// Vararg only: marshal the return value with its pointer marshaller.
    pub marshal_return_as_ptr: bool,
}

impl CallContext {
    /// A context passing every parameter of `signature`.
    pub fn from_signature(signature: &Signature) -> Self {
        Self {
            method_name: signature.name.clone(),
            is_static: signature.is_static,
            parameters: signature.parameters.clone(),
            return_type: signature.return_type.clone(),
            return_variable: RETURN_VARIABLE.to_string(),
            marshal_return_as_ptr: false,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_return_variable(mut self, name: &str) -> Self {
        self.return_variable = name.to_string();
        self
    }

    pub fn with_return_as_ptr(mut self) -> Self {
        self.marshal_return_as_ptr = true;
        self
    }

    /// `__args` when there are parameters, `null` otherwise.
    pub(crate) fn args_or_null(&self) -> &str {
        if self.parameters.is_empty() { "null" } else { ARGS_VARIABLE }
    }

    /// `__instance` for instance calls, `null` for static ones.
    pub(crate) fn instance_or_null(&self) -> &str {
        if self.is_static { "null" } else { INSTANCE_VARIABLE }
    }

    /// `{ret}Ptr` when there is a return value, `null` otherwise.
    pub(crate) fn return_ptr_or_null(&self) -> String {
        match self.return_type {
            Some(_) => format!("{}Ptr", self.return_variable),
            None => "null".to_string(),
        }
    }
}

/// The skeleton phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    MarshalIn,
    Invoke,
    MarshalOut,
    Cleanup,
}

/// Summary of a synthesized body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyOutline {
    /// Phases emitted, in order.
    pub phases: Vec<Phase>,
    /// Whether MarshalIn..MarshalOut is wrapped in `try`/`finally`.
    pub guarded: bool,
    /// Values released in the cleanup region: parameter names and the return local.
    pub freed: Vec<String>,
}

impl BodyOutline {
    pub fn has_phase(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }
}

/// A generated method body.
pub trait MethodBody {
    /// Whether the body must be emitted in an `unsafe` context.
    fn requires_unsafe_code(&self) -> bool {
        true
    }

    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError>;
}

/// The per-phase writers of one calling convention.
pub(crate) trait CallPhases {
    fn method_name(&self) -> &str;
    fn needs_cleanup(&self) -> bool;
    /// The managed return local, if the method returns a value.
    fn return_variable(&self) -> Option<&str>;
    fn setup(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError>;
    fn marshal(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError>;
    fn invoke(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError>;
    fn unmarshal(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError>;
    /// Returns the names of the values freed.
    fn cleanup(&mut self, writer: &mut IndentedWriter) -> Result<Vec<String>, BodyError>;
    fn end(&mut self, _writer: &mut IndentedWriter) -> Result<(), BodyError> {
        Ok(())
    }
}

/// Emit the five-phase skeleton around `phases`.
pub(crate) fn write_call_body(phases: &mut impl CallPhases, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
    let guarded = phases.needs_cleanup();
    let mut outline = BodyOutline {
        guarded,
        ..BodyOutline::default()
    };

    writer.write_line("// Setup - Perform required setup.");
    phases.setup(writer)?;
    writer.write_blank_line();
    outline.phases.push(Phase::Setup);

    if guarded {
        writer.write_line("try");
        writer.open_block();
    }

    writer.write_line("// Marshalling - Convert managed data to native data.");
    phases.marshal(writer)?;
    writer.write_blank_line();
    outline.phases.push(Phase::MarshalIn);

    writer.write_line("// Calling the method.");
    phases.invoke(writer)?;
    outline.phases.push(Phase::Invoke);

    if let Some(ret) = phases.return_variable().map(str::to_string) {
        writer.write_blank_line();
        writer.write_line("// Unmarshalling - Convert native data to managed data.");
        phases.unmarshal(writer)?;
        writer.write_line(&format!("return {ret};"));
        outline.phases.push(Phase::MarshalOut);
    }

    if guarded {
        writer.close_block();
        writer.write_line("finally");
        writer.open_block();
        writer.write_line("// Cleanup allocated resources.");
        outline.freed = phases.cleanup(writer)?;
        writer.close_block();
        outline.phases.push(Phase::Cleanup);
    }

    phases.end(writer)?;

    trace!(method = phases.method_name(), freed = outline.freed.len(), "call body written");
    debug!(method = phases.method_name(), guarded = outline.guarded, "synthesized call body");
    Ok(outline)
}
