//! The vararg convention: arguments travel as `NativeGodotVariant*` in an
//! array holding the fixed arguments followed by the variadic ones.
//!
//! The trailing managed parameter is the variadic collection. Its elements
//! are moved into a span that lives on the stack while the whole call fits
//! in [`VARARG_SPAN_THRESHOLD`] slots, and on the heap otherwise.

use std::rc::Rc;

use gdmarshal_writer::IndentedWriter;

use super::{
    write_call_body, BodyError, BodyOutline, CallContext, CallPhases, Parameter, Signature, ARGS_COUNT_VARIABLE,
    ARGS_VARIABLE,
};
use crate::marshal::{PtrMarshaller, VariantMarshaller};
use crate::registry::TypeDb;
use crate::types::{known, TypeDescriptor};

/// Largest argument count served by stack-allocated spans.
pub const VARARG_SPAN_THRESHOLD: usize = 10;

const NATIVE_VARIANT: &str = "global::Godot.NativeInterop.NativeGodotVariant";
const MOVABLE: &str = "global::Godot.NativeInterop.NativeGodotVariant.Movable";

/// Where the argument pointers of a vararg call are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarargBuffer {
    /// A `stackalloc` span of fixed capacity.
    Inline { capacity: usize },
    /// A heap array of exactly `len` slots.
    Heap { len: usize },
}

/// One entry of the native argument array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSlot {
    /// The i-th fixed parameter.
    Fixed(usize),
    /// The i-th element of the variadic collection.
    Variadic(usize),
}

/// Argument counts of one vararg call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarargLayout {
    pub fixed: usize,
    pub variadic: usize,
}

impl VarargLayout {
    pub fn new(fixed: usize, variadic: usize) -> Self {
        Self { fixed, variadic }
    }

    pub fn total(&self) -> usize {
        self.fixed + self.variadic
    }

    /// The buffer the generated code selects for this call.
    pub fn buffer(&self) -> VarargBuffer {
        let total = self.total();
        if total <= VARARG_SPAN_THRESHOLD {
            VarargBuffer::Inline {
                capacity: VARARG_SPAN_THRESHOLD,
            }
        } else {
            VarargBuffer::Heap { len: total }
        }
    }

    /// Slots in argument order: fixed parameters first, then the variadic
    /// elements in their original order.
    pub fn slots(&self) -> Vec<ArgumentSlot> {
        (0..self.fixed)
            .map(ArgumentSlot::Fixed)
            .chain((0..self.variadic).map(ArgumentSlot::Variadic))
            .collect()
    }
}

/// The parts of a vararg body that differ per call target.
pub trait VarargCallStrategy {
    /// Decide the parameters (the last one is the variadic collection), the
    /// return local and staticness.
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError>;

    fn setup_instance(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        let _ = writer;
        Err(BodyError::InstanceUnsupported(context.method_name.clone()))
    }

    fn retrieve(&self, context: &CallContext, db: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError>;

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError>;
}

/// The slot the native call writes a variant-marshalled return into:
/// `&__ret` for `NativeGodotVariant` returns, `&__retVar` otherwise, or `null`.
pub(crate) fn variant_return_slot(context: &CallContext) -> String {
    match &context.return_type {
        Some(ty) if *ty == known::native_godot_variant() => format!("&{}", context.return_variable),
        Some(_) => format!("&{}Var", context.return_variable),
        None => "null".to_string(),
    }
}

/// Write a complete vararg body for `signature` using `strategy`.
pub fn write_vararg_body<S>(
    strategy: &S,
    db: &TypeDb,
    signature: &Signature,
    writer: &mut IndentedWriter,
) -> Result<BodyOutline, BodyError>
where
    S: VarargCallStrategy + ?Sized,
{
    let context = strategy.context(signature)?;
    let mut body = VarargBody::new(strategy, db, context)?;
    write_call_body(&mut body, writer)
}

struct FixedParameter {
    parameter: Parameter,
    marshaller: Rc<dyn VariantMarshaller>,
    aux: Option<String>,
}

enum ReturnMarshaller {
    Ptr(Rc<dyn PtrMarshaller>),
    Variant(Rc<dyn VariantMarshaller>),
}

impl ReturnMarshaller {
    fn needs_cleanup(&self) -> bool {
        match self {
            ReturnMarshaller::Ptr(m) => m.needs_cleanup(),
            ReturnMarshaller::Variant(m) => m.needs_cleanup(),
        }
    }
}

struct VarargReturn {
    ty: TypeDescriptor,
    marshaller: ReturnMarshaller,
    aux: Option<String>,
}

struct VarargBody<'a, S: ?Sized> {
    strategy: &'a S,
    db: &'a TypeDb,
    context: CallContext,
    fixed: Vec<FixedParameter>,
    variadic: Parameter,
    ret: Option<VarargReturn>,
}

impl<'a, S: VarargCallStrategy + ?Sized> VarargBody<'a, S> {
    fn new(strategy: &'a S, db: &'a TypeDb, context: CallContext) -> Result<Self, BodyError> {
        let Some((variadic, fixed)) = context.parameters.split_last() else {
            return Err(BodyError::MissingVarargParameter(context.method_name.clone()));
        };
        let fixed = fixed
            .iter()
            .map(|parameter| {
                Ok(FixedParameter {
                    marshaller: db.variant_marshaller(parameter.ty())?,
                    parameter: parameter.clone(),
                    aux: None,
                })
            })
            .collect::<Result<Vec<_>, BodyError>>()?;
        let variadic = variadic.clone();

        let ret = match &context.return_type {
            Some(ty) => {
                let marshaller = if context.marshal_return_as_ptr {
                    ReturnMarshaller::Ptr(db.ptr_marshaller(ty)?)
                } else {
                    ReturnMarshaller::Variant(db.variant_marshaller(ty)?)
                };
                Some(VarargReturn {
                    ty: ty.clone(),
                    marshaller,
                    aux: None,
                })
            }
            None => None,
        };

        Ok(Self {
            strategy,
            db,
            context,
            fixed,
            variadic,
            ret,
        })
    }

    fn write_spans(&self, writer: &mut IndentedWriter) {
        let raw = self.variadic.name();
        let v = self.variadic.escaped_name();
        let fixed = self.fixed.len();

        writer.write_line("// Setup - Prepare arguments and varargs.");
        writer.write_line(&format!("int {ARGS_COUNT_VARIABLE} = {fixed} + {v}.Length;"));
        writer.write_line(&format!("const int VarArgsSpanThreshold = {VARARG_SPAN_THRESHOLD};"));
        writer.write_line(&format!(
            "scoped global::System.Span<{MOVABLE}> {raw}MovableSpan = {v}.Length <= VarArgsSpanThreshold"
        ));
        writer.indented(|w| {
            w.write_line(&format!("? stackalloc {MOVABLE}[VarArgsSpanThreshold]"));
            w.write_line(&format!(": new {MOVABLE}[{v}.Length];"));
        });
        writer.write_line(&format!(
            "scoped global::System.Span<nint> {raw}PtrSpan = {ARGS_COUNT_VARIABLE} <= VarArgsSpanThreshold"
        ));
        writer.indented(|w| {
            w.write_line("? stackalloc nint[VarArgsSpanThreshold]");
            w.write_line(&format!(": new nint[{ARGS_COUNT_VARIABLE}];"));
        });
        writer.write_line(&format!(
            "fixed ({MOVABLE}* {raw}MovablePtr = &global::System.Runtime.InteropServices.MemoryMarshal.GetReference({raw}MovableSpan))"
        ));
        writer.write_line(&format!(
            "fixed (nint* {raw}Ptr = &global::System.Runtime.InteropServices.MemoryMarshal.GetReference({raw}PtrSpan))"
        ));
        writer.open_block();
        writer.write_line(&format!(
            "{NATIVE_VARIANT}** {ARGS_VARIABLE} = ({NATIVE_VARIANT}**){raw}Ptr;"
        ));
    }
}

impl<S: VarargCallStrategy + ?Sized> CallPhases for VarargBody<'_, S> {
    fn method_name(&self) -> &str {
        &self.context.method_name
    }

    fn needs_cleanup(&self) -> bool {
        self.fixed.iter().any(|p| p.marshaller.needs_cleanup())
            || self.ret.as_ref().is_some_and(|r| r.marshaller.needs_cleanup())
    }

    fn return_variable(&self) -> Option<&str> {
        self.ret.as_ref().map(|_| self.context.return_variable.as_str())
    }

    fn setup(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        if !self.context.is_static {
            self.strategy.setup_instance(&self.context, writer)?;
        }
        self.strategy.retrieve(&self.context, self.db, writer)?;

        for entry in &mut self.fixed {
            let name = entry.parameter.name();
            entry.aux = entry.marshaller.write_setup(
                writer,
                entry.parameter.ty(),
                &entry.parameter.escaped_name(),
                &format!("{name}Native"),
            )?;
        }

        if let Some(ret) = &mut self.ret {
            let name = &self.context.return_variable;
            writer.write_line(&format!("{} {name};", ret.ty.full_name_with_global()));
            writer.write_line(&format!(
                "global::System.Runtime.CompilerServices.Unsafe.SkipInit(out {name});"
            ));
            match &ret.marshaller {
                ReturnMarshaller::Ptr(marshaller) => {
                    ret.aux = marshaller.write_setup_uninitialized(writer, &ret.ty, &format!("{name}Native"))?;
                    writer.write_line(&format!(
                        "{} {name}Ptr = default;",
                        marshaller.unmanaged_pointer_type().full_name_with_global()
                    ));
                }
                ReturnMarshaller::Variant(marshaller) => {
                    ret.aux = marshaller.write_setup_uninitialized(writer, &ret.ty, &format!("{name}Var"))?;
                    if ret.ty != known::native_godot_variant() {
                        writer.write_line(&format!("{NATIVE_VARIANT} {name}Var;"));
                        writer.write_line(&format!(
                            "global::System.Runtime.CompilerServices.Unsafe.SkipInit(out {name}Var);"
                        ));
                    }
                }
            }
        }

        writer.write_blank_line();
        self.write_spans(writer);
        Ok(())
    }

    fn marshal(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        for (i, entry) in self.fixed.iter().enumerate() {
            let source = entry.aux.clone().unwrap_or_else(|| entry.parameter.escaped_name());
            entry
                .marshaller
                .write_convert_to(writer, entry.parameter.ty(), &source, &format!("{ARGS_VARIABLE}[{i}]"))?;
        }

        let raw = self.variadic.name();
        let v = self.variadic.escaped_name();
        writer.write_line(&format!("for (int i = 0; i < {v}.Length; i++)"));
        writer.open_block();
        writer.write_line(&format!("{raw}MovablePtr[i] = {v}[i].NativeValue;"));
        writer.write_line(&format!(
            "{ARGS_VARIABLE}[{} + i] = {raw}MovablePtr[i].DangerousSelfRef.GetUnsafeAddress();",
            self.fixed.len()
        ));
        writer.close_block();

        if let Some(ret) = &self.ret
            && let ReturnMarshaller::Ptr(marshaller) = &ret.marshaller
        {
            let name = &self.context.return_variable;
            let source = ret.aux.clone().unwrap_or_else(|| name.clone());
            marshaller.write_convert_to(writer, &ret.ty, &source, &format!("{name}Ptr"))?;
        }
        Ok(())
    }

    fn invoke(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        self.strategy.invoke(&self.context, writer)
    }

    fn unmarshal(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        let Some(ret) = &self.ret else {
            return Ok(());
        };
        // Received in place.
        if ret.ty == known::native_godot_variant() {
            return Ok(());
        }
        let name = &self.context.return_variable;
        match &ret.marshaller {
            ReturnMarshaller::Ptr(marshaller) => {
                if marshaller.unmanaged_pointer_type().pointee() != Some(&ret.ty) {
                    marshaller.write_convert_from(writer, &ret.ty, &format!("{name}Ptr"), name)?;
                }
            }
            ReturnMarshaller::Variant(marshaller) => {
                marshaller.write_convert_from(writer, &ret.ty, &format!("&{name}Var"), name)?;
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, writer: &mut IndentedWriter) -> Result<Vec<String>, BodyError> {
        let mut freed = Vec::new();
        for (i, entry) in self.fixed.iter().enumerate() {
            if !entry.marshaller.needs_cleanup() {
                continue;
            }
            entry
                .marshaller
                .write_free(writer, entry.parameter.ty(), &format!("{ARGS_VARIABLE}[{i}]"))?;
            freed.push(entry.parameter.name().to_string());
        }
        if let Some(ret) = &self.ret
            && ret.marshaller.needs_cleanup()
        {
            let name = &self.context.return_variable;
            match &ret.marshaller {
                ReturnMarshaller::Ptr(marshaller) => marshaller.write_free(writer, &ret.ty, &format!("{name}Ptr"))?,
                ReturnMarshaller::Variant(marshaller) => marshaller.write_free(writer, &ret.ty, &format!("&{name}Var"))?,
            }
            freed.push(name.clone());
        }
        Ok(freed)
    }

    fn end(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        // Closes the `fixed` block opened in setup.
        writer.close_block();
        Ok(())
    }
}
