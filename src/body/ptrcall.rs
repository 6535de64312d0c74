//! The ptrcall convention: every argument travels as a pointer to its
//! unmanaged representation in a `void**` array sized to the parameter count.

use std::rc::Rc;

use gdmarshal_writer::IndentedWriter;

use super::{write_call_body, BodyError, BodyOutline, CallContext, CallPhases, Parameter, Signature, ARGS_VARIABLE};
use crate::marshal::PtrMarshaller;
use crate::registry::TypeDb;
use crate::types::TypeDescriptor;

/// The parts of a ptrcall body that differ per call target.
pub trait PtrCallStrategy {
    /// Decide which parameters travel, the return local and staticness.
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError>;

    /// Declare `__instance` for instance calls.
    fn setup_instance(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        let _ = writer;
        Err(BodyError::InstanceUnsupported(context.method_name.clone()))
    }

    /// Look up and cache the native target. May also emit default reassignment.
    fn retrieve(&self, context: &CallContext, db: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError>;

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError>;
}

/// Write a complete ptrcall body for `signature` using `strategy`.
pub fn write_ptrcall_body<S>(
    strategy: &S,
    db: &TypeDb,
    signature: &Signature,
    writer: &mut IndentedWriter,
) -> Result<BodyOutline, BodyError>
where
    S: PtrCallStrategy + ?Sized,
{
    let context = strategy.context(signature)?;
    let mut body = PtrCallBody::new(strategy, db, context)?;
    write_call_body(&mut body, writer)
}

struct MarshalledParameter {
    parameter: Parameter,
    marshaller: Rc<dyn PtrMarshaller>,
    aux: Option<String>,
}

struct MarshalledReturn {
    ty: TypeDescriptor,
    marshaller: Rc<dyn PtrMarshaller>,
    aux: Option<String>,
}

struct PtrCallBody<'a, S: ?Sized> {
    strategy: &'a S,
    db: &'a TypeDb,
    context: CallContext,
    parameters: Vec<MarshalledParameter>,
    ret: Option<MarshalledReturn>,
}

impl<'a, S: PtrCallStrategy + ?Sized> PtrCallBody<'a, S> {
    fn new(strategy: &'a S, db: &'a TypeDb, context: CallContext) -> Result<Self, BodyError> {
        let parameters = context
            .parameters
            .iter()
            .map(|parameter| {
                Ok(MarshalledParameter {
                    marshaller: db.ptr_marshaller(parameter.ty())?,
                    parameter: parameter.clone(),
                    aux: None,
                })
            })
            .collect::<Result<Vec<_>, BodyError>>()?;
        let ret = match &context.return_type {
            Some(ty) => Some(MarshalledReturn {
                marshaller: db.ptr_marshaller(ty)?,
                ty: ty.clone(),
                aux: None,
            }),
            None => None,
        };
        Ok(Self {
            strategy,
            db,
            context,
            parameters,
            ret,
        })
    }
}

impl<S: PtrCallStrategy + ?Sized> CallPhases for PtrCallBody<'_, S> {
    fn method_name(&self) -> &str {
        &self.context.method_name
    }

    fn needs_cleanup(&self) -> bool {
        self.parameters.iter().any(|p| p.marshaller.needs_cleanup())
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

        for entry in &mut self.parameters {
            let name = entry.parameter.name();
            entry.aux = entry.marshaller.write_setup(
                writer,
                entry.parameter.ty(),
                &entry.parameter.escaped_name(),
                &format!("{name}Native"),
            )?;
        }

        if !self.parameters.is_empty() {
            writer.write_line(&format!(
                "void** {ARGS_VARIABLE} = stackalloc void*[{}];",
                self.parameters.len()
            ));
        }

        if let Some(ret) = &mut self.ret {
            let name = &self.context.return_variable;
            writer.write_line(&format!("{} {name};", ret.ty.full_name_with_global()));
            writer.write_line(&format!(
                "global::System.Runtime.CompilerServices.Unsafe.SkipInit(out {name});"
            ));
            ret.aux = ret
                .marshaller
                .write_setup_uninitialized(writer, &ret.ty, &format!("{name}Native"))?;
            writer.write_line(&format!(
                "{} {name}Ptr = default;",
                ret.marshaller.unmanaged_pointer_type().full_name_with_global()
            ));
        }
        Ok(())
    }

    fn marshal(&mut self, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        for (i, entry) in self.parameters.iter().enumerate() {
            let source = entry.aux.clone().unwrap_or_else(|| entry.parameter.escaped_name());
            entry
                .marshaller
                .write_convert_to(writer, entry.parameter.ty(), &source, &format!("{ARGS_VARIABLE}[{i}]"))?;
        }
        if let Some(ret) = &self.ret {
            let name = &self.context.return_variable;
            let source = ret.aux.clone().unwrap_or_else(|| name.clone());
            ret.marshaller
                .write_convert_to(writer, &ret.ty, &source, &format!("{name}Ptr"))?;
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
        // The native side wrote straight into the managed local.
        if ret.marshaller.unmanaged_pointer_type().pointee() == Some(&ret.ty) {
            return Ok(());
        }
        let name = &self.context.return_variable;
        ret.marshaller
            .write_convert_from(writer, &ret.ty, &format!("{name}Ptr"), name)?;
        Ok(())
    }

    fn cleanup(&mut self, writer: &mut IndentedWriter) -> Result<Vec<String>, BodyError> {
        let mut freed = Vec::new();
        for (i, entry) in self.parameters.iter().enumerate() {
            if !entry.marshaller.needs_cleanup() {
                continue;
            }
            // Slots are `void*`; cast back to the marshaller's pointer type.
            let pointer = entry.marshaller.unmanaged_pointer_type().full_name_with_global();
            entry
                .marshaller
                .write_free(writer, entry.parameter.ty(), &format!("({pointer}){ARGS_VARIABLE}[{i}]"))?;
            freed.push(entry.parameter.name().to_string());
        }
        if let Some(ret) = &self.ret
            && ret.marshaller.needs_cleanup()
        {
            let name = &self.context.return_variable;
            ret.marshaller.write_free(writer, &ret.ty, &format!("{name}Ptr"))?;
            freed.push(name.clone());
        }
        Ok(freed)
    }
}
