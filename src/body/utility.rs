//! Calls into global utility functions (`lerp`, `print`, `randi`...).

use gdmarshal_writer::IndentedWriter;

use super::ptrcall::{write_ptrcall_body, PtrCallStrategy};
use super::{BodyError, BodyOutline, CallContext, MethodBody, Signature};
use crate::defaults::write_default_parameter_values;
use crate::registry::TypeDb;

/// A ptrcall utility function, always static.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityFunction {
    engine_name: String,
    hash: i64,
}

impl UtilityFunction {
    pub fn new(engine_name: impl Into<String>, hash: i64) -> Self {
        Self {
            engine_name: engine_name.into(),
            hash,
        }
    }
}

impl PtrCallStrategy for UtilityFunction {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        Ok(CallContext::from_signature(signature).with_static(true))
    }

    fn retrieve(&self, context: &CallContext, db: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "global::Godot.NativeInterop.MethodBind.GetAndCacheUtilityFunction(ref _{}_MethodBind, \"{}\"u8, {}L);",
            context.method_name, self.engine_name, self.hash
        ));
        write_default_parameter_values(writer, db, &context.parameters)?;
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "_{}_MethodBind({}, {}, {});",
            context.method_name,
            context.return_ptr_or_null(),
            context.args_or_null(),
            context.parameters.len()
        ));
        Ok(())
    }
}

impl MethodBody for UtilityFunction {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_ptrcall_body(self, db, signature, writer)
    }
}
