//! Calls into engine class methods through their `MethodBind`.

use gdmarshal_writer::IndentedWriter;

use super::ptrcall::{write_ptrcall_body, PtrCallStrategy};
use super::vararg::{variant_return_slot, write_vararg_body, VarargCallStrategy};
use super::{BodyError, BodyOutline, CallContext, MethodBody, Signature, ARGS_COUNT_VARIABLE, ARGS_VARIABLE, INSTANCE_VARIABLE};
use crate::defaults::write_default_parameter_values;
use crate::registry::TypeDb;

const INTERFACE: &str = "global::Godot.Bridge.GodotBridge.GDExtensionInterface";

fn write_instance(writer: &mut IndentedWriter) {
    writer.write_line(&format!("void* {INSTANCE_VARIABLE} = (void*)NativePtr;"));
}

fn write_get_and_cache(context: &CallContext, hash: i64, writer: &mut IndentedWriter) {
    let method = &context.method_name;
    writer.write_line(&format!(
        "global::Godot.NativeInterop.MethodBind.GetAndCacheMethodBind(ref _{method}_MethodBind, NativeName, MethodName.{method}, {hash}L);"
    ));
}

/// A ptrcall engine class method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodBind {
    hash: i64,
}

impl MethodBind {
    pub fn new(hash: i64) -> Self {
        Self { hash }
    }
}

impl PtrCallStrategy for MethodBind {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        Ok(CallContext::from_signature(signature))
    }

    fn setup_instance(&self, _: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        write_instance(writer);
        Ok(())
    }

    fn retrieve(&self, context: &CallContext, db: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        write_get_and_cache(context, self.hash, writer);
        write_default_parameter_values(writer, db, &context.parameters)?;
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "{INTERFACE}.object_method_bind_ptrcall(_{}_MethodBind, {}, {}, {});",
            context.method_name,
            context.instance_or_null(),
            context.args_or_null(),
            context.return_ptr_or_null()
        ));
        Ok(())
    }
}

impl MethodBody for MethodBind {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_ptrcall_body(self, db, signature, writer)
    }
}

/// A vararg engine class method. Call errors reported by the engine are
/// checked in debug builds of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodBindVararg {
    hash: i64,
}

impl MethodBindVararg {
    pub fn new(hash: i64) -> Self {
        Self { hash }
    }
}

impl VarargCallStrategy for MethodBindVararg {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        Ok(CallContext::from_signature(signature))
    }

    fn setup_instance(&self, _: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        write_instance(writer);
        Ok(())
    }

    fn retrieve(&self, context: &CallContext, _: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        write_get_and_cache(context, self.hash, writer);
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        let method = &context.method_name;
        let instance = context.instance_or_null();
        writer.write_line("global::Godot.NativeInterop.GDExtensionCallError __callError;");
        writer.write_line(&format!(
            "{INTERFACE}.object_method_bind_call(_{method}_MethodBind, {instance}, {ARGS_VARIABLE}, {ARGS_COUNT_VARIABLE}, {}, &__callError);",
            variant_return_slot(context)
        ));
        writer.write_line(&format!(
            "global::Godot.NativeInterop.MethodBind.DebugCheckCallError(MethodName.{method}.NativeValue.DangerousSelfRef, {instance}, new global::Godot.NativeInterop.NativeGodotVariantPtrSpan({ARGS_VARIABLE}, {ARGS_COUNT_VARIABLE}), __callError);"
        ));
        Ok(())
    }
}

impl MethodBody for MethodBindVararg {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_vararg_body(self, db, signature, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Parameter, Phase};
    use crate::registry::{register_known_types, KnownTypeOptions, TypeDbBuilder};
    use crate::types::{known, TypeDescriptor};

    fn db() -> TypeDb {
        let mut builder = TypeDbBuilder::new();
        register_known_types(&mut builder, &KnownTypeOptions::default()).unwrap();
        builder.build()
    }

    #[test]
    fn test_instance_method_bind() {
        let db = db();
        let signature = Signature::new("SetPosition")
            .with_parameter(Parameter::new("position", known::vector2()))
            .with_parameter(Parameter::new("keepOffsets", known::boolean()).with_default("false"));
        let mut writer = IndentedWriter::new();
        let outline = MethodBind::new(2436320129).write(&db, &signature, &mut writer).unwrap();
        assert_eq!(
            writer.as_str(),
            "// Setup - Perform required setup.\n\
             void* __instance = (void*)NativePtr;\n\
             global::Godot.NativeInterop.MethodBind.GetAndCacheMethodBind(ref _SetPosition_MethodBind, NativeName, MethodName.SetPosition, 2436320129L);\n\
             void** __args = stackalloc void*[2];\n\
             \n\
             // Marshalling - Convert managed data to native data.\n\
             __args[0] = &position;\n\
             __args[1] = &keepOffsets;\n\
             \n\
             // Calling the method.\n\
             global::Godot.Bridge.GodotBridge.GDExtensionInterface.object_method_bind_ptrcall(_SetPosition_MethodBind, __instance, __args, null);\n"
        );
        assert!(!outline.has_phase(Phase::MarshalOut));
    }

    #[test]
    fn test_static_method_bind_passes_null_instance() {
        let db = db();
        let signature = Signature::new("GetSingleton").with_static(true).returning(known::godot_object());
        let mut writer = IndentedWriter::new();
        let outline = MethodBind::new(1).write(&db, &signature, &mut writer).unwrap();
        let out = writer.as_str();
        assert!(!out.contains("NativePtr"));
        assert!(out.contains("object_method_bind_ptrcall(_GetSingleton_MethodBind, null, null, __retPtr);\n"));
        assert!(out.contains("global::System.IntPtr* __retPtr = default;\n"));
        assert!(outline.guarded);
        assert_eq!(outline.freed, vec!["__ret".to_string()]);
    }

    #[test]
    fn test_vararg_method_bind_checks_call_error() {
        let db = db();
        let signature = Signature::new("EmitSignal")
            .with_parameter(Parameter::new("signal", known::string_name()))
            .with_parameter(Parameter::new("args", TypeDescriptor::reference("Godot", "Variant[]")))
            .returning(known::int64());
        let mut writer = IndentedWriter::new();
        MethodBindVararg::new(4047867050).write(&db, &signature, &mut writer).unwrap();
        let out = writer.as_str();
        assert!(out.starts_with("// Setup - Perform required setup.\nvoid* __instance = (void*)NativePtr;\n"));
        assert!(out.contains("        global::Godot.NativeInterop.GDExtensionCallError __callError;\n"));
        assert!(out.contains(
            "object_method_bind_call(_EmitSignal_MethodBind, __instance, __args, __argsCount, &__retVar, &__callError);\n"
        ));
        assert!(out.contains(
            "global::Godot.NativeInterop.MethodBind.DebugCheckCallError(MethodName.EmitSignal.NativeValue.DangerousSelfRef, __instance, new global::Godot.NativeInterop.NativeGodotVariantPtrSpan(__args, __argsCount), __callError);\n"
        ));
        assert!(out.contains("__ret = global::Godot.NativeInterop.NativeGodotVariant.ConvertToInt(*&__retVar);\n"));
    }

    #[test]
    fn test_vararg_without_return_passes_null() {
        let db = db();
        let signature = Signature::new("Rpc")
            .with_parameter(Parameter::new("args", TypeDescriptor::reference("Godot", "Variant[]")));
        let mut writer = IndentedWriter::new();
        MethodBindVararg::new(7).write(&db, &signature, &mut writer).unwrap();
        assert!(writer.as_str().contains("__args, __argsCount, null, &__callError);\n"));
    }
}
