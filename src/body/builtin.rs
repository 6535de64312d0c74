//! Calls into engine built-in classes (`Vector2`, `String`, packed arrays...):
//! constructors, destructors, methods and operators, all reached through
//! function pointers cached per variant type.

use gdmarshal_writer::IndentedWriter;

use super::ptrcall::{write_ptrcall_body, PtrCallStrategy};
use super::vararg::{write_vararg_body, VarargCallStrategy};
use super::{BodyError, BodyOutline, CallContext, MethodBody, Signature, ARGS_COUNT_VARIABLE, ARGS_VARIABLE, INSTANCE_VARIABLE};
use crate::defaults::write_default_parameter_values;
use crate::registry::TypeDb;

const METHOD_BIND: &str = "global::Godot.NativeInterop.MethodBind";
const VARIANT_TYPE: &str = "global::Godot.NativeInterop.GDExtensionVariantType";
const VARIANT_OPERATOR: &str = "global::Godot.NativeInterop.GDExtensionVariantOperator";

/// Built-in constructor number `index` of `variant_type`.
///
/// The constructed value is the return local, named `__destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInConstructor {
    variant_type: String,
    index: usize,
}

impl BuiltInConstructor {
    pub fn new(variant_type: impl Into<String>, index: usize) -> Self {
        Self {
            variant_type: variant_type.into(),
            index,
        }
    }
}

impl PtrCallStrategy for BuiltInConstructor {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        if signature.return_type().is_none() {
            return Err(BodyError::invalid_signature(signature.name(), "constructors must return the constructed value"));
        }
        Ok(CallContext::from_signature(signature)
            .with_static(true)
            .with_return_variable("__destination"))
    }

    fn retrieve(&self, _: &CallContext, _: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        let index = self.index;
        writer.write_line(&format!(
            "{METHOD_BIND}.GetAndCacheBuiltInConstructor(ref _constructor{index}, {VARIANT_TYPE}.{}, {index});",
            self.variant_type
        ));
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "_constructor{}({}Ptr, {});",
            self.index,
            context.return_variable,
            context.args_or_null()
        ));
        Ok(())
    }
}

impl MethodBody for BuiltInConstructor {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_ptrcall_body(self, db, signature, writer)
    }
}

/// The destructor of `variant_type`, called on a `ref self` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInDestructor {
    variant_type: String,
}

impl BuiltInDestructor {
    pub fn new(variant_type: impl Into<String>) -> Self {
        Self {
            variant_type: variant_type.into(),
        }
    }
}

impl PtrCallStrategy for BuiltInDestructor {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        match signature.parameters() {
            [self_parameter] if self_parameter.name() == "self" => {}
            _ => {
                return Err(BodyError::invalid_signature(
                    signature.name(),
                    "destructors take exactly one `self` parameter",
                ));
            }
        }
        // `self` is passed by address, not through the argument array.
        Ok(CallContext::from_signature(signature)
            .with_static(true)
            .with_parameters(Vec::new()))
    }

    fn retrieve(&self, _: &CallContext, _: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "{METHOD_BIND}.GetAndCacheBuiltInDestructor(ref _destructor, {VARIANT_TYPE}.{});",
            self.variant_type
        ));
        Ok(())
    }

    fn invoke(&self, _: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line("_destructor(self.GetUnsafeAddress());");
        Ok(())
    }
}

impl MethodBody for BuiltInDestructor {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_ptrcall_body(self, db, signature, writer)
    }
}

/// Identifies a built-in method on the engine side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInMethodTarget {
    pub variant_type: String,
    pub engine_name: String,
    pub hash: i64,
    pub is_static: bool,
}

impl BuiltInMethodTarget {
    pub fn new(variant_type: impl Into<String>, engine_name: impl Into<String>, hash: i64) -> Self {
        Self {
            variant_type: variant_type.into(),
            engine_name: engine_name.into(),
            hash,
            is_static: false,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    fn write_retrieve(&self, context: &CallContext, writer: &mut IndentedWriter) {
        writer.write_line(&format!(
            "{METHOD_BIND}.GetAndCacheBuiltInMethod(ref _{}_MethodBind, {VARIANT_TYPE}.{}, \"{}\"u8, {}L);",
            context.method_name, self.variant_type, self.engine_name, self.hash
        ));
    }

    /// Instance methods receive the instance as a leading `self` parameter
    /// that does not travel in the argument array.
    fn split_self(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        let context = CallContext::from_signature(signature).with_static(self.is_static);
        if self.is_static {
            return Ok(context);
        }
        match signature.parameters().split_first() {
            Some((_, rest)) => {
                let rest = rest.to_vec();
                Ok(context.with_parameters(rest))
            }
            None => Err(BodyError::invalid_signature(
                signature.name(),
                "instance built-in methods take `self` as their first parameter",
            )),
        }
    }
}

/// A ptrcall built-in method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInMethod {
    target: BuiltInMethodTarget,
}

impl BuiltInMethod {
    pub fn new(target: BuiltInMethodTarget) -> Self {
        Self { target }
    }
}

impl PtrCallStrategy for BuiltInMethod {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        self.target.split_self(signature)
    }

    fn setup_instance(&self, _: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!("void* {INSTANCE_VARIABLE} = &self;"));
        Ok(())
    }

    fn retrieve(&self, context: &CallContext, db: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        self.target.write_retrieve(context, writer);
        write_default_parameter_values(writer, db, &context.parameters)?;
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "_{}_MethodBind({}, {}, {}, {});",
            context.method_name,
            context.instance_or_null(),
            context.args_or_null(),
            context.return_ptr_or_null(),
            context.parameters.len()
        ));
        Ok(())
    }
}

impl MethodBody for BuiltInMethod {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        // Ref structs can't have their address taken with `&`.
        let by_ref_like = !self.target.is_static
            && signature
                .parameters()
                .first()
                .is_some_and(|instance| instance.ty().is_by_ref_like());
        if by_ref_like {
            write_ptrcall_body(&ByRefLikeInstance(self), db, signature, writer)
        } else {
            write_ptrcall_body(self, db, signature, writer)
        }
    }
}

/// [`BuiltInMethod`] on a ref struct instance.
struct ByRefLikeInstance<'a>(&'a BuiltInMethod);

impl PtrCallStrategy for ByRefLikeInstance<'_> {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        self.0.context(signature)
    }

    fn setup_instance(&self, _: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!("void* {INSTANCE_VARIABLE} = self.GetUnsafeAddress();"));
        Ok(())
    }

    fn retrieve(&self, context: &CallContext, db: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        self.0.retrieve(context, db, writer)
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        self.0.invoke(context, writer)
    }
}

/// A vararg built-in method. The return value is marshalled with its
/// pointer marshaller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInMethodVararg {
    target: BuiltInMethodTarget,
}

impl BuiltInMethodVararg {
    pub fn new(target: BuiltInMethodTarget) -> Self {
        Self { target }
    }
}

impl VarargCallStrategy for BuiltInMethodVararg {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        Ok(self.target.split_self(signature)?.with_return_as_ptr())
    }

    fn setup_instance(&self, _: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!("void* {INSTANCE_VARIABLE} = self.GetUnsafeAddress();"));
        Ok(())
    }

    fn retrieve(&self, context: &CallContext, _: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        self.target.write_retrieve(context, writer);
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "_{}_MethodBind({}, (void**){ARGS_VARIABLE}, {}, {ARGS_COUNT_VARIABLE});",
            context.method_name,
            context.instance_or_null(),
            context.return_ptr_or_null()
        ));
        Ok(())
    }
}

impl MethodBody for BuiltInMethodVararg {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_vararg_body(self, db, signature, writer)
    }
}

/// A built-in operator evaluator. Unary operators take one parameter,
/// binary operators two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInOperator {
    operator: String,
    left_type: String,
    right_type: String,
    /// Right operand type as spelled by the engine, part of the cache field name.
    engine_right_type: String,
}

impl BuiltInOperator {
    pub fn new(
        operator: impl Into<String>,
        left_type: impl Into<String>,
        right_type: impl Into<String>,
        engine_right_type: impl Into<String>,
    ) -> Self {
        Self {
            operator: operator.into(),
            left_type: left_type.into(),
            right_type: right_type.into(),
            engine_right_type: engine_right_type.into(),
        }
    }

    fn evaluator(&self, context: &CallContext) -> String {
        format!("_{}_{}_OperatorEvaluator", context.method_name, self.engine_right_type)
    }
}

impl PtrCallStrategy for BuiltInOperator {
    fn context(&self, signature: &Signature) -> Result<CallContext, BodyError> {
        if !(1..=2).contains(&signature.parameters().len()) {
            return Err(BodyError::invalid_signature(
                signature.name(),
                "operator methods must have exactly 1 or 2 parameters",
            ));
        }
        Ok(CallContext::from_signature(signature).with_static(true))
    }

    fn retrieve(&self, context: &CallContext, _: &TypeDb, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        writer.write_line(&format!(
            "{METHOD_BIND}.GetAndCacheBuiltInOperator(ref {}, {VARIANT_OPERATOR}.{}, {VARIANT_TYPE}.{}, {VARIANT_TYPE}.{});",
            self.evaluator(context),
            self.operator,
            self.left_type,
            self.right_type
        ));
        Ok(())
    }

    fn invoke(&self, context: &CallContext, writer: &mut IndentedWriter) -> Result<(), BodyError> {
        let right = if context.parameters.len() == 2 {
            format!("{ARGS_VARIABLE}[1]")
        } else {
            "null".to_string()
        };
        writer.write_line(&format!(
            "{}({ARGS_VARIABLE}[0], {right}, {});",
            self.evaluator(context),
            context.return_ptr_or_null()
        ));
        Ok(())
    }
}

impl MethodBody for BuiltInOperator {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        write_ptrcall_body(self, db, signature, writer)
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
    fn test_constructor_writes_into_destination() {
        let db = db();
        let signature = Signature::new("Construct1")
            .with_parameter(Parameter::new("from", known::vector2()))
            .returning(known::vector2());
        let mut writer = IndentedWriter::new();
        BuiltInConstructor::new("Vector2", 1).write(&db, &signature, &mut writer).unwrap();
        let out = writer.as_str();
        assert!(out.contains(
            "global::Godot.NativeInterop.MethodBind.GetAndCacheBuiltInConstructor(ref _constructor1, global::Godot.NativeInterop.GDExtensionVariantType.Vector2, 1);\n"
        ));
        assert!(out.contains("global::Godot.Vector2 __destination;\n"));
        assert!(out.contains("_constructor1(__destinationPtr, __args);\n"));
        assert!(out.ends_with("return __destination;\n"));
    }

    #[test]
    fn test_parameterless_constructor_passes_null() {
        let db = db();
        let signature = Signature::new("Construct0").returning(known::native_godot_string());
        let mut writer = IndentedWriter::new();
        BuiltInConstructor::new("String", 0).write(&db, &signature, &mut writer).unwrap();
        assert!(writer.as_str().contains("_constructor0(__destinationPtr, null);\n"));
        assert!(!writer.as_str().contains("stackalloc"));
    }

    #[test]
    fn test_destructor() {
        let db = db();
        let signature = Signature::new("Destroy")
            .with_static(true)
            .with_parameter(Parameter::new("self", known::native_godot_string()));
        let mut writer = IndentedWriter::new();
        let outline = BuiltInDestructor::new("String").write(&db, &signature, &mut writer).unwrap();
        assert_eq!(
            writer.as_str(),
            "// Setup - Perform required setup.\n\
             global::Godot.NativeInterop.MethodBind.GetAndCacheBuiltInDestructor(ref _destructor, global::Godot.NativeInterop.GDExtensionVariantType.String);\n\
             \n\
             // Marshalling - Convert managed data to native data.\n\
             \n\
             // Calling the method.\n\
             _destructor(self.GetUnsafeAddress());\n"
        );
        assert_eq!(outline.phases, vec![Phase::Setup, Phase::MarshalIn, Phase::Invoke]);
    }

    #[test]
    fn test_builtin_method_instance_forms() {
        let db = db();
        let target = BuiltInMethodTarget::new("Vector2", "angle_to", 3819070308);
        let signature = Signature::new("AngleTo")
            .with_parameter(Parameter::new("self", known::vector2()))
            .with_parameter(Parameter::new("to", known::vector2()))
            .returning(known::double());
        let mut writer = IndentedWriter::new();
        BuiltInMethod::new(target.clone()).write(&db, &signature, &mut writer).unwrap();
        let out = writer.as_str();
        assert!(out.starts_with("// Setup - Perform required setup.\nvoid* __instance = &self;\n"));
        assert!(out.contains(
            "GetAndCacheBuiltInMethod(ref _AngleTo_MethodBind, global::Godot.NativeInterop.GDExtensionVariantType.Vector2, \"angle_to\"u8, 3819070308L);\n"
        ));
        assert!(out.contains("void** __args = stackalloc void*[1];\n"));
        assert!(out.contains("_AngleTo_MethodBind(__instance, __args, __retPtr, 1);\n"));

        let signature = Signature::new("Length")
            .with_parameter(Parameter::new("self", known::native_godot_string()))
            .returning(known::int64());
        let mut writer = IndentedWriter::new();
        BuiltInMethod::new(BuiltInMethodTarget::new("String", "length", 3173160232))
            .write(&db, &signature, &mut writer)
            .unwrap();
        assert!(writer.as_str().contains("void* __instance = self.GetUnsafeAddress();\n"));
        assert!(writer.as_str().contains("_Length_MethodBind(__instance, null, __retPtr, 0);\n"));
    }

    #[test]
    fn test_builtin_method_default_reassignment() {
        let db = db();
        let target = BuiltInMethodTarget::new("String", "rpad", 3231333003);
        let signature = Signature::new("Rpad")
            .with_parameter(Parameter::new("self", known::native_godot_string()))
            .with_parameter(Parameter::new("minLength", known::int64()))
            .with_parameter(Parameter::new("character", known::native_godot_string()).with_default("\" \""))
            .returning(known::native_godot_string());
        let mut writer = IndentedWriter::new();
        BuiltInMethod::new(target).write(&db, &signature, &mut writer).unwrap();
        assert!(writer.as_str().contains(
            "3231333003L);\n\
             if (!character.IsAllocated)\n\
             {\n\
             \x20   character = global::Godot.NativeInterop.NativeGodotString.Create(\" \"u8);\n\
             }\n"
        ));
    }

    #[test]
    fn test_static_builtin_method_keeps_all_parameters() {
        let db = db();
        let target = BuiltInMethodTarget::new("Color", "hex", 351421375).with_static(true);
        let signature = Signature::new("Hex")
            .with_parameter(Parameter::new("hex", known::int64()))
            .returning(known::color());
        let mut writer = IndentedWriter::new();
        BuiltInMethod::new(target).write(&db, &signature, &mut writer).unwrap();
        assert!(!writer.as_str().contains("__instance"));
        assert!(writer.as_str().contains("_Hex_MethodBind(null, __args, __retPtr, 1);\n"));
    }

    #[test]
    fn test_builtin_method_vararg() {
        let db = db();
        let target = BuiltInMethodTarget::new("Callable", "call", 3643564216);
        let signature = Signature::new("Call")
            .with_parameter(Parameter::new("self", known::native_godot_callable()))
            .with_parameter(Parameter::new("args", TypeDescriptor::reference("Godot", "Variant[]")))
            .returning(known::native_godot_variant());
        let mut writer = IndentedWriter::new();
        BuiltInMethodVararg::new(target).write(&db, &signature, &mut writer).unwrap();
        let out = writer.as_str();
        assert!(out.starts_with("// Setup - Perform required setup.\nvoid* __instance = self.GetUnsafeAddress();\n"));
        assert!(out.contains("global::Godot.NativeInterop.NativeGodotVariant* __retPtr = default;\n"));
        assert!(out.contains("int __argsCount = 0 + args.Length;\n"));
        assert!(out.contains("_Call_MethodBind(__instance, (void**)__args, __retPtr, __argsCount);\n"));
        assert!(!out.contains("__retVar"));
    }

    #[test]
    fn test_operator_arity() {
        let db = db();
        let operator = BuiltInOperator::new("Add", "Vector2", "Vector2", "Vector2");
        let signature = Signature::new("op_Addition")
            .with_parameter(Parameter::new("left", known::vector2()))
            .with_parameter(Parameter::new("right", known::vector2()))
            .returning(known::vector2());
        let mut writer = IndentedWriter::new();
        operator.write(&db, &signature, &mut writer).unwrap();
        assert!(writer.as_str().contains(
            "GetAndCacheBuiltInOperator(ref _op_Addition_Vector2_OperatorEvaluator, global::Godot.NativeInterop.GDExtensionVariantOperator.Add, global::Godot.NativeInterop.GDExtensionVariantType.Vector2, global::Godot.NativeInterop.GDExtensionVariantType.Vector2);\n"
        ));
        assert!(writer.as_str().contains("_op_Addition_Vector2_OperatorEvaluator(__args[0], __args[1], __retPtr);\n"));

        let negate = BuiltInOperator::new("Negate", "Vector2", "Nil", "");
        let signature = Signature::new("op_UnaryNegation")
            .with_parameter(Parameter::new("value", known::vector2()))
            .returning(known::vector2());
        let mut writer = IndentedWriter::new();
        negate.write(&db, &signature, &mut writer).unwrap();
        assert!(writer.as_str().contains("_op_UnaryNegation__OperatorEvaluator(__args[0], null, __retPtr);\n"));

        let err = operator.write(&db, &Signature::new("op_Bad"), &mut IndentedWriter::new()).unwrap_err();
        assert!(matches!(err, BodyError::InvalidSignature { .. }));
    }
}
