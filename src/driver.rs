//! Batch synthesis of member descriptors.
//!
//! The [`Driver`] owns the registry for one generation run. Each member is
//! resolved, planned and emitted on its own: a failing member is logged
//! and reported, and the rest of the batch continues unless
//! [`SynthesisConfig::abort_on_error`] is set.

use gdmarshal_writer::IndentedWriter;
use thiserror::Error;

use crate::body::{
    BodyError, BodyOutline, BuiltInConstructor, BuiltInDestructor, BuiltInMethod, BuiltInMethodTarget,
    BuiltInMethodVararg, BuiltInOperator, MethodBind, MethodBindVararg, MethodBody, Parameter, Signature,
    UtilityFunction,
};
use crate::config::{GeneratorConfig, SynthesisConfig};
use crate::defaults::apply_default_value;
use crate::logging::{debug, error, info, phase, warn};
use crate::model::{MemberDescriptor, MemberKind, TypeRef};
use crate::registry::{
    register_engine_classes, register_engine_enums, register_known_types, RegistrationError, TypeDb, TypeDbBuilder,
};
use crate::types::{known, TypeDescriptor};

/// Name of the trailing variadic parameter of vararg members.
const VARARG_PARAMETER: &str = "args";

/// Errors that stop a whole batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Failed to synthesize '{member}': {source}")]
    Member {
        member: String,
        #[source]
        source: BodyError,
    },
}

/// A parameter as declared in the generated signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParameter {
    pub name: String,
    /// Possibly `Nullable<T>`-wrapped to carry a runtime default.
    pub ty: TypeDescriptor,
    /// The expression after `=`, if the parameter is optional.
    pub default: Option<String>,
}

/// A member whose body was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedMember {
    pub name: String,
    pub class: Option<String>,
    pub is_static: bool,
    pub parameters: Vec<DeclaredParameter>,
    pub return_type: Option<TypeDescriptor>,
    pub requires_unsafe: bool,
    pub outline: BodyOutline,
    pub body: String,
}

/// A member that could not be synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFailure {
    pub member: String,
    pub error: BodyError,
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    pub members: Vec<SynthesizedMember>,
    pub failures: Vec<MemberFailure>,
}

impl SynthesisReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Synthesizes call bodies against one registry.
pub struct Driver {
    db: TypeDb,
    options: SynthesisConfig,
}

impl Driver {
    /// Build the registry described by `config`: known types, then the
    /// configured engine classes and enums.
    pub fn new(config: &GeneratorConfig) -> Result<Self, DriverError> {
        let _phase = phase!("build_registry", classes = config.types.engine_classes.len());
        let mut builder = TypeDbBuilder::new();
        register_known_types(&mut builder, &config.types.known_type_options())?;
        register_engine_classes(&mut builder, &config.types.engine_classes)?;
        register_engine_enums(&mut builder, &config.types.enums)?;
        Ok(Self::with_db(builder.build(), config.synthesis))
    }

    /// Use an already built registry.
    pub fn with_db(db: TypeDb, options: SynthesisConfig) -> Self {
        Self { db, options }
    }

    pub fn db(&self) -> &TypeDb {
        &self.db
    }

    /// Synthesize every member in order.
    pub fn synthesize(&self, members: &[MemberDescriptor]) -> Result<SynthesisReport, DriverError> {
        let _phase = phase!("synthesize", members = members.len());
        let mut report = SynthesisReport::default();
        for member in members {
            match self.synthesize_member(member) {
                Ok(synthesized) => report.members.push(synthesized),
                Err(err) if self.options.abort_on_error => {
                    let name = qualified_name(member);
                    error!(member = %name, error = %err, "synthesis aborted");
                    return Err(DriverError::Member {
                        member: name,
                        source: err,
                    });
                }
                Err(err) => {
                    let name = qualified_name(member);
                    warn!(member = %name, error = %err, "skipping member");
                    report.failures.push(MemberFailure { member: name, error: err });
                }
            }
        }
        info!(
            synthesized = report.members.len(),
            failed = report.failures.len(),
            "synthesis finished"
        );
        Ok(report)
    }

    /// Synthesize a single member.
    pub fn synthesize_member(&self, member: &MemberDescriptor) -> Result<SynthesizedMember, BodyError> {
        let _phase = phase!("member", name = %qualified_name(member));
        debug!(kind = ?member.kind, "synthesizing member");
        let plan = self.plan(member)?;

        let mut writer = IndentedWriter::new();
        let outline = plan.body.write(&self.db, &plan.signature, &mut writer)?;
        Ok(SynthesizedMember {
            name: member.name.clone(),
            class: member.class.clone(),
            is_static: plan.signature.is_static(),
            parameters: plan.declared,
            return_type: plan.signature.return_type().cloned(),
            requires_unsafe: plan.body.requires_unsafe_code(),
            outline,
            body: writer.into_string(),
        })
    }

    fn plan(&self, member: &MemberDescriptor) -> Result<MemberPlan, BodyError> {
        let builtin = BuiltInTypes::new(self, member);
        let mut signature = Signature::new(&member.name).with_static(member.is_static);
        let mut declared = Vec::with_capacity(member.arguments.len());

        let body: Box<dyn MethodBody> = match &member.kind {
            MemberKind::MethodBind => {
                signature = self.add_arguments(member, false, signature, &mut declared)?;
                if member.is_vararg {
                    Box::new(MethodBindVararg::new(member.hash))
                } else {
                    Box::new(MethodBind::new(member.hash))
                }
            }
            MemberKind::UtilityFunction => {
                if member.is_vararg {
                    return Err(BodyError::invalid_signature(
                        &member.name,
                        "vararg utility functions have no call strategy",
                    ));
                }
                signature = signature.with_static(true);
                signature = self.add_arguments(member, false, signature, &mut declared)?;
                Box::new(UtilityFunction::new(member.engine_name(), member.hash))
            }
            MemberKind::BuiltInMethod => {
                let variant_type = builtin.variant_type()?;
                if !member.is_static {
                    signature = signature.with_parameter(Parameter::new("self", builtin.unmanaged_self()?));
                }
                signature = self.add_arguments(member, false, signature, &mut declared)?;
                let target =
                    BuiltInMethodTarget::new(variant_type, member.engine_name(), member.hash).with_static(member.is_static);
                if member.is_vararg {
                    Box::new(BuiltInMethodVararg::new(target))
                } else {
                    Box::new(BuiltInMethod::new(target))
                }
            }
            MemberKind::BuiltInConstructor { index } => {
                let variant_type = builtin.variant_type()?;
                signature = signature.with_static(true);
                signature = self.add_arguments(member, true, signature, &mut declared)?;
                if member.return_value.is_none() {
                    signature = signature.returning(builtin.unmanaged_self()?);
                }
                Box::new(BuiltInConstructor::new(variant_type, *index))
            }
            MemberKind::BuiltInDestructor => {
                let variant_type = builtin.variant_type()?;
                signature = signature
                    .with_static(true)
                    .with_parameter(Parameter::new("self", builtin.unmanaged_self()?));
                Box::new(BuiltInDestructor::new(variant_type))
            }
            MemberKind::BuiltInOperator { operator, right_type } => {
                let left = builtin.variant_type()?;
                let kind = variant_operator(operator).ok_or_else(|| {
                    BodyError::invalid_signature(&member.name, format!("unknown operator '{operator}'"))
                })?;
                let (right, engine_right) = match right_type.as_deref() {
                    None | Some("") => ("GDEXTENSION_VARIANT_TYPE_NIL", ""),
                    Some("Variant") => ("GDEXTENSION_VARIANT_TYPE_NIL", "Variant"),
                    Some(name) => (
                        variant_type(name).ok_or_else(|| {
                            BodyError::invalid_signature(&member.name, format!("'{name}' is not a variant type"))
                        })?,
                        name,
                    ),
                };
                signature = signature.with_static(true);
                signature = self.add_arguments(member, true, signature, &mut declared)?;
                Box::new(BuiltInOperator::new(kind, left, right, engine_right))
            }
        };

        if member.is_vararg {
            signature = signature.with_parameter(Parameter::new(VARARG_PARAMETER, known::variant_array()));
            declared.push(DeclaredParameter {
                name: VARARG_PARAMETER.to_string(),
                ty: known::variant_array(),
                default: None,
            });
        }
        if let Some(ret) = &member.return_value {
            let unmanaged = matches!(
                member.kind,
                MemberKind::BuiltInConstructor { .. } | MemberKind::BuiltInOperator { .. }
            );
            signature = signature.returning(self.resolve(ret, unmanaged)?);
        }

        Ok(MemberPlan {
            signature,
            declared,
            body,
        })
    }

    /// Resolve the declared arguments, planning their default values.
    fn add_arguments(
        &self,
        member: &MemberDescriptor,
        unmanaged: bool,
        signature: Signature,
        declared: &mut Vec<DeclaredParameter>,
    ) -> Result<Signature, BodyError> {
        let mut parameters = Vec::with_capacity(member.arguments.len());
        for argument in &member.arguments {
            let ty = self.resolve(&argument.ty, unmanaged)?;
            let (parameter, default) = match &argument.default_value {
                Some(literal) => {
                    let plan = apply_default_value(&self.db, &ty, literal)?;
                    let declared_value = plan.declared_value.map(|value| declared_default(&plan.parameter_type, value));
                    let parameter = Parameter::new(&argument.name, plan.parameter_type).with_default(literal);
                    (parameter, declared_value)
                }
                None => (Parameter::new(&argument.name, ty), None),
            };
            declared.push(DeclaredParameter {
                name: argument.name.clone(),
                ty: parameter.ty().clone(),
                default,
            });
            parameters.push(parameter);
        }
        Ok(signature.with_parameters(parameters))
    }

    fn resolve(&self, ty: &TypeRef, unmanaged: bool) -> Result<TypeDescriptor, BodyError> {
        let resolved = self.db.resolve_by_engine_name(&ty.ty, ty.meta.as_deref())?;
        if unmanaged {
            Ok(self.db.resolve_unmanaged(&resolved)?)
        } else {
            Ok(resolved)
        }
    }
}

struct MemberPlan {
    signature: Signature,
    declared: Vec<DeclaredParameter>,
    body: Box<dyn MethodBody>,
}

/// Lookups shared by the built-in member kinds, keyed on the member's class.
struct BuiltInTypes<'a> {
    driver: &'a Driver,
    member: &'a MemberDescriptor,
}

impl<'a> BuiltInTypes<'a> {
    fn new(driver: &'a Driver, member: &'a MemberDescriptor) -> Self {
        Self { driver, member }
    }

    fn class(&self) -> Result<&'a str, BodyError> {
        self.member
            .class
            .as_deref()
            .ok_or_else(|| BodyError::invalid_signature(&self.member.name, "built-in members need a class"))
    }

    fn variant_type(&self) -> Result<&'static str, BodyError> {
        let class = self.class()?;
        variant_type(class).ok_or_else(|| {
            BodyError::invalid_signature(&self.member.name, format!("'{class}' is not a variant type"))
        })
    }

    /// Built-in instances travel as their unmanaged representation.
    fn unmanaged_self(&self) -> Result<TypeDescriptor, BodyError> {
        self.driver.resolve(&TypeRef::new(self.class()?), true)
    }
}

/// The declared default of a parameter of type `ty` as a C# expression.
///
/// Enum parameters get their numeric value cast to the enum type; every
/// other value is returned unchanged.
pub fn declared_default(ty: &TypeDescriptor, value: String) -> String {
    if ty.is_enum() && value != "default" {
        format!("({})({})", ty.full_name_with_global(), value)
    } else {
        value
    }
}

fn qualified_name(member: &MemberDescriptor) -> String {
    match &member.class {
        Some(class) => format!("{class}.{}", member.name),
        None => member.name.clone(),
    }
}

/// The `GDExtensionVariantType` field for an engine type name.
pub fn variant_type(engine_name: &str) -> Option<&'static str> {
    Some(match engine_name {
        "Nil" => "GDEXTENSION_VARIANT_TYPE_NIL",
        "bool" => "GDEXTENSION_VARIANT_TYPE_BOOL",
        "int" => "GDEXTENSION_VARIANT_TYPE_INT",
        "float" => "GDEXTENSION_VARIANT_TYPE_FLOAT",
        "String" => "GDEXTENSION_VARIANT_TYPE_STRING",
        "Vector2" => "GDEXTENSION_VARIANT_TYPE_VECTOR2",
        "Vector2i" => "GDEXTENSION_VARIANT_TYPE_VECTOR2I",
        "Rect2" => "GDEXTENSION_VARIANT_TYPE_RECT2",
        "Rect2i" => "GDEXTENSION_VARIANT_TYPE_RECT2I",
        "Vector3" => "GDEXTENSION_VARIANT_TYPE_VECTOR3",
        "Vector3i" => "GDEXTENSION_VARIANT_TYPE_VECTOR3I",
        "Transform2D" => "GDEXTENSION_VARIANT_TYPE_TRANSFORM2D",
        "Vector4" => "GDEXTENSION_VARIANT_TYPE_VECTOR4",
        "Vector4i" => "GDEXTENSION_VARIANT_TYPE_VECTOR4I",
        "Plane" => "GDEXTENSION_VARIANT_TYPE_PLANE",
        "Quaternion" => "GDEXTENSION_VARIANT_TYPE_QUATERNION",
        "AABB" => "GDEXTENSION_VARIANT_TYPE_AABB",
        "Basis" => "GDEXTENSION_VARIANT_TYPE_BASIS",
        "Transform3D" => "GDEXTENSION_VARIANT_TYPE_TRANSFORM3D",
        "Projection" => "GDEXTENSION_VARIANT_TYPE_PROJECTION",
        "Color" => "GDEXTENSION_VARIANT_TYPE_COLOR",
        "StringName" => "GDEXTENSION_VARIANT_TYPE_STRING_NAME",
        "NodePath" => "GDEXTENSION_VARIANT_TYPE_NODE_PATH",
        "RID" => "GDEXTENSION_VARIANT_TYPE_RID",
        "Object" => "GDEXTENSION_VARIANT_TYPE_OBJECT",
        "Callable" => "GDEXTENSION_VARIANT_TYPE_CALLABLE",
        "Signal" => "GDEXTENSION_VARIANT_TYPE_SIGNAL",
        "Dictionary" => "GDEXTENSION_VARIANT_TYPE_DICTIONARY",
        "Array" => "GDEXTENSION_VARIANT_TYPE_ARRAY",
        "PackedByteArray" => "GDEXTENSION_VARIANT_TYPE_PACKED_BYTE_ARRAY",
        "PackedInt32Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_INT32_ARRAY",
        "PackedInt64Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_INT64_ARRAY",
        "PackedFloat32Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_FLOAT32_ARRAY",
        "PackedFloat64Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_FLOAT64_ARRAY",
        "PackedStringArray" => "GDEXTENSION_VARIANT_TYPE_PACKED_STRING_ARRAY",
        "PackedVector2Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR2_ARRAY",
        "PackedVector3Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR3_ARRAY",
        "PackedColorArray" => "GDEXTENSION_VARIANT_TYPE_PACKED_COLOR_ARRAY",
        "PackedVector4Array" => "GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR4_ARRAY",
        _ => return None,
    })
}

/// The `GDExtensionVariantOperator` field for an engine operator symbol.
pub fn variant_operator(symbol: &str) -> Option<&'static str> {
    Some(match symbol {
        "==" => "GDEXTENSION_VARIANT_OP_EQUAL",
        "!=" => "GDEXTENSION_VARIANT_OP_NOT_EQUAL",
        "<" => "GDEXTENSION_VARIANT_OP_LESS",
        "<=" => "GDEXTENSION_VARIANT_OP_LESS_EQUAL",
        ">" => "GDEXTENSION_VARIANT_OP_GREATER",
        ">=" => "GDEXTENSION_VARIANT_OP_GREATER_EQUAL",
        "+" => "GDEXTENSION_VARIANT_OP_ADD",
        "-" => "GDEXTENSION_VARIANT_OP_SUBTRACT",
        "*" => "GDEXTENSION_VARIANT_OP_MULTIPLY",
        "/" => "GDEXTENSION_VARIANT_OP_DIVIDE",
        "unary-" => "GDEXTENSION_VARIANT_OP_NEGATE",
        "unary+" => "GDEXTENSION_VARIANT_OP_POSITIVE",
        "%" => "GDEXTENSION_VARIANT_OP_MODULE",
        "**" => "GDEXTENSION_VARIANT_OP_POWER",
        "<<" => "GDEXTENSION_VARIANT_OP_SHIFT_LEFT",
        ">>" => "GDEXTENSION_VARIANT_OP_SHIFT_RIGHT",
        "&" => "GDEXTENSION_VARIANT_OP_BIT_AND",
        "|" => "GDEXTENSION_VARIANT_OP_BIT_OR",
        "^" => "GDEXTENSION_VARIANT_OP_BIT_XOR",
        "~" => "GDEXTENSION_VARIANT_OP_BIT_NEGATE",
        "and" => "GDEXTENSION_VARIANT_OP_AND",
        "or" => "GDEXTENSION_VARIANT_OP_OR",
        "xor" => "GDEXTENSION_VARIANT_OP_XOR",
        "not" => "GDEXTENSION_VARIANT_OP_NOT",
        "in" => "GDEXTENSION_VARIANT_OP_IN",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Phase;
    use crate::model::ArgumentDescriptor;
    use crate::registry::EngineClass;

    fn driver(abort_on_error: bool) -> Driver {
        let mut config = GeneratorConfig::default();
        config.types.engine_classes = vec![
            EngineClass::new("Node").inheriting("Object"),
            EngineClass::new("Node2D").inheriting("Node"),
        ];
        config.types.enums = vec!["Node.ProcessMode".to_string()];
        config.synthesis.abort_on_error = abort_on_error;
        Driver::new(&config).unwrap()
    }

    fn arg(name: &str, ty: &str) -> ArgumentDescriptor {
        ArgumentDescriptor::new(name, TypeRef::new(ty))
    }

    #[test]
    fn test_method_bind_with_runtime_default() {
        let member = MemberDescriptor::new("MoveLocal", MemberKind::MethodBind)
            .with_class("Node2D")
            .with_hash(743155724)
            .with_argument(arg("offset", "Vector2").with_default("Vector2(1, 2)"))
            .with_argument(arg("mode", "enum::Node.ProcessMode").with_default("0"));
        let synthesized = driver(false).synthesize_member(&member).unwrap();

        let offset = synthesized.parameters.first().unwrap();
        assert_eq!(offset.ty.full_name(), "System.Nullable<Godot.Vector2>");
        assert_eq!(offset.default.as_deref(), Some("default"));
        let mode = synthesized.parameters.get(1).unwrap();
        assert!(mode.ty.is_enum());
        assert_eq!(mode.default.as_deref(), Some("(global::Godot.Node.ProcessMode)(0L)"));

        assert!(synthesized.body.contains("offset ??= new global::Godot.Vector2(1f, 2f);\n"));
        assert!(synthesized.body.contains(
            "object_method_bind_ptrcall(_MoveLocal_MethodBind, __instance, __args, null);\n"
        ));
        assert!(synthesized.requires_unsafe);
    }

    #[test]
    fn test_enum_defaults_are_cast() {
        let process_mode = TypeDescriptor::enumeration("Godot", "Node.ProcessMode");
        assert_eq!(
            declared_default(&process_mode, "-1L".to_string()),
            "(global::Godot.Node.ProcessMode)(-1L)"
        );
        assert_eq!(declared_default(&process_mode, "default".to_string()), "default");
        assert_eq!(declared_default(&known::int64(), "3L".to_string()), "3L");

        let member = MemberDescriptor::new("SetProcessMode", MemberKind::MethodBind)
            .with_class("Node")
            .with_hash(1)
            .with_argument(arg("mode", "enum::Node.ProcessMode").with_default("2"));
        let synthesized = driver(false).synthesize_member(&member).unwrap();
        let mode = synthesized.parameters.first().unwrap();
        assert_eq!(mode.default.as_deref(), Some("(global::Godot.Node.ProcessMode)(2L)"));
    }

    #[test]
    fn test_builtin_method_gets_self() {
        let member = MemberDescriptor::new("Length", MemberKind::BuiltInMethod)
            .with_engine_name("length")
            .with_class("Vector2")
            .with_hash(466405837)
            .returning(TypeRef::new("float"));
        let synthesized = driver(false).synthesize_member(&member).unwrap();
        assert!(synthesized.body.contains("void* __instance = &self;\n"));
        assert!(synthesized.body.contains(
            "GetAndCacheBuiltInMethod(ref _Length_MethodBind, global::Godot.NativeInterop.GDExtensionVariantType.GDEXTENSION_VARIANT_TYPE_VECTOR2, \"length\"u8, 466405837L);\n"
        ));
        assert_eq!(synthesized.return_type, Some(known::double()));
        // `self` is not a declared argument.
        assert!(synthesized.parameters.is_empty());
    }

    #[test]
    fn test_vararg_member_gets_params_array() {
        let member = MemberDescriptor::new("EmitSignal", MemberKind::MethodBind)
            .with_class("Object")
            .with_hash(4047867050)
            .with_vararg(true)
            .with_argument(arg("signal", "StringName"))
            .returning(TypeRef::new("enum::Error"));
        let synthesized = driver(false).synthesize_member(&member).unwrap();
        let names: Vec<&str> = synthesized.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["signal", "args"]);
        assert!(synthesized.body.contains("args.Length"));
        assert!(synthesized.outline.has_phase(Phase::MarshalOut));
    }

    #[test]
    fn test_operator_and_constructor_use_unmanaged_types() {
        let driver = driver(false);
        let add = MemberDescriptor::new("OperatorAdd", MemberKind::BuiltInOperator {
            operator: "+".to_string(),
            right_type: Some("String".to_string()),
        })
        .with_class("String")
        .with_argument(arg("left", "String"))
        .with_argument(arg("right", "String"))
        .returning(TypeRef::new("String"));
        let synthesized = driver.synthesize_member(&add).unwrap();
        assert_eq!(synthesized.return_type, Some(known::native_godot_string()));
        assert!(synthesized.body.contains(
            "GetAndCacheBuiltInOperator(ref _OperatorAdd_String_OperatorEvaluator, global::Godot.NativeInterop.GDExtensionVariantOperator.GDEXTENSION_VARIANT_OP_ADD, global::Godot.NativeInterop.GDExtensionVariantType.GDEXTENSION_VARIANT_TYPE_STRING, global::Godot.NativeInterop.GDExtensionVariantType.GDEXTENSION_VARIANT_TYPE_STRING);\n"
        ));

        let ctor = MemberDescriptor::new("Create", MemberKind::BuiltInConstructor { index: 0 }).with_class("StringName");
        let synthesized = driver.synthesize_member(&ctor).unwrap();
        assert!(synthesized.is_static);
        assert_eq!(synthesized.return_type, Some(known::native_godot_string_name()));
    }

    #[test]
    fn test_failures_are_isolated() {
        let members = vec![
            MemberDescriptor::new("Broken", MemberKind::MethodBind)
                .with_class("Node")
                .with_argument(arg("value", "Mystery")),
            MemberDescriptor::new("GetName", MemberKind::MethodBind)
                .with_class("Node")
                .returning(TypeRef::new("StringName")),
        ];
        let report = driver(false).synthesize(&members).unwrap();
        assert_eq!(report.members.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_complete());
        let failure = report.failures.first().unwrap();
        assert_eq!(failure.member, "Node.Broken");
        assert!(matches!(failure.error, BodyError::Resolve(_)));

        let err = driver(true).synthesize(&members).unwrap_err();
        assert!(matches!(err, DriverError::Member { ref member, .. } if member == "Node.Broken"));
    }

    #[test]
    fn test_unknown_variant_type_and_operator() {
        let driver = driver(false);
        let member = MemberDescriptor::new("Length", MemberKind::BuiltInMethod).with_class("Node");
        assert!(matches!(
            driver.synthesize_member(&member),
            Err(BodyError::InvalidSignature { .. })
        ));
        let member = MemberDescriptor::new("Op", MemberKind::BuiltInOperator {
            operator: "<=>".to_string(),
            right_type: None,
        })
        .with_class("Vector2");
        assert!(matches!(
            driver.synthesize_member(&member),
            Err(BodyError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_lookup_tables() {
        assert_eq!(variant_type("Vector2i"), Some("GDEXTENSION_VARIANT_TYPE_VECTOR2I"));
        assert_eq!(variant_type("Node"), None);
        assert_eq!(variant_operator("unary-"), Some("GDEXTENSION_VARIANT_OP_NEGATE"));
    }
}
