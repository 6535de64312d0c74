//! Registrations for every type the generator knows before reading the
//! engine API: primitives, engine built-ins, packed arrays, collections and
//! the C type names used by native structures.

use crate::defaults::{DefaultValueParser, NumberKind};
use crate::marshal::ptr::{
    BlittablePtrMarshaller, FloatingPointPtrMarshaller, IntegerPtrMarshaller, InteropStructPtrMarshaller,
    RuntimePtrMarshaller,
};
use crate::marshal::variant::{
    FloatingPointVariantMarshaller, IntegerVariantMarshaller, InteropStructVariantMarshaller, RuntimeVariantMarshaller,
    VariantVariantMarshaller,
};
use crate::marshal::RuntimeMarshallerType;
use crate::types::{known, TypeDescriptor};

use super::{RegistrationError, TypeDbBuilder};

/// Precision of the engine's `real_t`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FloatPrecision {
    #[default]
    Single,
    Double,
}

impl FloatPrecision {
    pub fn real_type(self) -> TypeDescriptor {
        match self {
            FloatPrecision::Single => known::single(),
            FloatPrecision::Double => known::double(),
        }
    }
}

/// Knobs for [`register_known_types`].
#[derive(Debug, Clone, Default)]
pub struct KnownTypeOptions {
    pub float_precision: FloatPrecision,
}

/// Register every built-in type, writer and parser.
pub fn register_known_types(builder: &mut TypeDbBuilder, options: &KnownTypeOptions) -> Result<(), RegistrationError> {
    register_primitives(builder)?;
    register_builtins(builder)?;
    register_godot_object(builder)?;
    register_packed_arrays(builder)?;
    register_collections(builder)?;
    register_c_aliases(builder, options)?;
    Ok(())
}

/// Map `engine_name` to `ty`, and `ty` to `unmanaged` (or itself).
fn register_type(
    builder: &mut TypeDbBuilder,
    engine_name: &str,
    ty: TypeDescriptor,
    unmanaged: Option<TypeDescriptor>,
) -> Result<(), RegistrationError> {
    builder.register_name(engine_name, ty.clone())?;
    match unmanaged {
        Some(unmanaged) => {
            builder.register_unmanaged(ty, unmanaged.clone())?;
            builder.register_unmanaged_self(unmanaged)
        }
        None => builder.register_unmanaged_self(ty),
    }
}

const INTEGER_METAS: [(&str, NumberKind); 8] = [
    ("int8", NumberKind::SByte),
    ("int16", NumberKind::Int16),
    ("int32", NumberKind::Int32),
    ("int64", NumberKind::Int64),
    ("uint8", NumberKind::Byte),
    ("uint16", NumberKind::UInt16),
    ("uint32", NumberKind::UInt32),
    ("uint64", NumberKind::UInt64),
];

const FLOAT_METAS: [(&str, NumberKind); 3] = [
    ("half", NumberKind::Half),
    ("float", NumberKind::Single),
    ("double", NumberKind::Double),
];

fn register_primitives(builder: &mut TypeDbBuilder) -> Result<(), RegistrationError> {
    let boolean = known::boolean();
    register_type(builder, "bool", boolean.clone(), None)?;
    builder.register_ptr_marshaller(boolean.clone(), BlittablePtrMarshaller::new(boolean.clone())?)?;
    builder.register_variant_marshaller(boolean.clone(), InteropStructVariantMarshaller::new(boolean.clone(), "Bool"))?;
    builder.register_default_parser(boolean, DefaultValueParser::Boolean)?;

    builder.register_name("int", known::int64())?;
    // `int` with meta `int` is the C int of native structures.
    builder.register_meta_name("int", "int", known::int32())?;
    for (meta, kind) in INTEGER_METAS {
        builder.register_meta_name("int", meta, kind.descriptor())?;
        builder.register_unmanaged(kind.descriptor(), known::int64())?;
        builder.register_ptr_marshaller(kind.descriptor(), IntegerPtrMarshaller::new())?;
        builder.register_variant_marshaller(kind.descriptor(), IntegerVariantMarshaller::new())?;
        builder.register_default_parser(kind.descriptor(), DefaultValueParser::Number(kind))?;
    }

    builder.register_name("float", known::double())?;
    for (meta, kind) in FLOAT_METAS {
        builder.register_meta_name("float", meta, kind.descriptor())?;
        builder.register_unmanaged(kind.descriptor(), known::double())?;
        builder.register_ptr_marshaller(kind.descriptor(), FloatingPointPtrMarshaller::new())?;
        builder.register_variant_marshaller(kind.descriptor(), FloatingPointVariantMarshaller::new())?;
        builder.register_default_parser(kind.descriptor(), DefaultValueParser::Number(kind))?;
    }

    // Enum literals are plain integers.
    builder.register_default_parser(known::system_enum(), DefaultValueParser::Number(NumberKind::Int64))?;
    Ok(())
}

/// A blittable struct: engine name, descriptor and the name of its variant helpers.
struct BlittableBuiltin {
    engine_name: &'static str,
    ty: fn() -> TypeDescriptor,
    variant_name: &'static str,
    parser: BuiltinParser,
}

enum BuiltinParser {
    EmptyConstructor,
    Vector,
    Transform,
}

const fn blittable(
    engine_name: &'static str,
    ty: fn() -> TypeDescriptor,
    variant_name: &'static str,
    parser: BuiltinParser,
) -> BlittableBuiltin {
    BlittableBuiltin {
        engine_name,
        ty,
        variant_name,
        parser,
    }
}

const BLITTABLE_BUILTINS: [BlittableBuiltin; 17] = [
    blittable("AABB", known::aabb, "Aabb", BuiltinParser::EmptyConstructor),
    blittable("Basis", known::basis, "Basis", BuiltinParser::EmptyConstructor),
    blittable("Color", known::color, "Color", BuiltinParser::Vector),
    blittable("Plane", known::plane, "Plane", BuiltinParser::EmptyConstructor),
    blittable("Projection", known::projection, "Projection", BuiltinParser::EmptyConstructor),
    blittable("Quaternion", known::quaternion, "Quaternion", BuiltinParser::EmptyConstructor),
    blittable("Rect2", known::rect2, "Rect2", BuiltinParser::Vector),
    blittable("Rect2i", known::rect2i, "Rect2I", BuiltinParser::Vector),
    blittable("RID", known::rid, "Rid", BuiltinParser::EmptyConstructor),
    blittable("Transform2D", known::transform2d, "Transform2D", BuiltinParser::Transform),
    blittable("Transform3D", known::transform3d, "Transform3D", BuiltinParser::Transform),
    blittable("Vector2", known::vector2, "Vector2", BuiltinParser::Vector),
    blittable("Vector2i", known::vector2i, "Vector2I", BuiltinParser::Vector),
    blittable("Vector3", known::vector3, "Vector3", BuiltinParser::Vector),
    blittable("Vector3i", known::vector3i, "Vector3I", BuiltinParser::Vector),
    blittable("Vector4", known::vector4, "Vector4", BuiltinParser::Vector),
    blittable("Vector4i", known::vector4i, "Vector4I", BuiltinParser::Vector),
];

/// Built-ins marshalled by a runtime marshaller class, with their native struct.
const RUNTIME_BUILTINS: [(&str, fn() -> TypeDescriptor, fn() -> TypeDescriptor, &str, &str); 4] = [
    ("Callable", known::callable, known::native_godot_callable, "CallableMarshaller", "Callable"),
    ("NodePath", known::node_path, known::native_godot_node_path, "NodePathMarshaller", "NodePath"),
    ("String", known::string, known::native_godot_string, "StringMarshaller", "String"),
    ("StringName", known::string_name, known::native_godot_string_name, "StringNameMarshaller", "StringName"),
];

fn register_builtins(builder: &mut TypeDbBuilder) -> Result<(), RegistrationError> {
    for builtin in &BLITTABLE_BUILTINS {
        let ty = (builtin.ty)();
        register_type(builder, builtin.engine_name, ty.clone(), None)?;
        builder.register_ptr_marshaller(ty.clone(), BlittablePtrMarshaller::new(ty.clone())?)?;
        builder.register_variant_marshaller(ty.clone(), InteropStructVariantMarshaller::new(ty.clone(), builtin.variant_name))?;
        let parser = match builtin.parser {
            BuiltinParser::EmptyConstructor => DefaultValueParser::empty_constructor(builtin.engine_name),
            BuiltinParser::Vector => DefaultValueParser::vector(ty.clone())?,
            BuiltinParser::Transform => DefaultValueParser::transform(ty.clone())?,
        };
        builder.register_default_parser(ty, parser)?;
    }

    for (engine_name, managed, native, marshaller, variant_name) in RUNTIME_BUILTINS {
        let (managed, native) = (managed(), native());
        register_type(builder, engine_name, managed.clone(), Some(native.clone()))?;
        let marshaller = RuntimeMarshallerType::named(marshaller, 0);
        builder.register_ptr_marshaller(
            managed.clone(),
            RuntimePtrMarshaller::new(marshaller.clone(), managed.clone(), native.make_pointer())?,
        )?;
        builder.register_variant_marshaller(managed.clone(), RuntimeVariantMarshaller::new(marshaller, managed.clone()))?;
        register_native_struct(builder, native.clone(), variant_name)?;

        let (managed_parser, native_parser) = if engine_name == "Callable" {
            let parser = DefaultValueParser::empty_constructor(engine_name);
            (parser.clone(), parser)
        } else if engine_name == "NodePath" {
            (DefaultValueParser::node_path(managed.clone())?, DefaultValueParser::node_path(native.clone())?)
        } else {
            (DefaultValueParser::string(managed.clone())?, DefaultValueParser::string(native.clone())?)
        };
        builder.register_default_parser(managed, managed_parser)?;
        builder.register_default_parser(native, native_parser)?;
    }

    let (signal, native_signal) = (known::signal(), known::native_godot_signal());
    register_type(builder, "Signal", signal.clone(), Some(native_signal.clone()))?;
    builder.register_ptr_marshaller(
        signal.clone(),
        InteropStructPtrMarshaller::new(signal.clone(), Some(native_signal.make_pointer()))?,
    )?;
    builder.register_variant_marshaller(
        signal.clone(),
        InteropStructVariantMarshaller::new(signal.clone(), "Signal")
            .with_unmanaged(native_signal.clone())
            .with_create_suffix("TakingOwnership"),
    )?;
    builder.register_default_parser(signal, DefaultValueParser::empty_constructor("Signal"))?;
    register_native_struct(builder, native_signal, "Signal")?;

    let (variant, native_variant) = (known::variant(), known::native_godot_variant());
    register_type(builder, "Variant", variant.clone(), Some(native_variant.clone()))?;
    builder.register_ptr_marshaller(
        variant.clone(),
        InteropStructPtrMarshaller::new(variant.clone(), Some(native_variant.make_pointer()))?,
    )?;
    builder.register_variant_marshaller(variant.clone(), VariantVariantMarshaller::new(variant.clone()))?;
    builder.register_ptr_marshaller(
        native_variant.clone(),
        InteropStructPtrMarshaller::new(native_variant.clone(), None)?,
    )?;
    builder.register_variant_marshaller(native_variant.clone(), VariantVariantMarshaller::new(native_variant.clone()))?;
    builder.register_default_parser(variant.clone(), DefaultValueParser::variant(variant)?)?;
    builder.register_default_parser(native_variant.clone(), DefaultValueParser::variant(native_variant)?)?;

    builder.register_name("Vector3.Axis", TypeDescriptor::enumeration("Godot", "Vector3.Axis"))?;
    Ok(())
}

/// A native ref struct passed by address, taken over by the variant on conversion.
fn register_native_struct(
    builder: &mut TypeDbBuilder,
    native: TypeDescriptor,
    variant_name: &str,
) -> Result<(), RegistrationError> {
    builder.register_ptr_marshaller(native.clone(), InteropStructPtrMarshaller::new(native.clone(), None)?)?;
    builder.register_variant_marshaller(
        native.clone(),
        InteropStructVariantMarshaller::new(native, variant_name).with_create_suffix("TakingOwnership"),
    )
}

fn register_godot_object(builder: &mut TypeDbBuilder) -> Result<(), RegistrationError> {
    let (object, int_ptr) = (known::godot_object(), known::int_ptr());
    builder.register_name("Object", object.clone())?;
    builder.register_unmanaged(object.clone(), int_ptr.clone())?;
    builder.register_unmanaged_self(int_ptr.clone())?;

    let marshaller = RuntimeMarshallerType::named("GodotObjectMarshaller", 0);
    builder.register_ptr_marshaller(
        object.clone(),
        RuntimePtrMarshaller::new(marshaller.clone(), object.clone(), int_ptr.make_pointer())?,
    )?;
    builder.register_variant_marshaller(object.clone(), RuntimeVariantMarshaller::new(marshaller, object))?;
    builder.register_ptr_marshaller(int_ptr.clone(), BlittablePtrMarshaller::new(int_ptr)?)?;
    Ok(())
}

fn register_packed_arrays(builder: &mut TypeDbBuilder) -> Result<(), RegistrationError> {
    for packed in known::PACKED_ARRAYS {
        let (managed, native) = (packed.managed(), packed.native());
        register_type(builder, packed.engine_name, managed.clone(), Some(native.clone()))?;

        builder.register_ptr_marshaller(
            managed.clone(),
            InteropStructPtrMarshaller::new(managed.clone(), Some(native.make_pointer()))?,
        )?;
        builder.register_ptr_marshaller(native.clone(), InteropStructPtrMarshaller::new(native.clone(), None)?)?;

        builder.register_variant_marshaller(
            managed.clone(),
            InteropStructVariantMarshaller::new(managed.clone(), packed.engine_name)
                .with_unmanaged(native.clone())
                .with_create_suffix("Copying"),
        )?;
        builder.register_variant_marshaller(
            native.clone(),
            InteropStructVariantMarshaller::new(native.clone(), packed.engine_name).with_create_suffix("Copying"),
        )?;

        builder.register_default_parser(managed, DefaultValueParser::packed_array(packed.engine_name))?;
        builder.register_default_parser(native, DefaultValueParser::packed_array(packed.engine_name))?;
    }
    Ok(())
}

fn register_collections(builder: &mut TypeDbBuilder) -> Result<(), RegistrationError> {
    let collections = [
        (
            "Array",
            known::godot_array(),
            known::godot_array_generic(),
            known::native_godot_array(),
            "GodotArrayMarshaller",
        ),
        (
            "Dictionary",
            known::godot_dictionary(),
            known::godot_dictionary_generic(),
            known::native_godot_dictionary(),
            "GodotDictionaryMarshaller",
        ),
    ];

    for (engine_name, plain, generic, native, marshaller) in collections {
        register_type(builder, engine_name, plain.clone(), Some(native.clone()))?;
        builder.register_unmanaged(generic.clone(), native.clone())?;

        for ty in [&plain, &generic] {
            let marshaller = RuntimeMarshallerType::named(marshaller, ty.generic_arity());
            builder.register_ptr_marshaller(
                ty.clone(),
                RuntimePtrMarshaller::new(marshaller, ty.clone(), native.make_pointer())?,
            )?;
            builder.register_variant_marshaller(
                ty.clone(),
                InteropStructVariantMarshaller::new(ty.clone(), engine_name)
                    .with_unmanaged(native.clone())
                    .with_create_suffix("Copying"),
            )?;
        }
        builder.register_ptr_marshaller(native.clone(), InteropStructPtrMarshaller::new(native.clone(), None)?)?;
        builder.register_variant_marshaller(
            native.clone(),
            InteropStructVariantMarshaller::new(native.clone(), engine_name).with_create_suffix("Copying"),
        )?;

        for ty in [plain, generic, native] {
            let parser = if engine_name == "Array" {
                DefaultValueParser::array(ty.clone())?
            } else {
                DefaultValueParser::dictionary(ty.clone())?
            };
            builder.register_default_parser(ty, parser)?;
        }
    }
    Ok(())
}

/// C spellings that appear in native structure formats.
fn register_c_aliases(builder: &mut TypeDbBuilder, options: &KnownTypeOptions) -> Result<(), RegistrationError> {
    let aliases = [
        ("int8_t", known::sbyte()),
        ("uint8_t", known::byte()),
        ("int16_t", known::int16()),
        ("uint16_t", known::uint16()),
        ("int32_t", known::int32()),
        ("uint32_t", known::uint32()),
        ("int64_t", known::int64()),
        ("uint64_t", known::uint64()),
        ("double", known::double()),
        ("real_t", options.float_precision.real_type()),
        ("ObjectID", known::uint64()),
    ];
    for (name, ty) in aliases {
        builder.register_name(name, ty)?;
    }
    Ok(())
}
