//! Descriptors for the fixed set of system, engine built-in and
//! native-interop types the generator knows about up front.

use super::{TypeDescriptor, TypeError};

macro_rules! known_types {
    ($($fn_name:ident => $ctor:ident($ns:literal, $name:literal);)*) => {
        $(
            pub fn $fn_name() -> TypeDescriptor {
                TypeDescriptor::$ctor($ns, $name)
            }
        )*
    };
}

known_types! {
    void => value("System", "Void");
    boolean => value("System", "Boolean");
    sbyte => value("System", "SByte");
    byte => value("System", "Byte");
    character => value("System", "Char");
    int16 => value("System", "Int16");
    uint16 => value("System", "UInt16");
    int32 => value("System", "Int32");
    uint32 => value("System", "UInt32");
    int64 => value("System", "Int64");
    uint64 => value("System", "UInt64");
    half => value("System", "Half");
    single => value("System", "Single");
    double => value("System", "Double");
    decimal => value("System", "Decimal");
    string => reference("System", "String");
    int_ptr => value("System", "IntPtr");
    object => reference("System", "Object");

    aabb => value("Godot", "Aabb");
    basis => value("Godot", "Basis");
    callable => value("Godot", "Callable");
    color => value("Godot", "Color");
    node_path => reference("Godot", "NodePath");
    plane => value("Godot", "Plane");
    projection => value("Godot", "Projection");
    quaternion => value("Godot", "Quaternion");
    rect2 => value("Godot", "Rect2");
    rect2i => value("Godot", "Rect2I");
    rid => value("Godot", "Rid");
    signal => value("Godot", "Signal");
    string_name => reference("Godot", "StringName");
    transform2d => value("Godot", "Transform2D");
    transform3d => value("Godot", "Transform3D");
    vector2 => value("Godot", "Vector2");
    vector2i => value("Godot", "Vector2I");
    vector3 => value("Godot", "Vector3");
    vector3i => value("Godot", "Vector3I");
    vector4 => value("Godot", "Vector4");
    vector4i => value("Godot", "Vector4I");
    variant => value("Godot", "Variant");
    godot_object => reference("Godot", "GodotObject");

    godot_array => reference("Godot.Collections", "GodotArray");
    godot_dictionary => reference("Godot.Collections", "GodotDictionary");

    native_godot_string => by_ref_like("Godot.NativeInterop", "NativeGodotString");
    native_godot_string_name => by_ref_like("Godot.NativeInterop", "NativeGodotStringName");
    native_godot_node_path => by_ref_like("Godot.NativeInterop", "NativeGodotNodePath");
    native_godot_callable => by_ref_like("Godot.NativeInterop", "NativeGodotCallable");
    native_godot_signal => by_ref_like("Godot.NativeInterop", "NativeGodotSignal");
    native_godot_variant => by_ref_like("Godot.NativeInterop", "NativeGodotVariant");
    native_godot_array => by_ref_like("Godot.NativeInterop", "NativeGodotArray");
    native_godot_dictionary => by_ref_like("Godot.NativeInterop", "NativeGodotDictionary");
    native_godot_variant_ptr_span => by_ref_like("Godot.NativeInterop", "NativeGodotVariantPtrSpan");
}

/// `Godot.Variant[]`, the trailing `params` parameter of vararg methods.
pub fn variant_array() -> TypeDescriptor {
    TypeDescriptor::reference("Godot", "Variant[]")
}

/// `System.Enum`. Not itself an enum, but flagged as one so enum fallbacks
/// can key on it.
pub fn system_enum() -> TypeDescriptor {
    TypeDescriptor::enumeration("System", "Enum")
}

pub fn nullable() -> TypeDescriptor {
    TypeDescriptor::value("System", "Nullable").with_generic_arity(1)
}

pub fn make_nullable(inner: &TypeDescriptor) -> Result<TypeDescriptor, TypeError> {
    nullable().make_generic(vec![inner.clone()])
}

pub fn span() -> TypeDescriptor {
    TypeDescriptor::by_ref_like("System", "Span").with_generic_arity(1)
}

pub fn read_only_span() -> TypeDescriptor {
    TypeDescriptor::by_ref_like("System", "ReadOnlySpan").with_generic_arity(1)
}

pub fn godot_array_generic() -> TypeDescriptor {
    godot_array().with_generic_arity(1)
}

pub fn godot_array_of(element: &TypeDescriptor) -> Result<TypeDescriptor, TypeError> {
    godot_array_generic().make_generic(vec![element.clone()])
}

pub fn godot_dictionary_generic() -> TypeDescriptor {
    godot_dictionary().with_generic_arity(2)
}

pub fn native_godot_vector() -> TypeDescriptor {
    TypeDescriptor::by_ref_like("Godot.NativeInterop", "NativeGodotVector").with_generic_arity(1)
}

/// Smallest and largest inline array lengths the runtime provides.
pub const INLINE_ARRAY_LENGTHS: std::ops::RangeInclusive<usize> = 2..=16;

/// `System.Runtime.CompilerServices.InlineArray{length}<element>`.
pub fn inline_array_of(length: usize, element: &TypeDescriptor) -> Result<TypeDescriptor, TypeError> {
    if !INLINE_ARRAY_LENGTHS.contains(&length) {
        return Err(TypeError::InlineArrayLength(length));
    }
    TypeDescriptor::value("System.Runtime.CompilerServices", &format!("InlineArray{length}"))
        .with_generic_arity(1)
        .make_generic(vec![element.clone()])
}

/// A packed array: engine name, managed collection and native representation.
#[derive(Debug, Clone, Copy)]
pub struct PackedArray {
    pub engine_name: &'static str,
    pub managed_name: &'static str,
    pub native_name: &'static str,
}

impl PackedArray {
    pub fn managed(&self) -> TypeDescriptor {
        TypeDescriptor::reference("Godot.Collections", self.managed_name)
    }

    pub fn native(&self) -> TypeDescriptor {
        TypeDescriptor::by_ref_like("Godot.NativeInterop", self.native_name)
    }
}

const fn packed(engine_name: &'static str, managed_name: &'static str, native_name: &'static str) -> PackedArray {
    PackedArray {
        engine_name,
        managed_name,
        native_name,
    }
}

pub const PACKED_ARRAYS: &[PackedArray] = &[
    packed("PackedByteArray", "PackedByteArray", "NativeGodotPackedByteArray"),
    packed("PackedInt32Array", "PackedInt32Array", "NativeGodotPackedInt32Array"),
    packed("PackedInt64Array", "PackedInt64Array", "NativeGodotPackedInt64Array"),
    packed("PackedFloat32Array", "PackedFloat32Array", "NativeGodotPackedFloat32Array"),
    packed("PackedFloat64Array", "PackedFloat64Array", "NativeGodotPackedFloat64Array"),
    packed("PackedStringArray", "PackedStringArray", "NativeGodotPackedStringArray"),
    packed("PackedVector2Array", "PackedVector2Array", "NativeGodotPackedVector2Array"),
    packed("PackedVector3Array", "PackedVector3Array", "NativeGodotPackedVector3Array"),
    packed("PackedColorArray", "PackedColorArray", "NativeGodotPackedColorArray"),
    packed("PackedVector4Array", "PackedVector4Array", "NativeGodotPackedVector4Array"),
];

/// Returns `true` for both the managed and native packed array types.
pub fn is_packed_array(ty: &TypeDescriptor) -> bool {
    PACKED_ARRAYS.iter().any(|p| {
        ty.is("Godot.Collections", p.managed_name) || ty.is("Godot.NativeInterop", p.native_name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_array_bounds() {
        let ty = inline_array_of(4, &single()).unwrap();
        assert_eq!(
            ty.full_name(),
            "System.Runtime.CompilerServices.InlineArray4<System.Single>"
        );
        assert!(matches!(inline_array_of(1, &single()), Err(TypeError::InlineArrayLength(1))));
        assert!(matches!(inline_array_of(17, &single()), Err(TypeError::InlineArrayLength(17))));
    }

    #[test]
    fn test_packed_array_detection() {
        assert!(is_packed_array(&TypeDescriptor::reference("Godot.Collections", "PackedByteArray")));
        assert!(is_packed_array(&TypeDescriptor::by_ref_like(
            "Godot.NativeInterop",
            "NativeGodotPackedColorArray"
        )));
        assert!(!is_packed_array(&godot_array()));
        assert_eq!(PACKED_ARRAYS.len(), 10);
    }

    #[test]
    fn test_system_enum_is_flagged() {
        assert!(system_enum().is_enum());
        assert!(!int64().is_enum());
    }
}
