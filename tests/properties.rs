//! Property-based tests for resolution, vararg layout, default values and
//! cleanup emission.

mod common;

use common::{count, engine_db, known_db, write_body};
use gdmarshal::body::{
    ArgumentSlot, ConvertToVariantCopying, ConvertToVariantTakingOwnership, MethodBind, Parameter, Signature,
    VarargBuffer, VarargLayout, VARARG_SPAN_THRESHOLD,
};
use gdmarshal::defaults::{is_constant_foldable, NumberKind};
use gdmarshal::types::known;
use gdmarshal::{apply_default_value, IndentedWriter, TypeDescriptor};
use proptest::prelude::*;
use regex::Regex;

const BUILTINS: &[&str] = &[
    "AABB", "Basis", "Callable", "Color", "NodePath", "Plane", "Projection", "Quaternion", "Rect2", "Rect2i", "RID",
    "Signal", "String", "StringName", "Transform2D", "Transform3D", "Vector2", "Vector2i", "Vector3", "Vector3i",
    "Vector4", "Vector4i",
];

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_unmanaged_resolution_is_deterministic_and_total() {
    let db = engine_db();
    let mut types: Vec<TypeDescriptor> = BUILTINS
        .iter()
        .chain(["bool", "int", "float", "Object", "Node", "Node2D", "Node.ProcessMode"].iter())
        .map(|name| db.resolve_by_engine_name(name, None).unwrap())
        .collect();
    types.push(TypeDescriptor::enumeration("Godot", "NeverRegistered"));
    types.push(known::make_nullable(&known::vector3()).unwrap());
    types.push(known::vector2().make_pointer());
    types.push(known::godot_array_of(&known::string()).unwrap());

    for ty in &types {
        let first = db.resolve_unmanaged(ty).unwrap();
        let second = db.resolve_unmanaged(ty).unwrap();
        assert_eq!(first, second, "{ty} resolved differently twice");
    }
}

#[test]
fn test_unregistered_non_fallback_type_has_no_mapping() {
    let db = known_db();
    let orphan = TypeDescriptor::reference("Godot", "Orphan");
    assert!(db.resolve_unmanaged(&orphan).is_err());
    assert!(db.ptr_marshaller(&orphan).is_err());
}

// =============================================================================
// Variant round trip
// =============================================================================

/// The helper family a conversion line calls: marshaller class or
/// `NativeGodotVariant` helper suffix.
fn helper_family(line: &str, marshaller: &Regex, helper: &Regex) -> Option<String> {
    if let Some(caps) = marshaller.captures(line) {
        return Some(caps[1].to_string());
    }
    helper.captures(line).map(|caps| caps[1].to_string())
}

#[test]
fn test_variant_conversions_pair_up_for_builtins() {
    let db = known_db();
    let to_marshaller = Regex::new(r"(\w+Marshaller)\.ConvertToVariant\(").unwrap();
    let from_marshaller = Regex::new(r"(\w+Marshaller)\.ConvertFromVariant\(").unwrap();
    let create = Regex::new(r"NativeGodotVariant\.CreateFrom([A-Z][A-Za-z0-9]*?)(?:Copying|TakingOwnership)?\(").unwrap();
    let convert = Regex::new(r"NativeGodotVariant\.ConvertTo([A-Z][A-Za-z0-9]*)\(").unwrap();

    for name in BUILTINS.iter().chain(["bool", "int", "float"].iter()) {
        let ty = db.resolve_by_engine_name(name, None).unwrap();
        let marshaller = db.variant_marshaller(&ty).unwrap();

        let mut writer = IndentedWriter::new();
        marshaller.write_convert_to(&mut writer, &ty, "value", "__tmp").unwrap();
        marshaller.write_convert_from(&mut writer, &ty, "__tmp", "value").unwrap();
        let out = writer.into_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{name}: {out}");

        let to = helper_family(lines[0], &to_marshaller, &create);
        let from = helper_family(lines[1], &from_marshaller, &convert);
        assert!(to.is_some(), "{name}: unrecognized conversion {}", lines[0]);
        assert_eq!(to, from, "{name} converts through mismatched helpers");
    }
}

// =============================================================================
// Taking ownership
// =============================================================================

fn convert_to(ty: TypeDescriptor) -> Signature {
    Signature::new("ConvertTo")
        .with_static(true)
        .with_parameter(Parameter::new("value", known::native_godot_variant()))
        .returning(ty)
}

#[test]
fn test_taking_ownership_skips_constructor_only_on_matching_tag() {
    let db = known_db();
    for (target, ty) in [
        ("Vector2", known::vector2()),
        ("Color", known::color()),
        ("Transform3D", known::transform3d()),
        ("StringName", known::native_godot_string_name()),
    ] {
        let (out, _) = write_body(&db, &ConvertToVariantTakingOwnership::new(target), &convert_to(ty.clone()));
        let fast_path = format!("if (value.Type == global::Godot.VariantType.{target})\n{{\n    return value.{target};\n}}\n");
        assert!(out.starts_with("// Avoid the interop call"), "{target}: {out}");
        assert!(out.contains(&fast_path), "{target}: {out}");
        assert_eq!(count(&out, "Constructor(&dest, value.GetUnsafeAddress());"), 1);
        assert!(!out.contains("VariantType.Nil"));

        let (copying, _) = write_body(&db, &ConvertToVariantCopying::new(target), &convert_to(ty));
        assert!(!copying.contains("value.Type =="));
        assert_eq!(count(&copying, "Constructor(&dest, value.GetUnsafeAddress());"), 1);
    }
}

#[test]
fn test_taking_ownership_nil_string_yields_empty_value() {
    let db = known_db();
    let (out, _) = write_body(
        &db,
        &ConvertToVariantTakingOwnership::new("String"),
        &convert_to(known::native_godot_string()),
    );
    let fast = out.find("return value.String;").unwrap();
    let nil = out.find("if (value.Type == global::Godot.VariantType.Nil)\n{\n    return default;\n}\n").unwrap();
    let constructor = out.find("_variantToStringConstructor(").unwrap();
    assert!(fast < nil && nil < constructor);
}

// =============================================================================
// Cleanup
// =============================================================================

#[test]
fn test_cleanup_runs_once_per_cleanup_marshaller() {
    let db = known_db();
    let signature = Signature::new("Format")
        .with_parameter(Parameter::new("text", known::string()))
        .with_parameter(Parameter::new("position", known::vector2()))
        .with_parameter(Parameter::new("key", known::string_name()))
        .returning(known::string());
    let (out, outline) = write_body(&db, &MethodBind::new(9), &signature);

    assert!(outline.guarded);
    assert_eq!(outline.freed, vec!["text".to_string(), "key".to_string(), "__ret".to_string()]);
    assert_eq!(count(&out, "try\n"), 1);
    assert_eq!(count(&out, "finally\n"), 1);
    assert_eq!(count(&out, ".Free("), 3);

    // Every free happens inside the finally block.
    let finally = out.find("finally\n").unwrap();
    for (at, _) in out.match_indices(".Free(") {
        assert!(at > finally);
    }
    assert!(out.find("// Calling the method.").unwrap() < finally);
}

#[test]
fn test_no_cleanup_without_cleanup_marshallers() {
    let db = known_db();
    let signature = Signature::new("Lerp")
        .with_parameter(Parameter::new("from", known::vector3()))
        .with_parameter(Parameter::new("weight", known::double()))
        .with_parameter(Parameter::new("flag", known::boolean()))
        .returning(known::vector3());
    let (out, outline) = write_body(&db, &MethodBind::new(3), &signature);
    assert!(!outline.guarded);
    assert!(outline.freed.is_empty());
    assert_eq!(count(&out, ".Free("), 0);
    assert!(!out.contains("finally"));
}

// =============================================================================
// Generated properties
// =============================================================================

/// Every number kind except `Half`, which has no C# constant form.
fn foldable_number_kinds() -> Vec<NumberKind> {
    NumberKind::ALL.into_iter().filter(|kind| *kind != NumberKind::Half).collect()
}

#[test]
fn test_half_defaults_are_assigned_at_runtime() {
    let db = known_db();
    let plan = apply_default_value(&db, &known::half(), "0.5").unwrap();
    assert!(plan.needs_runtime_assignment);
    assert_eq!(plan.parameter_type, known::make_nullable(&known::half()).unwrap());
}

proptest! {
    #[test]
    fn test_vararg_layout_preserves_order(fixed in 0usize..8, variadic in 0usize..24) {
        let layout = VarargLayout::new(fixed, variadic);
        let total = fixed + variadic;
        match layout.buffer() {
            VarargBuffer::Inline { capacity } => {
                prop_assert!(total <= VARARG_SPAN_THRESHOLD);
                prop_assert_eq!(capacity, VARARG_SPAN_THRESHOLD);
            }
            VarargBuffer::Heap { len } => {
                prop_assert!(total > VARARG_SPAN_THRESHOLD);
                prop_assert_eq!(len, total);
            }
        }

        let slots = layout.slots();
        prop_assert_eq!(slots.len(), total);
        for (i, slot) in slots.iter().enumerate() {
            let expected = if i < fixed { ArgumentSlot::Fixed(i) } else { ArgumentSlot::Variadic(i - fixed) };
            prop_assert_eq!(*slot, expected);
        }
    }

    #[test]
    fn test_foldable_defaults_are_never_wrapped(value in 0i64..=100, kind in prop::sample::select(foldable_number_kinds())) {
        let db = known_db();
        let ty = kind.descriptor();
        prop_assert!(is_constant_foldable(&ty));

        let plan = apply_default_value(&db, &ty, &value.to_string()).unwrap();
        prop_assert_eq!(&plan.parameter_type, &ty);
        prop_assert!(!plan.needs_runtime_assignment);
        prop_assert!(plan.declared_value.is_some());
    }

    #[test]
    fn test_foldable_enum_defaults_are_never_wrapped(value in any::<i32>()) {
        let db = known_db();
        let ty = TypeDescriptor::enumeration("Godot", "Node.ProcessMode");
        let plan = apply_default_value(&db, &ty, &value.to_string()).unwrap();
        prop_assert_eq!(plan.parameter_type, ty);
        prop_assert_eq!(plan.declared_value, Some(format!("{value}L")));
        prop_assert!(!plan.needs_runtime_assignment);
    }

    #[test]
    fn test_int64_literals_get_long_suffix(value in any::<i64>()) {
        prop_assert_eq!(NumberKind::Int64.format(&value.to_string()), Some(format!("{value}L")));
    }

    #[test]
    fn test_out_of_range_byte_literals_rejected(value in 256u32..100_000) {
        prop_assert_eq!(NumberKind::Byte.format(&value.to_string()), None);
        prop_assert_eq!(NumberKind::UInt32.format(&value.to_string()), Some(format!("{value}U")));
    }

    #[test]
    fn test_single_literals_accept_c_suffix(value in -1.0e6f32..1.0e6f32) {
        let plain = NumberKind::Single.format(&value.to_string());
        let suffixed = NumberKind::Single.format(&format!("{value}f"));
        prop_assert_eq!(plain.clone(), Some(format!("{value}f")));
        prop_assert_eq!(plain, suffixed);
    }
}
