//! End-to-end resolution and synthesis scenarios.

mod common;

use common::{count, driver, engine_db, known_db, members, section};
use gdmarshal::body::{ArgumentSlot, Phase, VarargBuffer, VarargLayout};
use gdmarshal::types::known;
use gdmarshal::{apply_default_value, TypeDescriptor};

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_undeclared_enum_resolves_through_fallback() {
    let db = known_db();
    assert_eq!(db.synthesized_count(), 0);

    let ty = db.resolve_by_engine_name("enum::MyEnum", None).unwrap();
    assert!(ty.is_enum());
    assert_eq!(ty, TypeDescriptor::enumeration("Godot", "MyEnum"));
    assert_eq!(db.resolve_unmanaged(&ty).unwrap(), known::int64());
    db.ptr_marshaller(&ty).unwrap();
    db.variant_marshaller(&ty).unwrap();
    assert_eq!(db.synthesized_count(), 1);

    // Cached on the second lookup.
    assert_eq!(db.resolve_by_engine_name("enum::MyEnum", None).unwrap(), ty);
    assert_eq!(db.synthesized_count(), 1);
}

#[test]
fn test_typed_array_synthesized_then_cached() {
    let db = engine_db();
    let node = db.resolve_by_engine_name("Node", None).unwrap();

    let first = db.resolve_by_engine_name("typedarray::Node", None).unwrap();
    assert_eq!(first, known::godot_array_of(&node).unwrap());
    assert_eq!(db.resolve_unmanaged(&first).unwrap(), known::native_godot_array());
    assert_eq!(db.synthesized_count(), 1);

    let second = db.resolve_by_engine_name("typedarray::Node", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(db.synthesized_count(), 1);
}

#[test]
fn test_engine_subclass_marshals_through_base() {
    let db = engine_db();
    let node2d = db.resolve_by_engine_name("Node2D", None).unwrap();
    assert_eq!(node2d.base().map(|b| b.name()), Some("CanvasItem"));
    assert_eq!(db.resolve_unmanaged(&node2d).unwrap(), known::int_ptr());
    db.ptr_marshaller(&node2d).unwrap();
    db.variant_marshaller(&node2d).unwrap();
}

// =============================================================================
// Ptrcall
// =============================================================================

#[test]
fn test_three_parameter_method_without_cleanup() {
    let driver = driver();
    let report = driver
        .synthesize(&members(
            r#"[{
                "name": "MoveToward",
                "engine_name": "move_toward",
                "class": "Node2D",
                "kind": "method_bind",
                "hash": 1234,
                "arguments": [
                    { "name": "target", "type": "Vector2" },
                    { "name": "delta", "type": "float" },
                    { "name": "steps", "type": "int" }
                ],
                "return_value": { "type": "Vector2" }
            }]"#,
        ))
        .unwrap();
    assert!(report.is_complete());
    let member = &report.members[0];

    assert_eq!(
        member.outline.phases,
        vec![Phase::Setup, Phase::MarshalIn, Phase::Invoke, Phase::MarshalOut]
    );
    assert!(!member.outline.guarded);
    assert!(member.outline.freed.is_empty());

    let setup = section(&member.body, "// Setup - Perform required setup.");
    assert!(setup.contains(
        "global::Godot.NativeInterop.MethodBind.GetAndCacheMethodBind(ref _MoveToward_MethodBind, NativeName, MethodName.MoveToward, 1234L);\n"
    ));
    assert!(setup.contains("void** __args = stackalloc void*[3];\n"));

    let marshal = section(&member.body, "// Marshalling - Convert managed data to native data.");
    assert_eq!(count(marshal, "__args["), 3);
    assert!(marshal.contains("__args[0] = &target;\n"));
    assert!(marshal.contains("__args[2] = &steps;\n"));

    assert!(member.body.contains("// Calling the method.\n"));
    assert!(member.body.ends_with("return __ret;\n"));
    assert!(!member.body.contains("try"));
    assert!(!member.body.contains("finally"));
}

// =============================================================================
// Vararg
// =============================================================================

#[test]
fn test_twelve_arguments_select_heap_buffer() {
    let layout = VarargLayout::new(2, 10);
    assert_eq!(layout.buffer(), VarargBuffer::Heap { len: 12 });
    let slots = layout.slots();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0], ArgumentSlot::Fixed(0));
    assert_eq!(slots[1], ArgumentSlot::Fixed(1));
    assert_eq!(slots[2], ArgumentSlot::Variadic(0));
    assert_eq!(slots[11], ArgumentSlot::Variadic(9));

    assert_eq!(VarargLayout::new(2, 8).buffer(), VarargBuffer::Inline { capacity: 10 });
}

#[test]
fn test_vararg_body_sizes_spans_at_runtime() {
    let driver = driver();
    let report = driver
        .synthesize(&members(
            r#"[{
                "name": "CallDeferred",
                "class": "Node",
                "kind": "method_bind",
                "hash": 3400424181,
                "is_vararg": true,
                "arguments": [
                    { "name": "method", "type": "StringName" },
                    { "name": "mode", "type": "int" }
                ],
                "return_value": { "type": "Variant" }
            }]"#,
        ))
        .unwrap();
    let member = &report.members[0];
    let body = &member.body;

    assert_eq!(member.parameters.last().map(|p| p.name.as_str()), Some("args"));
    assert!(body.contains("int __argsCount = 2 + args.Length;\n"));
    assert!(body.contains("const int VarArgsSpanThreshold = 10;\n"));
    assert!(body.contains(": new nint[__argsCount];\n"));
    assert!(body.contains("? stackalloc nint[VarArgsSpanThreshold]\n"));

    // Fixed arguments first, then the variadic elements.
    let fixed = body.find("__args[1] = ").unwrap();
    let variadic = body.find("__args[2 + i] = ").unwrap();
    assert!(fixed < variadic);
    assert!(body.contains("object_method_bind_call("));
}

// =============================================================================
// Default values
// =============================================================================

#[test]
fn test_vector_default_becomes_runtime_assignment() {
    let db = known_db();
    let plan = apply_default_value(&db, &known::vector2(), "Vector2(1, 2)").unwrap();
    assert!(plan.parameter_type.is_optional());
    assert_eq!(plan.parameter_type.optional_inner(), Some(&known::vector2()));
    assert_eq!(plan.declared_value.as_deref(), Some("default"));
    assert!(plan.needs_runtime_assignment);

    let driver = driver();
    let report = driver
        .synthesize(&members(
            r#"[{
                "name": "Translate",
                "class": "Node2D",
                "kind": "method_bind",
                "hash": 743155724,
                "arguments": [
                    { "name": "offset", "type": "Vector2", "default_value": "Vector2(1, 2)" }
                ]
            }]"#,
        ))
        .unwrap();
    let member = &report.members[0];
    assert_eq!(member.parameters[0].ty, known::make_nullable(&known::vector2()).unwrap());
    assert_eq!(member.parameters[0].default.as_deref(), Some("default"));
    assert!(member.body.contains("offset ??= new global::Godot.Vector2(1f, 2f);\n"));
}

#[test]
fn test_failures_do_not_stop_the_batch() {
    let driver = driver();
    let report = driver
        .synthesize(&members(
            r#"[
                { "name": "Broken", "class": "Node", "kind": "method_bind",
                  "arguments": [{ "name": "thing", "type": "Missing" }] },
                { "name": "GetName", "class": "Node", "kind": "method_bind", "hash": 2002593661,
                  "return_value": { "type": "StringName" } }
            ]"#,
        ))
        .unwrap();
    assert_eq!(report.members.len(), 1);
    assert_eq!(report.members[0].name, "GetName");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].member, "Node.Broken");
    assert!(!report.is_complete());
}
