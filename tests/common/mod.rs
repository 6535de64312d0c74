//! Common test utilities and fixtures.
//!
//! This module provides shared registries, drivers and member descriptors
//! to reduce duplication across the test suite.

#![allow(dead_code)]

use gdmarshal::body::{BodyOutline, MethodBody, Signature};
use gdmarshal::registry::{
    register_engine_classes, register_engine_enums, register_known_types, EngineClass, KnownTypeOptions,
};
use gdmarshal::{Driver, GeneratorConfig, IndentedWriter, MemberDescriptor, TypeDb, TypeDbBuilder};

// =============================================================================
// Configuration
// =============================================================================

/// A small engine class hierarchy and one enum.
pub const ENGINE_CONFIG: &str = r#"
[types]
enums = ["Node.ProcessMode"]

[[types.engine_classes]]
name = "Node"
base = "Object"

[[types.engine_classes]]
name = "CanvasItem"
base = "Node"

[[types.engine_classes]]
name = "Node2D"
base = "CanvasItem"

[[types.engine_classes]]
name = "RefCounted"
base = "Object"
"#;

/// Parsed [`ENGINE_CONFIG`].
pub fn engine_config() -> GeneratorConfig {
    GeneratorConfig::from_str(ENGINE_CONFIG).unwrap()
}

// =============================================================================
// Registries
// =============================================================================

/// Known types only.
pub fn known_db() -> TypeDb {
    let mut builder = TypeDbBuilder::new();
    register_known_types(&mut builder, &KnownTypeOptions::default()).unwrap();
    builder.build()
}

/// Known types plus the classes of [`ENGINE_CONFIG`].
pub fn engine_db() -> TypeDb {
    let mut builder = TypeDbBuilder::new();
    register_known_types(&mut builder, &KnownTypeOptions::default()).unwrap();
    register_engine_classes(
        &mut builder,
        &[
            EngineClass::new("Node").inheriting("Object"),
            EngineClass::new("CanvasItem").inheriting("Node"),
            EngineClass::new("Node2D").inheriting("CanvasItem"),
        ],
    )
    .unwrap();
    register_engine_enums(&mut builder, &["Node.ProcessMode"]).unwrap();
    builder.build()
}

/// A driver over [`ENGINE_CONFIG`].
pub fn driver() -> Driver {
    Driver::new(&engine_config()).unwrap()
}

// =============================================================================
// Helpers
// =============================================================================

/// Write `body` for `signature`, returning the text and the outline.
pub fn write_body(db: &TypeDb, body: &dyn MethodBody, signature: &Signature) -> (String, BodyOutline) {
    let mut writer = IndentedWriter::new();
    let outline = body.write(db, signature, &mut writer).unwrap();
    (writer.into_string(), outline)
}

/// Parse a JSON array of member descriptors.
pub fn members(json: &str) -> Vec<MemberDescriptor> {
    serde_json::from_str(json).unwrap()
}

/// Number of non-overlapping occurrences of `needle`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// The text between the first line equal to `start` and the next blank line.
pub fn section<'a>(text: &'a str, start: &str) -> &'a str {
    let Some(begin) = text.find(start) else {
        return "";
    };
    let rest = &text[begin..];
    match rest.find("\n\n") {
        Some(end) => &rest[..end + 1],
        None => rest,
    }
}
