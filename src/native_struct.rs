//! Native structures: plain C structs the engine exchanges by pointer,
//! described by a compact format string:
//!
//! ```text
//! Vector2 position;Object *collider;int shape = -1;Glyph glyphs[32]
//! ```
//!
//! Fields are separated by `;`. Each field is a C type name, a field name
//! (optionally followed by a fixed array length) and an optional
//! `= default` in C syntax.

use gdmarshal_writer::IndentedWriter;
use thiserror::Error;

use crate::defaults::DefaultValueError;
use crate::registry::{ResolveError, TypeDb};
use crate::types::{known, TypeDescriptor, TypeError};

/// Errors from parsing or resolving a native structure format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeStructureError {
    #[error("Invalid native structure format, expected space character after type name (buffer: '{0}').")]
    MissingTypeSeparator(String),

    #[error("Invalid native structure format, expected field name after type name (buffer: '{0}').")]
    MissingFieldName(String),

    #[error("Invalid native structure format, expected array size after field name (buffer: '{0}').")]
    MissingArrayBracket(String),

    #[error("Invalid native structure format, invalid array size '{size}' for field '{field}'.")]
    InvalidArrayLength { field: String, size: String },

    #[error("Invalid native structure format, expected default value after field name (buffer: '{0}').")]
    MissingDefault(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    DefaultValue(#[from] DefaultValueError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// A field as written in the format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeStructureField<'a> {
    /// C type name, including a `" *"` pointer suffix.
    pub ty: &'a str,
    pub name: &'a str,
    /// Fixed array length, for `name[len]` fields.
    pub array_len: Option<usize>,
    /// Default value literal in C syntax.
    pub default: Option<&'a str>,
}

/// Split `format` into its fields.
pub fn parse_native_structure(format: &str) -> Result<Vec<NativeStructureField<'_>>, NativeStructureError> {
    format.split(';').map(parse_field).collect()
}

fn parse_field(buffer: &str) -> Result<NativeStructureField<'_>, NativeStructureError> {
    let Some(space) = buffer.find(' ') else {
        return Err(NativeStructureError::MissingTypeSeparator(buffer.to_string()));
    };
    // A `*` right after the space belongs to the type.
    let type_end = if buffer.get(space + 1..space + 2) == Some("*") { space + 2 } else { space };
    let ty = buffer.get(..type_end).unwrap_or_default();
    let rest = buffer.get(type_end..).unwrap_or_default();
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    let (name, rest) = rest.split_once(' ').unwrap_or((rest, ""));
    if name.is_empty() {
        return Err(NativeStructureError::MissingFieldName(buffer.to_string()));
    }

    let (name, array_len) = match name.strip_suffix(']') {
        Some(sized) => {
            let Some((name, size)) = sized.rsplit_once('[') else {
                return Err(NativeStructureError::MissingArrayBracket(format!("({ty}) {name}")));
            };
            let len = size.parse::<usize>().map_err(|_| NativeStructureError::InvalidArrayLength {
                field: name.to_string(),
                size: size.to_string(),
            })?;
            (name, Some(len))
        }
        None => (name, None),
    };

    let default = if rest.is_empty() {
        None
    } else {
        match rest.strip_prefix("= ") {
            Some(value) if !value.is_empty() => Some(value),
            _ => return Err(NativeStructureError::MissingDefault(rest.to_string())),
        }
    };

    Ok(NativeStructureField {
        ty,
        name,
        array_len,
        default,
    })
}

/// A field with its managed type and default expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    pub ty: TypeDescriptor,
    pub default: Option<String>,
}

/// Parse `format` and resolve every field against `db`.
///
/// Type names are looked up with themselves as metadata, so `int` is the
/// 32-bit C int and `float` the 32-bit float. Fixed arrays become
/// `InlineArray{n}<T>`.
pub fn resolve_native_structure(db: &TypeDb, format: &str) -> Result<Vec<ResolvedField>, NativeStructureError> {
    parse_native_structure(format)?
        .into_iter()
        .map(|field| {
            let engine_name = field.ty.replace("::", ".");
            let mut ty = db.resolve_by_engine_name(&engine_name, Some(&engine_name))?;
            if let Some(len) = field.array_len {
                ty = known::inline_array_of(len, &ty)?;
            }
            let default = match field.default {
                Some(literal) => db.default_value_expression(&ty, literal)?,
                None => None,
            };
            Ok(ResolvedField {
                name: field.name.to_string(),
                ty,
                default,
            })
        })
        .collect()
}

/// Emit the body of the structure's `Default` property: a `new()` with
/// every field that declares a default initialized to it.
pub fn write_default_initializer(fields: &[ResolvedField], writer: &mut IndentedWriter) {
    let defaults: Vec<(&str, &str)> = fields
        .iter()
        .filter_map(|field| Some((field.name.as_str(), field.default.as_deref()?)))
        .collect();
    if defaults.is_empty() {
        writer.write_line("return new();");
        return;
    }
    writer.write_line("return new()");
    writer.open_block();
    for (name, value) in defaults {
        writer.write_line(&format!("{name} = {value},"));
    }
    writer.close_block_with(";");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{register_known_types, FloatPrecision, KnownTypeOptions, TypeDbBuilder};

    fn db(float_precision: FloatPrecision) -> TypeDb {
        let mut builder = TypeDbBuilder::new();
        register_known_types(&mut builder, &KnownTypeOptions { float_precision }).unwrap();
        builder
            .register_name("RID", TypeDescriptor::value("Godot", "Rid"))
            .unwrap();
        builder
            .register_name(
                "TextServer.Direction",
                TypeDescriptor::enumeration("Godot", "TextServer.Direction"),
            )
            .unwrap();
        builder
            .register_name(
                "PhysicsServer3DExtensionMotionCollision",
                TypeDescriptor::value("Godot", "PhysicsServer3DExtensionMotionCollision"),
            )
            .unwrap();
        builder.build()
    }

    fn field<'a>(ty: &'a str, name: &'a str) -> NativeStructureField<'a> {
        NativeStructureField {
            ty,
            name,
            array_len: None,
            default: None,
        }
    }

    #[test]
    fn test_parse_simple() {
        let fields = parse_native_structure("float left;float right").unwrap();
        assert_eq!(fields, vec![field("float", "left"), field("float", "right")]);
    }

    #[test]
    fn test_parse_defaults_pointers_and_arrays() {
        let fields = parse_native_structure("int start = -1;float x_off = 0.f;Object *collider;Vector3 points[32]").unwrap();
        assert_eq!(
            fields,
            vec![
                NativeStructureField {
                    default: Some("-1"),
                    ..field("int", "start")
                },
                NativeStructureField {
                    default: Some("0.f"),
                    ..field("float", "x_off")
                },
                field("Object *", "collider"),
                NativeStructureField {
                    array_len: Some(32),
                    ..field("Vector3", "points")
                },
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_native_structure("int32_tfield_one"),
            Err(NativeStructureError::MissingTypeSeparator(_))
        ));
        assert!(matches!(
            parse_native_structure("int32_t field_one[]"),
            Err(NativeStructureError::InvalidArrayLength { .. })
        ));
        assert!(matches!(
            parse_native_structure("int32_t field_one]"),
            Err(NativeStructureError::MissingArrayBracket(_))
        ));
        assert!(matches!(
            parse_native_structure("int32_t field_one ="),
            Err(NativeStructureError::MissingDefault(_))
        ));
        assert!(matches!(
            parse_native_structure("int32_t field_one = "),
            Err(NativeStructureError::MissingDefault(_))
        ));
        assert!(matches!(
            parse_native_structure("int32_t "),
            Err(NativeStructureError::MissingFieldName(_))
        ));
    }

    #[test]
    fn test_resolve_glyph_like_structure() {
        let db = db(FloatPrecision::Single);
        let fields = resolve_native_structure(
            &db,
            "int start = -1;uint8_t count = 0;float x_off = 0.f;RID font_rid;int32_t index = 0",
        )
        .unwrap();
        let summary: Vec<(String, String, Option<String>)> = fields
            .into_iter()
            .map(|f| (f.name, f.ty.full_name(), f.default))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("start".to_string(), "System.Int32".to_string(), Some("-1".to_string())),
                ("count".to_string(), "System.Byte".to_string(), Some("0".to_string())),
                ("x_off".to_string(), "System.Single".to_string(), Some("0f".to_string())),
                ("font_rid".to_string(), "Godot.Rid".to_string(), None),
                ("index".to_string(), "System.Int32".to_string(), Some("0".to_string())),
            ]
        );
    }

    #[test]
    fn test_resolve_namespaced_pointer_and_array_types() {
        let db = db(FloatPrecision::Double);
        let fields = resolve_native_structure(
            &db,
            "TextServer::Direction direction;Object *collider;real_t depth;ObjectID id;PhysicsServer3DExtensionMotionCollision collisions[4]",
        )
        .unwrap();
        let types: Vec<String> = fields.iter().map(|f| f.ty.full_name()).collect();
        assert_eq!(
            types,
            vec![
                "Godot.TextServer.Direction".to_string(),
                "Godot.GodotObject*".to_string(),
                "System.Double".to_string(),
                "System.UInt64".to_string(),
                "System.Runtime.CompilerServices.InlineArray4<Godot.PhysicsServer3DExtensionMotionCollision>"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_unsupported_array_length() {
        let db = db(FloatPrecision::Single);
        assert_eq!(
            resolve_native_structure(&db, "PhysicsServer3DExtensionMotionCollision collisions[32]"),
            Err(NativeStructureError::Type(TypeError::InlineArrayLength(32)))
        );
    }

    #[test]
    fn test_resolve_unknown_type() {
        let db = db(FloatPrecision::Single);
        assert!(matches!(
            resolve_native_structure(&db, "Mystery value"),
            Err(NativeStructureError::Resolve(ResolveError::UnknownEngineType(_)))
        ));
    }

    #[test]
    fn test_default_initializer() {
        let db = db(FloatPrecision::Single);
        let fields = resolve_native_structure(&db, "int start = -1;RID rid;int end = -1").unwrap();
        let mut writer = IndentedWriter::new();
        write_default_initializer(&fields, &mut writer);
        assert_eq!(writer.as_str(), "return new()\n{\n    start = -1,\n    end = -1,\n};\n");

        let fields = resolve_native_structure(&db, "RID rid").unwrap();
        let mut writer = IndentedWriter::new();
        write_default_initializer(&fields, &mut writer);
        assert_eq!(writer.as_str(), "return new();\n");
    }
}
