//! Default parameter values.
//!
//! The engine describes defaults as literals in its own syntax
//! (`Vector2(0, 0)`, `&"idle"`, `NodePath("")`). This module translates them
//! into C# expressions, decides whether they can be declared as
//! compile-time constants, and emits the in-body reassignment for those
//! that cannot.
//!
//! # Module Organization
//!
//! - [`parser`] - [`DefaultValueParser`] and the literal grammars
//!
//! # Example
//!
//! ```ignore
//! let plan = apply_default_value(&db, &known::vector2(), "Vector2(1, 2)")?;
//! assert_eq!(plan.declared_value.as_deref(), Some("default"));
//! assert!(plan.needs_runtime_assignment);
//! assert!(plan.parameter_type.is_optional());
//! ```

pub mod parser;

pub use parser::{DefaultValueParser, NumberKind, VectorShape};

use gdmarshal_writer::{escape_identifier, IndentedWriter};
use thiserror::Error;

use crate::body::Parameter;
use crate::registry::TypeDb;
use crate::types::{known, TypeDescriptor, TypeError};

/// The neutral expression: the value an unassigned parameter already has.
pub const DEFAULT_EXPRESSION: &str = "default";

/// Errors from translating default value literals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefaultValueError {
    #[error("Value '{literal}' can't be used as a default value for type '{ty}'.")]
    NoParser { literal: String, ty: String },

    #[error("Value '{literal}' can't be used as a default value for '{ty}'.")]
    Unparseable { literal: String, ty: String },

    #[error("Value '{literal}' is not a valid '{ty}'.")]
    InvalidNumber { literal: String, ty: String },

    #[error("Type '{ty}' is not compatible with the {parser} default value parser.")]
    IncompatibleType { ty: String, parser: &'static str },

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl TypeDb {
    /// Translate `literal` into a C# expression of type `ty`.
    ///
    /// An empty literal means "no default" and yields `None`.
    pub fn default_value_expression(&self, ty: &TypeDescriptor, literal: &str) -> Result<Option<String>, DefaultValueError> {
        if literal.is_empty() {
            return Ok(None);
        }
        if let Some(parser) = self.default_parser(ty) {
            return parser.parse(literal, self).map(Some);
        }
        if ty.is_reference_type() && literal == "null" {
            return Ok(Some(DEFAULT_EXPRESSION.to_string()));
        }
        Err(DefaultValueError::NoParser {
            literal: literal.to_string(),
            ty: ty.full_name(),
        })
    }
}

/// Whether values of `ty` can appear as C# constant expressions.
pub fn is_constant_foldable(ty: &TypeDescriptor) -> bool {
    ty.is_enum()
        || [
            known::sbyte(),
            known::byte(),
            known::int16(),
            known::uint16(),
            known::int32(),
            known::uint32(),
            known::int64(),
            known::uint64(),
            known::character(),
            known::single(),
            known::double(),
            known::decimal(),
            known::boolean(),
            known::string(),
        ]
        .contains(ty)
}

/// Whether a non-constant default for `ty` should turn the parameter into
/// `Nullable<ty>` so "not passed" can be told apart from any real value.
fn should_wrap_in_optional(ty: &TypeDescriptor) -> bool {
    // Variant already has a nil state; ref structs can't be type arguments.
    !is_constant_foldable(ty) && *ty != known::variant() && ty.is_value_type() && !ty.is_by_ref_like()
}

/// How a parameter with an engine default value is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefault {
    /// The parameter type, possibly wrapped in `Nullable<T>`.
    pub parameter_type: TypeDescriptor,
    /// The expression after `=` in the signature, if any.
    pub declared_value: Option<String>,
    /// Whether the body must assign the real default when the argument was omitted.
    pub needs_runtime_assignment: bool,
}

/// Plan the declaration of a parameter of type `ty` whose engine default is `literal`.
pub fn apply_default_value(db: &TypeDb, ty: &TypeDescriptor, literal: &str) -> Result<ParameterDefault, DefaultValueError> {
    let Some(expression) = db.default_value_expression(ty, literal)? else {
        return Ok(ParameterDefault {
            parameter_type: ty.clone(),
            declared_value: None,
            needs_runtime_assignment: false,
        });
    };

    if expression == DEFAULT_EXPRESSION || is_constant_foldable(ty) {
        return Ok(ParameterDefault {
            parameter_type: ty.clone(),
            declared_value: Some(expression),
            needs_runtime_assignment: false,
        });
    }

    let parameter_type = if should_wrap_in_optional(ty) {
        known::make_nullable(ty)?
    } else {
        ty.clone()
    };
    Ok(ParameterDefault {
        parameter_type,
        declared_value: Some(DEFAULT_EXPRESSION.to_string()),
        needs_runtime_assignment: true,
    })
}

/// Emit the reassignment of every parameter whose default could not be
/// declared in the signature.
pub fn write_default_parameter_values(
    writer: &mut IndentedWriter,
    db: &TypeDb,
    parameters: &[Parameter],
) -> Result<(), DefaultValueError> {
    for parameter in parameters {
        let Some(literal) = parameter.engine_default() else {
            continue;
        };
        let Some(expression) = db.default_value_expression(parameter.ty(), literal)? else {
            continue;
        };
        if expression == DEFAULT_EXPRESSION || is_constant_foldable(parameter.ty()) {
            continue;
        }

        let name = escape_identifier(parameter.name());
        let ty = parameter.ty();
        if ty.is_reference_type() || ty.is_optional() {
            writer.write_line(&format!("{name} ??= {expression};"));
        } else {
            let condition = if *ty == known::variant() {
                format!("{name}.VariantType == global::Godot.VariantType.Nil")
            } else {
                format!("!{name}.IsAllocated")
            };
            writer.write_line(&format!("if ({condition})"));
            writer.open_block();
            writer.write_line(&format!("{name} = {expression};"));
            writer.close_block();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{register_known_types, KnownTypeOptions, TypeDbBuilder};

    fn db() -> TypeDb {
        let mut builder = TypeDbBuilder::new();
        register_known_types(&mut builder, &KnownTypeOptions::default()).unwrap();
        builder.build()
    }

    #[test]
    fn test_empty_literal_has_no_default() {
        let db = db();
        assert_eq!(db.default_value_expression(&known::int32(), "").unwrap(), None);
        let plan = apply_default_value(&db, &known::vector2(), "").unwrap();
        assert_eq!(plan.declared_value, None);
        assert!(!plan.needs_runtime_assignment);
    }

    #[test]
    fn test_null_for_reference_without_parser() {
        let db = db();
        let node = TypeDescriptor::reference("Godot", "Node");
        assert_eq!(db.default_value_expression(&node, "null").unwrap().as_deref(), Some("default"));
        let err = db.default_value_expression(&node, "1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value '1' can't be used as a default value for type 'Godot.Node'."
        );
    }

    #[test]
    fn test_enum_uses_system_enum_parser() {
        let db = db();
        let mode = TypeDescriptor::enumeration("Godot", "Mode");
        assert_eq!(db.default_value_expression(&mode, "2").unwrap().as_deref(), Some("2L"));
    }

    #[test]
    fn test_foldable_is_never_wrapped() {
        let db = db();
        let plan = apply_default_value(&db, &known::int32(), "5").unwrap();
        assert_eq!(plan.parameter_type, known::int32());
        assert_eq!(plan.declared_value.as_deref(), Some("5"));
        assert!(!plan.needs_runtime_assignment);

        let plan = apply_default_value(&db, &known::string(), "\"hello\"").unwrap();
        assert_eq!(plan.declared_value.as_deref(), Some("\"hello\""));
    }

    #[test]
    fn test_neutral_default_declares_default() {
        let db = db();
        let plan = apply_default_value(&db, &known::vector2(), "Vector2(0, 0)").unwrap();
        assert_eq!(plan.parameter_type, known::vector2());
        assert_eq!(plan.declared_value.as_deref(), Some("default"));
        assert!(!plan.needs_runtime_assignment);
    }

    #[test]
    fn test_non_neutral_value_type_is_wrapped() {
        let db = db();
        let plan = apply_default_value(&db, &known::vector2(), "Vector2(1, 2)").unwrap();
        assert_eq!(plan.parameter_type, known::make_nullable(&known::vector2()).unwrap());
        assert_eq!(plan.declared_value.as_deref(), Some("default"));
        assert!(plan.needs_runtime_assignment);
    }

    #[test]
    fn test_exempt_types_are_not_wrapped() {
        let db = db();
        let plan = apply_default_value(&db, &known::string_name(), "&\"idle\"").unwrap();
        assert_eq!(plan.parameter_type, known::string_name());
        assert!(plan.needs_runtime_assignment);

        let plan = apply_default_value(&db, &known::native_godot_string(), "\"x\"").unwrap();
        assert_eq!(plan.parameter_type, known::native_godot_string());
        assert!(plan.needs_runtime_assignment);
    }

    #[test]
    fn test_runtime_assignment_forms() {
        let db = db();
        let optional = known::make_nullable(&known::vector2()).unwrap();
        let parameters = [
            Parameter::new("offset", optional).with_default("Vector2(1, 2)"),
            Parameter::new("name", known::string_name()).with_default("&\"idle\""),
            Parameter::new("count", known::int32()).with_default("3"),
            Parameter::new("value", known::native_godot_string()).with_default("\"x\""),
            Parameter::new("origin", known::vector2()).with_default("Vector2(0, 0)"),
        ];
        let mut writer = IndentedWriter::new();
        write_default_parameter_values(&mut writer, &db, &parameters).unwrap();
        assert_eq!(
            writer.as_str(),
            "offset ??= new global::Godot.Vector2(1f, 2f);\n\
             name ??= global::Godot.StringName.CreateFromUtf8(\"idle\"u8);\n\
             if (!value.IsAllocated)\n\
             {\n\
             \x20   value = global::Godot.NativeInterop.NativeGodotString.Create(\"x\"u8);\n\
             }\n"
        );
    }

    #[test]
    fn test_variant_runtime_assignment_uses_nil_check() {
        let mut builder = TypeDbBuilder::new();
        builder
            .register_default_parser(known::variant(), DefaultValueParser::Boolean)
            .unwrap();
        let db = builder.build();
        let parameters = [Parameter::new("flag", known::variant()).with_default("true")];
        let mut writer = IndentedWriter::new();
        write_default_parameter_values(&mut writer, &db, &parameters).unwrap();
        assert_eq!(
            writer.as_str(),
            "if (flag.VariantType == global::Godot.VariantType.Nil)\n{\n    flag = true;\n}\n"
        );
    }

    #[test]
    fn test_keyword_parameter_is_escaped() {
        let db = db();
        let parameters = [Parameter::new("base", known::string_name()).with_default("&\"a\"")];
        let mut writer = IndentedWriter::new();
        write_default_parameter_values(&mut writer, &db, &parameters).unwrap();
        assert_eq!(
            writer.as_str(),
            "@base ??= global::Godot.StringName.CreateFromUtf8(\"a\"u8);\n"
        );
    }
}
