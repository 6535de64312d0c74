//! Parsers that turn an engine default value literal into a C# expression.

use std::sync::LazyLock;

use regex::Regex;

use super::{DefaultValueError, DEFAULT_EXPRESSION};
use crate::registry::TypeDb;
use crate::types::{known, TypeDescriptor};

/// `Name(args)`. The `A-z` range also covers `[` and `]`, so typed array
/// constructors such as `Array[Node]([])` match too.
static CONSTRUCTOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?<type_name>[A-z0-9]+)\((?<args>.*)\)$").ok());

/// Split a constructor expression into its type name and trimmed arguments.
pub(crate) fn parse_constructor(literal: &str) -> Option<(&str, Vec<&str>)> {
    let captures = CONSTRUCTOR.as_ref()?.captures(literal)?;
    let type_name = captures.name("type_name")?.as_str();
    let args = captures.name("args")?.as_str();
    let args = if args.is_empty() {
        Vec::new()
    } else {
        args.split(',').map(str::trim).collect()
    };
    Some((type_name, args))
}

/// The numeric types a [`DefaultValueParser::Number`] can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Half,
    Single,
    Double,
}

impl NumberKind {
    pub const ALL: [NumberKind; 11] = [
        NumberKind::SByte,
        NumberKind::Byte,
        NumberKind::Int16,
        NumberKind::UInt16,
        NumberKind::Int32,
        NumberKind::UInt32,
        NumberKind::Int64,
        NumberKind::UInt64,
        NumberKind::Half,
        NumberKind::Single,
        NumberKind::Double,
    ];

    pub fn descriptor(self) -> TypeDescriptor {
        match self {
            NumberKind::SByte => known::sbyte(),
            NumberKind::Byte => known::byte(),
            NumberKind::Int16 => known::int16(),
            NumberKind::UInt16 => known::uint16(),
            NumberKind::Int32 => known::int32(),
            NumberKind::UInt32 => known::uint32(),
            NumberKind::Int64 => known::int64(),
            NumberKind::UInt64 => known::uint64(),
            NumberKind::Half => known::half(),
            NumberKind::Single => known::single(),
            NumberKind::Double => known::double(),
        }
    }

    /// Parse `literal` and render it with the C# suffix for this kind.
    pub fn format(self, literal: &str) -> Option<String> {
        let literal = literal.trim();
        // Native structure defaults use C syntax, so floats may end with 'f'.
        let literal = match self {
            NumberKind::Single | NumberKind::Double => literal.strip_suffix('f').unwrap_or(literal),
            _ => literal,
        };
        let formatted = match self {
            NumberKind::SByte => literal.parse::<i8>().ok()?.to_string(),
            NumberKind::Byte => literal.parse::<u8>().ok()?.to_string(),
            NumberKind::Int16 => literal.parse::<i16>().ok()?.to_string(),
            NumberKind::UInt16 => literal.parse::<u16>().ok()?.to_string(),
            NumberKind::Int32 => literal.parse::<i32>().ok()?.to_string(),
            NumberKind::UInt32 => format!("{}U", literal.parse::<u32>().ok()?),
            NumberKind::Int64 => format!("{}L", literal.parse::<i64>().ok()?),
            NumberKind::UInt64 => format!("{}UL", literal.parse::<u64>().ok()?),
            NumberKind::Half => format!(
                "({})({})",
                known::half().full_name_with_global(),
                literal.parse::<f32>().ok()?
            ),
            NumberKind::Single => format!("{}f", literal.parse::<f32>().ok()?),
            NumberKind::Double => format!("{}D", literal.parse::<f64>().ok()?),
        };
        Some(formatted)
    }
}

/// Shape of a vector-like built-in: its engine constructor name and components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorShape {
    pub engine_name: &'static str,
    pub component: NumberKind,
    pub count: usize,
}

impl VectorShape {
    fn of(ty: &TypeDescriptor) -> Option<Self> {
        if ty.namespace() != Some("Godot") {
            return None;
        }
        let (engine_name, component, count) = match ty.name() {
            "Vector2" => ("Vector2", NumberKind::Single, 2),
            "Vector2I" => ("Vector2i", NumberKind::Int32, 2),
            "Vector3" => ("Vector3", NumberKind::Single, 3),
            "Vector3I" => ("Vector3i", NumberKind::Int32, 3),
            "Vector4" => ("Vector4", NumberKind::Single, 4),
            "Vector4I" => ("Vector4i", NumberKind::Int32, 4),
            "Color" => ("Color", NumberKind::Single, 4),
            "Rect2" => ("Rect2", NumberKind::Single, 4),
            "Rect2I" => ("Rect2i", NumberKind::Int32, 4),
            _ => return None,
        };
        Some(Self {
            engine_name,
            component,
            count,
        })
    }
}

/// A default value parser. Each variant only accepts the types listed on
/// its constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValueParser {
    Number(NumberKind),
    Boolean,
    String(TypeDescriptor),
    NodePath(TypeDescriptor),
    Vector(TypeDescriptor, VectorShape),
    Transform(TypeDescriptor),
    Array(TypeDescriptor),
    Dictionary(TypeDescriptor),
    Variant(TypeDescriptor),
    /// Built-ins whose only literal is the empty constructor, e.g. `RID()`.
    EmptyConstructor(String),
    PackedArray(String),
}

fn check_compatible(
    ty: &TypeDescriptor,
    compatible: &[TypeDescriptor],
    parser: &'static str,
) -> Result<(), DefaultValueError> {
    if compatible.contains(ty) {
        Ok(())
    } else {
        Err(DefaultValueError::IncompatibleType {
            ty: ty.full_name(),
            parser,
        })
    }
}

impl DefaultValueParser {
    pub fn string(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        let compatible = [
            known::string(),
            known::string_name(),
            known::native_godot_string(),
            known::native_godot_string_name(),
        ];
        check_compatible(&ty, &compatible, "String")?;
        Ok(Self::String(ty))
    }

    pub fn node_path(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        check_compatible(&ty, &[known::node_path(), known::native_godot_node_path()], "NodePath")?;
        Ok(Self::NodePath(ty))
    }

    pub fn vector(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        let shape = VectorShape::of(&ty).ok_or_else(|| DefaultValueError::IncompatibleType {
            ty: ty.full_name(),
            parser: "Vector",
        })?;
        Ok(Self::Vector(ty, shape))
    }

    pub fn transform(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        check_compatible(&ty, &[known::transform2d(), known::transform3d()], "Transform")?;
        Ok(Self::Transform(ty))
    }

    pub fn array(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        let compatible = [
            known::godot_array(),
            known::godot_array_generic(),
            known::native_godot_array(),
        ];
        check_compatible(&ty, &compatible, "GodotArray")?;
        Ok(Self::Array(ty))
    }

    pub fn dictionary(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        let compatible = [
            known::godot_dictionary(),
            known::godot_dictionary_generic(),
            known::native_godot_dictionary(),
        ];
        check_compatible(&ty, &compatible, "GodotDictionary")?;
        Ok(Self::Dictionary(ty))
    }

    pub fn variant(ty: TypeDescriptor) -> Result<Self, DefaultValueError> {
        check_compatible(&ty, &[known::variant(), known::native_godot_variant()], "Variant")?;
        Ok(Self::Variant(ty))
    }

    pub fn empty_constructor(engine_name: &str) -> Self {
        Self::EmptyConstructor(engine_name.to_string())
    }

    pub fn packed_array(engine_name: &str) -> Self {
        Self::PackedArray(engine_name.to_string())
    }

    /// Translate `literal`. `db` resolves component values for vectors.
    pub fn parse(&self, literal: &str, db: &TypeDb) -> Result<String, DefaultValueError> {
        match self {
            Self::Number(kind) => kind.format(literal).ok_or_else(|| DefaultValueError::InvalidNumber {
                literal: literal.to_string(),
                ty: kind.descriptor().full_name(),
            }),
            Self::Boolean => match literal {
                "true" | "false" => Ok(literal.to_string()),
                _ => Err(unparseable(literal, &known::boolean())),
            },
            Self::String(ty) => parse_string(ty, literal),
            Self::NodePath(ty) => parse_node_path(ty, literal),
            Self::Vector(ty, shape) => parse_vector(ty, shape, literal, db),
            Self::Transform(ty) => parse_transform(ty, literal),
            Self::Array(ty) => parse_array(ty, literal),
            Self::Dictionary(ty) => match literal {
                "{}" => Ok(DEFAULT_EXPRESSION.to_string()),
                _ => Err(unparseable(literal, ty)),
            },
            Self::Variant(ty) => match literal {
                // `0` is what the engine dumps for a bound `Variant::NIL`.
                "null" | "Variant()" | "0" => Ok(DEFAULT_EXPRESSION.to_string()),
                _ => Err(unparseable(literal, ty)),
            },
            Self::EmptyConstructor(engine_name) => match parse_constructor(literal) {
                Some((name, args)) if name == engine_name && args.is_empty() => Ok(DEFAULT_EXPRESSION.to_string()),
                _ => Err(DefaultValueError::Unparseable {
                    literal: literal.to_string(),
                    ty: engine_name.clone(),
                }),
            },
            Self::PackedArray(engine_name) => {
                if literal == "[]" {
                    return Ok(DEFAULT_EXPRESSION.to_string());
                }
                match parse_constructor(literal) {
                    Some((name, args)) if name == engine_name && matches!(args.as_slice(), [] | ["[]"]) => {
                        Ok(DEFAULT_EXPRESSION.to_string())
                    }
                    _ => Err(DefaultValueError::Unparseable {
                        literal: literal.to_string(),
                        ty: engine_name.clone(),
                    }),
                }
            }
        }
    }
}

fn unparseable(literal: &str, ty: &TypeDescriptor) -> DefaultValueError {
    DefaultValueError::Unparseable {
        literal: literal.to_string(),
        ty: ty.full_name(),
    }
}

/// `T.Empty`, or `default` for ref structs that have no static members.
fn empty_of(ty: &TypeDescriptor) -> String {
    if ty.is_by_ref_like() {
        DEFAULT_EXPRESSION.to_string()
    } else {
        format!("{}.Empty", ty.full_name_with_global())
    }
}

fn parse_string(ty: &TypeDescriptor, literal: &str) -> Result<String, DefaultValueError> {
    let is_system_string = *ty == known::string();
    if literal == "\"\"" {
        // string.Empty is not a constant.
        return Ok(if is_system_string { "\"\"".to_string() } else { empty_of(ty) });
    }

    let is_string_name = *ty == known::string_name() || *ty == known::native_godot_string_name();
    if is_string_name && literal == "&\"\"" {
        return Ok(empty_of(ty));
    }

    let value = if is_string_name {
        literal.strip_prefix('&').unwrap_or(literal)
    } else {
        literal
    };
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if quoted {
        let global = ty.full_name_with_global();
        if is_system_string {
            return Ok(literal.to_string());
        }
        if *ty == known::string_name() {
            return Ok(format!("{global}.CreateFromUtf8({value}u8)"));
        }
        if *ty == known::native_godot_string() || *ty == known::native_godot_string_name() {
            return Ok(format!("{global}.Create({value}u8)"));
        }
    }
    Err(unparseable(literal, ty))
}

fn parse_node_path(ty: &TypeDescriptor, literal: &str) -> Result<String, DefaultValueError> {
    let Some(path) = literal.strip_prefix("NodePath(").and_then(|rest| rest.strip_suffix(')')) else {
        return Err(unparseable(literal, ty));
    };
    if path == "\"\"" {
        return Ok(empty_of(ty));
    }
    let global = ty.full_name_with_global();
    Ok(if ty.is_by_ref_like() {
        format!("{global}.Create({path})")
    } else {
        format!("new {global}({path})")
    })
}

fn parse_vector(ty: &TypeDescriptor, shape: &VectorShape, literal: &str, db: &TypeDb) -> Result<String, DefaultValueError> {
    let Some((name, args)) = parse_constructor(literal) else {
        return Err(unparseable(literal, ty));
    };
    if name != shape.engine_name || args.len() != shape.count {
        return Err(unparseable(literal, ty));
    }
    if args.iter().all(|arg| *arg == "0") {
        return Ok(DEFAULT_EXPRESSION.to_string());
    }

    let component_type = shape.component.descriptor();
    let mut components = Vec::with_capacity(args.len());
    for arg in args {
        match db.default_value_expression(&component_type, arg) {
            Ok(Some(component)) => components.push(component),
            _ => return Err(unparseable(literal, ty)),
        }
    }
    Ok(format!("new {}({})", ty.full_name_with_global(), components.join(", ")))
}

fn parse_transform(ty: &TypeDescriptor, literal: &str) -> Result<String, DefaultValueError> {
    let identity = if *ty == known::transform2d() {
        "Transform2D(1, 0, 0, 1, 0, 0)"
    } else {
        "Transform3D(1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0)"
    };
    if literal == identity {
        Ok(format!("{}.Identity", ty.full_name_with_global()))
    } else {
        Err(unparseable(literal, ty))
    }
}

fn parse_array(ty: &TypeDescriptor, literal: &str) -> Result<String, DefaultValueError> {
    // Null arrays are marshalled as empty arrays.
    if literal == "[]" {
        return Ok(DEFAULT_EXPRESSION.to_string());
    }
    if let Some((name, args)) = parse_constructor(literal)
        && name.starts_with("Array[")
        && name.ends_with(']')
        && matches!(args.as_slice(), [] | ["[]"])
    {
        return Ok(DEFAULT_EXPRESSION.to_string());
    }
    Err(unparseable(literal, ty))
}
