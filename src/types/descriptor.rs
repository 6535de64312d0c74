//! Structural type descriptors for the generated C# surface.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::TypeError;

/// How values of a type are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TypeKind {
    /// A struct (copied by value).
    Value,
    /// A class (heap allocated, nullable).
    Reference,
    /// A stack-only struct that can never be boxed or wrapped.
    ByRefLike,
}

/// A target type: identity, value kind, generics, pointer indirection and
/// an owned link to its base type.
///
/// Equality and hashing only consider identity (name, namespace, pointee,
/// generic arity and arguments).
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    namespace: Option<String>,
    kind: TypeKind,
    is_enum: bool,
    generic_arity: usize,
    generic_args: Vec<TypeDescriptor>,
    pointee: Option<Box<TypeDescriptor>>,
    base: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    fn with_kind(namespace: Option<&str>, name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            kind,
            is_enum: false,
            generic_arity: 0,
            generic_args: Vec::new(),
            pointee: None,
            base: None,
        }
    }

    /// A struct type.
    pub fn value(namespace: &str, name: &str) -> Self {
        Self::with_kind(Some(namespace), name, TypeKind::Value)
    }

    /// A class type.
    pub fn reference(namespace: &str, name: &str) -> Self {
        Self::with_kind(Some(namespace), name, TypeKind::Reference)
    }

    /// A stack-only struct type.
    pub fn by_ref_like(namespace: &str, name: &str) -> Self {
        Self::with_kind(Some(namespace), name, TypeKind::ByRefLike)
    }

    /// An enum type. Enums are value types.
    pub fn enumeration(namespace: &str, name: &str) -> Self {
        let mut ty = Self::with_kind(Some(namespace), name, TypeKind::Value);
        ty.is_enum = true;
        ty
    }

    /// Turn this descriptor into a generic definition with `arity` parameters.
    pub fn with_generic_arity(mut self, arity: usize) -> Self {
        self.generic_arity = arity;
        self.generic_args.clear();
        self
    }

    /// Attach a base type.
    pub fn with_base(mut self, base: TypeDescriptor) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_enum(&self) -> bool {
        self.is_enum
    }

    /// Pointers and structs are value types, including stack-only ones.
    pub fn is_value_type(&self) -> bool {
        self.pointee.is_some() || matches!(self.kind, TypeKind::Value | TypeKind::ByRefLike)
    }

    pub fn is_reference_type(&self) -> bool {
        self.pointee.is_none() && self.kind == TypeKind::Reference
    }

    pub fn is_by_ref_like(&self) -> bool {
        self.pointee.is_none() && self.kind == TypeKind::ByRefLike
    }

    pub fn is_pointer(&self) -> bool {
        self.pointee.is_some()
    }

    /// The type this pointer points at.
    pub fn pointee(&self) -> Option<&TypeDescriptor> {
        self.pointee.as_deref()
    }

    pub fn base(&self) -> Option<&TypeDescriptor> {
        self.base.as_deref()
    }

    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    pub fn generic_args(&self) -> &[TypeDescriptor] {
        &self.generic_args
    }

    /// A generic type whose parameters have not been bound.
    pub fn is_generic_definition(&self) -> bool {
        self.generic_arity > 0 && self.generic_args.is_empty()
    }

    /// A generic type with all of its parameters bound.
    pub fn is_constructed_generic(&self) -> bool {
        self.generic_arity > 0 && !self.generic_args.is_empty()
    }

    /// `System.Nullable<T>` for some `T`.
    pub fn is_optional(&self) -> bool {
        self.is_constructed_generic()
            && self.name == "Nullable"
            && self.namespace.as_deref() == Some("System")
    }

    /// The `T` of `System.Nullable<T>`.
    pub fn optional_inner(&self) -> Option<&TypeDescriptor> {
        if self.is_optional() {
            self.generic_args.first()
        } else {
            None
        }
    }

    /// Wrap this type in one level of pointer indirection.
    pub fn make_pointer(&self) -> TypeDescriptor {
        TypeDescriptor {
            name: format!("{}*", self.name),
            namespace: self.namespace.clone(),
            kind: TypeKind::Value,
            is_enum: false,
            generic_arity: 0,
            generic_args: Vec::new(),
            pointee: Some(Box::new(self.clone())),
            base: None,
        }
    }

    /// Bind the parameters of a generic definition.
    pub fn make_generic(&self, args: Vec<TypeDescriptor>) -> Result<TypeDescriptor, TypeError> {
        if !self.is_generic_definition() {
            return Err(TypeError::NotGenericDefinition(self.full_name()));
        }
        if args.len() != self.generic_arity {
            return Err(TypeError::ArityMismatch {
                ty: self.full_name(),
                expected: self.generic_arity,
                actual: args.len(),
            });
        }
        let mut ty = self.clone();
        ty.generic_args = args;
        Ok(ty)
    }

    /// The unbound definition of a constructed generic (or a clone of `self`).
    pub fn generic_definition(&self) -> TypeDescriptor {
        let mut ty = self.clone();
        ty.generic_args.clear();
        ty
    }

    /// Fully qualified name, e.g. `Godot.Collections.GodotArray<Godot.Node>`.
    pub fn full_name(&self) -> String {
        self.render(false)
    }

    /// Fully qualified name as written in generated code, with every
    /// namespace rooted in `global::`. `System.Void` renders as `void`.
    pub fn full_name_with_global(&self) -> String {
        self.render(true)
    }

    fn render(&self, global: bool) -> String {
        if let Some(pointee) = &self.pointee {
            return format!("{}*", pointee.render(global));
        }
        if global && self.is_void() {
            return "void".to_string();
        }

        let mut out = String::new();
        if let Some(namespace) = &self.namespace {
            if global {
                out.push_str("global::");
            }
            out.push_str(namespace);
            out.push('.');
        }
        out.push_str(&self.name);

        if self.generic_arity > 0 {
            out.push('<');
            if self.generic_args.is_empty() {
                out.push_str(&",".repeat(self.generic_arity - 1));
            } else {
                let args: Vec<String> = self.generic_args.iter().map(|a| a.render(global)).collect();
                out.push_str(&args.join(", "));
            }
            out.push('>');
        }
        out
    }

    /// `System.Void`.
    pub fn is_void(&self) -> bool {
        self.pointee.is_none()
            && self.name == "Void"
            && self.namespace.as_deref() == Some("System")
    }

    /// Compare identity with a `namespace.name` pair.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.pointee.is_none()
            && self.generic_arity == 0
            && self.name == name
            && self.namespace.as_deref() == Some(namespace)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.namespace == other.namespace
            && self.pointee == other.pointee
            && self.generic_arity == other.generic_arity
            && self.generic_args == other.generic_args
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.namespace.hash(state);
        self.pointee.hash(state);
        self.generic_arity.hash(state);
        self.generic_args.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::known;

    #[test]
    fn test_full_name_plain() {
        let ty = TypeDescriptor::value("Godot", "Vector2");
        assert_eq!(ty.full_name(), "Godot.Vector2");
        assert_eq!(ty.full_name_with_global(), "global::Godot.Vector2");
    }

    #[test]
    fn test_full_name_generic() {
        let node = TypeDescriptor::reference("Godot", "Node");
        let array = known::godot_array_generic().make_generic(vec![node]).unwrap();
        assert_eq!(array.full_name(), "Godot.Collections.GodotArray<Godot.Node>");
        assert_eq!(
            array.full_name_with_global(),
            "global::Godot.Collections.GodotArray<global::Godot.Node>"
        );
        assert_eq!(known::godot_dictionary_generic().full_name(), "Godot.Collections.GodotDictionary<,>");
    }

    #[test]
    fn test_pointer_rendering() {
        assert_eq!(known::int64().make_pointer().full_name_with_global(), "global::System.Int64*");
        assert_eq!(known::void().make_pointer().full_name_with_global(), "void*");
        assert_eq!(known::void().make_pointer().make_pointer().full_name(), "System.Void**");
    }

    #[test]
    fn test_identity_ignores_kind_and_base() {
        let a = TypeDescriptor::reference("Godot", "Node").with_base(known::godot_object());
        let b = TypeDescriptor::value("Godot", "Node");
        assert_eq!(a, b);
        assert_ne!(a, a.make_pointer());
    }

    #[test]
    fn test_make_generic_rejects_wrong_arity() {
        let err = known::nullable().make_generic(vec![]).unwrap_err();
        assert!(matches!(err, TypeError::ArityMismatch { expected: 1, actual: 0, .. }));
        let err = known::int32().make_generic(vec![known::int32()]).unwrap_err();
        assert!(matches!(err, TypeError::NotGenericDefinition(_)));
    }

    #[test]
    fn test_optional_inner() {
        let vector = known::vector2();
        let optional = known::make_nullable(&vector).unwrap();
        assert!(optional.is_optional());
        assert_eq!(optional.optional_inner(), Some(&vector));
        assert_eq!(optional.generic_definition(), known::nullable());
        assert!(!vector.is_optional());
    }

    #[test]
    fn test_value_kinds() {
        assert!(known::native_godot_string().is_by_ref_like());
        assert!(known::native_godot_string().is_value_type());
        assert!(known::string().is_reference_type());
        assert!(known::string().make_pointer().is_value_type());
    }
}
