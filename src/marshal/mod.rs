//! Marshaller writers: the code fragments that move a value across the
//! ABI boundary.
//!
//! Every type has up to two writers. A [`PtrMarshaller`] converts between
//! the managed value and a fixed-layout unmanaged pointer (ptrcall). A
//! [`VariantMarshaller`] converts between the managed value and the engine's
//! tagged `NativeGodotVariant` (vararg calls and reflection-style invocation).
//!
//! Writers are pure: their output depends only on the type and the variable
//! names they are handed.
//!
//! # Module Organization
//!
//! - [`ptr`] - pointer writers (blittable, integer, floating point, enum,
//!   interop struct, nullable, pointer passthrough, runtime)
//! - [`variant`] - variant writers (integer, floating point, enum, interop
//!   struct, runtime, variant)
//! - `error` - [`MarshalError`]

mod error;
pub mod ptr;
pub mod variant;

pub use error::{MarshalError, Operation};
pub use ptr::PtrMarshaller;
pub use variant::VariantMarshaller;

use crate::types::TypeDescriptor;

/// Namespace every runtime marshaller class lives in.
pub const RUNTIME_MARSHALLERS_NAMESPACE: &str = "Godot.NativeInterop.Marshallers";

/// `global::Godot.NativeInterop.NativeGodotVariant`, the prefix of every
/// variant helper call.
pub(crate) const NATIVE_VARIANT: &str = "global::Godot.NativeInterop.NativeGodotVariant";

pub(crate) fn ensure_type(
    ty: &TypeDescriptor,
    expected: &TypeDescriptor,
    operation: Operation,
) -> Result<(), MarshalError> {
    if ty == expected {
        Ok(())
    } else {
        Err(MarshalError::unsupported(ty, expected, operation))
    }
}

/// A runtime marshaller class (e.g. `StringMarshaller`).
///
/// When the class is a generic definition the marshalled type must be a
/// constructed generic with the same arity, and the class is instantiated
/// with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeMarshallerType(TypeDescriptor);

impl RuntimeMarshallerType {
    pub fn new(marshaller_type: TypeDescriptor) -> Result<Self, MarshalError> {
        if marshaller_type.namespace() != Some(RUNTIME_MARSHALLERS_NAMESPACE) {
            return Err(MarshalError::MarshallerNamespace(marshaller_type.full_name()));
        }
        Ok(Self(marshaller_type))
    }

    /// A class in the runtime marshallers namespace with the given generic arity.
    pub fn named(name: &str, generic_arity: usize) -> Self {
        Self(TypeDescriptor::reference(RUNTIME_MARSHALLERS_NAMESPACE, name).with_generic_arity(generic_arity))
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.0
    }

    /// The marshaller class to call for `ty`, rendered with `global::`.
    pub(crate) fn render_for(&self, ty: &TypeDescriptor) -> Result<String, MarshalError> {
        if !self.0.is_generic_definition() {
            return Ok(self.0.full_name_with_global());
        }
        if !ty.is_constructed_generic() {
            return Err(MarshalError::MarshallerNotGeneric {
                marshaller: self.0.full_name(),
                ty: ty.full_name(),
            });
        }
        if self.0.generic_arity() != ty.generic_arity() {
            return Err(MarshalError::MarshallerArity {
                marshaller: self.0.full_name(),
                ty: ty.full_name(),
            });
        }
        Ok(self.0.make_generic(ty.generic_args().to_vec())?.full_name_with_global())
    }
}

/// Source expression prefix/suffix shared by both runtime writers: enums
/// travel as `long`, optionals are unwrapped with `GetValueOrDefault()`.
pub(crate) fn runtime_source(ty: &TypeDescriptor, source: &str) -> String {
    let cast = if ty.is_enum() { "(long)" } else { "" };
    let unwrap = if ty.is_optional() { ".GetValueOrDefault()" } else { "" };
    format!("{cast}{source}{unwrap}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::known;

    #[test]
    fn test_runtime_marshaller_namespace_checked() {
        let err = RuntimeMarshallerType::new(TypeDescriptor::reference("Godot", "StringMarshaller")).unwrap_err();
        assert!(matches!(err, MarshalError::MarshallerNamespace(_)));
    }

    #[test]
    fn test_runtime_marshaller_generic_instantiation() {
        let marshaller = RuntimeMarshallerType::named("GodotArrayMarshaller", 1);
        let node_array = known::godot_array_of(&TypeDescriptor::reference("Godot", "Node")).unwrap();
        assert_eq!(
            marshaller.render_for(&node_array).unwrap(),
            "global::Godot.NativeInterop.Marshallers.GodotArrayMarshaller<global::Godot.Node>"
        );
        assert!(matches!(
            marshaller.render_for(&known::godot_array()),
            Err(MarshalError::MarshallerNotGeneric { .. })
        ));
        let dictionary = known::godot_dictionary_generic()
            .make_generic(vec![known::string(), known::int64()])
            .unwrap();
        assert!(matches!(
            marshaller.render_for(&dictionary),
            Err(MarshalError::MarshallerArity { .. })
        ));
    }

    #[test]
    fn test_runtime_source() {
        assert_eq!(runtime_source(&known::string(), "name"), "name");
        let mode = TypeDescriptor::enumeration("Godot", "Mode");
        assert_eq!(runtime_source(&mode, "mode"), "(long)mode");
        let optional = known::make_nullable(&known::vector2()).unwrap();
        assert_eq!(runtime_source(&optional, "v"), "v.GetValueOrDefault()");
    }
}
