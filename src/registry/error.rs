//! Error types for the type registry.

use thiserror::Error;

use crate::defaults::DefaultValueError;
use crate::marshal::MarshalError;
use crate::types::TypeError;

/// Errors raised while populating a [`TypeDbBuilder`](super::TypeDbBuilder).
///
/// These are fatal: a registry with conflicting entries cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Type for engine name '{0}' already registered.")]
    DuplicateName(String),

    #[error("Type for engine name '{name}' (metadata: '{meta}') already registered.")]
    DuplicateMetaName { name: String, meta: String },

    #[error("Marshalling for type '{0}' already registered.")]
    ConflictingUnmanaged(String),

    #[error("Unmanaged type '{unmanaged}' for type '{ty}' must be a value type.")]
    ReferenceUnmanaged { ty: String, unmanaged: String },

    #[error("Ptr marshalling for type '{0}' already registered.")]
    DuplicatePtrMarshaller(String),

    #[error("Variant marshalling for type '{0}' already registered.")]
    DuplicateVariantMarshaller(String),

    #[error("Default value parser for type '{0}' already registered.")]
    DuplicateDefaultParser(String),

    #[error("Base class '{base}' of engine class '{class}' is not declared.")]
    UnknownBaseClass { class: String, base: String },

    #[error("Engine class '{0}' inherits from itself.")]
    CyclicBaseClass(String),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    DefaultValue(#[from] DefaultValueError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Errors raised by registry lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Type for engine name '{0}' not found.")]
    UnknownEngineType(String),

    /// The name contains characters other than `*` after the pointee.
    #[error("Malformed pointer type name '{0}'.")]
    MalformedPointer(String),

    #[error("Type '{0}' can't be marshalled. Unmanaged type not found.")]
    NoUnmanagedMapping(String),

    #[error("Type '{0}' can't be marshalled. Ptr marshaller not found.")]
    NoPtrMarshaller(String),

    #[error("Type '{0}' can't be marshalled. Variant marshaller not found.")]
    NoVariantMarshaller(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl ResolveError {
    /// Returns `true` if retrying with a different name cannot help.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, ResolveError::MalformedPointer(_))
    }

    /// Returns `true` if the error reports a missing registration.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::UnknownEngineType(_)
                | ResolveError::NoUnmanagedMapping(_)
                | ResolveError::NoPtrMarshaller(_)
                | ResolveError::NoVariantMarshaller(_)
        )
    }
}
