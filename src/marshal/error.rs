//! Error types for marshaller writers.

use std::fmt;

use thiserror::Error;

use crate::types::TypeError;

/// The writer operation that rejected a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Marshal,
    Unmarshal,
    Free,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Marshal => "marshalled",
            Operation::Unmarshal => "unmarshalled",
            Operation::Free => "freed",
        })
    }
}

/// Errors raised while constructing writers or emitting their code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    #[error("Type '{ty}' can't be {operation} by this marshaller. Only '{expected}' is supported.")]
    UnsupportedType {
        ty: String,
        expected: String,
        operation: Operation,
    },

    #[error("Marshallable type '{0}' must be a value type.")]
    NotValueType(String),

    #[error("Type '{0}' must be a ref struct when no unmanaged pointer type is provided.")]
    NotByRefLike(String),

    #[error("Unmanaged pointer type '{0}' must be a pointer.")]
    NotPointer(String),

    #[error("Marshallable type '{0}' must be a constructed Nullable<T> type.")]
    NotNullable(String),

    #[error("Invalid marshaller type: '{0}'. Not in the expected namespace.")]
    MarshallerNamespace(String),

    #[error("Marshaller '{marshaller}' can't marshal the type '{ty}' because it's not generic.")]
    MarshallerNotGeneric { marshaller: String, ty: String },

    #[error("Marshaller '{marshaller}' can't marshal type '{ty}' because the type argument count does not match.")]
    MarshallerArity { marshaller: String, ty: String },

    #[error("Can't unmarshal pointer types.")]
    PointerUnmarshal,

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl MarshalError {
    pub(crate) fn unsupported(ty: &crate::types::TypeDescriptor, expected: &crate::types::TypeDescriptor, operation: Operation) -> Self {
        Self::UnsupportedType {
            ty: ty.full_name(),
            expected: expected.full_name(),
            operation,
        }
    }
}
