//! The type model shared by every resolver and writer.
//!
//! # Module Organization
//!
//! - `descriptor` - [`TypeDescriptor`] and [`TypeKind`]
//! - [`known`] - descriptors for system, engine built-in and native-interop types

mod descriptor;
pub mod known;

pub use descriptor::{TypeDescriptor, TypeKind};

use thiserror::Error;

/// Errors from constructing derived type descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Type '{0}' is not a generic type definition")]
    NotGenericDefinition(String),

    #[error("Type '{ty}' expects {expected} generic arguments, got {actual}")]
    ArityMismatch {
        ty: String,
        expected: usize,
        actual: usize,
    },

    #[error("Inline arrays are only supported for lengths 2 to 16, got {0}")]
    InlineArrayLength(usize),
}
