//! Unified error type for the gdmarshal library.
//!
//! This module provides a single [`Error`] type that encompasses all errors
//! that can occur in the library, making it easier to handle errors in
//! application code.

use thiserror::Error;

use crate::body::BodyError;
#[cfg(feature = "config")]
use crate::config::ConfigError;
use crate::defaults::DefaultValueError;
use crate::driver::DriverError;
use crate::marshal::MarshalError;
use crate::native_struct::NativeStructureError;
use crate::registry::{RegistrationError, ResolveError};
use crate::types::TypeError;

/// Unified error type for all gdmarshal operations.
///
/// # Example
///
/// ```ignore
/// use gdmarshal::{Driver, GeneratorConfig, Result};
///
/// fn run(config: &GeneratorConfig, members: &[MemberDescriptor]) -> Result<()> {
///     let driver = Driver::new(config)?;
///     let report = driver.synthesize(members)?;
///     println!("{} bodies", report.members.len());
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Conflicting registrations while building the registry.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Engine name or marshaller lookup failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A writer rejected a type.
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// A default value literal could not be translated.
    #[error(transparent)]
    DefaultValue(#[from] DefaultValueError),

    /// A call body could not be synthesized.
    #[error(transparent)]
    Body(#[from] BodyError),

    /// Malformed native structure format.
    #[error(transparent)]
    NativeStructure(#[from] NativeStructureError),

    /// A batch was aborted.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Invalid type construction.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Configuration could not be loaded.
    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, Self::Registration(_))
    }

    /// Returns `true` if this is a lookup error, including one raised while
    /// synthesizing a body.
    pub fn is_resolve(&self) -> bool {
        matches!(self, Self::Resolve(_) | Self::Body(BodyError::Resolve(_)))
    }

    /// Returns `true` if this is a default value error.
    pub fn is_default_value(&self) -> bool {
        matches!(self, Self::DefaultValue(_) | Self::Body(BodyError::DefaultValue(_)))
    }

    /// Returns `true` if this is a body synthesis error.
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Body(_) | Self::Driver(DriverError::Member { .. }))
    }

    /// Returns `true` if this is a native structure error.
    pub fn is_native_structure(&self) -> bool {
        matches!(self, Self::NativeStructure(_))
    }

    /// Returns `true` if this is a configuration error.
    #[cfg(feature = "config")]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
