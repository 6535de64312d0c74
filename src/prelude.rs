//! Convenient re-exports for common usage patterns.
//!
//! This module provides a single import to bring all commonly used types
//! into scope.
//!
//! # Example
//!
//! ```ignore
//! use gdmarshal::prelude::*;
//!
//! let driver = Driver::new(&GeneratorConfig::default())?;
//! let member = MemberDescriptor::new("GetName", MemberKind::MethodBind)
//!     .with_hash(2002593661)
//!     .returning(TypeRef::new("StringName"));
//! let synthesized = driver.synthesize_member(&member)?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Type model and registry
pub use crate::registry::{
    register_engine_classes, register_engine_enums, register_known_types, EngineClass, FloatPrecision,
    KnownTypeOptions, TypeDb, TypeDbBuilder,
};
pub use crate::types::{known, TypeDescriptor};

// Writers
pub use crate::marshal::{PtrMarshaller, VariantMarshaller};
pub use gdmarshal_writer::IndentedWriter;

// Call bodies
pub use crate::body::{
    BodyOutline, BuiltInConstructor, BuiltInDestructor, BuiltInMethod, BuiltInMethodTarget, BuiltInMethodVararg,
    BuiltInOperator, ConvertToVariantCopying, ConvertToVariantTakingOwnership, CreateVariantCopying, MethodBind,
    MethodBindVararg, MethodBody, Parameter, Phase, RegisterVirtualOverrides, Signature, UtilityFunction,
    VirtualOverride,
};

// Defaults and native structures
pub use crate::defaults::{apply_default_value, write_default_parameter_values};
pub use crate::native_struct::{resolve_native_structure, write_default_initializer};

// Batch synthesis
pub use crate::config::GeneratorConfig;
pub use crate::driver::Driver;
pub use crate::model::{ArgumentDescriptor, MemberDescriptor, MemberKind, TypeRef};
