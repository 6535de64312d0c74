//! Marshalling compiler for Godot C# bindings.
//!
//! This library decides, per type and per call site, how values cross the
//! GDExtension ABI and emits the C# statements that perform the crossing:
//! type resolution from engine names, pointer and variant marshaller
//! writers, default value translation, and call-body synthesis for the
//! ptrcall and vararg calling conventions.
//!
//! # Quick Start
//!
//! ```ignore
//! use gdmarshal::prelude::*;
//!
//! let mut builder = TypeDbBuilder::new();
//! register_known_types(&mut builder, &KnownTypeOptions::default())?;
//! let db = builder.build();
//!
//! let signature = Signature::new("GetName").returning(known::string_name());
//! let mut writer = IndentedWriter::new();
//! MethodBind::new(2002593661).write(&db, &signature, &mut writer)?;
//! print!("{}", writer.as_str());
//! ```
//!
//! # Modules
//!
//! - [`types`] - [`TypeDescriptor`] and the known type table
//! - [`registry`] - [`TypeDb`], name resolution and the shared fallback rules
//! - [`marshal`] - pointer and variant marshaller writers
//! - [`defaults`] - default value parsing and planning
//! - [`body`] - call-body synthesis and the call strategies
//! - [`native_struct`] - native structure formats
//! - [`model`] - member descriptors
//! - [`driver`] - batch synthesis with per-member error isolation
//! - [`config`] - generator configuration
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `serde` - Derive serde traits on descriptors and configuration
//! - `config` - Load configuration from TOML (enabled by default)
//! - `full` - Enable all features

mod logging;

pub mod body;
pub mod config;
pub mod defaults;
pub mod driver;
pub mod marshal;
pub mod model;
pub mod native_struct;
pub mod prelude;
pub mod registry;
pub mod types;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use body::{BodyError, BodyOutline, MethodBody, Parameter, Phase, Signature};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::{GeneratorConfig, LogFormat, LoggingConfig, SynthesisConfig, TypesConfig};
pub use defaults::{apply_default_value, DefaultValueError, ParameterDefault};
pub use driver::{Driver, DriverError, SynthesisReport, SynthesizedMember};
pub use marshal::{MarshalError, PtrMarshaller, VariantMarshaller};
pub use model::{ArgumentDescriptor, MemberDescriptor, MemberKind, TypeRef};
pub use native_struct::{parse_native_structure, resolve_native_structure, NativeStructureError};
pub use registry::{RegistrationError, ResolveError, TypeDb, TypeDbBuilder};
pub use types::{TypeDescriptor, TypeError};

pub use gdmarshal_writer::IndentedWriter;
