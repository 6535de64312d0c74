//! Variant marshaller writers used by the vararg convention.

mod enumeration;
mod interop_struct;
mod primitive;
mod runtime;
mod passthrough;

pub use enumeration::EnumVariantMarshaller;
pub use interop_struct::InteropStructVariantMarshaller;
pub use primitive::{FloatingPointVariantMarshaller, IntegerVariantMarshaller};
pub use runtime::RuntimeVariantMarshaller;
pub use passthrough::VariantVariantMarshaller;

use std::fmt;

use gdmarshal_writer::IndentedWriter;

use super::MarshalError;
use crate::types::TypeDescriptor;

/// Converts between a managed value and a `NativeGodotVariant`.
///
/// Slots handed to these writers are `NativeGodotVariant*`.
pub trait VariantMarshaller: fmt::Debug {
    fn marshallable_type(&self) -> &TypeDescriptor;

    fn needs_cleanup(&self) -> bool {
        true
    }

    fn write_setup(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        let _ = (writer, ty, source, destination);
        Ok(None)
    }

    fn write_setup_uninitialized(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        let _ = (writer, ty, destination);
        Ok(None)
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError>;

    fn write_convert_from(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError>;

    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError>;
}
