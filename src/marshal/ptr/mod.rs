//! Pointer marshaller writers used by the ptrcall convention.

mod enumeration;
mod interop_struct;
mod nullable;
mod pointer;
mod primitive;
mod runtime;

pub use enumeration::EnumPtrMarshaller;
pub use interop_struct::InteropStructPtrMarshaller;
pub use nullable::NullablePtrMarshaller;
pub use pointer::PtrPtrMarshaller;
pub use primitive::{BlittablePtrMarshaller, FloatingPointPtrMarshaller, IntegerPtrMarshaller};
pub use runtime::RuntimePtrMarshaller;

use std::fmt;

use gdmarshal_writer::IndentedWriter;

use super::MarshalError;
use crate::types::TypeDescriptor;

/// Converts between a managed value and an unmanaged pointer.
pub trait PtrMarshaller: fmt::Debug {
    /// The managed type this writer was built for.
    fn marshallable_type(&self) -> &TypeDescriptor;

    /// The unmanaged pointer type stored in the argument slot. Always a pointer.
    fn unmanaged_pointer_type(&self) -> &TypeDescriptor;

    /// Whether [`write_free`](Self::write_free) must run after the call.
    fn needs_cleanup(&self) -> bool {
        true
    }

    /// Emit locals needed before converting `source`. Returns the name of the
    /// auxiliary variable to marshal instead of `source`, if one was declared.
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

    /// Like [`write_setup`](Self::write_setup) for a value that does not exist
    /// yet (a return slot).
    fn write_setup_uninitialized(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        let _ = (writer, ty, destination);
        Ok(None)
    }

    /// Store a pointer to the unmanaged form of `source` in `destination`.
    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError>;

    /// Read the value behind the unmanaged pointer `source` into `destination`.
    fn write_convert_from(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError>;

    /// Release what [`write_convert_to`](Self::write_convert_to) allocated.
    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError>;
}
