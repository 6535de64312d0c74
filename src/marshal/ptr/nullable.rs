use std::rc::Rc;

use gdmarshal_writer::IndentedWriter;

use super::PtrMarshaller;
use crate::marshal::{ensure_type, MarshalError, Operation};
use crate::types::TypeDescriptor;

/// `Nullable<T>` delegating to the writer for `T`.
///
/// Setup always materializes `T` from `.Value` so the inner writer never sees
/// the wrapper.
#[derive(Debug, Clone)]
pub struct NullablePtrMarshaller {
    marshallable: TypeDescriptor,
    inner_type: TypeDescriptor,
    inner: Rc<dyn PtrMarshaller>,
}

impl NullablePtrMarshaller {
    pub fn new(marshallable: TypeDescriptor, inner: Rc<dyn PtrMarshaller>) -> Result<Self, MarshalError> {
        let inner_type = marshallable
            .optional_inner()
            .cloned()
            .ok_or_else(|| MarshalError::NotNullable(marshallable.full_name()))?;
        Ok(Self {
            marshallable,
            inner_type,
            inner,
        })
    }
}

impl PtrMarshaller for NullablePtrMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
    }

    fn unmanaged_pointer_type(&self) -> &TypeDescriptor {
        self.inner.unmanaged_pointer_type()
    }

    fn needs_cleanup(&self) -> bool {
        self.inner.needs_cleanup()
    }

    fn write_setup(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        let value = format!("{source}.Value");
        if self
            .inner
            .write_setup(writer, &self.inner_type, &value, destination)?
            .is_none()
        {
            writer.write_line(&format!(
                "{} {destination} = {value};",
                self.inner_type.full_name_with_global()
            ));
        }
        Ok(Some(destination.to_string()))
    }

    fn write_setup_uninitialized(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        self.inner
            .write_setup_uninitialized(writer, &self.inner_type, destination)
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        self.inner
            .write_convert_to(writer, &self.inner_type, source, destination)
    }

    fn write_convert_from(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Unmarshal)?;
        self.inner
            .write_convert_from(writer, &self.inner_type, source, destination)
    }

    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Free)?;
        self.inner.write_free(writer, &self.inner_type, source)
    }
}
