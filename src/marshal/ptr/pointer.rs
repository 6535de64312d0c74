use gdmarshal_writer::IndentedWriter;

use super::PtrMarshaller;
use crate::marshal::MarshalError;
use crate::types::{known, TypeDescriptor};

/// Passes a raw pointer argument through by address.
#[derive(Debug, Clone)]
pub struct PtrPtrMarshaller {
    pointer: TypeDescriptor,
    void_pointer: TypeDescriptor,
}

impl PtrPtrMarshaller {
    pub fn new(pointer: TypeDescriptor) -> Result<Self, MarshalError> {
        if !pointer.is_pointer() {
            return Err(MarshalError::NotPointer(pointer.full_name()));
        }
        Ok(Self {
            pointer,
            void_pointer: known::void().make_pointer(),
        })
    }
}

impl PtrMarshaller for PtrPtrMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.pointer
    }

    fn unmanaged_pointer_type(&self) -> &TypeDescriptor {
        &self.void_pointer
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        _: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        writer.write_line(&format!("{destination} = &{source};"));
        Ok(())
    }

    fn write_convert_from(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str, _: &str) -> Result<(), MarshalError> {
        Err(MarshalError::PointerUnmarshal)
    }

    fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
        Ok(())
    }
}
