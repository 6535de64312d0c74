use gdmarshal_writer::IndentedWriter;

use super::PtrMarshaller;
use crate::marshal::{runtime_source, MarshalError, RuntimeMarshallerType};
use crate::types::TypeDescriptor;

/// Delegates to a marshaller class shipped with the runtime
/// (`ConvertToUnmanaged` / `ConvertFromUnmanaged` / `Free`).
#[derive(Debug, Clone)]
pub struct RuntimePtrMarshaller {
    marshaller: RuntimeMarshallerType,
    marshallable: TypeDescriptor,
    unmanaged_pointer: TypeDescriptor,
}

impl RuntimePtrMarshaller {
    pub fn new(
        marshaller: RuntimeMarshallerType,
        marshallable: TypeDescriptor,
        unmanaged_pointer: TypeDescriptor,
    ) -> Result<Self, MarshalError> {
        if !unmanaged_pointer.is_pointer() {
            return Err(MarshalError::NotPointer(unmanaged_pointer.full_name()));
        }
        Ok(Self {
            marshaller,
            marshallable,
            unmanaged_pointer,
        })
    }

    pub fn marshaller(&self) -> &RuntimeMarshallerType {
        &self.marshaller
    }
}

impl PtrMarshaller for RuntimePtrMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
    }

    fn unmanaged_pointer_type(&self) -> &TypeDescriptor {
        &self.unmanaged_pointer
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        let marshaller = self.marshaller.render_for(ty)?;
        let source = runtime_source(ty, source);
        writer.write_line(&format!("{destination} = {marshaller}.ConvertToUnmanaged({source});"));
        Ok(())
    }

    fn write_convert_from(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        let marshaller = self.marshaller.render_for(ty)?;
        // Downcast when marshalling a derived type through its base's marshaller.
        let downcast = if *ty != self.marshallable {
            format!("({})", ty.full_name_with_global())
        } else {
            String::new()
        };
        writer.write_line(&format!(
            "{destination} = {downcast}{marshaller}.ConvertFromUnmanaged({source});"
        ));
        Ok(())
    }

    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError> {
        let marshaller = self.marshaller.render_for(ty)?;
        let cast = if ty.is_enum() { "(long*)" } else { "" };
        writer.write_line(&format!("{marshaller}.Free({cast}{source});"));
        Ok(())
    }
}
