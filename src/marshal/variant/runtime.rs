use gdmarshal_writer::IndentedWriter;

use super::VariantMarshaller;
use crate::marshal::{runtime_source, MarshalError, RuntimeMarshallerType};
use crate::types::TypeDescriptor;

/// Delegates to a runtime marshaller class
/// (`ConvertToVariant` / `ConvertFromVariant` / `FreeVariant`).
#[derive(Debug, Clone)]
pub struct RuntimeVariantMarshaller {
    marshaller: RuntimeMarshallerType,
    marshallable: TypeDescriptor,
}

impl RuntimeVariantMarshaller {
    pub fn new(marshaller: RuntimeMarshallerType, marshallable: TypeDescriptor) -> Self {
        Self {
            marshaller,
            marshallable,
        }
    }
}

impl VariantMarshaller for RuntimeVariantMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
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
        writer.write_line(&format!("{destination} = {marshaller}.ConvertToVariant({source});"));
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
        let downcast = if *ty != self.marshallable {
            format!("({})", ty.full_name_with_global())
        } else {
            String::new()
        };
        writer.write_line(&format!(
            "{destination} = {downcast}{marshaller}.ConvertFromVariant({source});"
        ));
        Ok(())
    }

    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError> {
        let marshaller = self.marshaller.render_for(ty)?;
        writer.write_line(&format!("{marshaller}.FreeVariant({source});"));
        Ok(())
    }
}
