use gdmarshal_writer::IndentedWriter;

use super::VariantMarshaller;
use crate::marshal::{ensure_type, MarshalError, Operation};
use crate::types::{known, TypeDescriptor};

/// `Variant` and `NativeGodotVariant` are already variants; only the
/// address or the ownership wrapper changes.
#[derive(Debug, Clone)]
pub struct VariantVariantMarshaller {
    marshallable: TypeDescriptor,
}

impl VariantVariantMarshaller {
    pub fn new(marshallable: TypeDescriptor) -> Self {
        Self { marshallable }
    }

    fn is_native(&self) -> bool {
        self.marshallable == known::native_godot_variant()
    }
}

impl VariantMarshaller for VariantVariantMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
    }

    fn needs_cleanup(&self) -> bool {
        false
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        if self.is_native() {
            writer.write_line(&format!("{destination} = &{source};"));
        } else {
            writer.write_line(&format!(
                "{destination} = {source}.NativeValue.DangerousSelfRef.GetUnsafeAddress();"
            ));
        }
        Ok(())
    }

    fn write_convert_from(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Unmarshal)?;
        if self.is_native() {
            writer.write_line(&format!("{destination} = *{source};"));
        } else {
            writer.write_line(&format!(
                "{destination} = {}.CreateTakingOwnership(*{source});",
                known::variant().full_name_with_global()
            ));
        }
        Ok(())
    }

    fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
        Ok(())
    }
}
