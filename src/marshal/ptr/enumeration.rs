use gdmarshal_writer::IndentedWriter;

use super::{IntegerPtrMarshaller, PtrMarshaller};
use crate::marshal::{ensure_type, MarshalError, Operation};
use crate::types::{known, TypeDescriptor};

/// Enums cross the ABI as 64-bit integers.
///
/// Synthesized on demand by the enum fallback; never registered per enum.
#[derive(Debug, Clone)]
pub struct EnumPtrMarshaller {
    marshallable: TypeDescriptor,
    underlying_type: TypeDescriptor,
    underlying: IntegerPtrMarshaller,
}

impl EnumPtrMarshaller {
    /// An enum backed by `int`.
    pub fn new(marshallable: TypeDescriptor) -> Self {
        Self::with_underlying(marshallable, known::int32())
    }

    pub fn with_underlying(marshallable: TypeDescriptor, underlying_type: TypeDescriptor) -> Self {
        Self {
            marshallable,
            underlying_type,
            underlying: IntegerPtrMarshaller::new(),
        }
    }
}

impl PtrMarshaller for EnumPtrMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
    }

    fn unmanaged_pointer_type(&self) -> &TypeDescriptor {
        self.underlying.unmanaged_pointer_type()
    }

    fn needs_cleanup(&self) -> bool {
        self.underlying.needs_cleanup()
    }

    fn write_setup(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        self.underlying
            .write_setup(writer, &self.underlying_type, &format!("(long){source}"), destination)
    }

    fn write_setup_uninitialized(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        destination: &str,
    ) -> Result<Option<String>, MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        self.underlying
            .write_setup_uninitialized(writer, &self.underlying_type, destination)
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        let pointer = self.underlying.unmanaged_pointer_type().full_name_with_global();
        writer.write_line(&format!("{destination} = ({pointer})(&{source});"));
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
        writer.write_line(&format!("{destination} = ({})(*{source});", ty.full_name_with_global()));
        Ok(())
    }

    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError> {
        self.underlying.write_free(writer, ty, source)
    }
}
