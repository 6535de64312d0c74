use gdmarshal_writer::IndentedWriter;

use super::PtrMarshaller;
use crate::marshal::{ensure_type, MarshalError, Operation};
use crate::types::TypeDescriptor;

/// Managed wrappers over a native struct (`NativeValue.DangerousSelfRef`)
/// and the native ref structs themselves.
#[derive(Debug, Clone)]
pub struct InteropStructPtrMarshaller {
    marshallable: TypeDescriptor,
    unmanaged_pointer: TypeDescriptor,
}

impl InteropStructPtrMarshaller {
    /// Marshal `marshallable` through `unmanaged_pointer`. Without an explicit
    /// pointer type, `marshallable` must be a ref struct and is passed by address.
    pub fn new(marshallable: TypeDescriptor, unmanaged_pointer: Option<TypeDescriptor>) -> Result<Self, MarshalError> {
        let unmanaged_pointer = match unmanaged_pointer {
            Some(pointer) if !pointer.is_pointer() => {
                return Err(MarshalError::NotPointer(pointer.full_name()));
            }
            Some(pointer) => pointer,
            None if !marshallable.is_by_ref_like() => {
                return Err(MarshalError::NotByRefLike(marshallable.full_name()));
            }
            None => marshallable.make_pointer(),
        };
        Ok(Self {
            marshallable,
            unmanaged_pointer,
        })
    }
}

impl PtrMarshaller for InteropStructPtrMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
    }

    fn unmanaged_pointer_type(&self) -> &TypeDescriptor {
        &self.unmanaged_pointer
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
        let mut line = format!("{destination} = ");
        if ty.is_reference_type() {
            line.push_str(&format!("{source} is not null ? "));
        }
        line.push_str(source);
        if !ty.is_by_ref_like() {
            line.push_str(".NativeValue.DangerousSelfRef");
        }
        line.push_str(".GetUnsafeAddress()");
        if ty.is_reference_type() {
            line.push_str(" : default");
        }
        line.push(';');
        writer.write_line(&line);
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
        if ty.is_by_ref_like() {
            writer.write_line(&format!("{destination} = *{source};"));
        } else {
            writer.write_line(&format!(
                "{destination} = {}.CreateTakingOwnership(*{source});",
                self.marshallable.full_name_with_global()
            ));
        }
        Ok(())
    }

    fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
        Ok(())
    }
}
