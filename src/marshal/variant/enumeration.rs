use gdmarshal_writer::IndentedWriter;

use super::{IntegerVariantMarshaller, VariantMarshaller};
use crate::marshal::{ensure_type, MarshalError, Operation, NATIVE_VARIANT};
use crate::types::{known, TypeDescriptor};

/// Enums are stored in variants as integers.
#[derive(Debug, Clone)]
pub struct EnumVariantMarshaller {
    marshallable: TypeDescriptor,
    underlying_type: TypeDescriptor,
    underlying: IntegerVariantMarshaller,
}

impl EnumVariantMarshaller {
    pub fn new(marshallable: TypeDescriptor) -> Self {
        Self {
            marshallable,
            underlying_type: known::int32(),
            underlying: IntegerVariantMarshaller::new(),
        }
    }
}

impl VariantMarshaller for EnumVariantMarshaller {
    fn marshallable_type(&self) -> &TypeDescriptor {
        &self.marshallable
    }

    fn needs_cleanup(&self) -> bool {
        self.underlying.needs_cleanup()
    }

    fn write_convert_to(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Marshal)?;
        self.underlying
            .write_convert_to(writer, &self.underlying_type, source, destination)
    }

    fn write_convert_from(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Result<(), MarshalError> {
        ensure_type(ty, &self.marshallable, Operation::Unmarshal)?;
        writer.write_line(&format!(
            "{destination} = ({}){NATIVE_VARIANT}.ConvertToInt(*{source});",
            ty.full_name_with_global()
        ));
        Ok(())
    }

    fn write_free(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str) -> Result<(), MarshalError> {
        self.underlying.write_free(writer, ty, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_variant_text() {
        let flags = TypeDescriptor::enumeration("Godot", "Control.SizeFlags");
        let marshaller = EnumVariantMarshaller::new(flags.clone());
        let mut writer = IndentedWriter::new();
        marshaller.write_convert_to(&mut writer, &flags, "flags", "__args[0]").unwrap();
        marshaller.write_convert_from(&mut writer, &flags, "&__retVar", "__ret").unwrap();
        assert_eq!(
            writer.as_str(),
            "__args[0] = global::Godot.NativeInterop.NativeGodotVariant.CreateFromInt((long)(flags)).GetUnsafeAddress();\n\
             __ret = (global::Godot.Control.SizeFlags)global::Godot.NativeInterop.NativeGodotVariant.ConvertToInt(*&__retVar);\n"
        );
    }
}
