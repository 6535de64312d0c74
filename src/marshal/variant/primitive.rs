use gdmarshal_writer::IndentedWriter;

use super::VariantMarshaller;
use crate::marshal::{MarshalError, NATIVE_VARIANT};
use crate::types::{known, TypeDescriptor};

macro_rules! numeric_variant_marshaller {
    ($(#[$doc:meta])* $name:ident, $wide:expr, $keyword:literal, $suffix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            wide: TypeDescriptor,
        }

        impl $name {
            pub fn new() -> Self {
                Self { wide: $wide }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl VariantMarshaller for $name {
            fn marshallable_type(&self) -> &TypeDescriptor {
                &self.wide
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
                let value = if *ty == self.wide {
                    source.to_string()
                } else {
                    format!("({})({source})", $keyword)
                };
                writer.write_line(&format!(
                    "{destination} = {NATIVE_VARIANT}.CreateFrom{}({value}).GetUnsafeAddress();",
                    $suffix
                ));
                Ok(())
            }

            fn write_convert_from(
                &self,
                writer: &mut IndentedWriter,
                ty: &TypeDescriptor,
                source: &str,
                destination: &str,
            ) -> Result<(), MarshalError> {
                let cast = if *ty == self.wide {
                    String::new()
                } else {
                    format!("({})", ty.full_name_with_global())
                };
                writer.write_line(&format!(
                    "{destination} = {cast}{NATIVE_VARIANT}.ConvertTo{}(*{source});",
                    $suffix
                ));
                Ok(())
            }

            fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
                Ok(())
            }
        }
    };
}

numeric_variant_marshaller!(
    /// Integers are stored in variants as `long`.
    IntegerVariantMarshaller,
    known::int64(),
    "long",
    "Int"
);

numeric_variant_marshaller!(
    /// Floating point values are stored in variants as `double`.
    FloatingPointVariantMarshaller,
    known::double(),
    "double",
    "Float"
);
