//! Writers for blittable structs and the numeric primitives.
//!
//! Integers travel as `long` and floating point values as `double`, so any
//! narrower type is widened into an auxiliary local first.

use gdmarshal_writer::IndentedWriter;

use super::PtrMarshaller;
use crate::marshal::{ensure_type, MarshalError, Operation};
use crate::types::{known, TypeDescriptor};

/// A value type whose managed and unmanaged layouts are identical.
#[derive(Debug, Clone)]
pub struct BlittablePtrMarshaller {
    marshallable: TypeDescriptor,
    unmanaged_pointer: TypeDescriptor,
}

impl BlittablePtrMarshaller {
    pub fn new(marshallable: TypeDescriptor) -> Result<Self, MarshalError> {
        if !marshallable.is_value_type() {
            return Err(MarshalError::NotValueType(marshallable.full_name()));
        }
        let unmanaged_pointer = marshallable.make_pointer();
        Ok(Self {
            marshallable,
            unmanaged_pointer,
        })
    }
}

impl PtrMarshaller for BlittablePtrMarshaller {
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
        writer.write_line(&format!("{destination} = &{source};"));
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
        writer.write_line(&format!("{destination} = *{source};"));
        Ok(())
    }

    fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
        Ok(())
    }
}

/// Shared shape of the two widening writers.
#[derive(Debug, Clone)]
struct Widening {
    wide: TypeDescriptor,
    wide_pointer: TypeDescriptor,
    keyword: &'static str,
    /// The one narrower type that needs an explicit cast when widening.
    explicit_cast: TypeDescriptor,
}

impl Widening {
    fn new(wide: TypeDescriptor, keyword: &'static str, explicit_cast: TypeDescriptor) -> Self {
        let wide_pointer = wide.make_pointer();
        Self {
            wide,
            wide_pointer,
            keyword,
            explicit_cast,
        }
    }

    fn write_setup(
        &self,
        writer: &mut IndentedWriter,
        ty: &TypeDescriptor,
        source: &str,
        destination: &str,
    ) -> Option<String> {
        if *ty == self.wide {
            return None;
        }
        let keyword = self.keyword;
        let cast = if *ty == self.explicit_cast {
            format!("({keyword})")
        } else {
            String::new()
        };
        writer.write_line(&format!("{keyword} {destination} = {cast}{source};"));
        Some(destination.to_string())
    }

    fn write_setup_uninitialized(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, destination: &str) -> Option<String> {
        if *ty == self.wide {
            return None;
        }
        writer.write_line(&format!("{} {destination};", self.keyword));
        writer.write_line(&format!(
            "global::System.Runtime.CompilerServices.Unsafe.SkipInit(out {destination});"
        ));
        Some(destination.to_string())
    }

    fn write_convert_from(&self, writer: &mut IndentedWriter, ty: &TypeDescriptor, source: &str, destination: &str) {
        if *ty == self.wide {
            writer.write_line(&format!("{destination} = *{source};"));
        } else {
            writer.write_line(&format!("{destination} = ({})(*{source});", ty.full_name_with_global()));
        }
    }
}

macro_rules! widening_marshaller {
    ($(#[$doc:meta])* $name:ident, $wide:expr, $keyword:literal, $explicit:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(Widening);

        impl $name {
            pub fn new() -> Self {
                Self(Widening::new($wide, $keyword, $explicit))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl PtrMarshaller for $name {
            fn marshallable_type(&self) -> &TypeDescriptor {
                &self.0.wide
            }

            fn unmanaged_pointer_type(&self) -> &TypeDescriptor {
                &self.0.wide_pointer
            }

            fn needs_cleanup(&self) -> bool {
                false
            }

            fn write_setup(
                &self,
                writer: &mut IndentedWriter,
                ty: &TypeDescriptor,
                source: &str,
                destination: &str,
            ) -> Result<Option<String>, MarshalError> {
                Ok(self.0.write_setup(writer, ty, source, destination))
            }

            fn write_setup_uninitialized(
                &self,
                writer: &mut IndentedWriter,
                ty: &TypeDescriptor,
                destination: &str,
            ) -> Result<Option<String>, MarshalError> {
                Ok(self.0.write_setup_uninitialized(writer, ty, destination))
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

            fn write_convert_from(
                &self,
                writer: &mut IndentedWriter,
                ty: &TypeDescriptor,
                source: &str,
                destination: &str,
            ) -> Result<(), MarshalError> {
                self.0.write_convert_from(writer, ty, source, destination);
                Ok(())
            }

            fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
                Ok(())
            }
        }
    };
}

widening_marshaller!(
    /// Every integer type, carried as a 64-bit `long`.
    IntegerPtrMarshaller,
    known::int64(),
    "long",
    known::uint64()
);

widening_marshaller!(
    /// `Half`, `Single` and `Double`, carried as a 64-bit `double`.
    FloatingPointPtrMarshaller,
    known::double(),
    "double",
    known::half()
);
