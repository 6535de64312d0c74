//! `NativeGodotVariant` conversion helpers: `ConvertTo{T}` and
//! `CreateFrom{T}` bodies that call the engine's cached variant
//! constructors directly.
//!
//! A taking-ownership conversion may hand back the payload already stored
//! in the variant; a copying one always goes through the engine.

use gdmarshal_writer::IndentedWriter;

use super::{BodyError, BodyOutline, MethodBody, Phase, Signature};
use crate::registry::TypeDb;
use crate::types::{known, TypeDescriptor};

/// The return type of a `ConvertTo{T}` helper, which must be a struct.
fn conversion_return_type(signature: &Signature) -> Result<&TypeDescriptor, BodyError> {
    match signature.return_type() {
        Some(ty) if ty.is_value_type() => Ok(ty),
        _ => Err(BodyError::invalid_signature(
            signature.name(),
            "variant ConvertTo methods must return a struct type",
        )),
    }
}

fn write_nil_string_guard(ty: &TypeDescriptor, writer: &mut IndentedWriter) {
    // The engine would stringify nil as "Null".
    if *ty == known::native_godot_string() {
        writer.write_line("// Avoid converting null Variants to the string \"Null\".");
        writer.write_line("if (value.Type == global::Godot.VariantType.Nil)");
        writer.open_block();
        writer.write_line("return default;");
        writer.close_block();
    }
}

fn write_constructor_call(target: &str, ty: &TypeDescriptor, writer: &mut IndentedWriter) {
    writer.write_line(&format!("{} dest = default;", ty.full_name_with_global()));
    writer.write_line(&format!("_variantTo{target}Constructor(&dest, value.GetUnsafeAddress());"));
    writer.write_line("return dest;");
}

fn invoke_outline() -> BodyOutline {
    BodyOutline {
        phases: vec![Phase::Invoke],
        ..BodyOutline::default()
    }
}

/// `ConvertTo{T}` that leaves the source variant untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertToVariantCopying {
    target: String,
}

impl ConvertToVariantCopying {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }
}

impl MethodBody for ConvertToVariantCopying {
    fn write(&self, _: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        let ty = conversion_return_type(signature)?;
        write_nil_string_guard(ty, writer);
        write_constructor_call(&self.target, ty, writer);
        Ok(invoke_outline())
    }
}

/// `ConvertTo{T}` that may return the payload stored in the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertToVariantTakingOwnership {
    target: String,
    is_packed_array: bool,
    is_pointer_in_variant: bool,
}

impl ConvertToVariantTakingOwnership {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            is_packed_array: false,
            is_pointer_in_variant: false,
        }
    }

    /// Packed arrays are not readable from the variant struct, so the fast
    /// path is skipped.
    pub fn packed_array(mut self) -> Self {
        self.is_packed_array = true;
        self
    }

    /// The variant stores a pointer to the payload, which must be dereferenced.
    pub fn pointer_in_variant(mut self) -> Self {
        self.is_pointer_in_variant = true;
        self
    }
}

impl MethodBody for ConvertToVariantTakingOwnership {
    fn write(&self, _: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        let ty = conversion_return_type(signature)?;
        let target = &self.target;

        if !self.is_packed_array {
            writer.write_line("// Avoid the interop call if the Variant is already the type we want.");
            writer.write_line(&format!("if (value.Type == global::Godot.VariantType.{target})"));
            writer.open_block();
            let deref = if self.is_pointer_in_variant { "*" } else { "" };
            writer.write_line(&format!("return {deref}value.{target};"));
            writer.close_block();

            write_nil_string_guard(ty, writer);

            // Anything else is not an object and can't become one.
            if *ty == known::int_ptr() {
                writer.write_line("return default;");
                return Ok(BodyOutline::default());
            }
        }

        write_constructor_call(target, ty, writer);
        Ok(invoke_outline())
    }
}

/// `CreateFrom{T}`: builds a variant from a copy of its single parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVariantCopying {
    target: String,
}

impl CreateVariantCopying {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }
}

impl MethodBody for CreateVariantCopying {
    fn write(&self, db: &TypeDb, signature: &Signature, writer: &mut IndentedWriter) -> Result<BodyOutline, BodyError> {
        let ty = match signature.parameters() {
            [parameter] if parameter.ty().is_value_type() => parameter.ty(),
            _ => {
                return Err(BodyError::invalid_signature(
                    signature.name(),
                    "variant CreateFrom methods must take exactly one struct parameter",
                ));
            }
        };
        let marshaller = db.ptr_marshaller(ty)?;

        if *ty == known::int_ptr() {
            writer.write_line("// Avoid interop call for null pointers.");
            writer.write_line("if (value == 0)");
            writer.open_block();
            writer.write_line("return default;");
            writer.close_block();
        }

        writer.write_line(&format!(
            "{} __valueNative = null;",
            marshaller.unmanaged_pointer_type().full_name_with_global()
        ));
        writer.write_line("try");
        writer.open_block();
        marshaller.write_convert_to(writer, ty, "value", "__valueNative")?;
        writer.write_line("global::Godot.NativeInterop.NativeGodotVariant destination = default;");
        writer.write_line(&format!(
            "_variantFrom{}Constructor(destination.GetUnsafeAddress(), __valueNative);",
            self.target
        ));
        writer.write_line("return destination;");
        writer.close_block();
        writer.write_line("finally");
        writer.open_block();
        marshaller.write_free(writer, ty, "__valueNative")?;
        writer.close_block();

        let freed = if marshaller.needs_cleanup() {
            vec!["value".to_string()]
        } else {
            Vec::new()
        };
        Ok(BodyOutline {
            phases: vec![Phase::MarshalIn, Phase::Invoke, Phase::Cleanup],
            guarded: true,
            freed,
        })
    }
}
