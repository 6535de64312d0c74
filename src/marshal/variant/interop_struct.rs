use gdmarshal_writer::IndentedWriter;

use super::VariantMarshaller;
use crate::marshal::{MarshalError, Operation, NATIVE_VARIANT};
use crate::types::TypeDescriptor;

/// Built-in structs and collections with dedicated `CreateFrom{Name}` /
/// `ConvertTo{Name}` helpers on `NativeGodotVariant`.
#[derive(Debug, Clone)]
pub struct InteropStructVariantMarshaller {
    marshallable: TypeDescriptor,
    unmanaged: TypeDescriptor,
    engine_name: String,
    create_suffix: String,
}

impl InteropStructVariantMarshaller {
    pub fn new(marshallable: TypeDescriptor, engine_name: &str) -> Self {
        Self {
            unmanaged: marshallable.clone(),
            marshallable,
            engine_name: engine_name.to_string(),
            create_suffix: String::new(),
        }
    }

    /// The native struct the managed value wraps (`NativeValue.DangerousSelfRef`).
    pub fn with_unmanaged(mut self, unmanaged: TypeDescriptor) -> Self {
        self.unmanaged = unmanaged;
        self
    }

    /// Suffix of the create helper, e.g. `Copying` or `TakingOwnership`.
    pub fn with_create_suffix(mut self, suffix: &str) -> Self {
        self.create_suffix = suffix.to_string();
        self
    }

    /// The registered type, or any construction of it when it is a generic definition.
    fn check(&self, ty: &TypeDescriptor, operation: Operation) -> Result<(), MarshalError> {
        if *ty == self.marshallable
            || (ty.is_constructed_generic() && ty.generic_definition() == self.marshallable)
        {
            Ok(())
        } else {
            Err(MarshalError::unsupported(ty, &self.marshallable, operation))
        }
    }

    /// Whether `ty` wraps the native struct rather than being it.
    fn wraps(&self, ty: &TypeDescriptor) -> bool {
        *ty != self.unmanaged && ty.generic_definition() != self.unmanaged
    }
}

impl VariantMarshaller for InteropStructVariantMarshaller {
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
        self.check(ty, Operation::Marshal)?;
        let self_ref = if self.wraps(ty) { ".NativeValue.DangerousSelfRef" } else { "" };
        let call = format!(
            "{NATIVE_VARIANT}.CreateFrom{}{}({source}{self_ref}).GetUnsafeAddress()",
            self.engine_name, self.create_suffix
        );
        if ty.is_reference_type() {
            writer.write_line(&format!("{destination} = {source} is not null ? {call} : default;"));
        } else {
            writer.write_line(&format!("{destination} = {call};"));
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
        self.check(ty, Operation::Unmarshal)?;
        let call = format!("{NATIVE_VARIANT}.ConvertTo{}(*{source})", self.engine_name);
        if self.wraps(ty) {
            writer.write_line(&format!(
                "{destination} = {}.CreateTakingOwnership({call});",
                ty.full_name_with_global()
            ));
        } else {
            writer.write_line(&format!("{destination} = {call};"));
        }
        Ok(())
    }

    fn write_free(&self, _: &mut IndentedWriter, _: &TypeDescriptor, _: &str) -> Result<(), MarshalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::known;

    #[test]
    fn test_plain_struct() {
        let marshaller = InteropStructVariantMarshaller::new(known::vector2(), "Vector2");
        let mut writer = IndentedWriter::new();
        marshaller.write_convert_to(&mut writer, &known::vector2(), "v", "__args[0]").unwrap();
        marshaller.write_convert_from(&mut writer, &known::vector2(), "&__retVar", "__ret").unwrap();
        assert_eq!(
            writer.as_str(),
            "__args[0] = global::Godot.NativeInterop.NativeGodotVariant.CreateFromVector2(v).GetUnsafeAddress();\n\
             __ret = global::Godot.NativeInterop.NativeGodotVariant.ConvertToVector2(*&__retVar);\n"
        );
    }

    #[test]
    fn test_generic_collection_wrapper() {
        let marshaller = InteropStructVariantMarshaller::new(known::godot_array_generic(), "Array")
            .with_unmanaged(known::native_godot_array())
            .with_create_suffix("Copying");
        let nodes = known::godot_array_of(&TypeDescriptor::reference("Godot", "Node")).unwrap();
        let mut writer = IndentedWriter::new();
        marshaller.write_convert_to(&mut writer, &nodes, "children", "__args[0]").unwrap();
        marshaller.write_convert_from(&mut writer, &nodes, "&__retVar", "__ret").unwrap();
        assert_eq!(
            writer.as_str(),
            "__args[0] = children is not null ? global::Godot.NativeInterop.NativeGodotVariant.CreateFromArrayCopying(children.NativeValue.DangerousSelfRef).GetUnsafeAddress() : default;\n\
             __ret = global::Godot.Collections.GodotArray<global::Godot.Node>.CreateTakingOwnership(global::Godot.NativeInterop.NativeGodotVariant.ConvertToArray(*&__retVar));\n"
        );
    }

    #[test]
    fn test_rejects_unrelated_type() {
        let marshaller = InteropStructVariantMarshaller::new(known::vector2(), "Vector2");
        let mut writer = IndentedWriter::new();
        assert!(marshaller
            .write_convert_to(&mut writer, &known::vector3(), "v", "d")
            .is_err());
    }
}
