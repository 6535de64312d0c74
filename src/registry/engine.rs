//! Registrations for the engine classes and enums declared by the API
//! being generated, on top of [`register_known_types`](super::register_known_types).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::logging::debug;
use crate::types::TypeDescriptor;

use super::{RegistrationError, TypeDbBuilder};

/// Namespace every generated engine type lives in.
pub const ENGINE_NAMESPACE: &str = "Godot";

/// An engine class and the class it inherits from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineClass {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub base: Option<String>,
}

impl EngineClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
        }
    }

    pub fn inheriting(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }
}

/// Register every class in `classes`, linking each to its base.
///
/// Bases may be declared in any order, or registered beforehand (`Object`
/// is a known type). Classes already registered under their engine name
/// are left untouched.
pub fn register_engine_classes(builder: &mut TypeDbBuilder, classes: &[EngineClass]) -> Result<(), RegistrationError> {
    let declared: FxHashMap<&str, &EngineClass> = classes.iter().map(|class| (class.name.as_str(), class)).collect();
    let mut resolver = ClassResolver {
        builder,
        declared,
        in_progress: FxHashSet::default(),
    };
    for class in classes {
        resolver.resolve(&class.name)?;
    }
    Ok(())
}

struct ClassResolver<'a, 'b> {
    builder: &'a mut TypeDbBuilder,
    declared: FxHashMap<&'b str, &'b EngineClass>,
    in_progress: FxHashSet<String>,
}

impl ClassResolver<'_, '_> {
    fn resolve(&mut self, name: &str) -> Result<TypeDescriptor, RegistrationError> {
        if let Some(ty) = self.builder.registered_name(name) {
            return Ok(ty.clone());
        }
        let Some(class) = self.declared.get(name).copied() else {
            return Err(RegistrationError::UnknownBaseClass {
                class: name.to_string(),
                base: name.to_string(),
            });
        };
        if !self.in_progress.insert(name.to_string()) {
            return Err(RegistrationError::CyclicBaseClass(name.to_string()));
        }

        let mut ty = TypeDescriptor::reference(ENGINE_NAMESPACE, name);
        if let Some(base_name) = &class.base {
            if !self.declared.contains_key(base_name.as_str()) && self.builder.registered_name(base_name).is_none() {
                return Err(RegistrationError::UnknownBaseClass {
                    class: name.to_string(),
                    base: base_name.clone(),
                });
            }
            ty = ty.with_base(self.resolve(base_name)?);
        }

        self.in_progress.remove(name);
        debug!(class = name, base = ?class.base, "registered engine class");
        self.builder.register_name(name, ty.clone())?;
        Ok(ty)
    }
}

/// Register engine enums by their dotted engine name (`Node.ProcessMode`,
/// `Error`). Enum marshalling and parsing come from the enum fallbacks.
pub fn register_engine_enums<S: AsRef<str>>(builder: &mut TypeDbBuilder, enums: &[S]) -> Result<(), RegistrationError> {
    for name in enums {
        let name = name.as_ref();
        builder.register_name(name, TypeDescriptor::enumeration(ENGINE_NAMESPACE, name))?;
    }
    Ok(())
}
