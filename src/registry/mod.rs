//! The type resolution and marshaller registry.
//!
//! A generation run builds one registry in two phases. A [`TypeDbBuilder`]
//! collects engine names, unmanaged mappings, marshaller writers and
//! default value parsers; [`TypeDbBuilder::build`] freezes it into a
//! [`TypeDb`] that every resolver and synthesizer borrows.
//!
//! Lookups that miss a direct registration fall back through the shared
//! rules in [`fallback`]. The only state a built registry still mutates is
//! the append-only cache of synthesized engine types (`typedarray::T`,
//! undeclared `enum::T`).
//!
//! # Module Organization
//!
//! - [`fallback`] - [`FallbackRule`] and the shared resolution walk
//! - [`known`] - [`register_known_types`], the built-in registrations
//! - [`engine`] - engine classes and enums declared by the API
//! - `error` - [`RegistrationError`] and [`ResolveError`]
//!
//! # Example
//!
//! ```ignore
//! use gdmarshal::registry::{register_known_types, KnownTypeOptions, TypeDbBuilder};
//!
//! let mut builder = TypeDbBuilder::new();
//! register_known_types(&mut builder, &KnownTypeOptions::default())?;
//! let db = builder.build();
//!
//! let nodes = db.resolve_by_engine_name("typedarray::StringName", None)?;
//! let unmanaged = db.resolve_unmanaged(&nodes)?;
//! ```

pub mod engine;
mod error;
pub mod fallback;
pub mod known;

pub use engine::{register_engine_classes, register_engine_enums, EngineClass};
pub use error::{RegistrationError, ResolveError};
pub use fallback::FallbackRule;
pub use known::{register_known_types, FloatPrecision, KnownTypeOptions};

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::defaults::DefaultValueParser;
use crate::logging::{debug, info, trace, warn};
use crate::marshal::ptr::{EnumPtrMarshaller, NullablePtrMarshaller, PtrPtrMarshaller};
use crate::marshal::variant::EnumVariantMarshaller;
use crate::marshal::{PtrMarshaller, VariantMarshaller};
use crate::types::{known as known_types, TypeDescriptor};
use fallback::{resolve_with_fallback, FallbackTarget};

const ENUM_PREFIX: &str = "enum::";
const BITFIELD_PREFIX: &str = "bitfield::";
const TYPED_ARRAY_PREFIX: &str = "typedarray::";
const CONST_PREFIX: &str = "const ";

fn meta_key(name: &str, meta: &str) -> String {
    format!("{name}:{meta}")
}

/// Registrations shared by the builder and the built registry.
#[derive(Default)]
struct Tables {
    names: FxHashMap<String, TypeDescriptor>,
    meta_names: FxHashMap<String, TypeDescriptor>,
    unmanaged: FxHashMap<TypeDescriptor, TypeDescriptor>,
    ptr_marshallers: FxHashMap<TypeDescriptor, Rc<dyn PtrMarshaller>>,
    variant_marshallers: FxHashMap<TypeDescriptor, Rc<dyn VariantMarshaller>>,
    default_parsers: FxHashMap<TypeDescriptor, DefaultValueParser>,
}

/// Mutable registration phase of a [`TypeDb`].
///
/// Registration is monotonic: repeating an identical name, unmanaged
/// mapping or parser is a no-op, anything else that collides is an error.
#[derive(Default)]
pub struct TypeDbBuilder {
    tables: Tables,
}

impl TypeDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an engine type name to a target type.
    pub fn register_name(&mut self, engine_name: &str, ty: TypeDescriptor) -> Result<(), RegistrationError> {
        match self.tables.names.get(engine_name) {
            Some(existing) if *existing == ty => Ok(()),
            Some(_) => Err(RegistrationError::DuplicateName(engine_name.to_string())),
            None => {
                trace!(engine_name, ty = %ty, "registered engine name");
                self.tables.names.insert(engine_name.to_string(), ty);
                Ok(())
            }
        }
    }

    /// Map an engine type name qualified by its metadata (e.g. `int` + `uint8`).
    pub fn register_meta_name(
        &mut self,
        engine_name: &str,
        engine_meta: &str,
        ty: TypeDescriptor,
    ) -> Result<(), RegistrationError> {
        let key = meta_key(engine_name, engine_meta);
        match self.tables.meta_names.get(&key) {
            Some(existing) if *existing == ty => Ok(()),
            Some(_) => Err(RegistrationError::DuplicateMetaName {
                name: engine_name.to_string(),
                meta: engine_meta.to_string(),
            }),
            None => {
                self.tables.meta_names.insert(key, ty);
                Ok(())
            }
        }
    }

    /// Declare the unmanaged representation `ty` crosses the ABI as.
    pub fn register_unmanaged(
        &mut self,
        ty: TypeDescriptor,
        unmanaged: TypeDescriptor,
    ) -> Result<(), RegistrationError> {
        if unmanaged.is_reference_type() {
            return Err(RegistrationError::ReferenceUnmanaged {
                ty: ty.full_name(),
                unmanaged: unmanaged.full_name(),
            });
        }
        match self.tables.unmanaged.get(&ty) {
            Some(existing) if *existing == unmanaged => Ok(()),
            Some(_) => Err(RegistrationError::ConflictingUnmanaged(ty.full_name())),
            None => {
                self.tables.unmanaged.insert(ty, unmanaged);
                Ok(())
            }
        }
    }

    /// Declare that `ty` is its own unmanaged representation.
    pub fn register_unmanaged_self(&mut self, ty: TypeDescriptor) -> Result<(), RegistrationError> {
        self.register_unmanaged(ty.clone(), ty)
    }

    pub fn register_ptr_marshaller<M>(&mut self, ty: TypeDescriptor, marshaller: M) -> Result<(), RegistrationError>
    where
        M: PtrMarshaller + 'static,
    {
        if self.tables.ptr_marshallers.contains_key(&ty) {
            return Err(RegistrationError::DuplicatePtrMarshaller(ty.full_name()));
        }
        self.tables.ptr_marshallers.insert(ty, Rc::new(marshaller));
        Ok(())
    }

    pub fn register_variant_marshaller<M>(&mut self, ty: TypeDescriptor, marshaller: M) -> Result<(), RegistrationError>
    where
        M: VariantMarshaller + 'static,
    {
        if self.tables.variant_marshallers.contains_key(&ty) {
            return Err(RegistrationError::DuplicateVariantMarshaller(ty.full_name()));
        }
        self.tables.variant_marshallers.insert(ty, Rc::new(marshaller));
        Ok(())
    }

    pub fn register_default_parser(
        &mut self,
        ty: TypeDescriptor,
        parser: DefaultValueParser,
    ) -> Result<(), RegistrationError> {
        match self.tables.default_parsers.get(&ty) {
            Some(existing) if *existing == parser => Ok(()),
            Some(_) => Err(RegistrationError::DuplicateDefaultParser(ty.full_name())),
            None => {
                self.tables.default_parsers.insert(ty, parser);
                Ok(())
            }
        }
    }

    /// Look up a name registered so far, without any fallback.
    pub fn registered_name(&self, engine_name: &str) -> Option<&TypeDescriptor> {
        self.tables.names.get(engine_name)
    }

    /// Freeze the registrations.
    pub fn build(self) -> TypeDb {
        info!(
            names = self.tables.names.len(),
            meta_names = self.tables.meta_names.len(),
            unmanaged = self.tables.unmanaged.len(),
            ptr_marshallers = self.tables.ptr_marshallers.len(),
            variant_marshallers = self.tables.variant_marshallers.len(),
            default_parsers = self.tables.default_parsers.len(),
            "type registry built"
        );
        TypeDb {
            tables: self.tables,
            synthesized: RefCell::new(Synthesized::default()),
        }
    }
}

/// Engine types created on demand while resolving names.
#[derive(Default)]
struct Synthesized {
    names: FxHashMap<String, TypeDescriptor>,
    unmanaged: FxHashMap<TypeDescriptor, TypeDescriptor>,
}

/// The read-only registry every resolver and synthesizer borrows.
pub struct TypeDb {
    tables: Tables,
    synthesized: RefCell<Synthesized>,
}

impl TypeDb {
    /// Resolve an engine type name, optionally qualified by its metadata.
    ///
    /// Understands `enum::` / `bitfield::` prefixes, `typedarray::T` and C
    /// pointer spellings such as `const uint8_t **`.
    pub fn resolve_by_engine_name(&self, engine_name: &str, engine_meta: Option<&str>) -> Result<TypeDescriptor, ResolveError> {
        self.find_engine_type(engine_name, engine_meta)?
            .ok_or_else(|| ResolveError::UnknownEngineType(engine_name.to_string()))
    }

    /// Like [`resolve_by_engine_name`](Self::resolve_by_engine_name), but an
    /// unknown name is `Ok(None)`. Malformed pointer names are still errors.
    pub fn try_resolve_by_engine_name(
        &self,
        engine_name: &str,
        engine_meta: Option<&str>,
    ) -> Result<Option<TypeDescriptor>, ResolveError> {
        self.find_engine_type(engine_name, engine_meta)
    }

    /// The unmanaged type `ty` is converted to when crossing the ABI.
    pub fn resolve_unmanaged(&self, ty: &TypeDescriptor) -> Result<TypeDescriptor, ResolveError> {
        resolve_with_fallback(&UnmanagedLookup(self), ty).ok_or_else(|| ResolveError::NoUnmanagedMapping(ty.full_name()))
    }

    /// The pointer writer for `ty`.
    pub fn ptr_marshaller(&self, ty: &TypeDescriptor) -> Result<Rc<dyn PtrMarshaller>, ResolveError> {
        resolve_with_fallback(&PtrLookup(self), ty).ok_or_else(|| ResolveError::NoPtrMarshaller(ty.full_name()))
    }

    /// The variant writer for `ty`.
    pub fn variant_marshaller(&self, ty: &TypeDescriptor) -> Result<Rc<dyn VariantMarshaller>, ResolveError> {
        resolve_with_fallback(&VariantLookup(self), ty).ok_or_else(|| ResolveError::NoVariantMarshaller(ty.full_name()))
    }

    /// The parser for default value literals of `ty`, if any.
    pub fn default_parser(&self, ty: &TypeDescriptor) -> Option<DefaultValueParser> {
        resolve_with_fallback(&ParserLookup(self), ty)
    }

    /// Number of engine types synthesized so far.
    pub fn synthesized_count(&self) -> usize {
        self.synthesized.borrow().names.len()
    }

    fn find_engine_type(&self, engine_name: &str, engine_meta: Option<&str>) -> Result<Option<TypeDescriptor>, ResolveError> {
        if let Some(meta) = engine_meta
            && let Some(ty) = self.tables.meta_names.get(&meta_key(engine_name, meta))
        {
            return Ok(Some(ty.clone()));
        }
        if let Some(ty) = self.tables.names.get(engine_name) {
            return Ok(Some(ty.clone()));
        }
        let cached = self.synthesized.borrow().names.get(engine_name).cloned();
        if cached.is_some() {
            return Ok(cached);
        }

        for prefix in [ENUM_PREFIX, BITFIELD_PREFIX] {
            if let Some(stripped) = engine_name.strip_prefix(prefix) {
                return match self.find_engine_type(stripped, None)? {
                    Some(ty) => Ok(Some(ty)),
                    None => Ok(Some(self.synthesize_enum(engine_name, stripped))),
                };
            }
        }

        if let Some(element_name) = engine_name.strip_prefix(TYPED_ARRAY_PREFIX) {
            return self.synthesize_typed_array(engine_name, element_name).map(Some);
        }

        if engine_name.contains('*') {
            return self.find_pointer_type(engine_name);
        }

        Ok(None)
    }

    /// An enum the engine referenced but that was never declared. Its
    /// values are unknown but it still marshals as a 64-bit integer.
    fn synthesize_enum(&self, engine_name: &str, enum_name: &str) -> TypeDescriptor {
        let ty = TypeDescriptor::enumeration("Godot", enum_name);
        debug!(engine_name, ty = %ty, "synthesized undeclared enum");
        self.synthesized
            .borrow_mut()
            .names
            .insert(engine_name.to_string(), ty.clone());
        ty
    }

    fn synthesize_typed_array(&self, engine_name: &str, element_name: &str) -> Result<TypeDescriptor, ResolveError> {
        let Some(element) = self.find_engine_type(element_name, None)? else {
            warn!(
                engine_name,
                "Element type for array type not found, falling back to non-generic Array."
            );
            return Ok(known_types::godot_array());
        };

        let array = known_types::godot_array_of(&element)?;
        debug!(engine_name, ty = %array, "synthesized typed array");
        let mut synthesized = self.synthesized.borrow_mut();
        synthesized.names.insert(engine_name.to_string(), array.clone());
        synthesized
            .unmanaged
            .insert(array.clone(), known_types::native_godot_array());
        Ok(array)
    }

    fn find_pointer_type(&self, engine_name: &str) -> Result<Option<TypeDescriptor>, ResolveError> {
        // const-ness has no C# equivalent.
        let remaining = engine_name.strip_prefix(CONST_PREFIX).unwrap_or(engine_name);
        let split = remaining.find([' ', '*']).unwrap_or(remaining.len());
        let (pointee_name, indirection) = remaining.split_at(split);

        let pointee = match self.find_engine_type(pointee_name, Some(pointee_name))? {
            Some(ty) => ty,
            None if pointee_name == "void" => known_types::void(),
            None => return Ok(None),
        };

        let indirection = indirection.trim_start();
        if indirection.is_empty() || indirection.chars().any(|c| c != '*') {
            return Err(ResolveError::MalformedPointer(engine_name.to_string()));
        }

        Ok(Some(indirection.chars().fold(pointee, |ty, _| ty.make_pointer())))
    }
}

struct UnmanagedLookup<'a>(&'a TypeDb);

impl FallbackTarget for UnmanagedLookup<'_> {
    type Output = TypeDescriptor;
    const RULES: &'static [FallbackRule] = &[
        FallbackRule::Enum,
        FallbackRule::Optional,
        FallbackRule::Pointer,
        FallbackRule::BaseType,
    ];

    fn lookup(&self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        if let Some(unmanaged) = self.0.tables.unmanaged.get(ty) {
            return Some(unmanaged.clone());
        }
        self.0.synthesized.borrow().unmanaged.get(ty).cloned()
    }

    fn terminal(&self, rule: FallbackRule, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        match rule {
            FallbackRule::Enum => Some(known_types::int64()),
            FallbackRule::Pointer => Some(ty.clone()),
            _ => None,
        }
    }
}

struct PtrLookup<'a>(&'a TypeDb);

impl FallbackTarget for PtrLookup<'_> {
    type Output = Rc<dyn PtrMarshaller>;
    const RULES: &'static [FallbackRule] = &FallbackRule::ORDER;

    fn lookup(&self, ty: &TypeDescriptor) -> Option<Self::Output> {
        self.0.tables.ptr_marshallers.get(ty).cloned()
    }

    fn terminal(&self, rule: FallbackRule, ty: &TypeDescriptor) -> Option<Self::Output> {
        match rule {
            FallbackRule::Enum => Some(Rc::new(EnumPtrMarshaller::new(ty.clone()))),
            FallbackRule::Pointer => PtrPtrMarshaller::new(ty.clone())
                .ok()
                .map(|m| Rc::new(m) as Rc<dyn PtrMarshaller>),
            _ => None,
        }
    }

    fn adapt(&self, rule: FallbackRule, ty: &TypeDescriptor, found: Self::Output) -> Option<Self::Output> {
        if rule != FallbackRule::Optional {
            return Some(found);
        }
        NullablePtrMarshaller::new(ty.clone(), found)
            .ok()
            .map(|m| Rc::new(m) as Rc<dyn PtrMarshaller>)
    }
}

struct VariantLookup<'a>(&'a TypeDb);

impl FallbackTarget for VariantLookup<'_> {
    type Output = Rc<dyn VariantMarshaller>;
    const RULES: &'static [FallbackRule] = &[
        FallbackRule::Enum,
        FallbackRule::Optional,
        FallbackRule::GenericDefinition,
        FallbackRule::BaseType,
    ];

    fn lookup(&self, ty: &TypeDescriptor) -> Option<Self::Output> {
        self.0.tables.variant_marshallers.get(ty).cloned()
    }

    fn terminal(&self, rule: FallbackRule, ty: &TypeDescriptor) -> Option<Self::Output> {
        match rule {
            FallbackRule::Enum => Some(Rc::new(EnumVariantMarshaller::new(ty.clone()))),
            _ => None,
        }
    }
}

struct ParserLookup<'a>(&'a TypeDb);

impl FallbackTarget for ParserLookup<'_> {
    type Output = DefaultValueParser;
    const RULES: &'static [FallbackRule] = &[
        FallbackRule::Enum,
        FallbackRule::Optional,
        FallbackRule::GenericDefinition,
        FallbackRule::BaseType,
    ];

    fn lookup(&self, ty: &TypeDescriptor) -> Option<DefaultValueParser> {
        self.0.tables.default_parsers.get(ty).cloned()
    }

    fn terminal(&self, rule: FallbackRule, _: &TypeDescriptor) -> Option<DefaultValueParser> {
        match rule {
            FallbackRule::Enum => self.lookup(&known_types::system_enum()),
            _ => None,
        }
    }
}
