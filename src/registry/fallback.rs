//! The ordered fallback rules shared by every registry lookup.
//!
//! When a type has no direct registration, each resolver walks the same
//! list of rules in priority order and takes the first one that produces
//! an answer. A resolver opts into the rules it supports through
//! [`FallbackTarget::RULES`].

use crate::types::TypeDescriptor;

/// One fallback step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackRule {
    /// Every enum is answered the same way, regardless of its name.
    Enum,
    /// `Nullable<T>` is answered by `T`.
    Optional,
    /// A constructed generic is answered by its definition.
    GenericDefinition,
    /// Pointers are already unmanaged.
    Pointer,
    /// Fall back to whatever the base type has.
    BaseType,
}

impl FallbackRule {
    /// All rules in evaluation order.
    pub const ORDER: [FallbackRule; 5] = [
        FallbackRule::Enum,
        FallbackRule::Optional,
        FallbackRule::GenericDefinition,
        FallbackRule::Pointer,
        FallbackRule::BaseType,
    ];

    /// Whether this rule applies to `ty` at all.
    pub fn matches(self, ty: &TypeDescriptor) -> bool {
        match self {
            FallbackRule::Enum => ty.is_enum(),
            FallbackRule::Optional => ty.is_optional(),
            FallbackRule::GenericDefinition => ty.is_constructed_generic(),
            FallbackRule::Pointer => ty.is_pointer(),
            FallbackRule::BaseType => ty.base().is_some(),
        }
    }

    /// The type to resolve instead of `ty`, for the rules that recurse.
    ///
    /// `Enum` and `Pointer` are terminal and return `None`; the resolver
    /// answers them directly.
    pub fn redirect(self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        match self {
            FallbackRule::Optional => ty.optional_inner().cloned(),
            FallbackRule::GenericDefinition if ty.is_constructed_generic() => Some(ty.generic_definition()),
            FallbackRule::BaseType => ty.base().cloned(),
            FallbackRule::Enum | FallbackRule::Pointer | FallbackRule::GenericDefinition => None,
        }
    }
}

/// A lookup that can be completed by the shared fallback rules.
pub(crate) trait FallbackTarget {
    type Output;

    /// Rules this lookup participates in, in evaluation order.
    const RULES: &'static [FallbackRule];

    /// Direct registration for `ty`, if any.
    fn lookup(&self, ty: &TypeDescriptor) -> Option<Self::Output>;

    /// Answer for a terminal rule (`Enum`, `Pointer`).
    fn terminal(&self, rule: FallbackRule, ty: &TypeDescriptor) -> Option<Self::Output>;

    /// Adapt the answer found for the redirected type back to `ty`.
    fn adapt(&self, rule: FallbackRule, ty: &TypeDescriptor, found: Self::Output) -> Option<Self::Output> {
        let _ = (rule, ty);
        Some(found)
    }
}

/// Resolve `ty` against `target`, walking its fallback rules on a miss.
///
/// A matching rule that yields nothing hands over to the next rule. The
/// recursion terminates because every redirect strictly shrinks the type:
/// optionals and constructed generics lose their arguments and base chains
/// are owned, so they are finite.
pub(crate) fn resolve_with_fallback<T: FallbackTarget>(target: &T, ty: &TypeDescriptor) -> Option<T::Output> {
    if let Some(found) = target.lookup(ty) {
        return Some(found);
    }

    for &rule in T::RULES {
        if !rule.matches(ty) {
            continue;
        }
        let resolved = match rule.redirect(ty) {
            Some(next) => resolve_with_fallback(target, &next).and_then(|found| target.adapt(rule, ty, found)),
            None => target.terminal(rule, ty),
        };
        if resolved.is_some() {
            return resolved;
        }
    }

    None
}
