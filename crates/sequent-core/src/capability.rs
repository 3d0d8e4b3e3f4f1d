//! Capability declarations and binding sets
//!
//! A capability is a named, typed external dependency requested inside a
//! computation body. [`CapabilityDecl`] is the compile-time token: it pairs a
//! payload type with a runtime-unique key and carries no value until bound.
//! [`CapabilityBinding`] attaches a concrete implementation;
//! [`BindingSet`] is the immutable key-to-implementation mapping a run
//! resolves against.
//!
//! Resolution is a pure lookup. A missing key at resolution time is a wiring
//! defect, not a data condition — the sequencer treats it as fatal rather
//! than as a recoverable [`Failure`](crate::Failure).

use crate::failure::Failure;
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Compile-time token declaring a capability slot.
///
/// `const`-constructible so declarations can live as module-level constants:
///
/// ```
/// use sequent_core::CapabilityDecl;
///
/// const MULTIPLIER: CapabilityDecl<i64> = CapabilityDecl::new("math.multiplier");
/// ```
pub struct CapabilityDecl<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CapabilityDecl<T> {
    /// Declare a capability slot under a runtime-unique key.
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    /// The runtime lookup key.
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl<T> fmt::Debug for CapabilityDecl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityDecl").field(&self.key).finish()
    }
}

impl<T> Clone for CapabilityDecl<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CapabilityDecl<T> {}

impl<T: Send + Sync + 'static> CapabilityDecl<T> {
    /// Bind a concrete implementation value to this declaration.
    pub fn implementation(&self, value: T) -> CapabilityBinding {
        self.implementation_arc(Arc::new(value))
    }

    /// Bind an already-shared implementation.
    pub fn implementation_arc(&self, value: Arc<T>) -> CapabilityBinding {
        CapabilityBinding {
            key: self.key,
            value,
        }
    }
}

/// A declaration paired with a concrete, type-erased implementation.
#[derive(Clone)]
pub struct CapabilityBinding {
    key: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl CapabilityBinding {
    /// The key this binding satisfies.
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl fmt::Debug for CapabilityBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityBinding").field(&self.key).finish()
    }
}

/// Immutable mapping from capability key to implementation value.
///
/// Extension returns a new set; existing sets are never mutated, so
/// concurrent runs holding different sets cannot interfere and no locking is
/// needed.
#[derive(Clone, Default)]
pub struct BindingSet {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl BindingSet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new set with `binding` added; a later binding of the same key
    /// overwrites the earlier one.
    pub fn with(&self, binding: CapabilityBinding) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(binding.key, binding.value);
        Self { entries }
    }

    /// A new set extended by every binding in `bindings`, later wins.
    pub fn extend(&self, bindings: impl IntoIterator<Item = CapabilityBinding>) -> Self {
        let mut entries = self.entries.clone();
        for binding in bindings {
            entries.insert(binding.key, binding.value);
        }
        Self { entries }
    }

    /// Pure lookup of the erased implementation for `key`.
    pub fn resolve(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(key).cloned()
    }

    /// Typed lookup through a declaration token.
    pub fn get<T: Send + Sync + 'static>(&self, decl: &CapabilityDecl<T>) -> Option<Arc<T>> {
        self.resolve(decl.key())
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// True if `key` is bound.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for BindingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl FromIterator<CapabilityBinding> for BindingSet {
    fn from_iter<I: IntoIterator<Item = CapabilityBinding>>(iter: I) -> Self {
        Self::new().extend(iter)
    }
}

/// Factory producing the catch-all unknown failure from a message.
pub type FailureFactory = fn(String) -> Failure;

/// Declaration of the default unknown-failure factory capability.
pub const UNKNOWN_FAILURE_FACTORY: CapabilityDecl<FailureFactory> =
    CapabilityDecl::new("sequent.failure.unknown");

static UNKNOWN_FAILURE_BINDING: Lazy<CapabilityBinding> =
    Lazy::new(|| UNKNOWN_FAILURE_FACTORY.implementation(Failure::unknown_message));

/// Process-wide immutable default binding for the catch-all unknown failure
/// factory. There is no mutable global state behind it.
pub fn unknown_failure_binding() -> CapabilityBinding {
    UNKNOWN_FAILURE_BINDING.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPLIER: CapabilityDecl<i64> = CapabilityDecl::new("math.multiplier");
    const GREETING: CapabilityDecl<String> = CapabilityDecl::new("text.greeting");

    #[test]
    fn typed_lookup_returns_bound_value() {
        let set = BindingSet::new().with(MULTIPLIER.implementation(3));
        assert_eq!(set.get(&MULTIPLIER).as_deref(), Some(&3));
        assert!(set.get(&GREETING).is_none());
    }

    #[test]
    fn later_binding_overwrites_earlier() {
        let set = BindingSet::new()
            .with(MULTIPLIER.implementation(3))
            .with(MULTIPLIER.implementation(5));
        assert_eq!(set.get(&MULTIPLIER).as_deref(), Some(&5));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn extension_leaves_the_original_untouched() {
        let base = BindingSet::new().with(MULTIPLIER.implementation(3));
        let extended = base.with(GREETING.implementation("hi".to_string()));
        assert!(!base.contains(GREETING.key()));
        assert!(extended.contains(GREETING.key()));
    }

    #[test]
    fn mismatched_type_resolves_to_none() {
        const ALIAS: CapabilityDecl<String> = CapabilityDecl::new("math.multiplier");
        let set = BindingSet::new().with(MULTIPLIER.implementation(3));
        assert!(set.get(&ALIAS).is_none());
    }

    #[test]
    fn default_unknown_failure_binding_is_usable() {
        let set = BindingSet::new().with(unknown_failure_binding());
        let factory = set.get(&UNKNOWN_FAILURE_FACTORY).expect("bound");
        let failure = factory("boom".to_string());
        assert_eq!(failure.code(), crate::UNKNOWN_FAILURE);
        assert_eq!(failure.message(), "boom");
    }
}
