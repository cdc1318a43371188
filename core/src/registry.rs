//! Predicate registry: the name-keyed table filters resolve predicates from.
//!
//! # Sharing
//!
//! A registry is an ordinary value, injected into every [`Session`](crate::Session)
//! as `Arc<PredicateRegistry<E>>`. Tests build their own; hosts build one per
//! document type and share it across sessions.
//!
//! # Reader/writer discipline
//!
//! Reads are copy-on-read. [`snapshot`](PredicateRegistry::snapshot) takes the
//! read lock only long enough to clone the table's `Arc`s into an owned
//! [`RegistrySnapshot`]. An evaluation pass resolves its predicates from one
//! snapshot, so every element of the pass sees the same predicates, while
//! [`register`](PredicateRegistry::register) (the write lock) never waits for
//! a pass in flight. A registration made mid-pass takes effect on the next
//! pass. Predicates may therefore register or look up predicates themselves.
//!
//! # Overwrites
//!
//! Registering an existing name replaces the entry (last writer wins). That
//! is how built-ins are swapped out.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::debug;

use crate::{
    ExactPredicate, FilterOptions, FnPredicate, PartialFlags, PartialPredicate, Predicate,
    SiftError, EXACT, PARTIAL,
};

type PredicateMap<E> = HashMap<String, Arc<dyn Predicate<E>>>;

/// Shared table of named predicates.
///
/// # Example
///
/// ```
/// use sift::{FnPredicate, PredicateRegistry};
///
/// let registry = PredicateRegistry::<()>::with_builtins();
/// assert!(registry.contains("exact"));
/// assert!(registry.contains("partial"));
///
/// registry.register_fn("prefix", |filter: &str, candidate: &str, _: &()| {
///     candidate.starts_with(filter)
/// });
/// assert_eq!(registry.names(), vec!["exact", "partial", "prefix"]);
/// ```
pub struct PredicateRegistry<E> {
    predicates: RwLock<PredicateMap<E>>,
}

impl<E: 'static> PredicateRegistry<E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicates: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding `exact` and `partial` (case-insensitive).
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::with_partial_flags(PartialFlags::default())
    }

    /// Create a registry holding `exact` and `partial` compiled with `flags`.
    #[must_use]
    pub fn with_partial_flags(flags: PartialFlags) -> Self {
        let registry = Self::new();
        registry.register(EXACT, ExactPredicate);
        registry.register(PARTIAL, PartialPredicate::new(flags));
        registry
    }

    /// Create a registry holding the built-ins configured by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] when `partial_match_flags` does
    /// not parse.
    pub fn from_options(options: &FilterOptions) -> Result<Self, SiftError> {
        Ok(Self::with_partial_flags(options.partial_flags()?))
    }

    /// Insert or replace the predicate registered under `name`.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn register(&self, name: impl Into<String>, predicate: impl Predicate<E> + 'static) -> bool {
        self.register_arc(name, Arc::new(predicate))
    }

    /// Insert or replace a closure predicate under `name`.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F) -> bool
    where
        F: Fn(&str, &str, &E) -> bool + Send + Sync + 'static,
    {
        self.register(name, FnPredicate::new(f))
    }

    /// Insert or replace an already shared predicate under `name`.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn register_arc(&self, name: impl Into<String>, predicate: Arc<dyn Predicate<E>>) -> bool {
        let name = name.into();
        let mut predicates = self
            .predicates
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let replaced = predicates.insert(name.clone(), predicate).is_some();
        if replaced {
            debug!(predicate = %name, "predicate_replaced");
        }
        replaced
    }

    /// Look up the predicate registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::PredicateNotFound`] listing the registered names.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Predicate<E>>, SiftError> {
        let predicates = self.read();
        predicates
            .get(name)
            .cloned()
            .ok_or_else(|| SiftError::PredicateNotFound {
                name: name.to_string(),
                available: sorted_names(&predicates),
            })
    }

    /// Copy the current table for one evaluation pass.
    ///
    /// Later registrations do not affect the returned snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot<E> {
        RegistrySnapshot {
            predicates: self.read().clone(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PredicateMap<E>> {
        self.predicates.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Returns the number of registered predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no predicates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns all registered names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        sorted_names(&self.read())
    }
}

impl<E: 'static> Default for PredicateRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for PredicateRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let predicates = self
            .predicates
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("PredicateRegistry")
            .field("predicates", &sorted_names(&predicates))
            .finish()
    }
}

/// Point-in-time copy of a [`PredicateRegistry`] for one evaluation pass.
///
/// Holds no lock.
pub struct RegistrySnapshot<E> {
    predicates: PredicateMap<E>,
}

impl<E> RegistrySnapshot<E> {
    /// Look up the predicate registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::PredicateNotFound`] listing the registered names.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Predicate<E>>, SiftError> {
        self.predicates
            .get(name)
            .cloned()
            .ok_or_else(|| SiftError::PredicateNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Returns all registered names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        sorted_names(&self.predicates)
    }
}

impl<E> fmt::Debug for RegistrySnapshot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("predicates", &self.names())
            .finish()
    }
}

fn sorted_names<E>(predicates: &PredicateMap<E>) -> Vec<String> {
    let mut names: Vec<String> = predicates.keys().cloned().collect();
    names.sort_unstable();
    names
}
