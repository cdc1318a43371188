//! `Predicate` - Named matching between a filter value and one sub-value
//!
//! A predicate answers a single question: does this candidate sub-value
//! satisfy this filter value? Combining sub-values (OR) and filters (AND) is
//! the [`MatchEngine`](crate::MatchEngine)'s job, not the predicate's.
//!
//! # Built-ins
//!
//! - [`ExactPredicate`] - Case-sensitive string equality (`"exact"`)
//! - [`PartialPredicate`] - Filter value as a regular expression (`"partial"`)
//!
//! Custom predicates implement [`Predicate`] directly, or wrap a closure in
//! [`FnPredicate`].

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::{Mutex, PoisonError};

use regex::{Regex, RegexBuilder};

use crate::{PartialFlags, PredicateError, MAX_REGEX_PATTERN_LENGTH};

/// Matches one candidate sub-value against a filter value.
///
/// # Purity
///
/// Implementations should be pure with respect to
/// `(filter_value, candidate, element)`. The registry cannot enforce it, but
/// the engine's short-circuit behavior is only reproducible when it holds.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: a registry is shared between
/// sessions.
///
/// # Example
///
/// ```
/// use sift::{Predicate, ExactPredicate};
///
/// assert_eq!(Predicate::<()>::matches(&ExactPredicate, "red", "red", &()), Ok(true));
/// assert_eq!(Predicate::<()>::matches(&ExactPredicate, "red", "Red", &()), Ok(false));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Predicate<{E}>`",
    label = "this type cannot match filter values",
    note = "implement `matches(&self, filter_value, candidate, element)` or wrap a closure in `FnPredicate`"
)]
pub trait Predicate<E>: Send + Sync + Debug {
    /// Returns whether `candidate` satisfies `filter_value`.
    ///
    /// # Errors
    ///
    /// Returns a [`PredicateError`] when the filter value cannot be used by
    /// this predicate (e.g. an invalid pattern). The engine treats the filter
    /// as unsatisfied for `element` and keeps going.
    fn matches(
        &self,
        filter_value: &str,
        candidate: &str,
        element: &E,
    ) -> Result<bool, PredicateError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Exact
// ═══════════════════════════════════════════════════════════════════════════════

/// Case-sensitive string equality. No trimming, no normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactPredicate;

impl<E> Predicate<E> for ExactPredicate {
    fn matches(
        &self,
        filter_value: &str,
        candidate: &str,
        _element: &E,
    ) -> Result<bool, PredicateError> {
        Ok(filter_value == candidate)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Partial
// ═══════════════════════════════════════════════════════════════════════════════

/// Treats the filter value as a regular expression searched for in the
/// candidate.
///
/// Uses Rust's `regex` crate (linear time, no backtracking). With the default
/// flags (`"i"`) matching is case-insensitive, so a plain word behaves as a
/// case-insensitive substring search.
///
/// Compiled patterns are cached by filter value, so each distinct value
/// compiles once even when sessions sharing the registry use different
/// patterns. The cache holds at most [`PartialPredicate::CACHE_CAPACITY`]
/// patterns and is cleared when full. Compilation runs outside the cache lock.
///
/// # Example
///
/// ```
/// use sift::{Predicate, PartialPredicate};
///
/// let partial = PartialPredicate::default();
/// assert_eq!(Predicate::<()>::matches(&partial, "re", "Red", &()), Ok(true));
/// assert_eq!(Predicate::<()>::matches(&partial, "^b", "Red", &()), Ok(false));
/// assert!(Predicate::<()>::matches(&partial, "[oops", "Red", &()).is_err());
/// ```
pub struct PartialPredicate {
    flags: PartialFlags,
    cache: Mutex<HashMap<String, Regex>>,
}

impl PartialPredicate {
    /// Maximum number of compiled patterns kept.
    pub const CACHE_CAPACITY: usize = 64;

    /// Create a partial predicate with the given regex flags.
    #[must_use]
    pub fn new(flags: PartialFlags) -> Self {
        Self {
            flags,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The flags patterns are compiled with.
    #[must_use]
    pub fn flags(&self) -> PartialFlags {
        self.flags
    }

    fn compile(&self, pattern: &str) -> Result<Regex, PredicateError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(PredicateError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }

        if let Some(regex) = self.cached(pattern) {
            return Ok(regex);
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(self.flags.case_insensitive)
            .multi_line(self.flags.multi_line)
            .dot_matches_new_line(self.flags.dot_matches_new_line)
            .ignore_whitespace(self.flags.ignore_whitespace)
            .build()
            .map_err(|e| PredicateError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.len() >= Self::CACHE_CAPACITY {
            cache.clear();
        }
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    fn cached(&self, pattern: &str) -> Option<Regex> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
            .cloned()
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for PartialPredicate {
    fn default() -> Self {
        Self::new(PartialFlags::default())
    }
}

impl Debug for PartialPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialPredicate")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl<E> Predicate<E> for PartialPredicate {
    fn matches(
        &self,
        filter_value: &str,
        candidate: &str,
        _element: &E,
    ) -> Result<bool, PredicateError> {
        Ok(self.compile(filter_value)?.is_match(candidate))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Closures
// ═══════════════════════════════════════════════════════════════════════════════

/// Adapts an infallible closure into a [`Predicate`].
///
/// # Example
///
/// ```
/// use sift::{FnPredicate, Predicate};
///
/// let starts_with = FnPredicate::new(|filter: &str, candidate: &str, _: &()| {
///     candidate.starts_with(filter)
/// });
/// assert_eq!(starts_with.matches("sp", "sports", &()), Ok(true));
/// ```
#[derive(Clone)]
pub struct FnPredicate<F> {
    f: F,
}

impl<F> FnPredicate<F> {
    /// Wrap `f` as a predicate.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").finish_non_exhaustive()
    }
}

impl<E, F> Predicate<E> for FnPredicate<F>
where
    F: Fn(&str, &str, &E) -> bool + Send + Sync,
{
    fn matches(
        &self,
        filter_value: &str,
        candidate: &str,
        element: &E,
    ) -> Result<bool, PredicateError> {
        Ok((self.f)(filter_value, candidate, element))
    }
}
