//! Evaluation traces for debugging why an element matched or not.
//!
//! [`MatchEngine::explain`](crate::MatchEngine::explain) runs the same checks as
//! [`MatchEngine::evaluate`](crate::MatchEngine::evaluate) for a single element
//! but records every filter's outcome instead of stopping at the first
//! unsatisfied one.
//!
//! # Example
//!
//! ```ignore
//! let trace = engine.explain(&doc, &element, session.state(), &registry);
//! println!("matched: {}", trace.matched);
//! for filter in &trace.filters {
//!     println!("  {} ({}): {:?}", filter.filter, filter.predicate, filter.outcome);
//! }
//! ```

use std::fmt;

use crate::PredicateError;

/// How one filter fared against one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filter has no value; vacuously satisfied.
    Unconstrained,
    /// A sub-value matched. Later sub-values were not checked.
    Satisfied {
        /// Index of the first matching sub-value.
        index: usize,
    },
    /// Every sub-value was checked and none matched.
    Unsatisfied,
    /// The element has no target attribute for this filter.
    MissingAttribute,
    /// The target attribute is present but blank: zero sub-values.
    MalformedAttribute,
    /// The filter names a predicate that is not registered.
    PredicateNotFound,
    /// The predicate failed on one of the sub-values.
    PredicateError(PredicateError),
}

impl FilterOutcome {
    /// Returns `true` if the filter does not exclude the element.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Unconstrained | Self::Satisfied { .. })
    }
}

impl fmt::Display for FilterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => write!(f, "unconstrained"),
            Self::Satisfied { index } => write!(f, "satisfied by sub-value #{index}"),
            Self::Unsatisfied => write!(f, "unsatisfied"),
            Self::MissingAttribute => write!(f, "missing attribute"),
            Self::MalformedAttribute => write!(f, "empty attribute"),
            Self::PredicateNotFound => write!(f, "predicate not found"),
            Self::PredicateError(e) => write!(f, "predicate error: {e}"),
        }
    }
}

/// Trace of one filter against one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTrace {
    /// Filter name.
    pub filter: String,
    /// Filter value (`None` when unconstrained).
    pub value: Option<String>,
    /// Predicate name the filter resolves through.
    pub predicate: String,
    /// Target attribute read from the element.
    pub attribute: String,
    /// Sub-values split from the attribute, in order.
    pub sub_values: Vec<String>,
    /// The result.
    pub outcome: FilterOutcome,
}

/// Trace of every active filter against one element.
///
/// `matched` always equals the element's classification by
/// [`MatchEngine::evaluate`](crate::MatchEngine::evaluate) under the same
/// state and registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTrace<E> {
    /// The element traced.
    pub element: E,
    /// Whether every filter is satisfied.
    pub matched: bool,
    /// One entry per active filter, in filter-name order.
    pub filters: Vec<FilterTrace>,
}

impl<E> CandidateTrace<E> {
    /// Filters that exclude the element.
    pub fn failing(&self) -> impl Iterator<Item = &FilterTrace> {
        self.filters.iter().filter(|t| !t.outcome.is_satisfied())
    }
}
