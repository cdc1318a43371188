//! sift - Attribute-driven element filtering for document trees
//!
//! Scans a document subtree for elements that declare filter attributes,
//! tracks the filters currently in effect, and partitions the declaring
//! elements into matched and unmatched groups whenever a filter changes.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! - [`Document`] - Read-only seam onto a DOM-like tree (host-provided)
//! - [`Predicate<E>`] - Named matching function `(filter value, sub-value, element) -> bool`
//! - [`PredicateRegistry<E>`] - Shared, name-keyed predicate table with built-ins
//! - [`FilterState`] / [`FilterStore`] - Active filters and the "did it really change?" guard
//! - [`resolve_candidates`] - Union of elements declaring any active filter attribute
//! - [`MatchEngine`] - OR across sub-values, AND across filters
//! - [`Session`] - Wires control changes to the store, the engine and the callbacks
//!
//! # Key Invariants
//!
//! 1. **Partition**: every candidate lands in exactly one of matched / unmatched.
//!
//! 2. **Unconstrained filters are vacuous**: a filter whose value is blank never
//!    shrinks the matched set.
//!
//! 3. **Evaluation never fails**: unknown predicates, predicate errors and
//!    malformed attributes make a filter unsatisfied for the affected element
//!    and are reported as [`EvalIssue`]s, never as a failed pass.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sift::prelude::*;
//! use sift_test::TestDocument;
//!
//! let mut doc = TestDocument::new();
//! let root = doc.root();
//! let color = doc.element(root, "input")
//!     .attr("data-filter-prefix", "color")
//!     .value("blue")
//!     .id();
//! let shirt = doc.element(root, "div")
//!     .attr("data-filter-color", "red,blue")
//!     .id();
//! let hat = doc.element(root, "div")
//!     .attr("data-filter-color", "green")
//!     .id();
//!
//! let registry = Arc::new(PredicateRegistry::with_builtins());
//! let mut session = Session::new(root, FilterOptions::default(), registry).unwrap();
//!
//! let results = session.handle_change(&doc, &color).unwrap().unwrap();
//! assert_eq!(results.matched, vec![shirt]);
//! assert_eq!(results.unmatched, vec![hat]);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod config;
mod document;
mod engine;
mod predicate;
mod registry;
mod resolver;
mod session;
mod state;
mod trace;

#[cfg(test)]
mod testing;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use config::{FilterOptions, PartialFlags};
pub use document::Document;
pub use engine::{Classification, EvalIssue, MatchEngine};
pub use predicate::{ExactPredicate, FnPredicate, PartialPredicate, Predicate};
pub use registry::{PredicateRegistry, RegistrySnapshot};
pub use resolver::{resolve_candidates, target_attribute};
pub use session::{
    Callback, ControlChange, EventDispatcher, FilterResults, Session, SessionEvent,
};
pub use state::{
    is_blank, update_filter, ActiveFilter, FilterChange, FilterMode, FilterState, FilterStore,
    FilterUpdate,
};
pub use trace::{CandidateTrace, FilterOutcome, FilterTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use sift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Seams
        Document,
        Predicate,
        // Core types
        ActiveFilter,
        Callback,
        Classification,
        ControlChange,
        EvalIssue,
        FilterMode,
        FilterOptions,
        FilterResults,
        FilterState,
        FilterStore,
        MatchEngine,
        PredicateRegistry,
        Session,
        // Built-in predicates
        ExactPredicate,
        FnPredicate,
        PartialPredicate,
        // Errors
        PredicateError,
        SiftError,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Registry name of the built-in [`ExactPredicate`].
pub const EXACT: &str = "exact";

/// Registry name of the built-in [`PartialPredicate`].
pub const PARTIAL: &str = "partial";

/// Maximum length for patterns handed to [`PartialPredicate`].
///
/// Filter values come straight from user-editable controls, so the pattern
/// length is bounded before compilation.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors raised by an individual predicate invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    /// The filter value is not a valid pattern for this predicate.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },
    /// The filter value exceeds [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A custom predicate reported a failure.
    #[error("{0}")]
    Failed(String),
}

/// Errors from filter configuration, session wiring and evaluation.
///
/// Only configuration and wiring errors are returned as `Err`. Evaluation
/// errors are collected on the pass as [`EvalIssue`]s and never abort it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiftError {
    /// A filter references a predicate name with no registry entry.
    #[error("unknown predicate \"{name}\"{}", available_suffix(.available))]
    PredicateNotFound {
        /// The unregistered predicate name.
        name: String,
        /// Predicate names that ARE registered (sorted).
        available: Vec<String>,
    },
    /// A predicate failed while matching.
    #[error("predicate \"{name}\" failed: {source}")]
    Predicate {
        /// The predicate name.
        name: String,
        /// What went wrong.
        source: PredicateError,
    },
    /// A target attribute is present but yields no sub-values.
    #[error("attribute \"{attribute}\" is present but empty")]
    MalformedAttribute {
        /// The target attribute name.
        attribute: String,
    },
    /// Options failed validation or deserialization.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
    /// A change was reported for an element that does not name a filter.
    #[error("element does not carry the control attribute \"{attribute}\"")]
    NotAControl {
        /// The control marker attribute that was expected.
        attribute: String,
    },
    /// A change was reported for a control outside the session root.
    #[error("control {control} is not under the session root")]
    ForeignControl {
        /// Debug rendering of the control element.
        control: String,
    },
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " (no predicates are registered)".to_string()
    } else {
        format!(" (registered: {})", available.join(", "))
    }
}
