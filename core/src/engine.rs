//! Match engine: classify candidates against the active filters.
//!
//! For each candidate and each active filter with a value:
//!
//! 1. Read the filter's target attribute. Absent: the filter is unsatisfied.
//! 2. Split it on the separator into sub-values. Blank: zero sub-values,
//!    unsatisfied.
//! 3. Check sub-values left to right through the filter's predicate; the
//!    first match satisfies the filter (OR).
//!
//! A candidate is matched when every constrained filter is satisfied (AND).
//! Filters without a value are ignored. Nothing here fails the pass: missing
//! predicates, predicate errors and empty attributes are logged, recorded as
//! [`EvalIssue`]s and count as "unsatisfied".

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    is_blank, target_attribute, CandidateTrace, Document, FilterOptions, FilterOutcome,
    FilterState, FilterTrace, Predicate, PredicateRegistry, SiftError,
};

/// Something that went wrong during a pass without stopping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalIssue {
    /// The filter being evaluated.
    pub filter: String,
    /// What went wrong.
    pub error: SiftError,
}

/// Outcome of one evaluation pass.
///
/// # Invariant
///
/// `matched` and `unmatched` are disjoint and together hold exactly the
/// candidates passed in, each in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<E> {
    /// Candidates satisfying every constrained filter.
    pub matched: Vec<E>,
    /// Every other candidate.
    pub unmatched: Vec<E>,
    /// Problems met along the way.
    pub issues: Vec<EvalIssue>,
}

/// Per-pass view of one constrained filter, with its predicate resolved once.
struct FilterPlan<'s, E> {
    name: &'s str,
    value: &'s str,
    predicate_name: &'s str,
    attribute: String,
    predicate: Option<Arc<dyn Predicate<E>>>,
}

/// Splits candidate attributes and applies predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEngine {
    target_prefix: String,
    separator: String,
}

impl MatchEngine {
    /// Create an engine reading `target_prefix + name` attributes split on
    /// `separator`.
    pub fn new(target_prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            target_prefix: target_prefix.into(),
            separator: separator.into(),
        }
    }

    /// Create an engine from session options.
    #[must_use]
    pub fn from_options(options: &FilterOptions) -> Self {
        Self::new(
            options.target_attribute_prefix.as_str(),
            options.value_separator.as_str(),
        )
    }

    /// The candidate attribute prefix.
    #[must_use]
    pub fn target_prefix(&self) -> &str {
        &self.target_prefix
    }

    /// The sub-value separator.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Split a raw attribute value into sub-values, in order.
    ///
    /// A blank value yields no sub-values. Otherwise pieces are kept as
    /// written, including empty ones between consecutive separators.
    ///
    /// ```
    /// let engine = sift::MatchEngine::new("data-filter-", ",");
    /// assert_eq!(engine.split("red,blue"), vec!["red", "blue"]);
    /// assert_eq!(engine.split("a,,b"), vec!["a", "", "b"]);
    /// assert!(engine.split("").is_empty());
    /// ```
    #[must_use]
    pub fn split<'v>(&self, raw: &'v str) -> Vec<&'v str> {
        if is_blank(raw) {
            Vec::new()
        } else {
            raw.split(self.separator.as_str()).collect()
        }
    }

    /// Classify `candidates` against `state`.
    ///
    /// Predicates are resolved once, from a single registry snapshot.
    /// Registrations made while the pass runs apply from the next pass.
    pub fn evaluate<D>(
        &self,
        doc: &D,
        candidates: &[D::Element],
        state: &FilterState,
        registry: &PredicateRegistry<D::Element>,
    ) -> Classification<D::Element>
    where
        D: Document + ?Sized,
        D::Element: 'static,
    {
        let mut issues = Vec::new();
        let plans = self.plan(state, registry, Some(&mut issues));

        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        for element in candidates {
            let is_match = plans.iter().all(|plan| {
                let outcome = Self::check(doc, element, plan, &self.separator).outcome;
                match &outcome {
                    FilterOutcome::MalformedAttribute => {
                        debug!(filter = plan.name, attribute = %plan.attribute, element = ?element, "malformed_attribute");
                        issues.push(EvalIssue {
                            filter: plan.name.to_string(),
                            error: SiftError::MalformedAttribute {
                                attribute: plan.attribute.clone(),
                            },
                        });
                    }
                    FilterOutcome::PredicateError(error) => {
                        warn!(filter = plan.name, predicate = plan.predicate_name, element = ?element, error = %error, "predicate_failed");
                        issues.push(EvalIssue {
                            filter: plan.name.to_string(),
                            error: SiftError::Predicate {
                                name: plan.predicate_name.to_string(),
                                source: error.clone(),
                            },
                        });
                    }
                    _ => {}
                }
                outcome.is_satisfied()
            });

            if is_match {
                matched.push(element.clone());
            } else {
                unmatched.push(element.clone());
            }
        }

        debug!(
            candidates = candidates.len(),
            matched = matched.len(),
            unmatched = unmatched.len(),
            filters = plans.len(),
            issues = issues.len(),
            "evaluation_pass"
        );

        Classification {
            matched,
            unmatched,
            issues,
        }
    }

    /// Trace every active filter against `element`.
    ///
    /// Unlike [`evaluate`](Self::evaluate), this does not stop at the first
    /// unsatisfied filter. Within a filter, sub-values still stop at the first
    /// match. Nothing is logged.
    pub fn explain<D>(
        &self,
        doc: &D,
        element: &D::Element,
        state: &FilterState,
        registry: &PredicateRegistry<D::Element>,
    ) -> CandidateTrace<D::Element>
    where
        D: Document + ?Sized,
        D::Element: 'static,
    {
        let plans = self.plan(state, registry, None);
        let mut plans = plans.iter().peekable();

        let mut filters = Vec::with_capacity(state.len());
        for (name, filter) in state.iter() {
            match plans.next_if(|plan| plan.name == name) {
                Some(plan) => filters.push(Self::check(doc, element, plan, &self.separator)),
                None => filters.push(FilterTrace {
                    filter: name.to_string(),
                    value: None,
                    predicate: filter.predicate.clone(),
                    attribute: target_attribute(&self.target_prefix, name),
                    sub_values: Vec::new(),
                    outcome: FilterOutcome::Unconstrained,
                }),
            }
        }

        CandidateTrace {
            element: element.clone(),
            matched: filters.iter().all(|t| t.outcome.is_satisfied()),
            filters,
        }
    }

    /// Resolve the constrained filters of `state`, in name order.
    ///
    /// Each unknown predicate is reported once per pass.
    fn plan<'s, E: 'static>(
        &self,
        state: &'s FilterState,
        registry: &PredicateRegistry<E>,
        mut issues: Option<&mut Vec<EvalIssue>>,
    ) -> Vec<FilterPlan<'s, E>> {
        let snapshot = registry.snapshot();
        state
            .constrained()
            .map(|(name, value, filter)| {
                let predicate = match snapshot.lookup(&filter.predicate) {
                    Ok(predicate) => Some(predicate),
                    Err(error) => {
                        if let Some(issues) = issues.as_deref_mut() {
                            warn!(filter = name, predicate = %filter.predicate, "predicate_not_found");
                            issues.push(EvalIssue {
                                filter: name.to_string(),
                                error,
                            });
                        }
                        None
                    }
                };
                FilterPlan {
                    name,
                    value,
                    predicate_name: &filter.predicate,
                    attribute: target_attribute(&self.target_prefix, name),
                    predicate,
                }
            })
            .collect()
    }

    fn check<D>(
        doc: &D,
        element: &D::Element,
        plan: &FilterPlan<'_, D::Element>,
        separator: &str,
    ) -> FilterTrace
    where
        D: Document + ?Sized,
        D::Element: 'static,
    {
        let raw = doc.attribute(element, &plan.attribute);
        let sub_values: Vec<&str> = match raw {
            Some(raw) if !is_blank(raw) => raw.split(separator).collect(),
            _ => Vec::new(),
        };

        let outcome = match (raw, &plan.predicate) {
            (None, _) => FilterOutcome::MissingAttribute,
            (Some(_), _) if sub_values.is_empty() => FilterOutcome::MalformedAttribute,
            (Some(_), None) => FilterOutcome::PredicateNotFound,
            (Some(_), Some(predicate)) => {
                let mut outcome = FilterOutcome::Unsatisfied;
                for (index, sub_value) in sub_values.iter().enumerate() {
                    match predicate.matches(plan.value, sub_value, element) {
                        Ok(true) => {
                            outcome = FilterOutcome::Satisfied { index };
                            break;
                        }
                        Ok(false) => {}
                        Err(error) => {
                            outcome = FilterOutcome::PredicateError(error);
                            break;
                        }
                    }
                }
                outcome
            }
        };

        FilterTrace {
            filter: plan.name.to_string(),
            value: Some(plan.value.to_string()),
            predicate: plan.predicate_name.to_string(),
            attribute: plan.attribute.clone(),
            sub_values: sub_values.into_iter().map(str::to_string).collect(),
            outcome,
        }
    }
}
