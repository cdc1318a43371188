//! Filter state: which filters are active, with which value and predicate.
//!
//! [`update_filter`] is the whole contract: a pure function from the current
//! state and one control reading to the next state, plus a `changed` flag.
//! When nothing changed it hands the input back untouched and downstream
//! evaluation and callbacks are skipped.
//!
//! [`FilterStore`] owns one session's state and packages real changes as
//! [`FilterChange`]s for delivery.

use std::collections::BTreeMap;

use serde::Serialize;

/// One filter currently in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    /// The filter value. `None` means registered but unconstrained: the filter
    /// is vacuously satisfied during evaluation.
    pub value: Option<String>,
    /// Registry name of the predicate. Not validated here: an unknown name
    /// surfaces at evaluation time, so a filter may be set up before its
    /// predicate is registered.
    pub predicate: String,
}

impl ActiveFilter {
    /// Create an active filter, normalizing a blank value to `None`.
    pub fn new(value: Option<&str>, predicate: impl Into<String>) -> Self {
        Self {
            value: value.filter(|v| !is_blank(v)).map(str::to_string),
            predicate: predicate.into(),
        }
    }

    /// Returns `true` if this filter constrains the matched set.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.value.is_some()
    }
}

/// How an update combines with the filters already in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Filters accumulate; every constrained filter must be satisfied.
    #[default]
    Multi,
    /// Only the most recently updated filter is kept.
    Single,
}

/// Filter name to [`ActiveFilter`], iterated in name order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FilterState {
    filters: BTreeMap<String, ActiveFilter>,
}

impl FilterState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The filter named `name`, if active.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActiveFilter> {
        self.filters.get(name)
    }

    /// Returns the number of active filters (constrained or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of all active filters, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// All active filters, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActiveFilter)> {
        self.filters.iter().map(|(name, filter)| (name.as_str(), filter))
    }

    /// Active filters that carry a value, with that value.
    pub fn constrained(&self) -> impl Iterator<Item = (&str, &str, &ActiveFilter)> {
        self.iter()
            .filter_map(|(name, filter)| filter.value.as_deref().map(|value| (name, value, filter)))
    }
}

impl<'a> IntoIterator for &'a FilterState {
    type Item = (&'a String, &'a ActiveFilter);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ActiveFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

impl FromIterator<(String, ActiveFilter)> for FilterState {
    fn from_iter<T: IntoIterator<Item = (String, ActiveFilter)>>(iter: T) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

/// Result of [`update_filter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterUpdate {
    /// The next state. Equal to the input when `changed` is `false`.
    pub state: FilterState,
    /// Whether the value or the predicate of the filter differs.
    pub changed: bool,
}

/// A real change, as delivered to filter-changed observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChange {
    /// The filter that was updated.
    pub filter: String,
    /// State before the update.
    pub previous: FilterState,
    /// State after the update.
    pub current: FilterState,
}

/// Returns `true` for empty or whitespace-only strings.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Apply one control reading to `current`.
///
/// - A blank `raw_value` is stored as `None`.
/// - If `name` is already active with the same value and predicate, returns
///   `current` unchanged with `changed = false`.
/// - [`FilterMode::Multi`] merges the entry into a copy of `current`;
///   [`FilterMode::Single`] discards every other entry.
///
/// # Example
///
/// ```
/// use sift::{update_filter, FilterMode, FilterState};
///
/// let first = update_filter(&FilterState::new(), "color", Some("red"), "exact", FilterMode::Multi);
/// assert!(first.changed);
///
/// let again = update_filter(&first.state, "color", Some("red"), "exact", FilterMode::Multi);
/// assert!(!again.changed);
/// assert_eq!(again.state, first.state);
/// ```
#[must_use]
pub fn update_filter(
    current: &FilterState,
    name: &str,
    raw_value: Option<&str>,
    predicate: &str,
    mode: FilterMode,
) -> FilterUpdate {
    let next = ActiveFilter::new(raw_value, predicate);

    if current.get(name) == Some(&next) {
        return FilterUpdate {
            state: current.clone(),
            changed: false,
        };
    }

    let mut state = match mode {
        FilterMode::Multi => current.clone(),
        FilterMode::Single => FilterState::new(),
    };
    state.filters.insert(name.to_string(), next);

    FilterUpdate {
        state,
        changed: true,
    }
}

/// The filter state of one session.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    state: FilterState,
    mode: FilterMode,
}

impl FilterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(mode: FilterMode) -> Self {
        Self {
            state: FilterState::new(),
            mode,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// The mode updates are applied with.
    #[must_use]
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Apply a control reading. Returns the change when it is a real one.
    #[must_use = "a `None` result means the reading changed nothing"]
    pub fn apply(
        &mut self,
        name: &str,
        raw_value: Option<&str>,
        predicate: &str,
    ) -> Option<FilterChange> {
        let update = update_filter(&self.state, name, raw_value, predicate, self.mode);
        if !update.changed {
            return None;
        }
        let previous = std::mem::replace(&mut self.state, update.state);
        Some(FilterChange {
            filter: name.to_string(),
            previous,
            current: self.state.clone(),
        })
    }

    /// Drop every active filter.
    pub fn clear(&mut self) {
        self.state = FilterState::new();
    }
}
