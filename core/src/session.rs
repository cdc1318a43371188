//! Session controller: one filtering session bound to a subtree.
//!
//! A session wires control changes to the [`FilterStore`], runs the
//! [`MatchEngine`] over the resolved candidates and delivers the outcome.
//! Delivery goes through a [`Callback`], which is either a closure called
//! in place or a named event handed to the host's [`EventDispatcher`] with
//! the session root as target.
//!
//! Everything runs synchronously on the caller's thread. Two calls on the
//! same session cannot overlap because both take `&mut self`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    is_blank, resolve_candidates, CandidateTrace, Document, EvalIssue, FilterChange,
    FilterOptions, FilterState, FilterStore, MatchEngine, PredicateRegistry, SiftError,
};

/// How a session delivers a payload of type `P`.
pub enum Callback<P> {
    /// Call the closure with the payload.
    Direct(Box<dyn FnMut(&P) + Send>),
    /// Dispatch an event with this name on the session root.
    NamedEvent(String),
}

impl<P> Callback<P> {
    /// Wrap a closure.
    pub fn direct(f: impl FnMut(&P) + Send + 'static) -> Self {
        Self::Direct(Box::new(f))
    }

    /// Name an event to dispatch.
    pub fn named(event: impl Into<String>) -> Self {
        Self::NamedEvent(event.into())
    }
}

impl<P> From<&str> for Callback<P> {
    fn from(event: &str) -> Self {
        Self::named(event)
    }
}

impl<P> fmt::Debug for Callback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Callback::Direct(..)"),
            Self::NamedEvent(event) => f.debug_tuple("Callback::NamedEvent").field(event).finish(),
        }
    }
}

/// Payload handed to an [`EventDispatcher`].
#[derive(Debug)]
pub enum SessionEvent<'a, E> {
    /// A control changed the filter state.
    FilterChanged(&'a ControlChange<E>),
    /// An evaluation pass finished.
    Results(&'a FilterResults<E>),
}

/// Host hook receiving named events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `EventDispatcher<{E}>`",
    label = "expected an event sink for session events",
    note = "implement `dispatch(&mut self, target, event, payload)`"
)]
pub trait EventDispatcher<E> {
    /// Deliver `payload` as event `event` on `target`.
    fn dispatch(&mut self, target: &E, event: &str, payload: SessionEvent<'_, E>);
}

/// A real filter change together with the control that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlChange<E> {
    /// The control whose value was read.
    pub control: E,
    /// Previous and current state.
    pub change: FilterChange,
}

/// Outcome of one evaluation pass as delivered to result observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResults<E> {
    /// Candidates satisfying every constrained filter, in document order.
    pub matched: Vec<E>,
    /// Remaining candidates, in document order.
    pub unmatched: Vec<E>,
    /// All candidates, in document order.
    pub candidates: Vec<E>,
    /// The filter state the pass ran against.
    pub state: FilterState,
    /// Problems met during the pass.
    pub issues: Vec<EvalIssue>,
}

/// A filtering session over the subtree under `root`.
pub struct Session<E> {
    root: E,
    options: FilterOptions,
    registry: Arc<PredicateRegistry<E>>,
    engine: MatchEngine,
    store: FilterStore,
    on_results: Option<Callback<FilterResults<E>>>,
    on_filter_change: Option<Callback<ControlChange<E>>>,
    dispatcher: Option<Box<dyn EventDispatcher<E> + Send>>,
}

impl<E: Clone + fmt::Debug + 'static> Session<E> {
    /// Create a session over `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidConfig`] when `options` do not validate.
    pub fn new(
        root: E,
        options: FilterOptions,
        registry: Arc<PredicateRegistry<E>>,
    ) -> Result<Self, SiftError> {
        options.validate()?;
        Ok(Self {
            engine: MatchEngine::from_options(&options),
            store: FilterStore::new(options.filter_mode()),
            root,
            options,
            registry,
            on_results: None,
            on_filter_change: None,
            dispatcher: None,
        })
    }

    /// Deliver every evaluation pass to `callback`.
    #[must_use]
    pub fn on_results(mut self, callback: impl Into<Callback<FilterResults<E>>>) -> Self {
        self.on_results = Some(callback.into());
        self
    }

    /// Deliver every real filter change to `callback`.
    #[must_use]
    pub fn on_filter_change(mut self, callback: impl Into<Callback<ControlChange<E>>>) -> Self {
        self.on_filter_change = Some(callback.into());
        self
    }

    /// Route named events through `dispatcher`.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: impl EventDispatcher<E> + Send + 'static) -> Self {
        self.dispatcher = Some(Box::new(dispatcher));
        self
    }

    /// Read every control under the root and evaluate once.
    ///
    /// Controls are applied in document order and each real change is
    /// delivered. Returns `None` without touching the document when
    /// `checkOnStart` is off.
    pub fn start<D>(&mut self, doc: &D) -> Option<FilterResults<E>>
    where
        D: Document<Element = E> + ?Sized,
    {
        if !self.options.check_on_start {
            return None;
        }

        let controls = doc.query_attribute(&self.root, &self.options.attribute_name_prefix);
        debug!(controls = controls.len(), "session_start");
        for control in &controls {
            match self.apply_control(doc, control) {
                Ok(Some(change)) => self.deliver_change(control, change),
                Ok(None) => {}
                Err(error) => debug!(control = ?control, error = %error, "control_skipped"),
            }
        }

        let results = self.evaluate(doc);
        self.deliver_results(&results);
        Some(results)
    }

    /// React to a value change on `control`.
    ///
    /// Returns `Ok(None)` when the reading leaves the filter state unchanged;
    /// nothing is re-evaluated or delivered in that case.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::ForeignControl`] when `control` is not a
    /// descendant of the root, and [`SiftError::NotAControl`] when it lacks a
    /// filter name. The state is left untouched in both cases.
    pub fn handle_change<D>(
        &mut self,
        doc: &D,
        control: &E,
    ) -> Result<Option<FilterResults<E>>, SiftError>
    where
        D: Document<Element = E> + ?Sized,
        E: PartialEq,
    {
        if !doc.descendants(&self.root).contains(control) {
            return Err(SiftError::ForeignControl {
                control: format!("{control:?}"),
            });
        }
        let Some(change) = self.apply_control(doc, control)? else {
            debug!(control = ?control, "filter_unchanged");
            return Ok(None);
        };
        self.deliver_change(control, change);

        let results = self.evaluate(doc);
        self.deliver_results(&results);
        Ok(Some(results))
    }

    /// Run a pass against the current state without delivering it.
    pub fn evaluate<D>(&self, doc: &D) -> FilterResults<E>
    where
        D: Document<Element = E> + ?Sized,
    {
        let state = self.store.state();
        let candidates = resolve_candidates(
            doc,
            &self.root,
            state.names(),
            &self.options.target_attribute_prefix,
        );
        let classification = self
            .engine
            .evaluate(doc, &candidates, state, &self.registry);

        FilterResults {
            matched: classification.matched,
            unmatched: classification.unmatched,
            candidates,
            state: state.clone(),
            issues: classification.issues,
        }
    }

    /// Trace the current filters against one element.
    pub fn explain<D>(&self, doc: &D, element: &E) -> CandidateTrace<E>
    where
        D: Document<Element = E> + ?Sized,
    {
        self.engine
            .explain(doc, element, self.store.state(), &self.registry)
    }

    /// The session root.
    pub fn root(&self) -> &E {
        &self.root
    }

    /// The filters currently in effect.
    pub fn state(&self) -> &FilterState {
        self.store.state()
    }

    /// The options this session was created with.
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// The shared predicate registry.
    pub fn registry(&self) -> &Arc<PredicateRegistry<E>> {
        &self.registry
    }

    /// Drop every active filter. Nothing is delivered.
    pub fn reset(&mut self) {
        self.store.clear();
    }

    fn apply_control<D>(&mut self, doc: &D, control: &E) -> Result<Option<FilterChange>, SiftError>
    where
        D: Document<Element = E> + ?Sized,
    {
        let name = doc
            .attribute(control, &self.options.attribute_name_prefix)
            .filter(|name| !is_blank(name))
            .ok_or_else(|| SiftError::NotAControl {
                attribute: self.options.attribute_name_prefix.clone(),
            })?;
        let predicate = doc
            .attribute(control, &self.options.predicate_attribute_name)
            .filter(|predicate| !is_blank(predicate))
            .unwrap_or(self.options.default_predicate_name.as_str())
            .to_string();
        let value = doc.control_value(control);

        Ok(self.store.apply(name, Some(&value), &predicate))
    }

    fn deliver_change(&mut self, control: &E, change: FilterChange) {
        debug!(filter = %change.filter, filters = change.current.len(), "filter_changed");
        let payload = ControlChange {
            control: control.clone(),
            change,
        };
        match &mut self.on_filter_change {
            Some(Callback::Direct(f)) => f(&payload),
            Some(Callback::NamedEvent(event)) => dispatch(
                &mut self.dispatcher,
                &self.root,
                event,
                SessionEvent::FilterChanged(&payload),
            ),
            None => {}
        }
    }

    fn deliver_results(&mut self, results: &FilterResults<E>) {
        match &mut self.on_results {
            Some(Callback::Direct(f)) => f(results),
            Some(Callback::NamedEvent(event)) => dispatch(
                &mut self.dispatcher,
                &self.root,
                event,
                SessionEvent::Results(results),
            ),
            None => {}
        }
    }
}

fn dispatch<E>(
    dispatcher: &mut Option<Box<dyn EventDispatcher<E> + Send>>,
    root: &E,
    event: &str,
    payload: SessionEvent<'_, E>,
) {
    match dispatcher {
        Some(dispatcher) => dispatcher.dispatch(root, event, payload),
        None => warn!(event, "event_dropped"),
    }
}

impl<E: fmt::Debug> fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("state", self.store.state())
            .field("on_results", &self.on_results)
            .field("on_filter_change", &self.on_filter_change)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish_non_exhaustive()
    }
}
