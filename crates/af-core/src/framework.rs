//! Reactive-framework seam.
//!
//! Pages built with a reactive UI framework keep the real form state in the
//! framework's data graph; writing only the DOM value gets overwritten on the
//! next render. A [`ReactiveFramework`] exposes just enough of that graph to
//! assign a bound path through the framework's reactive setter, and an
//! [`InstanceResolver`] finds the root instance through an ordered list of
//! probes.

use std::convert::Infallible;

use crate::binding::{find_model_binding, BindingSources};
use crate::page::{write_and_notify, FormField, PageError};

/// Error type for framework-aware fills.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Framework primitive '{0}' is unavailable")]
    MissingPrimitive(&'static str),
    #[error("Framework call '{call}' failed: {reason}")]
    CallFailed { call: &'static str, reason: String },
    #[error(transparent)]
    Page(#[from] PageError),
}

// =============================================================================
// Instance resolution
// =============================================================================

/// One strategy for locating the framework's root instance.
pub trait InstanceProbe<I> {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
    fn find(&self) -> Option<I>;
}

/// Ordered probes; the first hit wins.
pub struct InstanceResolver<I> {
    probes: Vec<Box<dyn InstanceProbe<I>>>,
}

impl<I> Default for InstanceResolver<I> {
    fn default() -> Self {
        Self { probes: Vec::new() }
    }
}

impl<I> InstanceResolver<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, probe: impl InstanceProbe<I> + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// `None` when there are no probes or none of them matches.
    pub fn resolve(&self) -> Option<I> {
        self.probes.iter().find_map(|probe| {
            let found = probe.find();
            if found.is_some() {
                log::debug!("Framework instance found via {}", probe.name());
            }
            found
        })
    }
}

// =============================================================================
// Framework
// =============================================================================

/// Minimal view of a reactive framework's instance graph.
pub trait ReactiveFramework<F: FormField> {
    /// Root instance handle.
    type Instance;
    /// Any value reachable in the instance graph.
    type Node: Clone;

    fn root(&self, instance: &Self::Instance) -> Self::Node;

    /// Binding information attached to `field`.
    fn binding_sources(&self, field: &F) -> BindingSources;

    /// Property lookup. `None` for absent (or falsy) values.
    fn lookup(&self, node: &Self::Node, key: &str) -> Option<Self::Node>;

    /// Assign through the framework's reactive setter so dependents update.
    fn reactive_set(
        &self,
        instance: &Self::Instance,
        holder: &Self::Node,
        key: &str,
        value: &str,
    ) -> Result<(), FrameworkError>;

    /// Run `task` after the framework's next render flush.
    fn next_tick(&self, instance: &Self::Instance, task: Box<dyn FnOnce()>) -> Result<(), FrameworkError>;
}

/// Outcome of a framework-aware fill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkFill {
    /// Value assigned through the framework; DOM write scheduled on next tick.
    Written,
    /// No binding path found on the target.
    Unbound,
    /// An intermediate path segment was absent; nothing written.
    PathAborted,
}

/// Assign `value` to the path bound on `target`, then on the next tick mirror
/// it into the DOM and fire `input`.
///
/// A `next_tick` error is returned after the reactive write has already
/// happened; the caller's DOM fallback then assigns the same value again.
pub fn fill_through_framework<F, R>(
    framework: &R,
    instance: &R::Instance,
    target: &F,
    value: &str,
) -> Result<FrameworkFill, FrameworkError>
where
    F: FormField,
    R: ReactiveFramework<F>,
{
    let Some(path) = find_model_binding(&framework.binding_sources(target)) else {
        return Ok(FrameworkFill::Unbound);
    };

    let root = framework.root(instance);
    let Some(holder) = path.walk(&root, |node, key| framework.lookup(node, key)) else {
        log::debug!("Binding path '{}' aborted before its last segment", path);
        return Ok(FrameworkFill::PathAborted);
    };

    framework.reactive_set(instance, &holder, path.last(), value)?;

    let field = target.clone();
    let value = value.to_string();
    framework.next_tick(
        instance,
        Box::new(move || {
            if let Err(e) = write_and_notify(&field, &value) {
                log::warn!("Post-flush DOM write failed: {}", e);
            }
        }),
    )?;

    log::debug!("Filled '{}' through framework binding", path);
    Ok(FrameworkFill::Written)
}

/// Framework support disabled: no instance ever resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFramework;

impl<F: FormField> ReactiveFramework<F> for NoFramework {
    type Instance = Infallible;
    type Node = ();

    fn root(&self, instance: &Infallible) {
        match *instance {}
    }

    fn binding_sources(&self, _field: &F) -> BindingSources {
        BindingSources::default()
    }

    fn lookup(&self, _node: &(), _key: &str) -> Option<()> {
        None
    }

    fn reactive_set(&self, instance: &Infallible, _holder: &(), _key: &str, _value: &str) -> Result<(), FrameworkError> {
        match *instance {}
    }

    fn next_tick(&self, instance: &Infallible, _task: Box<dyn FnOnce()>) -> Result<(), FrameworkError> {
        match *instance {}
    }
}
