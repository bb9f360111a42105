//! AutoFiller Core Library
//!
//! This crate provides the platform-independent engine for the AutoFiller
//! browser extension. It knows nothing about wasm or a real DOM: every
//! collaborator (storage, page, timers, reactive framework) is a trait that
//! the `af-wasm` crate implements for the browser and the tests implement
//! with in-memory fakes.
//!
//! # Architecture
//!
//! The popup side drives a [`RuleEditor`] that performs full read-modify-write
//! cycles against a [`RuleStore`]. The content side runs [`PageFiller`]
//! evaluation passes, each one a fresh scan of the stored rules against the
//! current page. Passes hold no state between runs and never overwrite a
//! non-empty field, so overlapping passes are harmless.
//!
//! # Modules
//!
//! - `types`: the `Rule` record and collection decoding
//! - `store`: the storage trait and an in-memory implementation
//! - `editor`: rule CRUD over an injected view
//! - `page`: DOM abstraction used by the filler
//! - `binding`: two-way binding path discovery and graph walking
//! - `framework`: reactive-framework seam and instance resolution
//! - `filler`: the evaluation pass
//! - `debounce`: timer-based coalescing utility
//! - `trigger`: page-lifecycle triggers and the mutation predicate
//! - `config`: tunable delays and selectors

pub mod binding;
pub mod config;
pub mod debounce;
pub mod editor;
pub mod filler;
pub mod framework;
pub mod page;
pub mod store;
pub mod trigger;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use binding::{find_model_binding, BindingSources, ModelPath};
pub use config::FillerConfig;
pub use debounce::{Debouncer, Timers};
pub use editor::{EditorError, RuleEditor, RuleView};
pub use filler::{FillMethod, PageFiller, PassReport};
pub use framework::{FrameworkError, InstanceProbe, InstanceResolver, NoFramework, ReactiveFramework};
pub use page::{FormField, Page, PageError};
pub use store::{MemoryStore, RuleStore, StoreError, STORAGE_KEY};
pub use trigger::{batch_adds_inputs, AddedNode, Trigger};
pub use types::Rule;
