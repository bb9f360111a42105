//! Rule persistence seam.
//!
//! Both the editor and the filler receive their store explicitly. The browser
//! build talks to `chrome.storage.local`, the CLI to a JSON file and tests to
//! [`MemoryStore`].

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use crate::types::Rule;

/// Storage key holding the whole rule collection.
pub const STORAGE_KEY: &str = "autoFillRules";

/// Error type for rule storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("Storage operation failed: {0}")]
    Backend(String),
    #[error("Invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat key-value access to the rule collection.
///
/// `load` returns the whole collection (empty when nothing was stored yet) and
/// `save` replaces it. There is no partial update and no transaction: callers
/// do read-modify-write and accept that concurrent writers may race.
#[async_trait(?Send)]
pub trait RuleStore {
    async fn load(&self) -> Result<Vec<Rule>, StoreError>;
    async fn save(&self, rules: &[Rule]) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: RefCell<Vec<Rule>>,
    loads: Cell<usize>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: RefCell::new(rules),
            ..Self::default()
        }
    }

    /// Snapshot of the stored collection.
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.borrow().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

#[async_trait(?Send)]
impl RuleStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Rule>, StoreError> {
        self.loads.set(self.loads.get() + 1);
        Ok(self.rules.borrow().clone())
    }

    async fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        self.saves.set(self.saves.get() + 1);
        *self.rules.borrow_mut() = rules.to_vec();
        Ok(())
    }
}

#[async_trait(?Send)]
impl<S: RuleStore + ?Sized> RuleStore for std::rc::Rc<S> {
    async fn load(&self) -> Result<Vec<Rule>, StoreError> {
        (**self).load().await
    }

    async fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        (**self).save(rules).await
    }
}
