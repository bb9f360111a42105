//! Rule editor: create, list, delete and clear rules.
//!
//! Every mutation is a full read-modify-write against the store followed by a
//! re-render from freshly loaded state, so the view always reflects the last
//! successful persist.

use crate::store::{RuleStore, StoreError};
use crate::types::{remove_at, Rule};

/// Message shown when the add-form is submitted with an empty field.
pub const VALIDATION_MESSAGE: &str = "Please fill in all fields!";

/// Error type for editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Required field is empty: {field}")]
    MissingField { field: &'static str },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Presentation side of the editor.
pub trait RuleView {
    /// Replace the displayed list. Position `i` is the delete index for
    /// `rules[i]`.
    fn render(&self, rules: &[Rule]);
    /// Reset the add-form inputs.
    fn clear_form(&self);
    /// Blocking user-facing message.
    fn alert(&self, message: &str);
}

pub struct RuleEditor<S, V> {
    store: S,
    view: V,
}

impl<S: RuleStore, V: RuleView> RuleEditor<S, V> {
    pub fn new(store: S, view: V) -> Self {
        Self { store, view }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Read the collection and render it. A failed read renders an empty list.
    pub async fn load_and_render(&self) -> Vec<Rule> {
        let rules = match self.store.load().await {
            Ok(rules) => rules,
            Err(e) => {
                log::warn!("Failed to load rules: {}", e);
                Vec::new()
            }
        };
        self.view.render(&rules);
        rules
    }

    /// Validate and append a rule. Identical rules may coexist.
    pub async fn add_rule(
        &self,
        url_pattern: &str,
        selector: &str,
        default_value: &str,
    ) -> Result<(), EditorError> {
        let rule = Rule::new(url_pattern, selector, default_value);
        if let Some(field) = rule.missing_field() {
            self.view.alert(VALIDATION_MESSAGE);
            return Err(EditorError::MissingField { field });
        }

        let mut rules = self.store.load().await?;
        rules.push(rule);
        self.store.save(&rules).await?;
        log::info!("Saved rule #{} for '{}'", rules.len() - 1, url_pattern);

        self.load_and_render().await;
        self.view.clear_form();
        Ok(())
    }

    /// Remove the rule at `index`. An out-of-range index still persists and
    /// re-renders the unchanged collection.
    pub async fn delete_rule(&self, index: usize) -> Result<Option<Rule>, EditorError> {
        let mut rules = self.store.load().await?;
        let removed = remove_at(&mut rules, index);
        if removed.is_none() {
            log::debug!("Delete index {} out of range ({} rules)", index, rules.len());
        }
        self.store.save(&rules).await?;
        self.load_and_render().await;
        Ok(removed)
    }

    /// Overwrite the collection with an empty sequence.
    pub async fn clear_all_rules(&self) -> Result<(), EditorError> {
        self.store.save(&[]).await?;
        log::info!("All rules cleared");
        self.load_and_render().await;
        Ok(())
    }
}
