//! Page filler: the evaluation pass.
//!
//! A pass is a fresh, stateless scan: read every rule, keep the valid ones
//! whose pattern occurs in the page URL, query their selector and fill each
//! matched element whose value is empty. Elements that already hold a value
//! are never touched, which makes repeated and overlapping passes no-ops.

use crate::config::FillerConfig;
use crate::framework::{fill_through_framework, FrameworkFill, InstanceResolver, NoFramework, ReactiveFramework};
use crate::page::{effective_target, write_and_notify, FormField, Page, PageError};
use crate::store::RuleStore;

/// How a field was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    /// Assigned through the framework binding.
    Framework,
    /// Written directly to the DOM element.
    Dom,
}

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub rules_seen: usize,
    pub invalid_rules: usize,
    pub matched_rules: usize,
    pub selector_errors: usize,
    pub framework_fills: usize,
    pub dom_fills: usize,
    /// Matched elements left alone because they were not empty.
    pub skipped_fields: usize,
    pub failed_fills: usize,
}

impl PassReport {
    pub fn filled(&self) -> usize {
        self.framework_fills + self.dom_fills
    }
}

pub struct PageFiller<P, S, R = NoFramework>
where
    P: Page,
    R: ReactiveFramework<P::Field>,
{
    page: P,
    store: S,
    config: FillerConfig,
    framework: R,
    resolver: InstanceResolver<R::Instance>,
}

impl<P: Page, S: RuleStore> PageFiller<P, S, NoFramework> {
    pub fn new(page: P, store: S, config: FillerConfig) -> Self {
        Self {
            page,
            store,
            config,
            framework: NoFramework,
            resolver: InstanceResolver::new(),
        }
    }

    /// Enable framework-aware fills.
    pub fn with_framework<R>(self, framework: R, resolver: InstanceResolver<R::Instance>) -> PageFiller<P, S, R>
    where
        R: ReactiveFramework<P::Field>,
    {
        PageFiller {
            page: self.page,
            store: self.store,
            config: self.config,
            framework,
            resolver,
        }
    }
}

impl<P, S, R> PageFiller<P, S, R>
where
    P: Page,
    S: RuleStore,
    R: ReactiveFramework<P::Field>,
{
    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn config(&self) -> &FillerConfig {
        &self.config
    }

    /// Run one evaluation pass over the current rules and DOM.
    pub async fn run_pass(&self) -> PassReport {
        let mut report = PassReport::default();

        let rules = match self.store.load().await {
            Ok(rules) => rules,
            Err(e) => {
                log::warn!("Failed to read rules: {}", e);
                return report;
            }
        };
        if rules.is_empty() {
            log::debug!("No rules found");
            return report;
        }

        let url = self.page.url();
        log::debug!("Evaluating {} rules against {}", rules.len(), url);

        for rule in &rules {
            report.rules_seen += 1;
            if !rule.is_valid() {
                log::debug!("Skipping invalid rule: {:?}", rule);
                report.invalid_rules += 1;
                continue;
            }
            if !rule.matches_url(&url) {
                continue;
            }
            report.matched_rules += 1;
            log::debug!("URL pattern matched: {}", rule.url_pattern);

            let fields = match self.page.query_all(&rule.selector) {
                Ok(fields) => fields,
                Err(e) => {
                    log::warn!("{}", e);
                    report.selector_errors += 1;
                    continue;
                }
            };
            log::debug!("Found {} elements for '{}'", fields.len(), rule.selector);

            for field in &fields {
                let target = self.target_of(field);
                if !is_empty(field) || !is_empty(&target) {
                    report.skipped_fields += 1;
                    continue;
                }
                match self.fill_target(&target, &rule.default_value) {
                    Ok(FillMethod::Framework) => report.framework_fills += 1,
                    Ok(FillMethod::Dom) => report.dom_fills += 1,
                    Err(e) => {
                        log::warn!("Failed to fill '{}': {}", rule.selector, e);
                        report.failed_fills += 1;
                    }
                }
            }
        }

        if report.filled() > 0 {
            log::info!(
                "Filled {} fields ({} via framework, {} via DOM)",
                report.filled(),
                report.framework_fills,
                report.dom_fills
            );
        }
        report
    }

    /// Element that receives the value for a matched field.
    pub fn target_of(&self, field: &P::Field) -> P::Field {
        effective_target(field, &self.config.wrapper_selector, &self.config.inner_input_selector)
    }

    /// Fill a resolved target, preferring the framework binding and falling
    /// back to a direct DOM write. The caller checks that it is empty.
    pub fn fill_target(&self, target: &P::Field, value: &str) -> Result<FillMethod, PageError> {
        if let Some(instance) = self.resolver.resolve() {
            match fill_through_framework(&self.framework, &instance, target, value) {
                Ok(FrameworkFill::Written) => return Ok(FillMethod::Framework),
                Ok(FrameworkFill::Unbound) => log::debug!("No binding path, using DOM write"),
                Ok(FrameworkFill::PathAborted) => log::debug!("Binding path unresolved, using DOM write"),
                Err(e) => log::warn!("Framework fill failed, using DOM write: {}", e),
            }
        }

        write_and_notify(target, value)?;
        Ok(FillMethod::Dom)
    }
}

/// Both the matched element and the write target must be empty.
fn is_empty<F: FormField>(field: &F) -> bool {
    field.current_value().as_deref() == Some("")
}
