//! Evaluation-pass triggers.
//!
//! Every trigger independently schedules a full pass. Passes are not
//! serialized against each other; filling skips non-empty fields, so a
//! redundant pass only costs a few DOM queries.

use crate::config::FillerConfig;

/// What caused a pass to be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Zero-delay pass queued at script start for already-ready pages.
    Immediate,
    /// Document parsed (`DOMContentLoaded`).
    DomReady,
    /// Document and subresources loaded (`load`).
    WindowLoad,
    /// Qualifying nodes were added to the page.
    Mutation,
    /// Back/forward navigation (`popstate`).
    HistoryNavigation,
    /// Same-document fragment change (`hashchange`).
    HashChange,
}

impl Trigger {
    pub const ALL: [Trigger; 6] = [
        Trigger::Immediate,
        Trigger::DomReady,
        Trigger::WindowLoad,
        Trigger::Mutation,
        Trigger::HistoryNavigation,
        Trigger::HashChange,
    ];

    /// Timer delay before the pass runs. `None` means run synchronously from
    /// the event handler.
    pub fn delay_ms(self, config: &FillerConfig) -> Option<u32> {
        match self {
            Trigger::Immediate => Some(config.immediate_delay_ms),
            Trigger::DomReady => Some(config.ready_delay_ms),
            Trigger::WindowLoad => Some(config.load_delay_ms),
            Trigger::Mutation => Some(config.mutation_debounce_ms),
            Trigger::HistoryNavigation | Trigger::HashChange => None,
        }
    }

    /// Only mutation-driven passes are coalesced.
    #[inline]
    pub fn is_debounced(self) -> bool {
        matches!(self, Trigger::Mutation)
    }

    /// DOM event that fires this trigger, and whether it is a window event
    /// (as opposed to a document event).
    pub fn event(self) -> Option<(&'static str, bool)> {
        match self {
            Trigger::DomReady => Some(("DOMContentLoaded", false)),
            Trigger::WindowLoad => Some(("load", true)),
            Trigger::HistoryNavigation => Some(("popstate", true)),
            Trigger::HashChange => Some(("hashchange", true)),
            Trigger::Immediate | Trigger::Mutation => None,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Trigger::Immediate => "immediate",
            Trigger::DomReady => "dom-ready",
            Trigger::WindowLoad => "window-load",
            Trigger::Mutation => "mutation",
            Trigger::HistoryNavigation => "popstate",
            Trigger::HashChange => "hashchange",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Mutation predicate
// =============================================================================

/// A node reported as added by the change-notification subscription.
pub trait AddedNode {
    /// The node itself matches `selector`. Non-element nodes never match.
    fn matches_selector(&self, selector: &str) -> bool;
    /// Some descendant matches `selector`.
    fn contains_selector(&self, selector: &str) -> bool;
}

/// True when any added node is, or contains, an element matching
/// `watch_selector`.
pub fn batch_adds_inputs<N, I>(added: I, watch_selector: &str) -> bool
where
    N: AddedNode,
    I: IntoIterator<Item = N>,
{
    added
        .into_iter()
        .any(|node| node.matches_selector(watch_selector) || node.contains_selector(watch_selector))
}
