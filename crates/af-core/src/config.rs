//! Filler configuration.

use serde::Deserialize;

use crate::store::STORAGE_KEY;

/// Delays and selectors used by the content script. Every field has a
/// default, so an empty object (or no config at all) yields the stock
/// behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillerConfig {
    /// Delay after `DOMContentLoaded` before the first pass.
    pub ready_delay_ms: u32,
    /// Delay after window `load` before the safety pass.
    pub load_delay_ms: u32,
    /// Delay of the pass scheduled at script start.
    pub immediate_delay_ms: u32,
    /// Quiet period collapsing bursts of DOM mutations into one pass.
    pub mutation_debounce_ms: u32,
    /// Component wrapper whose inner input receives the value.
    pub wrapper_selector: String,
    /// Native input looked up inside the wrapper.
    pub inner_input_selector: String,
    /// Added nodes matching (or containing) this trigger a debounced pass.
    pub watch_selector: String,
    pub storage_key: String,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            ready_delay_ms: 1000,
            load_delay_ms: 1500,
            immediate_delay_ms: 0,
            mutation_debounce_ms: 500,
            wrapper_selector: ".el-input".to_string(),
            inner_input_selector: "input".to_string(),
            watch_selector: "input, .el-input".to_string(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl FillerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
