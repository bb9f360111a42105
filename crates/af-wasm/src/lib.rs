//! WebAssembly bindings for AutoFiller
//!
//! The extension's JS loaders call [`start_content`] from the content script
//! and [`start_popup`] from the popup page once the wasm module is
//! instantiated.

use std::rc::Rc;
use std::sync::Once;

use wasm_bindgen::prelude::*;

use af_core::{FillerConfig, RuleStore};

pub mod content;
pub mod dom;
pub mod popup;
pub mod storage;
pub mod vue;

use content::ContentScript;
use storage::ChromeStorage;

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
    });
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Handle returned to the content-script loader.
#[wasm_bindgen]
pub struct ContentHandle {
    script: Rc<ContentScript>,
}

#[wasm_bindgen]
impl ContentHandle {
    /// Stop observing the page.
    pub fn stop(&self) {
        self.script.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.script.is_stopped()
    }
}

/// Parse an optional object of `FillerConfig` overrides (camelCase keys).
/// `undefined` or `null` means defaults.
pub fn parse_config(config: JsValue) -> Result<FillerConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(FillerConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("Invalid filler config: {}", e)))
}

/// Start filling on the current page.
#[wasm_bindgen]
pub fn start_content(config: JsValue) -> Result<ContentHandle, JsValue> {
    init_logging();
    let script = ContentScript::start(parse_config(config)?)?;
    Ok(ContentHandle { script })
}

/// Wire up the popup rule editor. Takes the same config object as
/// [`start_content`]; only `storageKey` is used.
#[wasm_bindgen]
pub fn start_popup(config: JsValue) -> Result<(), JsValue> {
    init_logging();
    popup::start(&parse_config(config)?.storage_key)
}

/// Overwrite the stored rule collection with an empty one.
#[wasm_bindgen]
pub async fn clear_all_rules(config: JsValue) -> Result<(), JsValue> {
    init_logging();
    let config = parse_config(config)?;
    ChromeStorage::new(config.storage_key)
        .save(&[])
        .await
        .map_err(|e| JsValue::from_str(&format!("Failed to clear rules: {}", e)))?;
    log::info!("All rules cleared");
    Ok(())
}
