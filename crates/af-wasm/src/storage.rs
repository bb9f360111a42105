//! `chrome.storage.local` backed rule store.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use af_core::types::decode_rules;
use af_core::{Rule, RuleStore, StoreError};

use crate::js_error;

/// Rule collection stored under a single key of the extension's local
/// storage area. Uses the promise-returning extension storage API.
#[derive(Debug, Clone)]
pub struct ChromeStorage {
    key: String,
}

impl ChromeStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn area() -> Result<JsValue, StoreError> {
        let mut current: JsValue = js_sys::global().into();
        for name in ["chrome", "storage", "local"] {
            current = Reflect::get(&current, &JsValue::from_str(name))
                .map_err(|e| StoreError::Unavailable(js_error(&e)))?;
            if current.is_undefined() || current.is_null() {
                return Err(StoreError::Unavailable(format!("chrome.storage.local ({} missing)", name)));
            }
        }
        Ok(current)
    }

    async fn call(area: &JsValue, method: &str, arg: &JsValue) -> Result<JsValue, StoreError> {
        let func: Function = Reflect::get(area, &JsValue::from_str(method))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| StoreError::Unavailable(format!("chrome.storage.local.{}", method)))?;

        let returned = func
            .call1(area, arg)
            .map_err(|e| StoreError::Backend(js_error(&e)))?;
        let promise: Promise = returned
            .dyn_into()
            .map_err(|_| StoreError::Backend(format!("storage.{} did not return a promise", method)))?;

        JsFuture::from(promise)
            .await
            .map_err(|e| StoreError::Backend(js_error(&e)))
    }
}

#[async_trait(?Send)]
impl RuleStore for ChromeStorage {
    async fn load(&self) -> Result<Vec<Rule>, StoreError> {
        let area = Self::area()?;
        let keys = Array::of1(&JsValue::from_str(&self.key));
        let result = Self::call(&area, "get", &keys).await?;

        let stored = Reflect::get(&result, &JsValue::from_str(&self.key))
            .map_err(|e| StoreError::Backend(js_error(&e)))?;
        if stored.is_undefined() || stored.is_null() {
            return Ok(Vec::new());
        }

        let value: serde_json::Value = serde_wasm_bindgen::from_value(stored)
            .map_err(|e| StoreError::Backend(format!("Failed to read stored rules: {}", e)))?;
        Ok(decode_rules(value))
    }

    async fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        let area = Self::area()?;
        let encoded = serde_wasm_bindgen::to_value(rules)
            .map_err(|e| StoreError::Backend(format!("Failed to encode rules: {}", e)))?;

        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(&self.key), &encoded)
            .map_err(|e| StoreError::Backend(js_error(&e)))?;

        Self::call(&area, "set", &items).await?;
        log::debug!("Persisted {} rules under '{}'", rules.len(), self.key);
        Ok(())
    }
}
