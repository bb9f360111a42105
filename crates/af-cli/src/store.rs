use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};

use af_core::types::decode_rules;
use af_core::{Rule, RuleStore, StoreError, STORAGE_KEY};

/// Rules file laid out like the extension's storage area:
/// `{ "autoFillRules": [ ... ] }`. Other top-level keys are preserved.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_object(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&text)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Backend(format!(
                "'{}' is not a JSON object",
                self.path.display()
            ))),
        }
    }
}

#[async_trait(?Send)]
impl RuleStore for FileStore {
    async fn load(&self) -> Result<Vec<Rule>, StoreError> {
        let mut object = self.read_object().await?;
        Ok(decode_rules(object.remove(STORAGE_KEY).unwrap_or(Value::Null)))
    }

    async fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        let mut object = self.read_object().await?;
        object.insert(STORAGE_KEY.to_string(), serde_json::to_value(rules)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let text = serde_json::to_string_pretty(&Value::Object(object))?;
        tokio::fs::write(&self.path, text).await?;
        log::debug!("Wrote {} rules to {}", rules.len(), self.path.display());
        Ok(())
    }
}
