//! Saved instance state.
//!
//! A flat map from string keys to primitive values, kept across shell
//! recreation. The shell reads and writes only [`ACTIVE_URL_KEY`].

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use common::EmbedResult;
use serde::{Deserialize, Serialize};

/// Key holding the URL of the active tab.
pub const ACTIVE_URL_KEY: &str = "activeUrl";

/// Primitive value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Saved instance state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceState {
    values: BTreeMap<String, StateValue>,
}

impl InstanceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    /// String value under `key`. Non-string values read as absent.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            StateValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn put(&mut self, key: impl Into<String>, value: StateValue) {
        self.values.insert(key.into(), value);
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, StateValue::Str(value.into()));
    }

    /// Saved active URL.
    pub fn active_url(&self) -> Option<&str> {
        self.get_string(ACTIVE_URL_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load state from a JSON file. A missing file yields empty state.
    pub fn load(path: &Path) -> EmbedResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved instance state");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write state as JSON.
    pub fn save(&self, path: &Path) -> EmbedResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_active_url() {
        let mut state = InstanceState::new();
        assert!(state.active_url().is_none());

        state.put_string(ACTIVE_URL_KEY, "https://example.com");
        assert_eq!(state.active_url(), Some("https://example.com"));
    }

    #[test]
    fn test_non_string_reads_as_absent() {
        let mut state = InstanceState::new();
        state.put(ACTIVE_URL_KEY, StateValue::Int(3));
        assert!(state.contains_key(ACTIVE_URL_KEY));
        assert!(state.active_url().is_none());
    }

    #[test]
    fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        assert!(InstanceState::load(&path).unwrap().is_empty());

        let mut state = InstanceState::new();
        state.put_string(ACTIVE_URL_KEY, "https://example.com/a");
        state.put("scrollY", StateValue::Int(120));
        state.put("zoomed", StateValue::Bool(true));
        state.save(&path).unwrap();

        let loaded = InstanceState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        assert!(InstanceState::load(&path).is_err());
    }
}
