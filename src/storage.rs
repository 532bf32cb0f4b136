//! String-keyed, string-valued storage with local-storage semantics.

use crate::error::PlanError;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), PlanError>;
    fn remove_item(&mut self, key: &str) -> Result<(), PlanError>;

    /// Applies several changes at once; `None` removes the key.
    fn set_items(&mut self, items: Vec<(&str, Option<String>)>) -> Result<(), PlanError> {
        for (key, value) in items {
            match value {
                Some(value) => self.set_item(key, value)?,
                None => self.remove_item(key)?,
            }
        }
        Ok(())
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), PlanError> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), PlanError> {
        self.items.remove(key);
        Ok(())
    }
}

/// A JSON object file holding every item, rewritten on each change.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Opens `path`, starting empty if the file does not exist yet.
    ///
    /// A file that exists but cannot be parsed is reported as
    /// [`PlanError::InvalidDocument`] instead of being overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PlanError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        log::info!("opened local storage at {}", path.display());
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PlanError> {
        let text = serde_json::to_string_pretty(&self.items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), PlanError> {
        if self.items.get(key) == Some(&value) {
            return Ok(());
        }
        self.items.insert(key.to_string(), value);
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), PlanError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Rewrites the file at most once for the whole batch.
    fn set_items(&mut self, items: Vec<(&str, Option<String>)>) -> Result<(), PlanError> {
        let mut changed = false;
        for (key, value) in items {
            changed |= match value {
                Some(value) => self.items.insert(key.to_string(), value.clone()) != Some(value),
                None => self.items.remove(key).is_some(),
            };
        }
        if changed {
            self.flush()?;
        }
        Ok(())
    }
}
