use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use thiserror::Error;

const SORTER_KEY: &str = "sorter";
const FILTER_KEY: &str = "filter";
const SHOW_HIDDEN_KEY: &str = "show_hidden";

#[derive(Debug, Error)]
pub enum PrefError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XDG config directory is unavailable")]
    MissingConfigDir,
}

/// Key-value preference store backed by one JSON file. Writes go through to
/// disk immediately; readers fall back to a default when a key is unset.
pub struct PrefStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl PrefStore {
    pub fn open_default() -> Result<Self, PrefError> {
        let dir = dirs::config_dir()
            .ok_or(PrefError::MissingConfigDir)?
            .join("satchel");
        Self::open(dir.join("prefs.json"))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.lock().get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn set_int(&self, key: &str, value: i64) -> Result<(), PrefError> {
        self.put(key, Value::from(value))
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.lock().get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), PrefError> {
        self.put(key, Value::from(value))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.lock().get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), PrefError> {
        self.put(key, Value::from(value))
    }

    /// Directory sort mode; 0 is the name-ascending default.
    pub fn sort_mode(&self) -> i64 {
        self.get_int(SORTER_KEY, 0)
    }

    pub fn set_sort_mode(&self, mode: i64) -> Result<(), PrefError> {
        self.set_int(SORTER_KEY, mode)
    }

    /// Listing name filter; unset means show everything.
    pub fn filter(&self) -> Option<String> {
        self.get_string(FILTER_KEY)
    }

    pub fn set_filter(&self, filter: Option<&str>) -> Result<(), PrefError> {
        match filter {
            Some(filter) => self.put(FILTER_KEY, Value::from(filter)),
            None => self.remove(FILTER_KEY),
        }
    }

    pub fn show_hidden(&self) -> bool {
        self.get_bool(SHOW_HIDDEN_KEY, false)
    }

    pub fn set_show_hidden(&self, show: bool) -> Result<(), PrefError> {
        self.set_bool(SHOW_HIDDEN_KEY, show)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), PrefError> {
        let mut values = self.lock();
        values.insert(key.to_string(), value);
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), PrefError> {
        let mut values = self.lock();
        values.remove(key);
        self.save(&values)
    }

    fn save(&self, values: &BTreeMap<String, Value>) -> Result<(), PrefError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }
}
