//! # Profile Store
//!
//! Flat JSON key-value persistence for saved slot-settings profiles.
//!
//! The store file is a single JSON object mapping identity token to the
//! profile's flat interchange form. Entries are validated on the way out,
//! so a hand-edited file cannot smuggle a malformed profile to the encoder.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Mc3000Error, Result};
use crate::protocol::SlotSettings;

/// A profile store backed by one JSON file
pub struct ProfileStore {
    path: PathBuf,
    data: Map<String, Value>,
}

impl ProfileStore {
    /// Open a store, loading the backing file when it exists
    ///
    /// A file that fails to parse is treated as empty; the next flush
    /// rewrites it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!("profile store {} is not a JSON object, starting empty", path.display());
                    Map::new()
                }
            }
        } else {
            Map::new()
        };

        Ok(Self { path, data })
    }

    /// Identity tokens of every stored profile
    pub fn list_ids(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Raw stored value for one token
    pub fn read(&self, id: &str) -> Option<&Value> {
        self.data.get(id)
    }

    /// Store a raw value under a token
    pub fn write(&mut self, id: &str, value: Value, flush: bool) -> Result<()> {
        self.data.insert(id.to_string(), value);
        if flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Remove one entry
    pub fn delete(&mut self, id: &str, flush: bool) -> Result<()> {
        self.data.remove(id);
        if flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Drop every entry without flushing
    pub fn purge(&mut self) {
        self.data.clear();
    }

    /// Write the store back to its file
    pub fn flush(&self) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&Value::Object(self.data.clone()))?;
        fs::write(&self.path, rendered)?;
        Ok(())
    }

    /// Save a profile, assigning a fresh identity token if it has none
    ///
    /// Returns the token the profile is stored under.
    pub fn save(&mut self, settings: &mut SlotSettings) -> Result<String> {
        let id = match settings.id.clone() {
            Some(id) => id,
            None => settings.assign_new_id(),
        };
        self.write(&id, serde_json::to_value(&*settings)?, true)?;
        Ok(id)
    }

    /// Load and validate one stored profile
    pub fn get(&self, id: &str) -> Result<SlotSettings> {
        let value = self
            .read(id)
            .ok_or_else(|| Mc3000Error::ProfileNotFound(id.to_string()))?;
        let mut settings = SlotSettings::from_json_value(value)?;
        settings.id = Some(id.to_string());
        Ok(settings)
    }

    /// Every stored profile that still validates, in store order
    ///
    /// Entries that fail validation are skipped with a warning rather than
    /// poisoning the whole listing.
    pub fn profiles(&self) -> Vec<SlotSettings> {
        let mut profiles = Vec::new();
        for (id, value) in &self.data {
            match SlotSettings::from_json_value(value) {
                Ok(mut settings) => {
                    settings.id = Some(id.clone());
                    profiles.push(settings);
                }
                Err(err) => warn!("skipping stored profile '{}': {}", id, err),
            }
        }
        profiles
    }
}
