//! Persistence of the workout list in a browser key-value store.
//!
//! The whole list is written as one JSON array under a single key on every
//! change and read back once at startup.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::StorageError;
use crate::workout::Workout;

/// A string key-value store such as `window.localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`. Holds `None` when the browser denies access
/// (private mode, disabled cookies); every call then fails with
/// [`StorageError::Unavailable`].
pub struct BrowserStorage {
    storage: Option<web_sys::Storage>,
}

impl BrowserStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage is not available, workouts will not be saved");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

fn js_error(e: wasm_bindgen::JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Read(js_error(e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(js_error(e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Write(js_error(e)))
    }
}

/// Saves and loads the workout list under one key.
pub struct WorkoutStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> WorkoutStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Overwrite the stored list with `workouts`.
    pub fn save(&self, workouts: &[Workout]) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(workouts).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.backend.set(&self.key, &json)
    }

    /// Read the stored list.
    ///
    /// Never fails: a missing value, an unreadable store or a value that is not
    /// a JSON array all give an empty list. Records that do not parse as a
    /// workout are skipped and the rest are kept.
    pub fn load(&self) -> Vec<Workout> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read saved workouts: {}", e);
                return Vec::new();
            }
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Ignoring malformed saved workouts: {}", e);
                return Vec::new();
            }
        };

        let total = records.len();
        let mut seen = HashSet::new();
        let workouts: Vec<Workout> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| {
                let workout: Workout = match serde_json::from_value(record) {
                    Ok(w) => w,
                    Err(e) => {
                        warn!("Skipping saved workout #{}: {}", i, e);
                        return None;
                    }
                };
                if let Err(e) = workout.check_measurements() {
                    warn!("Skipping saved workout {}: {}", workout.id(), e);
                    return None;
                }
                if !seen.insert(workout.id().clone()) {
                    warn!("Skipping saved workout with duplicate id {}", workout.id());
                    return None;
                }
                Some(workout)
            })
            .collect();

        info!("Loaded {} of {} saved workouts", workouts.len(), total);
        workouts
    }

    /// Remove the stored list entirely.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::KeyValueStore;
    use crate::error::StorageError;

    /// In-memory store. `failing` makes every write fail, like a full quota.
    #[derive(Default)]
    pub struct MemoryStore {
        pub values: RefCell<HashMap<String, String>>,
        pub failing: bool,
    }

    impl MemoryStore {
        pub fn with_value(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            store
        }
    }

    impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            (**self).get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            (**self).set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            (**self).remove(key)
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing {
                return Err(StorageError::Write("QuotaExceededError".to_string()));
            }
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.failing {
                return Err(StorageError::Write("SecurityError".to_string()));
            }
            self.values.borrow_mut().remove(key);
            Ok(())
        }
    }
}
