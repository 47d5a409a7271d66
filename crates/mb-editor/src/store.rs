//! Persistence boundary: a string key/value store and the diagram library
//! kept in it.
//!
//! The browser supplies `localStorage`; tests and native hosts use
//! [`MemoryStore`]. Values are JSON except the workspace text, the current
//! file id and the language, which are stored raw.

use mb_core::config::{AiConfig, BoardConfig, Language, Settings};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

pub const SAVED_FILES_KEY: &str = "mermaid_saved_files";
pub const WORKSPACE_KEY: &str = "mermaid_current_workspace";
pub const CURRENT_FILE_KEY: &str = "mermaid_current_file_id";
pub const LANGUAGE_KEY: &str = "mermaid_language";
pub const AI_CONFIG_KEY: &str = "mermaid_ai_config";
pub const BOARD_CONFIG_KEY: &str = "mermaid_board_config";

const ALL_KEYS: [&str; 6] = [
    SAVED_FILES_KEY,
    WORKSPACE_KEY,
    CURRENT_FILE_KEY,
    LANGUAGE_KEY,
    AI_CONFIG_KEY,
    BOARD_CONFIG_KEY,
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored value under `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no saved diagram with id `{0}`")]
    UnknownFile(String),
    #[error("a diagram needs a non-empty name")]
    EmptyName,
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Minimal string key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A named diagram in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDiagram {
    pub id: String,
    pub name: String,
    pub code: String,
    /// Milliseconds since the Unix epoch.
    pub updated_at: f64,
}

/// Saved diagrams, the open workspace and settings, mirrored into a store.
///
/// Every mutating call writes through immediately.
pub struct DiagramLibrary<S: KeyValueStore> {
    store: S,
    files: Vec<SavedDiagram>,
    current_id: Option<String>,
    next_serial: u32,
}

impl<S: KeyValueStore> DiagramLibrary<S> {
    /// Open the library in `store`.
    ///
    /// A corrupt file list is logged and treated as empty; it is overwritten
    /// on the next save. A current id pointing at no file is dropped.
    pub fn open(store: S) -> Self {
        let files: Vec<SavedDiagram> = match read_json(&store, SAVED_FILES_KEY) {
            Ok(files) => files.unwrap_or_default(),
            Err(err) => {
                log::warn!("library: {err}; starting with no saved diagrams");
                Vec::new()
            }
        };
        let current_id = store
            .get(CURRENT_FILE_KEY)
            .filter(|id| files.iter().any(|f| &f.id == id));
        Self {
            store,
            files,
            current_id,
            next_serial: 0,
        }
    }

    /// Saved diagrams, newest first.
    pub fn files(&self) -> &[SavedDiagram] {
        &self.files
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current(&self) -> Option<&SavedDiagram> {
        let id = self.current_id.as_deref()?;
        self.files.iter().find(|f| f.id == id)
    }

    /// Display name of the open file, if it has been saved.
    pub fn current_name(&self) -> Option<&str> {
        self.current().map(|f| f.name.as_str())
    }

    /// The last workspace text, if any was stored.
    pub fn workspace(&self) -> Option<String> {
        self.store.get(WORKSPACE_KEY)
    }

    pub fn set_workspace(&mut self, code: &str) -> Result<(), StoreError> {
        self.store.set(WORKSPACE_KEY, code)
    }

    /// The text a fresh session should compare against for dirtiness: the
    /// open file's saved code, or the workspace itself when no file is open.
    pub fn baseline(&self, workspace: &str) -> String {
        self.current()
            .map_or_else(|| workspace.to_string(), |f| f.code.clone())
    }

    /// Save `code` as a new file at the top of the list and make it current.
    pub fn save_as(
        &mut self,
        name: &str,
        code: &str,
        now_ms: f64,
    ) -> Result<&SavedDiagram, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let id = self.fresh_id(now_ms);
        self.files.insert(
            0,
            SavedDiagram {
                id: id.clone(),
                name: name.to_string(),
                code: code.to_string(),
                updated_at: now_ms,
            },
        );
        self.persist_files()?;
        self.set_current(Some(id))?;
        log::debug!("library: saved new diagram `{name}`");
        Ok(&self.files[0])
    }

    /// Overwrite the open file with `code`.
    ///
    /// Returns `Ok(false)` when no file is open; the caller should ask for a
    /// name and use [`save_as`](Self::save_as).
    pub fn save_current(&mut self, code: &str, now_ms: f64) -> Result<bool, StoreError> {
        let Some(id) = self.current_id.clone() else {
            return Ok(false);
        };
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(StoreError::UnknownFile(id))?;
        file.code = code.to_string();
        file.updated_at = now_ms;
        self.persist_files()?;
        Ok(true)
    }

    /// Make file `id` current and return it.
    pub fn load(&mut self, id: &str) -> Result<&SavedDiagram, StoreError> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| StoreError::UnknownFile(id.to_string()))?;
        self.set_current(Some(id.to_string()))?;
        Ok(&self.files[index])
    }

    /// Remove file `id`. Returns whether it was the open file.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        if self.files.len() == before {
            return Err(StoreError::UnknownFile(id.to_string()));
        }
        self.persist_files()?;
        let was_current = self.current_id.as_deref() == Some(id);
        if was_current {
            self.set_current(None)?;
        }
        Ok(was_current)
    }

    /// Detach the workspace from any saved file ("new diagram").
    pub fn close_current(&mut self) -> Result<(), StoreError> {
        self.set_current(None)
    }

    /// Read settings; missing or corrupt parts fall back to defaults.
    pub fn settings(&self) -> Settings {
        let language = match self.store.get(LANGUAGE_KEY).as_deref() {
            Some("EN") => Language::En,
            Some("KO") | None => Language::Ko,
            Some(other) => {
                log::warn!("library: unknown language `{other}`");
                Language::default()
            }
        };
        Settings {
            board: self.settings_part::<BoardConfig>(BOARD_CONFIG_KEY).sanitized(),
            language,
            ai: self.settings_part::<AiConfig>(AI_CONFIG_KEY),
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        let language = match settings.language {
            Language::Ko => "KO",
            Language::En => "EN",
        };
        self.store.set(LANGUAGE_KEY, language)?;
        write_json(&mut self.store, BOARD_CONFIG_KEY, &settings.board)?;
        write_json(&mut self.store, AI_CONFIG_KEY, &settings.ai)
    }

    /// Erase everything this library owns from the store.
    pub fn wipe(&mut self) -> Result<(), StoreError> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        self.files.clear();
        self.current_id = None;
        log::debug!("library: wiped");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn settings_part<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match read_json(&self.store, key) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                log::warn!("library: {err}; using defaults");
                T::default()
            }
        }
    }

    fn set_current(&mut self, id: Option<String>) -> Result<(), StoreError> {
        match &id {
            Some(id) => self.store.set(CURRENT_FILE_KEY, id)?,
            None => self.store.remove(CURRENT_FILE_KEY)?,
        }
        self.current_id = id;
        Ok(())
    }

    fn persist_files(&mut self) -> Result<(), StoreError> {
        write_json(&mut self.store, SAVED_FILES_KEY, &self.files)
    }

    fn fresh_id(&mut self, now_ms: f64) -> String {
        loop {
            self.next_serial += 1;
            let id = format!("file_{}_{}", now_ms.max(0.0) as u64, self.next_serial);
            if !self.files.iter().any(|f| f.id == id) {
                return id;
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

fn write_json<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}
