//! Save persistence.
//!
//! The whole [`PlayerState`] is stored as one versionless JSON document under
//! a fixed key. Loading merges the stored top-level fields over a fresh
//! character, so saves written before a field existed still load.

use crate::core::constants::SAVE_KEY;
use crate::core::game_logic::gain_exp;
use crate::core::game_state::PlayerState;
use crate::data::MasterData;
use directories::ProjectDirs;
use log::{info, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save data is not valid JSON for a player: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save data is not a JSON object")]
    NotAnObject,
    #[error("could not determine a save directory")]
    NoSaveDirectory,
}

/// Durable key-value storage for save documents.
pub trait SaveStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn write(&mut self, key: &str, data: &str) -> Result<(), SaveError>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

/// One `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Uses the platform data directory for the game.
    pub fn new() -> Result<Self, SaveError> {
        let project_dirs =
            ProjectDirs::from("", "", "idle-dungeon").ok_or(SaveError::NoSaveDirectory)?;
        Ok(Self::in_dir(project_dirs.data_dir())?)
    }

    pub fn in_dir(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SaveStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, data: &str) -> Result<(), SaveError> {
        // Write then rename so a crash never leaves a truncated save.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// after moving the store into a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, data: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), data.to_string());
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, data: &str) -> Result<(), SaveError> {
        self.insert(key, data);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Manages saving and loading the player document.
pub struct SaveManager {
    store: Box<dyn SaveStore>,
    key: String,
}

impl SaveManager {
    pub fn new(store: impl SaveStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            key: SAVE_KEY.to_string(),
        }
    }

    pub fn save(&mut self, state: &PlayerState) -> Result<(), SaveError> {
        let json = serde_json::to_string(state)?;
        self.store.write(&self.key, &json)
    }

    /// Loads and reconciles the stored player.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    pub fn try_load(
        &self,
        master: &MasterData,
        current_time: i64,
    ) -> Result<Option<PlayerState>, SaveError> {
        let Some(json) = self.store.read(&self.key)? else {
            return Ok(None);
        };
        let stored: Value = serde_json::from_str(&json)?;
        let has_hp = stored.get("hp").is_some_and(|hp| !hp.is_null());
        let mut state = merge_over_default(stored, master, current_time)?;
        reconcile(&mut state, master);
        // A save without hp loads at full health for its own level.
        if !has_hp {
            state.restore_hp();
        }
        Ok(Some(state))
    }

    /// Like [`SaveManager::try_load`], but a missing or unreadable save
    /// starts a new game.
    pub fn load(&self, master: &MasterData, current_time: i64) -> PlayerState {
        match self.try_load(master, current_time) {
            Ok(Some(state)) => {
                info!(
                    "Loaded save: level {}, dungeon {} wave {}",
                    state.level,
                    state.progression.current_dungeon_id,
                    state.progression.current_wave
                );
                state
            }
            Ok(None) => {
                info!("No save found, starting a new game");
                PlayerState::new(master, current_time)
            }
            Err(e) => {
                warn!("Discarding save: {}", e);
                PlayerState::new(master, current_time)
            }
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self.store.read(&self.key), Ok(Some(_)))
    }

    pub fn delete(&mut self) -> Result<(), SaveError> {
        self.store.remove(&self.key)
    }
}

/// Overlays the stored top-level fields on a fresh character. Stored values
/// win; `null` counts as absent.
pub fn merge_over_default(
    stored: Value,
    master: &MasterData,
    current_time: i64,
) -> Result<PlayerState, SaveError> {
    let Value::Object(stored) = stored else {
        return Err(SaveError::NotAnObject);
    };

    let mut merged = serde_json::to_value(PlayerState::new(master, current_time))?;
    if let Value::Object(base) = &mut merged {
        for (key, value) in stored {
            if !value.is_null() {
                base.insert(key, value);
            }
        }
    }
    Ok(serde_json::from_value(merged)?)
}

/// Restores internal consistency after a load: derived stats are recomputed,
/// the experience requirement comes from the table when it has a row, and
/// dungeon counters are pulled back into range.
pub fn reconcile(state: &mut PlayerState, master: &MasterData) {
    state.level = state.level.max(1);
    state.refresh_stats();

    if let Some(row) = master.exp_row(state.level) {
        state.next_exp = row.next_exp.max(1);
    }
    // Settles saves that stored more exp than the requirement.
    gain_exp(state, master, 0);

    if state.progression.reconcile(master) {
        warn!(
            "Repaired dungeon progress; now in dungeon {} wave {}",
            state.progression.current_dungeon_id, state.progression.current_wave
        );
    }
}
