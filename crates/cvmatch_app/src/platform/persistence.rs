use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cvmatch_core::KeyValueStore;
use cvmatch_engine::AtomicFileWriter;
use cvmatch_logging::{cvm_error, cvm_info, cvm_warn};
use serde::{Deserialize, Serialize};

pub(crate) const PREFERENCES_FILENAME: &str = ".cvmatch_prefs.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedPreferences {
    entries: BTreeMap<String, String>,
}

/// Preference store backed by a RON file; every `set` rewrites the file.
pub(crate) struct RonFileStore {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl RonFileStore {
    /// Reads `dir/.cvmatch_prefs.ron`; a missing or broken file starts empty.
    pub(crate) fn open(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            entries: load_entries(&dir.join(PREFERENCES_FILENAME)),
        }
    }

    fn save(&self) {
        let state = PersistedPreferences {
            entries: self.entries.clone(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&state, pretty) {
            Ok(text) => text,
            Err(err) => {
                cvm_error!("Failed to serialize preferences: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(self.dir.clone());
        if let Err(err) = writer.write(PREFERENCES_FILENAME, content.as_bytes()) {
            cvm_error!("Failed to write preferences to {:?}: {}", self.dir, err);
        }
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.save();
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            cvm_warn!("Failed to read preferences from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };

    match ron::from_str::<PersistedPreferences>(&content) {
        Ok(state) => {
            cvm_info!("Loaded preferences from {:?}", path);
            state.entries
        }
        Err(err) => {
            cvm_warn!("Failed to parse preferences from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}
