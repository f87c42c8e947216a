//! Personal bests and session history. Reads and writes are best effort:
//! an unavailable disk degrades to in-memory defaults, never to an error
//! surfaced in a session.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Numeric key-value store for personal bests. Keys are mode+duration
/// scoped (`classic_30`, `survivor_60`, `wordrush`); this is the sole
/// channel by which ghost and car race derive opponent pace from prior
/// classic performance.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<f64>;
    fn set(&self, key: &str, value: f64);
}

#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typeforge") {
            pd.data_dir().join("bests.json")
        } else {
            PathBuf::from("typeforge_bests.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn read_map(&self) -> HashMap<String, f64> {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(map) = serde_json::from_slice(&bytes) {
                return map;
            }
        }
        HashMap::new()
    }
}

impl ScoreStore for FileScoreStore {
    fn get(&self, key: &str) -> Option<f64> {
        self.read_map().get(key).copied()
    }

    fn set(&self, key: &str, value: f64) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_vec_pretty(&map) {
            let _ = fs::write(&self.path, data);
        }
    }
}

/// In-memory store for headless tests and for running with storage
/// unavailable.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    map: std::cell::RefCell<HashMap<String, f64>>,
}

impl MemoryScoreStore {
    pub fn with(key: &str, value: f64) -> Self {
        let store = Self::default();
        store.set(key, value);
        store
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, key: &str) -> Option<f64> {
        self.map.borrow().get(key).copied()
    }

    fn set(&self, key: &str, value: f64) {
        self.map.borrow_mut().insert(key.to_string(), value);
    }
}

pub const HISTORY_CAP: usize = 30;

/// One finished session, newest first in the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub score: u32,
    pub accuracy: String,
    pub game: String,
    pub text_mode: String,
    /// RFC 3339 timestamp; the UI humanizes it for display.
    pub date: String,
}

/// Bounded CSV log of recent sessions.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typeforge") {
            pd.data_dir().join("history.csv")
        } else {
            PathBuf::from("typeforge_history.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Vec<HistoryEntry> {
        let Ok(mut reader) = csv::Reader::from_path(&self.path) else {
            return Vec::new();
        };
        reader.deserialize().filter_map(Result::ok).collect()
    }

    /// Prepend an entry, trimming to the cap, and return the new list.
    pub fn push(&self, entry: HistoryEntry) -> Vec<HistoryEntry> {
        let mut all = self.load();
        all.insert(0, entry);
        all.truncate(HISTORY_CAP);
        self.write(&all);
        all
    }

    pub fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }

    fn write(&self, entries: &[HistoryEntry]) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let Ok(mut writer) = csv::Writer::from_path(&self.path) else {
            return;
        };
        for entry in entries {
            let _ = writer.serialize(entry);
        }
        let _ = writer.flush();
    }
}
