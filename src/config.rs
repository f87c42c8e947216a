use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::game::GameKind;
use crate::text_gen::{GenRequest, TextMode};

/// Player-facing options shared by the text-based games.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameOptions {
    pub duration_secs: u64,
    pub text_mode: TextMode,
    pub punctuation: bool,
    pub numbers: bool,
    pub custom_text: String,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            text_mode: TextMode::Words,
            punctuation: false,
            numbers: false,
            custom_text: String::new(),
        }
    }
}

/// Selectable session lengths, cycled from the menu.
pub const DURATIONS: [u64; 4] = [15, 30, 60, 120];

impl GameOptions {
    /// Generator request for a session of `duration_secs` seconds; modes
    /// with their own fixed clock pass an override.
    pub fn gen_request(&self, duration_secs: u64) -> GenRequest {
        GenRequest {
            mode: self.text_mode,
            duration_secs,
            punctuation: self.punctuation,
            numbers: self.numbers,
            custom: self.custom_text.clone(),
        }
    }

    pub fn cycle_duration(&mut self) {
        let idx = DURATIONS
            .iter()
            .position(|d| *d == self.duration_secs)
            .unwrap_or(0);
        self.duration_secs = DURATIONS[(idx + 1) % DURATIONS.len()];
    }

    pub fn cycle_text_mode(&mut self) {
        // custom is reachable only with explicit text, so it is skipped here
        self.text_mode = match self.text_mode {
            TextMode::Words => TextMode::Quotes,
            TextMode::Quotes => TextMode::Code,
            TextMode::Code | TextMode::Custom => TextMode::Words,
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub options: GameOptions,
    pub sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: GameOptions::default(),
            sound: true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typeforge") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typeforge_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Mid-session navigation pointer persisted across relaunches.
///
/// Only ever describes a game about to run, never a finished one, so a
/// restore can land in an active session or the menu but not a stale
/// results view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub game: GameKind,
    pub options: GameOptions,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typeforge") {
            pd.data_dir().join("session.json")
        } else {
            PathBuf::from("typeforge_session.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Option<SessionSnapshot> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn save(&self, snapshot: &SessionSnapshot) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_vec_pretty(snapshot) {
            let _ = fs::write(&self.path, data);
        }
    }

    pub fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config {
            options: GameOptions {
                duration_secs: 60,
                text_mode: TextMode::Quotes,
                punctuation: true,
                numbers: true,
                custom_text: String::new(),
            },
            sound: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_config_falls_back_to_default() {
        let store = FileConfigStore::with_path("/nonexistent/config.json");
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn duration_cycles_through_presets() {
        let mut opts = GameOptions::default();
        assert_eq!(opts.duration_secs, 30);
        opts.cycle_duration();
        assert_eq!(opts.duration_secs, 60);
        opts.cycle_duration();
        assert_eq!(opts.duration_secs, 120);
        opts.cycle_duration();
        assert_eq!(opts.duration_secs, 15);
    }

    #[test]
    fn text_mode_cycle_skips_custom() {
        let mut opts = GameOptions {
            text_mode: TextMode::Custom,
            ..Default::default()
        };
        opts.cycle_text_mode();
        assert_eq!(opts.text_mode, TextMode::Words);
        opts.cycle_text_mode();
        assert_eq!(opts.text_mode, TextMode::Quotes);
        opts.cycle_text_mode();
        assert_eq!(opts.text_mode, TextMode::Code);
        opts.cycle_text_mode();
        assert_eq!(opts.text_mode, TextMode::Words);
    }

    #[test]
    fn snapshot_round_trips_and_clears() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::with_path(dir.path().join("session.json"));
        assert!(store.load().is_none());

        let snap = SessionSnapshot {
            game: GameKind::Survivor,
            options: GameOptions::default(),
        };
        store.save(&snap);
        assert_eq!(store.load(), Some(snap));

        store.clear();
        assert!(store.load().is_none());
    }
}
