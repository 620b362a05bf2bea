use crate::app_dirs::AppDirs;
use crate::mode::{checked_lives, parse_field, ConfigError};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lives a session must start with for its score to reach the leaderboard
pub const LEADERBOARD_LIVES: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub lives: u32,
    #[serde(default)]
    pub speed_increase: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lives: LEADERBOARD_LIVES,
            speed_increase: false,
        }
    }
}

impl Settings {
    pub fn new(lives: i64, speed_increase: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            lives: checked_lives(lives)?,
            speed_increase,
        })
    }

    /// Validate the settings dialog; nothing is applied on error
    pub fn from_dialog(lives_text: &str, speed_increase: bool) -> Result<Self, ConfigError> {
        Self::new(parse_field(lives_text)?, speed_increase)
    }

    fn is_valid(&self) -> bool {
        checked_lives(self.lives as i64).is_ok()
    }
}

pub trait SettingsStore {
    /// Never fails: a missing or corrupt record yields the defaults
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) if settings.is_valid() => return settings,
                Ok(settings) => {
                    log::warn!("ignoring out of range settings {:?}", settings);
                }
                Err(e) => {
                    log::warn!("ignoring unreadable settings {}: {}", self.path.display(), e);
                }
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}

/// Keeps settings for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Cell<Settings>,
    fail_saves: bool,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Cell::new(settings),
            fail_saves: false,
        }
    }

    /// A store whose every save reports an I/O error
    pub fn failing(settings: Settings) -> Self {
        Self {
            settings: Cell::new(settings),
            fail_saves: true,
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.settings.get()
    }

    fn save(&self, settings: &Settings) -> io::Result<()> {
        if self.fail_saves {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only store"));
        }
        self.settings.set(*settings);
        Ok(())
    }
}
