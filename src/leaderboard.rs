//! Top level scores per (speed mode, hardness) category.
//!
//! Persisted as a JSON object keyed `"{speed}_{hardness}"`, each value a
//! descending list of at most [`MAX_ENTRIES`] levels.

use crate::app_dirs::AppDirs;
use crate::mode::{Hardness, SpeedMode};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Scores kept per category
pub const MAX_ENTRIES: usize = 5;

/// A leaderboard category. Custom modes never have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category {
    speed_mode: SpeedMode,
    hardness: Hardness,
}

impl Category {
    pub fn new(speed_mode: SpeedMode, hardness: Hardness) -> Option<Self> {
        if speed_mode.is_custom() || hardness.is_custom() {
            return None;
        }
        Some(Self {
            speed_mode,
            hardness,
        })
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn hardness(&self) -> Hardness {
        self.hardness
    }

    pub fn key(&self) -> String {
        format!("{}_{}", self.speed_mode, self.hardness)
    }

    /// The 16 fixed categories, speed major
    pub fn all() -> impl Iterator<Item = Category> {
        SpeedMode::PRESETS.into_iter().flat_map(|speed_mode| {
            Hardness::PRESETS.into_iter().map(move |hardness| Category {
                speed_mode,
                hardness,
            })
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    scores: BTreeMap<String, Vec<u32>>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self, category: Category) -> &[u32] {
        self.scores
            .get(&category.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Insert a level reached, keeping the list descending and capped.
    /// Returns the 1-based rank, or None when the level fell off the board.
    pub fn record(&mut self, category: Category, level: u32) -> Option<usize> {
        let entries = self.scores.entry(category.key()).or_default();
        // equal scores keep their earlier position
        let pos = entries
            .iter()
            .position(|&s| level > s)
            .unwrap_or(entries.len());
        entries.insert(pos, level);
        entries.truncate(MAX_ENTRIES);
        (pos < MAX_ENTRIES).then_some(pos + 1)
    }

    pub fn best(&self, category: Category) -> Option<u32> {
        self.scores(category).first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.values().all(Vec::is_empty)
    }

    /// Re-establish ordering and cap on data that came from disk
    fn normalize(&mut self) {
        for entries in self.scores.values_mut() {
            entries.sort_unstable_by(|a, b| b.cmp(a));
            entries.truncate(MAX_ENTRIES);
        }
    }
}

pub trait LeaderboardStore {
    /// Never fails: a missing or corrupt record yields an empty board
    fn load(&self) -> Leaderboard;
    fn save(&self, board: &Leaderboard) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileLeaderboardStore {
    path: PathBuf,
}

impl FileLeaderboardStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::leaderboard_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileLeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardStore for FileLeaderboardStore {
    fn load(&self) -> Leaderboard {
        let Ok(bytes) = fs::read(&self.path) else {
            return Leaderboard::new();
        };
        match serde_json::from_slice::<Leaderboard>(&bytes) {
            Ok(mut board) => {
                board.normalize();
                board
            }
            Err(e) => {
                log::warn!(
                    "ignoring unreadable leaderboard {}: {}",
                    self.path.display(),
                    e
                );
                Leaderboard::new()
            }
        }
    }

    fn save(&self, board: &Leaderboard) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(board).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}

/// In-process leaderboard, used with `--ephemeral` and in tests
#[derive(Debug, Default)]
pub struct MemoryLeaderboardStore {
    board: RefCell<Leaderboard>,
    saves: Cell<usize>,
    fail_saves: bool,
}

impl MemoryLeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Number of successful saves so far
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl LeaderboardStore for MemoryLeaderboardStore {
    fn load(&self) -> Leaderboard {
        self.board.borrow().clone()
    }

    fn save(&self, board: &Leaderboard) -> io::Result<()> {
        if self.fail_saves {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only store"));
        }
        *self.board.borrow_mut() = board.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl<S: LeaderboardStore + ?Sized> LeaderboardStore for std::rc::Rc<S> {
    fn load(&self) -> Leaderboard {
        (**self).load()
    }

    fn save(&self, board: &Leaderboard) -> io::Result<()> {
        (**self).save(board)
    }
}
