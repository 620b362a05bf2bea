//! Speed-mode and hardness presets, and the validated configuration a
//! session is started from.

use clap::ValueEnum;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Seconds a brick may take to fall when the player picks a custom speed
pub const CUSTOM_SPEED_RANGE: RangeInclusive<i64> = 1..=99;
/// Upper bound a custom hardness may use for challenge numbers
pub const CUSTOM_MAX_RANGE: RangeInclusive<i64> = 1..=9999;
/// Lives a player may configure
pub const LIVES_RANGE: RangeInclusive<i64> = 1..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, strum_macros::Display)]
pub enum SpeedMode {
    Newbie,
    Beginner,
    Intermediate,
    Expert,
    #[value(skip)]
    Custom,
}

impl SpeedMode {
    /// Every selectable mode, in menu order
    pub const ALL: [SpeedMode; 5] = [
        SpeedMode::Newbie,
        SpeedMode::Beginner,
        SpeedMode::Intermediate,
        SpeedMode::Expert,
        SpeedMode::Custom,
    ];

    /// Modes that have their own leaderboard
    pub const PRESETS: [SpeedMode; 4] = [
        SpeedMode::Newbie,
        SpeedMode::Beginner,
        SpeedMode::Intermediate,
        SpeedMode::Expert,
    ];

    pub fn preset_seconds(self) -> Option<u32> {
        match self {
            SpeedMode::Newbie => Some(20),
            SpeedMode::Beginner => Some(12),
            SpeedMode::Intermediate => Some(8),
            SpeedMode::Expert => Some(4),
            SpeedMode::Custom => None,
        }
    }

    pub fn is_custom(self) -> bool {
        self == SpeedMode::Custom
    }

    pub fn label(self) -> String {
        match self.preset_seconds() {
            Some(secs) => format!("{self} ({secs}s)"),
            None => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, strum_macros::Display)]
pub enum Hardness {
    Easy,
    Medium,
    Hard,
    Insane,
    #[value(skip)]
    Custom,
}

impl Hardness {
    pub const ALL: [Hardness; 5] = [
        Hardness::Easy,
        Hardness::Medium,
        Hardness::Hard,
        Hardness::Insane,
        Hardness::Custom,
    ];

    pub const PRESETS: [Hardness; 4] = [
        Hardness::Easy,
        Hardness::Medium,
        Hardness::Hard,
        Hardness::Insane,
    ];

    pub fn preset_max(self) -> Option<u32> {
        match self {
            Hardness::Easy => Some(100),
            Hardness::Medium => Some(250),
            Hardness::Hard => Some(500),
            Hardness::Insane => Some(1000),
            Hardness::Custom => None,
        }
    }

    pub fn is_custom(self) -> bool {
        self == Hardness::Custom
    }

    pub fn label(self) -> String {
        match self.preset_max() {
            Some(max) => format!("{self} (1-{max})"),
            None => self.to_string(),
        }
    }
}

/// Rejected user input from the custom or settings dialogs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Speed must be between 1 and 99 seconds")]
    SpeedOutOfRange(i64),
    #[error("Max number must be between 1 and 9999")]
    MaxNumberOutOfRange(i64),
    #[error("Lives must be between 1 and 10")]
    LivesOutOfRange(i64),
    #[error("Please enter valid numbers")]
    NotANumber(String),
}

/// Parse a dialog field as a whole number
pub fn parse_field(text: &str) -> Result<i64, ConfigError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| ConfigError::NotANumber(trimmed.to_string()))
}

pub(crate) fn checked_lives(lives: i64) -> Result<u32, ConfigError> {
    if LIVES_RANGE.contains(&lives) {
        Ok(lives as u32)
    } else {
        Err(ConfigError::LivesOutOfRange(lives))
    }
}

/// What a session needs to know about its difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub speed_mode: SpeedMode,
    pub hardness: Hardness,
    pub speed_secs: u32,
    pub max_number: u32,
}

impl GameConfig {
    /// Build a config, taking custom values only for the custom presets.
    /// Custom values given for a preset are ignored.
    pub fn resolve(
        speed_mode: SpeedMode,
        hardness: Hardness,
        custom_speed: Option<i64>,
        custom_max: Option<i64>,
    ) -> Result<Self, ConfigError> {
        let speed_secs = match speed_mode.preset_seconds() {
            Some(secs) => secs,
            None => {
                let secs = custom_speed.ok_or_else(|| ConfigError::NotANumber(String::new()))?;
                if !CUSTOM_SPEED_RANGE.contains(&secs) {
                    return Err(ConfigError::SpeedOutOfRange(secs));
                }
                secs as u32
            }
        };

        let max_number = match hardness.preset_max() {
            Some(max) => max,
            None => {
                let max = custom_max.ok_or_else(|| ConfigError::NotANumber(String::new()))?;
                if !CUSTOM_MAX_RANGE.contains(&max) {
                    return Err(ConfigError::MaxNumberOutOfRange(max));
                }
                max as u32
            }
        };

        Ok(Self {
            speed_mode,
            hardness,
            speed_secs,
            max_number,
        })
    }

    /// Build a config from the raw text of the custom dialog. Fields for
    /// non-custom presets are not parsed.
    pub fn from_dialog(
        speed_mode: SpeedMode,
        hardness: Hardness,
        speed_text: &str,
        max_text: &str,
    ) -> Result<Self, ConfigError> {
        let custom_speed = if speed_mode.is_custom() {
            Some(parse_field(speed_text)?)
        } else {
            None
        };
        let custom_max = if hardness.is_custom() {
            Some(parse_field(max_text)?)
        } else {
            None
        };
        Self::resolve(speed_mode, hardness, custom_speed, custom_max)
    }

    pub fn needs_dialog(speed_mode: SpeedMode, hardness: Hardness) -> bool {
        speed_mode.is_custom() || hardness.is_custom()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            speed_mode: SpeedMode::Beginner,
            hardness: Hardness::Medium,
            speed_secs: 12,
            max_number: 250,
        }
    }
}
