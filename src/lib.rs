// Library surface for the game core, headless integration tests and the binary.
// Keep terminal rendering out of here; main.rs owns the widgets.
pub mod app_dirs;
pub mod config;
pub mod events;
pub mod explosion;
pub mod fall_clock;
pub mod game;
pub mod judge;
pub mod leaderboard;
pub mod logging;
pub mod mode;
pub mod round;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod stats;

/// Interval between game ticks (~60 Hz)
pub const TICK_RATE_MS: u64 = 16;
