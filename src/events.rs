use crate::leaderboard::Category;
use crate::session::Phase;

/// How a brick left the playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Answered { number: u32, seconds: f64 },
    Missed { number: u32 },
}

/// Observable changes for the rendering layer, drained after each entry point
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted { generation: u64 },
    LevelChanged(u32),
    LivesChanged(u32),
    RoundSpawned { number: u32 },
    RoundResolved(Resolution),
    PhaseChanged(Phase),
    MessageChanged(Option<String>),
    LeaderboardCommitted {
        category: Category,
        level: u32,
        rank: Option<usize>,
    },
}
