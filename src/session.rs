//! The per-game state machine: lives, level, answer history and the single
//! live brick.
//!
//! ```text
//! Active --timeout--> Active | GameOver
//! Active <--pause-toggle--> Paused
//! Active --correct--> Active
//! ```
//!
//! Timers are not owned here. [`crate::game::Game`] schedules them and calls
//! back into the session, which re-checks its phase before acting.

use crate::config::Settings;
use crate::events::{GameEvent, Resolution};
use crate::explosion::Explosion;
use crate::fall_clock::{FallState, GROUND_DISTANCE};
use crate::judge::{self, Outcome};
use crate::mode::{GameConfig, Hardness, SpeedMode};
use crate::round::{Round, RoundGenerator};
use std::time::Instant;

pub const PAUSE_MESSAGE: &str = "PAUSED - Press SPACE to continue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Active,
    Paused,
    GameOver,
}

/// Transient banner text, numbered so a delayed clear only removes its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickResult {
    Idle,
    Falling { fraction: f64 },
    Missed { number: u32, game_over: bool },
}

#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    settings: Settings,
    base_speed_secs: f64,
    current_speed_secs: f64,
    lives: u32,
    level: u32,
    correct_count: u32,
    total_correct_secs: f64,
    answer_durations: Vec<f64>,
    failed_numbers: Vec<u32>,
    phase: Phase,
    round: Option<Round>,
    respawn_pending: bool,
    committed: bool,
    leaderboard_rank: Option<usize>,
    message: Option<Message>,
    message_seq: u64,
    explosion: Option<Explosion>,
    explosion_seq: u64,
    generator: RoundGenerator,
    events: Vec<GameEvent>,
}

impl Session {
    /// Start in `Active` with the first brick already falling
    pub fn new(config: GameConfig, settings: Settings, generator: RoundGenerator, now: Instant) -> Self {
        let base_speed_secs = f64::from(config.speed_secs);
        let mut session = Self {
            config,
            settings,
            base_speed_secs,
            current_speed_secs: base_speed_secs,
            lives: settings.lives,
            level: 0,
            correct_count: 0,
            total_correct_secs: 0.0,
            answer_durations: Vec::new(),
            failed_numbers: Vec::new(),
            phase: Phase::Active,
            round: None,
            respawn_pending: false,
            committed: false,
            leaderboard_rank: None,
            message: None,
            message_seq: 0,
            explosion: None,
            explosion_seq: 0,
            generator,
            events: Vec::new(),
        };
        session.events.push(GameEvent::PhaseChanged(Phase::Active));
        session.events.push(GameEvent::LivesChanged(session.lives));
        session.events.push(GameEvent::LevelChanged(0));
        session.spawn_round(now);
        session
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.config.speed_mode
    }

    pub fn hardness(&self) -> Hardness {
        self.config.hardness
    }

    pub fn max_number(&self) -> u32 {
        self.config.max_number
    }

    /// Settings as they were when the session started
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn base_speed_secs(&self) -> f64 {
        self.base_speed_secs
    }

    pub fn current_speed_secs(&self) -> f64 {
        self.current_speed_secs
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn total_correct_secs(&self) -> f64 {
        self.total_correct_secs
    }

    pub fn answer_durations(&self) -> &[f64] {
        &self.answer_durations
    }

    pub fn failed_numbers(&self) -> &[u32] {
        &self.failed_numbers
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn current_number(&self) -> Option<u32> {
        self.round.as_ref().map(Round::number)
    }

    pub fn is_respawn_pending(&self) -> bool {
        self.respawn_pending
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn explosion(&self) -> Option<&Explosion> {
        self.explosion.as_ref()
    }

    /// Identifies the latest explosion; frames scheduled for an older one are ignored
    pub fn explosion_seq(&self) -> u64 {
        self.explosion_seq
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn leaderboard_rank(&self) -> Option<usize> {
        self.leaderboard_rank
    }

    /// How far the live brick has fallen, 0.0 at spawn to 1.0 on the ground
    pub fn brick_fraction(&self, now: Instant) -> Option<f64> {
        self.round
            .as_ref()
            .map(|r| r.clock().fraction(now, self.current_speed_secs))
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Put a new brick in play. While paused the spawn is deferred until
    /// resume; after game over, or with a brick already live, nothing happens.
    pub fn spawn_round(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Paused => {
                self.respawn_pending = true;
                false
            }
            Phase::GameOver => false,
            Phase::Active if self.round.is_some() => false,
            Phase::Active => {
                let number = self.generator.next(self.config.max_number);
                log::debug!("spawned {} at speed {:.2}s", number, self.current_speed_secs);
                self.round = Some(Round::spawn(number, now));
                self.respawn_pending = false;
                self.events.push(GameEvent::RoundSpawned { number });
                true
            }
        }
    }

    pub fn tick(&mut self, now: Instant) -> TickResult {
        if self.phase != Phase::Active {
            return TickResult::Idle;
        }
        let speed = self.current_speed_secs;
        let Some(round) = self.round.as_mut() else {
            return TickResult::Idle;
        };
        match round.clock_mut().advance(now, speed) {
            FallState::Falling { fraction } => TickResult::Falling { fraction },
            FallState::Landed => self.miss(now),
            FallState::Grounded => TickResult::Idle,
        }
    }

    fn miss(&mut self, now: Instant) -> TickResult {
        let Some(round) = self.round.take() else {
            return TickResult::Idle;
        };
        let number = round.number();
        self.lives = self.lives.saturating_sub(1);
        self.failed_numbers.push(number);
        log::info!("missed {} ({} lives left)", number, self.lives);

        self.events.push(GameEvent::RoundResolved(Resolution::Missed { number }));
        self.events.push(GameEvent::LivesChanged(self.lives));
        self.set_message(format!(
            "Fail! The correct answer was: {}",
            round.expected_answer()
        ));

        if self.lives == 0 {
            self.enter_game_over();
            TickResult::Missed {
                number,
                game_over: true,
            }
        } else {
            self.spawn_round(now);
            TickResult::Missed {
                number,
                game_over: false,
            }
        }
    }

    pub fn submit(&mut self, input: &str, now: Instant) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Rejected;
        }
        let Some(number) = self.current_number() else {
            return Outcome::Rejected;
        };
        match judge::judge(input, number) {
            Outcome::Correct => {
                self.answer_correct(now);
                Outcome::Correct
            }
            other => other,
        }
    }

    fn answer_correct(&mut self, now: Instant) {
        let Some(round) = self.round.take() else {
            return;
        };
        let seconds = round.clock().elapsed(now).as_secs_f64();
        let brick_top = round
            .clock()
            .position(now, self.current_speed_secs)
            .min(GROUND_DISTANCE);

        self.level += 1;
        self.correct_count += 1;
        self.answer_durations.push(seconds);
        self.total_correct_secs += seconds;

        if self.settings.speed_increase && judge::is_speed_step(self.level) {
            self.current_speed_secs = judge::scaled_speed(self.base_speed_secs, self.level);
            log::info!(
                "level {}: fall time now {:.2}s",
                self.level,
                self.current_speed_secs
            );
        }

        self.clear_message();
        self.explosion_seq += 1;
        self.explosion = Some(Explosion::at_brick(brick_top));
        self.events.push(GameEvent::RoundResolved(Resolution::Answered {
            number: round.number(),
            seconds,
        }));
        self.events.push(GameEvent::LevelChanged(self.level));
    }

    /// Returns true when the phase changed
    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Active => {
                self.phase = Phase::Paused;
                if let Some(round) = self.round.as_mut() {
                    round.clock_mut().pause(now);
                }
                self.events.push(GameEvent::PhaseChanged(Phase::Paused));
                self.set_message(PAUSE_MESSAGE.to_string());
                true
            }
            Phase::Paused => {
                self.phase = Phase::Active;
                if let Some(round) = self.round.as_mut() {
                    round.clock_mut().resume(now);
                }
                self.events.push(GameEvent::PhaseChanged(Phase::Active));
                self.clear_message();
                if self.respawn_pending {
                    self.spawn_round(now);
                }
                true
            }
            Phase::GameOver => false,
        }
    }

    fn enter_game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.round = None;
        self.explosion = None;
        self.respawn_pending = false;
        log::info!(
            "game over at level {} ({} / {})",
            self.level,
            self.config.speed_mode,
            self.config.hardness
        );
        self.events.push(GameEvent::PhaseChanged(Phase::GameOver));
    }

    /// Replace the banner; the returned sequence number identifies it
    pub fn set_message(&mut self, text: String) -> u64 {
        self.message_seq += 1;
        self.message = Some(Message {
            seq: self.message_seq,
            text: text.clone(),
        });
        self.events.push(GameEvent::MessageChanged(Some(text)));
        self.message_seq
    }

    pub fn clear_message(&mut self) {
        if self.message.take().is_some() {
            self.events.push(GameEvent::MessageChanged(None));
        }
    }

    /// Clear the banner only if it has not been replaced since
    pub fn expire_message(&mut self, seq: u64) {
        if self.message.as_ref().is_some_and(|m| m.seq == seq) {
            self.clear_message();
        }
    }

    /// Advance explosion `seq` by one frame. Returns true while more frames
    /// remain; a replaced or finished explosion reports false.
    pub fn step_explosion(&mut self, seq: u64) -> bool {
        if seq != self.explosion_seq {
            return false;
        }
        let Some(explosion) = self.explosion.as_mut() else {
            return false;
        };
        if explosion.step() {
            true
        } else {
            self.explosion = None;
            false
        }
    }

    pub(crate) fn mark_committed(&mut self, rank: Option<usize>) {
        self.committed = true;
        self.leaderboard_rank = rank;
    }
}
