//! Top-level controller the front end drives: owns the injected stores, the
//! timer queue and at most one session.

use crate::config::{Settings, SettingsStore};
use crate::events::GameEvent;
use crate::explosion::FRAME_INTERVAL;
use crate::judge::Outcome;
use crate::leaderboard::{Category, Leaderboard, LeaderboardStore};
use crate::mode::GameConfig;
use crate::round::RoundGenerator;
use crate::scheduler::{Scheduler, Task};
use crate::session::{Session, TickResult};
use crate::stats::{self, SessionSummary};
use std::time::{Duration, Instant};

/// Pause between squaring a brick and the next one appearing
pub const RESPAWN_DELAY: Duration = Duration::from_millis(500);
/// How long the miss banner stays up
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Game {
    settings_store: Box<dyn SettingsStore>,
    leaderboard_store: Box<dyn LeaderboardStore>,
    settings: Settings,
    scheduler: Scheduler,
    generation: u64,
    session: Option<Session>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(
        settings_store: Box<dyn SettingsStore>,
        leaderboard_store: Box<dyn LeaderboardStore>,
    ) -> Self {
        let settings = settings_store.load();
        Self {
            settings_store,
            leaderboard_store,
            settings,
            scheduler: Scheduler::new(),
            generation: 0,
            session: None,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Apply and persist new settings. A failed write keeps the new values
    /// for this run.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        match self.settings_store.save(&settings) {
            Ok(()) => log::info!("settings saved: {:?}", settings),
            Err(e) => log::warn!("could not save settings: {}", e),
        }
    }

    pub fn leaderboard(&self) -> Leaderboard {
        self.leaderboard_store.load()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Timers still queued for the current session
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending(self.generation)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn on_session_start(&mut self, config: GameConfig, now: Instant) {
        self.start_session_with(config, RoundGenerator::new(), now);
    }

    /// Start a session with a caller-supplied number source
    pub fn start_session_with(&mut self, config: GameConfig, generator: RoundGenerator, now: Instant) {
        self.bump_generation();
        log::info!(
            "session {} started: {} ({}s) / {} (1-{}), {} lives, speed increase {}",
            self.generation,
            config.speed_mode,
            config.speed_secs,
            config.hardness,
            config.max_number,
            self.settings.lives,
            self.settings.speed_increase
        );
        self.session = Some(Session::new(config, self.settings, generator, now));
        self.events.push(GameEvent::SessionStarted {
            generation: self.generation,
        });
        self.collect_session_events();
    }

    /// Drop the session; anything it scheduled is discarded
    pub fn close_session(&mut self) {
        if self.session.take().is_some() {
            log::debug!("session {} closed", self.generation);
            self.bump_generation();
        }
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        self.scheduler.retain_generation(self.generation);
    }

    pub fn on_tick(&mut self, now: Instant) {
        for task in self.scheduler.drain_due(now, self.generation) {
            self.run_task(task, now);
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let TickResult::Missed { .. } = session.tick(now) {
            self.schedule_message_expiry(now);
        }
        self.collect_session_events();
    }

    fn run_task(&mut self, task: Task, now: Instant) {
        let generation = self.generation;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match task {
            Task::Respawn => {
                session.spawn_round(now);
            }
            Task::ExplosionFrame { seq } => {
                if session.step_explosion(seq) {
                    self.scheduler.schedule(
                        generation,
                        now + FRAME_INTERVAL,
                        Task::ExplosionFrame { seq },
                    );
                }
            }
            Task::ClearMessage { seq } => session.expire_message(seq),
        }
    }

    pub fn on_submit(&mut self, text: &str, now: Instant) -> Outcome {
        let generation = self.generation;
        let Some(session) = self.session.as_mut() else {
            return Outcome::Rejected;
        };
        let outcome = session.submit(text, now);
        if outcome == Outcome::Correct {
            let seq = session.explosion_seq();
            self.scheduler
                .schedule(generation, now + RESPAWN_DELAY, Task::Respawn);
            self.scheduler
                .schedule(generation, now + FRAME_INTERVAL, Task::ExplosionFrame { seq });
        }
        self.collect_session_events();
        outcome
    }

    /// Returns true when the session changed phase
    pub fn on_pause_toggle(&mut self, now: Instant) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let toggled = session.toggle_pause(now);
        self.collect_session_events();
        toggled
    }

    /// Summary of the current session. After game over the first request
    /// also commits an eligible score to the leaderboard.
    pub fn on_stats_requested(&mut self) -> Option<SessionSummary> {
        let session = self.session.as_mut()?;
        let was_committed = session.is_committed();
        let summary = stats::finalize(session, self.leaderboard_store.as_ref());
        if !was_committed && summary.saved {
            if let Some(category) = Category::new(summary.speed_mode, summary.hardness) {
                self.events.push(GameEvent::LeaderboardCommitted {
                    category,
                    level: summary.level,
                    rank: summary.rank,
                });
            }
        }
        self.collect_session_events();
        Some(summary)
    }

    fn schedule_message_expiry(&mut self, now: Instant) {
        let seq = self.session.as_ref().and_then(|s| s.message()).map(|m| m.seq);
        if let Some(seq) = seq {
            self.scheduler
                .schedule(self.generation, now + MESSAGE_TIMEOUT, Task::ClearMessage { seq });
        }
    }

    fn collect_session_events(&mut self) {
        if let Some(session) = self.session.as_mut() {
            self.events.extend(session.take_events());
        }
    }
}
