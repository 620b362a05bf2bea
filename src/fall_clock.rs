//! Converts active (unpaused) time since a brick spawned into a fall
//! position on a fixed logical playfield.

use std::time::{Duration, Instant};

/// Logical distance from spawn to the ground, independent of the terminal size
pub const GROUND_DISTANCE: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallState {
    Falling { fraction: f64 },
    /// Reported once, on the tick the brick reaches the ground
    Landed,
    /// Already on the ground; nothing left to report
    Grounded,
}

#[derive(Debug, Clone)]
pub struct FallClock {
    accumulated: Duration,
    running_since: Option<Instant>,
    landed: bool,
}

impl FallClock {
    pub fn start(now: Instant) -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: Some(now),
            landed: false,
        }
    }

    /// Time spent falling, excluding every paused interval
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }

    pub fn position(&self, now: Instant, speed_secs: f64) -> f64 {
        if speed_secs <= 0.0 {
            return GROUND_DISTANCE;
        }
        (self.elapsed(now).as_secs_f64() / speed_secs) * GROUND_DISTANCE
    }

    pub fn fraction(&self, now: Instant, speed_secs: f64) -> f64 {
        (self.position(now, speed_secs) / GROUND_DISTANCE).clamp(0.0, 1.0)
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn advance(&mut self, now: Instant, speed_secs: f64) -> FallState {
        if self.landed {
            return FallState::Grounded;
        }
        if self.position(now, speed_secs) >= GROUND_DISTANCE {
            self.landed = true;
            return FallState::Landed;
        }
        FallState::Falling {
            fraction: self.fraction(now, speed_secs),
        }
    }
}
