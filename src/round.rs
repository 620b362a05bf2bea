use crate::fall_clock::FallClock;
use crate::judge::square;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Draws challenge numbers uniformly from `1..=max_number`
#[derive(Debug, Clone)]
pub struct RoundGenerator {
    rng: StdRng,
}

impl RoundGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence, for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next(&mut self, max_number: u32) -> u32 {
        self.rng.gen_range(1..=max_number.max(1))
    }
}

impl Default for RoundGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// One falling brick awaiting an answer
#[derive(Debug, Clone)]
pub struct Round {
    number: u32,
    clock: FallClock,
}

impl Round {
    pub fn spawn(number: u32, now: Instant) -> Self {
        Self {
            number,
            clock: FallClock::start(now),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn expected_answer(&self) -> u64 {
        square(self.number)
    }

    pub fn clock(&self) -> &FallClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FallClock {
        &mut self.clock
    }
}
