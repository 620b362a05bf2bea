//! One-shot timers stamped with the session generation that scheduled them.
//!
//! Entries left over from a closed or restarted session are discarded when
//! they come due instead of being delivered to the new session.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Spawn the next brick after the post-answer delay
    Respawn,
    /// Advance the explosion with this sequence number by one frame
    ExplosionFrame { seq: u64 },
    /// Clear the banner, if it is still the one with this sequence number
    ClearMessage { seq: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: Instant,
    generation: u64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, generation: u64, due: Instant, task: Task) {
        self.entries.push(Entry {
            due,
            generation,
            task,
        });
    }

    /// Remove every entry due at `now` and return the ones belonging to
    /// `generation`, earliest first. Stale entries are dropped.
    pub fn drain_due(&mut self, now: Instant, generation: u64) -> Vec<Task> {
        let (mut due, pending): (Vec<Entry>, Vec<Entry>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;

        due.sort_by_key(|e| e.due);
        due.into_iter()
            .filter(|e| e.generation == generation)
            .map(|e| e.task)
            .collect()
    }

    /// Forget everything not scheduled by `generation`
    pub fn retain_generation(&mut self, generation: u64) {
        self.entries.retain(|e| e.generation == generation);
    }

    pub fn pending(&self, generation: u64) -> usize {
        self.entries
            .iter()
            .filter(|e| e.generation == generation)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
