use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::TICK_RATE_MS;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum BrickEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait BrickEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<BrickEvent, RecvTimeoutError>;
}

/// Production event source reading crossterm events on a helper thread
pub struct CrosstermEventSource {
    rx: Receiver<BrickEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // key release/repeat events would double every keystroke on some platforms
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(BrickEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => Some(BrickEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    log::error!("terminal input failed: {}", e);
                    break;
                }
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BrickEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BrickEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<BrickEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<BrickEvent>) -> Self {
        Self { rx }
    }
}

impl BrickEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BrickEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks are paced against a deadline so a steady stream of keystrokes
/// cannot starve the game clock.
pub struct Runner<E: BrickEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: std::cell::Cell<Instant>,
}

impl<E: BrickEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick: std::cell::Cell::new(next_tick),
        }
    }

    /// Blocks until the next tick is due and returns the next event, or Tick
    pub fn step(&self) -> BrickEvent {
        let now = Instant::now();
        let deadline = self.next_tick.get();
        if now >= deadline {
            self.next_tick.set(now + self.ticker.interval());
            return BrickEvent::Tick;
        }
        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                self.next_tick.set(Instant::now() + self.ticker.interval());
                BrickEvent::Tick
            }
        }
    }

    /// Like `step`, paired with the instant the event was handed over
    pub fn step_timed(&self) -> (BrickEvent, Instant) {
        let event = self.step();
        (event, Instant::now())
    }
}
