//! Bounded periodic timer driven by the host loop.
//!
//! `CountDown` never sleeps or spawns anything: the host advances it with the
//! time that passed since the last frame and then drains due events with
//! [`CountDown::poll`]. Ticks fire at every multiple of the interval up to and
//! including the total duration, followed by a single `Finish`.

use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDownEvent {
    Tick { remaining: Duration },
    Finish,
}

#[derive(Debug, Clone)]
pub struct CountDown {
    duration: Duration,
    interval: Duration,
    elapsed: Duration,
    ticks_fired: u64,
    total_ticks: u64,
    finished: bool,
}

impl CountDown {
    /// The tick count saturates at `u64::MAX`; `DriverConfig::validate`
    /// rejects timings that would get there.
    pub fn new(duration: Duration, interval: Duration) -> Self {
        let total_ticks = if interval.is_zero() {
            0
        } else {
            u64::try_from(duration.as_nanos() / interval.as_nanos()).unwrap_or(u64::MAX)
        };

        Self {
            duration,
            interval,
            elapsed: Duration::ZERO,
            ticks_fired: 0,
            total_ticks,
            finished: false,
        }
    }

    /// Move the clock forward. Events become visible through `poll`.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Next due event, oldest first. `None` once nothing is due yet or the
    /// countdown already finished.
    pub fn poll(&mut self) -> Option<CountDownEvent> {
        if self.finished {
            return None;
        }

        if self.ticks_fired < self.total_ticks {
            // due <= duration while ticks are left, so neither side overflows
            let due = self.interval.as_nanos() * u128::from(self.ticks_fired + 1);
            if due > self.elapsed.as_nanos() {
                return None;
            }
            self.ticks_fired += 1;
            return Some(CountDownEvent::Tick {
                remaining: nanos_to_duration(self.duration.as_nanos() - due),
            });
        }

        if self.elapsed >= self.duration {
            self.finished = true;
            return Some(CountDownEvent::Finish);
        }

        None
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.min(self.duration)
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    Duration::new(
        (nanos / NANOS_PER_SEC) as u64,
        (nanos % NANOS_PER_SEC) as u32,
    )
}
