//! Stimulus driver: feeds random volume samples to a set of displays for a
//! bounded time, then pauses them.

use alloc::rc::Rc;
use core::{cell::Cell, time::Duration};

use rand::{Rng, rngs::SmallRng};

use crate::{
    consts,
    countdown::{CountDown, CountDownEvent},
    error::DriverError,
    sampler::VolumeSampler,
    target::TargetSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub duration: Duration,
    pub interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            duration: consts::DEFAULT_DURATION,
            interval: consts::DEFAULT_INTERVAL,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.duration.is_zero() {
            return Err(DriverError::ZeroDuration);
        }
        if self.interval.is_zero() {
            return Err(DriverError::ZeroInterval);
        }
        if self.interval > self.duration {
            return Err(DriverError::IntervalExceedsDuration {
                interval_ms: self.interval.as_millis(),
                duration_ms: self.duration.as_millis(),
            });
        }
        if self.duration.as_nanos() / self.interval.as_nanos() > u128::from(u64::MAX) {
            return Err(DriverError::TooManyTicks {
                interval_ns: self.interval.as_nanos(),
                duration_ns: self.duration.as_nanos(),
            });
        }
        Ok(())
    }
}

/// Shared cancellation flag.
///
/// The owner of the displays keeps a clone and trips it on teardown; the
/// driver checks it before dispatching every event.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Stopped(StopReason),
}

impl DriverState {
    pub fn is_running(&self) -> bool {
        *self == DriverState::Running
    }
}

/// Drives every registered display with the same random sample on each tick
/// and pauses them all once the duration has elapsed.
///
/// Callers that tear down the displays before expiry must call
/// [`StimulusDriver::cancel`] (or trip the [`CancelToken`]) first.
pub struct StimulusDriver<R: Rng = SmallRng> {
    countdown: CountDown,
    sampler: VolumeSampler<R>,
    targets: TargetSet,
    cancel: CancelToken,
    state: DriverState,
    last_sample: Option<f32>,
}

impl<R: Rng> StimulusDriver<R> {
    pub fn start(
        config: DriverConfig,
        targets: TargetSet,
        sampler: VolumeSampler<R>,
    ) -> Result<Self, DriverError> {
        config.validate()?;
        if targets.is_empty() {
            return Err(DriverError::NoTargets);
        }

        log::info!(
            "stimulus started: {} displays, {}ms every {}ms",
            targets.len(),
            config.duration.as_millis(),
            config.interval.as_millis()
        );

        Ok(Self {
            countdown: CountDown::new(config.duration, config.interval),
            sampler,
            targets,
            cancel: CancelToken::new(),
            state: DriverState::Running,
            last_sample: None,
        })
    }

    /// Let `dt` pass and dispatch whatever became due.
    pub fn update(&mut self, dt: Duration) -> DriverState {
        if !self.state.is_running() {
            return self.state;
        }

        self.countdown.advance(dt);
        loop {
            if self.cancel.is_cancelled() {
                self.stop(StopReason::Cancelled);
                break;
            }
            let Some(event) = self.countdown.poll() else {
                break;
            };
            match event {
                CountDownEvent::Tick { remaining } => self.on_tick(remaining),
                CountDownEvent::Finish => {
                    self.on_finish();
                    break;
                }
            }
        }

        self.state
    }

    /// Stop without pausing the displays. Does nothing once stopped.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if self.state.is_running() {
            self.stop(StopReason::Cancelled);
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.countdown.ticks_fired()
    }

    pub fn total_ticks(&self) -> u64 {
        self.countdown.total_ticks()
    }

    pub fn remaining(&self) -> Duration {
        self.countdown.remaining()
    }

    pub fn last_sample(&self) -> Option<f32> {
        self.last_sample
    }

    fn on_tick(&mut self, remaining: Duration) {
        let sample = self.sampler.next_sample();
        self.last_sample = Some(sample);

        let reached = self.targets.for_each_live(|target| target.set_volume(sample));
        log::trace!(
            "tick: volume {sample} -> {reached} displays, {}ms left",
            remaining.as_millis()
        );
    }

    fn on_finish(&mut self) {
        self.targets.for_each_live(|target| target.pause());
        self.state = DriverState::Stopped(StopReason::Expired);
        log::info!("stimulus expired after {} ticks", self.ticks());
    }

    fn stop(&mut self, reason: StopReason) {
        self.state = DriverState::Stopped(reason);
        log::info!("stimulus stopped ({reason:?}) after {} ticks", self.ticks());
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use super::*;
    use crate::target::{
        VolumeTarget,
        tests::{Call, RecordingTarget},
    };

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn config(duration: u64, interval: u64) -> DriverConfig {
        DriverConfig {
            duration: ms(duration),
            interval: ms(interval),
        }
    }

    fn recorders(count: usize) -> (Vec<Rc<RefCell<RecordingTarget>>>, TargetSet) {
        let targets: Vec<_> = (0..count)
            .map(|_| Rc::new(RefCell::new(RecordingTarget::default())))
            .collect();
        let mut set = TargetSet::new();
        for target in &targets {
            set.push(target).unwrap();
        }
        (targets, set)
    }

    fn start(config: DriverConfig, set: TargetSet) -> StimulusDriver {
        StimulusDriver::start(config, set, VolumeSampler::seeded(consts::DEFAULT_SEED)).unwrap()
    }

    #[test]
    fn test_three_ticks_then_pause() {
        let (targets, set) = recorders(3);
        let mut driver = start(config(90, 30), set);

        assert_eq!(driver.update(ms(30)), DriverState::Running);
        assert_eq!(driver.update(ms(30)), DriverState::Running);
        // last tick lands exactly on the duration, the pause follows it in
        // the same update
        assert_eq!(
            driver.update(ms(30)),
            DriverState::Stopped(StopReason::Expired)
        );
        assert_eq!(driver.ticks(), 3);

        let set_volume_calls: usize = targets.iter().map(|t| t.borrow().volumes().len()).sum();
        let pause_calls: usize = targets.iter().map(|t| t.borrow().pauses()).sum();
        assert_eq!(set_volume_calls, 9);
        assert_eq!(pause_calls, 3);

        for target in &targets {
            assert_eq!(target.borrow().calls.last(), Some(&Call::Pause));
        }
    }

    #[test]
    fn test_all_targets_share_each_sample() {
        let (targets, set) = recorders(3);
        let mut driver = start(config(3_000, 30), set);
        while driver.update(ms(7)).is_running() {}

        let first = targets[0].borrow().volumes();
        assert_eq!(first.len(), 100);
        for target in &targets[1..] {
            assert_eq!(target.borrow().volumes(), first);
        }
        assert!(first.iter().all(|v| (40.0..=100.0).contains(v)));
        assert_eq!(driver.last_sample(), first.last().copied());
    }

    #[test]
    fn test_demo_settings_fire_2000_ticks() {
        let (targets, set) = recorders(1);
        let mut driver = start(DriverConfig::default(), set);
        while driver.update(ms(16)).is_running() {}

        assert_eq!(driver.ticks(), 2000);
        assert_eq!(driver.total_ticks(), 2000);
        assert_eq!(driver.state(), DriverState::Stopped(StopReason::Expired));
        let target = targets[0].borrow();
        assert_eq!(target.volumes().len(), 2000);
        assert_eq!(target.pauses(), 1);
    }

    #[test]
    fn test_cancel_suppresses_everything_after_it() {
        let (targets, set) = recorders(3);
        let mut driver = start(config(90, 30), set);

        driver.update(ms(30));
        driver.cancel();
        assert_eq!(driver.state(), DriverState::Stopped(StopReason::Cancelled));

        driver.update(ms(1_000));
        for target in &targets {
            assert_eq!(target.borrow().volumes().len(), 1);
            assert_eq!(target.borrow().pauses(), 0);
        }
    }

    #[test]
    fn test_cancel_token_takes_effect_at_next_update() {
        let (targets, set) = recorders(2);
        let mut driver = start(config(90, 30), set);
        let token = driver.cancel_token();

        token.cancel();
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(
            driver.update(ms(90)),
            DriverState::Stopped(StopReason::Cancelled)
        );
        for target in &targets {
            assert!(target.borrow().calls.is_empty());
        }
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (targets, set) = recorders(3);
        let mut driver = start(config(60, 30), set);
        while driver.update(ms(30)).is_running() {}
        assert_eq!(driver.state(), DriverState::Stopped(StopReason::Expired));

        driver.cancel();
        driver.cancel();
        driver.cancel_token().cancel();
        driver.update(ms(30));

        assert_eq!(driver.state(), DriverState::Stopped(StopReason::Expired));
        for target in &targets {
            assert_eq!(target.borrow().pauses(), 1);
        }
    }

    #[test]
    fn test_released_display_does_not_stop_the_others() {
        let (mut targets, set) = recorders(3);
        let mut driver = start(config(90, 30), set);

        driver.update(ms(30));
        targets.remove(1);
        while driver.update(ms(30)).is_running() {}

        for target in &targets {
            assert_eq!(target.borrow().volumes().len(), 3);
            assert_eq!(target.borrow().pauses(), 1);
        }
    }

    #[test]
    fn test_rejects_invalid_start() {
        let sampler = || VolumeSampler::seeded(1);

        let (_targets, set) = recorders(1);
        assert_eq!(
            StimulusDriver::start(config(0, 30), set, sampler()).err(),
            Some(DriverError::ZeroDuration)
        );

        let (_targets, set) = recorders(1);
        assert_eq!(
            StimulusDriver::start(config(90, 0), set, sampler()).err(),
            Some(DriverError::ZeroInterval)
        );

        let (_targets, set) = recorders(1);
        assert_eq!(
            StimulusDriver::start(config(20, 30), set, sampler()).err(),
            Some(DriverError::IntervalExceedsDuration {
                interval_ms: 30,
                duration_ms: 20
            })
        );

        assert_eq!(
            StimulusDriver::start(config(90, 30), TargetSet::new(), sampler()).err(),
            Some(DriverError::NoTargets)
        );
    }

    #[test]
    fn test_rejects_uncountable_tick_total() {
        let config = DriverConfig {
            duration: Duration::MAX,
            interval: Duration::from_nanos(1),
        };
        assert!(matches!(
            config.validate(),
            Err(DriverError::TooManyTicks { interval_ns: 1, .. })
        ));

        // anything past u32 ticks is still fine
        let long = DriverConfig {
            duration: ms(5_000_000_000),
            interval: ms(1),
        };
        assert_eq!(long.validate(), Ok(()));
    }

    #[test]
    fn test_cancel_from_a_display_stops_before_next_tick() {
        /// Trips the driver's token on the first sample it gets.
        #[derive(Default)]
        struct Canceller {
            token: Option<CancelToken>,
            volumes: usize,
            pauses: usize,
        }

        impl VolumeTarget for Canceller {
            fn set_volume(&mut self, _volume: f32) {
                self.volumes += 1;
                if let Some(token) = &self.token {
                    token.cancel();
                }
            }

            fn pause(&mut self) {
                self.pauses += 1;
            }
        }

        let canceller = Rc::new(RefCell::new(Canceller::default()));
        let recorder = Rc::new(RefCell::new(RecordingTarget::default()));
        let mut set = TargetSet::new();
        set.push(&canceller).unwrap();
        set.push(&recorder).unwrap();

        let mut driver = start(config(90, 30), set);
        canceller.borrow_mut().token = Some(driver.cancel_token());

        // three ticks and the finish are all due in this one update
        assert_eq!(
            driver.update(ms(90)),
            DriverState::Stopped(StopReason::Cancelled)
        );
        assert_eq!(driver.ticks(), 1);
        assert_eq!(canceller.borrow().volumes, 1);
        assert_eq!(canceller.borrow().pauses, 0);
        // the tick in flight still reaches every display
        assert_eq!(recorder.borrow().volumes().len(), 1);
        assert_eq!(recorder.borrow().pauses(), 0);
    }
}
