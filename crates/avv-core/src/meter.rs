//! Level model behind a volume display.
//!
//! A `LevelMeter` turns the raw volumes it receives into a normalized level
//! in `[0, 1]` that rises towards the latest volume and decays back to zero
//! frame by frame. Drawing is left to the host.

use heapless::Deque;

use crate::{consts, target::VolumeTarget};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterConfig {
    /// Volumes at or below this are ignored (noise floor).
    pub min_volume: f32,
    /// Volumes above this count as full scale.
    pub max_volume: f32,
    /// Frames from empty to full scale.
    pub rise_steps: u32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            min_volume: consts::METER_MIN_VOLUME,
            max_volume: consts::METER_MAX_VOLUME,
            rise_steps: consts::METER_RISE_STEPS,
        }
    }
}

pub struct LevelMeter {
    config: MeterConfig,
    level: f32,
    target_level: f32,
    rising: bool,
    paused: bool,
    history: Deque<f32, { consts::METER_HISTORY_LEN }>,
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new(MeterConfig::default())
    }
}

impl LevelMeter {
    pub fn new(config: MeterConfig) -> Self {
        Self {
            config,
            level: 0.0,
            target_level: 0.0,
            rising: false,
            paused: false,
            history: Deque::new(),
        }
    }

    /// Advance the animation by one frame. Frozen while paused.
    pub fn step(&mut self) {
        if self.paused {
            return;
        }

        let step = 1.0 / self.config.rise_steps.max(1) as f32;
        if self.rising && self.level < self.target_level {
            self.level = (self.level + step).min(1.0);
        } else {
            self.rising = false;
            if self.level < step {
                self.level -= step / 2.0;
            } else {
                self.level -= step;
            }
            self.level = self.level.max(0.0);
        }

        if self.history.is_full() {
            self.history.pop_front();
        }
        // room was made above
        self.history.push_back(self.level).ok();
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn target_level(&self) -> f32 {
        self.target_level
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Past levels, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }
}

impl VolumeTarget for LevelMeter {
    fn set_volume(&mut self, volume: f32) {
        let MeterConfig {
            min_volume,
            max_volume,
            ..
        } = self.config;
        if volume <= min_volume {
            return;
        }

        let span = (max_volume - min_volume).max(f32::EPSILON);
        self.target_level = ((volume.min(max_volume) - min_volume) / span).clamp(0.0, 1.0);
        self.rising = true;
    }

    fn pause(&mut self) {
        self.paused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_noise_floor_is_ignored() {
        let mut meter = LevelMeter::default();
        meter.set_volume(45.0);
        meter.set_volume(12.0);
        assert_eq!(meter.target_level(), 0.0);
    }

    #[test]
    fn test_target_level_is_normalized_and_clamped() {
        let mut meter = LevelMeter::default();
        meter.set_volume(65.0);
        assert!(close(meter.target_level(), 0.5));

        meter.set_volume(100.0);
        assert!(close(meter.target_level(), 1.0));
    }

    #[test]
    fn test_rises_to_full_scale_in_rise_steps() {
        let mut meter = LevelMeter::default();
        meter.set_volume(85.0);
        for _ in 0..consts::METER_RISE_STEPS {
            meter.step();
        }
        assert!(close(meter.level(), 1.0));

        // target reached, so it starts falling again
        meter.step();
        meter.step();
        assert!(meter.level() < 1.0);
    }

    #[test]
    fn test_decays_to_zero() {
        let mut meter = LevelMeter::default();
        meter.set_volume(70.0);
        for _ in 0..100 {
            meter.step();
        }
        assert_eq!(meter.level(), 0.0);
    }

    #[test]
    fn test_pause_freezes_level() {
        let mut meter = LevelMeter::default();
        meter.set_volume(85.0);
        for _ in 0..5 {
            meter.step();
        }
        let frozen = meter.level();
        let frames = meter.history().count();

        meter.pause();
        for _ in 0..10 {
            meter.step();
        }

        assert!(meter.is_paused());
        assert_eq!(meter.level(), frozen);
        assert_eq!(meter.history().count(), frames);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut meter = LevelMeter::default();
        for _ in 0..(consts::METER_HISTORY_LEN + 10) {
            meter.step();
        }
        assert_eq!(meter.history().count(), consts::METER_HISTORY_LEN);
        assert_eq!(meter.history().last(), Some(meter.level()));
    }
}
