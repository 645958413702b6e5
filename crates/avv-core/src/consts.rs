use core::time::Duration;

/// Total run time of the demo stimulus.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(60 * 1000);
/// Time between two volume samples.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

/// Lowest sample the driver can produce.
pub const VOLUME_FLOOR: f32 = 40.0;
/// Samples are `VOLUME_FLOOR + 0..=VOLUME_SPREAD`.
pub const VOLUME_SPREAD: u32 = 60;

pub const DEFAULT_SEED: u64 = 2137;

/// Capacity of a `TargetSet`.
pub const MAX_TARGETS: usize = 8;

/// Volumes at or below this leave a meter untouched.
pub const METER_MIN_VOLUME: f32 = 45.0;
/// Volumes above this are clamped.
pub const METER_MAX_VOLUME: f32 = 85.0;
/// Frames a meter needs to rise from empty to full scale.
pub const METER_RISE_STEPS: u32 = 15;
/// Number of past levels a meter keeps for scrolling display.
pub const METER_HISTORY_LEN: usize = 128;
