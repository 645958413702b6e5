use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("duration must be greater than zero")]
    ZeroDuration,
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("interval ({interval_ms}ms) exceeds duration ({duration_ms}ms), no tick would fire")]
    IntervalExceedsDuration { interval_ms: u128, duration_ms: u128 },
    #[error("{duration_ns}ns every {interval_ns}ns is more ticks than can be counted")]
    TooManyTicks { interval_ns: u128, duration_ns: u128 },
    #[error("at least one display target is required")]
    NoTargets,
    #[error("target set is full ({capacity} targets)")]
    TooManyTargets { capacity: usize },
}
