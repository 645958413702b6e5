#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod consts;
pub mod countdown;
pub mod driver;
pub mod error;
pub mod log_buffer;
pub mod meter;
pub mod sampler;
pub mod target;

pub use driver::{CancelToken, DriverConfig, DriverState, StimulusDriver, StopReason};
pub use error::DriverError;
pub use meter::{LevelMeter, MeterConfig};
pub use sampler::VolumeSampler;
pub use target::{TargetSet, VolumeTarget};
