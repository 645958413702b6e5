use std::time::Duration;

use anyhow::Context as _;
use avv_core::{DriverConfig, consts};
use clap::Parser;
use log::LevelFilter;

/// Drive three volume meters with random samples for a fixed time.
#[derive(Debug, Clone, Parser)]
#[command(name = "avv-desktop", version)]
pub struct Args {
    /// Total run time of the stimulus, in milliseconds
    #[arg(long, default_value_t = consts::DEFAULT_DURATION.as_millis() as u64)]
    pub duration_ms: u64,

    /// Time between two samples, in milliseconds
    #[arg(long, default_value_t = consts::DEFAULT_INTERVAL.as_millis() as u64)]
    pub interval_ms: u64,

    /// Seed of the sample generator
    #[arg(long, default_value_t = consts::DEFAULT_SEED)]
    pub seed: u64,

    /// Frame period of the host loop, in milliseconds
    #[arg(long, default_value_t = 16)]
    pub frame_ms: u64,

    /// Run without a terminal UI, logging to stderr
    #[arg(long)]
    pub headless: bool,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        let config = DriverConfig {
            duration: Duration::from_millis(self.duration_ms),
            interval: Duration::from_millis(self.interval_ms),
        };
        config.validate().context("invalid stimulus timing")?;
        Ok(config)
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}
