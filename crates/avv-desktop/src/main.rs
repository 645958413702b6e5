use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::Parser;

use crate::config::Args;
use crate::screen::MeterScreen;

mod config;
mod log_capture;
mod screen;
mod tui;

const PROGRESS_EVERY: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log_capture::init(args.log_level, args.headless);

    let config = args.driver_config()?;
    let mut screen = MeterScreen::activate(config, args.seed).context("failed to start the meter screen")?;

    if args.headless {
        run_headless(&mut screen, args.frame_period());
    } else {
        tui::run(&mut screen, args.frame_period()).context("terminal UI failed")?;
    }

    // teardown: nothing may reach the meters once the screen is gone
    screen.cancel();
    Ok(())
}

fn run_headless(screen: &mut MeterScreen, frame_period: Duration) {
    let mut last_report = Instant::now();

    while screen.frame().is_running() {
        if last_report.elapsed() >= PROGRESS_EVERY {
            let driver = screen.driver();
            log::info!(
                "{} ticks, {}ms left",
                driver.ticks(),
                driver.remaining().as_millis()
            );
            last_report = Instant::now();
        }
        thread::sleep(frame_period);
    }

    for (i, meter) in screen.meters().enumerate() {
        log::info!(
            "meter {}: level {:.2}, paused {}",
            i + 1,
            meter.level(),
            meter.is_paused()
        );
    }
}
