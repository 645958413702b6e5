use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use avv_core::{
    DriverConfig, DriverState, LevelMeter, StimulusDriver, TargetSet, VolumeSampler,
};

pub const METER_COUNT: usize = 3;

/// The demo screen: owns the meters and the driver feeding them.
///
/// The driver is started when the screen is activated and cancelled when the
/// screen goes away, so no sample ever reaches a meter after teardown.
pub struct MeterScreen {
    meters: Vec<Rc<RefCell<LevelMeter>>>,
    driver: StimulusDriver,
    last_frame: Instant,
}

impl MeterScreen {
    pub fn activate(config: DriverConfig, seed: u64) -> anyhow::Result<Self> {
        let meters: Vec<_> = (0..METER_COUNT)
            .map(|_| Rc::new(RefCell::new(LevelMeter::default())))
            .collect();

        let mut targets = TargetSet::new();
        for meter in &meters {
            targets.push(meter)?;
        }

        let driver = StimulusDriver::start(config, targets, VolumeSampler::seeded(seed))?;

        Ok(Self {
            meters,
            driver,
            last_frame: Instant::now(),
        })
    }

    /// Run one frame using wall-clock time since the previous frame.
    pub fn frame(&mut self) -> DriverState {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(dt)
    }

    /// Run one frame as if `dt` had passed.
    pub fn advance(&mut self, dt: Duration) -> DriverState {
        let state = self.driver.update(dt);
        for meter in &self.meters {
            meter.borrow_mut().step();
        }
        state
    }

    pub fn cancel(&mut self) {
        self.driver.cancel();
    }

    pub fn driver(&self) -> &StimulusDriver {
        &self.driver
    }

    pub fn meters(&self) -> impl Iterator<Item = Ref<'_, LevelMeter>> {
        self.meters.iter().map(|m| m.borrow())
    }
}

impl Drop for MeterScreen {
    fn drop(&mut self) {
        self.driver.cancel();
    }
}
