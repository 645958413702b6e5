use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::consts;

/// Produces the synthetic volume values fed to the displays.
///
/// The random source is owned by the sampler and passed in by the caller, so
/// a fixed seed gives a reproducible sequence.
pub struct VolumeSampler<R: Rng = SmallRng> {
    rng: R,
}

impl VolumeSampler<SmallRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> VolumeSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One sample in `[VOLUME_FLOOR, VOLUME_FLOOR + VOLUME_SPREAD]`.
    pub fn next_sample(&mut self) -> f32 {
        let offset = self.rng.random_range(0..=consts::VOLUME_SPREAD);
        consts::VOLUME_FLOOR + offset as f32
    }
}
