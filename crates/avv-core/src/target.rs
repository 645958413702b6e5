use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use heapless::Vec;

use crate::{consts, error::DriverError};

/// Platform-agnostic volume display.
///
/// Implementations decide how to interpret the value; the driver sends raw
/// samples and never clamps them.
pub trait VolumeTarget {
    fn set_volume(&mut self, volume: f32);
    fn pause(&mut self);
}

/// Ordered set of displays the driver pushes samples to.
///
/// Holds weak handles only: the screen that created the displays owns them
/// and the driver just references them. A display that was dropped or is
/// borrowed elsewhere is skipped rather than touched.
///
/// Skipping a borrowed display means it misses that sample while the others
/// get it. Displays are only borrowed outside a driver update unless a
/// caller re-enters the driver from a display, which is a misuse; the skip
/// keeps such a caller from panicking and is reported with a warning.
#[derive(Default)]
pub struct TargetSet {
    targets: Vec<Weak<RefCell<dyn VolumeTarget>>, { consts::MAX_TARGETS }>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T>(&mut self, target: &Rc<RefCell<T>>) -> Result<(), DriverError>
    where
        T: VolumeTarget + 'static,
    {
        let handle = Rc::downgrade(target);
        self.targets
            .push(handle as Weak<RefCell<dyn VolumeTarget>>)
            .map_err(|_| DriverError::TooManyTargets {
                capacity: consts::MAX_TARGETS,
            })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of targets whose owner still keeps them alive.
    pub fn live_count(&self) -> usize {
        self.targets.iter().filter(|t| t.strong_count() > 0).count()
    }

    /// Visit every reachable target in registration order, returning how
    /// many were visited.
    pub fn for_each_live<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&mut dyn VolumeTarget),
    {
        let mut reached = 0;
        for (index, handle) in self.targets.iter().enumerate() {
            let Some(cell) = handle.upgrade() else {
                log::warn!("display #{index} was released, skipping");
                continue;
            };
            let Ok(mut target) = cell.try_borrow_mut() else {
                log::warn!("display #{index} is busy, skipping");
                continue;
            };
            f(&mut *target);
            reached += 1;
        }
        reached
    }
}
