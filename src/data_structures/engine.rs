//! Per-frame animation units.

use log::{trace, warn};

use crate::{
    data_structures::transform::{TransformHandle, Transforms},
    error::SceneError,
};

/// Something that advances a transform every frame.
///
/// Engines never own what they animate. They address their target through a
/// handle into the scene's [`Transforms`] arena, which the scene lends out for
/// the duration of one update.
pub trait Engine {
    fn update(&mut self, dt: f32, transforms: &mut Transforms);

    fn target(&self) -> TransformHandle;
}

/// Spins a transform about the Z axis with a speed inversely proportional to
/// an orbital period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovePointer {
    target: TransformHandle,
    period: f32,
}

impl MovePointer {
    pub const DAYS_PER_YEAR: f32 = 365.0;
    const TIME_SCALE: f32 = 1000.0;

    pub fn new(target: TransformHandle, period_days: f32) -> Result<Self, SceneError> {
        if !period_days.is_finite() || period_days <= 0.0 {
            return Err(SceneError::InvalidPeriod(period_days));
        }
        Ok(Self {
            target,
            period: period_days / 10.0,
        })
    }

    pub fn yearly(target: TransformHandle) -> Self {
        Self {
            target,
            period: Self::DAYS_PER_YEAR / 10.0,
        }
    }

    /// Degrees the target turns for a frame of `dt` seconds.
    pub fn degrees_for(&self, dt: f32) -> f32 {
        dt * Self::TIME_SCALE / self.period
    }
}

impl Engine for MovePointer {
    fn update(&mut self, dt: f32, transforms: &mut Transforms) {
        let degrees = self.degrees_for(dt);
        match transforms.get_mut(self.target) {
            Some(transform) => {
                transform.rotate(degrees, 0.0, 0.0, 1.0);
                trace!("rotated {:?} by {degrees} degrees", self.target);
            }
            None => warn!("MovePointer target {:?} is not in the arena", self.target),
        }
    }

    fn target(&self) -> TransformHandle {
        self.target
    }
}
