// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFunctionSample {
    pub wo: Vector3f,
    pub value: Float,
    pub pdf: Float,
}

/// Angular scattering distribution of a medium. Directions point away from
/// the scattering location, so `wi` is the reversed incoming ray direction.
pub trait PhaseFunction: Send + Sync {
    fn name(&self) -> &'static str;
    fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Float;
    fn sample(&self, wi: &Vector3f, u: &Vector2f) -> PhaseFunctionSample;

    fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        self.eval(wi, wo)
    }
}
