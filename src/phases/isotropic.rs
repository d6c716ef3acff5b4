// Copyright @yucwang 2026

use crate::core::phase::{PhaseFunction, PhaseFunctionSample};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::warp::{sample_uniform_sphere, sample_uniform_sphere_pdf};

#[derive(Debug, Default, Clone, Copy)]
pub struct IsotropicPhaseFunction;

impl IsotropicPhaseFunction {
    pub fn new() -> Self {
        Self
    }
}

impl PhaseFunction for IsotropicPhaseFunction {
    fn name(&self) -> &'static str {
        "isotropic"
    }

    fn eval(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        sample_uniform_sphere_pdf()
    }

    fn sample(&self, _wi: &Vector3f, u: &Vector2f) -> PhaseFunctionSample {
        let pdf = sample_uniform_sphere_pdf();
        PhaseFunctionSample { wo: sample_uniform_sphere(u), value: pdf, pdf }
    }
}
