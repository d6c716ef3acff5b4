// Copyright @yucwang 2026

use crate::core::phase::{PhaseFunction, PhaseFunctionSample};
use crate::math::constants::{Float, Vector2f, Vector3f, INV_FOUR_PI, PI};
use crate::math::frame::Frame;
use crate::math::warp::spherical_direction;

/// Henyey-Greenstein lobe. `g > 0` favours forward scattering, i.e. `wo`
/// close to the incoming travel direction `-wi`.
#[derive(Debug, Clone, Copy)]
pub struct HenyeyGreensteinPhaseFunction {
    g: Float,
}

impl HenyeyGreensteinPhaseFunction {
    pub fn new(g: Float) -> Self {
        Self { g: g.clamp(-0.999, 0.999) }
    }

    pub fn g(&self) -> Float {
        self.g
    }
}

/// Henyey-Greenstein density for the cosine between the travel direction
/// and the scattered direction.
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * denom.max(0.0).sqrt())
}

impl PhaseFunction for HenyeyGreensteinPhaseFunction {
    fn name(&self) -> &'static str {
        "hg"
    }

    fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        phase_hg(-wi.dot(wo), self.g)
    }

    fn sample(&self, wi: &Vector3f, u: &Vector2f) -> PhaseFunctionSample {
        let g = self.g;
        let cos_theta = if g.abs() < 1e-3 {
            1.0 - 2.0 * u.x
        } else {
            let sqr_term = (1.0 - g * g) / (1.0 + g - 2.0 * g * u.x);
            (1.0 + g * g - sqr_term * sqr_term) / (2.0 * g)
        };
        let cos_theta = cos_theta.clamp(-1.0, 1.0);

        // Lobe is centred on the travel direction.
        let frame = Frame::from_normal(&(-wi));
        let wo = frame.to_world(&spherical_direction(cos_theta, 2.0 * PI * u.y));
        let pdf = phase_hg(cos_theta, g);
        PhaseFunctionSample { wo, value: pdf, pdf }
    }
}
