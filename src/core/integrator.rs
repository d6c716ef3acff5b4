// Copyright @yucwang 2026

use crate::core::interaction::{MediumInteraction, SurfaceIntersection};
use crate::core::medium::Medium;
use crate::core::rng::LcgRng;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Outcome of walking one ray segment through a medium. Weights are already
/// divided by the sampling density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentEvent {
    /// Left the segment, either through the medium boundary or at the surface.
    Escaped { weight: RGBSpectrum },
    /// A real scattering event; the walk continues from `interaction`.
    Scattered { interaction: MediumInteraction, weight: RGBSpectrum },
    Terminated,
}

impl SegmentEvent {
    pub fn escaped_weight(&self) -> RGBSpectrum {
        match self {
            SegmentEvent::Escaped { weight } => *weight,
            _ => RGBSpectrum::zero(),
        }
    }
}

pub trait Integrator: Sync {
    fn name(&self) -> &'static str;

    fn trace_segment(&self,
                     medium: &dyn Medium,
                     ray: &Ray3f,
                     si: &SurfaceIntersection,
                     rng: &mut LcgRng) -> SegmentEvent;

    /// Monte Carlo transmittance along `ray` up to `si`. Weights are summed
    /// in `f64` so long runs do not drift.
    fn estimate_transmittance(&self,
                              medium: &dyn Medium,
                              ray: &Ray3f,
                              si: &SurfaceIntersection,
                              samples: u32,
                              rng: &mut LcgRng) -> RGBSpectrum {
        if samples == 0 {
            return RGBSpectrum::zero();
        }
        let mut sum = [0.0f64; 3];
        for _ in 0..samples {
            let weight = self.trace_segment(medium, ray, si, rng).escaped_weight();
            for c in 0..3 {
                sum[c] += weight[c] as f64;
            }
        }
        let n = samples as f64;
        RGBSpectrum::new((sum[0] / n) as Float, (sum[1] / n) as Float, (sum[2] / n) as Float)
    }
}
