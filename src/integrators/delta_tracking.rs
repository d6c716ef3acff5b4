// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::integrator::{Integrator, SegmentEvent};
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::{ChannelMode, Medium};
use crate::core::rng::LcgRng;
use crate::math::ray::Ray3f;
use crate::math::spectrum::{RGBSpectrum, CHANNEL_COUNT};

/// Delta tracking with null collisions and one-sample spectral MIS.
///
/// Each walk picks a hero channel whose majorant drives distance sampling
/// and whose classifier probability picks the event. Alongside the
/// throughput `beta = f / p` the walk keeps every channel's path density
/// `p`, and the returned weight is `beta * p / mean(p)`.
pub struct DeltaTrackingIntegrator {
    pub max_null_collisions: u32,
}

impl Default for DeltaTrackingIntegrator {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl DeltaTrackingIntegrator {
    pub fn new(max_null_collisions: u32) -> Self {
        Self { max_null_collisions }
    }
}

fn mis_weight(beta: &RGBSpectrum, pdf: &RGBSpectrum) -> Option<RGBSpectrum> {
    let mean = pdf.mean();
    if mean > 0.0 && mean.is_finite() {
        Some(*beta * (*pdf / mean))
    } else {
        None
    }
}

impl Integrator for DeltaTrackingIntegrator {
    fn name(&self) -> &'static str {
        "delta_tracking"
    }

    fn trace_segment(&self,
                     medium: &dyn Medium,
                     ray: &Ray3f,
                     si: &SurfaceIntersection,
                     rng: &mut LcgRng) -> SegmentEvent {
        // In spectral mode every channel is sampled with the majorant of
        // channel 0, so all densities collapse onto it.
        let hero_only = medium.config().channel_mode == ChannelMode::Spectral;
        let hero = if hero_only { 0 } else { rng.next_index(CHANNEL_COUNT) };
        let technique = |s: RGBSpectrum| if hero_only { RGBSpectrum::splat(s[0]) } else { s };

        let mut beta = RGBSpectrum::one();
        let mut pdf = RGBSpectrum::one();
        let mut ray = *ray;
        let mut null_collisions = 0u32;

        loop {
            let mi = medium.sample_interaction(&ray, rng.next_f32(), hero as u32, true);
            if !mi.is_active() {
                return match mis_weight(&beta, &pdf) {
                    Some(weight) => SegmentEvent::Escaped { weight },
                    None => SegmentEvent::Terminated,
                };
            }

            let (tr, free_flight_pdf) = medium.transmittance_eval_pdf(&mi, si, true);
            let free_flight_pdf = technique(free_flight_pdf);
            beta *= tr.safe_div(&free_flight_pdf);
            pdf *= free_flight_pdf;

            let collided = mi.is_valid() && mi.t <= si.t();
            if !collided {
                return match mis_weight(&beta, &pdf) {
                    Some(weight) => SegmentEvent::Escaped { weight },
                    None => SegmentEvent::Terminated,
                };
            }

            let mis_beta = match mis_weight(&beta, &pdf) {
                Some(weight) => weight,
                None => return SegmentEvent::Terminated,
            };
            let radiance = medium.get_radiance(&mi, true);
            let probs = medium.get_interaction_probabilities(&radiance, &mi, &mis_beta);

            let prob_scatter = probs.prob_scatter[hero];
            let prob_null = probs.prob_null[hero];
            if prob_scatter + prob_null <= 0.0 {
                return SegmentEvent::Terminated;
            }

            if rng.next_f32() < prob_scatter {
                let weight_scatter = if hero_only {
                    mi.sigma_s / prob_scatter
                } else {
                    probs.weight_scatter
                };
                beta *= weight_scatter;
                pdf *= technique(probs.prob_scatter);
                return match mis_weight(&beta, &pdf) {
                    Some(weight) if !weight.is_black() => SegmentEvent::Scattered { interaction: mi, weight },
                    _ => SegmentEvent::Terminated,
                };
            }

            let weight_null = if hero_only {
                mi.sigma_n / prob_null
            } else {
                probs.weight_null
            };
            beta *= weight_null;
            pdf *= technique(probs.prob_null);
            if beta.is_black() {
                return SegmentEvent::Terminated;
            }

            // Keep the densities in range over long walks; only their ratios matter.
            let mean = pdf.mean();
            if mean > 0.0 {
                pdf = pdf / mean;
            }

            null_collisions += 1;
            if null_collisions > self.max_null_collisions {
                log::debug!("DeltaTracking: {} exceeded {} null collisions, terminating walk.",
                            medium.id(), self.max_null_collisions);
                return SegmentEvent::Terminated;
            }

            ray = ray.advanced_to(mi.t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emitter::Emitter;
    use crate::core::medium::{MediumConfig, MediumEventSamplingMode};
    use crate::emitters::volume_light::VolumeLight;
    use crate::math::aabb::AABB;
    use crate::math::constants::{Float, Vector3f};
    use crate::media::heterogeneous_medium::HeterogeneousMedium;
    use crate::media::homogeneous_medium::HomogeneousMedium;
    use crate::volumes::const_volume::ConstantVolume;
    use crate::volumes::gradient_volume::GradientVolume;
    use crate::volumes::Axis;
    use std::sync::Arc;

    fn slab() -> AABB {
        AABB::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(4.0, 1.0, 1.0))
    }

    fn ray() -> Ray3f {
        Ray3f::new(Vector3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None)
    }

    fn ramp(start: RGBSpectrum, end: RGBSpectrum, mode: MediumEventSamplingMode) -> HeterogeneousMedium {
        HeterogeneousMedium::new(Arc::new(GradientVolume::new_rgb(slab(), Axis::X, start, end)),
                                 Arc::new(ConstantVolume::new_scalar(0.8)),
                                 MediumConfig::default().with_sampling_mode(mode))
    }

    fn assert_close(estimate: RGBSpectrum, expected: RGBSpectrum, tolerance: Float) {
        for c in 0..3 {
            assert!((estimate[c] - expected[c]).abs() < tolerance,
                    "channel {}: estimate {:?}, expected {:?}", c, estimate, expected);
        }
    }

    #[test]
    fn test_grey_ramp_transmittance() {
        // Integral of 0.2 + 0.2x over [0, 4] is 2.4.
        let expected = RGBSpectrum::splat((-2.4 as Float).exp());
        let integrator = DeltaTrackingIntegrator::default();
        for mode in [MediumEventSamplingMode::Analogue,
                     MediumEventSamplingMode::Maximum,
                     MediumEventSamplingMode::Mean].iter() {
            let medium = ramp(RGBSpectrum::splat(0.2), RGBSpectrum::splat(1.0), *mode);
            let mut rng = LcgRng::new(42);
            let estimate = integrator.estimate_transmittance(&medium, &ray(), &SurfaceIntersection::none(),
                                                             20000, &mut rng);
            assert_close(estimate, expected, 0.01);
        }
    }

    #[test]
    fn test_chromatic_ramp_transmittance() {
        let start = RGBSpectrum::new(0.2, 0.15, 0.25);
        let end = RGBSpectrum::new(1.0, 0.8, 0.6);
        // Integral of a linear ramp over a length of 4 is 2 * (start + end).
        let expected = ((start + end) * -2.0).exp();
        let integrator = DeltaTrackingIntegrator::default();
        for mode in [MediumEventSamplingMode::Analogue,
                     MediumEventSamplingMode::Maximum,
                     MediumEventSamplingMode::Mean].iter() {
            let medium = ramp(start, end, *mode);
            let mut rng = LcgRng::new(7);
            let estimate = integrator.estimate_transmittance(&medium, &ray(), &SurfaceIntersection::none(),
                                                             40000, &mut rng);
            assert_close(estimate, expected, 0.02);
        }
    }

    #[test]
    fn test_emissive_ramp_transmittance() {
        // Emission only shifts the null-collision probabilities, so the
        // transmittance is the one of the non-emissive ramp.
        let start = RGBSpectrum::new(0.2, 0.15, 0.25);
        let end = RGBSpectrum::new(1.0, 0.8, 0.6);
        let expected = ((start + end) * -2.0).exp();
        let light: Arc<dyn Emitter> = Arc::new(VolumeLight::new(
            Arc::new(ConstantVolume::new_rgb(RGBSpectrum::new(2.0, 1.0, 0.5)))));
        let integrator = DeltaTrackingIntegrator::default();
        for mode in [MediumEventSamplingMode::Analogue,
                     MediumEventSamplingMode::Maximum,
                     MediumEventSamplingMode::Mean].iter() {
            let medium = ramp(start, end, *mode).with_emitter(&light);
            assert!(medium.is_emitter());
            let mi = medium.sample_interaction(&ray(), 0.5, 0, true);
            assert_eq!(medium.get_radiance(&mi, true), RGBSpectrum::new(2.0, 1.0, 0.5));

            let mut rng = LcgRng::new(19);
            let estimate = integrator.estimate_transmittance(&medium, &ray(), &SurfaceIntersection::none(),
                                                             40000, &mut rng);
            assert_close(estimate, expected, 0.02);
        }
    }

    #[test]
    fn test_chromatic_homogeneous_transmittance() {
        let sigma = RGBSpectrum::new(0.5, 1.0, 2.0);
        let bbox = AABB::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 1.0, 1.0));
        let medium = HomogeneousMedium::new(sigma, RGBSpectrum::splat(0.5), MediumConfig::default())
            .with_bbox(Some(bbox));
        let r = Ray3f::new(Vector3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let mut rng = LcgRng::new(3);
        let estimate = DeltaTrackingIntegrator::default()
            .estimate_transmittance(&medium, &r, &SurfaceIntersection::none(), 20000, &mut rng);
        assert_close(estimate, (-sigma).exp(), 0.025);
    }

    #[test]
    fn test_spectral_mode_uses_channel_zero() {
        let sigma = RGBSpectrum::new(1.0, 0.5, 1.5);
        let bbox = AABB::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 1.0, 1.0));
        let config = MediumConfig::default().with_channel_mode(ChannelMode::Spectral);
        let medium = HomogeneousMedium::new(sigma, RGBSpectrum::splat(0.5), config).with_bbox(Some(bbox));
        let r = Ray3f::new(Vector3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let mut rng = LcgRng::new(11);
        let estimate = DeltaTrackingIntegrator::default()
            .estimate_transmittance(&medium, &r, &SurfaceIntersection::none(), 20000, &mut rng);
        assert_close(estimate, (-sigma).exp(), 0.025);
    }

    #[test]
    fn test_surface_ends_segment() {
        let medium = ramp(RGBSpectrum::splat(0.2), RGBSpectrum::splat(1.0), MediumEventSamplingMode::Analogue);
        // Surface at x = 2: the optical depth of [0, 2] is 0.8.
        let si = SurfaceIntersection::new(3.0);
        let mut rng = LcgRng::new(5);
        let estimate = DeltaTrackingIntegrator::default()
            .estimate_transmittance(&medium, &ray(), &si, 20000, &mut rng);
        assert_close(estimate, RGBSpectrum::splat((-0.8 as Float).exp()), 0.015);
    }

    #[test]
    fn test_scatter_weight_is_albedo() {
        let medium = HomogeneousMedium::new(RGBSpectrum::one(), RGBSpectrum::splat(0.5), MediumConfig::default());
        let r = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let mut rng = LcgRng::new(1);
        for _ in 0..20 {
            match DeltaTrackingIntegrator::default().trace_segment(&medium, &r, &SurfaceIntersection::none(), &mut rng) {
                SegmentEvent::Scattered { interaction, weight } => {
                    assert!(interaction.is_valid());
                    assert_close(weight, RGBSpectrum::splat(0.5), 1e-5);
                }
                other => panic!("unbounded medium must scatter, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_null_collision_budget() {
        // Zero density along y = 0 with a unit majorant: every collision is null.
        let volume = GradientVolume::new_scalar(slab(), Axis::Y, 0.0, 1.0);
        let medium = HeterogeneousMedium::new(Arc::new(volume),
                                              Arc::new(ConstantVolume::new_scalar(1.0)),
                                              MediumConfig::default());
        let r = Ray3f::new(Vector3f::new(-1.0, 0.0, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let si = SurfaceIntersection::none();

        let mut rng = LcgRng::new(9);
        let estimate = DeltaTrackingIntegrator::default().estimate_transmittance(&medium, &r, &si, 200, &mut rng);
        assert_close(estimate, RGBSpectrum::one(), 1e-4);

        let strict = DeltaTrackingIntegrator::new(0);
        let terminated = (0..100)
            .filter(|_| strict.trace_segment(&medium, &r, &si, &mut rng) == SegmentEvent::Terminated)
            .count();
        assert!(terminated >= 90, "terminated {}", terminated);
    }

    #[test]
    fn test_missed_medium_escapes_untouched() {
        let medium = ramp(RGBSpectrum::splat(0.2), RGBSpectrum::splat(1.0), MediumEventSamplingMode::Mean);
        let r = Ray3f::new(Vector3f::new(-1.0, 5.0, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let mut rng = LcgRng::new(2);
        let event = DeltaTrackingIntegrator::default().trace_segment(&medium, &r, &SurfaceIntersection::none(), &mut rng);
        assert_eq!(event, SegmentEvent::Escaped { weight: RGBSpectrum::one() });
    }
}
