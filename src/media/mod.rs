// Copyright @yucwang 2026

pub mod heterogeneous_medium;
pub mod homogeneous_medium;

use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

fn clamp_spectrum(value: RGBSpectrum) -> RGBSpectrum {
    value.map(|c| c.clamp(0.0, 1.0))
}

/// Overlap with an optional box; media without one fill all of space.
fn intersect_bounds(bbox: &Option<AABB>, ray: &Ray3f) -> (bool, Float, Float) {
    match bbox {
        Some(bbox) => match bbox.ray_intersect_range(ray) {
            Some((t0, t1)) => (true, t0, t1),
            None => (false, 0.0, std::f32::INFINITY),
        },
        None => (true, ray.min_t, ray.max_t),
    }
}
