// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f, INFINITY };
use crate::math::spectrum::UnpolarizedSpectrum;

/// Candidate or realized collision inside a medium, produced by
/// `Medium::sample_interaction` for a single lane.
///
/// `active` tells whether the lane overlaps the medium at all; `valid` tells
/// whether a collision was sampled inside `[mint, maxt]`. An active but
/// invalid interaction means the ray leaves the segment without colliding.
/// Coefficients are only populated for valid interactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediumInteraction {
    pub t: Float,
    pub p: Vector3f,
    /// Direction pointing back along the ray.
    pub wi: Vector3f,
    pub mint: Float,
    pub maxt: Float,
    pub sigma_s: UnpolarizedSpectrum,
    pub sigma_n: UnpolarizedSpectrum,
    pub sigma_t: UnpolarizedSpectrum,
    /// Majorant the distance was sampled with.
    pub combined_extinction: UnpolarizedSpectrum,
    pub active: bool,
    pub valid: bool,
}

impl MediumInteraction {
    /// Result for a lane that does not take part in the query.
    pub fn inactive() -> Self {
        Self {
            t: INFINITY,
            p: Vector3f::zeros(),
            wi: Vector3f::zeros(),
            mint: 0.0,
            maxt: INFINITY,
            sigma_s: UnpolarizedSpectrum::zero(),
            sigma_n: UnpolarizedSpectrum::zero(),
            sigma_t: UnpolarizedSpectrum::zero(),
            combined_extinction: UnpolarizedSpectrum::zero(),
            active: false,
            valid: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_valid(&self) -> bool {
        self.active && self.valid
    }
}

/// The part of a surface hit the medium code needs: where along the ray the
/// surface was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceIntersection {
    t: Float,
}

impl SurfaceIntersection {
    pub fn new(t: Float) -> Self {
        Self { t }
    }

    /// No surface along the ray.
    pub fn none() -> Self {
        Self { t: INFINITY }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_interaction() {
        let mi = MediumInteraction::inactive();
        assert!(!mi.is_active());
        assert!(!mi.is_valid());
        assert!(mi.sigma_t.is_black());
        assert!(mi.t.is_infinite());
    }

    #[test]
    fn test_valid_requires_active() {
        let mut mi = MediumInteraction::inactive();
        mi.valid = true;
        assert!(!mi.is_valid());
        mi.active = true;
        assert!(mi.is_valid());
    }

    #[test]
    fn test_surface_intersection() {
        let si = SurfaceIntersection::new(2.0);
        assert!(si.is_valid());
        assert_eq!(si.t(), 2.0);
        assert!(!SurfaceIntersection::none().is_valid());
    }
}
