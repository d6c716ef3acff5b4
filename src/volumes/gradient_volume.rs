// Copyright @yucwang 2026

use crate::core::volume::Volume;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::volumes::{lerp, Axis};

/// Density ramp along one axis of its box: `start` on the `p_min` face,
/// `end` on the `p_max` face, clamped outside.
pub struct GradientVolume {
    start: RGBSpectrum,
    end: RGBSpectrum,
    axis: Axis,
    bbox: AABB,
}

impl GradientVolume {
    pub fn new_scalar(bbox: AABB, axis: Axis, start: Float, end: Float) -> Self {
        Self {
            start: RGBSpectrum::splat(start),
            end: RGBSpectrum::splat(end),
            axis,
            bbox,
        }
    }

    pub fn new_rgb(bbox: AABB, axis: Axis, start: RGBSpectrum, end: RGBSpectrum) -> Self {
        Self { start, end, axis, bbox }
    }

    /// Normalized coordinate of `p` along the ramp.
    fn ramp_coord(&self, p: &Vector3f) -> Float {
        let idx = self.axis.index();
        let extent = self.bbox.p_max[idx] - self.bbox.p_min[idx];
        if extent <= 0.0 {
            return 0.0;
        }
        ((p[idx] - self.bbox.p_min[idx]) / extent).clamp(0.0, 1.0)
    }

    /// Integral of the ramp along the axis between two coordinates.
    pub fn integrate_along_axis(&self, from: Float, to: Float) -> RGBSpectrum {
        let idx = self.axis.index();
        let extent = self.bbox.p_max[idx] - self.bbox.p_min[idx];
        let clamp = |x: Float| x.clamp(self.bbox.p_min[idx], self.bbox.p_max[idx]);
        let (a, b) = (clamp(from), clamp(to));
        if extent <= 0.0 || b <= a {
            return RGBSpectrum::zero();
        }
        let sa = (a - self.bbox.p_min[idx]) / extent;
        let sb = (b - self.bbox.p_min[idx]) / extent;
        let slope = (self.end - self.start) * 0.5;
        (self.start * (sb - sa) + slope * (sb * sb - sa * sa)) * extent
    }
}

impl Volume for GradientVolume {
    fn bbox(&self) -> Option<AABB> {
        Some(self.bbox)
    }

    fn eval(&self, p_world: Vector3f) -> RGBSpectrum {
        let t = self.ramp_coord(&p_world);
        self.start.zip_map(&self.end, |a, b| lerp(t, a, b))
    }

    fn max_per_channel(&self) -> RGBSpectrum {
        self.start.max(&self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> AABB {
        AABB::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(4.0, 1.0, 1.0))
    }

    #[test]
    fn gradient_volume_eval() {
        let vol = GradientVolume::new_scalar(unit_box(), Axis::X, 0.2, 1.0);
        assert!((vol.eval_1(Vector3f::new(0.0, 0.5, 0.5)) - 0.2).abs() < 1e-6);
        assert!((vol.eval_1(Vector3f::new(2.0, 0.5, 0.5)) - 0.6).abs() < 1e-6);
        assert!((vol.eval_1(Vector3f::new(9.0, 0.5, 0.5)) - 1.0).abs() < 1e-6);
        assert_eq!(vol.max_per_channel(), RGBSpectrum::splat(1.0));
    }

    #[test]
    fn gradient_volume_integral() {
        let vol = GradientVolume::new_rgb(
            unit_box(),
            Axis::X,
            RGBSpectrum::new(0.2, 1.0, 0.0),
            RGBSpectrum::new(1.0, 1.0, 2.0),
        );
        let total = vol.integrate_along_axis(0.0, 4.0);
        assert!((total[0] - 2.4).abs() < 1e-5);
        assert!((total[1] - 4.0).abs() < 1e-5);
        assert!((total[2] - 4.0).abs() < 1e-5);
        assert!(vol.integrate_along_axis(3.0, 1.0).is_black());
        assert_eq!(vol.max_per_channel(), RGBSpectrum::new(1.0, 1.0, 2.0));
    }
}
