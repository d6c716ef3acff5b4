// Copyright @yucwang 2026

use crate::core::volume::Volume;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

pub struct ConstantVolume {
    value: RGBSpectrum,
    bbox: Option<AABB>,
}

impl ConstantVolume {
    pub fn new_scalar(value: Float) -> Self {
        Self {
            value: RGBSpectrum::splat(value),
            bbox: None,
        }
    }

    pub fn new_rgb(value: RGBSpectrum) -> Self {
        Self {
            value,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: Option<AABB>) -> Self {
        self.bbox = bbox;
        self
    }
}

impl Volume for ConstantVolume {
    fn bbox(&self) -> Option<AABB> {
        self.bbox
    }

    fn eval(&self, _p_world: Vector3f) -> RGBSpectrum {
        self.value
    }

    fn max_per_channel(&self) -> RGBSpectrum {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_volume_scalar() {
        let vol = ConstantVolume::new_scalar(2.0);
        assert!(vol.bbox().is_none());
        assert_eq!(vol.eval(Vector3f::new(0.1, 0.2, 0.3)), RGBSpectrum::splat(2.0));
        assert_eq!(vol.eval_1(Vector3f::zeros()), 2.0);
        assert_eq!(vol.max_per_channel(), RGBSpectrum::splat(2.0));
    }

    #[test]
    fn constant_volume_rgb_bbox() {
        let bbox = AABB::new(Vector3f::new(-1.0, 0.0, 1.0), Vector3f::new(2.0, 3.0, 4.0));
        let vol = ConstantVolume::new_rgb(RGBSpectrum::new(1.0, 2.0, 3.0)).with_bbox(Some(bbox));
        assert_eq!(vol.eval(Vector3f::new(-0.5, 1.0, 2.0)), RGBSpectrum::new(1.0, 2.0, 3.0));
        assert_eq!(vol.max_per_channel(), RGBSpectrum::new(1.0, 2.0, 3.0));
        assert_eq!(vol.bbox(), Some(bbox));
    }
}
