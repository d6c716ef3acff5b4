// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Spatially varying field sampled by the media (densities, albedos,
/// emitted radiance). Single-channel volumes replicate their value.
pub trait Volume: Send + Sync {
    fn bbox(&self) -> Option<AABB> {
        None
    }
    fn eval(&self, p_world: Vector3f) -> RGBSpectrum;

    /// First channel only, for grey quantities.
    fn eval_1(&self, p_world: Vector3f) -> Float {
        self.eval(p_world)[0]
    }

    /// Upper bound of every channel over the whole volume.
    fn max_per_channel(&self) -> RGBSpectrum;
}
