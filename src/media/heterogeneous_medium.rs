// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::emitter::Emitter;
use crate::core::interaction::MediumInteraction;
use crate::core::medium::{Medium, MediumBase, MediumConfig};
use crate::core::phase::PhaseFunction;
use crate::core::volume::Volume;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::{RGBSpectrum, UnpolarizedSpectrum};
use crate::media::{clamp_spectrum, intersect_bounds};
use std::sync::Arc;

/// Medium whose extinction is read from a volume. Sampling runs at the
/// volume's maximum and the gap to the local extinction becomes the null
/// coefficient.
pub struct HeterogeneousMedium {
    base: MediumBase,
    sigma_t_volume: Arc<dyn Volume>,
    albedo_volume: Arc<dyn Volume>,
    scale: Float,
    bbox: Option<AABB>,
    max_density: RGBSpectrum,
}

impl HeterogeneousMedium {
    pub fn new(sigma_t_volume: Arc<dyn Volume>, albedo_volume: Arc<dyn Volume>, config: MediumConfig) -> Self {
        let bbox = union_bbox(sigma_t_volume.bbox(), albedo_volume.bbox());
        let mut medium = Self {
            base: MediumBase::new("heterogeneous", config.with_homogeneous(false)),
            sigma_t_volume,
            albedo_volume,
            scale: 1.0,
            bbox,
            max_density: RGBSpectrum::zero(),
        };
        medium.update_majorant();
        medium
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale;
        self.update_majorant();
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.base = self.base.with_id(id);
        self
    }

    pub fn with_phase_function(mut self, phase_function: Box<dyn PhaseFunction>) -> Self {
        self.base = self.base.with_phase_function(phase_function);
        self
    }

    pub fn with_emitter(mut self, emitter: &Arc<dyn Emitter>) -> Self {
        self.base = self.base.with_emitter(emitter);
        self
    }

    fn update_majorant(&mut self) {
        let max = self.sigma_t_volume.max_per_channel() * self.scale;
        self.max_density = if self.base.config().has_spectral_extinction {
            max
        } else {
            RGBSpectrum::splat(max[0])
        };

        if self.max_density.max_value() <= 0.0 {
            log::warn!("HeterogeneousMedium {}: zero majorant, rays will pass through untouched.",
                       self.base.id());
        }
        log::debug!("HeterogeneousMedium {}: majorant {:?}", self.base.id(), self.max_density);
    }

    fn extinction(&self, mi: &MediumInteraction) -> RGBSpectrum {
        if self.has_spectral_extinction() {
            self.sigma_t_volume.eval(mi.p) * self.scale
        } else {
            RGBSpectrum::splat(self.sigma_t_volume.eval_1(mi.p) * self.scale)
        }
    }
}

impl ComputationNode for HeterogeneousMedium {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn class_name(&self) -> &'static str {
        "HeterogeneousMedium"
    }

    fn to_string(&self) -> String {
        format!("HeterogeneousMedium[{}, scale = {}, max_density = {:?}, bbox = {:?}]",
                self.base.describe(), self.scale, self.max_density, self.bbox)
    }
}

impl Medium for HeterogeneousMedium {
    fn base(&self) -> &MediumBase {
        &self.base
    }

    fn intersect_aabb(&self, ray: &Ray3f) -> (bool, Float, Float) {
        intersect_bounds(&self.bbox, ray)
    }

    fn get_majorant(&self, _mi: &MediumInteraction, active: bool) -> UnpolarizedSpectrum {
        if !active {
            return RGBSpectrum::zero();
        }
        self.max_density
    }

    fn get_scattering_coefficients(&self, mi: &MediumInteraction, active: bool)
        -> (UnpolarizedSpectrum, UnpolarizedSpectrum, UnpolarizedSpectrum) {
        if !active {
            return (RGBSpectrum::zero(), RGBSpectrum::zero(), RGBSpectrum::zero());
        }
        let sigma_t = self.extinction(mi);
        let sigma_s = sigma_t * clamp_spectrum(self.albedo_volume.eval(mi.p));
        let sigma_n = (self.max_density - sigma_t).max_scalar(0.0);
        (sigma_s, sigma_n, sigma_t)
    }
}

fn union_bbox(a: Option<AABB>, b: Option<AABB>) -> Option<AABB> {
    match (a, b) {
        (Some(mut aabb), Some(other)) => {
            aabb.expand_by_aabb(&other);
            Some(aabb)
        }
        (Some(aabb), None) => Some(aabb),
        (None, Some(aabb)) => Some(aabb),
        (None, None) => None,
    }
}
