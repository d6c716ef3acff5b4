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
use crate::volumes::const_volume::ConstantVolume;
use std::sync::Arc;

/// Medium with constant extinction. The majorant is tight, so every
/// tentative collision is a real one.
pub struct HomogeneousMedium {
    base: MediumBase,
    sigma_t: RGBSpectrum,
    albedo: Arc<dyn Volume>,
    scale: Float,
    bbox: Option<AABB>,
}

impl HomogeneousMedium {
    pub fn new(sigma_t: RGBSpectrum, albedo: RGBSpectrum, config: MediumConfig) -> Self {
        if sigma_t.min_value() < 0.0 {
            log::warn!("HomogeneousMedium: negative extinction {:?}", sigma_t);
        }
        Self {
            base: MediumBase::new("homogeneous", config.with_homogeneous(true)),
            sigma_t,
            albedo: Arc::new(ConstantVolume::new_rgb(albedo)),
            scale: 1.0,
            bbox: None,
        }
    }

    pub fn with_albedo_volume(mut self, volume: Arc<dyn Volume>) -> Self {
        self.albedo = volume;
        self
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_bbox(mut self, bbox: Option<AABB>) -> Self {
        self.bbox = bbox;
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

    fn extinction(&self) -> RGBSpectrum {
        let sigma_t = self.sigma_t * self.scale;
        if self.has_spectral_extinction() {
            sigma_t
        } else {
            RGBSpectrum::splat(sigma_t[0])
        }
    }
}

impl ComputationNode for HomogeneousMedium {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn class_name(&self) -> &'static str {
        "HomogeneousMedium"
    }

    fn to_string(&self) -> String {
        format!("HomogeneousMedium[{}, sigma_t = {:?}, scale = {}, bbox = {:?}]",
                self.base.describe(), self.sigma_t, self.scale, self.bbox)
    }
}

impl Medium for HomogeneousMedium {
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
        self.extinction()
    }

    fn get_scattering_coefficients(&self, mi: &MediumInteraction, active: bool)
        -> (UnpolarizedSpectrum, UnpolarizedSpectrum, UnpolarizedSpectrum) {
        if !active {
            return (RGBSpectrum::zero(), RGBSpectrum::zero(), RGBSpectrum::zero());
        }
        let sigma_t = self.extinction();
        let sigma_s = sigma_t * clamp_spectrum(self.albedo.eval(mi.p));
        (sigma_s, RGBSpectrum::zero(), sigma_t)
    }
}
