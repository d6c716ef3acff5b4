// Copyright @yucwang 2026

use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::emitter::{Emitter, EmitterFlag};
use crate::core::interaction::MediumInteraction;
use crate::core::volume::Volume;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Emission inside a participating medium, driven by a radiance volume.
pub struct VolumeLight {
    id: String,
    radiance: Arc<dyn Volume>,
    scale: Float,
}

impl VolumeLight {
    pub fn new(radiance: Arc<dyn Volume>) -> Self {
        Self { id: generate_node_id("volumelight"), radiance, scale: 1.0 }
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }
}

impl ComputationNode for VolumeLight {
    fn id(&self) -> &str {
        &self.id
    }

    fn class_name(&self) -> &'static str {
        "VolumeLight"
    }
}

impl Emitter for VolumeLight {
    fn get_flag(&self) -> EmitterFlag {
        EmitterFlag::MEDIUM
    }

    fn eval_medium(&self, mi: &MediumInteraction) -> RGBSpectrum {
        if !mi.is_valid() {
            return RGBSpectrum::zero();
        }
        self.radiance.eval(mi.p) * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector3f;
    use crate::volumes::const_volume::ConstantVolume;

    #[test]
    fn volume_light_eval() {
        let light = VolumeLight::new(Arc::new(ConstantVolume::new_rgb(RGBSpectrum::new(1.0, 0.5, 0.25))))
            .with_scale(2.0)
            .with_id("glow");
        assert_eq!(light.id(), "glow");
        assert!(light.get_flag().contains(EmitterFlag::MEDIUM));
        assert!(!EmitterFlag::NONE.contains(EmitterFlag::MEDIUM));

        let mut mi = MediumInteraction::inactive();
        assert!(light.eval_medium(&mi).is_black());

        mi.t = 1.0;
        mi.p = Vector3f::new(0.0, 1.0, 0.0);
        mi.active = true;
        mi.valid = true;
        assert_eq!(light.eval_medium(&mi), RGBSpectrum::new(2.0, 1.0, 0.5));
    }
}
