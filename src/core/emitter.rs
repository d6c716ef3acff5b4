// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::MediumInteraction;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterFlag(u8);

impl EmitterFlag {
    pub const NONE: Self = Self(0);
    pub const MEDIUM: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

/// Emitters are owned by the scene; media only keep weak handles to them.
pub trait Emitter: ComputationNode + Send + Sync {
    fn get_flag(&self) -> EmitterFlag;

    /// Emitted radiance at a point inside a medium.
    fn eval_medium(&self, _mi: &MediumInteraction) -> RGBSpectrum {
        RGBSpectrum::default()
    }
}
