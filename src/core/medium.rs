// Copyright @yucwang 2026

use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::emitter::Emitter;
use crate::core::interaction::{MediumInteraction, SurfaceIntersection};
use crate::core::phase::PhaseFunction;
use crate::math::constants::{Float, INFINITY};
use crate::math::ray::Ray3f;
use crate::math::spectrum::{RGBSpectrum, UnpolarizedSpectrum, CHANNEL_COUNT};
use crate::phases::isotropic::IsotropicPhaseFunction;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

/// Heuristic used to split a tentative collision into real and null events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumEventSamplingMode {
    Analogue,
    Maximum,
    Mean,
}

impl Default for MediumEventSamplingMode {
    fn default() -> Self {
        MediumEventSamplingMode::Analogue
    }
}

impl FromStr for MediumEventSamplingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analogue" | "analog" => Ok(MediumEventSamplingMode::Analogue),
            "maximum" | "max" => Ok(MediumEventSamplingMode::Maximum),
            "mean" => Ok(MediumEventSamplingMode::Mean),
            other => Err(format!("unknown medium sampling mode: {}", other)),
        }
    }
}

impl fmt::Display for MediumEventSamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediumEventSamplingMode::Analogue => "analogue",
            MediumEventSamplingMode::Maximum => "maximum",
            MediumEventSamplingMode::Mean => "mean",
        };
        write!(f, "{}", name)
    }
}

/// How the spectrum channels are interpreted. In spectral mode every channel
/// shares the majorant of channel 0 and the requested sampling channel is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Rgb,
    Spectral,
}

impl FromStr for ChannelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ChannelMode::Rgb),
            "spectral" => Ok(ChannelMode::Spectral),
            other => Err(format!("unknown channel mode: {}", other)),
        }
    }
}

/// Per-medium settings, fixed once the medium is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediumConfig {
    pub sampling_mode: MediumEventSamplingMode,
    pub sample_emitters: bool,
    pub is_homogeneous: bool,
    pub has_spectral_extinction: bool,
    pub channel_mode: ChannelMode,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            sampling_mode: MediumEventSamplingMode::Analogue,
            sample_emitters: true,
            is_homogeneous: false,
            has_spectral_extinction: true,
            channel_mode: ChannelMode::Rgb,
        }
    }
}

impl MediumConfig {
    pub fn with_sampling_mode(mut self, mode: MediumEventSamplingMode) -> Self {
        self.sampling_mode = mode;
        self
    }

    pub fn with_sample_emitters(mut self, sample_emitters: bool) -> Self {
        self.sample_emitters = sample_emitters;
        self
    }

    pub fn with_spectral_extinction(mut self, has_spectral_extinction: bool) -> Self {
        self.has_spectral_extinction = has_spectral_extinction;
        self
    }

    pub fn with_channel_mode(mut self, channel_mode: ChannelMode) -> Self {
        self.channel_mode = channel_mode;
        self
    }

    pub(crate) fn with_homogeneous(mut self, is_homogeneous: bool) -> Self {
        self.is_homogeneous = is_homogeneous;
        self
    }
}

/// Output of the interaction classifier.
///
/// `prob_scatter + prob_null` is one on every channel with a non-zero raw
/// sum. The weights are the factors a walk multiplies into its throughput
/// after taking the corresponding branch: `sigma_s / prob_scatter` and
/// `sigma_n / prob_null`, zero where the probability is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionProbabilities {
    pub prob_scatter: UnpolarizedSpectrum,
    pub prob_null: UnpolarizedSpectrum,
    pub weight_scatter: UnpolarizedSpectrum,
    pub weight_null: UnpolarizedSpectrum,
}

impl InteractionProbabilities {
    pub fn zero() -> Self {
        Self {
            prob_scatter: UnpolarizedSpectrum::zero(),
            prob_null: UnpolarizedSpectrum::zero(),
            weight_scatter: UnpolarizedSpectrum::zero(),
            weight_null: UnpolarizedSpectrum::zero(),
        }
    }
}

/// Raw analogue probabilities, channel by channel.
pub fn medium_probabilities_analog(radiance: &UnpolarizedSpectrum,
                                   mi: &MediumInteraction) -> (UnpolarizedSpectrum, UnpolarizedSpectrum) {
    let prob_s = mi.sigma_t;
    let prob_n = mi.sigma_n + radiance.max_scalar(radiance.abs().mean());
    (prob_s, prob_n)
}

/// Raw probabilities reduced with the largest channel magnitude.
pub fn medium_probabilities_max(radiance: &UnpolarizedSpectrum,
                                mi: &MediumInteraction,
                                throughput: &UnpolarizedSpectrum) -> (UnpolarizedSpectrum, UnpolarizedSpectrum) {
    let prob_s = (mi.sigma_t * *throughput).abs().max_value();
    let prob_n = (mi.sigma_n * *throughput).abs().max_value()
        + (*radiance * throughput.max_scalar(1.0)).abs().max_value();
    (RGBSpectrum::splat(prob_s), RGBSpectrum::splat(prob_n))
}

/// Raw probabilities reduced with the channel mean.
pub fn medium_probabilities_mean(radiance: &UnpolarizedSpectrum,
                                 mi: &MediumInteraction,
                                 throughput: &UnpolarizedSpectrum) -> (UnpolarizedSpectrum, UnpolarizedSpectrum) {
    let prob_s = (mi.sigma_t * *throughput).abs().mean();
    let prob_n = (mi.sigma_n * *throughput).abs().mean()
        + (*radiance * (*throughput * 0.5 + 0.5)).abs().mean();
    (RGBSpectrum::splat(prob_s), RGBSpectrum::splat(prob_n))
}

/// State shared by every medium: identity, configuration, its own phase
/// function and an optional handle on an emitter owned by the scene.
pub struct MediumBase {
    id: String,
    config: MediumConfig,
    phase_function: Box<dyn PhaseFunction>,
    emitter: Option<Weak<dyn Emitter>>,
}

impl MediumBase {
    pub fn new(type_name: &str, config: MediumConfig) -> Self {
        Self {
            id: generate_node_id(type_name),
            config,
            phase_function: Box::new(IsotropicPhaseFunction::new()),
            emitter: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_phase_function(mut self, phase_function: Box<dyn PhaseFunction>) -> Self {
        self.phase_function = phase_function;
        self
    }

    pub fn with_emitter(mut self, emitter: &Arc<dyn Emitter>) -> Self {
        self.emitter = Some(Arc::downgrade(emitter));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &MediumConfig {
        &self.config
    }

    pub fn phase_function(&self) -> &dyn PhaseFunction {
        self.phase_function.as_ref()
    }

    pub fn emitter(&self) -> Option<Arc<dyn Emitter>> {
        self.emitter.as_ref().and_then(|e| e.upgrade())
    }

    pub(crate) fn describe(&self) -> String {
        format!("id = \"{}\", sampling_mode = {}, sample_emitters = {}, phase = {}, emitter = {}",
                self.id,
                self.config.sampling_mode,
                self.config.sample_emitters,
                self.phase_function.name(),
                self.emitter().map(|e| e.id().to_string()).unwrap_or_else(|| "none".to_string()))
    }
}

/// A participating medium. Implementors provide the bounding-volume test and
/// the coefficient lookups; free-flight sampling, transmittance evaluation
/// and event classification are shared.
///
/// Every method is a pure function of its arguments and is safe to call from
/// many threads. The `active` flag masks out lanes that must not be
/// evaluated; an inactive lane never triggers a coefficient lookup.
pub trait Medium: ComputationNode + Send + Sync {
    fn base(&self) -> &MediumBase;

    /// Returns whether the ray overlaps the medium and the parametric
    /// overlap `[mint, maxt]`.
    fn intersect_aabb(&self, ray: &Ray3f) -> (bool, Float, Float);

    /// Upper bound on `sigma_t` used to drive free-flight sampling.
    fn get_majorant(&self, mi: &MediumInteraction, active: bool) -> UnpolarizedSpectrum;

    /// Returns `(sigma_s, sigma_n, sigma_t)` at `mi.p`.
    fn get_scattering_coefficients(&self, mi: &MediumInteraction, active: bool)
        -> (UnpolarizedSpectrum, UnpolarizedSpectrum, UnpolarizedSpectrum);

    fn config(&self) -> &MediumConfig {
        self.base().config()
    }

    fn phase_function(&self) -> &dyn PhaseFunction {
        self.base().phase_function()
    }

    fn emitter(&self) -> Option<Arc<dyn Emitter>> {
        self.base().emitter()
    }

    fn is_emitter(&self) -> bool {
        self.emitter().is_some()
    }

    fn use_emitter_sampling(&self) -> bool {
        self.config().sample_emitters
    }

    fn is_homogeneous(&self) -> bool {
        self.config().is_homogeneous
    }

    fn has_spectral_extinction(&self) -> bool {
        self.config().has_spectral_extinction
    }

    fn sampling_mode(&self) -> MediumEventSamplingMode {
        self.config().sampling_mode
    }

    /// The segment of `ray` inside the medium, as an active interaction that
    /// did not collide: `t` is infinite and only the bounds and majorant are
    /// set. Inactive when the ray misses. No coefficient lookup is done.
    fn segment_interaction(&self, ray: &Ray3f) -> MediumInteraction {
        let mut mi = MediumInteraction::inactive();
        let (hit, mint, maxt) = self.intersect_aabb(ray);
        if !hit || !(mint.is_finite() || maxt.is_finite()) {
            return mi;
        }
        let mint = mint.max(0.0);
        let maxt = maxt.min(ray.max_t);
        if mint > maxt {
            return mi;
        }

        mi.active = true;
        mi.wi = -ray.dir();
        mi.mint = mint;
        mi.maxt = maxt;
        mi.p = ray.at(mint);
        mi.combined_extinction = self.get_majorant(&mi, true);
        mi
    }

    /// Samples a tentative free-flight distance with the majorant of
    /// `channel` (channel 0 in spectral mode). The returned interaction is
    /// inactive when the ray misses the medium, and active but invalid when
    /// the sampled distance falls past `maxt`.
    fn sample_interaction(&self, ray: &Ray3f, sample: Float, channel: u32, active: bool) -> MediumInteraction {
        if !active {
            return MediumInteraction::inactive();
        }
        let mut mi = self.segment_interaction(ray);
        if !mi.is_active() {
            return mi;
        }

        let (mint, maxt) = (mi.mint, mi.maxt);
        let m = mi.combined_extinction[majorant_channel(self.config().channel_mode, channel)];

        let sampled_t = if m > 0.0 {
            mint - (1.0 - sample).ln() / m
        } else {
            INFINITY
        };

        if sampled_t <= maxt {
            mi.t = sampled_t;
            mi.p = ray.at(sampled_t);
            mi.valid = true;
            let (sigma_s, sigma_n, sigma_t) = self.get_scattering_coefficients(&mi, true);
            mi.sigma_s = sigma_s;
            mi.sigma_n = sigma_n;
            mi.sigma_t = sigma_t;
        } else {
            mi.t = INFINITY;
        }

        mi
    }

    /// Majorant transmittance and sampling density of the event described by
    /// `mi` against the surface hit `si`. A collision before the surface gets
    /// `(tr, tr * majorant)`; reaching the surface or the segment end gets
    /// `(tr, tr)`.
    fn transmittance_eval_pdf(&self, mi: &MediumInteraction, si: &SurfaceIntersection, active: bool)
        -> (UnpolarizedSpectrum, UnpolarizedSpectrum) {
        if !active || !mi.is_active() {
            return (RGBSpectrum::zero(), RGBSpectrum::zero());
        }

        let collided = mi.is_valid() && mi.t <= si.t();
        let end = if collided { mi.t } else { si.t().min(mi.maxt) };
        let dt = (end - mi.mint).max(0.0);

        let mut tr = RGBSpectrum::zero();
        let mut pdf = RGBSpectrum::zero();
        for c in 0..CHANNEL_COUNT {
            let m = mi.combined_extinction[c];
            if m <= 0.0 {
                // Nothing can collide on this channel.
                let v = if collided { 0.0 } else { 1.0 };
                tr[c] = v;
                pdf[c] = v;
                continue;
            }
            tr[c] = (-m * dt).exp();
            pdf[c] = if collided { tr[c] * m } else { tr[c] };
        }

        (tr, pdf)
    }

    /// Classifies the collision at `mi` into real scattering and null events
    /// with the configured heuristic.
    fn get_interaction_probabilities(&self,
                                     radiance: &UnpolarizedSpectrum,
                                     mi: &MediumInteraction,
                                     throughput: &UnpolarizedSpectrum) -> InteractionProbabilities {
        if !mi.is_valid() {
            return InteractionProbabilities::zero();
        }

        let (prob_s, prob_n) = match self.sampling_mode() {
            MediumEventSamplingMode::Analogue => medium_probabilities_analog(radiance, mi),
            MediumEventSamplingMode::Maximum => medium_probabilities_max(radiance, mi, throughput),
            MediumEventSamplingMode::Mean => medium_probabilities_mean(radiance, mi, throughput),
        };

        let sum = prob_s + prob_n;
        let prob_scatter = prob_s.safe_div(&sum);
        let prob_null = prob_n.safe_div(&sum);
        InteractionProbabilities {
            prob_scatter,
            prob_null,
            weight_scatter: mi.sigma_s.safe_div(&prob_scatter),
            weight_null: mi.sigma_n.safe_div(&prob_null),
        }
    }

    /// Emitted radiance at the interaction, zero for non-emissive media.
    fn get_radiance(&self, mi: &MediumInteraction, active: bool) -> UnpolarizedSpectrum {
        if !active || !mi.is_valid() {
            return RGBSpectrum::zero();
        }
        match self.emitter() {
            Some(emitter) => emitter.eval_medium(mi),
            None => RGBSpectrum::zero(),
        }
    }
}

fn majorant_channel(mode: ChannelMode, channel: u32) -> usize {
    match mode {
        ChannelMode::Spectral => 0,
        ChannelMode::Rgb => match channel {
            1 => 1,
            2 => 2,
            _ => 0,
        },
    }
}
