// Copyright @yucwang 2026

//! Lane-wise wrappers around the single-ray `Medium` queries.
//!
//! A packet is a set of parallel slices, one entry per lane, plus an active
//! mask. Inactive lanes are no-ops and come back with the same values a
//! masked scalar call returns. The dispatch functions handle packets whose
//! lanes sit in different media.

use crate::core::interaction::{MediumInteraction, SurfaceIntersection};
use crate::core::medium::{InteractionProbabilities, Medium};
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::{RGBSpectrum, UnpolarizedSpectrum};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every lane slice must have `lanes` entries. A mismatched packet is
/// rejected as a whole and every lane comes back inactive.
fn lanes_match(op: &str, lanes: usize, lengths: &[usize]) -> bool {
    if lengths.iter().all(|&len| len == lanes) {
        true
    } else {
        log::warn!("{}: lane slices disagree in length (expected {}, got {:?}), ignoring packet",
                   op, lanes, lengths);
        false
    }
}

pub fn sample_interaction_packet(medium: &dyn Medium,
                                 rays: &[Ray3f],
                                 samples: &[Float],
                                 channels: &[u32],
                                 active: &[bool]) -> Vec<MediumInteraction> {
    if !lanes_match("sample_interaction_packet", rays.len(), &[samples.len(), channels.len(), active.len()]) {
        return vec![MediumInteraction::inactive(); rays.len()];
    }
    rays.iter()
        .zip(samples.iter())
        .zip(channels.iter())
        .zip(active.iter())
        .map(|(((ray, &sample), &channel), &lane_active)| {
            medium.sample_interaction(ray, sample, channel, lane_active)
        })
        .collect()
}

pub fn transmittance_eval_pdf_packet(medium: &dyn Medium,
                                     mis: &[MediumInteraction],
                                     sis: &[SurfaceIntersection],
                                     active: &[bool]) -> Vec<(UnpolarizedSpectrum, UnpolarizedSpectrum)> {
    if !lanes_match("transmittance_eval_pdf_packet", mis.len(), &[sis.len(), active.len()]) {
        return vec![(RGBSpectrum::zero(), RGBSpectrum::zero()); mis.len()];
    }
    mis.iter()
        .zip(sis.iter())
        .zip(active.iter())
        .map(|((mi, si), &lane_active)| medium.transmittance_eval_pdf(mi, si, lane_active))
        .collect()
}

pub fn interaction_probabilities_packet(medium: &dyn Medium,
                                        radiance: &[UnpolarizedSpectrum],
                                        mis: &[MediumInteraction],
                                        throughput: &[UnpolarizedSpectrum],
                                        active: &[bool]) -> Vec<InteractionProbabilities> {
    if !lanes_match("interaction_probabilities_packet", mis.len(),
                    &[radiance.len(), throughput.len(), active.len()]) {
        return vec![InteractionProbabilities::zero(); mis.len()];
    }
    mis.iter()
        .zip(radiance.iter())
        .zip(throughput.iter())
        .zip(active.iter())
        .map(|(((mi, l), beta), &lane_active)| {
            if lane_active {
                medium.get_interaction_probabilities(l, mi, beta)
            } else {
                InteractionProbabilities::zero()
            }
        })
        .collect()
}

pub fn radiance_packet(medium: &dyn Medium,
                       mis: &[MediumInteraction],
                       active: &[bool]) -> Vec<UnpolarizedSpectrum> {
    if !lanes_match("radiance_packet", mis.len(), &[active.len()]) {
        return vec![RGBSpectrum::zero(); mis.len()];
    }
    mis.iter()
        .zip(active.iter())
        .map(|(mi, &lane_active)| medium.get_radiance(mi, lane_active))
        .collect()
}

/// Groups lane indices by the medium they are in, ordered by medium index.
/// Lanes outside any medium (`None`) are left out.
pub fn partition_lanes(medium_indices: &[Option<usize>]) -> Vec<(usize, Vec<usize>)> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (lane, medium_index) in medium_indices.iter().enumerate() {
        if let Some(idx) = medium_index {
            groups.entry(*idx).or_insert_with(Vec::new).push(lane);
        }
    }
    groups.into_iter().collect()
}

fn gather<T: Copy>(values: &[T], lanes: &[usize]) -> Vec<T> {
    lanes.iter().map(|&lane| values[lane]).collect()
}

/// Samples every lane in its own medium, calling each medium once with the
/// lanes that belong to it. Lanes without a medium, or pointing past the
/// table, come back inactive.
pub fn sample_interaction_dispatch(media: &[Arc<dyn Medium>],
                                   medium_indices: &[Option<usize>],
                                   rays: &[Ray3f],
                                   samples: &[Float],
                                   channels: &[u32],
                                   active: &[bool]) -> Vec<MediumInteraction> {
    let mut result = vec![MediumInteraction::inactive(); rays.len()];
    if !lanes_match("sample_interaction_dispatch", rays.len(),
                    &[medium_indices.len(), samples.len(), channels.len(), active.len()]) {
        return result;
    }
    for (medium_index, lanes) in partition_lanes(medium_indices) {
        let medium = match media.get(medium_index) {
            Some(medium) => medium,
            None => {
                log::warn!("Packet dispatch: medium index {} out of range ({} media)", medium_index, media.len());
                continue;
            }
        };

        let group = sample_interaction_packet(medium.as_ref(),
                                              &gather(rays, &lanes),
                                              &gather(samples, &lanes),
                                              &gather(channels, &lanes),
                                              &gather(active, &lanes));
        for (lane, mi) in lanes.into_iter().zip(group.into_iter()) {
            result[lane] = mi;
        }
    }
    result
}

pub fn transmittance_eval_pdf_dispatch(media: &[Arc<dyn Medium>],
                                       medium_indices: &[Option<usize>],
                                       mis: &[MediumInteraction],
                                       sis: &[SurfaceIntersection],
                                       active: &[bool]) -> Vec<(UnpolarizedSpectrum, UnpolarizedSpectrum)> {
    let mut result = vec![(RGBSpectrum::zero(), RGBSpectrum::zero()); mis.len()];
    if !lanes_match("transmittance_eval_pdf_dispatch", mis.len(),
                    &[medium_indices.len(), sis.len(), active.len()]) {
        return result;
    }
    for (medium_index, lanes) in partition_lanes(medium_indices) {
        let medium = match media.get(medium_index) {
            Some(medium) => medium,
            None => {
                log::warn!("Packet dispatch: medium index {} out of range ({} media)", medium_index, media.len());
                continue;
            }
        };

        let group = transmittance_eval_pdf_packet(medium.as_ref(),
                                                  &gather(mis, &lanes),
                                                  &gather(sis, &lanes),
                                                  &gather(active, &lanes));
        for (lane, value) in lanes.into_iter().zip(group.into_iter()) {
            result[lane] = value;
        }
    }
    result
}
