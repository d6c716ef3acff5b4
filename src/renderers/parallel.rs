// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::integrator::{Integrator, SegmentEvent};
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::Medium;
use crate::core::rng::LcgRng;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

/// Per-channel transmittance estimate with its standard error and the
/// event counts it was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransmittanceEstimate {
    pub mean: RGBSpectrum,
    pub std_error: RGBSpectrum,
    pub samples: usize,
    pub escaped: usize,
    pub scattered: usize,
    pub terminated: usize,
}

#[derive(Clone, Copy)]
struct BlockResult {
    sum: RGBSpectrum,
    sum_sq: RGBSpectrum,
    escaped: usize,
    scattered: usize,
    terminated: usize,
}

impl BlockResult {
    fn zero() -> Self {
        Self {
            sum: RGBSpectrum::zero(),
            sum_sq: RGBSpectrum::zero(),
            escaped: 0,
            scattered: 0,
            terminated: 0,
        }
    }
}

/// Runs many independent walks along one ray on a pool of scoped threads.
/// Samples are split into fixed blocks, each seeded from its index, so the
/// result does not depend on the thread count.
pub struct ParallelEstimator {
    integrator: Box<dyn Integrator>,
    seed: u64,
    thread_count: usize,
    block_size: usize,
    show_progress: bool,
}

impl ParallelEstimator {
    pub fn new(integrator: Box<dyn Integrator>, seed: u64) -> Self {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            integrator,
            seed,
            thread_count,
            block_size: 4096,
            show_progress: true,
        }
    }

    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn block_seed(&self, block_index: usize) -> u64 {
        ((self.seed & 0xFFFF_FFFF) << 32) | (block_index as u64 & 0xFFFF_FFFF)
    }

    fn run_block(&self, medium: &dyn Medium, ray: &Ray3f, si: &SurfaceIntersection,
                 block_index: usize, count: usize) -> BlockResult {
        let mut rng = LcgRng::new(self.block_seed(block_index));
        let mut result = BlockResult::zero();
        for _ in 0..count {
            match self.integrator.trace_segment(medium, ray, si, &mut rng) {
                SegmentEvent::Escaped { weight } => {
                    result.sum += weight;
                    result.sum_sq += weight * weight;
                    result.escaped += 1;
                }
                SegmentEvent::Scattered { .. } => result.scattered += 1,
                SegmentEvent::Terminated => result.terminated += 1,
            }
        }
        result
    }

    pub fn estimate(&self, medium: &dyn Medium, ray: &Ray3f, si: &SurfaceIntersection,
                    samples: usize) -> TransmittanceEstimate {
        if samples == 0 {
            return TransmittanceEstimate {
                mean: RGBSpectrum::zero(),
                std_error: RGBSpectrum::zero(),
                samples: 0,
                escaped: 0,
                scattered: 0,
                terminated: 0,
            };
        }

        let block_size = self.block_size;
        let total_blocks = (samples + block_size - 1) / block_size;
        log::info!("Estimating transmittance through {} with {}: {} samples, {} blocks, {} threads",
                   medium.id(), self.integrator.name(), samples, total_blocks, self.thread_count);

        let progress = if self.show_progress {
            let bar = ProgressBar::new(total_blocks as u64);
            bar.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let next_block = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<(usize, BlockResult)>();
        let mut blocks = vec![BlockResult::zero(); total_blocks];

        thread::scope(|scope| {
            for _ in 0..self.thread_count {
                let next_block = Arc::clone(&next_block);
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                        if block_index >= total_blocks {
                            break;
                        }
                        let start = block_index * block_size;
                        let count = block_size.min(samples - start);
                        let result = self.run_block(medium, ray, si, block_index, count);
                        if tx.send((block_index, result)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for _ in 0..total_blocks {
                if let Ok((block_index, result)) = rx.recv() {
                    blocks[block_index] = result;
                    progress.inc(1);
                }
            }
        });
        progress.finish_and_clear();

        // Blocks are summed in index order so the result is reproducible.
        let mut total = BlockResult::zero();
        for block in blocks.iter() {
            total.sum += block.sum;
            total.sum_sq += block.sum_sq;
            total.escaped += block.escaped;
            total.scattered += block.scattered;
            total.terminated += block.terminated;
        }

        let n = samples as Float;
        let mean = total.sum / n;
        let variance = (total.sum_sq / n - mean * mean).max_scalar(0.0);
        let std_error = if samples > 1 {
            (variance * (n / (n - 1.0)) / n).map(|v| v.sqrt())
        } else {
            RGBSpectrum::zero()
        };

        log::debug!("Transmittance estimate {:?} +/- {:?}", mean, std_error);
        TransmittanceEstimate {
            mean,
            std_error,
            samples,
            escaped: total.escaped,
            scattered: total.scattered,
            terminated: total.terminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::medium::MediumConfig;
    use crate::integrators::delta_tracking::DeltaTrackingIntegrator;
    use crate::math::aabb::AABB;
    use crate::math::constants::Vector3f;
    use crate::media::heterogeneous_medium::HeterogeneousMedium;
    use crate::volumes::const_volume::ConstantVolume;
    use crate::volumes::gradient_volume::GradientVolume;
    use crate::volumes::Axis;

    fn ramp() -> HeterogeneousMedium {
        let bbox = AABB::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(4.0, 1.0, 1.0));
        HeterogeneousMedium::new(Arc::new(GradientVolume::new_scalar(bbox, Axis::X, 0.2, 1.0)),
                                 Arc::new(ConstantVolume::new_scalar(0.5)),
                                 MediumConfig::default())
    }

    fn estimator(threads: usize) -> ParallelEstimator {
        ParallelEstimator::new(Box::new(DeltaTrackingIntegrator::default()), 1234)
            .with_threads(threads)
            .with_block_size(1000)
            .with_progress(false)
    }

    #[test]
    fn test_estimate_converges() {
        let medium = ramp();
        let ray = Ray3f::new(Vector3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let estimate = estimator(4).estimate(&medium, &ray, &SurfaceIntersection::none(), 20500);

        assert_eq!(estimate.samples, 20500);
        assert_eq!(estimate.escaped + estimate.scattered + estimate.terminated, 20500);
        let expected = (-2.4 as Float).exp();
        for c in 0..3 {
            assert!((estimate.mean[c] - expected).abs() < 0.01, "{:?}", estimate);
            assert!(estimate.std_error[c] > 0.0 && estimate.std_error[c] < 0.005);
        }
    }

    #[test]
    fn test_estimate_independent_of_thread_count() {
        let medium = ramp();
        let ray = Ray3f::new(Vector3f::new(-1.0, 0.5, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let si = SurfaceIntersection::none();
        let single = estimator(1).estimate(&medium, &ray, &si, 5000);
        let many = estimator(8).estimate(&medium, &ray, &si, 5000);
        assert_eq!(single, many);
        assert_eq!(estimator(2).estimate(&medium, &ray, &si, 0).samples, 0);
    }
}
