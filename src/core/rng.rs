// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f32(&mut self) -> Float {
        ((self.next_u32() >> 8) as Float) * (1.0 / 16777216.0)
    }

    pub fn next_2d(&mut self) -> Vector2f {
        let x = self.next_f32();
        Vector2f::new(x, self.next_f32())
    }

    /// Uniform index in `[0, n)`.
    pub fn next_index(&mut self, n: usize) -> usize {
        ((self.next_f32() * n as Float) as usize).min(n.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::LcgRng;

    #[test]
    fn test_rng_range_and_determinism() {
        let mut a = LcgRng::new(7);
        let mut b = LcgRng::new(7);
        let mut sum = 0.0;
        for _ in 0..10000 {
            let x = a.next_f32();
            assert_eq!(x, b.next_f32());
            assert!(x >= 0.0 && x < 1.0);
            sum += x as f64;
        }
        assert!((sum / 10000.0 - 0.5).abs() < 0.02);

        for _ in 0..100 {
            assert!(a.next_index(3) < 3);
        }
    }
}
