// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX)}
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    /// Same line, restricted to start at parameter `t`.
    pub fn advanced_to(&self, t: Float) -> Self {
        let mut ray = *self;
        ray.min_t = t.max(self.min_t);
        ray
    }
}

#[cfg(test)]
mod tests {
    use super::Vector3f;
    use super::Ray3f;

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!(v1[1].abs() < 1e-6);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert_eq!(ray.max_t, std::f32::MAX);
    }

    #[test]
    fn test_ray_advance() {
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 2.0, 0.0), Some(1.0), Some(8.0));
        let advanced = ray.advanced_to(3.0);
        assert_eq!(advanced.min_t, 3.0);
        assert_eq!(advanced.max_t, 8.0);
        assert_eq!(advanced.dir(), Vector3f::new(0.0, 1.0, 0.0));

        let behind = ray.advanced_to(0.5);
        assert_eq!(behind.min_t, 1.0);
    }
}
