// Copyright @yucwang 2023

use super::constants::{ INV_FOUR_PI, PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1.0 - 2.0 * u.x;
    let r: Float = (1.0 - z * z).max(0.0).sqrt();
    let phi: Float = 2.0 * PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Direction with the given polar cosine around the local `z` axis.
pub fn spherical_direction(cos_theta: Float, phi: Float) -> Vector3f {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sphere_is_unit() {
        let samples = [Vector2f::new(0.0, 0.0), Vector2f::new(0.5, 0.25), Vector2f::new(0.999, 0.7)];
        for u in samples.iter() {
            let v = sample_uniform_sphere(u);
            assert!((v.norm() - 1.0).abs() < 1e-5);
        }
        assert_eq!(sample_uniform_sphere(&Vector2f::new(0.0, 0.3)).z, 1.0);
        assert!((sample_uniform_sphere_pdf() * 4.0 * PI - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_spherical_direction() {
        let v = spherical_direction(0.0, 0.5 * PI);
        assert!((v - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
    }
}
