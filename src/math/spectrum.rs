// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub};

pub const CHANNEL_COUNT: usize = 3;

/// Three-channel, unpolarized spectrum. In RGB mode the channels are colors,
/// in spectral mode they are the sampled wavelengths of the current path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

/// Coefficients and majorants are never polarized.
pub type UnpolarizedSpectrum = RGBSpectrum;

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(value: Float) -> Self {
        Self::new(value, value, value)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::splat(1.0)
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|&c| c == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self::new(f(self.rgb[0]), f(self.rgb[1]), f(self.rgb[2]))
    }

    pub fn zip_map<F: Fn(Float, Float) -> Float>(&self, other: &Self, f: F) -> Self {
        Self::new(f(self.rgb[0], other.rgb[0]),
                  f(self.rgb[1], other.rgb[1]),
                  f(self.rgb[2], other.rgb[2]))
    }

    pub fn abs(&self) -> Self {
        self.map(|c| c.abs())
    }

    pub fn exp(&self) -> Self {
        self.map(|c| c.exp())
    }

    /// Channel-wise maximum.
    pub fn max(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a.max(b))
    }

    pub fn max_scalar(&self, value: Float) -> Self {
        self.map(|c| c.max(value))
    }

    /// Largest channel value.
    pub fn max_value(&self) -> Float {
        self.rgb[0].max(self.rgb[1]).max(self.rgb[2])
    }

    pub fn min_value(&self) -> Float {
        self.rgb[0].min(self.rgb[1]).min(self.rgb[2])
    }

    /// Arithmetic mean over the channels.
    pub fn mean(&self) -> Float {
        (self.rgb[0] + self.rgb[1] + self.rgb[2]) / (CHANNEL_COUNT as Float)
    }

    /// Channel-wise quotient which yields zero wherever the divisor is zero.
    pub fn safe_div(&self, denom: &Self) -> Self {
        self.zip_map(denom, |a, b| if b != 0.0 { a / b } else { 0.0 })
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.rgb[idx]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, idx: usize) -> &mut Float {
        &mut self.rgb[idx]
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl Add<Float> for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Float) -> Self {
        self.map(|c| c + rhs)
    }
}

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { rgb: self.rgb - rhs.rgb }
    }
}

impl Neg for RGBSpectrum {
    type Output = Self;

    fn neg(self) -> Self {
        Self { rgb: -self.rgb }
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        rhs * self
    }
}

impl MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        self.rgb.component_mul_assign(&rhs.rgb);
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}
