// Copyright @yucwang 2026

pub mod const_volume;
pub mod gradient_volume;

use crate::math::constants::Float;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn parse(name: &str) -> Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(format!("unknown axis: {}", other)),
        }
    }
}

pub(crate) fn lerp(t: Float, a: Float, b: Float) -> Float {
    a + (b - a) * t
}
