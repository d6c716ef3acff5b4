// Copyright @yucwang 2026

pub mod hg;
pub mod isotropic;
