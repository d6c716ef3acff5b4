// Copyright @yucwang 2026

pub mod delta_tracking;
