// Copyright @yucwang 2021

#![allow(dead_code)]

pub extern crate nalgebra as na;

pub mod core;
pub mod emitters;
pub mod integrators;
pub mod math;
pub mod media;
pub mod phases;
pub mod renderers;
pub mod volumes;
