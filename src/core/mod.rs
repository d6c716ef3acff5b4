// Copyright @yucwang 2021

pub mod computation_node;
pub mod emitter;
pub mod integrator;
pub mod interaction;
pub mod medium;
pub mod packet;
pub mod phase;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod volume;
