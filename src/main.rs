// Copyright 2020 TwoCookingMice

use deltaflight::core::computation_node::ComputationNode;
use deltaflight::core::interaction::SurfaceIntersection;
use deltaflight::core::medium::Medium;
use deltaflight::core::scene_loader::load_scene;
use deltaflight::integrators::delta_tracking::DeltaTrackingIntegrator;
use deltaflight::math::constants::{Float, Vector3f};
use deltaflight::math::ray::Ray3f;
use deltaflight::renderers::parallel::ParallelEstimator;

use std::env;
use std::process;

fn parse_vec3_arg(value: Option<&String>) -> Option<Vector3f> {
    let parts: Vec<Float> = value?
        .split(',')
        .map(|s| s.trim().parse::<Float>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() == 3 {
        Some(Vector3f::new(parts[0], parts[1], parts[2]))
    } else {
        None
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <scene.xml> <medium-id> [--samples N] [--seed N] [--origin x,y,z] [--dir x,y,z] \
               [--threads N] [--max-null N]", program);
    process::exit(1);
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let medium_id = &args[2];
    let mut samples: usize = 100_000;
    let mut seed: u64 = 0;
    let mut origin = Vector3f::zeros();
    let mut dir = Vector3f::new(0.0, 0.0, 1.0);
    let mut threads: Option<usize> = None;
    let mut max_null_collisions: Option<u32> = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                samples = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(samples);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            }
            "--origin" => {
                i += 1;
                origin = parse_vec3_arg(args.get(i)).unwrap_or_else(|| usage(&args[0]));
            }
            "--dir" => {
                i += 1;
                dir = parse_vec3_arg(args.get(i)).unwrap_or_else(|| usage(&args[0]));
            }
            "--threads" => {
                i += 1;
                threads = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            "--max-null" => {
                i += 1;
                max_null_collisions = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            other => log::warn!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    if dir.norm() <= 0.0 {
        log::error!("Ray direction must be non-zero.");
        process::exit(1);
    }

    let scene = match load_scene(input_path) {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("Failed to load {}: {}", input_path, err);
            process::exit(1);
        }
    };

    let medium = match scene.medium(medium_id) {
        Some(medium) => medium,
        None => {
            log::error!("No medium '{}' in scene; available: {:?}", medium_id, scene.medium_ids());
            process::exit(1);
        }
    };
    log::info!("{}", medium.to_string());

    let ray = Ray3f::new(origin, dir.normalize(), None, None);
    let si = SurfaceIntersection::none();

    let exit = medium.segment_interaction(&ray);
    if !exit.is_active() {
        println!("ray misses medium '{}'", medium_id);
        return;
    }
    let (majorant_tr, _) = medium.transmittance_eval_pdf(&exit, &si, true);

    let integrator = match max_null_collisions {
        Some(n) => DeltaTrackingIntegrator::new(n),
        None => DeltaTrackingIntegrator::default(),
    };
    let mut estimator = ParallelEstimator::new(Box::new(integrator), seed);
    if let Some(n) = threads {
        estimator = estimator.with_threads(n);
    }

    let estimate = estimator.estimate(medium.as_ref(), &ray, &si, samples);
    println!("segment:              [{}, {}]", exit.mint, exit.maxt);
    println!("transmittance:        {:.6} {:.6} {:.6}", estimate.mean[0], estimate.mean[1], estimate.mean[2]);
    println!("std. error:           {:.6} {:.6} {:.6}",
             estimate.std_error[0], estimate.std_error[1], estimate.std_error[2]);
    println!("majorant transmittance: {:.6} {:.6} {:.6}", majorant_tr[0], majorant_tr[1], majorant_tr[2]);
    println!("events:               {} escaped, {} scattered, {} terminated",
             estimate.escaped, estimate.scattered, estimate.terminated);
}
