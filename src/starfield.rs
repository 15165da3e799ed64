//! Background starfield on a spherical shell around the scene.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Size multiplier applied to every star.
pub const STAR_SIZE_FACTOR: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position: Vector3<f64>,
    /// Grey level in `[0.5, 1]`; stars are never tinted.
    pub brightness: f64,
    /// Base point size before perspective, in `[0.5, 1] * STAR_SIZE_FACTOR`.
    pub size: f64,
}

/// Scatter `count` stars uniformly over directions at distances in
/// `[radius, radius + depth]`. The same seed always yields the same field.
pub fn generate(count: usize, radius: f64, depth: f64, seed: u64) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let z: f64 = rng.gen_range(-1.0..=1.0);
            let phi: f64 = rng.gen_range(0.0..TAU);
            let ring = (1.0 - z * z).sqrt();
            let r = radius + depth * rng.gen::<f64>();
            Star {
                position: Vector3::new(ring * phi.cos(), z, ring * phi.sin()) * r,
                brightness: 0.5 + 0.5 * rng.gen::<f64>(),
                size: (0.5 + 0.5 * rng.gen::<f64>()) * STAR_SIZE_FACTOR,
            }
        })
        .collect()
}

/// Opacity falling off linearly from 1 at `near` to 0.2 at `far`.
pub fn fade_alpha(distance: f64, near: f64, far: f64) -> f64 {
    if far <= near {
        return 1.0;
    }
    let t = ((distance - near) / (far - near)).clamp(0.0, 1.0);
    1.0 - 0.8 * t
}
