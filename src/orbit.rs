//! Per-frame orbital motion.
//!
//! Positions are a pure function of elapsed time. Spin is accumulated: each
//! call to [`OrbitAnimator::tick`] adds a fixed step regardless of how much
//! time passed, so spin speed follows the frame rate.

use nalgebra::Vector3;
use std::f64::consts::TAU;

/// Spin added to every body on each rendered frame, in radians.
pub const DEFAULT_SPIN_STEP: f64 = 0.005;

/// Position on a circular orbit in the XZ plane centered at the origin.
pub fn orbit_position(distance: f64, speed: f64, t: f64) -> Vector3<f64> {
    let angle = speed * t;
    Vector3::new(distance * angle.cos(), 0.0, distance * angle.sin())
}

/// Mutable transform target the animator writes into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTransform {
    pub position: Vector3<f64>,
    /// Rotation about the body's own Y axis, kept in `[0, 2π)`.
    pub spin: f64,
}

impl Default for BodyTransform {
    fn default() -> Self {
        Self { position: Vector3::zeros(), spin: 0.0 }
    }
}

#[derive(Clone, Copy, Debug)]
struct Track {
    distance: f64,
    speed: f64,
}

pub struct OrbitAnimator {
    tracks: Vec<Track>,
    transforms: Vec<BodyTransform>,
    spin_step: f64,
}

impl OrbitAnimator {
    pub fn new(spin_step: f64) -> Self {
        Self { tracks: Vec::new(), transforms: Vec::new(), spin_step }
    }

    /// Mount a body and return the index of its transform.
    pub fn mount(&mut self, distance: f64, speed: f64) -> usize {
        self.tracks.push(Track { distance, speed });
        self.transforms.push(BodyTransform {
            position: orbit_position(distance, speed, 0.0),
            spin: 0.0,
        });
        self.transforms.len() - 1
    }

    pub fn transform(&self, index: usize) -> Option<&BodyTransform> {
        self.transforms.get(index)
    }

    /// Advance every mounted body to elapsed time `t` (seconds).
    pub fn tick(&mut self, t: f64) {
        for (track, transform) in self.tracks.iter().zip(self.transforms.iter_mut()) {
            transform.position = orbit_position(track.distance, track.speed, t);
            transform.spin = (transform.spin + self.spin_step).rem_euclid(TAU);
        }
    }
}
