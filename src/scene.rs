//! Retained scene: the sun, the fixed planets and the candidate mounted on an
//! orbit animator, plus the starfield and the camera.

use crate::candidate::{stellar_tint, CandidateParameters, StellarTint};
use crate::celestial::{candidate_descriptor, CelestialBodyDescriptor, SOLAR_SYSTEM, SUN};
use crate::config::SceneConfig;
use crate::math::OrbitCamera;
use crate::orbit::{BodyTransform, OrbitAnimator};
use crate::starfield::{self, Star};
use nalgebra::Vector3;

/// Labels float this far above a body's surface.
pub const LABEL_CLEARANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Sun,
    Planet,
    Candidate,
}

#[derive(Clone, Debug)]
pub struct SceneBody {
    pub descriptor: CelestialBodyDescriptor,
    pub kind: BodyKind,
    slot: usize,
}

impl SceneBody {
    /// The sun is emissive and never shaded.
    pub fn is_lit(&self) -> bool {
        self.kind != BodyKind::Sun
    }
}

pub struct Scene {
    bodies: Vec<SceneBody>,
    animator: OrbitAnimator,
    candidate_radius: f64,
    candidate_tint: StellarTint,
    pub stars: Vec<Star>,
    /// Inner and outer radius of the star shell.
    pub star_shell: (f64, f64),
    pub camera: OrbitCamera,
}

impl Scene {
    pub fn new(config: &SceneConfig, params: &CandidateParameters) -> Self {
        let mut animator = OrbitAnimator::new(config.spin_step);
        let mut bodies = Vec::with_capacity(SOLAR_SYSTEM.len() + 2);
        let mut mount = |descriptor: CelestialBodyDescriptor, kind: BodyKind| {
            let slot = animator.mount(descriptor.distance, descriptor.speed);
            bodies.push(SceneBody { descriptor, kind, slot });
        };
        mount(SUN, BodyKind::Sun);
        for planet in SOLAR_SYSTEM {
            mount(planet, BodyKind::Planet);
        }
        mount(candidate_descriptor(params.planetary_radius_earth_radii), BodyKind::Candidate);

        log::debug!("scene mounted {} bodies", bodies.len());
        Self {
            bodies,
            animator,
            candidate_radius: params.planetary_radius_earth_radii,
            candidate_tint: stellar_tint(params.stellar_temp_k),
            stars: starfield::generate(config.star_count, config.star_radius, config.star_depth, config.star_seed),
            star_shell: (config.star_radius, config.star_radius + config.star_depth),
            camera: OrbitCamera::default(),
        }
    }

    pub fn tick(&mut self, t: f64) {
        self.animator.tick(t);
    }

    pub fn bodies(&self) -> &[SceneBody] {
        &self.bodies
    }

    pub fn transform(&self, body: &SceneBody) -> BodyTransform {
        self.animator.transform(body.slot).copied().unwrap_or_default()
    }

    /// World-space anchor for the body's name label. The candidate's label
    /// clears its unscaled radius.
    pub fn label_anchor(&self, body: &SceneBody) -> Vector3<f64> {
        let height = match body.kind {
            BodyKind::Candidate => self.candidate_radius,
            BodyKind::Sun | BodyKind::Planet => body.descriptor.size,
        };
        self.transform(body).position + Vector3::new(0.0, height + LABEL_CLEARANCE, 0.0)
    }

    pub fn candidate_tint(&self) -> StellarTint {
        self.candidate_tint
    }

    /// Radii of the circular orbit paths, one per orbiting body.
    pub fn orbit_paths(&self) -> impl Iterator<Item = (&SceneBody, f64)> {
        self.bodies
            .iter()
            .filter(|b| b.descriptor.is_orbiting())
            .map(|b| (b, b.descriptor.distance))
    }

    /// Bring the candidate node in line with `params`.
    ///
    /// Only the radius and the stellar temperature affect the scene. Returns
    /// `true` when the node changed.
    pub fn sync_candidate(&mut self, params: &CandidateParameters) -> bool {
        let radius = params.planetary_radius_earth_radii;
        let tint = stellar_tint(params.stellar_temp_k);
        if radius == self.candidate_radius && tint == self.candidate_tint {
            return false;
        }
        if let Some(body) = self.bodies.iter_mut().find(|b| b.kind == BodyKind::Candidate) {
            body.descriptor = candidate_descriptor(radius);
        }
        if tint != self.candidate_tint {
            log::debug!("candidate tint {} -> {}", self.candidate_tint.label(), tint.label());
        }
        self.candidate_radius = radius;
        self.candidate_tint = tint;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateParam;
    use crate::celestial::{CANDIDATE_DISTANCE, CANDIDATE_SCALE};
    use approx::assert_relative_eq;

    fn candidate(scene: &Scene) -> &SceneBody {
        scene.bodies().iter().find(|b| b.kind == BodyKind::Candidate).unwrap()
    }

    fn scene() -> Scene {
        let config = SceneConfig { star_count: 10, ..SceneConfig::default() };
        Scene::new(&config, &CandidateParameters::default())
    }

    #[test]
    fn mounts_sun_planets_and_candidate() {
        let scene = scene();
        assert_eq!(scene.bodies().len(), 10);
        assert_eq!(scene.bodies()[0].kind, BodyKind::Sun);
        assert!(!scene.bodies()[0].is_lit());
        assert_eq!(scene.bodies().iter().filter(|b| b.kind == BodyKind::Planet).count(), 8);
        assert_eq!(candidate(&scene).descriptor.distance, CANDIDATE_DISTANCE);
        assert_eq!(scene.stars.len(), 10);
    }

    #[test]
    fn orbit_paths_skip_the_sun() {
        let scene = scene();
        let radii: Vec<f64> = scene.orbit_paths().map(|(_, r)| r).collect();
        assert_eq!(radii.len(), 9);
        assert!(!radii.contains(&0.0));
    }

    #[test]
    fn tick_moves_bodies_along_their_orbits() {
        let mut scene = scene();
        scene.tick(40.0);
        for body in scene.bodies() {
            let p = scene.transform(body).position;
            assert_relative_eq!(p.norm(), body.descriptor.distance, epsilon = 1e-9);
        }
    }

    #[test]
    fn label_sits_above_the_body() {
        let scene = scene();
        let earth = &scene.bodies()[3];
        assert_eq!(earth.descriptor.name, "Earth");
        let anchor = scene.label_anchor(earth);
        assert_relative_eq!(anchor.y, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn candidate_label_clears_the_unscaled_radius() {
        let mut scene = scene();
        let mut params = CandidateParameters::default();
        params.set(CandidateParam::PlanetaryRadius, 2.0);
        assert!(scene.sync_candidate(&params));
        let anchor = scene.label_anchor(candidate(&scene));
        assert_relative_eq!(anchor.y, 2.0 + LABEL_CLEARANCE, epsilon = 1e-12);
    }

    #[test]
    fn sync_updates_radius_and_tint_only_on_change() {
        let mut scene = scene();
        let mut params = CandidateParameters::default();
        assert!(!scene.sync_candidate(&params));

        params.set(CandidateParam::PlanetaryRadius, 3.0);
        assert!(scene.sync_candidate(&params));
        assert_relative_eq!(candidate(&scene).descriptor.size, 3.0 * CANDIDATE_SCALE, epsilon = 1e-12);

        params.set(CandidateParam::StellarTemp, 3000.0);
        assert!(scene.sync_candidate(&params));
        assert_eq!(scene.candidate_tint(), StellarTint::Cool);

        // Within the same band the tint is unchanged.
        params.set(CandidateParam::StellarTemp, 2900.0);
        assert!(!scene.sync_candidate(&params));
    }

    #[test]
    fn parameters_outside_the_scene_do_not_trigger_a_sync() {
        let mut scene = scene();
        let mut params = CandidateParameters::default();
        params.set(CandidateParam::OrbitalPeriod, 12.0);
        params.set(CandidateParam::TransitDuration, 6.0);
        assert!(!scene.sync_candidate(&params));
    }
}
