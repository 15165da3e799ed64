//! Static descriptors for the bodies in the scene.
//!
//! The fixed planets, the sun and the candidate share one record type so the
//! animator and the renderer can treat them uniformly.

/// Ring around a body, textured with a radial alpha strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingDescriptor {
    pub texture: &'static str,
    /// Outer radius in scene units. The inner edge sits at `INNER_FRACTION * size`.
    pub size: f64,
}

impl RingDescriptor {
    pub const INNER_FRACTION: f64 = 0.6;

    pub fn inner_radius(&self) -> f64 {
        self.size * Self::INNER_FRACTION
    }

    pub fn outer_radius(&self) -> f64 {
        self.size
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialBodyDescriptor {
    pub name: &'static str,
    pub texture: &'static str,
    pub size: f64,
    pub distance: f64,
    pub speed: f64,
    pub ring: Option<RingDescriptor>,
    /// Flat color used while the texture is loading or when it failed to load.
    pub fallback_color: [u8; 3],
}

impl CelestialBodyDescriptor {
    const fn planet(
        name: &'static str,
        texture: &'static str,
        size: f64,
        distance: f64,
        speed: f64,
        fallback_color: [u8; 3],
    ) -> Self {
        Self { name, texture, size, distance, speed, ring: None, fallback_color }
    }

    pub fn is_orbiting(&self) -> bool {
        self.distance > 0.0
    }
}

pub const SUN: CelestialBodyDescriptor = CelestialBodyDescriptor {
    name: "Sun",
    texture: "sun.jpg",
    size: 3.0,
    distance: 0.0,
    speed: 0.0,
    ring: None,
    fallback_color: [255, 196, 64],
};

pub const SOLAR_SYSTEM: [CelestialBodyDescriptor; 8] = [
    CelestialBodyDescriptor::planet("Mercury", "mercury.jpg", 0.38, 5.0, 0.04, [150, 140, 130]),
    CelestialBodyDescriptor::planet("Venus", "venus.jpg", 0.95, 7.0, 0.035, [220, 190, 140]),
    CelestialBodyDescriptor::planet("Earth", "earth.jpg", 1.0, 10.0, 0.03, [60, 110, 200]),
    CelestialBodyDescriptor::planet("Mars", "mars.jpg", 0.53, 13.0, 0.025, [190, 90, 50]),
    CelestialBodyDescriptor::planet("Jupiter", "jupiter.jpg", 4.0, 20.0, 0.02, [200, 170, 130]),
    CelestialBodyDescriptor {
        ring: Some(RingDescriptor { texture: "saturn_ring_alpha.png", size: 6.0 }),
        ..CelestialBodyDescriptor::planet("Saturn", "saturn.jpg", 3.5, 28.0, 0.015, [220, 200, 150])
    },
    CelestialBodyDescriptor::planet("Uranus", "uranus.jpg", 2.0, 35.0, 0.01, [150, 210, 220]),
    CelestialBodyDescriptor::planet("Neptune", "neptune.jpg", 1.9, 40.0, 0.005, [70, 100, 210]),
];

pub const CANDIDATE_NAME: &str = "Candidate";
pub const CANDIDATE_TEXTURE: &str = "moon.jpg";
pub const CANDIDATE_DISTANCE: f64 = 50.0;
pub const CANDIDATE_SPEED: f64 = 0.02;
/// The candidate is drawn slightly larger than its radius so it stands out.
pub const CANDIDATE_SCALE: f64 = 1.2;

/// Descriptor for the candidate at a given planetary radius (Earth radii).
pub fn candidate_descriptor(radius_earths: f64) -> CelestialBodyDescriptor {
    CelestialBodyDescriptor {
        name: CANDIDATE_NAME,
        texture: CANDIDATE_TEXTURE,
        size: radius_earths * CANDIDATE_SCALE,
        distance: CANDIDATE_DISTANCE,
        speed: CANDIDATE_SPEED,
        ring: None,
        fallback_color: [170, 170, 170],
    }
}

/// Every texture file the scene may request, without duplicates.
pub fn texture_files() -> Vec<&'static str> {
    let mut files = vec![SUN.texture, CANDIDATE_TEXTURE];
    for body in &SOLAR_SYSTEM {
        files.push(body.texture);
        if let Some(ring) = body.ring {
            files.push(ring.texture);
        }
    }
    let mut seen = std::collections::HashSet::new();
    files.retain(|f| seen.insert(*f));
    files
}
