//! Camera rotation and perspective projection.
//!
//! The camera orbits the origin. `rotation` maps world coordinates into view
//! space, where the camera sits on the +Z axis at `distance` and looks back
//! toward the origin.

use nalgebra::{Matrix3, Vector3};

pub const DEFAULT_FOV_DEG: f64 = 45.0;
pub const MIN_DISTANCE: f64 = 5.0;
pub const MAX_DISTANCE: f64 = 180.0;
const NEAR_PLANE: f64 = 0.1;

/// Initial camera position in world space.
pub const HOME_POSITION: [f64; 3] = [0.0, 20.0, 50.0];

pub fn rotation_from_drag(dx: f64, dy: f64) -> Matrix3<f64> {
    let rot_y = Matrix3::new(
        dx.cos(), 0.0, dx.sin(),
        0.0, 1.0, 0.0,
        -dx.sin(), 0.0, dx.cos(),
    );
    let rot_x = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, dy.cos(), -dy.sin(),
        0.0, dy.sin(), dy.cos(),
    );
    rot_x * rot_y
}

/// Rotation about the Y axis, used for body spin.
pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    rotation_from_drag(angle, 0.0)
}

/// A point after projection. `x`/`y` are in view units where the visible
/// half-height is 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Distance in front of the camera along the view axis.
    pub depth: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub rotation: Matrix3<f64>,
    pub distance: f64,
    pub fov_deg: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let [_, y, z] = HOME_POSITION;
        Self {
            rotation: rotation_from_drag(0.0, y.atan2(z)),
            distance: (y * y + z * z).sqrt(),
            fov_deg: DEFAULT_FOV_DEG,
        }
    }
}

impl OrbitCamera {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_view(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p
    }

    fn focal_scale(&self) -> f64 {
        1.0 / (self.fov_deg.to_radians() / 2.0).tan()
    }

    /// Project a world point. Returns `None` for points at or behind the
    /// near plane.
    pub fn project(&self, p: &Vector3<f64>) -> Option<Projected> {
        let v = self.to_view(p);
        let depth = self.distance - v.z;
        if depth <= NEAR_PLANE {
            return None;
        }
        let f = self.focal_scale();
        Some(Projected { x: v.x * f / depth, y: v.y * f / depth, depth })
    }

    /// On-screen radius of a sphere of `radius` at `depth`, in view units.
    pub fn projected_radius(&self, radius: f64, depth: f64) -> f64 {
        radius * self.focal_scale() / depth.max(NEAR_PLANE)
    }

    pub fn orbit(&mut self, dx: f64, dy: f64) {
        self.rotation = rotation_from_drag(dx, dy) * self.rotation;
    }

    /// Scroll zoom: `factor > 1` moves the camera closer.
    pub fn zoom(&mut self, factor: f64) {
        if factor > 0.0 && factor.is_finite() {
            self.distance = (self.distance / factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn position(camera: &OrbitCamera) -> Vector3<f64> {
        camera.rotation.transpose() * Vector3::new(0.0, 0.0, camera.distance)
    }

    #[test]
    fn home_pose_sits_at_the_initial_position() {
        let camera = OrbitCamera::default();
        let pos = position(&camera);
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pos.y, 20.0, epsilon = 1e-9);
        assert_relative_eq!(pos.z, 50.0, epsilon = 1e-9);
        assert_relative_eq!(camera.distance, 2900f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn target_projects_to_the_center() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.7, -0.3);
        let p = camera.project(&Vector3::zeros()).unwrap();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.depth, camera.distance, epsilon = 1e-12);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let camera = OrbitCamera::default();
        let eye = position(&camera);
        assert!(camera.project(&(eye * 2.0)).is_none());
        assert!(camera.project(&eye).is_none());
    }

    #[test]
    fn point_at_the_fov_edge_lands_on_the_view_edge() {
        let camera = OrbitCamera { rotation: Matrix3::identity(), distance: 10.0, fov_deg: 90.0 };
        // 45 degrees off axis at depth 10 is 10 units up.
        let p = camera.project(&Vector3::new(0.0, 10.0, 0.0)).unwrap();
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(camera.projected_radius(10.0, 10.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(1e-6);
        assert_eq!(camera.distance, MAX_DISTANCE);
        camera.zoom(0.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn reset_restores_the_home_pose() {
        let mut camera = OrbitCamera::default();
        camera.orbit(1.0, 0.5);
        camera.zoom(2.0);
        camera.reset();
        assert_eq!(camera, OrbitCamera::default());
    }
}
