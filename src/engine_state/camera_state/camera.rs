//! # Camera Implementation
//!
//! A first-person camera described by yaw and pitch. At zero yaw and pitch it looks down
//! negative Z with +Y up; positive yaw turns left, positive pitch looks up.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

use crate::engine_state::physics::HorizontalBasis;
use crate::engine_state::render::CameraTransform;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
///
/// # Fields
/// - `position`: The camera's position in world space
/// - `yaw`: Horizontal rotation (around Y axis) in radians
/// - `pitch`: Vertical rotation (around X axis) in radians
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space.
    /// * `yaw` - Initial yaw (horizontal rotation around Y axis).
    /// * `pitch` - Initial pitch, clamped to just short of straight up or down.
    ///
    /// # Returns
    /// A new `Camera` instance with the specified position and orientation.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Gets the camera's forward direction vector.
    ///
    /// # Returns
    /// A normalized 3D vector representing the camera's forward direction
    pub fn get_view_vec(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(-yaw_sin * pitch_cos, pitch_sin, -yaw_cos * pitch_cos).normalize()
    }

    /// The forward and right vectors with pitch ignored, for walking.
    pub fn horizontal_basis(&self) -> HorizontalBasis {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        HorizontalBasis {
            forward: Vector3::new(-yaw_sin, 0.0, -yaw_cos),
            right: Vector3::new(yaw_cos, 0.0, -yaw_sin),
        }
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 view matrix that can be used for rendering
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.get_view_vec(), Vector3::unit_y())
    }

    /// Rotates the camera by a mouse movement.
    ///
    /// # Arguments
    /// * `delta` - Mouse movement in pixels, `(x, y)` with +y pointing down the screen
    /// * `sensitivity` - Radians per pixel
    pub fn look(&mut self, delta: (f64, f64), sensitivity: f32) {
        self.yaw -= Rad(delta.0 as f32 * sensitivity);
        self.pitch -= Rad(delta.1 as f32 * sensitivity);
        self.clamp_pitch();
    }

    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            position: self.position,
            forward: self.get_view_vec(),
            view: self.calc_matrix(),
        }
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let forward = camera.get_view_vec();
        let basis = camera.horizontal_basis();

        assert_relative_eq!(forward.z, -1.0);
        assert_relative_eq!(forward.x, 0.0);
        assert_relative_eq!(basis.right.x, 1.0);
        assert_relative_eq!(basis.right.z, 0.0);
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.look((0.0, -10_000.0), 0.002);

        assert!(camera.pitch.0 < FRAC_PI_2);
        assert!(camera.get_view_vec().y > 0.999);
        assert!(camera.calc_matrix().x.x.is_finite());
    }

    #[test]
    fn horizontal_basis_ignores_pitch() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(90.0), Deg(0.0));
        camera.look((0.0, -300.0), 0.002);
        let basis = camera.horizontal_basis();

        assert_relative_eq!(basis.forward.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(basis.forward.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(basis.forward.dot(basis.right), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn moving_the_mouse_right_turns_right() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.look((100.0, 0.0), 0.002);
        assert!(camera.get_view_vec().x > 0.0);
    }
}
