//! # Camera State Management
//!
//! This module handles the player's view:
//! - Camera orientation from mouse look
//! - Following the player body's eye position
//! - The camera transform handed to the renderer each frame

use cgmath::{Point3, Rad};

use super::physics::HorizontalBasis;
use super::render::CameraTransform;

pub mod camera;

/// The camera plus the look sensitivity applied to mouse movement.
///
/// # Fields
/// - `camera`: The current camera state (position, orientation)
/// - `sensitivity`: Radians of rotation per pixel of mouse movement
#[derive(Debug)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: camera::Camera,
    /// Radians of rotation per pixel of mouse movement
    sensitivity: f32,
}

impl CameraState {
    /// Creates a level camera at `position` looking down negative Z.
    pub fn new(position: Point3<f32>, sensitivity: f32) -> Self {
        CameraState {
            camera: camera::Camera::new(position, Rad(0.0), Rad(0.0)),
            sensitivity,
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    /// Applies a mouse movement, if any, scaled by the current sensitivity.
    pub fn intake_look(&mut self, delta: Option<(f64, f64)>) {
        if let Some(delta) = delta {
            self.camera.look(delta, self.sensitivity);
        }
    }

    /// Moves the camera to the player's eye.
    pub fn follow(&mut self, eye: Point3<f32>) {
        self.camera.position = eye;
    }

    pub fn horizontal_basis(&self) -> HorizontalBasis {
        self.camera.horizontal_basis()
    }

    pub fn transform(&self) -> CameraTransform {
        self.camera.transform()
    }
}
