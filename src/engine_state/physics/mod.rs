//! # Physics Module
//!
//! First-person player movement with discrete collision against the world store.
//!
//! ## Step
//!
//! Each call to `PlayerBody::step`:
//! 1. applies a pending jump
//! 2. damps horizontal velocity, harder on the ground than in the air
//! 3. applies gravity
//! 4. adds movement input along the camera's horizontal basis
//! 5. moves along X, then Z, then Y, undoing any single-axis move that ends inside a block
//!    and zeroing that axis's velocity
//! 6. respawns the player if they fell below the safety floor
//!
//! Collision only looks at the voxels overlapping the player's box, so the cost of a step
//! does not grow with the world.

pub mod aabb;

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use log::info;

use crate::config::PhysicsConfig;
use crate::engine_state::voxels::world::World;
use aabb::Aabb;

/// Movement keys held during a step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl MovementInput {
    /// The unit horizontal direction the keys ask for, or `None` if they cancel out.
    pub fn direction(&self, basis: &HorizontalBasis) -> Option<Vector3<f32>> {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        let wish = basis.forward * axis(self.forward, self.backward)
            + basis.right * axis(self.right, self.left);
        if wish.is_zero() {
            None
        } else {
            Some(wish.normalize())
        }
    }
}

/// The camera's forward and right vectors projected onto the horizontal plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HorizontalBasis {
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
}

/// What happened during one step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Whether the move along X, Y and Z was undone by a collision.
    pub collided: [bool; 3],
    pub respawned: bool,
}

/// The player's simulated body. Its position is the eye.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerBody {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub grounded: bool,
    pub can_jump: bool,
    respawn_point: Point3<f32>,
}

impl PlayerBody {
    /// A body at rest at `spawn`, which is also where it respawns.
    pub fn new(spawn: Point3<f32>) -> Self {
        PlayerBody {
            position: spawn,
            velocity: Vector3::zero(),
            grounded: false,
            can_jump: false,
            respawn_point: spawn,
        }
    }

    /// Respawns the body at `point` instead of its starting position.
    pub fn with_respawn_point(mut self, point: Point3<f32>) -> Self {
        self.respawn_point = point;
        self
    }

    pub fn respawn_point(&self) -> Point3<f32> {
        self.respawn_point
    }

    pub fn bounding_box(&self, config: &PhysicsConfig) -> Aabb {
        Aabb::player(self.position, config.player_half_width, config.player_height)
    }

    /// Puts the body back at its respawn point, at rest.
    pub fn respawn(&mut self) {
        self.position = self.respawn_point;
        self.velocity = Vector3::zero();
    }

    /// Whether the body's box overlaps any block of `world`.
    pub fn collides(&self, world: &World, config: &PhysicsConfig) -> bool {
        let body = self.bounding_box(config);
        let (min, max) = body.voxel_range();
        world
            .occupied_in(min, max)
            .any(|(coord, _)| Aabb::voxel(coord).intersects(&body))
    }

    /// Advances the body by `dt` seconds.
    ///
    /// # Arguments
    /// * `dt` - Step length in seconds
    /// * `input` - Movement keys held this step
    /// * `basis` - The camera's horizontal forward/right vectors
    /// * `world` - The blocks to collide with
    /// * `config` - Physics tunables
    pub fn step(
        &mut self,
        dt: f32,
        input: &MovementInput,
        basis: &HorizontalBasis,
        world: &World,
        config: &PhysicsConfig,
    ) -> StepReport {
        let mut report = StepReport::default();

        if input.jump && self.can_jump {
            self.velocity.y = config.jump_velocity;
            self.can_jump = false;
            self.grounded = false;
        }

        let damping_rate = if self.grounded {
            config.ground_damping
        } else {
            config.air_damping
        };
        let damping = (-damping_rate * dt).exp();
        self.velocity.x *= damping;
        self.velocity.z *= damping;
        self.velocity.y -= config.gravity * dt;

        if let Some(direction) = input.direction(basis) {
            let speed = if self.grounded {
                config.ground_speed
            } else {
                config.air_speed
            };
            self.velocity += direction * speed * dt;
        }

        // X, then Z, then Y
        for axis in [0, 2, 1] {
            if axis == 1 {
                self.grounded = false;
            }
            let delta = self.velocity[axis] * dt;
            self.position[axis] += delta;
            if self.collides(world, config) {
                self.position[axis] -= delta;
                if axis == 1 && self.velocity.y < 0.0 {
                    self.grounded = true;
                    self.can_jump = true;
                }
                self.velocity[axis] = 0.0;
                report.collided[axis] = true;
            }
        }

        if self.position.y < config.respawn_floor {
            info!(
                "Player fell below {} at ({:.1}, {:.1}, {:.1}), respawning",
                config.respawn_floor, self.position.x, self.position.y, self.position.z
            );
            self.respawn();
            report.respawned = true;
        }

        report
    }
}
