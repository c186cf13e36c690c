//! Engine configuration.
//!
//! Every field has a default matching the shipped game feel, so an empty JSON object is a
//! complete configuration. Distances are in world units (`BLOCK_SIZE` per block), times in
//! seconds.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunables of the player body simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration.
    pub gravity: f32,
    /// Exponential horizontal damping rate while standing on a block.
    pub ground_damping: f32,
    /// Exponential horizontal damping rate while airborne.
    pub air_damping: f32,
    /// Acceleration from movement input while grounded.
    pub ground_speed: f32,
    /// Acceleration from movement input while airborne.
    pub air_speed: f32,
    /// Vertical velocity set by a jump.
    pub jump_velocity: f32,
    /// Falling below this height respawns the player.
    pub respawn_floor: f32,
    /// Half the width of the player's bounding box on X and Z.
    pub player_half_width: f32,
    /// Distance from the eye down to the feet.
    pub player_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: 500.0,
            ground_damping: 10.0,
            air_damping: 2.0,
            ground_speed: 2000.0,
            air_speed: 500.0,
            jump_velocity: 160.0,
            respawn_floor: -150.0,
            player_half_width: 3.0,
            player_height: 18.0,
        }
    }
}

/// What the sync channel does when a remote record is deleted outright.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetractionPolicy {
    /// Remove the voxel and leave empty space, even where the generator had a block.
    #[default]
    LeaveHole,
    /// Remove the voxel, then put back whatever the generator produced there.
    RestoreNatural,
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    /// Eye position at session start.
    pub spawn_point: [f32; 3],
    /// Eye position after falling out of the world.
    pub respawn_point: [f32; 3],
    /// Maximum distance of a block pick.
    pub pick_range: f32,
    /// Radians of camera rotation per pixel of mouse movement.
    pub sensitivity: f32,
    /// Worlds are generated over `-half..half` columns on X and Z.
    pub world_half_extent: i32,
    /// Frame deltas are clamped to this many seconds.
    pub max_frame_delta: f32,
    pub retraction: RetractionPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            physics: PhysicsConfig::default(),
            spawn_point: [0.0, 80.0, 0.0],
            respawn_point: [0.0, 100.0, 0.0],
            pick_range: 60.0,
            sensitivity: 0.002,
            world_half_extent: 64,
            max_frame_delta: 0.1,
            retraction: RetractionPolicy::LeaveHole,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no session can run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.world_half_extent < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "world_half_extent must not be negative, got {}",
                self.world_half_extent
            )));
        }
        if self.max_frame_delta.is_nan() || self.max_frame_delta <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "max_frame_delta must be positive, got {}",
                self.max_frame_delta
            )));
        }
        if self.pick_range.is_nan() || self.pick_range < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "pick_range must not be negative, got {}",
                self.pick_range
            )));
        }
        Ok(())
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
