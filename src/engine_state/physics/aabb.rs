//! Axis-aligned bounding boxes for player and voxel collision.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::coords::{VoxelCoord, BLOCK_HALF_EXTENT};

/// An axis-aligned box in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Aabb { min, max }
    }

    pub fn from_center_half_extents(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        Aabb {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// The player's box: `half_width` around the eye on X and Z, from `height` below the eye
    /// up to the eye.
    pub fn player(eye: Point3<f32>, half_width: f32, height: f32) -> Self {
        Aabb {
            min: Point3::new(eye.x - half_width, eye.y - height, eye.z - half_width),
            max: Point3::new(eye.x + half_width, eye.y, eye.z + half_width),
        }
    }

    /// The cube occupied by the voxel at `coord`.
    pub fn voxel(coord: VoxelCoord) -> Self {
        let half = BLOCK_HALF_EXTENT;
        Self::from_center_half_extents(coord.center(), Vector3::new(half, half, half))
    }

    /// Whether the two boxes overlap with positive volume.
    ///
    /// Boxes that only touch on a face do not intersect, so a player standing exactly on a
    /// block is not colliding with it.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// The voxels whose cubes may overlap this box.
    pub fn voxel_range(&self) -> (VoxelCoord, VoxelCoord) {
        (VoxelCoord::containing(self.min), VoxelCoord::containing(self.max))
    }
}
