//! # Voxel Coordinates
//!
//! Voxels are addressed by an integer triple in block units. World space is scaled by
//! `BLOCK_SIZE`: the voxel `(x, y, z)` is a cube of edge `BLOCK_SIZE` centered on
//! `(x, y, z) * BLOCK_SIZE`.
//!
//! Remote mutation records address voxels in integer world units (multiples of
//! `BLOCK_SIZE`) and are keyed by `"{x}_{y}_{z}"` in those units.

use cgmath::{Point3, Vector3};

use super::block::RecordId;

/// Edge length of one voxel in world units.
pub const BLOCK_SIZE: f32 = 10.0;
/// Half the edge length of one voxel in world units.
pub const BLOCK_HALF_EXTENT: f32 = BLOCK_SIZE / 2.0;
/// `BLOCK_SIZE` as used by the integer world units of remote records.
pub const BLOCK_SIZE_UNITS: i32 = 10;

/// Integer address of a voxel, in block units.
///
/// Used directly as the world store's map key: the derived `Hash`/`Eq` are over the
/// ordered triple, so distinct coordinates never collide.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        VoxelCoord { x, y, z }
    }

    /// The neighbouring coordinate `offset` blocks away.
    pub fn offset(self, offset: Vector3<i32>) -> Self {
        VoxelCoord::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }

    /// Center of this voxel in world space.
    pub fn center(self) -> Point3<f32> {
        Point3::new(
            self.x as f32 * BLOCK_SIZE,
            self.y as f32 * BLOCK_SIZE,
            self.z as f32 * BLOCK_SIZE,
        )
    }

    /// The voxel whose cube contains the world-space point `point`.
    ///
    /// Points on a shared face resolve to the voxel on the positive side.
    pub fn containing(point: Point3<f32>) -> Self {
        let to_block = |v: f32| (v / BLOCK_SIZE + 0.5).floor() as i32;
        VoxelCoord::new(to_block(point.x), to_block(point.y), to_block(point.z))
    }

    /// This coordinate in the integer world units used by remote records.
    pub fn world_units(self) -> [i32; 3] {
        [
            self.x * BLOCK_SIZE_UNITS,
            self.y * BLOCK_SIZE_UNITS,
            self.z * BLOCK_SIZE_UNITS,
        ]
    }

    /// Converts integer world units back into a coordinate.
    ///
    /// # Returns
    /// `None` if any component is not a multiple of `BLOCK_SIZE_UNITS`.
    pub fn from_world_units(x: i32, y: i32, z: i32) -> Option<Self> {
        let to_block = |v: i32| (v % BLOCK_SIZE_UNITS == 0).then_some(v / BLOCK_SIZE_UNITS);
        Some(VoxelCoord::new(to_block(x)?, to_block(y)?, to_block(z)?))
    }

    /// The remote record identifier derived from this coordinate.
    pub fn record_key(self) -> RecordId {
        let [x, y, z] = self.world_units();
        RecordId(format!("{x}_{y}_{z}"))
    }
}

impl From<Point3<i32>> for VoxelCoord {
    fn from(point: Point3<i32>) -> Self {
        VoxelCoord::new(point.x, point.y, point.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn record_key_uses_world_units() {
        assert_eq!(VoxelCoord::new(1, -2, 0).record_key().as_str(), "10_-20_0");
    }

    #[test]
    fn world_units_round_trip() {
        let coord = VoxelCoord::new(-7, 3, 12);
        let [x, y, z] = coord.world_units();
        assert_eq!(VoxelCoord::from_world_units(x, y, z), Some(coord));
    }

    #[test_case(5, 0, 0 ; "x off grid")]
    #[test_case(0, -15, 0 ; "negative y off grid")]
    #[test_case(0, 0, 1 ; "z off grid")]
    fn off_grid_world_units_are_rejected(x: i32, y: i32, z: i32) {
        assert_eq!(VoxelCoord::from_world_units(x, y, z), None);
    }

    #[test_case(0.0, 0 ; "center")]
    #[test_case(4.9, 0 ; "inside positive half")]
    #[test_case(-4.9, 0 ; "inside negative half")]
    #[test_case(5.0, 1 ; "shared face goes positive")]
    #[test_case(-5.1, -1 ; "next voxel down")]
    fn containing_maps_points_to_voxels(value: f32, expected: i32) {
        let coord = VoxelCoord::containing(Point3::new(value, value, value));
        assert_eq!(coord, VoxelCoord::new(expected, expected, expected));
    }
}
