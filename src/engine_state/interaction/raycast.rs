//! Voxel ray traversal.
//!
//! Rays are walked cell by cell through the block grid (Amanatides & Woo), so a pick visits
//! only the voxels the ray actually crosses and always finds the nearest one.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::BlockRecord;
use crate::engine_state::voxels::coords::{VoxelCoord, BLOCK_SIZE};
use crate::engine_state::voxels::world::World;

/// A half-line in world space with a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

/// The first block a ray runs into.
#[derive(Clone, Debug, PartialEq)]
pub struct RayHit {
    pub coord: VoxelCoord,
    /// The face the ray entered through.
    pub face: BlockSide,
    /// World-space distance from the ray origin to the entry point.
    pub distance: f32,
    pub record: BlockRecord,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// # Returns
    /// `None` if `direction` has no length.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let length = direction.magnitude();
        if length <= f32::EPSILON || !length.is_finite() {
            return None;
        }
        Some(Ray {
            origin,
            direction: direction / length,
        })
    }

    /// Finds the nearest occupied voxel within `max_distance` world units.
    ///
    /// The voxel containing the origin is never reported: a camera inside a block picks
    /// the first block beyond it.
    pub fn cast(&self, world: &World, max_distance: f32) -> Option<RayHit> {
        // Block space: voxel `i` spans `[i, i + 1)` on each axis.
        let origin = Point3::new(
            self.origin.x / BLOCK_SIZE + 0.5,
            self.origin.y / BLOCK_SIZE + 0.5,
            self.origin.z / BLOCK_SIZE + 0.5,
        );
        let max_t = max_distance / BLOCK_SIZE;

        let mut cell = [
            origin.x.floor() as i32,
            origin.y.floor() as i32,
            origin.z.floor() as i32,
        ];
        let mut step = [0i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];

        for axis in 0..3 {
            let d = self.direction[axis];
            let o = origin[axis];
            if d > 0.0 {
                step[axis] = 1;
                t_max[axis] = (cell[axis] as f32 + 1.0 - o) / d;
                t_delta[axis] = 1.0 / d;
            } else if d < 0.0 {
                step[axis] = -1;
                t_max[axis] = (o - cell[axis] as f32) / -d;
                t_delta[axis] = -1.0 / d;
            }
        }

        loop {
            let axis = (0..3)
                .min_by(|&a, &b| t_max[a].total_cmp(&t_max[b]))
                .unwrap_or(0);
            let t = t_max[axis];
            if t > max_t {
                return None;
            }

            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];

            let coord = VoxelCoord::new(cell[0], cell[1], cell[2]);
            if let Some(record) = world.get(coord) {
                return Some(RayHit {
                    coord,
                    face: BlockSide::from_axis(axis, step[axis] < 0),
                    distance: t * BLOCK_SIZE,
                    record: record.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::terrain::{WorldDescriptor, WorldType};
    use approx::assert_relative_eq;

    fn world_with(blocks: &[(i32, i32, i32)]) -> World {
        let mut world = World::new(WorldDescriptor {
            seed: 0,
            world_type: WorldType::DEFAULT,
        });
        for &(x, y, z) in blocks {
            world.insert(VoxelCoord::new(x, y, z), BlockRecord::natural(BlockType::DIRT));
        }
        world
    }

    #[test]
    fn hits_the_nearest_block_and_its_entry_face() {
        let world = world_with(&[(0, 0, -2), (0, 0, -4)]);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();

        let hit = ray.cast(&world, 60.0).expect("ray should hit");

        assert_eq!(hit.coord, VoxelCoord::new(0, 0, -2));
        assert_eq!(hit.face, BlockSide::FRONT);
        assert_relative_eq!(hit.distance, 15.0, epsilon = 1e-4);
    }

    #[test]
    fn looking_down_hits_the_top_face() {
        let world = world_with(&[(1, 0, 1)]);
        let ray = Ray::new(Point3::new(10.0, 23.0, 10.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();

        let hit = ray.cast(&world, 60.0).expect("ray should hit");

        assert_eq!(hit.face, BlockSide::TOP);
        assert_relative_eq!(hit.distance, 18.0, epsilon = 1e-4);
    }

    #[test]
    fn blocks_beyond_range_are_missed() {
        let world = world_with(&[(0, 0, -7)]);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();

        assert!(ray.cast(&world, 60.0).is_none());
        assert!(ray.cast(&world, 70.0).is_some());
    }

    #[test]
    fn diagonal_rays_do_not_skip_cells() {
        let world = world_with(&[(1, 0, 0)]);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.2)).unwrap();

        let hit = ray.cast(&world, 60.0).expect("ray should hit");

        assert_eq!(hit.coord, VoxelCoord::new(1, 0, 0));
        assert_eq!(hit.face, BlockSide::LEFT);
    }

    #[test]
    fn origin_voxel_is_skipped() {
        let world = world_with(&[(0, 0, 0), (0, 0, -1)]);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();

        assert_eq!(ray.cast(&world, 60.0).map(|hit| hit.coord), Some(VoxelCoord::new(0, 0, -1)));
    }

    #[test]
    fn zero_direction_is_not_a_ray() {
        assert!(Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)).is_none());
    }
}
