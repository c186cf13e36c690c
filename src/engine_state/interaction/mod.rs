//! # Interaction Module
//!
//! Turns break and place intents into writes to the remote mutation log.
//!
//! The resolver only reads the world store. Its output is a `RemoteCommand`; the block
//! appears or disappears locally once the mutation sync channel receives the echo of that
//! write, the same way every other viewer sees it.

pub mod raycast;

use cgmath::{Point3, Vector3};
use log::debug;

use crate::engine_state::physics::aabb::Aabb;
use crate::engine_state::sync::remote::RemoteCommand;
use crate::engine_state::sync::MutationRecord;
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::coords::VoxelCoord;
use crate::engine_state::voxels::world::World;
use raycast::{Ray, RayHit};

/// Resolves picks and the edits made through them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InteractionResolver {
    /// Picks farther than this many world units hit nothing.
    pub pick_range: f32,
}

impl InteractionResolver {
    pub fn new(pick_range: f32) -> Self {
        InteractionResolver { pick_range }
    }

    /// Finds the nearest block along the camera ray, within `pick_range`.
    pub fn pick(
        &self,
        world: &World,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Option<RayHit> {
        Ray::new(origin, direction)?.cast(world, self.pick_range)
    }

    /// The write that breaks the picked block.
    ///
    /// A natural block is masked with a tombstone record at its coordinate. A placed block
    /// has its record deleted.
    pub fn break_block(&self, hit: &RayHit) -> RemoteCommand {
        match &hit.record.remote_id {
            Some(id) => RemoteCommand::Delete { id: id.clone() },
            None => RemoteCommand::Put {
                id: hit.coord.record_key(),
                record: MutationRecord::tombstone(hit.coord),
            },
        }
    }

    /// The voxel a placement against `hit` would fill: the neighbour across the hit face.
    pub fn placement_target(hit: &RayHit) -> VoxelCoord {
        hit.coord.offset(hit.face.normal())
    }

    /// The write that places `selected` against the picked face.
    ///
    /// # Returns
    /// `None` if `selected` is air or the target voxel would overlap `player`.
    pub fn place_block(
        &self,
        hit: &RayHit,
        selected: BlockType,
        player: &Aabb,
    ) -> Option<RemoteCommand> {
        if selected.is_air() {
            return None;
        }

        let target = Self::placement_target(hit);
        if Aabb::voxel(target).intersects(player) {
            debug!("Rejected placement at {:?}: overlaps the player", target);
            return None;
        }

        Some(RemoteCommand::Put {
            id: target.record_key(),
            record: MutationRecord::placement(target, selected),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;
    use crate::engine_state::voxels::block::{BlockRecord, RecordId};
    use crate::engine_state::voxels::terrain::{WorldDescriptor, WorldType};

    fn ground() -> World {
        let mut world = World::new(WorldDescriptor {
            seed: 0,
            world_type: WorldType::SUPERFLAT,
        });
        world.insert(VoxelCoord::new(0, 0, 0), BlockRecord::natural(BlockType::GRASS));
        world.insert(
            VoxelCoord::new(0, 0, -2),
            BlockRecord::placed(BlockType::BRICK, RecordId::new("0_0_-20")),
        );
        world
    }

    fn hit_at(coord: VoxelCoord, face: BlockSide, record: BlockRecord) -> RayHit {
        RayHit {
            coord,
            face,
            distance: 10.0,
            record,
        }
    }

    #[test]
    fn breaking_a_natural_block_writes_a_tombstone() {
        let resolver = InteractionResolver::new(60.0);
        let hit = resolver
            .pick(&ground(), Point3::new(0.0, 23.0, 0.0), Vector3::new(0.0, -1.0, 0.0))
            .expect("should pick the grass");

        assert_eq!(
            resolver.break_block(&hit),
            RemoteCommand::Put {
                id: RecordId::new("0_0_0"),
                record: MutationRecord {
                    x: 0,
                    y: 0,
                    z: 0,
                    block_type: "air".to_owned(),
                },
            }
        );
    }

    #[test]
    fn breaking_a_placed_block_deletes_its_record() {
        let resolver = InteractionResolver::new(60.0);
        let hit = resolver
            .pick(&ground(), Point3::new(0.0, 0.0, -40.0), Vector3::new(0.0, 0.0, 1.0))
            .expect("should pick the brick");
        assert_eq!(hit.coord, VoxelCoord::new(0, 0, -2));
        assert_eq!(hit.face, BlockSide::BACK);

        assert_eq!(
            resolver.break_block(&hit),
            RemoteCommand::Delete {
                id: RecordId::new("0_0_-20")
            }
        );
    }

    #[test]
    fn placement_goes_across_the_hit_face() {
        let resolver = InteractionResolver::new(60.0);
        let hit = hit_at(
            VoxelCoord::new(3, 0, 0),
            BlockSide::TOP,
            BlockRecord::natural(BlockType::GRASS),
        );
        let far_away = Aabb::player(Point3::new(-40.0, 23.0, 0.0), 3.0, 18.0);

        let command = resolver
            .place_block(&hit, BlockType::SAND, &far_away)
            .expect("placement should be allowed");

        assert_eq!(
            command,
            RemoteCommand::Put {
                id: RecordId::new("30_10_0"),
                record: MutationRecord::placement(VoxelCoord::new(3, 1, 0), BlockType::SAND),
            }
        );
    }

    #[test]
    fn placement_inside_the_player_is_rejected() {
        let resolver = InteractionResolver::new(60.0);
        let hit = hit_at(
            VoxelCoord::new(0, 0, 0),
            BlockSide::TOP,
            BlockRecord::natural(BlockType::GRASS),
        );
        let standing_on_it = Aabb::player(Point3::new(0.0, 23.0, 0.0), 3.0, 18.0);

        assert_eq!(resolver.place_block(&hit, BlockType::STONE, &standing_on_it), None);
    }

    #[test]
    fn air_cannot_be_placed() {
        let resolver = InteractionResolver::new(60.0);
        let hit = hit_at(
            VoxelCoord::new(5, 0, 0),
            BlockSide::TOP,
            BlockRecord::natural(BlockType::GRASS),
        );
        let far_away = Aabb::player(Point3::new(-40.0, 23.0, 0.0), 3.0, 18.0);

        assert_eq!(resolver.place_block(&hit, BlockType::AIR, &far_away), None);
    }
}
