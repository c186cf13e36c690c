//! # Mutation Sync Module
//!
//! This module keeps the world store in step with the remote mutation log shared by every
//! viewer of a world.
//!
//! ## Two Layers
//!
//! The world is the terrain generator's natural layer with a sparse overlay of remote
//! records on top. The log is authoritative for the coordinates it mentions and the
//! generator is authoritative everywhere else. A record whose type is `air` is a tombstone
//! that hides a natural block.
//!
//! ## Event Queue
//!
//! Remote change events arrive on an unbounded `mpsc` queue and are applied one at a time,
//! in arrival order, by `MutationSync::apply_pending` on the frame thread. This is the only
//! code path that changes the store after generation, including for the local player's own
//! edits, which only take effect once the store echoes them back.

pub mod memory_store;
pub mod remote;

use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RetractionPolicy;
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::block::{BlockRecord, RecordId};
use crate::engine_state::voxels::coords::VoxelCoord;
use crate::engine_state::voxels::terrain::NaturalLayer;
use crate::engine_state::voxels::world::World;
use crate::error::{MutationDecodeError, RemoteStoreError};
use remote::{RemoteStore, Subscription};

/// How a remote record changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    /// The record itself was deleted.
    Removed,
}

/// One change to one record of the remote mutation log.
///
/// `data` is the raw record payload as the store delivered it. For `Removed` it is the last
/// payload the record had.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationEvent {
    pub change: ChangeKind,
    pub id: RecordId,
    pub data: Value,
}

impl MutationEvent {
    pub fn new(change: ChangeKind, id: RecordId, data: Value) -> Self {
        MutationEvent { change, id, data }
    }
}

/// The wire shape of a remote mutation record.
///
/// Coordinates are in world units and must lie on the block grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(rename = "type")]
    pub block_type: String,
}

impl MutationRecord {
    /// A record setting `coord` to `block_type`.
    pub fn placement(coord: VoxelCoord, block_type: BlockType) -> Self {
        let [x, y, z] = coord.world_units();
        MutationRecord {
            x,
            y,
            z,
            block_type: block_type.name().to_owned(),
        }
    }

    /// An `air` record hiding the natural block at `coord`.
    pub fn tombstone(coord: VoxelCoord) -> Self {
        Self::placement(coord, BlockType::AIR)
    }

    /// The record as the JSON payload stored remotely.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decodes the payload of record `id` into a voxel coordinate and block type.
    pub fn decode(
        id: &RecordId,
        data: &Value,
    ) -> Result<(VoxelCoord, BlockType), MutationDecodeError> {
        let record: MutationRecord =
            serde_json::from_value(data.clone()).map_err(|e| MutationDecodeError::Malformed {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        let coord = VoxelCoord::from_world_units(record.x, record.y, record.z).ok_or(
            MutationDecodeError::OffGrid {
                id: id.clone(),
                x: record.x,
                y: record.y,
                z: record.z,
            },
        )?;
        let block_type = BlockType::from_name(&record.block_type).ok_or_else(|| {
            MutationDecodeError::UnknownBlockType {
                id: id.clone(),
                block_type: record.block_type.clone(),
            }
        })?;

        Ok((coord, block_type))
    }
}

/// Counts from one drain of the event queue.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Events applied to the store.
    pub applied: usize,
    /// Events dropped because their record could not be decoded.
    pub dropped: usize,
}

/// The consumer side of the remote mutation log.
pub struct MutationSync {
    sender: Sender<MutationEvent>,
    receiver: Receiver<MutationEvent>,
    /// What the generator produced, for `RetractionPolicy::RestoreNatural`.
    natural: NaturalLayer,
    policy: RetractionPolicy,
    subscription: Option<Subscription>,
}

impl MutationSync {
    /// Creates a disconnected sync channel over the generator output `natural`.
    pub fn new(natural: NaturalLayer, policy: RetractionPolicy) -> Self {
        let (sender, receiver) = channel();
        MutationSync {
            sender,
            receiver,
            natural,
            policy,
            subscription: None,
        }
    }

    /// A handle that feeds this channel's queue. Events sent through it are applied by the
    /// next `apply_pending`.
    pub fn sender(&self) -> Sender<MutationEvent> {
        self.sender.clone()
    }

    pub fn policy(&self) -> RetractionPolicy {
        self.policy
    }

    pub fn natural_layer(&self) -> &NaturalLayer {
        &self.natural
    }

    pub fn is_connected(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribes to `world_id`'s mutation collection on `store`.
    ///
    /// Any previous subscription is cancelled first.
    pub fn connect(
        &mut self,
        store: &dyn RemoteStore,
        world_id: &str,
    ) -> Result<(), RemoteStoreError> {
        self.disconnect();
        let subscription = store.subscribe(world_id, self.sender.clone())?;
        info!("Mutation sync connected to world {}", world_id);
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Cancels the subscription. Events already queued stay queued; call
    /// `discard_pending` to drop them.
    pub fn disconnect(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            info!("Mutation sync disconnected");
        }
    }

    /// Drops every queued event without applying it, returning how many were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            debug!("Discarded {} queued remote mutations", discarded);
        }
        discarded
    }

    /// Applies every queued event to `world`, in arrival order.
    ///
    /// Events whose record cannot be decoded are logged and dropped; the rest of the queue
    /// is still applied.
    pub fn apply_pending(&mut self, world: &mut World) -> SyncStats {
        let mut stats = SyncStats::default();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => match self.apply_event(world, &event) {
                    Ok(()) => stats.applied += 1,
                    Err(e) => {
                        warn!("Dropping remote mutation: {}", e);
                        stats.dropped += 1;
                    }
                },
                // The channel owns a sender, so it never disconnects.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if stats.applied > 0 || stats.dropped > 0 {
            debug!(
                "Applied {} remote mutations, dropped {}",
                stats.applied, stats.dropped
            );
        }
        stats
    }

    /// Applies a single event to `world`.
    pub fn apply_event(
        &self,
        world: &mut World,
        event: &MutationEvent,
    ) -> Result<(), MutationDecodeError> {
        let (coord, block_type) = MutationRecord::decode(&event.id, &event.data)?;

        match event.change {
            ChangeKind::Removed => {
                world.remove(coord);
                if self.policy == RetractionPolicy::RestoreNatural {
                    if let Some(natural) = self.natural.get(coord) {
                        world.insert(coord, BlockRecord::natural(natural));
                    }
                }
            }
            ChangeKind::Added | ChangeKind::Modified if block_type.is_air() => {
                world.remove(coord);
            }
            ChangeKind::Added | ChangeKind::Modified => {
                world.remove(coord);
                world.insert(coord, BlockRecord::placed(block_type, event.id.clone()));
            }
        }
        Ok(())
    }
}

impl Drop for MutationSync {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::terrain::{
        TerrainGenerator, WorldDescriptor, WorldExtent, WorldType,
    };
    use serde_json::json;

    fn superflat() -> (World, MutationSync) {
        superflat_with(RetractionPolicy::LeaveHole)
    }

    fn superflat_with(policy: RetractionPolicy) -> (World, MutationSync) {
        let descriptor = WorldDescriptor {
            seed: 0,
            world_type: WorldType::SUPERFLAT,
        };
        let layer = TerrainGenerator::new(&descriptor).generate(WorldExtent::new(4));
        let mut world = World::new(descriptor);
        world.populate(&layer);
        world.take_deltas();
        (world, MutationSync::new(layer, policy))
    }

    fn event(change: ChangeKind, coord: VoxelCoord, block_type: BlockType) -> MutationEvent {
        MutationEvent::new(
            change,
            coord.record_key(),
            MutationRecord::placement(coord, block_type)
                .to_value()
                .expect("records encode"),
        )
    }

    #[test]
    fn tombstone_removes_a_natural_block() {
        let (mut world, mut sync) = superflat();
        let grass = VoxelCoord::new(1, 0, 1);
        sync.sender()
            .send(event(ChangeKind::Added, grass, BlockType::AIR))
            .unwrap();

        let stats = sync.apply_pending(&mut world);

        assert_eq!(stats, SyncStats { applied: 1, dropped: 0 });
        assert!(world.get(grass).is_none());
        assert_eq!(world.take_deltas().len(), 1);
    }

    #[test]
    fn placement_overrides_a_natural_block() {
        let (mut world, mut sync) = superflat();
        let grass = VoxelCoord::new(0, 0, 0);
        sync.sender()
            .send(event(ChangeKind::Added, grass, BlockType::BRICK))
            .unwrap();

        sync.apply_pending(&mut world);

        let record = world.get(grass).expect("placed block should exist");
        assert_eq!(record.block_type, BlockType::BRICK);
        assert!(!record.natural);
        assert_eq!(record.remote_id, Some(grass.record_key()));
    }

    #[test]
    fn later_writes_to_a_coordinate_win() {
        let (mut world, mut sync) = superflat();
        let above = VoxelCoord::new(0, 1, 0);
        let sender = sync.sender();
        sender.send(event(ChangeKind::Added, above, BlockType::SAND)).unwrap();
        sender.send(event(ChangeKind::Modified, above, BlockType::WATER)).unwrap();

        sync.apply_pending(&mut world);

        assert_eq!(world.get(above).map(|r| r.block_type), Some(BlockType::WATER));
    }

    #[test]
    fn retraction_leaves_a_hole_by_default() {
        let (mut world, mut sync) = superflat();
        let grass = VoxelCoord::new(2, 0, 2);
        let sender = sync.sender();
        sender.send(event(ChangeKind::Added, grass, BlockType::STONE)).unwrap();
        sender.send(event(ChangeKind::Removed, grass, BlockType::STONE)).unwrap();

        sync.apply_pending(&mut world);

        assert!(world.get(grass).is_none());
    }

    #[test]
    fn retraction_can_restore_the_natural_block() {
        let (mut world, mut sync) = superflat_with(RetractionPolicy::RestoreNatural);
        let grass = VoxelCoord::new(2, 0, 2);
        let air = VoxelCoord::new(2, 3, 2);
        let sender = sync.sender();
        sender.send(event(ChangeKind::Added, grass, BlockType::STONE)).unwrap();
        sender.send(event(ChangeKind::Removed, grass, BlockType::STONE)).unwrap();
        sender.send(event(ChangeKind::Added, air, BlockType::WOOD)).unwrap();
        sender.send(event(ChangeKind::Removed, air, BlockType::WOOD)).unwrap();

        sync.apply_pending(&mut world);

        let restored = world.get(grass).expect("natural block should be restored");
        assert_eq!(restored.block_type, BlockType::GRASS);
        assert!(restored.natural);
        assert!(world.get(air).is_none());
    }

    #[test]
    fn malformed_records_are_dropped_without_stopping_the_queue() {
        let (mut world, mut sync) = superflat();
        let above = VoxelCoord::new(0, 1, 0);
        let sender = sync.sender();
        sender
            .send(MutationEvent::new(
                ChangeKind::Added,
                RecordId::new("junk"),
                json!({ "x": "a" }),
            ))
            .unwrap();
        sender
            .send(MutationEvent::new(
                ChangeKind::Added,
                RecordId::new("5_0_0"),
                json!({ "x": 5, "y": 0, "z": 0, "type": "stone" }),
            ))
            .unwrap();
        sender
            .send(MutationEvent::new(
                ChangeKind::Added,
                RecordId::new("0_10_0"),
                json!({ "x": 0, "y": 10, "z": 0, "type": "lava" }),
            ))
            .unwrap();
        sender.send(event(ChangeKind::Added, above, BlockType::LEAVES)).unwrap();

        let stats = sync.apply_pending(&mut world);

        assert_eq!(stats, SyncStats { applied: 1, dropped: 3 });
        assert_eq!(world.get(above).map(|r| r.block_type), Some(BlockType::LEAVES));
    }

    #[test]
    fn records_encode_in_the_wire_shape() {
        let record = MutationRecord::placement(VoxelCoord::new(-1, 2, 3), BlockType::BRICK);

        assert_eq!(
            record.to_value().expect("records encode"),
            json!({ "x": -10, "y": 20, "z": 30, "type": "brick" })
        );
    }

    #[test]
    fn discarded_events_are_never_applied() {
        let (mut world, mut sync) = superflat();
        let grass = VoxelCoord::new(1, 0, 1);
        let sender = sync.sender();
        sender.send(event(ChangeKind::Added, grass, BlockType::AIR)).unwrap();
        sender.send(event(ChangeKind::Added, grass, BlockType::BRICK)).unwrap();

        assert_eq!(sync.discard_pending(), 2);
        let stats = sync.apply_pending(&mut world);

        assert_eq!(stats, SyncStats::default());
        assert_eq!(world.get(grass).map(|r| r.block_type), Some(BlockType::GRASS));
    }

    #[test]
    fn decode_reports_the_failure_kind() {
        let id = RecordId::new("r");
        assert!(matches!(
            MutationRecord::decode(&id, &json!({ "x": 1, "y": 0, "z": 0, "type": "dirt" })),
            Err(MutationDecodeError::OffGrid { x: 1, .. })
        ));
        assert!(matches!(
            MutationRecord::decode(&id, &json!({ "x": 0, "y": 0, "z": 0 })),
            Err(MutationDecodeError::Malformed { .. })
        ));
        assert_eq!(
            MutationRecord::decode(&id, &json!({ "x": -10, "y": 20, "z": 0, "type": "obsidian" })),
            Ok((VoxelCoord::new(-1, 2, 0), BlockType::OBSIDIAN))
        );
    }
}
