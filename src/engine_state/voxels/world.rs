//! # World Module
//!
//! This module provides the `World` struct, the sparse voxel store that is the single
//! source of truth for what is rendered and what collides.
//!
//! ## Architecture
//!
//! The store is a hash map from `VoxelCoord` to `BlockRecord`. Only occupied voxels have an
//! entry; air is the absence of a key. There are no chunks: worlds are small enough that a
//! flat map keeps lookups O(1) and keeps every edit a single insert or remove.
//!
//! ## Render Deltas
//!
//! Every insert and remove is also recorded as a `VoxelDelta`. The engine drains these once
//! per frame and hands them to the renderer, which therefore never needs a full redraw.
//!
//! ## Mutation
//!
//! After generation the store is only changed by the mutation sync channel. Physics and the
//! interaction resolver borrow it read-only.

use std::collections::HashMap;

use super::block::block_type::BlockType;
use super::block::BlockRecord;
use super::coords::VoxelCoord;
use super::terrain::{NaturalLayer, WorldDescriptor};
use crate::engine_state::render::VoxelDelta;

/// The sparse voxel store of one world.
pub struct World {
    /// The parameters this world was generated from.
    descriptor: WorldDescriptor,
    /// Every occupied voxel.
    blocks: HashMap<VoxelCoord, BlockRecord>,
    /// Changes not yet handed to the renderer, oldest first.
    pending_deltas: Vec<VoxelDelta>,
}

impl World {
    /// Creates a new, empty world for `descriptor`.
    pub fn new(descriptor: WorldDescriptor) -> Self {
        World {
            descriptor,
            blocks: HashMap::new(),
            pending_deltas: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &WorldDescriptor {
        &self.descriptor
    }

    /// Inserts every block of a natural layer as a natural record.
    ///
    /// # Returns
    /// The number of blocks inserted. Coordinates that are already occupied keep their block.
    pub fn populate(&mut self, layer: &NaturalLayer) -> usize {
        self.blocks.reserve(layer.len());
        layer
            .iter()
            .filter(|&(coord, block_type)| self.insert(coord, BlockRecord::natural(block_type)))
            .count()
    }

    /// Inserts `record` at `coord` if the voxel is empty.
    ///
    /// Inserting over an occupied voxel is a no-op, as is inserting an `AIR` record: air
    /// never occupies the store.
    ///
    /// # Returns
    /// `true` if the record was inserted.
    pub fn insert(&mut self, coord: VoxelCoord, record: BlockRecord) -> bool {
        if record.block_type == BlockType::AIR || self.blocks.contains_key(&coord) {
            return false;
        }
        self.pending_deltas.push(VoxelDelta::Added {
            coord,
            block_type: record.block_type,
        });
        self.blocks.insert(coord, record);
        true
    }

    /// Removes and returns the block at `coord`, if any.
    pub fn remove(&mut self, coord: VoxelCoord) -> Option<BlockRecord> {
        let removed = self.blocks.remove(&coord)?;
        self.pending_deltas.push(VoxelDelta::Removed { coord });
        Some(removed)
    }

    pub fn get(&self, coord: VoxelCoord) -> Option<&BlockRecord> {
        self.blocks.get(&coord)
    }

    pub fn is_occupied(&self, coord: VoxelCoord) -> bool {
        self.blocks.contains_key(&coord)
    }

    /// Iterates over every occupied voxel, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, &BlockRecord)> {
        self.blocks.iter().map(|(coord, record)| (*coord, record))
    }

    /// Iterates over the occupied voxels inside the inclusive box `min..=max`.
    ///
    /// Cost is proportional to the volume of the box, not to the size of the world.
    pub fn occupied_in(
        &self,
        min: VoxelCoord,
        max: VoxelCoord,
    ) -> impl Iterator<Item = (VoxelCoord, &BlockRecord)> {
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| {
                (min.z..=max.z).filter_map(move |z| {
                    let coord = VoxelCoord::new(x, y, z);
                    self.blocks.get(&coord).map(|record| (coord, record))
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Takes every change recorded since the previous call.
    pub fn take_deltas(&mut self) -> Vec<VoxelDelta> {
        std::mem::take(&mut self.pending_deltas)
    }
}
