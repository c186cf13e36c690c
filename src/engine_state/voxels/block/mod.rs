//! # Block Module
//!
//! This module provides the per-voxel data stored in the world: the block type plus the
//! provenance that tells the sync channel and the interaction resolver where a block came
//! from.

use std::fmt;

use serde::{Deserialize, Serialize};

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in compact form.
pub type BlockTypeSize = u8;

/// Identifier of a record in the remote mutation log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single occupied voxel.
///
/// A block is either *natural*, meaning the terrain generator produced it and no remote
/// record mentions its coordinate, or *placed*, meaning a remote record explains it. Placed
/// blocks carry the identifier of that record so that breaking them can retract it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    /// The type of this block. Never `BlockType::AIR` inside the world store.
    pub block_type: BlockType,
    /// True for unmodified terrain generator output.
    pub natural: bool,
    /// The remote record this block was placed by, if any.
    pub remote_id: Option<RecordId>,
}

impl BlockRecord {
    /// A block produced by the terrain generator.
    pub fn natural(block_type: BlockType) -> Self {
        BlockRecord {
            block_type,
            natural: true,
            remote_id: None,
        }
    }

    /// A block explained by the remote record `remote_id`.
    pub fn placed(block_type: BlockType, remote_id: RecordId) -> Self {
        BlockRecord {
            block_type,
            natural: false,
            remote_id: Some(remote_id),
        }
    }
}
