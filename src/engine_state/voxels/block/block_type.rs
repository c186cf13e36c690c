//! # Block Type Module
//!
//! This module defines the closed set of block types a voxel can hold.
//! It provides conversions to and from the compact integer form used by renderers and
//! the string form used by remote mutation records.

use num_derive::FromPrimitive;
use phf::phf_map;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// `AIR` is a sentinel: it never occupies a slot in the world store, where air is simply
/// the absence of a block. In remote mutation records it marks a tombstone over a natural
/// block. The `FromPrimitive` derive allows conversion from the compact integer form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    AIR,

    /// The top layer of generated terrain.
    GRASS,

    /// Soil found under grass.
    DIRT,

    /// The deepest layer of default terrain.
    STONE,

    /// Tree trunks.
    WOOD,

    /// A player building material.
    BRICK,

    /// Tree canopies. Rendered translucent.
    LEAVES,

    /// Rendered translucent, but solid for collision like every other block.
    WATER,

    /// The bedrock layer of superflat worlds.
    OBSIDIAN,

    /// A player building material.
    SAND,
}

/// Maps the names used in remote mutation records to block types.
static BLOCK_TYPE_BY_NAME: phf::Map<&'static str, BlockType> = phf_map! {
    "air" => BlockType::AIR,
    "grass" => BlockType::GRASS,
    "dirt" => BlockType::DIRT,
    "stone" => BlockType::STONE,
    "wood" => BlockType::WOOD,
    "brick" => BlockType::BRICK,
    "leaves" => BlockType::LEAVES,
    "water" => BlockType::WATER,
    "obsidian" => BlockType::OBSIDIAN,
    "sand" => BlockType::SAND,
};

impl BlockType {
    /// Every block type that can occupy a voxel, i.e. everything but `AIR`.
    pub const SOLID: [BlockType; 9] = [
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::WOOD,
        BlockType::BRICK,
        BlockType::LEAVES,
        BlockType::WATER,
        BlockType::OBSIDIAN,
        BlockType::SAND,
    ];

    /// Converts a `BlockTypeSize` back into a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value does not correspond to any block type.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Looks up a block type by its record name (`"grass"`, `"air"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_BY_NAME.get(name).copied()
    }

    /// The name used for this block type in remote mutation records.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::AIR => "air",
            BlockType::GRASS => "grass",
            BlockType::DIRT => "dirt",
            BlockType::STONE => "stone",
            BlockType::WOOD => "wood",
            BlockType::BRICK => "brick",
            BlockType::LEAVES => "leaves",
            BlockType::WATER => "water",
            BlockType::OBSIDIAN => "obsidian",
            BlockType::SAND => "sand",
        }
    }

    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Whether the renderer should draw this block with transparency.
    pub fn is_translucent(self) -> bool {
        matches!(self, BlockType::WATER | BlockType::LEAVES)
    }
}
