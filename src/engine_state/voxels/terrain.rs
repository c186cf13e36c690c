//! # Terrain Generation
//!
//! Turns a world descriptor into the natural layer: the complete set of blocks the world
//! has before any player edits it.
//!
//! ## World Types
//! - `superflat`: four fixed strata under every column (grass, dirt, dirt, obsidian)
//! - `default`: a noise heightmap quantized into plateaus, with grass, three dirt and one
//!   stone per column, and scattered trees
//!
//! ## Determinism
//!
//! Generation is a pure function of the descriptor and the extent. Terrain height comes from
//! `noise::Perlin` seeded from the world seed; tree placement draws from a `fastrand`
//! generator seeded per column from the world seed and the column coordinate, so a column's
//! trees do not depend on how many columns were generated before it.
//!
//! ## Overlaps
//!
//! Tree canopies can reach into neighbouring columns. The first block emitted at a
//! coordinate wins; later emissions at the same coordinate are dropped by the builder.

use std::collections::HashMap;

use clap::ValueEnum;
use log::info;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::block::block_type::BlockType;
use super::coords::{VoxelCoord, BLOCK_SIZE};
use super::noise::noise_field;

/// Scaling factor applied to world-space coordinates when sampling the height noise.
pub const HEIGHT_NOISE_FREQUENCY: f64 = 0.005;
/// Number of discrete height steps the noise value is quantized into on each side of zero.
pub const HEIGHT_STEPS: f64 = 4.0;
/// Depth of the dirt layer under the grass of a default column.
pub const DIRT_DEPTH: i32 = 3;
/// Per-column chance of a tree in default worlds.
pub const TREE_PROBABILITY: f64 = 0.015;
/// Shortest tree trunk, in blocks.
pub const TRUNK_MIN_HEIGHT: i32 = 4;
/// Trunks are `TRUNK_MIN_HEIGHT + 0..TRUNK_HEIGHT_VARIATION` blocks tall.
pub const TRUNK_HEIGHT_VARIATION: i32 = 2;
/// Height of the grass layer of a superflat world.
pub const SUPERFLAT_SURFACE: i32 = 0;

/// Which generator a world uses.
///
/// Named `default` and `superflat` both in world descriptors and on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorldType {
    /// Height-mapped terrain with trees.
    #[value(name = "default")]
    DEFAULT,
    /// Four fixed strata.
    #[value(name = "superflat")]
    SUPERFLAT,
}

/// The parameters a world is created from, as supplied by the world-selection flow.
///
/// Deserializes from `{ "seed": 1234, "worldType": "default" }`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDescriptor {
    pub seed: i64,
    pub world_type: WorldType,
}

/// The square of columns a world is generated over.
///
/// Columns run from `-half_width` (inclusive) to `half_width` (exclusive) on both X and Z.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorldExtent {
    pub half_width: i32,
}

impl WorldExtent {
    pub fn new(half_width: i32) -> Self {
        WorldExtent { half_width }
    }

    /// Every `(x, z)` column in the extent, X-major.
    pub fn columns(self) -> impl Iterator<Item = (i32, i32)> {
        let range = -self.half_width..self.half_width;
        range
            .clone()
            .flat_map(move |x| range.clone().map(move |z| (x, z)))
    }

    pub fn contains_column(self, x: i32, z: i32) -> bool {
        (-self.half_width..self.half_width).contains(&x)
            && (-self.half_width..self.half_width).contains(&z)
    }
}

/// The generator's output: every natural block, keyed by coordinate, in emission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NaturalLayer {
    blocks: HashMap<VoxelCoord, BlockType>,
    order: Vec<VoxelCoord>,
}

impl NaturalLayer {
    /// The block the generator produced at `coord`, if any.
    pub fn get(&self, coord: VoxelCoord) -> Option<BlockType> {
        self.blocks.get(&coord).copied()
    }

    /// All natural blocks in the order they were emitted.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, BlockType)> + '_ {
        self.order.iter().map(|coord| (*coord, self.blocks[coord]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Accumulates generator output, keeping the first block emitted at each coordinate.
#[derive(Default)]
struct NaturalLayerBuilder {
    layer: NaturalLayer,
}

impl NaturalLayerBuilder {
    /// Emits `block_type` at `coord`.
    ///
    /// # Returns
    /// `false` if the coordinate was already taken or `block_type` is air; nothing is recorded.
    fn push_block_type(&mut self, coord: VoxelCoord, block_type: BlockType) -> bool {
        if block_type.is_air() || self.layer.blocks.contains_key(&coord) {
            return false;
        }
        self.layer.blocks.insert(coord, block_type);
        self.layer.order.push(coord);
        true
    }

    fn finish(self) -> NaturalLayer {
        self.layer
    }
}

/// Produces the natural layer of a world.
pub struct TerrainGenerator {
    seed: u64,
    world_type: WorldType,
    noise: Perlin,
}

impl TerrainGenerator {
    /// Creates the generator for a world descriptor.
    pub fn new(descriptor: &WorldDescriptor) -> Self {
        TerrainGenerator {
            seed: descriptor.seed as u64,
            world_type: descriptor.world_type,
            noise: noise_field(descriptor.seed),
        }
    }

    pub fn world_type(&self) -> WorldType {
        self.world_type
    }

    /// Generates every natural block of the world within `extent`.
    pub fn generate(&self, extent: WorldExtent) -> NaturalLayer {
        let mut builder = NaturalLayerBuilder::default();
        let mut trees = 0usize;

        for (x, z) in extent.columns() {
            match self.world_type {
                WorldType::SUPERFLAT => Self::generate_superflat_column(&mut builder, x, z),
                WorldType::DEFAULT => {
                    if self.generate_default_column(&mut builder, x, z) {
                        trees += 1;
                    }
                }
            }
        }

        let layer = builder.finish();
        info!(
            "Generated {:?} terrain: {} blocks, {} trees over {} columns",
            self.world_type,
            layer.len(),
            trees,
            extent.columns().count()
        );
        layer
    }

    /// Height of the grass block of the default-world column `(x, z)`.
    ///
    /// The noise value is sampled in world space and quantized to whole steps, which yields
    /// flat plateaus separated by one-block ledges.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let world_x = x as f64 * BLOCK_SIZE as f64;
        let world_z = z as f64 * BLOCK_SIZE as f64;
        let sample = self
            .noise
            .get([
                world_x * HEIGHT_NOISE_FREQUENCY,
                0.0,
                world_z * HEIGHT_NOISE_FREQUENCY,
            ])
            .clamp(-1.0, 1.0);
        (sample * HEIGHT_STEPS).floor() as i32
    }

    fn generate_superflat_column(builder: &mut NaturalLayerBuilder, x: i32, z: i32) {
        let y = SUPERFLAT_SURFACE;
        builder.push_block_type(VoxelCoord::new(x, y, z), BlockType::GRASS);
        builder.push_block_type(VoxelCoord::new(x, y - 1, z), BlockType::DIRT);
        builder.push_block_type(VoxelCoord::new(x, y - 2, z), BlockType::DIRT);
        builder.push_block_type(VoxelCoord::new(x, y - 3, z), BlockType::OBSIDIAN);
    }

    /// Emits one default column and, maybe, a tree on top of it.
    ///
    /// # Returns
    /// Whether a tree was planted.
    fn generate_default_column(&self, builder: &mut NaturalLayerBuilder, x: i32, z: i32) -> bool {
        let height = self.surface_height(x, z);

        builder.push_block_type(VoxelCoord::new(x, height, z), BlockType::GRASS);
        for depth in 1..=DIRT_DEPTH {
            builder.push_block_type(VoxelCoord::new(x, height - depth, z), BlockType::DIRT);
        }
        builder.push_block_type(
            VoxelCoord::new(x, height - DIRT_DEPTH - 1, z),
            BlockType::STONE,
        );

        let mut rng = fastrand::Rng::with_seed(self.column_seed(x, z));
        if rng.f64() < TREE_PROBABILITY {
            let trunk_height = TRUNK_MIN_HEIGHT + rng.i32(0..TRUNK_HEIGHT_VARIATION);
            Self::generate_tree(builder, VoxelCoord::new(x, height + 1, z), trunk_height);
            return true;
        }
        false
    }

    /// Emits a trunk of `trunk_height` starting at `base`, capped by a 3x3x2 canopy around
    /// the top two trunk levels plus one leaf block on top.
    fn generate_tree(builder: &mut NaturalLayerBuilder, base: VoxelCoord, trunk_height: i32) {
        for i in 0..trunk_height {
            builder.push_block_type(VoxelCoord::new(base.x, base.y + i, base.z), BlockType::WOOD);
        }

        let top = base.y + trunk_height;
        for lx in -1..=1 {
            for lz in -1..=1 {
                for ly in 0..=1 {
                    // The canopy's lowest center cell is the trunk's top block.
                    if lx == 0 && lz == 0 && ly == 0 {
                        continue;
                    }
                    builder.push_block_type(
                        VoxelCoord::new(base.x + lx, top + ly - 1, base.z + lz),
                        BlockType::LEAVES,
                    );
                }
            }
        }
        builder.push_block_type(VoxelCoord::new(base.x, top + 1, base.z), BlockType::LEAVES);
    }

    /// Seed for the tree generator of column `(x, z)`.
    fn column_seed(&self, x: i32, z: i32) -> u64 {
        let x = (x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let z = (z as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        self.seed ^ x.rotate_left(17) ^ z
    }
}
