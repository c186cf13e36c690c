//! # Voxel World
//!
//! This module contains the representation of the voxel world and its procedural base.
//!
//! ## Architecture
//!
//! * **Block**: Block types, faces and the per-voxel record stored in the world
//! * **Coords**: Integer voxel addresses and their mapping to world space
//! * **Noise**: The seeded Perlin field behind terrain height
//! * **Terrain**: Deterministic generation of the natural layer from a world descriptor
//! * **World**: The sparse store of every occupied voxel
//!
//! ## Data Flow
//!
//! 1. The terrain generator turns a seed and world type into a natural layer
//! 2. The natural layer populates the world store once, at session start
//! 3. From then on only the mutation sync channel changes the store
//! 4. Every change is recorded as a render delta

pub mod block;
pub mod coords;
pub mod noise;
pub mod terrain;
pub mod world;
