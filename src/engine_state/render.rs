//! # Render Interface
//!
//! The renderer is an external collaborator. Each frame the engine hands it:
//! - the voxel changes since the previous frame, as add/remove deltas
//! - the current camera transform
//!
//! Mesh building, materials and projection stay on the renderer's side of `RenderSink`.

use cgmath::{Matrix4, Point3, Vector3};
use log::debug;

use super::voxels::block::block_type::BlockType;
use super::voxels::block::BlockTypeSize;
use super::voxels::coords::VoxelCoord;

/// One change to the set of visible voxels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoxelDelta {
    /// A block appeared at `coord`.
    Added {
        coord: VoxelCoord,
        block_type: BlockType,
    },
    /// The block at `coord` is gone.
    Removed { coord: VoxelCoord },
}

impl VoxelDelta {
    pub fn coord(&self) -> VoxelCoord {
        match self {
            VoxelDelta::Added { coord, .. } | VoxelDelta::Removed { coord } => *coord,
        }
    }

    /// The GPU instance for an added block; `None` for removals.
    pub fn instance(&self) -> Option<VoxelInstance> {
        match self {
            VoxelDelta::Added { coord, block_type } => {
                Some(VoxelInstance::new(*coord, *block_type))
            }
            VoxelDelta::Removed { .. } => None,
        }
    }
}

/// Per-voxel instance data in the layout a renderer uploads directly.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute keeps the field order fixed: 12 bytes of world-space center
/// followed by the block type id widened to 32 bits, with no padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelInstance {
    /// World-space center of the voxel.
    pub position: [f32; 3],
    /// The block type as its `BlockTypeSize` value.
    pub block_type: u32,
}

impl VoxelInstance {
    pub fn new(coord: VoxelCoord, block_type: BlockType) -> Self {
        VoxelInstance {
            position: coord.center().into(),
            block_type: block_type as BlockTypeSize as u32,
        }
    }

    /// Decodes the block type, or `None` if the id is not a known type.
    pub fn block_type(&self) -> Option<BlockType> {
        BlockTypeSize::try_from(self.block_type)
            .ok()
            .and_then(BlockType::from_int)
    }
}

/// Collects the instances of every added block in `deltas`.
pub fn added_instances(deltas: &[VoxelDelta]) -> Vec<VoxelInstance> {
    deltas.iter().filter_map(VoxelDelta::instance).collect()
}

/// Where the renderer's camera sits and what it looks at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraTransform {
    /// Eye position in world space.
    pub position: Point3<f32>,
    /// Unit view direction.
    pub forward: Vector3<f32>,
    /// Right-handed view matrix looking along `forward` with +Y up.
    pub view: Matrix4<f32>,
}

/// The renderer side of the frame loop.
pub trait RenderSink {
    /// Applies the voxel changes since the previous frame, oldest first.
    fn apply_voxel_deltas(&mut self, deltas: &[VoxelDelta]);

    /// Updates the camera used for this frame.
    fn set_camera(&mut self, camera: &CameraTransform);
}

/// A renderer stand-in that only tracks and logs what it would draw.
///
/// Used by headless sessions and tests.
#[derive(Debug, Default)]
pub struct HeadlessRenderSink {
    /// Voxels currently visible.
    pub visible: std::collections::HashMap<VoxelCoord, BlockType>,
    /// Last camera submitted.
    pub camera: Option<CameraTransform>,
    /// Number of frames that submitted at least one delta.
    pub frames_with_changes: usize,
}

impl RenderSink for HeadlessRenderSink {
    fn apply_voxel_deltas(&mut self, deltas: &[VoxelDelta]) {
        if deltas.is_empty() {
            return;
        }
        for delta in deltas {
            match *delta {
                VoxelDelta::Added { coord, block_type } => {
                    self.visible.insert(coord, block_type);
                }
                VoxelDelta::Removed { coord } => {
                    self.visible.remove(&coord);
                }
            }
        }
        self.frames_with_changes += 1;
        debug!(
            "Applied {} voxel deltas, {} voxels visible",
            deltas.len(),
            self.visible.len()
        );
    }

    fn set_camera(&mut self, camera: &CameraTransform) {
        self.camera = Some(*camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_cast_to_bytes_without_padding() {
        let deltas = [
            VoxelDelta::Added {
                coord: VoxelCoord::new(1, 2, 3),
                block_type: BlockType::WATER,
            },
            VoxelDelta::Removed {
                coord: VoxelCoord::new(0, 0, 0),
            },
        ];

        let instances = added_instances(&deltas);
        let bytes: &[u8] = bytemuck::cast_slice(&instances);

        assert_eq!(instances.len(), 1);
        assert_eq!(bytes.len(), 16);
        assert_eq!(instances[0].position, [10.0, 20.0, 30.0]);
        assert_eq!(instances[0].block_type(), Some(BlockType::WATER));
    }

    #[test]
    fn headless_sink_tracks_visible_voxels() {
        let mut sink = HeadlessRenderSink::default();
        let coord = VoxelCoord::new(0, 1, 0);

        sink.apply_voxel_deltas(&[VoxelDelta::Added {
            coord,
            block_type: BlockType::SAND,
        }]);
        assert_eq!(sink.visible.get(&coord), Some(&BlockType::SAND));

        sink.apply_voxel_deltas(&[VoxelDelta::Removed { coord }]);
        sink.apply_voxel_deltas(&[]);
        assert!(sink.visible.is_empty());
        assert_eq!(sink.frames_with_changes, 2);
    }
}
