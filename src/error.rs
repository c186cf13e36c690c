//! Error types.
//!
//! Most abnormal conditions in the engine are policy, not failure: a pick that hits nothing
//! or a placement inside the player simply does nothing. The errors below cover what is
//! left: talking to the remote store, decoding what it sends, loading or validating
//! configuration and running the window event loop.

use thiserror::Error;

use crate::engine_state::voxels::block::RecordId;

/// Failures reported by a remote store collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteStoreError {
    #[error("remote store is unavailable")]
    Unavailable,

    #[error("no remote record with id {0}")]
    UnknownRecord(RecordId),

    #[error("subscription to world {0} is closed")]
    SubscriptionClosed(String),

    #[error("could not encode mutation record {id}: {reason}")]
    Encode { id: RecordId, reason: String },
}

/// Reasons a mutation event from the remote stream is dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationDecodeError {
    #[error("malformed mutation record {id}: {reason}")]
    Malformed { id: RecordId, reason: String },

    #[error("mutation record {id} names unknown block type {block_type:?}")]
    UnknownBlockType { id: RecordId, block_type: String },

    #[error("mutation record {id} at ({x}, {y}, {z}) is not on the block grid")]
    OffGrid { id: RecordId, x: i32, y: i32, z: i32 },
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    RemoteStore(#[from] RemoteStoreError),

    #[error("unreadable engine configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
}
