//! # Remote Store Contract
//!
//! The remote mutation log is owned by an external store. The engine needs three things
//! from it:
//! - a subscription that delivers every added, modified and removed record of a world's
//!   mutation collection, in the store's write order
//! - a write keyed by record identifier
//! - a delete keyed by record identifier
//!
//! Deliveries go into an `mpsc::Sender`, so a store may push them from any thread; the
//! engine drains the matching receiver on its frame thread.

use std::fmt;
use std::sync::mpsc::Sender;

use serde_json::Value;

use super::{MutationEvent, MutationRecord};
use crate::engine_state::voxels::block::RecordId;
use crate::error::RemoteStoreError;

/// A subscribable, writable mutation log.
pub trait RemoteStore {
    /// Starts delivering the changes of `world_id`'s mutation collection into `sink`.
    ///
    /// Records that already exist are delivered first, as `Added` events. Delivery stops
    /// when the returned `Subscription` is dropped.
    fn subscribe(
        &self,
        world_id: &str,
        sink: Sender<MutationEvent>,
    ) -> Result<Subscription, RemoteStoreError>;

    /// Creates or overwrites the record `id`.
    fn write(&self, world_id: &str, id: &RecordId, data: Value) -> Result<(), RemoteStoreError>;

    /// Deletes the record `id`.
    fn delete(&self, world_id: &str, id: &RecordId) -> Result<(), RemoteStoreError>;
}

/// A live subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wraps the store-specific unsubscribe action.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribes now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A single write the engine wants applied to the remote log.
///
/// Produced by the interaction resolver; never applied to the local world directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Create or overwrite a record.
    Put { id: RecordId, record: MutationRecord },
    /// Delete a record.
    Delete { id: RecordId },
}

impl RemoteCommand {
    pub fn id(&self) -> &RecordId {
        match self {
            RemoteCommand::Put { id, .. } | RemoteCommand::Delete { id } => id,
        }
    }

    /// Sends this command to `store`.
    pub fn dispatch(
        &self,
        store: &dyn RemoteStore,
        world_id: &str,
    ) -> Result<(), RemoteStoreError> {
        match self {
            RemoteCommand::Put { id, record } => {
                let data = record.to_value().map_err(|e| RemoteStoreError::Encode {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
                store.write(world_id, id, data)
            }
            RemoteCommand::Delete { id } => store.delete(world_id, id),
        }
    }
}
