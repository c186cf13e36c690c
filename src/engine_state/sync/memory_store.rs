//! # In-Memory Remote Store
//!
//! A `RemoteStore` that keeps every world's mutation collection in process memory.
//!
//! It behaves like the hosted store the engine is written against: subscribing replays the
//! existing records, then every write and delete is fanned out to all subscribers of that
//! world in write order. Handles are cheap clones of one shared store, so several engines
//! (several viewers) can share a world, and writes may come from any thread.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::Sender;

use log::{debug, info};
use serde_json::Value;

use super::remote::{RemoteStore, Subscription};
use super::{ChangeKind, MutationEvent};
use crate::core::MtResource;
use crate::engine_state::voxels::block::RecordId;
use crate::error::RemoteStoreError;

/// One world's mutation collection and its listeners.
#[derive(Default)]
struct Collection {
    records: BTreeMap<RecordId, Value>,
    subscribers: Vec<(u64, Sender<MutationEvent>)>,
}

impl Collection {
    /// Sends `event` to every subscriber, forgetting those whose receiver is gone.
    fn broadcast(&mut self, event: MutationEvent) {
        self.subscribers
            .retain(|(_, sink)| sink.send(event.clone()).is_ok());
    }
}

struct StoreState {
    collections: HashMap<String, Collection>,
    next_subscriber: u64,
    available: bool,
}

/// A shared, thread-safe in-memory mutation log.
#[derive(Clone)]
pub struct InMemoryRemoteStore {
    state: MtResource<StoreState>,
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        InMemoryRemoteStore {
            state: MtResource::new(StoreState {
                collections: HashMap::new(),
                next_subscriber: 0,
                available: true,
            }),
        }
    }

    /// Makes every write and delete fail with `RemoteStoreError::Unavailable` while `false`.
    pub fn set_available(&self, available: bool) {
        self.state.get_mut().available = available;
    }

    /// The stored payload of record `id`, if present.
    pub fn record(&self, world_id: &str, id: &RecordId) -> Option<Value> {
        self.state
            .get()
            .collections
            .get(world_id)
            .and_then(|collection| collection.records.get(id).cloned())
    }

    /// Number of records in `world_id`'s collection.
    pub fn record_count(&self, world_id: &str) -> usize {
        self.state
            .get()
            .collections
            .get(world_id)
            .map_or(0, |collection| collection.records.len())
    }

    /// Number of live subscriptions to `world_id`.
    pub fn subscriber_count(&self, world_id: &str) -> usize {
        self.state
            .get()
            .collections
            .get(world_id)
            .map_or(0, |collection| collection.subscribers.len())
    }
}

impl RemoteStore for InMemoryRemoteStore {
    fn subscribe(
        &self,
        world_id: &str,
        sink: Sender<MutationEvent>,
    ) -> Result<Subscription, RemoteStoreError> {
        let mut state = self.state.get_mut();
        if !state.available {
            return Err(RemoteStoreError::Unavailable);
        }

        let subscriber = state.next_subscriber;
        state.next_subscriber += 1;

        let collection = state.collections.entry(world_id.to_owned()).or_default();
        for (id, data) in &collection.records {
            let replay = MutationEvent::new(ChangeKind::Added, id.clone(), data.clone());
            if sink.send(replay).is_err() {
                return Err(RemoteStoreError::SubscriptionClosed(world_id.to_owned()));
            }
        }
        collection.subscribers.push((subscriber, sink));
        info!(
            "Subscriber {} joined world {} ({} records replayed)",
            subscriber,
            world_id,
            collection.records.len()
        );

        let state = self.state.clone();
        let world_id = world_id.to_owned();
        Ok(Subscription::new(move || {
            if let Some(collection) = state.get_mut().collections.get_mut(&world_id) {
                collection.subscribers.retain(|(id, _)| *id != subscriber);
            }
            info!("Subscriber {} left world {}", subscriber, world_id);
        }))
    }

    fn write(&self, world_id: &str, id: &RecordId, data: Value) -> Result<(), RemoteStoreError> {
        let mut state = self.state.get_mut();
        if !state.available {
            return Err(RemoteStoreError::Unavailable);
        }

        let collection = state.collections.entry(world_id.to_owned()).or_default();
        let change = match collection.records.insert(id.clone(), data.clone()) {
            Some(_) => ChangeKind::Modified,
            None => ChangeKind::Added,
        };
        debug!("{:?} record {} in world {}", change, id, world_id);
        collection.broadcast(MutationEvent::new(change, id.clone(), data));
        Ok(())
    }

    fn delete(&self, world_id: &str, id: &RecordId) -> Result<(), RemoteStoreError> {
        let mut state = self.state.get_mut();
        if !state.available {
            return Err(RemoteStoreError::Unavailable);
        }

        let collection = state
            .collections
            .get_mut(world_id)
            .ok_or_else(|| RemoteStoreError::UnknownRecord(id.clone()))?;
        let data = collection
            .records
            .remove(id)
            .ok_or_else(|| RemoteStoreError::UnknownRecord(id.clone()))?;
        debug!("Removed record {} in world {}", id, world_id);
        collection.broadcast(MutationEvent::new(ChangeKind::Removed, id.clone(), data));
        Ok(())
    }
}
