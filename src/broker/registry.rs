use std::mem;

use dashmap::DashMap;
use tracing::error;

use crate::broker::subscription::Subscription;
use crate::broker::topic::TopicKey;

/// Concurrency-safe map from [`TopicKey`] to the subscriptions under it.
///
/// Keys live in separate shards, so work on different topics rarely contends.
/// Work on one key is serialized by its shard lock. No lock is held once a
/// method returns: callers get owned snapshots, and removed subscriptions are
/// dropped after the lock is released, since dropping a handler may run
/// arbitrary user code.
///
/// Mutation is crate-private; outside the crate the registry is read-only.
#[derive(Debug, Default)]
pub struct Registry {
    entries: DashMap<TopicKey, Vec<Subscription>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Snapshot of the subscriptions under `key`, empty when absent.
    pub fn lookup(&self, key: &TopicKey) -> Vec<Subscription> {
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Appends `subscription` to `key`, creating the entry if needed.
    ///
    /// A subscription whose payload type differs from the key's is refused
    /// and `false` is returned.
    pub(crate) fn append(&self, key: TopicKey, subscription: Subscription) -> bool {
        if !subscription.fits(&key) {
            error!(
                topic = %key,
                payload = ?subscription.payload_type(),
                "refused mismatched subscription"
            );
            return false;
        }
        self.entries.entry(key).or_default().push(subscription);
        true
    }

    /// Removes every subscription under `key` matching `predicate` and
    /// returns how many went. An entry left empty is dropped.
    pub(crate) fn remove_all<P>(&self, key: &TopicKey, mut predicate: P) -> usize
    where
        P: FnMut(&Subscription) -> bool,
    {
        let removed: Vec<Subscription> = match self.entries.get_mut(key) {
            Some(mut entry) => {
                let (removed, kept): (Vec<_>, Vec<_>) = mem::take(entry.value_mut())
                    .into_iter()
                    .partition(|subscription| predicate(subscription));
                *entry.value_mut() = kept;
                removed
            }
            None => return 0,
        };

        self.entries.remove_if(key, |_, subscriptions| subscriptions.is_empty());
        removed.len()
    }

    /// Drops every entry and returns how many keys were present.
    pub(crate) fn clear(&self) -> usize {
        let keys: Vec<TopicKey> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        let drained: Vec<_> = keys
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .collect();
        drained.len()
    }

    /// Number of keys with at least one subscription.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of subscriptions under `key`, dead ones included.
    pub fn subscription_count(&self, key: &TopicKey) -> usize {
        self.entries.get(key).map_or(0, |entry| entry.value().len())
    }
}
