//! Broker engine
//!
//! This module contains the dispatcher layered on the [`Registry`]:
//! - deriving topic keys and validating arguments
//! - wrapping strongly-typed handlers behind a type-erased callback
//! - fanning a publish out to every live subscriber under a key
//! - removing a subscriber's registrations, pruning dead ones on the way
//!
//! Concurrency and usage notes:
//! - Every call is synchronous and runs on the caller's thread.
//! - A publish works on a snapshot taken before any handler runs, so handlers
//!   may subscribe, unsubscribe or publish re-entrantly, even on the key being
//!   delivered. A subscriber added mid-publish may miss that publish; one
//!   removed mid-publish may still receive it.
//! - A handler that panics aborts the rest of that publish and the panic
//!   reaches the publisher, unless `isolate_handlers` is enabled.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, trace};

use crate::broker::registry::Registry;
use crate::broker::subscription::Subscription;
use crate::broker::topic::{Topic, TopicKey};
use crate::config::BrokerSettings;
use crate::utils::BusError;

/// Dispatcher for in-process publish/subscribe.
///
/// Subscribers are held weakly: the broker is never the reason a subscriber
/// stays alive. Handlers registered for a topic only receive publishes of the
/// exact payload type they were registered with (or no payload).
#[derive(Debug)]
pub struct Broker {
    registry: Registry,
    isolate_handlers: AtomicBool,
    prune_on_publish: AtomicBool,
}

impl Default for Broker {
    fn default() -> Self {
        Self::with_settings(&BrokerSettings::default())
    }
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &BrokerSettings) -> Self {
        Self {
            registry: Registry::new(),
            isolate_handlers: AtomicBool::new(settings.isolate_handlers),
            prune_on_publish: AtomicBool::new(settings.prune_on_publish),
        }
    }

    /// Applies `settings`; takes effect for publishes that start afterwards.
    pub fn configure(&self, settings: &BrokerSettings) {
        self.isolate_handlers
            .store(settings.isolate_handlers, Ordering::Relaxed);
        self.prune_on_publish
            .store(settings.prune_on_publish, Ordering::Relaxed);
        debug!(?settings, "broker reconfigured");
    }

    pub fn settings(&self) -> BrokerSettings {
        BrokerSettings {
            isolate_handlers: self.isolate_handlers.load(Ordering::Relaxed),
            prune_on_publish: self.prune_on_publish.load(Ordering::Relaxed),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registers a no-payload `handler` for `topic` on behalf of `subscriber`.
    ///
    /// Subscribing the same subscriber twice yields two registrations that
    /// both fire.
    pub fn subscribe<F>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topic: impl Into<Topic>,
        handler: F,
    ) -> Result<(), BusError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let key = TopicKey::new(topic)?;
        self.insert(key, Subscription::plain(subscriber, handler));
        Ok(())
    }

    /// Registers a `handler` for publishes of a `T` to `topic`.
    pub fn subscribe_with<T, F>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topic: impl Into<Topic>,
        handler: F,
    ) -> Result<(), BusError>
    where
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let key = TopicKey::typed::<T>(topic)?;
        self.insert(key, Subscription::typed(subscriber, handler));
        Ok(())
    }

    /// Registers one no-payload `handler` under every topic in `topics`.
    ///
    /// All topics are validated first; on error nothing is registered.
    pub fn subscribe_many<I, F>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topics: I,
        handler: F,
    ) -> Result<(), BusError>
    where
        I: IntoIterator,
        I::Item: Into<Topic>,
        F: Fn() + Send + Sync + 'static,
    {
        let keys = collect_keys(topics, TopicKey::new)?;
        self.insert_all(keys, Subscription::plain(subscriber, handler));
        Ok(())
    }

    /// Typed form of [`Broker::subscribe_many`].
    pub fn subscribe_many_with<T, I, F>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topics: I,
        handler: F,
    ) -> Result<(), BusError>
    where
        T: Any,
        I: IntoIterator,
        I::Item: Into<Topic>,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let keys = collect_keys(topics, TopicKey::typed::<T>)?;
        self.insert_all(keys, Subscription::typed(subscriber, handler));
        Ok(())
    }

    /// Publishes a no-payload event to `topic`.
    ///
    /// Returns how many handlers ran. Zero subscribers is not an error.
    pub fn publish(&self, topic: impl Into<Topic>) -> Result<usize, BusError> {
        let key = TopicKey::new(topic)?;
        Ok(self.dispatch(&key, &()))
    }

    /// Publishes `payload` to the handlers registered for `T` under `topic`.
    pub fn publish_with<T: Any>(
        &self,
        topic: impl Into<Topic>,
        payload: T,
    ) -> Result<usize, BusError> {
        let key = TopicKey::typed::<T>(topic)?;
        Ok(self.dispatch(&key, &payload))
    }

    /// Removes `subscriber`'s no-payload registrations under `topic`, along
    /// with any dead ones. Returns how many were removed.
    pub fn unsubscribe(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topic: impl Into<Topic>,
    ) -> Result<usize, BusError> {
        let key = TopicKey::new(topic)?;
        Ok(self.remove(subscriber, &key))
    }

    /// Removes `subscriber`'s registrations for `T` under `topic`.
    pub fn unsubscribe_with<T: Any>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topic: impl Into<Topic>,
    ) -> Result<usize, BusError> {
        let key = TopicKey::typed::<T>(topic)?;
        Ok(self.remove(subscriber, &key))
    }

    /// Removes `subscriber`'s no-payload registrations under every topic in
    /// `topics`.
    pub fn unsubscribe_many<I>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topics: I,
    ) -> Result<usize, BusError>
    where
        I: IntoIterator,
        I::Item: Into<Topic>,
    {
        let keys = collect_keys(topics, TopicKey::new)?;
        Ok(keys.iter().map(|key| self.remove(subscriber, key)).sum())
    }

    /// Typed form of [`Broker::unsubscribe_many`].
    pub fn unsubscribe_many_with<T, I>(
        &self,
        subscriber: &Arc<impl Any + Send + Sync>,
        topics: I,
    ) -> Result<usize, BusError>
    where
        T: Any,
        I: IntoIterator,
        I::Item: Into<Topic>,
    {
        let keys = collect_keys(topics, TopicKey::typed::<T>)?;
        Ok(keys.iter().map(|key| self.remove(subscriber, key)).sum())
    }

    /// Drops every registration on every topic.
    pub fn clear(&self) {
        let keys = self.registry.clear();
        debug!(keys, "cleared all subscribers");
    }

    fn insert(&self, key: TopicKey, subscription: Subscription) {
        debug!(topic = %key, "subscribe");
        self.registry.append(key, subscription);
    }

    fn insert_all(&self, keys: Vec<TopicKey>, subscription: Subscription) {
        for key in keys {
            self.insert(key, subscription.clone());
        }
    }

    fn remove<S>(&self, subscriber: &Arc<S>, key: &TopicKey) -> usize
    where
        S: Any + Send + Sync,
    {
        let removed = self.registry.remove_all(key, |subscription| {
            !subscription.is_alive() || subscription.belongs_to(subscriber)
        });
        debug!(topic = %key, removed, "unsubscribe");
        removed
    }

    fn dispatch(&self, key: &TopicKey, payload: &dyn Any) -> usize {
        let snapshot = self.registry.lookup(key);
        if snapshot.is_empty() {
            trace!(topic = %key, "no subscribers");
            return 0;
        }

        let isolate = self.isolate_handlers.load(Ordering::Relaxed);
        let mut delivered = 0;
        let mut dead = 0;

        for subscription in &snapshot {
            let invoked = if isolate {
                match panic::catch_unwind(AssertUnwindSafe(|| subscription.deliver(payload))) {
                    Ok(invoked) => invoked,
                    Err(_) => {
                        error!(topic = %key, "subscriber handler panicked; continuing delivery");
                        true
                    }
                }
            } else {
                subscription.deliver(payload)
            };

            if invoked {
                delivered += 1;
            } else {
                dead += 1;
            }
        }

        if dead > 0 && self.prune_on_publish.load(Ordering::Relaxed) {
            let pruned = self
                .registry
                .remove_all(key, |subscription| !subscription.is_alive());
            debug!(topic = %key, pruned, "pruned dead subscribers");
        }

        trace!(topic = %key, delivered, dead, "published");
        delivered
    }
}

fn collect_keys<I, K>(topics: I, key: K) -> Result<Vec<TopicKey>, BusError>
where
    I: IntoIterator,
    I::Item: Into<Topic>,
    K: Fn(Topic) -> Result<TopicKey, BusError>,
{
    topics
        .into_iter()
        .map(|topic| key(topic.into()))
        .collect()
}
