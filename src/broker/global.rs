//! Process-wide broker and the free functions that drive it.
//!
//! Any component can publish or subscribe through these functions without
//! sharing a handle. [`clear_all_subscribers`] resets the registry, e.g.
//! between tests.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::info;

use crate::broker::engine::Broker;
use crate::broker::topic::Topic;
use crate::config::{Settings, load_config};
use crate::utils::{BusError, logging};

static GLOBAL: Lazy<Broker> = Lazy::new(Broker::default);

/// The process-wide broker.
pub fn global() -> &'static Broker {
    &GLOBAL
}

/// Loads configuration, initializes logging and configures the global broker.
pub fn init() -> Result<Settings, BusError> {
    let settings = load_config()?;
    logging::init(&settings.log.level);
    global().configure(&settings.broker);
    info!(?settings, "signalbus initialized");
    Ok(settings)
}

/// Publishes a no-payload event to `topic`. See [`Broker::publish`].
pub fn send(topic: impl Into<Topic>) -> Result<usize, BusError> {
    global().publish(topic)
}

/// Publishes `payload` to `topic`. See [`Broker::publish_with`].
pub fn send_with<T: Any>(topic: impl Into<Topic>, payload: T) -> Result<usize, BusError> {
    global().publish_with(topic, payload)
}

/// See [`Broker::subscribe`].
pub fn subscribe<F>(
    subscriber: &Arc<impl Any + Send + Sync>,
    topic: impl Into<Topic>,
    handler: F,
) -> Result<(), BusError>
where
    F: Fn() + Send + Sync + 'static,
{
    global().subscribe(subscriber, topic, handler)
}

/// See [`Broker::subscribe_with`].
pub fn subscribe_with<T, F>(
    subscriber: &Arc<impl Any + Send + Sync>,
    topic: impl Into<Topic>,
    handler: F,
) -> Result<(), BusError>
where
    T: Any,
    F: Fn(&T) + Send + Sync + 'static,
{
    global().subscribe_with(subscriber, topic, handler)
}

/// See [`Broker::subscribe_many`].
pub fn subscribe_many<I, F>(
    subscriber: &Arc<impl Any + Send + Sync>,
    topics: I,
    handler: F,
) -> Result<(), BusError>
where
    I: IntoIterator,
    I::Item: Into<Topic>,
    F: Fn() + Send + Sync + 'static,
{
    global().subscribe_many(subscriber, topics, handler)
}

/// See [`Broker::subscribe_many_with`].
pub fn subscribe_many_with<T, I, F>(
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
    global().subscribe_many_with(subscriber, topics, handler)
}

/// See [`Broker::unsubscribe`].
pub fn unsubscribe(
    subscriber: &Arc<impl Any + Send + Sync>,
    topic: impl Into<Topic>,
) -> Result<usize, BusError> {
    global().unsubscribe(subscriber, topic)
}

/// See [`Broker::unsubscribe_with`].
pub fn unsubscribe_with<T: Any>(
    subscriber: &Arc<impl Any + Send + Sync>,
    topic: impl Into<Topic>,
) -> Result<usize, BusError> {
    global().unsubscribe_with::<T>(subscriber, topic)
}

/// See [`Broker::unsubscribe_many`].
pub fn unsubscribe_many<I>(
    subscriber: &Arc<impl Any + Send + Sync>,
    topics: I,
) -> Result<usize, BusError>
where
    I: IntoIterator,
    I::Item: Into<Topic>,
{
    global().unsubscribe_many(subscriber, topics)
}

/// See [`Broker::unsubscribe_many_with`].
pub fn unsubscribe_many_with<T, I>(
    subscriber: &Arc<impl Any + Send + Sync>,
    topics: I,
) -> Result<usize, BusError>
where
    T: Any,
    I: IntoIterator,
    I::Item: Into<Topic>,
{
    global().unsubscribe_many_with::<T, I>(subscriber, topics)
}

/// Wipes every registration from the global broker.
pub fn clear_all_subscribers() {
    global().clear();
}
