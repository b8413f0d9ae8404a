//! # signalbus
//!
//! `signalbus` is an in-process publish/subscribe dispatcher. Components talk
//! to each other by topic name, or by the identity of an object implementing
//! [`HasId`], without holding references to each other.
//!
//! Subscribers are held weakly: once every other owner drops a subscriber, its
//! handlers stop firing and are pruned. The payload type is part of the
//! subscription key, so one topic can carry several payload shapes, each to
//! its own listeners.
//!
//! ## Core Modules
//!
//! - `broker`: the registry, the dispatcher and the process-wide instance.
//! - `identity`: the [`HasId`] capability and per-instance topic derivation.
//! - `config`: loading [`Settings`] from files and environment variables.
//! - `utils`: the crate error type and logging setup.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Dashboard;
//! struct Reading(f64);
//!
//! let dashboard = Arc::new(Dashboard);
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&seen);
//! signalbus::subscribe_with(&dashboard, "sensor", move |reading: &Reading| {
//!     assert_eq!(reading.0, 21.5);
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })?;
//!
//! signalbus::send_with("sensor", Reading(21.5))?;
//! // Different payload type, different listeners.
//! signalbus::send_with("sensor", "not a reading")?;
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//!
//! drop(dashboard);
//! signalbus::send_with("sensor", Reading(0.0))?;
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! # Ok::<(), signalbus::BusError>(())
//! ```

pub mod broker;
pub mod config;
pub mod identity;
pub mod utils;

pub use crate::broker::Broker;
pub use crate::broker::global::{
    clear_all_subscribers, global, init, send, send_with, subscribe, subscribe_many,
    subscribe_many_with, subscribe_with, unsubscribe, unsubscribe_many, unsubscribe_many_with,
    unsubscribe_with,
};
pub use crate::broker::{PayloadType, Topic, TopicKey};
pub use crate::config::{BrokerSettings, LogSettings, Settings};
pub use crate::identity::HasId;
pub use crate::utils::BusError;
