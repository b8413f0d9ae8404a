//! The `identity` module defines the identity capability used to derive
//! per-instance topics.
//!
//! Any component implementing [`HasId`] can be used as a topic source: the bus
//! turns it into `"<concrete type name>.<id>"` through
//! [`Topic::of`](crate::broker::Topic::of), so two types sharing an id never
//! collide, and neither do two instances of one type with different ids.

pub mod has_id;
pub use has_id::{HasId, signature_for};
