pub mod engine;
pub mod global;
pub mod payload;
pub mod registry;
pub mod subscription;
pub mod topic;

pub use engine::Broker;
pub use payload::PayloadType;
pub use registry::Registry;
pub use subscription::Subscription;
pub use topic::{Topic, TopicKey};
