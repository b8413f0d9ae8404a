use std::any::Any;
use std::fmt;

use crate::broker::payload::PayloadType;
use crate::identity::{HasId, signature_for};
use crate::utils::BusError;

/// Name of an event shared by publishers and subscribers.
///
/// Built from any string, or derived from an identity object with
/// [`Topic::of`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Topic owned by `sender`: `"<concrete type name>.<id>"`.
    pub fn of<I: HasId + ?Sized>(sender: &I) -> Self {
        Self(signature_for(sender))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&String> for Topic {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

impl From<&Topic> for Topic {
    fn from(topic: &Topic) -> Self {
        topic.clone()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry key: a topic plus the payload type its handlers accept.
///
/// `payload == None` is the no-payload form. The same topic string with
/// different payload types gives unrelated keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicKey {
    topic: Topic,
    payload: Option<PayloadType>,
}

impl TopicKey {
    /// Key for no-payload publishes to `topic`.
    pub fn new(topic: impl Into<Topic>) -> Result<Self, BusError> {
        Self::build(topic.into(), None)
    }

    /// Key for publishes of a `T` to `topic`.
    pub fn typed<T: Any>(topic: impl Into<Topic>) -> Result<Self, BusError> {
        Self::build(topic.into(), Some(PayloadType::of::<T>()))
    }

    fn build(topic: Topic, payload: Option<PayloadType>) -> Result<Self, BusError> {
        if topic.is_empty() {
            return Err(BusError::empty_topic());
        }
        Ok(Self { topic, payload })
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn payload_type(&self) -> Option<PayloadType> {
        self.payload
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            Some(payload) => write!(f, "{}<{}>", self.topic, payload.name()),
            None => write!(f, "{}", self.topic),
        }
    }
}
