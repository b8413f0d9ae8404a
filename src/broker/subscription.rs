use std::any::Any;
use std::fmt;
use std::ptr;
use std::sync::{Arc, Weak};

use crate::broker::payload::PayloadType;
use crate::broker::topic::TopicKey;

/// Type-erased handler stored in the registry.
type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// A weakly-held subscriber and the handler registered on its behalf.
///
/// The registry never keeps the subscriber alive. Once every other owner
/// drops it, the subscription is dead and is skipped and pruned.
///
/// The payload tag and the handler's downcast target come from the same type
/// parameter in [`Subscription::typed`], and the registry only accepts a
/// subscription under a key with the same tag.
#[derive(Clone)]
pub struct Subscription {
    subscriber: Weak<dyn Any + Send + Sync>,
    payload: Option<PayloadType>,
    callback: Callback,
}

impl Subscription {
    /// Subscription for no-payload publishes; the payload argument is ignored.
    pub(crate) fn plain<S, F>(subscriber: &Arc<S>, handler: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn() + Send + Sync + 'static,
    {
        Self::build(subscriber, None, Arc::new(move |_: &dyn Any| handler()))
    }

    /// Subscription for publishes of a `T`.
    pub(crate) fn typed<S, T, F>(subscriber: &Arc<S>, handler: F) -> Self
    where
        S: Any + Send + Sync,
        T: Any,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(move |payload: &dyn Any| {
            if let Some(payload) = payload.downcast_ref::<T>() {
                handler(payload)
            }
        });
        Self::build(subscriber, Some(PayloadType::of::<T>()), callback)
    }

    fn build<S>(subscriber: &Arc<S>, payload: Option<PayloadType>, callback: Callback) -> Self
    where
        S: Any + Send + Sync,
    {
        let subscriber: Weak<S> = Arc::downgrade(subscriber);
        let subscriber: Weak<dyn Any + Send + Sync> = subscriber;
        Self {
            subscriber,
            payload,
            callback,
        }
    }

    /// Payload type the handler accepts, `None` for no-payload handlers.
    pub fn payload_type(&self) -> Option<PayloadType> {
        self.payload
    }

    /// Whether this subscription may live under `key`.
    pub fn fits(&self, key: &TopicKey) -> bool {
        self.payload == key.payload_type()
    }

    /// Whether the subscriber still has an owner outside the bus.
    pub fn is_alive(&self) -> bool {
        self.subscriber.strong_count() > 0
    }

    /// Whether this subscription was registered for exactly `subscriber`.
    pub fn belongs_to<S: ?Sized>(&self, subscriber: &Arc<S>) -> bool {
        ptr::addr_eq(self.subscriber.as_ptr(), Arc::as_ptr(subscriber))
    }

    /// Invokes the handler if the subscriber is still alive.
    ///
    /// The subscriber is held strongly for the duration of the call. Returns
    /// `false` without invoking anything when it is already gone.
    pub(crate) fn deliver(&self, payload: &dyn Any) -> bool {
        match self.subscriber.upgrade() {
            Some(_alive) => {
                (self.callback)(payload);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("payload", &self.payload)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
