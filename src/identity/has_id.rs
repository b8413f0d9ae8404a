use std::any;

/// A component that exposes a stable integer identifier.
pub trait HasId {
    /// Stable identifier of this instance.
    fn id(&self) -> i64;

    /// Name of the concrete implementing type.
    ///
    /// The default resolves through the vtable, so it still names the concrete
    /// type when called on a `&dyn HasId`. `std::any::type_name` is not
    /// guaranteed unique (two versions of one crate may agree), so override
    /// this when that matters.
    fn type_name(&self) -> &'static str {
        any::type_name::<Self>()
    }
}

/// Derives the canonical topic string for `sender`.
pub fn signature_for<I: HasId + ?Sized>(sender: &I) -> String {
    format!("{}.{}", sender.type_name(), sender.id())
}
