//! Subscriber identity

use std::fmt;
use std::rc::{Rc, Weak};

/// Identity under which a binder groups callbacks.
///
/// Objects are identified by address. Callbacks bound without an object share
/// the reserved [`SubscriberKey::Standalone`] identity, which never collides
/// with an object address.
///
/// An address is only meaningful while the object is alive: once it is
/// dropped, the allocator may hand the same address to a different object.
/// Weak subscriptions guard against this by checking liveness before every
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberKey {
    /// Callbacks bound with no associated object
    Standalone,

    /// Callbacks bound on behalf of the object at this address
    Object(usize),
}

impl SubscriberKey {
    /// Key of the object behind a plain reference.
    ///
    /// Zero-sized values that are not heap allocated may share an address,
    /// and therefore a key.
    pub fn of<T: ?Sized>(object: &T) -> Self {
        Self::Object((object as *const T).cast::<()>() as usize)
    }

    /// Key of the value owned by an `Rc`.
    ///
    /// This is the same key as `SubscriberKey::of(&*rc)`.
    pub fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self::Object(Rc::as_ptr(rc).cast::<()>() as usize)
    }

    /// Key of the value a `Weak` points to, or `None` if it has been dropped.
    pub fn of_weak<T: ?Sized>(weak: &Weak<T>) -> Option<Self> {
        weak.upgrade().map(|rc| Self::of_rc(&rc))
    }

    /// Whether this is the reserved key for object-less callbacks
    pub fn is_standalone(&self) -> bool {
        matches!(self, Self::Standalone)
    }
}

impl fmt::Display for SubscriberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => write!(f, "standalone"),
            Self::Object(address) => write!(f, "object@{:#x}", address),
        }
    }
}
