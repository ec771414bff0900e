//! Binder registry
//!
//! Maps each [`SubscriberKey`] to the ordered callbacks bound under it. A key
//! is present only while it has at least one callback.

use crate::key::SubscriberKey;
use crate::lifecycle::{LifecycleCallback, Repeat};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Registry of the callbacks bound to one event.
///
/// Callbacks under the same key run in bind order. Keys themselves have no
/// defined order.
pub struct EventBinder<A> {
    pub(crate) binds: HashMap<SubscriberKey, Vec<LifecycleCallback<A>>>,
}

impl<A> EventBinder<A> {
    /// Create an empty binder
    pub fn new() -> Self {
        Self {
            binds: HashMap::new(),
        }
    }

    /// Append a lifecycle callback under `key`.
    pub fn insert(&mut self, key: SubscriberKey, callback: LifecycleCallback<A>) {
        trace!(%key, repeat = ?callback.repeat(), checked = callback.is_checked(), "binding callback");
        self.binds.entry(key).or_default().push(callback);
    }

    // ------------------------------------------------------------------
    // Standalone bindings
    // ------------------------------------------------------------------

    /// Bind a callback that is not tied to any object.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparkle_events::Event;
    ///
    /// let mut on_click: Event<()> = Event::named("OnClick");
    /// on_click.binder_mut().bind(|_| println!("clicked"));
    /// on_click.raise(());
    /// ```
    pub fn bind<F>(&mut self, callback: F)
    where
        F: FnMut(&A) + 'static,
    {
        self.bind_standalone(callback, false);
    }

    /// Bind a callback that is not tied to any object and fires once.
    pub fn bind_once<F>(&mut self, callback: F)
    where
        F: FnMut(&A) + 'static,
    {
        self.bind_standalone(callback, true);
    }

    fn bind_standalone<F>(&mut self, callback: F, once: bool)
    where
        F: FnMut(&A) + 'static,
    {
        let callback = LifecycleCallback::unchecked(Repeat::from_once(once), callback);
        self.insert(SubscriberKey::Standalone, callback);
    }

    // ------------------------------------------------------------------
    // Keyed bindings (grouped under an object, no liveness check)
    // ------------------------------------------------------------------

    /// Bind a callback grouped under `owner`.
    ///
    /// The binder neither holds nor checks `owner`; it only uses its identity
    /// so that [`remove`](Self::remove) can drop the callback later.
    pub fn bind_for<T, F>(&mut self, owner: &T, callback: F)
    where
        T: ?Sized,
        F: FnMut(&A) + 'static,
    {
        self.bind_keyed(SubscriberKey::of(owner), callback, false);
    }

    /// Bind a callback grouped under `owner` that fires once.
    pub fn bind_once_for<T, F>(&mut self, owner: &T, callback: F)
    where
        T: ?Sized,
        F: FnMut(&A) + 'static,
    {
        self.bind_keyed(SubscriberKey::of(owner), callback, true);
    }

    fn bind_keyed<F>(&mut self, key: SubscriberKey, callback: F, once: bool)
    where
        F: FnMut(&A) + 'static,
    {
        self.insert(key, LifecycleCallback::unchecked(Repeat::from_once(once), callback));
    }

    // ------------------------------------------------------------------
    // Owning bindings
    // ------------------------------------------------------------------

    /// Bind a method-like callback on `target`, holding a strong reference.
    ///
    /// The target stays alive at least as long as the binding. Binding a
    /// target that itself owns this event creates a reference cycle; use
    /// [`bind_weak`](Self::bind_weak) for that.
    pub fn bind_to<T, F>(&mut self, target: &Rc<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.bind_owning(target, callback, false);
    }

    /// Bind a method-like callback on `target` that fires once.
    pub fn bind_once_to<T, F>(&mut self, target: &Rc<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.bind_owning(target, callback, true);
    }

    fn bind_owning<T, F>(&mut self, target: &Rc<T>, callback: F, once: bool)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        let key = SubscriberKey::of_rc(target);
        let callback = LifecycleCallback::owning(Rc::clone(target), Repeat::from_once(once), callback);
        self.insert(key, callback);
    }

    // ------------------------------------------------------------------
    // Weak bindings
    // ------------------------------------------------------------------

    /// Bind a method-like callback on the object behind a weak reference.
    ///
    /// The callback only runs while the target is alive; after the target is
    /// dropped the next raise removes it without calling it. If `target` has
    /// already expired nothing is bound.
    pub fn bind_weak<T, F>(&mut self, target: &Weak<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.bind_observing(target, callback, false);
    }

    /// Bind a weak method-like callback that fires once.
    pub fn bind_once_weak<T, F>(&mut self, target: &Weak<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.bind_observing(target, callback, true);
    }

    fn bind_observing<T, F>(&mut self, target: &Weak<T>, callback: F, once: bool)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        let Some(key) = SubscriberKey::of_weak(target) else {
            trace!("skipping bind to expired weak reference");
            return;
        };
        let callback = LifecycleCallback::observing(target.clone(), Repeat::from_once(once), callback);
        self.insert(key, callback);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether any live callback is bound under `key`
    pub fn is_bound_key(&self, key: SubscriberKey) -> bool {
        self.binds
            .get(&key)
            .is_some_and(|callbacks| callbacks.iter().any(LifecycleCallback::is_live))
    }

    /// Whether `object` has any callback bound
    pub fn is_bound<T: ?Sized>(&self, object: &T) -> bool {
        self.is_bound_key(SubscriberKey::of(object))
    }

    /// Whether the value owned by `rc` has any callback bound
    pub fn is_bound_rc<T: ?Sized>(&self, rc: &Rc<T>) -> bool {
        self.is_bound_key(SubscriberKey::of_rc(rc))
    }

    /// Whether the object behind `weak` has any callback bound.
    ///
    /// Always `false` once the weak reference has expired, even if stale
    /// entries have not been pruned yet.
    pub fn is_bound_weak<T: ?Sized>(&self, weak: &Weak<T>) -> bool {
        SubscriberKey::of_weak(weak).is_some_and(|key| self.is_bound_key(key))
    }

    /// Number of distinct subscriber keys
    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    /// Total number of callbacks across all keys
    pub fn callback_count(&self) -> usize {
        self.binds.values().map(Vec::len).sum()
    }

    /// Keys that currently have callbacks bound
    pub fn keys(&self) -> impl Iterator<Item = SubscriberKey> + '_ {
        self.binds.keys().copied()
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove every callback bound under `key`.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_key(&mut self, key: SubscriberKey) -> bool {
        let removed = self.binds.remove(&key);
        if let Some(callbacks) = &removed {
            trace!(%key, callbacks = callbacks.len(), "removed subscriber");
        }
        removed.is_some()
    }

    /// Remove every callback bound under `object`
    pub fn remove<T: ?Sized>(&mut self, object: &T) -> bool {
        self.remove_key(SubscriberKey::of(object))
    }

    /// Remove every callback bound under the value owned by `rc`
    pub fn remove_rc<T: ?Sized>(&mut self, rc: &Rc<T>) -> bool {
        self.remove_key(SubscriberKey::of_rc(rc))
    }

    /// Remove every callback bound under the object behind `weak`.
    ///
    /// An expired weak reference no longer identifies its object, so this
    /// returns `false` and removes nothing. The stale entries are pruned by
    /// the next raise or by [`prune_expired`](Self::prune_expired).
    pub fn remove_weak<T: ?Sized>(&mut self, weak: &Weak<T>) -> bool {
        match SubscriberKey::of_weak(weak) {
            Some(key) => self.remove_key(key),
            None => false,
        }
    }

    /// Remove every callback
    pub fn remove_all(&mut self) {
        trace!(keys = self.binds.len(), "removing all subscribers");
        self.binds.clear();
    }

    /// Drop weak callbacks whose target is gone, without running anything.
    ///
    /// Returns the number of callbacks removed.
    pub fn prune_expired(&mut self) -> usize {
        let before = self.callback_count();
        self.binds.retain(|_, callbacks| {
            callbacks.retain(LifecycleCallback::is_live);
            !callbacks.is_empty()
        });
        let pruned = before - self.callback_count();
        if pruned > 0 {
            trace!(pruned, "pruned expired callbacks");
        }
        pruned
    }
}

impl<A> Default for EventBinder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventBinder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinder")
            .field("keys", &self.len())
            .field("callbacks", &self.callback_count())
            .finish()
    }
}
