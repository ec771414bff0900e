//! Events and the raise algorithm

use crate::binder::EventBinder;
use crate::error::{CallbackFailure, EventError, EventResult, panic_message};
use crate::key::SubscriberKey;
use crate::lifecycle::Status;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use tracing::{debug, error};

/// What [`Event::raise`] does when a callback panics.
///
/// The pass over all callbacks always completes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Resume the first panic once every callback has run
    #[default]
    Propagate,

    /// Log every panic and return normally
    Log,
}

/// Event configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Log raises at debug level
    pub enable_logging: bool,

    /// Handling of callbacks that panic during [`Event::raise`]
    pub failure_policy: FailurePolicy,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            failure_policy: FailurePolicy::Propagate,
        }
    }
}

/// A typed notification point.
///
/// `A` is the argument passed to every listener; use a tuple for several
/// values and `()` for none. Listeners receive `&A`.
///
/// Raising runs every live callback synchronously on the calling thread and
/// removes, in the same pass, once-bindings that fired and weak bindings
/// whose target is gone.
///
/// # Examples
///
/// ```
/// use sparkle_events::Event;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// struct HealthBar {
///     shown: Cell<i32>,
/// }
///
/// let mut on_health_changed: Event<i32> = Event::named("OnHealthChanged");
/// let bar = Rc::new(HealthBar { shown: Cell::new(100) });
///
/// on_health_changed.bind_weak(&Rc::downgrade(&bar), |bar, hp| bar.shown.set(*hp));
/// on_health_changed.raise(75);
/// assert_eq!(bar.shown.get(), 75);
///
/// drop(bar);
/// on_health_changed.raise(50);
/// assert_eq!(on_health_changed.size(), 0);
/// ```
pub struct Event<A> {
    name: String,
    config: EventConfig,
    binder: EventBinder<A>,
}

impl<A> Event<A> {
    /// Create an unnamed event with default configuration
    pub fn new() -> Self {
        Self::with_config("", EventConfig::default())
    }

    /// Create a named event with default configuration.
    ///
    /// The name is only used for diagnostics.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_config(name, EventConfig::default())
    }

    /// Create an event with custom config
    pub fn with_config(name: impl Into<String>, config: EventConfig) -> Self {
        Self {
            name: name.into(),
            config,
            binder: EventBinder::new(),
        }
    }

    /// Start building an event
    pub fn builder() -> EventBuilder<A> {
        EventBuilder::new()
    }

    /// Diagnostic name; may be empty
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// The binder registry.
    ///
    /// Components that raise an event usually keep it private and hand out
    /// the binder so others can subscribe but not raise.
    pub fn binder(&self) -> &EventBinder<A> {
        &self.binder
    }

    pub fn binder_mut(&mut self) -> &mut EventBinder<A> {
        &mut self.binder
    }

    // ------------------------------------------------------------------
    // Raise
    // ------------------------------------------------------------------

    /// Raise the event, invoking every live callback with `&args`.
    ///
    /// Callbacks under one key run in bind order; keys run in no particular
    /// order. Raising an event without subscribers does nothing.
    ///
    /// # Panics
    ///
    /// With [`FailurePolicy::Propagate`], re-raises the first callback panic
    /// after every other callback has run.
    pub fn raise(&mut self, args: A) {
        let mut report = self.dispatch(&args);
        if report.panics.is_empty() {
            return;
        }

        match self.config.failure_policy {
            FailurePolicy::Propagate => {
                let (_, payload) = report.panics.swap_remove(0);
                panic::resume_unwind(payload);
            }
            FailurePolicy::Log => {}
        }
    }

    /// Raise the event, collecting callback panics into an error instead of
    /// applying the failure policy.
    pub fn try_raise(&mut self, args: A) -> EventResult<()> {
        let report = self.dispatch(&args);
        if report.panics.is_empty() {
            return Ok(());
        }

        let failures = report
            .panics
            .iter()
            .map(|(key, payload)| CallbackFailure::from_panic(*key, payload.as_ref()))
            .collect();
        Err(EventError::CallbacksFailed {
            event: self.name.clone(),
            failures,
        })
    }

    fn dispatch(&mut self, args: &A) -> DispatchReport {
        let mut report = DispatchReport::default();
        if self.binder.is_empty() {
            return report;
        }

        if self.config.enable_logging {
            debug!(
                event = %self.name,
                keys = self.binder.len(),
                callbacks = self.binder.callback_count(),
                "raising event"
            );
        }

        let name = &self.name;
        self.binder.binds.retain(|key, callbacks| {
            let key = *key;
            callbacks.retain_mut(|callback| {
                let status = match panic::catch_unwind(AssertUnwindSafe(|| callback.run(args))) {
                    Ok(status) => status,
                    Err(payload) => {
                        error!(
                            event = %name,
                            %key,
                            "callback panicked: {}",
                            panic_message(payload.as_ref())
                        );
                        report.panics.push((key, payload));
                        callback.settle_after_panic()
                    }
                };
                report.record(status);
                status.is_active()
            });
            !callbacks.is_empty()
        });

        if self.config.enable_logging {
            debug!(
                event = %self.name,
                invoked = report.invoked,
                finished = report.finished,
                expired = report.expired,
                failed = report.panics.len(),
                "event raised"
            );
        }

        report
    }

    // ------------------------------------------------------------------
    // Binder wrappers
    // ------------------------------------------------------------------

    /// Bind a callback that is not tied to any object
    pub fn bind<F>(&mut self, callback: F)
    where
        F: FnMut(&A) + 'static,
    {
        self.binder.bind(callback);
    }

    /// Bind a callback that is not tied to any object and fires once
    pub fn bind_once<F>(&mut self, callback: F)
    where
        F: FnMut(&A) + 'static,
    {
        self.binder.bind_once(callback);
    }

    /// Bind a callback grouped under `owner`; see [`EventBinder::bind_for`]
    pub fn bind_for<T, F>(&mut self, owner: &T, callback: F)
    where
        T: ?Sized,
        F: FnMut(&A) + 'static,
    {
        self.binder.bind_for(owner, callback);
    }

    /// Once variant of [`bind_for`](Self::bind_for)
    pub fn bind_once_for<T, F>(&mut self, owner: &T, callback: F)
    where
        T: ?Sized,
        F: FnMut(&A) + 'static,
    {
        self.binder.bind_once_for(owner, callback);
    }

    /// Bind a callback on `target`, holding it alive; see [`EventBinder::bind_to`]
    pub fn bind_to<T, F>(&mut self, target: &Rc<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.binder.bind_to(target, callback);
    }

    /// Once variant of [`bind_to`](Self::bind_to); the target is released after it fires
    pub fn bind_once_to<T, F>(&mut self, target: &Rc<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.binder.bind_once_to(target, callback);
    }

    /// Bind a liveness-checked callback; see [`EventBinder::bind_weak`]
    pub fn bind_weak<T, F>(&mut self, target: &Weak<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.binder.bind_weak(target, callback);
    }

    /// Once variant of [`bind_weak`](Self::bind_weak)
    pub fn bind_once_weak<T, F>(&mut self, target: &Weak<T>, callback: F)
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        self.binder.bind_once_weak(target, callback);
    }

    /// Whether `object` has a live callback; see [`EventBinder::is_bound`]
    pub fn is_bound<T: ?Sized>(&self, object: &T) -> bool {
        self.binder.is_bound(object)
    }

    /// Whether the target behind `rc` has a live callback
    pub fn is_bound_rc<T: ?Sized>(&self, rc: &Rc<T>) -> bool {
        self.binder.is_bound_rc(rc)
    }

    /// Whether the target behind `weak` has a live callback; `false` once it expired
    pub fn is_bound_weak<T: ?Sized>(&self, weak: &Weak<T>) -> bool {
        self.binder.is_bound_weak(weak)
    }

    /// Whether `key` has a live callback
    pub fn is_bound_key(&self, key: SubscriberKey) -> bool {
        self.binder.is_bound_key(key)
    }

    /// Remove every callback bound under `object`; see [`EventBinder::remove`]
    pub fn remove<T: ?Sized>(&mut self, object: &T) -> bool {
        self.binder.remove(object)
    }

    /// Remove every callback bound under the target behind `rc`.
    ///
    /// Drops the strong references held by [`bind_to`](Self::bind_to).
    pub fn remove_rc<T: ?Sized>(&mut self, rc: &Rc<T>) -> bool {
        self.binder.remove_rc(rc)
    }

    /// Remove by weak handle; returns `false` once the target expired
    pub fn remove_weak<T: ?Sized>(&mut self, weak: &Weak<T>) -> bool {
        self.binder.remove_weak(weak)
    }

    /// Remove every callback bound under `key`
    pub fn remove_key(&mut self, key: SubscriberKey) -> bool {
        self.binder.remove_key(key)
    }

    /// Remove every callback immediately
    pub fn remove_all(&mut self) {
        self.binder.remove_all();
    }

    /// Alias of [`remove_all`](Self::remove_all)
    pub fn clear(&mut self) {
        self.remove_all();
    }

    /// Drop weak callbacks whose target is gone without raising.
    ///
    /// Returns the number of callbacks removed.
    pub fn cleanup(&mut self) -> usize {
        self.binder.prune_expired()
    }

    /// Number of distinct subscribers (keys), not callbacks
    pub fn size(&self) -> usize {
        self.binder.len()
    }

    /// Total number of bound callbacks
    pub fn callback_count(&self) -> usize {
        self.binder.callback_count()
    }

    /// No callbacks bound
    pub fn is_empty(&self) -> bool {
        self.binder.is_empty()
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("size", &self.size())
            .field("callbacks", &self.callback_count())
            .finish()
    }
}

/// Tally of one raise
#[derive(Default)]
struct DispatchReport {
    invoked: usize,
    finished: usize,
    expired: usize,
    panics: Vec<(SubscriberKey, Box<dyn Any + Send>)>,
}

impl DispatchReport {
    fn record(&mut self, status: Status) {
        match status {
            Status::Active => self.invoked += 1,
            Status::Finished => {
                self.invoked += 1;
                self.finished += 1;
            }
            Status::Expired => self.expired += 1,
        }
    }
}

/// Event builder
pub struct EventBuilder<A> {
    name: String,
    config: EventConfig,
    _marker: PhantomData<fn(&A)>,
}

impl<A> EventBuilder<A> {
    /// Create new event builder
    pub fn new() -> Self {
        Self {
            name: String::new(),
            config: EventConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Set the diagnostic name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Set the failure policy used by `raise`
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EventConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the event
    pub fn build(self) -> Event<A> {
        Event::with_config(self.name, self.config)
    }
}

impl<A> Default for EventBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBuilder")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Counter {
        value: Cell<i32>,
    }

    impl Counter {
        fn increment(&self, _: &()) {
            self.value.set(self.value.get() + 1);
        }

        fn add(&self, amount: &i32) {
            self.value.set(self.value.get() + amount);
        }
    }

    fn recorder<A: Clone + 'static>() -> (Rc<RefCell<Vec<A>>>, impl FnMut(&A) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |args: &A| sink.borrow_mut().push(args.clone()))
    }

    #[test]
    fn test_raise_without_subscribers() {
        let mut event: Event<i32> = Event::named("OnNothing");
        event.raise(1);
        assert!(event.try_raise(2).is_ok());
        assert_eq!(event.size(), 0);
    }

    #[test]
    fn test_lambda_binding() {
        let mut on_value: Event<i32> = Event::named("OnValue");
        let (seen, callback) = recorder::<i32>();

        on_value.bind(callback);
        on_value.raise(123);

        assert_eq!(*seen.borrow(), vec![123]);
    }

    #[test]
    fn test_bind_once_runs_once() {
        let mut on_ping: Event<()> = Event::named("OnPing");
        let count = Rc::new(Cell::new(0));
        let sink = count.clone();

        on_ping.bind_once(move |_| sink.set(sink.get() + 1));

        on_ping.raise(());
        on_ping.raise(());
        on_ping.raise(());

        assert_eq!(count.get(), 1);
        assert_eq!(on_ping.callback_count(), 0);
        assert!(on_ping.is_empty());
    }

    #[test]
    fn test_same_key_runs_in_bind_order() {
        let mut event: Event<u8> = Event::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let owner = Counter::default();

        for tag in 0..5 {
            let order = order.clone();
            event.bind_for(&owner, move |v: &u8| order.borrow_mut().push((tag, *v)));
        }
        event.raise(9);

        assert_eq!(
            *order.borrow(),
            vec![(0, 9), (1, 9), (2, 9), (3, 9), (4, 9)]
        );
        assert_eq!(event.size(), 1);
        assert_eq!(event.callback_count(), 5);
    }

    #[test]
    fn test_member_function_on_owned_target() {
        let mut on_increment: Event<()> = Event::named("OnIncrement");
        let counter = Rc::new(Counter::default());

        on_increment.bind_to(&counter, Counter::increment);
        on_increment.raise(());
        on_increment.raise(());

        assert_eq!(counter.value.get(), 2);
        assert!(on_increment.is_bound_rc(&counter));
    }

    #[test]
    fn test_bind_once_member_function() {
        let mut on_add: Event<i32> = Event::named("OnAdd");
        let counter = Rc::new(Counter::default());

        on_add.bind_once_to(&counter, Counter::add);
        on_add.raise(5);
        on_add.raise(10);

        assert_eq!(counter.value.get(), 5);
        assert_eq!(Rc::strong_count(&counter), 1);
    }

    #[test]
    fn test_weak_binding_expires() {
        let mut on_increment: Event<()> = Event::named("OnIncrement");
        let weak = {
            let strong = Rc::new(Counter::default());
            on_increment.bind_weak(&Rc::downgrade(&strong), Counter::increment);
            on_increment.raise(());
            assert_eq!(strong.value.get(), 1);
            Rc::downgrade(&strong)
        };

        assert!(weak.upgrade().is_none());
        assert_eq!(on_increment.size(), 1);

        on_increment.raise(());
        assert_eq!(on_increment.size(), 0);
        assert_eq!(on_increment.callback_count(), 0);
    }

    #[test]
    fn test_once_weak_binding() {
        let mut event: Event<i32> = Event::new();
        let counter = Rc::new(Counter::default());

        event.bind_once_weak(&Rc::downgrade(&counter), Counter::add);
        event.raise(3);
        event.raise(4);

        assert_eq!(counter.value.get(), 3);
        assert!(!event.is_bound_rc(&counter));
    }

    #[test]
    fn test_mixed_lifecycles_pruned_in_one_pass() {
        let mut event: Event<i32> = Event::new();
        let kept = Rc::new(Counter::default());
        let doomed = Rc::new(Counter::default());

        event.bind_to(&kept, Counter::add);
        event.bind_once_to(&kept, Counter::add);
        event.bind_weak(&Rc::downgrade(&doomed), Counter::add);
        event.bind_once(|_| {});
        drop(doomed);

        assert_eq!(event.size(), 3);
        assert_eq!(event.callback_count(), 4);

        event.raise(1);

        assert_eq!(kept.value.get(), 2);
        assert_eq!(event.size(), 1);
        assert_eq!(event.callback_count(), 1);
    }

    #[test]
    fn test_tuple_arguments() {
        let mut event: Event<(String, u32)> = Event::named("OnPickup");
        let (seen, callback) = recorder::<(String, u32)>();

        event.bind(callback);
        event.raise(("Shotgun".to_string(), 2));

        assert_eq!(*seen.borrow(), vec![("Shotgun".to_string(), 2)]);
    }

    #[test]
    fn test_clear() {
        let mut on_clear: Event<i32> = Event::named("OnClear");
        let called = Rc::new(Cell::new(0));
        let sink = called.clone();

        on_clear.bind(move |v| sink.set(*v));
        assert_eq!(on_clear.callback_count(), 1);

        on_clear.clear();
        assert_eq!(on_clear.callback_count(), 0);

        on_clear.raise(42);
        assert_eq!(called.get(), 0);
    }

    #[test]
    fn test_cleanup_prunes_without_invoking() {
        let mut event: Event<i32> = Event::new();
        let counter = Rc::new(Counter::default());
        let calls = Rc::new(Cell::new(0));
        let sink = calls.clone();

        event.bind_weak(&Rc::downgrade(&counter), move |_, _| sink.set(sink.get() + 1));
        drop(counter);

        assert_eq!(event.cleanup(), 1);
        assert!(event.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_try_raise_reports_panics_and_finishes_pass() {
        let mut event: Event<()> = Event::builder()
            .name("OnBoom")
            .enable_logging(false)
            .build();
        let after = Rc::new(Cell::new(0));
        let sink = after.clone();
        let owner = Counter::default();

        event.bind_for(&owner, |_| panic!("boom"));
        event.bind_for(&owner, move |_| sink.set(sink.get() + 1));

        let err = event.try_raise(()).unwrap_err();
        let EventError::CallbacksFailed { event: name, failures } = &err;
        assert_eq!(name, "OnBoom");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "boom");
        assert_eq!(failures[0].key, SubscriberKey::of(&owner));

        // The panicking callback repeats; the one after it still ran.
        assert_eq!(after.get(), 1);
        assert_eq!(event.callback_count(), 2);
    }

    #[test]
    fn test_panicking_once_binding_is_retired() {
        let mut event: Event<()> = Event::builder()
            .failure_policy(FailurePolicy::Log)
            .build();

        event.bind_once(|_| panic!("once"));
        event.raise(());

        assert_eq!(event.callback_count(), 0);
    }

    #[test]
    fn test_propagate_policy_resumes_after_pass() {
        let mut event: Event<()> = Event::named("OnPropagate");
        let after = Rc::new(Cell::new(0));
        let sink = after.clone();

        event.bind(|_| panic!("first"));
        event.bind(move |_| sink.set(sink.get() + 1));

        let result = panic::catch_unwind(AssertUnwindSafe(|| event.raise(())));
        let payload = result.unwrap_err();

        assert_eq!(panic_message(payload.as_ref()), "first");
        assert_eq!(after.get(), 1);
    }

    #[test]
    fn test_builder_and_config() {
        let event: Event<u8> = EventBuilder::new()
            .name("OnConfigured")
            .enable_logging(false)
            .failure_policy(FailurePolicy::Log)
            .build();

        assert_eq!(event.name(), "OnConfigured");
        assert!(!event.config().enable_logging);
        assert_eq!(event.config().failure_policy, FailurePolicy::Log);

        let unnamed: Event<u8> = Event::default();
        assert_eq!(unnamed.name(), "");
        assert_eq!(unnamed.config(), &EventConfig::default());
    }

    #[test]
    fn test_builder_infers_argument_type() {
        fn quiet<A>(name: &str) -> Event<A> {
            Event::builder().name(name).enable_logging(false).build()
        }

        let mut event: Event<(String, u32)> = quiet("OnPickup");
        let (seen, callback) = recorder::<(String, u32)>();
        event.bind(callback);
        event.raise(("Rifle".to_string(), 1));
        assert_eq!(*seen.borrow(), vec![("Rifle".to_string(), 1)]);

        let explicit = Event::<i32>::builder().name("OnExplicit").build();
        assert_eq!(explicit.name(), "OnExplicit");

        let from_default: Event<u8> = EventBuilder::default().build();
        assert_eq!(from_default.config(), &EventConfig::default());
    }

    #[test]
    fn test_reentrant_mutation_during_raise() {
        fn shared(policy: FailurePolicy) -> Rc<RefCell<Event<()>>> {
            let event: Rc<RefCell<Event<()>>> = Rc::new(RefCell::new(
                Event::builder()
                    .name("OnReentrant")
                    .failure_policy(policy)
                    .build(),
            ));
            let weak = Rc::downgrade(&event);
            event.borrow_mut().bind(move |_| {
                if let Some(event) = weak.upgrade() {
                    event.borrow_mut().bind(|_| {});
                }
            });
            event
        }

        // The raise holds the only mutable borrow; binding from inside a
        // callback trips the RefCell check and is reported like any panic.
        let event = shared(FailurePolicy::Propagate);
        let result = panic::catch_unwind(AssertUnwindSafe(|| event.borrow_mut().raise(())));
        let payload = result.unwrap_err();
        assert!(panic_message(payload.as_ref()).contains("already borrowed"));
        assert_eq!(event.borrow().callback_count(), 1);

        let event = shared(FailurePolicy::Log);
        event.borrow_mut().raise(());
        assert_eq!(event.borrow().callback_count(), 1);
    }

    #[test]
    fn test_remove_rc_releases_owned_target() {
        let mut event: Event<i32> = Event::named("OnAdd");
        let counter = Rc::new(Counter::default());

        event.bind_to(&counter, Counter::add);
        assert_eq!(Rc::strong_count(&counter), 2);

        assert!(event.remove_rc(&counter));
        assert!(!event.remove_rc(&counter));
        assert_eq!(Rc::strong_count(&counter), 1);

        event.raise(7);
        assert_eq!(counter.value.get(), 0);
    }

    #[test]
    fn test_bind_once_for_owner() {
        let mut event: Event<()> = Event::named("OnOwnerPing");
        let owner = Counter::default();
        let calls = Rc::new(Cell::new(0));
        let sink = calls.clone();

        event.bind_once_for(&owner, move |_| sink.set(sink.get() + 1));
        assert!(event.is_bound(&owner));

        event.raise(());
        event.raise(());

        assert_eq!(calls.get(), 1);
        assert!(!event.is_bound(&owner));
        assert!(event.is_empty());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EventConfig = serde_json::from_str(r#"{"failure_policy": "log"}"#).unwrap();
        assert!(config.enable_logging);
        assert_eq!(config.failure_policy, FailurePolicy::Log);

        let json = serde_json::to_value(EventConfig::default()).unwrap();
        assert_eq!(json["failure_policy"], "propagate");
    }
}
