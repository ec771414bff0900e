//! Lifecycle-wrapped callbacks
//!
//! Every binding is stored as a [`LifecycleCallback`]: the user function plus
//! the rules that decide whether it stays registered after a raise. Running a
//! lifecycle callback returns a [`Status`]; anything other than
//! [`Status::Active`] removes it from the binder in the same pass.

use std::fmt;
use std::rc::{Rc, Weak};

/// Outcome of running a lifecycle callback once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The callback ran and stays registered
    Active,

    /// A once-binding ran and is done
    Finished,

    /// The weak target was gone; the user function was not called
    Expired,
}

impl Status {
    /// Whether the callback should stay registered
    pub fn is_active(self) -> bool {
        matches!(self, Status::Active)
    }
}

/// How often a binding fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Fire on every raise
    #[default]
    Always,

    /// Fire on the next raise only
    Once,
}

impl Repeat {
    pub(crate) fn from_once(once: bool) -> Self {
        if once { Repeat::Once } else { Repeat::Always }
    }

    fn after_call(self) -> Status {
        match self {
            Repeat::Always => Status::Active,
            Repeat::Once => Status::Finished,
        }
    }
}

/// Returns `false` when the target could not be reached.
type Invoke<A> = Box<dyn FnMut(&A) -> bool>;

/// Liveness check for weak bindings.
type LivenessCheck = Box<dyn Fn() -> bool>;

/// A user callback wrapped with its repeat mode and, for weak bindings, a
/// liveness check.
pub struct LifecycleCallback<A> {
    repeat: Repeat,
    alive: Option<LivenessCheck>,
    invoke: Invoke<A>,
}

impl<A> LifecycleCallback<A> {
    /// Wrap a callback that is always considered alive.
    pub fn unchecked<F>(repeat: Repeat, mut callback: F) -> Self
    where
        F: FnMut(&A) + 'static,
    {
        Self {
            repeat,
            alive: None,
            invoke: Box::new(move |args| {
                callback(args);
                true
            }),
        }
    }

    /// Wrap a callback that keeps its target alive through a strong `Rc`.
    pub fn owning<T, F>(target: Rc<T>, repeat: Repeat, mut callback: F) -> Self
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        Self {
            repeat,
            alive: None,
            invoke: Box::new(move |args| {
                callback(&target, args);
                true
            }),
        }
    }

    /// Wrap a callback that only runs while its weak target is alive.
    ///
    /// The target is upgraded right before the call and held for its
    /// duration, so it cannot be dropped between the check and the use.
    pub fn observing<T, F>(target: Weak<T>, repeat: Repeat, mut callback: F) -> Self
    where
        T: ?Sized + 'static,
        F: FnMut(&T, &A) + 'static,
    {
        let tracked = target.clone();
        Self {
            repeat,
            alive: Some(Box::new(move || tracked.strong_count() > 0)),
            invoke: Box::new(move |args| match target.upgrade() {
                Some(strong) => {
                    callback(&strong, args);
                    true
                }
                None => false,
            }),
        }
    }

    /// Run the callback and report whether it stays registered.
    pub fn run(&mut self, args: &A) -> Status {
        if (self.invoke)(args) {
            self.repeat.after_call()
        } else {
            Status::Expired
        }
    }

    /// Status of a callback whose user function panicked.
    ///
    /// A panic still counts as a call: once-bindings are retired, repeating
    /// bindings stay.
    pub fn settle_after_panic(&self) -> Status {
        self.repeat.after_call()
    }

    /// Whether the callback's target (if any) is still alive
    pub fn is_live(&self) -> bool {
        self.alive.as_ref().is_none_or(|alive| alive())
    }

    /// Whether liveness is checked before each call
    pub fn is_checked(&self) -> bool {
        self.alive.is_some()
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }
}

impl<A> fmt::Debug for LifecycleCallback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleCallback")
            .field("repeat", &self.repeat)
            .field("checked", &self.is_checked())
            .field("live", &self.is_live())
            .finish()
    }
}
