//! Typed in-process events for Sparkle
//!
//! This crate provides a single-threaded publish/subscribe primitive: an
//! [`Event`] that any number of listeners subscribe to, with automatic
//! unsubscription when a listener bound through a weak reference is dropped.
//!
//! ## Features
//!
//! - **Typed** - One argument type per event, checked at compile time
//! - **Synchronous** - Raising runs every listener on the calling thread
//! - **Lifecycle-aware** - Weak bindings are evicted on the next raise
//! - **Fire once** - Every binding form has a once variant
//! - **Grouped removal** - Remove all callbacks of one subscriber at once
//!
//! ## Quick Start
//!
//! ```rust
//! use sparkle_events::Event;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! struct Hud {
//!     weapon: Cell<&'static str>,
//! }
//!
//! impl Hud {
//!     fn show_weapon(&self, name: &&'static str) {
//!         self.weapon.set(*name);
//!     }
//! }
//!
//! let mut on_weapon_picked: Event<&'static str> = Event::named("OnWeaponPicked");
//! let hud = Rc::new(Hud { weapon: Cell::new("") });
//!
//! // Weak binding: the HUD is not kept alive by the event
//! on_weapon_picked.bind_weak(&Rc::downgrade(&hud), Hud::show_weapon);
//!
//! // Standalone binding that fires on the next raise only
//! on_weapon_picked.bind_once(|name| println!("first pickup: {name}"));
//!
//! on_weapon_picked.raise("Shotgun");
//! assert_eq!(hud.weapon.get(), "Shotgun");
//! assert_eq!(on_weapon_picked.callback_count(), 1);
//! ```
//!
//! ## Binding forms
//!
//! | Method          | Key                | Target held | Liveness checked |
//! |-----------------|--------------------|-------------|------------------|
//! | `bind`          | standalone         | no          | no               |
//! | `bind_for`      | `&T` address       | no          | no               |
//! | `bind_to`       | `Rc<T>` address    | strong      | no               |
//! | `bind_weak`     | `Weak<T>` address  | weak        | before each call |
//!
//! Each has a `*_once` variant.
//!
//! ## Error Handling
//!
//! ```rust
//! use sparkle_events::{Event, EventError, FailurePolicy};
//!
//! let mut event: Event<i32> = Event::builder()
//!     .name("OnDamage")
//!     .failure_policy(FailurePolicy::Log) // Log callback panics, don't resume them
//!     .build();
//!
//! event.bind(|damage| assert!(*damage < 100, "damage overflow"));
//!
//! match event.try_raise(250) {
//!     Ok(()) => println!("All callbacks succeeded"),
//!     Err(EventError::CallbacksFailed { failures, .. }) => {
//!         assert_eq!(failures[0].message, "damage overflow");
//!     }
//! }
//! ```

pub mod binder;
pub mod error;
pub mod event;
pub mod key;
pub mod lifecycle;

pub use binder::EventBinder;
pub use error::{CallbackFailure, EventError, EventResult};
pub use event::{Event, EventBuilder, EventConfig, FailurePolicy};
pub use key::SubscriberKey;
pub use lifecycle::{LifecycleCallback, Repeat, Status};
