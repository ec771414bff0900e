// Sparkle - typed in-process events for Rust
//
// This library provides events that fan out synchronously to their listeners,
// with weak-reference bindings that unsubscribe themselves once the listener
// is dropped.

// Re-export core functionality
pub use sparkle_events::*;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Event,
        EventBinder,
        EventBuilder,
        EventConfig,
        EventError,
        FailurePolicy,
        SubscriberKey,
    };
}
