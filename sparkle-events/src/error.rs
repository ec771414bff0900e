//! Event errors

use crate::key::SubscriberKey;
use std::any::Any;

/// Errors reported by [`Event::try_raise`](crate::Event::try_raise).
///
/// Missing keys and expired targets are not errors; those operations report
/// `false` instead.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("{} callback(s) panicked while raising event '{event}'", .failures.len())]
    CallbacksFailed {
        event: String,
        failures: Vec<CallbackFailure>,
    },
}

impl EventError {
    /// Failures carried by this error
    pub fn failures(&self) -> &[CallbackFailure] {
        match self {
            EventError::CallbacksFailed { failures, .. } => failures,
        }
    }
}

/// A callback that panicked during a raise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("callback bound to {key} panicked: {message}")]
pub struct CallbackFailure {
    /// Key the callback was bound under
    pub key: SubscriberKey,

    /// Panic message, when the payload was a string
    pub message: String,
}

impl CallbackFailure {
    pub(crate) fn from_panic(key: SubscriberKey, payload: &(dyn Any + Send)) -> Self {
        Self {
            key,
            message: panic_message(payload),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Result alias for event operations
pub type EventResult<T> = Result<T, EventError>;
