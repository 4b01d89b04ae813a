//! Subscriber identity
//!
//! A `Subscriber` is a named callback. Clones share one identity, so the value
//! used to register can later be used to unregister. The engine keeps only a
//! `WeakSubscriber`; the registering side owns the callback.

use std::fmt;
use std::sync::{Arc, Weak};

use contracts::{ContractError, LogEvent};

type Callback = dyn Fn(&LogEvent) -> Result<(), ContractError> + Send + Sync;

struct SubscriberInner {
    name: String,
    callback: Box<Callback>,
}

/// Log event subscriber
#[derive(Clone)]
pub struct Subscriber {
    inner: Arc<SubscriberInner>,
}

impl Subscriber {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&LogEvent) -> Result<(), ContractError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(SubscriberInner {
                name: name.into(),
                callback: Box::new(callback),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Invoke the callback
    pub fn call(&self, event: &LogEvent) -> Result<(), ContractError> {
        (self.inner.callback)(event)
    }

    pub(crate) fn downgrade(&self) -> WeakSubscriber {
        WeakSubscriber {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Subscriber {}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("name", &self.inner.name)
            .field("id", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

/// Non-owning subscriber reference held in registry slots
///
/// The weak count keeps the allocation reserved, so pointer identity stays
/// unique even after the owner drops the subscriber.
#[derive(Clone)]
pub(crate) struct WeakSubscriber {
    inner: Weak<SubscriberInner>,
}

impl WeakSubscriber {
    pub(crate) fn upgrade(&self) -> Option<Subscriber> {
        self.inner.upgrade().map(|inner| Subscriber { inner })
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub(crate) fn refers_to(&self, subscriber: &Subscriber) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(&subscriber.inner))
    }
}
