use std::fmt;

use crate::emitter::{EventEmitter, WeakEmitter};
use crate::error::EmitterError;
use crate::event::{Event, EventName};
use crate::listener::Listener;

type Unsubscribe = dyn Fn(&EventEmitter) -> Result<(), EmitterError> + Send + Sync;

/// Returned by [`EventEmitter::on`]; removes that one registration.
///
/// Dropping a subscription leaves the listener registered. It only holds a
/// weak handle, so it does not keep the registry alive.
pub struct Subscription {
    emitter: WeakEmitter,
    event: EventName,
    unsubscribe: Box<Unsubscribe>,
}

impl Subscription {
    pub(crate) fn new<P: 'static>(
        emitter: WeakEmitter,
        event: Event<P>,
        listener: Listener<P>,
    ) -> Self {
        Self {
            emitter,
            event: event.name().clone(),
            unsubscribe: Box::new(move |emitter: &EventEmitter| {
                emitter.off(&event, Some(&listener))?;
                Ok(())
            }),
        }
    }

    /// Equivalent to `off(event, Some(&listener))`. Calling it again, or
    /// after the registry is gone, does nothing.
    pub fn unsubscribe(&self) -> Result<(), EmitterError> {
        match self.emitter.upgrade() {
            Some(emitter) => (self.unsubscribe)(&emitter),
            None => Ok(()),
        }
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("emitter", &self.emitter)
            .finish()
    }
}
