/// Event registry.
///
/// Maps each event name to an ordered list of listeners (most recent
/// first) and keeps a second list of the names that currently have at least
/// one listener. A name is present in both structures exactly when its
/// listener list is non-empty: the list is created with its first listener
/// and dropped together with its last one.
///
/// The registry state sits behind a mutex that is never held while a
/// listener runs, so listeners may call back into the registry (`on`, `off`,
/// `emit`, `off_all`) on any key, including the key being emitted. Listeners
/// evicted by `off`/`off_all` are dropped after the lock is released, so
/// their destructors may call back into the registry as well.
use emitkit_list::{OrderedList, SharedList};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

use crate::config::EmitterConfig;
use crate::error::EmitterError;
use crate::event::{Event, EventName, EVENT_EXCLUDED, EVENT_INCLUDED};
use crate::listener::Listener;
use crate::subscription::Subscription;

// ---------------------------------------------------------------------------
// Type-erased per-key listener list
// ---------------------------------------------------------------------------

trait ListenerStore: Send + Sync {
    /// Unlink every listener and hand them back for dropping off-lock.
    fn clear(&self) -> Box<dyn Any + Send>;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<P: 'static> ListenerStore for SharedList<Listener<P>> {
    fn clear(&self) -> Box<dyn Any + Send> {
        Box::new(SharedList::clear(self))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

struct Entry {
    payload_type: &'static str,
    /// Distinguishes this inclusion of the key from later re-inclusions.
    activation: u64,
    store: Arc<dyn ListenerStore>,
}

impl Entry {
    fn new<P: 'static>(listeners: Arc<SharedList<Listener<P>>>, activation: u64) -> Self {
        Self {
            payload_type: std::any::type_name::<P>(),
            activation,
            store: listeners,
        }
    }

    fn listeners<P: 'static>(&self) -> Option<Arc<SharedList<Listener<P>>>> {
        Arc::clone(&self.store)
            .into_any()
            .downcast::<SharedList<Listener<P>>>()
            .ok()
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<EventName, Entry>,
    listened_events: OrderedList<EventName>,
    next_activation: u64,
}

impl State {
    /// First listened key, in list order, whose current inclusion is not in
    /// `notified`.
    fn next_unnotified(&self, notified: &HashSet<u64>) -> Option<(EventName, u64)> {
        self.listened_events.iter().find_map(|name| {
            let activation = self.entries.get(name)?.activation;
            (!notified.contains(&activation)).then(|| (name.clone(), activation))
        })
    }

    /// Listener list for `event`, if the key is registered with payload `P`.
    fn listeners<P: 'static>(&self, event: &Event<P>) -> Option<Arc<SharedList<Listener<P>>>> {
        let entry = self.entries.get(event.name())?;
        let listeners = entry.listeners::<P>();
        if listeners.is_none() {
            warn!(
                event = %event.name(),
                registered = entry.payload_type,
                requested = std::any::type_name::<P>(),
                "[Emitter] payload type mismatch, ignoring"
            );
        }
        listeners
    }
}

struct Inner {
    config: EmitterConfig,
    state: Mutex<State>,
}

// ---------------------------------------------------------------------------
// EventEmitter
// ---------------------------------------------------------------------------

/// Handle to an event registry. Clones share the same registry.
#[derive(Clone)]
pub struct EventEmitter {
    inner: Arc<Inner>,
}

impl EventEmitter {
    /// Registry with lifecycle notifications enabled.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        debug!(lifecycle_events = config.lifecycle_events, "[Emitter] created");
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.inner.config
    }

    /// Weak handle for listeners that need to reach the registry without
    /// keeping it alive.
    pub fn downgrade(&self) -> WeakEmitter {
        WeakEmitter {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register `listener` on `event`. It becomes the first listener called.
    ///
    /// When this is the key's first listener the key is added to
    /// [`EventEmitter::listened_events`] and, with lifecycle events on,
    /// [`EVENT_INCLUDED`] is emitted with its name. An error from that
    /// notification is returned, but the registration stays in place.
    pub fn on<P: 'static>(
        &self,
        event: &Event<P>,
        listener: Listener<P>,
    ) -> Result<Subscription, EmitterError> {
        let included = {
            let mut state = self.inner.state.lock();
            if state.entries.contains_key(event.name()) {
                if let Some(listeners) = state.listeners(event) {
                    listeners.prepend(listener.clone());
                }
                false
            } else {
                let listeners = Arc::new(SharedList::new());
                listeners.prepend(listener.clone());
                let activation = state.next_activation;
                state.next_activation += 1;
                state
                    .entries
                    .insert(event.name().clone(), Entry::new(listeners, activation));
                state.listened_events.prepend(event.name().clone());
                true
            }
        };

        let subscription = Subscription::new(self.downgrade(), event.clone(), listener);
        if included {
            debug!(event = %event.name(), "[Emitter] event included");
            self.notify(&EVENT_INCLUDED, event.name())?;
        }
        Ok(subscription)
    }

    /// Remove `listener` from `event`, or every listener of `event` when
    /// `listener` is `None`.
    ///
    /// Only the first registration of a listener added more than once is
    /// removed. When the key ends up with no listeners it is dropped and,
    /// with lifecycle events on, [`EVENT_EXCLUDED`] is emitted with its name.
    /// Unknown keys and listeners are ignored.
    pub fn off<P: 'static>(
        &self,
        event: &Event<P>,
        listener: Option<&Listener<P>>,
    ) -> Result<&Self, EmitterError> {
        let (evicted, entry) = {
            let mut state = self.inner.state.lock();
            let Some(listeners) = state.listeners(event) else {
                return Ok(self);
            };
            let evicted: Vec<Listener<P>> = match listener {
                Some(listener) => listeners.remove(listener).into_iter().collect(),
                None => listeners.clear(),
            };
            let entry = if listeners.is_empty() {
                state.listened_events.remove(event.name());
                state.entries.remove(event.name())
            } else {
                None
            };
            (evicted, entry)
        };
        let drained = entry.is_some();
        drop(evicted);
        drop(entry);
        if !drained {
            return Ok(self);
        }

        debug!(event = %event.name(), "[Emitter] event excluded");
        self.notify(&EVENT_EXCLUDED, event.name())?;
        Ok(self)
    }

    /// Call every listener of `event` with `data`, most recent first.
    ///
    /// The first listener error stops delivery and is returned. Listeners
    /// added during the emit are not called by it; listeners removed before
    /// their turn are skipped.
    pub fn emit<P: 'static>(&self, event: &Event<P>, data: &P) -> Result<&Self, EmitterError> {
        let listeners = {
            let state = self.inner.state.lock();
            state.listeners(event)
        };
        let Some(listeners) = listeners else {
            return Ok(self);
        };

        trace!(event = %event.name(), listeners = listeners.len(), "[Emitter] emit");
        listeners
            .for_each(|listener| listener.call(data))
            .map_err(|source| {
                warn!(event = %event.name(), error = %source, "[Emitter] listener failed");
                EmitterError::Listener {
                    event: event.name().clone(),
                    source,
                }
            })?;
        Ok(self)
    }

    /// Remove every listener of every key.
    ///
    /// With lifecycle events on, [`EVENT_EXCLUDED`] is first emitted for each
    /// listened key, in [`EventEmitter::listened_events`] order, while the
    /// listeners are still registered. The active list is re-read before
    /// every notification: a key removed by an earlier notification is not
    /// notified again, and a key added by one is notified too. A failing
    /// notification aborts before anything is removed.
    pub fn off_all(&self) -> Result<&Self, EmitterError> {
        if self.inner.config.lifecycle_events {
            let mut notified = HashSet::new();
            loop {
                let next = self.inner.state.lock().next_unnotified(&notified);
                let Some((name, activation)) = next else {
                    break;
                };
                notified.insert(activation);
                self.emit(&EVENT_EXCLUDED, &name)?;
            }
        }

        let (entries, evicted) = {
            let mut state = self.inner.state.lock();
            let entries = std::mem::take(&mut state.entries);
            let evicted: Vec<Box<dyn Any + Send>> =
                entries.values().map(|entry| entry.store.clear()).collect();
            state.listened_events.clear();
            (entries, evicted)
        };
        debug!(events = entries.len(), "[Emitter] all listeners removed");
        drop(evicted);
        drop(entries);
        Ok(self)
    }

    /// Number of listeners on `event`, 0 if it has none.
    pub fn listener_count<P: 'static>(&self, event: &Event<P>) -> usize {
        self.inner
            .state
            .lock()
            .listeners(event)
            .map_or(0, |listeners| listeners.len())
    }

    /// Names with at least one listener, most recently included first.
    pub fn listened_events(&self) -> Vec<EventName> {
        self.inner.state.lock().listened_events.to_vec()
    }

    /// Snapshot of the listeners on `event` in call order.
    pub fn listeners<P: 'static>(&self, event: &Event<P>) -> Vec<Listener<P>> {
        self.inner
            .state
            .lock()
            .listeners(event)
            .map(|listeners| listeners.to_vec())
            .unwrap_or_default()
    }

    fn notify(&self, sentinel: &Event<EventName>, name: &EventName) -> Result<(), EmitterError> {
        if self.inner.config.lifecycle_events {
            self.emit(sentinel, name)?;
        }
        Ok(())
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("EventEmitter")
            .field("config", &self.inner.config)
            .field("listened_events", &state.listened_events)
            .finish()
    }
}

/// Non-owning handle to an [`EventEmitter`].
#[derive(Clone, Default)]
pub struct WeakEmitter {
    inner: Weak<Inner>,
}

impl WeakEmitter {
    pub fn upgrade(&self) -> Option<EventEmitter> {
        self.inner.upgrade().map(|inner| EventEmitter { inner })
    }
}

impl std::fmt::Debug for WeakEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakEmitter")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
