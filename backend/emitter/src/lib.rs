//! `emitkit-emitter`: typed, synchronous publish/subscribe registry.
//!
//! Listeners are registered against typed event keys ([`Event<P>`]) and
//! called in the caller's thread, most recently registered first, when a
//! value is emitted on that key. With lifecycle events enabled (the
//! default), the registry also emits on [`EVENT_INCLUDED`] and
//! [`EVENT_EXCLUDED`] as keys gain their first listener or lose their last.
//!
//! ```
//! use emitkit_emitter::{Event, EventEmitter, Listener};
//!
//! const TICK: Event<u64> = Event::new("tick");
//!
//! let emitter = EventEmitter::new();
//! let subscription = emitter
//!     .on(&TICK, Listener::from_fn(|n: &u64| println!("tick {n}")))
//!     .unwrap();
//! emitter.emit(&TICK, &1).unwrap();
//! subscription.unsubscribe().unwrap();
//! assert_eq!(emitter.listener_count(&TICK), 0);
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod listener;
pub mod subscription;

pub use config::EmitterConfig;
pub use emitter::{EventEmitter, WeakEmitter};
pub use error::{ConfigError, EmitterError};
pub use event::{Event, EventName, EVENT_EXCLUDED, EVENT_INCLUDED};
pub use listener::Listener;
pub use subscription::Subscription;
