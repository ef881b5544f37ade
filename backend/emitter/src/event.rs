/// Event keys.
///
/// An [`EventName`] is the runtime identity of an event key. An [`Event<P>`]
/// pairs a name with the payload type its listeners receive, so `on` and
/// `emit` are checked against each other at compile time.
use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::marker::PhantomData;

/// Fired with the event's name when a key gains its first listener.
pub const EVENT_INCLUDED: Event<EventName> = Event::new("ee-event-included");

/// Fired with the event's name when a key loses its last listener.
pub const EVENT_EXCLUDED: Event<EventName> = Event::new("ee-event-excluded");

// ---------------------------------------------------------------------------
// EventName
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EventName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EventName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EventName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Event<P>
// ---------------------------------------------------------------------------

/// A typed event key: listeners registered on it receive `&P`.
///
/// Two `Event`s with the same name address the same registry entry.
pub struct Event<P> {
    name: EventName,
    payload: PhantomData<fn() -> P>,
}

impl<P> Event<P> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: EventName::from_static(name),
            payload: PhantomData,
        }
    }

    /// Key with a name only known at runtime.
    pub fn named(name: impl Into<EventName>) -> Self {
        Self {
            name: name.into(),
            payload: PhantomData,
        }
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }
}

impl<P> Clone for Event<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            payload: PhantomData,
        }
    }
}

impl<P> fmt::Debug for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("payload", &std::any::type_name::<P>())
            .finish()
    }
}

impl<P> PartialEq for Event<P> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<P> Eq for Event<P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_static_and_owned_names_are_equal() {
        let owned = EventName::from("user.login".to_string());
        assert_eq!(owned, EventName::from_static("user.login"));
        assert_eq!(owned, "user.login");
        assert_eq!(owned.to_string(), "user.login");
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(EventName::from("tick".to_string()), 1);
        assert_eq!(map.get("tick"), Some(&1));
    }

    #[test]
    fn test_sentinel_names() {
        assert_eq!(EVENT_INCLUDED.name().as_str(), "ee-event-included");
        assert_eq!(EVENT_EXCLUDED.name().as_str(), "ee-event-excluded");
    }

    #[test]
    fn test_event_name_serializes_as_string() {
        let json = serde_json::to_string(&EventName::from("tick")).unwrap();
        assert_eq!(json, "\"tick\"");
        let name: EventName = serde_json::from_str("\"tock\"").unwrap();
        assert_eq!(name, "tock");
    }

    #[test]
    fn test_typed_keys_compare_by_name() {
        let a: Event<u32> = Event::new("count");
        let b: Event<u32> = Event::named("count".to_string());
        assert_eq!(a, b);
        assert_eq!(a.clone().name(), b.name());
    }
}
