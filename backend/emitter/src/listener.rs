use std::fmt;
use std::sync::Arc;

type ListenerFn<P> = dyn Fn(&P) -> anyhow::Result<()> + Send + Sync;

/// A callback registered against an [`crate::Event<P>`].
///
/// Listeners are compared by identity: clones of one listener are equal,
/// two listeners built from identical closures are not. Keep a clone around
/// to pass to [`crate::EventEmitter::off`].
pub struct Listener<P> {
    callback: Arc<ListenerFn<P>>,
}

impl<P> Listener<P> {
    /// Listener that may fail. An `Err` aborts the emit that invoked it.
    pub fn new(callback: impl Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn from_fn(callback: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self::new(move |payload| {
            callback(payload);
            Ok(())
        })
    }

    pub fn call(&self, payload: &P) -> anyhow::Result<()> {
        (self.callback)(payload)
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(&other.callback))
    }
}

impl<P> Eq for Listener<P> {}

impl<P> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = Listener::from_fn(|_: &u32| {});
        let b = Listener::from_fn(|_: &u32| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_call_forwards_result() {
        let ok = Listener::from_fn(|_: &u32| {});
        let failing = Listener::new(|v: &u32| anyhow::bail!("rejected {v}"));
        assert!(ok.call(&1).is_ok());
        assert_eq!(failing.call(&7).unwrap_err().to_string(), "rejected 7");
    }
}
