use thiserror::Error;

use crate::event::EventName;

/// Errors surfaced by [`crate::EventEmitter`] operations.
///
/// The registry itself never fails: unknown keys, unknown listeners and
/// payload-type mismatches are no-ops. The only error is a listener
/// reporting failure while an event is being delivered.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("listener for event `{event}` failed: {source}")]
    Listener {
        event: EventName,
        #[source]
        source: anyhow::Error,
    },
}

impl EmitterError {
    /// Name of the event whose delivery was aborted.
    pub fn event(&self) -> &EventName {
        match self {
            Self::Listener { event, .. } => event,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid emitter config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
