//! Post-commit event publication.
//!
//! After a commit lands, the engine hands a [`CommitNotice`] to the
//! configured [`EventSink`] (typically the feed of a search-index
//! projection). Publication is fire-and-forget: the commit is already
//! durable, so a sink failure is logged and dropped.

use parking_lot::Mutex;
use rmap_core::{Agent, Disco, Event};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An object as it was before or after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSnapshot {
    Disco(Disco),
    Agent(Agent),
}

/// A committed event with the affected objects before and after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNotice {
    pub event: Event,
    pub before: Vec<ObjectSnapshot>,
    pub after: Vec<ObjectSnapshot>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("event sink failed: {0}")]
    Failed(String),
}

/// Receiver of committed events.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    fn publish(&self, notice: &CommitNotice) -> Result<(), SinkError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn publish(&self, _notice: &CommitNotice) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Logs each notice as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, notice: &CommitNotice) -> Result<(), SinkError> {
        tracing::info!(
            target: "rmap::events",
            event_id = %notice.event.id,
            event_type = %notice.event.event_type(),
            agent = %notice.event.associated_agent,
            before = notice.before.len(),
            after = notice.after.len(),
            "provenance event published"
        );
        Ok(())
    }
}

/// Collects notices in memory. Can be told to fail, to exercise the
/// engine's handling of sink errors.
#[derive(Debug, Default)]
pub struct MemorySink {
    notices: Mutex<Vec<CommitNotice>>,
    failing: Mutex<bool>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<CommitNotice> {
        self.notices.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }

    /// While `failing`, `publish` records nothing and returns an error.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

impl EventSink for MemorySink {
    fn publish(&self, notice: &CommitNotice) -> Result<(), SinkError> {
        if *self.failing.lock() {
            return Err(SinkError::Failed("memory sink set to fail".to_string()));
        }
        self.notices.lock().push(notice.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmap_core::{EventPayload, EventTargetType, Iri, RequestAgent, Timestamp};

    fn notice() -> CommitNotice {
        let id = Iri::new("rmap:e1").unwrap();
        CommitNotice {
            event: Event::new(
                id,
                EventTargetType::Disco,
                &RequestAgent::new(Iri::new("rmap:agent").unwrap()),
                Timestamp::from_epoch_millis(0).unwrap(),
                EventPayload::Inactivation {
                    inactivated_object_id: Iri::new("rmap:d1").unwrap(),
                },
            ),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    #[test]
    fn memory_sink_collects() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.publish(&notice()).unwrap();
        sink.publish(&notice()).unwrap();
        assert_eq!(sink.len(), 2);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn failing_memory_sink_records_nothing() {
        let sink = MemorySink::new();
        sink.set_failing(true);
        assert!(sink.publish(&notice()).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn noop_and_tracing_sinks_accept() {
        assert!(NoopSink.publish(&notice()).is_ok());
        assert!(TracingSink.publish(&notice()).is_ok());
    }
}
