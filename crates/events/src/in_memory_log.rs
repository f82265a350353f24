//! In-memory append-only event log for tests/dev.

use std::sync::RwLock;

use solarops_core::ProjectId;

use crate::event::{Event, ProjectScoped};
use crate::source::{EventSourceError, MovementEventSource};

/// Append-only log.
///
/// - No IO / no async
/// - No update or delete operations
/// - Reads return owned snapshots, so a reader never observes a half-applied append
#[derive(Debug)]
pub struct InMemoryEventLog<E> {
    events: RwLock<Vec<E>>,
}

impl<E> Default for InMemoryEventLog<E> {
    fn default() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }
}

impl<E> InMemoryEventLog<E>
where
    E: Event + ProjectScoped,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a log from already-recorded events, keeping their order.
    pub fn from_events(events: impl IntoIterator<Item = E>) -> Self {
        Self {
            events: RwLock::new(events.into_iter().collect()),
        }
    }

    pub fn append(&self, event: E) -> Result<(), EventSourceError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| EventSourceError::Unavailable("lock poisoned".to_string()))?;

        tracing::trace!(
            event_type = event.event_type(),
            project_id = %event.project_id(),
            "event appended"
        );
        events.push(event);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, EventSourceError> {
        self.events
            .read()
            .map(|events| events.len())
            .map_err(|_| EventSourceError::Unavailable("lock poisoned".to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, EventSourceError> {
        self.len().map(|n| n == 0)
    }

    /// Every recorded event across all projects.
    pub fn snapshot(&self) -> Result<Vec<E>, EventSourceError> {
        let events = self
            .events
            .read()
            .map_err(|_| EventSourceError::Unavailable("lock poisoned".to_string()))?;
        Ok(events.clone())
    }
}

impl<E> MovementEventSource<E> for InMemoryEventLog<E>
where
    E: Event + ProjectScoped,
{
    fn events_for_project(&self, project_id: &ProjectId) -> Result<Vec<E>, EventSourceError> {
        let events = self
            .events
            .read()
            .map_err(|_| EventSourceError::Unavailable("lock poisoned".to_string()))?;

        Ok(events
            .iter()
            .filter(|e| e.project_id() == project_id)
            .cloned()
            .collect())
    }
}
