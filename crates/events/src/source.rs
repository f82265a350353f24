//! Movement event source abstraction.
//!
//! A source hands out the **full** event set of one project as a snapshot.
//! There is no pagination and no delta mode: callers recompute from whatever
//! the latest snapshot contains.

use thiserror::Error;

use solarops_core::ProjectId;

use crate::event::{Event, ProjectScoped};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventSourceError {
    /// The backing store could not produce a consistent snapshot.
    #[error("event source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the booking events of a project.
pub trait MovementEventSource<E>: Send + Sync
where
    E: Event + ProjectScoped,
{
    /// All events recorded for `project_id`, in recording order.
    fn events_for_project(&self, project_id: &ProjectId) -> Result<Vec<E>, EventSourceError>;
}

impl<E, S> MovementEventSource<E> for std::sync::Arc<S>
where
    E: Event + ProjectScoped,
    S: MovementEventSource<E> + ?Sized,
{
    fn events_for_project(&self, project_id: &ProjectId) -> Result<Vec<E>, EventSourceError> {
        (**self).events_for_project(project_id)
    }
}
