//! Movement events and the sources that supply them.
//!
//! The event log is the source of truth. Nothing in this crate mutates or
//! removes a recorded event; corrections are new compensating events.

pub mod event;
pub mod in_memory_log;
pub mod source;

pub use event::{Event, ProjectScoped};
pub use in_memory_log::InMemoryEventLog;
pub use source::{EventSourceError, MovementEventSource};
