use chrono::{DateTime, Utc};

use solarops_core::ProjectId;

/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - designed to be **append-only**
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "bookings.material.booked_out").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// An event that belongs to exactly one project for its whole lifetime.
pub trait ProjectScoped {
    fn project_id(&self) -> &ProjectId;
}
