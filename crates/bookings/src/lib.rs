//! Booking aggregation engine.
//!
//! Turns a project's append-only log of material movements into a
//! point-in-time bill of materials and cost report:
//!
//! events → (provenance stamped at creation) → net per material/provenance →
//! enrich from catalog → split into manual / configured / auto buckets.
//!
//! Deterministic domain logic only (no IO, no shared state, no caching).

pub mod aggregator;
pub mod catalog;
pub mod movement;
pub mod provenance;
pub mod report;
pub mod splitter;

pub use aggregator::{AggregatedLine, NET_QUANTITY_TOLERANCE, aggregate};
pub use catalog::{InMemoryCatalog, Material, MaterialCatalog, MaterialDetails};
pub use movement::{Direction, MovementEvent, NewMovement, Provenance};
pub use provenance::{
    BookingOrigin, BookingRequest, ConfigurationLine, book, book_configuration, classify,
};
pub use report::{BomReport, CostBreakdown, ReportError};
pub use splitter::{BomSplit, BucketTotals, NumberedLine, split};
