//! Provenance classification for newly created bookings.
//!
//! Provenance is decided once, from the context that creates the event, and is
//! stored on the event. Nothing downstream re-derives it from event content.

use chrono::{DateTime, Utc};

use solarops_core::{BookingId, DomainResult, MaterialId, ProjectId};

use crate::movement::{Direction, MovementEvent, NewMovement, Provenance};

/// The context that is creating a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOrigin {
    /// An operator entered the line in the booking form.
    BookingForm,
    /// A saved product/system configuration is being booked out.
    SavedConfiguration { configuration_id: String },
    /// A BOM-expansion rule reacted to another booking.
    BomRule {
        rule_id: String,
        triggered_by: Option<BookingId>,
    },
    /// The creating context could not say where the line came from.
    Unknown,
}

/// Pick the provenance for a booking created from `origin`.
///
/// Anything ambiguous lands in `Manual`, the bucket an operator can always edit.
pub fn classify(origin: &BookingOrigin) -> Provenance {
    match origin {
        BookingOrigin::BookingForm => Provenance::Manual,
        BookingOrigin::SavedConfiguration { configuration_id }
            if !configuration_id.trim().is_empty() =>
        {
            Provenance::Configured
        }
        BookingOrigin::BomRule { rule_id, .. } if !rule_id.trim().is_empty() => Provenance::Auto,
        BookingOrigin::SavedConfiguration { .. }
        | BookingOrigin::BomRule { .. }
        | BookingOrigin::Unknown => Provenance::Manual,
    }
}

/// A booking as requested by a creating context, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub project_id: ProjectId,
    pub material_id: MaterialId,
    pub direction: Direction,
    pub quantity: f64,
    pub unit_price: Option<f64>,
}

/// Create a new movement event, stamping provenance from its origin.
pub fn book(
    request: BookingRequest,
    origin: &BookingOrigin,
    now: DateTime<Utc>,
) -> DomainResult<MovementEvent> {
    let provenance = classify(origin);
    tracing::debug!(
        project_id = %request.project_id,
        material_id = %request.material_id,
        ?origin,
        %provenance,
        "booking classified"
    );

    MovementEvent::record(NewMovement {
        booking_id: BookingId::new(),
        project_id: request.project_id,
        material_id: request.material_id,
        direction: request.direction,
        quantity: request.quantity,
        unit_price_at_booking: request.unit_price,
        provenance,
        timestamp: now,
    })
}

/// One material line of a saved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationLine {
    pub material_id: MaterialId,
    pub quantity: f64,
    pub unit_price: Option<f64>,
}

/// Expand a saved configuration into one booking per line.
///
/// All-or-nothing: a single invalid line rejects the whole configuration.
pub fn book_configuration(
    project_id: &ProjectId,
    configuration_id: &str,
    lines: &[ConfigurationLine],
    direction: Direction,
    now: DateTime<Utc>,
) -> DomainResult<Vec<MovementEvent>> {
    let origin = BookingOrigin::SavedConfiguration {
        configuration_id: configuration_id.to_string(),
    };

    lines
        .iter()
        .map(|line| {
            book(
                BookingRequest {
                    project_id: project_id.clone(),
                    material_id: line.material_id.clone(),
                    direction,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                },
                &origin,
                now,
            )
        })
        .collect()
}
