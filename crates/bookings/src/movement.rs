use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solarops_core::{BookingId, DomainError, DomainResult, MaterialId, ProjectId};
use solarops_events::{Event, ProjectScoped};

/// Stock movement direction.
///
/// `In` puts material back on hand (a return), `Out` issues it to the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Sign of this direction in project net terms (OUT minus IN).
    pub fn sign(self) -> f64 {
        match self {
            Direction::In => -1.0,
            Direction::Out => 1.0,
        }
    }
}

/// Origin category of a booking, fixed when the event is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provenance {
    /// An operator added the line by hand.
    #[default]
    Manual,
    /// Expanded from a saved product/system configuration.
    Configured,
    /// Produced by an automatic bill-of-materials rule.
    Auto,
}

impl Provenance {
    /// Presentation order of the BOM buckets.
    pub const ALL: [Provenance; 3] = [Provenance::Manual, Provenance::Configured, Provenance::Auto];

    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Manual => "MANUAL",
            Provenance::Configured => "CONFIGURED",
            Provenance::Auto => "AUTO",
        }
    }
}

impl core::fmt::Display for Provenance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for recording a new movement event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub booking_id: BookingId,
    pub project_id: ProjectId,
    pub material_id: MaterialId,
    pub direction: Direction,
    pub quantity: f64,
    pub unit_price_at_booking: Option<f64>,
    pub provenance: Provenance,
    pub timestamp: DateTime<Utc>,
}

/// Event: one row in the immutable booking log.
///
/// Fields are private: project, material, provenance and direction never
/// change after creation. Deserialization goes through [`MovementEvent::record`],
/// so a stored document with a bad quantity or price is rejected on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredMovement")]
pub struct MovementEvent {
    booking_id: BookingId,
    project_id: ProjectId,
    material_id: MaterialId,
    direction: Direction,
    quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit_price_at_booking: Option<f64>,
    provenance: Provenance,
    timestamp: DateTime<Utc>,
}

/// Document shape of a movement as read from the store, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMovement {
    booking_id: BookingId,
    project_id: ProjectId,
    material_id: MaterialId,
    direction: Direction,
    quantity: f64,
    #[serde(default)]
    unit_price_at_booking: Option<f64>,
    #[serde(default)]
    provenance: Provenance,
    timestamp: DateTime<Utc>,
}

impl TryFrom<StoredMovement> for MovementEvent {
    type Error = DomainError;

    fn try_from(doc: StoredMovement) -> Result<Self, Self::Error> {
        MovementEvent::record(NewMovement {
            booking_id: doc.booking_id,
            project_id: doc.project_id,
            material_id: doc.material_id,
            direction: doc.direction,
            quantity: doc.quantity,
            unit_price_at_booking: doc.unit_price_at_booking,
            provenance: doc.provenance,
            timestamp: doc.timestamp,
        })
    }
}

impl MovementEvent {
    /// Validate and record a movement.
    pub fn record(new: NewMovement) -> DomainResult<Self> {
        if !new.quantity.is_finite() || new.quantity <= 0.0 {
            return Err(DomainError::validation("quantity must be a positive number"));
        }
        if let Some(price) = new.unit_price_at_booking {
            if !price.is_finite() || price < 0.0 {
                return Err(DomainError::validation(
                    "unit price must be a non-negative number",
                ));
            }
        }

        Ok(Self {
            booking_id: new.booking_id,
            project_id: new.project_id,
            material_id: new.material_id,
            direction: new.direction,
            quantity: new.quantity,
            unit_price_at_booking: new.unit_price_at_booking,
            provenance: new.provenance,
            timestamp: new.timestamp,
        })
    }

    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    pub fn material_id(&self) -> &MaterialId {
        &self.material_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit_price_at_booking(&self) -> Option<f64> {
        self.unit_price_at_booking
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Recorded price, or 0 for an unpriced movement.
    pub fn effective_unit_price(&self) -> f64 {
        self.unit_price_at_booking.unwrap_or(0.0)
    }

    /// Quantity contribution to the project net (positive for OUT).
    pub fn signed_quantity(&self) -> f64 {
        self.direction.sign() * self.quantity
    }

    /// Cost contribution at the price recorded for this movement.
    pub fn signed_cost(&self) -> f64 {
        self.direction.sign() * self.quantity * self.effective_unit_price()
    }
}

impl Event for MovementEvent {
    fn event_type(&self) -> &'static str {
        match self.direction {
            Direction::Out => "bookings.material.booked_out",
            Direction::In => "bookings.material.booked_in",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl ProjectScoped for MovementEvent {
    fn project_id(&self) -> &ProjectId {
        &self.project_id
    }
}
