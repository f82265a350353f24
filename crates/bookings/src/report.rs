//! BOM and cost report for one project at one instant.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use solarops_core::ProjectId;
use solarops_events::{EventSourceError, MovementEventSource};

use crate::aggregator::aggregate;
use crate::catalog::MaterialCatalog;
use crate::movement::{MovementEvent, Provenance};
use crate::splitter::{BomSplit, BucketTotals, split};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to load booking events: {0}")]
    Source(#[from] EventSourceError),
}

/// Output handed to the BOM table and cost breakdown renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomReport {
    pub project_id: ProjectId,
    pub generated_at: DateTime<Utc>,
    pub split: BomSplit,
}

/// Cost totals by provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub manual: BucketTotals,
    pub configured: BucketTotals,
    pub auto: BucketTotals,
    pub total_cost: f64,
}

impl BomReport {
    /// Build from an already materialized snapshot of events and catalog.
    pub fn build<C>(
        project_id: ProjectId,
        events: &[MovementEvent],
        catalog: &C,
        generated_at: DateTime<Utc>,
    ) -> Self
    where
        C: MaterialCatalog + ?Sized,
    {
        let lines = aggregate(&project_id, events, catalog);
        Self {
            project_id,
            generated_at,
            split: split(lines),
        }
    }

    /// Pull the project's events from `source`, then build.
    pub fn from_sources<S, C>(
        project_id: ProjectId,
        source: &S,
        catalog: &C,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, ReportError>
    where
        S: MovementEventSource<MovementEvent> + ?Sized,
        C: MaterialCatalog + ?Sized,
    {
        let events = source.events_for_project(&project_id)?;
        tracing::info!(
            project_id = %project_id,
            events = events.len(),
            "building BOM report"
        );
        Ok(Self::build(project_id, &events, catalog, generated_at))
    }

    pub fn cost_breakdown(&self) -> CostBreakdown {
        CostBreakdown {
            manual: self.split.totals(Provenance::Manual),
            configured: self.split.totals(Provenance::Configured),
            auto: self.split.totals(Provenance::Auto),
            total_cost: self.split.grand_total_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, Material};
    use crate::movement::{Direction, NewMovement};
    use crate::provenance::{BookingOrigin, BookingRequest, book};
    use solarops_core::{BookingId, MaterialId};
    use solarops_events::InMemoryEventLog;

    struct BrokenSource;

    impl MovementEventSource<MovementEvent> for BrokenSource {
        fn events_for_project(
            &self,
            _project_id: &ProjectId,
        ) -> Result<Vec<MovementEvent>, EventSourceError> {
            Err(EventSourceError::Unavailable("subscription dropped".to_string()))
        }
    }

    fn request(material: &str, direction: Direction, qty: f64, price: f64) -> BookingRequest {
        BookingRequest {
            project_id: ProjectId::new("proj-1").unwrap(),
            material_id: MaterialId::new(material).unwrap(),
            direction,
            quantity: qty,
            unit_price: Some(price),
        }
    }

    #[test]
    fn report_from_log_splits_by_origin() {
        let now = Utc::now();
        let log = InMemoryEventLog::new();
        let rule = BookingOrigin::BomRule {
            rule_id: "rail-per-module".to_string(),
            triggered_by: None,
        };
        let cfg = BookingOrigin::SavedConfiguration {
            configuration_id: "cfg-10kwp".to_string(),
        };

        log.append(book(request("module", Direction::Out, 24.0, 110.0), &cfg, now).unwrap())
            .unwrap();
        log.append(book(request("rail", Direction::Out, 12.0, 18.0), &rule, now).unwrap())
            .unwrap();
        log.append(
            book(request("rail", Direction::Out, 2.0, 18.0), &BookingOrigin::BookingForm, now)
                .unwrap(),
        )
        .unwrap();
        log.append(
            MovementEvent::record(NewMovement {
                booking_id: BookingId::new(),
                project_id: ProjectId::new("proj-2").unwrap(),
                material_id: MaterialId::new("module").unwrap(),
                direction: Direction::Out,
                quantity: 99.0,
                unit_price_at_booking: Some(1.0),
                provenance: Provenance::Manual,
                timestamp: now,
            })
            .unwrap(),
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_materials(vec![Material {
            id: MaterialId::new("module").unwrap(),
            description: "PV module 410Wp".to_string(),
            unit: "pcs".to_string(),
            items_per_unit: None,
            current_price: Some(95.0),
        }]);

        let report =
            BomReport::from_sources(ProjectId::new("proj-1").unwrap(), &log, &catalog, now)
                .unwrap();

        assert_eq!(report.split.manual.len(), 1);
        assert_eq!(report.split.configured.len(), 1);
        assert_eq!(report.split.auto.len(), 1);
        assert_eq!(report.split.configured[0].description, "PV module 410Wp");
        assert_eq!(report.split.manual[0].description, "rail");

        let costs = report.cost_breakdown();
        assert_eq!(costs.configured.net_cost, 24.0 * 110.0);
        assert_eq!(costs.auto.net_cost, 12.0 * 18.0);
        assert_eq!(costs.manual.net_cost, 2.0 * 18.0);
        assert_eq!(costs.total_cost, 2640.0 + 216.0 + 36.0);
    }

    #[test]
    fn source_failure_is_reported() {
        let err = BomReport::from_sources(
            ProjectId::new("proj-1").unwrap(),
            &BrokenSource,
            &InMemoryCatalog::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Source(EventSourceError::Unavailable(_))));
    }

    #[test]
    fn report_serializes_buckets() {
        let report = BomReport::build(
            ProjectId::new("proj-1").unwrap(),
            &[],
            &InMemoryCatalog::new(),
            Utc::now(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["projectId"], "proj-1");
        assert!(json["split"]["manual"].as_array().unwrap().is_empty());
    }
}
