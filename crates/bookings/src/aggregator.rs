//! Net aggregation of a project's booking log.
//!
//! Lines are keyed by `(material, provenance)`, so one catalog item can show up
//! once per provenance. Every call recomputes from the full event set; there is
//! no running total to keep in sync.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use solarops_core::{MaterialId, ProjectId};
use solarops_events::{Event, ProjectScoped};

use crate::catalog::{MaterialCatalog, MaterialDetails};
use crate::movement::{Direction, MovementEvent, Provenance};

/// Net quantities within this distance of zero count as fully returned.
///
/// Fractional movements (e.g. 0.1 + 0.2 out, 0.3 back) leave float residue.
pub const NET_QUANTITY_TOLERANCE: f64 = 1e-9;

fn is_zero_net(quantity: f64) -> bool {
    quantity.abs() < NET_QUANTITY_TOLERANCE
}

/// One BOM line derived from the log. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedLine {
    pub project_id: ProjectId,
    pub material_id: MaterialId,
    pub provenance: Provenance,
    pub description: String,
    pub unit: String,
    pub items_per_unit: Option<f64>,
    /// OUT quantity minus IN quantity, unrounded.
    pub net_quantity: f64,
    /// OUT cost minus IN cost, each at its own recorded price.
    pub net_cost: f64,
    pub avg_price_per_unit: f64,
    /// Number of events folded into this line.
    pub event_count: usize,
    pub first_booked_at: DateTime<Utc>,
}

impl AggregatedLine {
    pub fn key(&self) -> (&MaterialId, Provenance) {
        (&self.material_id, self.provenance)
    }

    /// Booked and then fully returned, up to [`NET_QUANTITY_TOLERANCE`].
    pub fn is_fully_returned(&self) -> bool {
        is_zero_net(self.net_quantity)
    }
}

/// Running sums for one `(material, provenance)` key.
#[derive(Debug, Clone)]
struct Accumulator {
    material_id: MaterialId,
    provenance: Provenance,
    quantity_out: f64,
    quantity_in: f64,
    cost_out: f64,
    cost_in: f64,
    nonzero_price_sum: f64,
    nonzero_price_count: usize,
    event_count: usize,
    first_booked_at: DateTime<Utc>,
}

impl Accumulator {
    fn new(event: &MovementEvent) -> Self {
        Self {
            material_id: event.material_id().clone(),
            provenance: event.provenance(),
            quantity_out: 0.0,
            quantity_in: 0.0,
            cost_out: 0.0,
            cost_in: 0.0,
            nonzero_price_sum: 0.0,
            nonzero_price_count: 0,
            event_count: 0,
            first_booked_at: event.occurred_at(),
        }
    }

    fn add(&mut self, event: &MovementEvent) {
        let price = event.effective_unit_price();
        let cost = event.quantity() * price;

        match event.direction() {
            Direction::Out => {
                self.quantity_out += event.quantity();
                self.cost_out += cost;
            }
            Direction::In => {
                self.quantity_in += event.quantity();
                self.cost_in += cost;
            }
        }

        if price != 0.0 {
            self.nonzero_price_sum += price;
            self.nonzero_price_count += 1;
        }

        self.event_count += 1;
        if event.occurred_at() < self.first_booked_at {
            self.first_booked_at = event.occurred_at();
        }
    }

    fn net_quantity(&self) -> f64 {
        self.quantity_out - self.quantity_in
    }

    fn net_cost(&self) -> f64 {
        self.cost_out - self.cost_in
    }

    fn avg_price_per_unit(&self) -> f64 {
        let net_quantity = self.net_quantity();
        if !is_zero_net(net_quantity) {
            return self.net_cost() / net_quantity;
        }
        // IN fully offsets OUT: fall back to the plain mean of recorded prices.
        if self.nonzero_price_count == 0 {
            0.0
        } else {
            self.nonzero_price_sum / self.nonzero_price_count as f64
        }
    }

    fn into_line<C>(self, project_id: &ProjectId, catalog: &C) -> AggregatedLine
    where
        C: MaterialCatalog + ?Sized,
    {
        let details = MaterialDetails::lookup(catalog, &self.material_id);
        let net_quantity = self.net_quantity();
        let net_cost = self.net_cost();
        let avg_price_per_unit = self.avg_price_per_unit();

        AggregatedLine {
            project_id: project_id.clone(),
            material_id: self.material_id,
            provenance: self.provenance,
            description: details.description,
            unit: details.unit,
            items_per_unit: details.items_per_unit,
            net_quantity,
            net_cost,
            avg_price_per_unit,
            event_count: self.event_count,
            first_booked_at: self.first_booked_at,
        }
    }
}

/// Fold the booking log of `project_id` into net BOM lines.
///
/// - Events of other projects are skipped.
/// - Output order is the order in which each key first appears in `events`.
/// - A key whose movements cancel out is still emitted with a net of zero.
/// - Materials the catalog does not know get placeholder details.
///
/// Pure: the same input always produces the same output.
pub fn aggregate<C>(
    project_id: &ProjectId,
    events: &[MovementEvent],
    catalog: &C,
) -> Vec<AggregatedLine>
where
    C: MaterialCatalog + ?Sized,
{
    let _span = tracing::debug_span!(
        "bookings.aggregate",
        project_id = %project_id,
        events = events.len()
    )
    .entered();

    let mut index: HashMap<(MaterialId, Provenance), usize> = HashMap::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();
    let mut foreign = 0usize;

    for event in events {
        if event.project_id() != project_id {
            foreign += 1;
            continue;
        }

        let key = (event.material_id().clone(), event.provenance());
        let slot = *index.entry(key).or_insert_with(|| {
            accumulators.push(Accumulator::new(event));
            accumulators.len() - 1
        });
        accumulators[slot].add(event);
    }

    if foreign > 0 {
        tracing::warn!(
            project_id = %project_id,
            skipped = foreign,
            "ignoring events that belong to other projects"
        );
    }

    let lines: Vec<AggregatedLine> = accumulators
        .into_iter()
        .map(|acc| acc.into_line(project_id, catalog))
        .collect();

    tracing::debug!(lines = lines.len(), "aggregation complete");
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, Material};
    use crate::movement::NewMovement;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use solarops_core::BookingId;

    fn project() -> ProjectId {
        ProjectId::new("proj-1").unwrap()
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap()
    }

    fn event_in(
        project_id: &str,
        material: &str,
        direction: Direction,
        quantity: f64,
        price: Option<f64>,
        provenance: Provenance,
        minute: i64,
    ) -> MovementEvent {
        MovementEvent::record(NewMovement {
            booking_id: BookingId::new(),
            project_id: ProjectId::new(project_id).unwrap(),
            material_id: MaterialId::new(material).unwrap(),
            direction,
            quantity,
            unit_price_at_booking: price,
            provenance,
            timestamp: base_time() + Duration::minutes(minute),
        })
        .unwrap()
    }

    fn event(
        material: &str,
        direction: Direction,
        quantity: f64,
        price: Option<f64>,
        provenance: Provenance,
    ) -> MovementEvent {
        event_in("proj-1", material, direction, quantity, price, provenance, 0)
    }

    fn empty_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
    }

    #[test]
    fn partial_return_at_different_price() {
        let events = vec![
            event("M1", Direction::Out, 10.0, Some(2.00), Provenance::Manual),
            event("M1", Direction::In, 4.0, Some(2.50), Provenance::Manual),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        assert_eq!(line.material_id.as_str(), "M1");
        assert_eq!(line.provenance, Provenance::Manual);
        assert_eq!(line.net_quantity, 6.0);
        assert!((line.net_cost - 10.0).abs() < 1e-9);
        assert!((line.avg_price_per_unit - 10.0 / 6.0).abs() < 1e-9);
        assert_eq!(line.event_count, 2);
    }

    #[test]
    fn dangling_material_uses_raw_id() {
        let events = vec![event("M2", Direction::Out, 2.0, Some(5.0), Provenance::Configured)];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].description, "M2");
        assert_eq!(lines[0].unit, "");
        assert_eq!(lines[0].items_per_unit, None);
        assert_eq!(lines[0].net_quantity, 2.0);
        assert_eq!(lines[0].net_cost, 10.0);
    }

    #[test]
    fn catalog_attributes_are_joined() {
        let catalog = InMemoryCatalog::from_materials(vec![Material {
            id: MaterialId::new("M1").unwrap(),
            description: "End clamp 35mm".to_string(),
            unit: "box".to_string(),
            items_per_unit: Some(50.0),
            current_price: Some(99.0),
        }]);
        let events = vec![event("M1", Direction::Out, 2.0, Some(20.0), Provenance::Auto)];

        let lines = aggregate(&project(), &events, &catalog);
        assert_eq!(lines[0].description, "End clamp 35mm");
        assert_eq!(lines[0].unit, "box");
        assert_eq!(lines[0].items_per_unit, Some(50.0));
        // Historical price, not today's list price.
        assert_eq!(lines[0].net_cost, 40.0);
    }

    #[test]
    fn fully_returned_line_stays_visible() {
        let events = vec![
            event("M1", Direction::Out, 3.0, Some(4.0), Provenance::Manual),
            event("M1", Direction::In, 3.0, Some(6.0), Provenance::Manual),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_fully_returned());
        assert_eq!(lines[0].net_cost, 12.0 - 18.0);
        // Mean of the recorded prices.
        assert_eq!(lines[0].avg_price_per_unit, 5.0);
    }

    #[test]
    fn fractional_return_counts_as_fully_returned() {
        let events = vec![
            event("M1", Direction::Out, 0.1, Some(2.0), Provenance::Manual),
            event("M1", Direction::Out, 0.2, Some(2.0), Provenance::Manual),
            event("M1", Direction::In, 0.3, Some(2.0), Provenance::Manual),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines.len(), 1);
        assert_ne!(lines[0].net_quantity, 0.0);
        assert!(lines[0].is_fully_returned());
        assert_eq!(lines[0].avg_price_per_unit, 2.0);
    }

    #[test]
    fn zero_net_without_prices_has_zero_average() {
        let events = vec![
            event("M1", Direction::Out, 1.0, None, Provenance::Manual),
            event("M1", Direction::In, 1.0, None, Provenance::Manual),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines[0].avg_price_per_unit, 0.0);
    }

    #[test]
    fn unpriced_movements_count_quantity_only() {
        let events = vec![
            event("M1", Direction::Out, 5.0, Some(3.0), Provenance::Manual),
            event("M1", Direction::Out, 5.0, None, Provenance::Manual),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines[0].net_quantity, 10.0);
        assert_eq!(lines[0].net_cost, 15.0);
        assert_eq!(lines[0].avg_price_per_unit, 1.5);
    }

    #[test]
    fn provenances_are_not_merged() {
        let events = vec![
            event("M1", Direction::Out, 5.0, Some(1.0), Provenance::Manual),
            event("M1", Direction::Out, 3.0, Some(1.0), Provenance::Auto),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].key(), (&MaterialId::new("M1").unwrap(), Provenance::Manual));
        assert_eq!(lines[0].net_quantity, 5.0);
        assert_eq!(lines[1].provenance, Provenance::Auto);
        assert_eq!(lines[1].net_quantity, 3.0);
    }

    #[test]
    fn other_projects_are_ignored() {
        let events = vec![
            event_in("proj-1", "M1", Direction::Out, 1.0, Some(1.0), Provenance::Manual, 0),
            event_in("proj-2", "M1", Direction::Out, 9.0, Some(1.0), Provenance::Manual, 1),
            event_in("proj-2", "M9", Direction::Out, 9.0, Some(1.0), Provenance::Manual, 2),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].net_quantity, 1.0);
        assert!(lines.iter().all(|l| l.project_id == project()));
    }

    #[test]
    fn lines_follow_first_appearance_and_track_earliest_booking() {
        let events = vec![
            event_in("proj-1", "B", Direction::Out, 1.0, None, Provenance::Manual, 5),
            event_in("proj-1", "A", Direction::Out, 1.0, None, Provenance::Manual, 1),
            event_in("proj-1", "B", Direction::Out, 1.0, None, Provenance::Manual, 0),
        ];

        let lines = aggregate(&project(), &events, &empty_catalog());
        let ids: Vec<_> = lines.iter().map(|l| l.material_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(lines[0].first_booked_at, base_time());
    }

    #[test]
    fn empty_log_yields_no_lines() {
        assert!(aggregate(&project(), &[], &empty_catalog()).is_empty());
    }

    fn provenance_strategy() -> impl Strategy<Value = Provenance> {
        prop_oneof![
            Just(Provenance::Manual),
            Just(Provenance::Configured),
            Just(Provenance::Auto),
        ]
    }

    fn event_strategy() -> impl Strategy<Value = MovementEvent> {
        (
            prop_oneof![Just("proj-1"), Just("proj-2")],
            prop_oneof![Just("M1"), Just("M2"), Just("M3")],
            any::<bool>(),
            1u32..500,
            prop::option::of(0u32..10_000),
            provenance_strategy(),
            0i64..1_000,
        )
            .prop_map(|(p, m, out, qty, cents, prov, minute)| {
                let direction = if out { Direction::Out } else { Direction::In };
                event_in(
                    p,
                    m,
                    direction,
                    f64::from(qty),
                    cents.map(|c| f64::from(c) / 100.0),
                    prov,
                    minute,
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: per key, net quantity is exactly OUT total minus IN total.
        #[test]
        fn net_quantity_matches_out_minus_in(
            events in prop::collection::vec(event_strategy(), 0..60)
        ) {
            let project = project();
            let lines = aggregate(&project, &events, &empty_catalog());

            for line in &lines {
                let matching = events.iter().filter(|e| {
                    e.project_id() == &project
                        && e.material_id() == &line.material_id
                        && e.provenance() == line.provenance
                });
                let (mut out, mut inn) = (0.0, 0.0);
                for e in matching {
                    match e.direction() {
                        Direction::Out => out += e.quantity(),
                        Direction::In => inn += e.quantity(),
                    }
                }
                prop_assert_eq!(line.net_quantity, out - inn);
            }

            // Exactly one line per key present in the project's events.
            let mut keys: Vec<_> = events
                .iter()
                .filter(|e| e.project_id() == &project)
                .map(|e| (e.material_id().clone(), e.provenance()))
                .collect();
            keys.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.as_str().cmp(b.1.as_str())));
            keys.dedup();
            prop_assert_eq!(lines.len(), keys.len());
        }

        /// Property: aggregation holds no hidden state between calls.
        #[test]
        fn aggregate_is_idempotent(
            events in prop::collection::vec(event_strategy(), 0..60)
        ) {
            let catalog = empty_catalog();
            let first = aggregate(&project(), &events, &catalog);
            let second = aggregate(&project(), &events, &catalog);
            prop_assert_eq!(first, second);
        }
    }
}
