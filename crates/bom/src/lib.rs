//! `solarops-bom` — prints the BOM report of one project from a snapshot file.

pub mod config;
pub mod snapshot;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;

use solarops_bookings::{BomReport, CostBreakdown, InMemoryCatalog, NumberedLine};
use solarops_events::InMemoryEventLog;

pub use config::BomConfig;
pub use snapshot::Snapshot;

/// JSON document written to stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput<'a> {
    #[serde(flatten)]
    pub report: &'a BomReport,
    pub positions: Vec<NumberedLine<'a>>,
    pub cost_breakdown: CostBreakdown,
}

/// Load the snapshot, build the report and render it as JSON.
pub fn run(config: &BomConfig) -> anyhow::Result<String> {
    let snapshot = Snapshot::load(&config.snapshot_path)?;
    tracing::info!(
        path = %config.snapshot_path.display(),
        events = snapshot.events.len(),
        materials = snapshot.materials.len(),
        "snapshot loaded"
    );

    let log = InMemoryEventLog::from_events(snapshot.events);
    let catalog = InMemoryCatalog::from_materials(snapshot.materials);

    let report = BomReport::from_sources(config.project_id.clone(), &log, &catalog, Utc::now())
        .with_context(|| format!("failed to build report for project {}", config.project_id))?;

    render(&report, config.pretty)
}

pub fn render(report: &BomReport, pretty: bool) -> anyhow::Result<String> {
    let output = ReportOutput {
        report,
        positions: report.split.numbered(),
        cost_breakdown: report.cost_breakdown(),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    json.context("failed to serialize report")
}
