//! Command-line and environment configuration.
//!
//! Every option can also come from the environment; an explicit argument wins.

use std::path::PathBuf;

use clap::{ArgAction, Parser, builder::BoolishValueParser};

use solarops_core::ProjectId;
use solarops_observability::LogFormat;

/// Print the bill of materials and cost report of one project.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "solarops-bom", version, about, long_about = None)]
pub struct BomConfig {
    /// Project whose bookings are reported.
    #[arg(env = "BOM_PROJECT_ID")]
    pub project_id: ProjectId,

    /// JSON snapshot holding `events` and `materials`.
    #[arg(long, env = "BOM_SNAPSHOT_PATH", default_value = "snapshot.json")]
    pub snapshot_path: PathBuf,

    /// Pretty-print the JSON report.
    #[arg(
        long,
        env = "BOM_PRETTY",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub pretty: bool,

    /// Log output format.
    #[arg(long, env = "BOM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}
