//! Partition of aggregated lines into the three BOM buckets.

use serde::Serialize;

use crate::aggregator::AggregatedLine;
use crate::movement::Provenance;

/// Aggregated lines grouped by provenance, each bucket in aggregator order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BomSplit {
    pub manual: Vec<AggregatedLine>,
    pub configured: Vec<AggregatedLine>,
    pub auto: Vec<AggregatedLine>,
}

/// A line with its position in the continuous BOM listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberedLine<'a> {
    /// 1-based, continuous across buckets.
    pub position: usize,
    pub line: &'a AggregatedLine,
}

/// Per-bucket sums for the cost breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotals {
    pub line_count: usize,
    pub net_quantity: f64,
    pub net_cost: f64,
}

/// Stable partition by `provenance`. Nothing is merged or reclassified.
pub fn split(lines: Vec<AggregatedLine>) -> BomSplit {
    let mut out = BomSplit::default();
    for line in lines {
        match line.provenance {
            Provenance::Manual => out.manual.push(line),
            Provenance::Configured => out.configured.push(line),
            Provenance::Auto => out.auto.push(line),
        }
    }
    out
}

impl BomSplit {
    pub fn bucket(&self, provenance: Provenance) -> &[AggregatedLine] {
        match provenance {
            Provenance::Manual => &self.manual,
            Provenance::Configured => &self.configured,
            Provenance::Auto => &self.auto,
        }
    }

    pub fn len(&self) -> usize {
        self.manual.len() + self.configured.len() + self.auto.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Manual, then configured, then auto.
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedLine> {
        Provenance::ALL
            .into_iter()
            .flat_map(move |p| self.bucket(p).iter())
    }

    pub fn into_lines(self) -> Vec<AggregatedLine> {
        let mut lines = self.manual;
        lines.extend(self.configured);
        lines.extend(self.auto);
        lines
    }

    /// Positions for rendering all buckets as one listing.
    ///
    /// Each bucket continues numbering where the previous one stopped.
    pub fn numbered(&self) -> Vec<NumberedLine<'_>> {
        self.iter()
            .enumerate()
            .map(|(i, line)| NumberedLine {
                position: i + 1,
                line,
            })
            .collect()
    }

    /// First position of a bucket in the continuous listing, if it has lines.
    pub fn first_position(&self, provenance: Provenance) -> Option<usize> {
        if self.bucket(provenance).is_empty() {
            return None;
        }
        let before: usize = Provenance::ALL
            .into_iter()
            .take_while(|p| *p != provenance)
            .map(|p| self.bucket(p).len())
            .sum();
        Some(before + 1)
    }

    pub fn totals(&self, provenance: Provenance) -> BucketTotals {
        self.bucket(provenance)
            .iter()
            .fold(BucketTotals::default(), |mut acc, line| {
                acc.line_count += 1;
                acc.net_quantity += line.net_quantity;
                acc.net_cost += line.net_cost;
                acc
            })
    }

    pub fn grand_total_cost(&self) -> f64 {
        Provenance::ALL
            .into_iter()
            .map(|p| self.totals(p).net_cost)
            .sum()
    }
}
