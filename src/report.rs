//! Rendering of segmentation results for the console

use crate::data::Attribute;
use crate::pipeline::SegmentationReport;
use std::fmt::Write;

/// Plain-text report: score trace, chosen k, target group, lifts and the
/// per-group means table with values rounded to integers
pub fn render_table(report: &SegmentationReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    // Writing into a String cannot fail
    let _ = writeln!(out, "Silhouette score per number of clusters:");
    for candidate in &report.selection.trace {
        let _ = writeln!(out, "  k = {:<2} score = {:.4}", candidate.k, candidate.score);
    }
    if !report.selection.skipped.is_empty() {
        let _ = writeln!(
            out,
            "  skipped (not enough records): {:?}",
            report.selection.skipped
        );
    }

    let _ = writeln!(out, "\nOptimal number of clusters: {}", report.chosen_k());
    let _ = writeln!(
        out,
        "Target cluster for high loan likelihood: {}",
        summary.target_group
    );

    let _ = writeln!(out, "\nLift values for each cluster:");
    for group in &summary.groups {
        let _ = writeln!(out, "  cluster {:<3} lift = {:.6}", group.label, group.lift);
    }

    let _ = writeln!(out);
    let _ = write!(out, "{:^10}", "cluster");
    for attribute in Attribute::ALL {
        let _ = write!(out, " {:^18}", attribute.name());
    }
    let _ = writeln!(out, " {:^8} {:^8}", "size", "lift");
    for group in &summary.groups {
        let _ = write!(out, "{:^10}", group.label);
        for attribute in Attribute::ALL {
            let _ = write!(out, " {:^18}", group.means.get(attribute).round_ties_even() as i64);
        }
        let _ = writeln!(out, " {:^8} {:^8.3}", group.size, group.lift);
    }
    out
}

/// Pretty-printed JSON of the report
pub fn render_json(report: &SegmentationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
