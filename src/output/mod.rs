//! Report formatting and CSV export

use crate::{error::Result, stats::StatsSnapshot};
use colored::Colorize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

/// Renders a statistics snapshot as a terminal table
pub struct ReportFormatter {
    use_color: bool,
}

impl ReportFormatter {
    /// Create a formatter; colors are applied only when enabled
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Format the full report: header, per-category table, totals
    pub fn format_report(&self, snapshot: &StatsSnapshot) -> String {
        let mut output = String::new();

        let title = "Cache Load Test Report";
        if self.use_color {
            let _ = writeln!(output, "{}", title.bold());
        } else {
            let _ = writeln!(output, "{}", title);
        }
        let _ = writeln!(output, "{}", "=".repeat(78));

        if snapshot.is_empty() {
            let _ = writeln!(output, "No operations were recorded.");
            return output;
        }

        let header = format!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9}",
            "Category", "Requests", "Failures", "Avg (ms)", "Min (ms)", "Max (ms)", "Req/s"
        );
        if self.use_color {
            let _ = writeln!(output, "{}", header.bold());
        } else {
            let _ = writeln!(output, "{}", header);
        }
        let _ = writeln!(output, "{}", "-".repeat(78));

        for entry in &snapshot.entries {
            // Pad before coloring so ANSI codes do not skew the column.
            let failures = format!("{:>10}", entry.failures);
            let failures = if entry.failures > 0 && self.use_color {
                failures.red().to_string()
            } else {
                failures
            };

            let _ = writeln!(
                output,
                "{:<12} {:>10} {} {:>10.2} {:>10.2} {:>10.2} {:>9.2}",
                entry.name, entry.count, failures, entry.avg_ms, entry.min_ms, entry.max_ms, entry.rate
            );
        }

        let _ = writeln!(output, "{}", "-".repeat(78));
        let _ = writeln!(
            output,
            "{:<12} {:>10} {:>10}   elapsed: {:.1}s",
            "total",
            snapshot.total_requests(),
            snapshot.total_failures(),
            snapshot.elapsed_secs
        );

        output
    }
}

/// Fixed CSV header row for exported results
pub const CSV_HEADER: &str =
    "Request Name,Total Requests,Failures,Average Response Time,Min Response Time,Max Response Time,RPS";

/// Serialize the snapshot to a delimited file with a fixed header row
pub fn write_csv(snapshot: &StatsSnapshot, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{}", CSV_HEADER)?;

    for entry in &snapshot.entries {
        writeln!(
            file,
            "{},{},{},{:.3},{:.3},{:.3},{:.3}",
            entry.name, entry.count, entry.failures, entry.avg_ms, entry.min_ms, entry.max_ms, entry.rate
        )?;
    }

    file.flush()?;
    Ok(())
}
