//! Console rendering of the sweep summary
//!
//! Progress is reported through tracing while the sweep runs; the summary
//! printed here is the final word on stdout.

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use versentry_inventory::{FolderStatus, SweepReport};

use crate::error::CliError;

/// Trait for human-readable text rendering.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Render a payload to stdout.
pub fn print<T: Render>(payload: &T) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    payload.render_text(&mut handle)?;
    handle.flush()?;
    Ok(())
}

/// End-of-run summary.
pub struct SweepSummary<'a> {
    pub report: &'a SweepReport,
    pub log_file: Option<&'a Path>,
}

impl Render for SweepSummary<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let report = self.report;
        let ips = if report.host.ips.is_empty() {
            "no addresses".to_owned()
        } else {
            report.host.ips.clone()
        };

        writeln!(
            w,
            "{} {} on {} ({})",
            "Sweep".bold(),
            report.sweep_id,
            report.host.name,
            ips
        )?;

        for folder in &report.folders {
            let tag = format!("[{}]", folder.index).green();
            match &folder.status {
                FolderStatus::Scanned => writeln!(
                    w,
                    "  {tag} {} - files: {}, inventoried: {}, skipped: {}, unmatched: {}, new: {}",
                    folder.path,
                    folder.files_found,
                    folder.files_inventoried,
                    folder.files_skipped,
                    folder.unmatched,
                    folder.records_created
                )?,
                FolderStatus::Empty => {
                    writeln!(w, "  {tag} {} - {}", folder.path, "Files: 0 - Aborting!".yellow())?
                }
                FolderStatus::Unavailable { reason } => writeln!(
                    w,
                    "  {tag} {} - {} {}",
                    folder.path,
                    "unavailable:".yellow(),
                    reason
                )?,
            }
        }

        for alert in &report.alerts {
            writeln!(
                w,
                "  {} {} - FileVersion: {} - ProductVersion: {} - Path: {} (package: {})",
                "BAD VERSION".red().bold(),
                alert.file_name,
                alert.file_version,
                alert.product_version,
                alert.file_path,
                alert.package_name
            )?;
        }

        let bad = report.alerts.len();
        let bad_text = format!("{bad} bad version(s)");
        writeln!(
            w,
            "{} {} inventoried, {} skipped, {} unmatched, {} new record(s), {} in {:.2}s",
            "Total:".bold(),
            report.files_inventoried(),
            report.files_skipped(),
            report.unmatched(),
            report.records_created(),
            if bad > 0 { bad_text.red().bold() } else { bad_text.green() },
            report.duration_secs()
        )?;

        if let Some(path) = self.log_file {
            writeln!(w, "Wrote log to {}", path.display())?;
        }

        Ok(())
    }
}
