//! Terminal rendering of reports and tables

use comfy_table::{ContentArrangement, Table, presets};
use owo_colors::OwoColorize;
use roost_engine::{Outcome, ReconcileStatus, Report};

/// Create a bordered table with the given header row
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Colored label for an apply/collect outcome, padded for alignment
pub fn outcome_label(outcome: &Outcome) -> String {
    let padded = format!("{:<11}", outcome.as_str());
    match outcome {
        Outcome::Unchanged | Outcome::Skipped => padded.dimmed().to_string(),
        Outcome::Created | Outcome::Collected => padded.green().to_string(),
        Outcome::Replaced | Outcome::NeedsForce => padded.yellow().to_string(),
        Outcome::Failed(_) => padded.red().to_string(),
    }
}

/// Colored label for an inspection status
pub fn status_label(status: ReconcileStatus) -> String {
    let text = status.as_str();
    match status {
        ReconcileStatus::Ok => text.green().to_string(),
        ReconcileStatus::Missing | ReconcileStatus::Changed | ReconcileStatus::WrongTarget => {
            text.yellow().to_string()
        }
        ReconcileStatus::Conflict
        | ReconcileStatus::MissingSource
        | ReconcileStatus::Inaccessible => text.red().to_string(),
    }
}

/// Print per-entry outcome lines and a closing summary
pub fn print_report(report: &Report, dry_run: bool) {
    for item in report.outcomes() {
        let label = outcome_label(&item.outcome);
        match &item.outcome {
            Outcome::Failed(reason) => println!("  {label} ~/{}: {reason}", item.dest),
            Outcome::NeedsForce => {
                println!("  {label} ~/{} (use --force to replace)", item.dest);
            }
            _ => println!("  {label} ~/{}", item.dest),
        }
    }

    println!();
    for line in summary_lines(report) {
        println!("{line}");
    }
    if let Some(dir) = report.backup_dir() {
        println!("Backups saved to: {dir}");
    }
    if dry_run {
        println!("{}", "Dry run: nothing was changed.".dimmed());
    }
}

/// Summary lines for a report, one per non-zero counter
pub fn summary_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    let applied = report.created() + report.replaced();
    if applied > 0 {
        lines.push(format!("{applied} entries applied").green().to_string());
    }
    if report.collected() > 0 {
        lines.push(
            format!("{} entries collected", report.collected())
                .green()
                .to_string(),
        );
    }
    if report.needs_force() > 0 {
        lines.push(
            format!("{} skipped (use --force to overwrite)", report.needs_force())
                .yellow()
                .to_string(),
        );
    }
    if report.skipped() > 0 {
        lines.push(format!("{} skipped", report.skipped()).dimmed().to_string());
    }
    if report.failed() > 0 {
        lines.push(format!("{} errors", report.failed()).red().to_string());
    }
    if lines.is_empty() {
        lines.push(
            format!("{} entries, everything in place", report.len())
                .green()
                .to_string(),
        );
    }
    lines
}

/// Human size the way the import table shows it
pub fn format_size(bytes: u64) -> String {
    if bytes > 1024 {
        #[allow(clippy::cast_precision_loss)]
        let kib = bytes as f64 / 1024.0;
        format!("{kib:.1}K")
    } else {
        format!("{bytes}B")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn sizes_switch_to_kib_above_1024() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1024), "1024B");
        assert_eq!(format_size(1536), "1.5K");
        assert_eq!(format_size(2 * 1024 * 1024), "2048.0K");
    }

    #[test]
    fn outcome_labels_keep_the_word() {
        assert!(outcome_label(&Outcome::Created).contains("created"));
        assert!(outcome_label(&Outcome::NeedsForce).contains("needs force"));
        assert!(outcome_label(&Outcome::Failed(String::from("x"))).contains("failed"));
    }

    #[test]
    fn status_labels_keep_the_word() {
        assert!(status_label(ReconcileStatus::Ok).contains("ok"));
        assert!(status_label(ReconcileStatus::WrongTarget).contains("wrong target"));
    }

    #[test]
    fn tables_carry_their_headers() {
        let table = create_table(&["Status", "Kind", "Destination"]);
        let rendered = table.to_string();
        assert!(rendered.contains("Status"));
        assert!(rendered.contains("Destination"));
    }
}
