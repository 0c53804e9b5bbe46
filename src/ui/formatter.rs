//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic. Section text is built
//! by `format_*` functions so it can be tested; `display_*` functions print.

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::PruneReport;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Display a boundary warning to the user.
///
/// Shows a yellow warning icon followed by the warning message.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("\x1b[33m⚠ WARNING:\x1b[0m {}", warning);
}

/// Build a titled list of tags, one indented tag per line.
///
/// # Example
/// ```ignore
/// assert_eq!(format_tag_section("Bad Tags:", &["latest".into()]), "Bad Tags:\n  latest\n");
/// ```
pub fn format_tag_section(title: &str, tags: &[String]) -> String {
    let mut out = String::with_capacity(title.len() + 1 + tags.len() * 16);
    out.push_str(title);
    out.push('\n');
    for tag in tags {
        out.push_str("  ");
        out.push_str(tag);
        out.push('\n');
    }
    out
}

/// Build the three prune sections: bad tags, tags to remove, tags to keep.
pub fn format_prune_plan(report: &PruneReport) -> String {
    let mut out = format_tag_section("Bad Tags:", &report.bad);
    out.push_str(&format_tag_section("Tags to be removed", &report.toss));
    out.push_str(&format_tag_section("Tags to be retained", &report.keep));
    out
}

/// Print the prune plan to standard output.
pub fn display_prune_plan(report: &PruneReport) {
    print!("{}", format_prune_plan(report));
}

/// Summarise the deletions performed by a prune.
pub fn display_deletion_summary(report: &PruneReport, dry_run: bool) {
    if dry_run {
        display_status(&format!(
            "Dry run: {} tags would be removed",
            report.toss.len()
        ));
        return;
    }

    let removed = report.removed_count();
    let failed = report.deletions.len() - removed;
    if failed == 0 {
        display_success(&format!("Removed {} tags", removed));
    } else {
        display_status(&format!("Removed {} tags, {} failed", removed, failed));
    }
}
