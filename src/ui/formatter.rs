//! Pure formatting functions for UI output.
//!
//! Everything here only prints; nothing reads input or changes state.

use crate::boundary::BoundaryWarning;
use crate::changelog::ReleaseNotes;
use crate::domain::{BumpDecision, ParsedCommit, Version};
use crate::pipeline::PipelineReport;
use console::style;
use std::path::PathBuf;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Print `key: value` lines, keys aligned.
pub fn display_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        println!("{:width$}  {}", style(key).bold(), value, width = width + 1);
    }
}

/// Display the bump computation for the unreleased commits.
///
/// Lists up to 10 classified commits, then the version transition.
pub fn display_bump_summary(
    latest_tag: Option<&str>,
    commits: &[ParsedCommit],
    decision: BumpDecision,
    current: &Version,
    next: &Version,
) {
    match latest_tag {
        Some(tag) => println!(
            "\n{} {}",
            style("Unreleased commits since").bold(),
            style(tag).cyan()
        ),
        None => println!("\n{}", style("Unreleased commits (no release tag yet)").bold()),
    }

    for commit in commits.iter().take(10) {
        let marker = if commit.is_breaking_change { "!" } else { "" };
        println!("  - {}{}: {}", commit.r#type, marker, commit.description);
    }
    if commits.len() > 10 {
        println!("  ... and {} more commits", commits.len() - 10);
    }

    println!("\n{} {}", style("Bump:").bold(), decision);
    println!("  From: {}", style(current).red());
    println!("  To:   {}", style(next).green());
}

/// Print release notes without the document header.
pub fn display_release_notes(notes: &ReleaseNotes) {
    if notes.is_empty() {
        display_status("No unreleased changes");
        return;
    }
    print!("{}", notes.render_body());
}

/// Summarize a pipeline run: the visited states and what was produced.
pub fn display_pipeline_report(report: &PipelineReport) {
    let trail: Vec<String> = report.trail.iter().map(ToString::to_string).collect();
    println!("{} {}", style("Pipeline:").bold(), trail.join(" → "));

    if let Some(selection) = &report.selection {
        println!("  Version:   {}", style(selection).green());
    }
    if let Some(artifacts) = &report.artifacts {
        for artifact in artifacts.all() {
            println!("  Artifact:  {} ({})", artifact.file_name(), artifact.kind);
        }
    }
    for file in &report.uploaded {
        println!("  Uploaded:  {}", style(file).cyan());
    }
    for warning in &report.warnings {
        display_boundary_warning(warning);
    }
}

/// Display located tools.
pub fn display_tools(tools: &[(String, PathBuf)]) {
    for (tool, path) in tools {
        display_success(&format!("{} ({})", tool, path.display()));
    }
}
