//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every story is its catalog position and title; each image leads with
//! its slot (`cover`, `page 3`) and the file it maps to, with the outcome and
//! the foreground asset used as trailing context.
//!
//! # Output Format
//!
//! ## Illustrate
//!
//! ```text
//! 001 Goldilocks (4 images)
//!     cover → goldilocks-cover.png: created
//!         Asset: bear.png
//!     page 1 → goldilocks-1.png: skipped
//!     page 2 → goldilocks-2.png: failed
//!         Error: disk full
//!
//! Illustrations: 1 created, 1 skipped, 1 failed (3 total)
//! Seed: 42
//! ```
//!
//! ## Optimize sprites / convert
//!
//! ```text
//! bear.png → bear.png
//! zebra.png: failed
//!     Error: Image error: ...
//!
//! Optimized 1/2 sprites
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use std::path::{Path, PathBuf};

use crate::convert::Converted;
use crate::illustrate::{BatchReport, ImageOutcome, ImageStatus, StoryProgress, StoryReport};
use crate::sprites::SpriteReport;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a story header: positional index + title + image count.
///
/// ```text
/// 001 Goldilocks (4 images)
/// 002 Owl (1 image)
/// ```
fn entity_header(index: usize, title: &str, count: usize) -> String {
    let noun = if count == 1 { "image" } else { "images" };
    format!("{} {} ({} {})", format_index(index), title, count, noun)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Illustrate
// ============================================================================

fn image_lines(image: &ImageOutcome) -> Vec<String> {
    let head = format!("{}{} \u{2192} {}", indent(1), image.slot, file_name(&image.path));
    match &image.status {
        ImageStatus::Created { asset } => {
            let mut lines = vec![format!("{head}: created")];
            match asset {
                Some(asset) => lines.push(format!("{}Asset: {}", indent(2), file_name(asset))),
                None => lines.push(format!("{}Asset: none", indent(2))),
            }
            lines
        }
        ImageStatus::Skipped => vec![format!("{head}: skipped")],
        ImageStatus::Failed(reason) => vec![
            format!("{head}: failed"),
            format!("{}Error: {}", indent(2), reason),
        ],
    }
}

/// Format one finished story.
pub fn format_story_report(index: usize, report: &StoryReport) -> Vec<String> {
    let mut lines = vec![entity_header(index, &report.title, report.images.len())];
    for image in &report.images {
        lines.extend(image_lines(image));
    }
    lines
}

/// Format a progress event streamed during a batch.
pub fn format_story_progress(progress: &StoryProgress) -> Vec<String> {
    format_story_report(progress.index, &progress.report)
}

/// Format the closing summary of an illustrate run.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    if report.stories.is_empty() {
        return vec!["No stories to illustrate".to_string()];
    }
    vec![
        String::new(),
        format!("Illustrations: {report}"),
        format!("Seed: {}", report.seed),
    ]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Prompt sheets
// ============================================================================

pub fn format_prompt_sheets(story_count: usize, written: &[PathBuf]) -> Vec<String> {
    let mut lines = vec![format!("Prompts for {story_count} stories")];
    for path in written {
        lines.push(format!("{}{}", indent(1), path.display()));
    }
    lines
}

pub fn print_prompt_sheets(story_count: usize, written: &[PathBuf]) {
    for line in format_prompt_sheets(story_count, written) {
        println!("{}", line);
    }
}

// ============================================================================
// Sprites and conversion
// ============================================================================

fn result_lines(source: &Path, output: &Path, error: Option<&str>) -> Vec<String> {
    match error {
        None => vec![format!("{} \u{2192} {}", file_name(source), file_name(output))],
        Some(e) => vec![
            format!("{}: failed", file_name(source)),
            format!("{}Error: {}", indent(1), e),
        ],
    }
}

pub fn format_sprite_report(report: &SpriteReport) -> Vec<String> {
    if report.outcomes.is_empty() {
        return vec!["No PNG sprites found".to_string()];
    }
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .flat_map(|o| result_lines(&o.source, &o.output, o.error.as_deref()))
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Optimized {}/{} sprites",
        report.succeeded(),
        report.outcomes.len()
    ));
    lines
}

pub fn print_sprite_report(report: &SpriteReport) {
    for line in format_sprite_report(report) {
        println!("{}", line);
    }
}

pub fn format_conversions(results: &[Converted]) -> Vec<String> {
    if results.is_empty() {
        return vec!["Nothing to convert".to_string()];
    }
    let ok = results.iter().filter(|r| r.error.is_none()).count();
    let mut lines: Vec<String> = results
        .iter()
        .flat_map(|r| result_lines(&r.source, &r.output, r.error.as_deref()))
        .collect();
    lines.push(String::new());
    lines.push(format!("Converted {}/{} files", ok, results.len()));
    lines
}

pub fn print_conversions(results: &[Converted]) {
    for line in format_conversions(results) {
        println!("{}", line);
    }
}
