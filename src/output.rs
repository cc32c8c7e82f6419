//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output leads with the semantic identity of each item (title,
//! subject, source filename) plus a positional index, with paths and
//! per-item detail shown as indented context lines. Batch commands
//! end with a one-line summary after a blank separator.
//!
//! # Output Format
//!
//! ## Optimize
//!
//! ```text
//! 001 sunset.jpg
//!     1600x900 → 1200x630 JPEG
//!     412.3 KB → 187.6 KB (54.5% smaller)
//!     → /assets/img/posts/sunset-thumb.jpg
//! 002 broken.png
//!     error: failed to decode broken.png: ...
//!
//! Optimized 1 of 2 images (412.3 KB → 187.6 KB)
//! ```
//!
//! ## Compose / Generate
//!
//! ```text
//! 001 Deep work and focus habits
//!     Proven Guide: 7 Habits That Work → _drafts/2026-08-26-proven-guide-7-habits-that-work.md
//!     4 sections, 5832 characters
//!     cover + 2 inline images
//! 002 Personal finance for engineers
//!     error: LLM error: ...
//!
//! Drafted 1 of 2 articles
//! ```
//!
//! ## SEO
//!
//! ```text
//! Analyzed 12 documents, average score 78.3
//! Report: /site/seo_report.md
//!
//! Needs attention (score below 70):
//!     042 _drafts/2026-08-20-first-try.md
//!     065 _posts/2026-07-01-old-post.md
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::compose::{DraftOutcome, DraftRecord};
use crate::imaging::{OptimizeOutcome, OutputFormat};
use crate::seo::{BatchAnalysis, LOW_SCORE_THRESHOLD};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count: `512 B`, `1.5 KB`, `3.2 MB`.
fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Jpeg => "JPEG",
        OutputFormat::Png => "PNG",
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

// ============================================================================
// Optimize output
// ============================================================================

/// Format per-file optimization results plus a summary line.
pub fn format_optimize_outcomes(outcomes: &[OptimizeOutcome]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut succeeded = 0usize;
    let mut bytes_in = 0u64;
    let mut bytes_out = 0u64;

    for (i, outcome) in outcomes.iter().enumerate() {
        let name = outcome
            .source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.source.display().to_string());
        lines.push(format!("{} {}", format_index(i + 1), name));

        match &outcome.result {
            Ok(image) => {
                succeeded += 1;
                bytes_in += image.original_bytes;
                bytes_out += image.optimized_bytes;

                lines.push(format!(
                    "    {}x{} \u{2192} {}x{} {}",
                    image.original_dimensions.0,
                    image.original_dimensions.1,
                    image.output_dimensions.0,
                    image.output_dimensions.1,
                    format_label(image.format)
                ));
                let change = if image.compression_ratio >= 0.0 {
                    format!("{:.1}% smaller", image.compression_ratio)
                } else {
                    format!("{:.1}% larger", image.compression_ratio.abs())
                };
                lines.push(format!(
                    "    {} \u{2192} {} ({})",
                    format_bytes(image.original_bytes),
                    format_bytes(image.optimized_bytes),
                    change
                ));
                lines.push(format!("    \u{2192} {}", image.public_path));
            }
            Err(err) => lines.push(format!("    error: {}", err)),
        }
    }

    if !outcomes.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Optimized {} of {} image{} ({} \u{2192} {})",
            succeeded,
            outcomes.len(),
            plural(outcomes.len()),
            format_bytes(bytes_in),
            format_bytes(bytes_out)
        ));
    }

    lines
}

/// Print optimize output to stdout.
pub fn print_optimize_outcomes(outcomes: &[OptimizeOutcome]) {
    for line in format_optimize_outcomes(outcomes) {
        println!("{}", line);
    }
}

// ============================================================================
// Compose / generate output
// ============================================================================

/// Format one finished draft: title, destination, and what degraded
/// along the way.
pub fn format_compose_summary(record: &DraftRecord) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{} \u{2192} {}", record.title, record.path.display()));
    lines.push(format!(
        "    {} section{}, {} characters",
        record.sections,
        plural(record.sections),
        record.body_chars
    ));
    lines.push(match (record.has_cover, record.inline_images) {
        (false, 0) => "    no images".to_string(),
        (true, 0) => "    cover image".to_string(),
        (false, n) => format!("    {} inline image{}", n, plural(n)),
        (true, n) => format!("    cover + {} inline image{}", n, plural(n)),
    });
    for entry in &record.skipped {
        lines.push(format!("    skipped {}", entry));
    }
    for failure in &record.image_failures {
        lines.push(format!("    image failure: {}", failure));
    }
    lines
}

/// Print one draft summary to stdout.
pub fn print_compose_summary(record: &DraftRecord) {
    for line in format_compose_summary(record) {
        println!("{}", line);
    }
}

/// Format a batch run: per-topic results plus a summary line.
pub fn format_draft_outcomes(outcomes: &[DraftOutcome]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut succeeded = 0usize;

    for (i, outcome) in outcomes.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), outcome.subject));
        match &outcome.result {
            Ok(record) => {
                succeeded += 1;
                for line in format_compose_summary(record) {
                    lines.push(format!("    {}", line));
                }
            }
            Err(err) => lines.push(format!("    error: {}", err)),
        }
    }

    if !outcomes.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Drafted {} of {} article{}",
            succeeded,
            outcomes.len(),
            plural(outcomes.len())
        ));
    }

    lines
}

/// Print batch output to stdout.
pub fn print_draft_outcomes(outcomes: &[DraftOutcome]) {
    for line in format_draft_outcomes(outcomes) {
        println!("{}", line);
    }
}

// ============================================================================
// SEO output
// ============================================================================

/// Format the site scan summary. The full per-document detail lives in
/// the written report; stdout gets counts, the average, and the
/// documents under the attention threshold.
pub fn format_seo_summary(batch: &BatchAnalysis, report_path: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Analyzed {} document{}, average score {:.1}",
        batch.documents.len(),
        plural(batch.documents.len()),
        batch.mean_score()
    ));
    lines.push(format!("Report: {}", report_path.display()));

    let low = batch.below(LOW_SCORE_THRESHOLD);
    if !low.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Needs attention (score below {}):",
            LOW_SCORE_THRESHOLD
        ));
        for doc in low.iter().take(5) {
            lines.push(format!("    {:0>3} {}", doc.analysis.score, doc.path.display()));
        }
        if low.len() > 5 {
            lines.push(format!("    ... and {} more in the report", low.len() - 5));
        }
    }

    if !batch.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped:".to_string());
        for (path, reason) in &batch.skipped {
            lines.push(format!("    {}: {}", path.display(), reason));
        }
    }

    lines
}

/// Print SEO output to stdout.
pub fn print_seo_summary(batch: &BatchAnalysis, report_path: &Path) {
    for line in format_seo_summary(batch, report_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
