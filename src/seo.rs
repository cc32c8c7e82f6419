//! Rule-based SEO scoring for Markdown posts.
//!
//! Five categories contribute to a 0-100 score. Each starts from a
//! fixed base and loses points for concrete, fixable problems:
//!
//! | Category | Base | Looks at |
//! |---|---|---|
//! | Title | 20 | length 25-35, power word, digit |
//! | Description | 15 | present, length 120-155 |
//! | Body | 30 | length, H2/H3 structure, keyword density |
//! | Images | 15 | cover image, alt text, inline images |
//! | Links | 20 | root-relative internal links |
//!
//! The title bonuses can push the raw sum past 100, so the final score
//! is clamped into 0-100. Scoring is pure and deterministic; the same
//! document always produces the same score, issues, and suggestions.

use crate::config::SiteConfig;
use crate::frontmatter::{self, FrontMatter};
use crate::markdown;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SeoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub const TITLE_MIN_CHARS: usize = 25;
pub const TITLE_MAX_CHARS: usize = 35;
const DESCRIPTION_MIN_CHARS: usize = 120;
const DESCRIPTION_MAX_CHARS: usize = 155;
const BODY_MIN_CHARS: usize = 1000;
const BODY_MAX_CHARS: usize = 3000;
const MIN_H2_SECTIONS: usize = 3;
const MIN_INTERNAL_LINKS: usize = 3;
const DENSITY_MIN_PERCENT: f64 = 0.5;
const DENSITY_MAX_PERCENT: f64 = 3.0;

/// Scores below this are called out on the console after a batch run.
pub const LOW_SCORE_THRESHOLD: i32 = 70;

/// Title words that correlate with click-through. Matched
/// case-insensitively as substrings.
pub const POWER_WORDS: &[&str] = &[
    "guide",
    "method",
    "proven",
    "essential",
    "practical",
    "complete",
    "strategy",
    "mistakes",
];

/// The verdict for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoAnalysis {
    pub score: i32,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Score a single document. Issues come out in category order (title,
/// description, body, images, links); suggestions are derived from the
/// issues, first matching rule wins, and issues without a matching
/// rule contribute none.
pub fn analyze(front: &FrontMatter, body: &str) -> SeoAnalysis {
    let mut score = 0;
    let mut issues = Vec::new();

    let categories = [
        score_title(front.title.as_deref().unwrap_or("")),
        score_description(front.description.as_deref()),
        score_body(body, &front.categories),
        score_images(front, body),
        score_links(body),
    ];
    for (points, mut category_issues) in categories {
        score += points;
        issues.append(&mut category_issues);
    }

    let suggestions = issues
        .iter()
        .filter_map(|issue| suggestion_for(issue))
        .map(str::to_string)
        .collect();

    SeoAnalysis {
        score: score.clamp(0, 100),
        issues,
        suggestions,
    }
}

fn score_title(title: &str) -> (i32, Vec<String>) {
    let mut issues = Vec::new();
    if title.is_empty() {
        issues.push("Title is not set".to_string());
        return (0, issues);
    }

    let mut score = 20;
    let chars = title.chars().count();
    if chars < TITLE_MIN_CHARS {
        score -= 5;
        issues.push(format!(
            "Title is too short ({chars} chars); {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS} works best"
        ));
    } else if chars > TITLE_MAX_CHARS {
        score -= 5;
        issues.push(format!(
            "Title is too long ({chars} chars); {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS} works best"
        ));
    }

    let lowered = title.to_lowercase();
    if POWER_WORDS.iter().any(|word| lowered.contains(word)) {
        score += 5;
    } else {
        score -= 5;
        issues.push("Title has no power word (guide, proven, essential, ...)".to_string());
    }

    // The digit check is bonus-only: its absence is flagged but never
    // deducted, unlike the power word. Numerals in any script count.
    if title.chars().any(|c| c.is_numeric()) {
        score += 5;
    } else {
        issues.push("Title has no number; concrete numbers lift click-through".to_string());
    }

    (score, issues)
}

fn score_description(description: Option<&str>) -> (i32, Vec<String>) {
    let mut issues = Vec::new();
    let Some(description) = description.filter(|d| !d.is_empty()) else {
        issues.push("Meta description is not set".to_string());
        return (0, issues);
    };

    let mut score = 15;
    let chars = description.chars().count();
    if chars < DESCRIPTION_MIN_CHARS {
        score -= 5;
        issues.push(format!(
            "Meta description is too short ({chars} chars); aim for {DESCRIPTION_MIN_CHARS}-{DESCRIPTION_MAX_CHARS}"
        ));
    } else if chars > DESCRIPTION_MAX_CHARS {
        score -= 5;
        issues.push(format!(
            "Meta description is too long ({chars} chars); aim for {DESCRIPTION_MIN_CHARS}-{DESCRIPTION_MAX_CHARS}"
        ));
    }
    (score, issues)
}

fn score_body(body: &str, categories: &[String]) -> (i32, Vec<String>) {
    let mut issues = Vec::new();
    let mut score = 30;

    let chars = body.chars().count();
    if chars < BODY_MIN_CHARS {
        score -= 10;
        issues.push(format!(
            "Body is too short ({chars} chars); at least {BODY_MIN_CHARS} is recommended"
        ));
    } else if chars > BODY_MAX_CHARS {
        score -= 5;
        issues.push(format!(
            "Body is too long ({chars} chars); consider splitting the article"
        ));
    }

    let headings = markdown::heading_counts(body);
    if headings.h2 < MIN_H2_SECTIONS {
        score -= 5;
        issues.push(format!(
            "Too few H2 headings ({}); at least {MIN_H2_SECTIONS} is recommended",
            headings.h2
        ));
    }
    if headings.h2 > 0 && headings.h3 == 0 {
        score -= 3;
        issues.push("No H3 subheadings; deeper structure helps readers scan".to_string());
    }

    // The first category doubles as the main keyword.
    if let Some(keyword) = categories.first().filter(|k| !k.is_empty())
        && chars > 0
    {
        let occurrences = markdown::count_keyword(body, keyword);
        let density =
            (occurrences * keyword.chars().count()) as f64 / chars as f64 * 100.0;
        if density < DENSITY_MIN_PERCENT {
            score -= 5;
            issues.push(format!(
                "Main keyword \"{keyword}\" barely appears (density {density:.2}%)"
            ));
        } else if density > DENSITY_MAX_PERCENT {
            score -= 5;
            issues.push(format!(
                "Main keyword \"{keyword}\" appears too often (density {density:.2}%); reads as stuffing"
            ));
        }
    }

    (score, issues)
}

fn score_images(front: &FrontMatter, body: &str) -> (i32, Vec<String>) {
    let mut issues = Vec::new();
    let mut score = 15;

    match front.image.as_deref().filter(|i| !i.is_empty()) {
        None => {
            score -= 10;
            issues.push("Cover image is not set".to_string());
        }
        Some(_) => {
            if front.image_alt.as_deref().filter(|a| !a.is_empty()).is_none() {
                score -= 5;
                issues.push("Cover image has no alt text".to_string());
            }
        }
    }

    let inline = markdown::inline_images(body);
    if inline.is_empty() {
        score -= 5;
        issues.push("Body has no inline images".to_string());
    } else if inline.iter().any(|image| image.alt.trim().is_empty()) {
        // Flagged without a deduction.
        issues.push("An inline image has empty alt text".to_string());
    }

    (score, issues)
}

fn score_links(body: &str) -> (i32, Vec<String>) {
    let mut issues = Vec::new();
    let mut score = 20;

    let count = markdown::internal_links(body).len();
    if count == 0 {
        score -= 10;
        issues.push("No internal links to related articles".to_string());
    } else if count < MIN_INTERNAL_LINKS {
        score -= 5;
        issues.push(format!(
            "Too few internal links ({count}); at least {MIN_INTERNAL_LINKS} is recommended"
        ));
    }
    (score, issues)
}

/// Substring-keyed suggestion table. The first key contained in the
/// issue text decides the suggestion; table order is match order.
fn suggestion_for(issue: &str) -> Option<&'static str> {
    const SUGGESTIONS: &[(&str, &str)] = &[
        (
            "Title is too short",
            "Add a concrete number or outcome to the title (\"5 ways to ...\")",
        ),
        (
            "power word",
            "Work a high-appeal phrase into the title, like \"complete guide\" or \"proven method\"",
        ),
        (
            "description",
            "Summarize the article and its benefit to the reader in 120-155 characters",
        ),
        (
            "internal link",
            "Link 3-5 related articles from the body",
        ),
        (
            "H2 heading",
            "Split the content into logical sections with an H2 heading each",
        ),
        (
            "image",
            "Add a diagram or screenshot to break up the text",
        ),
    ];

    SUGGESTIONS
        .iter()
        .find(|(key, _)| issue.contains(key))
        .map(|(_, suggestion)| *suggestion)
}

/// One scanned document and its verdict.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Path relative to the site root.
    pub path: PathBuf,
    pub title: String,
    pub analysis: SeoAnalysis,
}

/// Results of scanning a whole site. Unreadable documents end up in
/// `skipped` with a reason instead of aborting the batch.
#[derive(Debug, Default)]
pub struct BatchAnalysis {
    pub documents: Vec<DocumentReport>,
    pub skipped: Vec<(PathBuf, String)>,
}

impl BatchAnalysis {
    pub fn mean_score(&self) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        let total: i32 = self.documents.iter().map(|d| d.analysis.score).sum();
        total as f64 / self.documents.len() as f64
    }

    /// Worst first, ties broken by path so output is stable.
    pub fn sorted_ascending(&self) -> Vec<&DocumentReport> {
        let mut docs: Vec<&DocumentReport> = self.documents.iter().collect();
        docs.sort_by(|a, b| {
            a.analysis
                .score
                .cmp(&b.analysis.score)
                .then_with(|| a.path.cmp(&b.path))
        });
        docs
    }

    pub fn below(&self, threshold: i32) -> Vec<&DocumentReport> {
        self.sorted_ascending()
            .into_iter()
            .filter(|d| d.analysis.score < threshold)
            .collect()
    }
}

/// Score every `.md` under the posts and drafts directories. Drafts
/// are held to the same rules as published posts. Missing directories
/// are fine; broken documents are recorded and skipped.
pub fn analyze_site(site_root: &Path, config: &SiteConfig) -> BatchAnalysis {
    let mut batch = BatchAnalysis::default();

    for dir in [&config.dirs.posts, &config.dirs.drafts] {
        let root = site_root.join(dir);
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(&root).to_path_buf();
                    batch.skipped.push((path, err.to_string()));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let display_path = path
                .strip_prefix(site_root)
                .unwrap_or(path)
                .to_path_buf();
            match frontmatter::load(path) {
                Ok(doc) => {
                    let analysis = analyze(&doc.front, &doc.body);
                    batch.documents.push(DocumentReport {
                        path: display_path,
                        title: doc
                            .front
                            .title
                            .unwrap_or_else(|| "(untitled)".to_string()),
                        analysis,
                    });
                }
                Err(err) => batch.skipped.push((display_path, err.to_string())),
            }
        }
    }

    batch
}

pub const REPORT_FILENAME: &str = "seo_report.md";

/// Render the batch report, worst documents first so the ones needing
/// attention are at the top.
pub fn render_report(batch: &BatchAnalysis, generated: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str("# SEO Analysis Report\n\n");
    out.push_str(&format!("Generated: {}\n", generated.format("%Y-%m-%d")));
    out.push_str(&format!("Documents analyzed: {}\n", batch.documents.len()));
    out.push_str(&format!("Average score: {:.1} / 100\n", batch.mean_score()));

    for report in batch.sorted_ascending() {
        out.push_str(&format!(
            "\n---\n\n## {} (score: {}/100)\n\n",
            report.path.display(),
            report.analysis.score
        ));
        out.push_str(&format!("Title: {}\n", report.title));
        if report.analysis.issues.is_empty() {
            out.push_str("\nNo issues found.\n");
            continue;
        }
        out.push_str("\n### Issues\n\n");
        for issue in &report.analysis.issues {
            out.push_str(&format!("- {issue}\n"));
        }
        if !report.analysis.suggestions.is_empty() {
            out.push_str("\n### Suggestions\n\n");
            for suggestion in &report.analysis.suggestions {
                out.push_str(&format!("- {suggestion}\n"));
            }
        }
    }

    if !batch.skipped.is_empty() {
        out.push_str("\n---\n\n## Skipped\n\n");
        for (path, reason) in &batch.skipped {
            out.push_str(&format!("- {}: {reason}\n", path.display()));
        }
    }

    out
}

/// Write the report into the site root, replacing any previous run.
pub fn write_report(batch: &BatchAnalysis, site_root: &Path) -> Result<PathBuf, SeoError> {
    let path = site_root.join(REPORT_FILENAME);
    let report = render_report(batch, chrono::Local::now().date_naive());
    fs::write(&path, report)?;
    Ok(path)
}
