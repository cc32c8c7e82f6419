//! End-to-end exercises against a real site directory tree: config
//! overrides flowing into the optimizer, the SEO scan writing its
//! report, and draft documents surviving a write/load round trip.
//!
//! Everything here works on a `TempDir` site laid out the way Jekyll
//! expects (`_posts`, `_drafts`, `assets/img/posts`). No network, no
//! API keys.

use draftsmith::config::{self, SiteConfig};
use draftsmith::frontmatter::{self, FrontMatter, PostDocument};
use draftsmith::imaging::{FitMode, ImageOptimizer, OptimizeOptions};
use draftsmith::seo;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let mut writer = std::io::BufWriter::new(file);
    JpegEncoder::new(&mut writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn site_optimizer(site_root: &Path, config: &SiteConfig) -> ImageOptimizer {
    ImageOptimizer::new(
        site_root,
        &config.dirs.assets,
        OptimizeOptions::from_images_config(&config.images),
    )
}

// ============================================================================
// Config -> optimizer
// ============================================================================

#[test]
fn config_overrides_flow_into_the_optimizer() {
    let site = TempDir::new().unwrap();
    fs::write(
        site.path().join("draftsmith.toml"),
        r#"
author = "Alex"

[images]
thumbnail_size = [300, 200]
max_width = 500
"#,
    )
    .unwrap();

    let config = config::load_config(site.path()).unwrap();
    assert_eq!(config.author, "Alex");

    let optimizer = site_optimizer(site.path(), &config);
    let source = site.path().join("photo.jpg");
    write_jpeg(&source, 800, 400);

    let thumb = optimizer.optimize_file(&source, FitMode::Thumbnail).unwrap();
    assert_eq!(thumb.output_dimensions, (300, 200));
    assert!(thumb.file_path.starts_with(site.path().join("assets/img/posts")));
    assert!(thumb.public_path.starts_with("/assets/img/posts/"));
    assert!(thumb.file_path.is_file());

    let inline = optimizer.optimize_file(&source, FitMode::Inline).unwrap();
    assert_eq!(inline.output_dimensions, (500, 250));
}

#[test]
fn directory_optimization_reports_each_file() {
    let site = TempDir::new().unwrap();
    let incoming = site.path().join("incoming");
    fs::create_dir_all(&incoming).unwrap();
    write_jpeg(&incoming.join("a.jpg"), 120, 80);
    write_jpeg(&incoming.join("b.jpg"), 60, 60);
    fs::write(incoming.join("notes.txt"), "not an image").unwrap();

    let config = SiteConfig::default();
    let optimizer = site_optimizer(site.path(), &config);
    let outcomes = optimizer.optimize_directory(&incoming, FitMode::Inline).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));
    for outcome in &outcomes {
        let image = outcome.result.as_ref().unwrap();
        assert!(image.file_path.is_file());
        assert!(image.public_path.starts_with("/assets/img/posts/"));
    }
}

// ============================================================================
// SEO scan
// ============================================================================

const STRONG_TITLE: &str = "Proven Guide: 7 Habits That Work";
const STRONG_DESCRIPTION: &str = "A field-tested weekly planning method with concrete steps, \
                                  common pitfalls, and a checklist you can put to work before \
                                  Friday afternoon.";

fn strong_body() -> String {
    let filler =
        "Concrete advice beats platitudes, so every section below ends with something you can do today. ";
    let mut body = String::new();
    body.push_str("Opening paragraph that frames the problem.\n\n");
    for heading in [
        "Why it matters",
        "The core method",
        "Step-by-step setup",
        "Keeping it alive",
    ] {
        body.push_str(&format!("## {heading}\n\n"));
        body.push_str(&filler.repeat(3));
        body.push_str("\n\n### A closer look\n\n");
        body.push_str(&filler.repeat(2));
        body.push_str("\n\n");
    }
    body.push_str("![a tidy desk](/assets/img/posts/desk.jpg)\n\n");
    body.push_str(
        "Related: [planning](/posts/planning/), [focus](/posts/focus/), [habits](/posts/habits/)\n",
    );
    body
}

#[test]
fn seo_scan_writes_a_worst_first_report() {
    let site = TempDir::new().unwrap();
    let posts = site.path().join("_posts");
    let drafts = site.path().join("_drafts");
    fs::create_dir_all(&posts).unwrap();
    fs::create_dir_all(&drafts).unwrap();

    let strong = PostDocument {
        front: FrontMatter {
            layout: Some("post".to_string()),
            title: Some(STRONG_TITLE.to_string()),
            description: Some(STRONG_DESCRIPTION.to_string()),
            image: Some("/assets/img/posts/desk-thumb.jpg".to_string()),
            image_alt: Some("a tidy desk".to_string()),
            categories: vec!["productivity".to_string()],
            tags: vec!["habits".to_string()],
            ..FrontMatter::default()
        },
        body: strong_body(),
    };
    strong
        .write_to(&posts.join("2026-07-01-proven-guide.md"))
        .unwrap();

    fs::write(
        drafts.join("2026-08-26-wip.md"),
        "---\ntitle: Hi\n---\n\nToo short to rank.\n",
    )
    .unwrap();
    fs::write(drafts.join("notes.txt"), "not markdown").unwrap();

    let config = SiteConfig::default();
    let batch = seo::analyze_site(site.path(), &config);

    assert_eq!(batch.documents.len(), 2);
    assert!(batch.skipped.is_empty());

    let strong_doc = batch
        .documents
        .iter()
        .find(|d| d.path.to_str().unwrap().contains("proven-guide"))
        .unwrap();
    let weak_doc = batch
        .documents
        .iter()
        .find(|d| d.path.to_str().unwrap().contains("wip"))
        .unwrap();
    assert!(strong_doc.analysis.score > weak_doc.analysis.score);
    assert!(weak_doc.analysis.issues.iter().any(|i| i.contains("Title")));

    let report_path = seo::write_report(&batch, site.path()).unwrap();
    assert_eq!(report_path, site.path().join("seo_report.md"));

    let report = fs::read_to_string(&report_path).unwrap();
    let weak_pos = report.find("wip").unwrap();
    let strong_pos = report.find("proven-guide").unwrap();
    assert!(weak_pos < strong_pos, "worst document should come first");
}

#[test]
fn seo_scan_skips_unreadable_documents() {
    let site = TempDir::new().unwrap();
    let posts = site.path().join("_posts");
    fs::create_dir_all(&posts).unwrap();
    fs::write(
        posts.join("2026-01-01-broken.md"),
        "---\ntitle: [unclosed\n---\n\nbody\n",
    )
    .unwrap();

    let batch = seo::analyze_site(site.path(), &SiteConfig::default());
    assert!(batch.documents.is_empty());
    assert_eq!(batch.skipped.len(), 1);
}

// ============================================================================
// Front matter round trip
// ============================================================================

#[test]
fn drafts_round_trip_through_front_matter() {
    let site = TempDir::new().unwrap();
    let doc = PostDocument {
        front: FrontMatter {
            layout: Some("post".to_string()),
            title: Some("Title with: a colon".to_string()),
            author: Some("Kevin".to_string()),
            date: Some("2026-08-26".to_string()),
            image_credit: Some(
                "Photo by <a href=\"https://u\">A</a> on <a href=\"https://unsplash.com\">Unsplash</a>"
                    .to_string(),
            ),
            categories: vec!["ai".to_string()],
            tags: vec!["ai".to_string(), "tools".to_string()],
            ..FrontMatter::default()
        },
        body: "Intro.\n\n## Section\n\nText with [a link](/posts/other/).".to_string(),
    };

    let path = site.path().join("draft.md");
    doc.write_to(&path).unwrap();

    let loaded = frontmatter::load(&path).unwrap();
    assert_eq!(loaded.front, doc.front);
    assert_eq!(loaded.body, doc.body);
}

// ============================================================================
// Stock config round trip
// ============================================================================

#[test]
fn stock_config_file_loads_back_to_defaults() {
    let site = TempDir::new().unwrap();
    fs::write(site.path().join("draftsmith.toml"), config::stock_config_toml()).unwrap();

    let loaded = config::load_config(site.path()).unwrap();
    assert_eq!(loaded, SiteConfig::default());
}
