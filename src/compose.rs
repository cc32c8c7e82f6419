//! Article composition: from a topic or a free-text overview to a
//! draft on disk.
//!
//! Every article goes through the same staged pipeline against a
//! [`CompletionModel`]:
//!
//! 1. section structure (or a fixed template)
//! 2. title
//! 3. categories and tags
//! 4. introduction and one completion per section
//! 5. meta description and photo search keywords
//! 6. a top-up section when the body comes out short
//! 7. photo fetch and embedding (when a photo client is available)
//! 8. front matter assembly and the write into `_drafts`
//!
//! Failure handling is deliberately uneven. A failed structure or
//! title kills the article; there is nothing sensible to write
//! without them. A failed section, description, or image degrades the
//! article and is reported on the returned record instead.

use crate::config::{GenerationConfig, SiteConfig, TopicProfile};
use crate::frontmatter::{FrontMatter, FrontMatterError, PostDocument};
use crate::imaging::{FitMode, ImageJob, ImageOptimizer, ImageSource, OptimizedImage};
use crate::llm::{CompletionModel, CompletionRequest, LlmError};
use crate::markdown;
use crate::photos::{self, RemotePhoto, UnsplashClient};
use chrono::NaiveDate;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("the model returned no usable section structure")]
    EmptyStructure,

    #[error("no topics configured; add [[topics]] to draftsmith.toml")]
    NoTopics,

    #[error("front matter error: {0}")]
    FrontMatter(#[from] FrontMatterError),

    #[error("no free draft filename for {0}; clear out the suffixed copies")]
    NameExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const MAX_SECTIONS: usize = 7;
const MAX_CATEGORIES: usize = 3;
const MAX_TAGS: usize = 6;
const MAX_IMAGE_KEYWORDS: usize = 5;
const MAX_SLUG_LEN: usize = 50;
/// Random suffixes tried per draft filename collision before giving up.
const NAME_ATTEMPTS: u32 = 100;

/// Body characters per inline image; clamped to 1-3 images.
const CHARS_PER_INLINE_IMAGE: usize = 1500;

// =============================================================================
// Tones and templates
// =============================================================================

/// A named writing persona. The persona and style are sent as the
/// system message of every completion in a run, so one article never
/// mixes voices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneProfile {
    pub name: &'static str,
    pub persona: &'static str,
    pub style: &'static str,
}

pub const TONES: &[ToneProfile] = &[
    ToneProfile {
        name: "professional",
        persona: "You are a professional blog writer covering practical topics for busy readers.",
        style: "Write clear, direct prose. Prefer concrete examples over abstractions.",
    },
    ToneProfile {
        name: "friendly",
        persona: "You are a popular blogger with a warm, conversational voice.",
        style: "Write like a helpful colleague. Short sentences, second person, no jargon.",
    },
    ToneProfile {
        name: "analytical",
        persona: "You are a technically minded writer who backs claims with numbers.",
        style: "Be precise. Quantify where possible and name the trade-offs.",
    },
];

impl ToneProfile {
    /// Look up a tone by name. Unknown names fall back to the first
    /// tone rather than failing a whole run over a config typo.
    pub fn by_name(name: &str) -> &'static ToneProfile {
        TONES
            .iter()
            .find(|tone| tone.name.eq_ignore_ascii_case(name))
            .unwrap_or(&TONES[0])
    }

    fn system(&self) -> String {
        format!("{} {}", self.persona, self.style)
    }
}

/// A fixed section skeleton used instead of asking the model for a
/// structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleTemplate {
    pub name: &'static str,
    pub sections: &'static [&'static str],
}

pub const TEMPLATES: &[ArticleTemplate] = &[
    ArticleTemplate {
        name: "how-to",
        sections: &[
            "What you need before starting",
            "Step-by-step walkthrough",
            "Common mistakes and how to avoid them",
            "Checklist and next steps",
        ],
    },
    ArticleTemplate {
        name: "listicle",
        sections: &[
            "Why this list matters",
            "The picks at a glance",
            "Each pick in detail",
            "How to choose for your situation",
            "Wrap-up",
        ],
    },
    ArticleTemplate {
        name: "case-study",
        sections: &[
            "Background and starting point",
            "What changed",
            "The results in numbers",
            "What we would do differently",
            "Takeaways you can reuse",
        ],
    },
    ArticleTemplate {
        name: "comparison",
        sections: &[
            "The contenders",
            "Evaluation criteria",
            "Head-to-head comparison",
            "Which one fits which use case",
            "Verdict",
        ],
    },
];

pub fn template_by_name(name: &str) -> Option<&'static ArticleTemplate> {
    TEMPLATES
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name))
}

// =============================================================================
// Requests and results
// =============================================================================

/// What the article should be about: a configured topic profile or a
/// free-text overview from the command line.
#[derive(Debug, Clone)]
pub enum Brief {
    Topic(TopicProfile),
    Overview(String),
}

impl Brief {
    pub fn subject(&self) -> &str {
        match self {
            Brief::Topic(topic) => &topic.theme,
            Brief::Overview(text) => text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub brief: Brief,
    pub tone: &'static ToneProfile,
    pub template: Option<&'static ArticleTemplate>,
    pub with_images: bool,
}

/// The model's output for one article, before images and assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedArticle {
    pub title: String,
    pub sections: Vec<String>,
    pub body: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub image_keywords: Vec<String>,
    /// Stages that failed and were skipped, with the error text.
    pub skipped: Vec<String>,
}

/// What happened for one finished draft.
#[derive(Debug)]
pub struct DraftRecord {
    pub path: PathBuf,
    pub title: String,
    pub sections: usize,
    pub skipped: Vec<String>,
    pub body_chars: usize,
    pub has_cover: bool,
    pub inline_images: usize,
    pub image_failures: Vec<String>,
}

/// Per-article result of a batch run. One failed article never stops
/// the rest of the batch.
#[derive(Debug)]
pub struct DraftOutcome {
    pub subject: String,
    pub result: Result<DraftRecord, ComposeError>,
}

/// Shared handles for composing: the model, an optional photo client,
/// the optimizer, and where the site lives.
pub struct ComposeContext<'a> {
    pub model: &'a dyn CompletionModel,
    pub photos: Option<&'a UnsplashClient>,
    pub optimizer: &'a ImageOptimizer,
    pub config: &'a SiteConfig,
    pub site_root: &'a Path,
}

// =============================================================================
// Section roles
// =============================================================================

/// How a section should be written, inferred from its position and
/// heading keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionRole {
    Opening,
    Explanation,
    Practice,
    Closing,
}

fn section_role(heading: &str, index: usize, total: usize) -> SectionRole {
    if index == 0 {
        return SectionRole::Opening;
    }
    if index + 1 == total {
        return SectionRole::Closing;
    }

    const CLOSING_HINTS: &[&str] =
        &["summary", "conclusion", "wrap", "takeaway", "next steps", "verdict"];
    const PRACTICE_HINTS: &[&str] = &[
        "step", "how to", "practice", "checklist", "walkthrough", "apply", "implement", "setup",
    ];

    let lowered = heading.to_lowercase();
    if CLOSING_HINTS.iter().any(|hint| lowered.contains(hint)) {
        return SectionRole::Closing;
    }
    if PRACTICE_HINTS.iter().any(|hint| lowered.contains(hint)) {
        return SectionRole::Practice;
    }
    SectionRole::Explanation
}

fn role_guidance(role: SectionRole) -> &'static str {
    match role {
        SectionRole::Opening => {
            "Hook the reader: name the problem, why it matters now, and what the article delivers."
        }
        SectionRole::Explanation => {
            "Explain the idea with at least one concrete example or comparison."
        }
        SectionRole::Practice => {
            "Give actionable instructions the reader can follow today, as numbered steps or a short list."
        }
        SectionRole::Closing => {
            "Summarize the key points briefly and end with one clear next action."
        }
    }
}

// =============================================================================
// Prompts
// =============================================================================

fn structure_prompt(subject: &str) -> String {
    format!(
        "Plan a blog article about \"{subject}\".\n\n\
         List 4 to 7 section headings, one per line, without numbering.\n\
         Follow a logical arc: why it matters, what it is, how to apply it, wrap-up.\n\
         Output only the headings."
    )
}

fn title_prompt(subject: &str, sections: &[String]) -> String {
    format!(
        "Write one title for a blog article about \"{subject}\".\n\n\
         Planned sections:\n{}\n\n\
         Requirements:\n\
         - 25 to 35 characters\n\
         - include a concrete number if it fits naturally\n\
         - promise a specific benefit, no clickbait\n\
         Output only the title.",
        sections.join("\n")
    )
}

fn taxonomy_prompt(title: &str, subject: &str) -> String {
    format!(
        "Suggest taxonomy for a blog article titled \"{title}\" about \"{subject}\".\n\n\
         Output exactly two lines:\n\
         Categories: up to {MAX_CATEGORIES} words, comma separated, lowercase\n\
         Tags: up to {MAX_TAGS} words, comma separated, lowercase"
    )
}

fn intro_prompt(title: &str, subject: &str) -> String {
    format!(
        "Write the introduction for a blog article titled \"{title}\" about \"{subject}\".\n\n\
         Requirements:\n\
         - 80 to 120 words\n\
         - state the problem and what the reader will walk away with\n\
         - no heading\n\
         Output only the introduction."
    )
}

fn section_prompt(title: &str, heading: &str, role: SectionRole, subject: &str) -> String {
    format!(
        "Write the \"{heading}\" section of a blog article titled \"{title}\" about \"{subject}\".\n\n\
         {}\n\n\
         Requirements:\n\
         - 200 to 400 words\n\
         - Markdown paragraphs, with ### subheadings where they help\n\
         - do not repeat the article title or the section heading\n\
         Output only the section body.",
        role_guidance(role)
    )
}

fn extension_prompt(title: &str, sections: &[String]) -> String {
    format!(
        "The article \"{title}\" needs one more section.\n\n\
         Existing sections:\n{}\n\n\
         Pick one missing angle: frequently asked questions, a practical checklist, \
         a short case study, or common pitfalls.\n\n\
         Requirements:\n\
         - 150 to 300 words\n\
         - start with a \"## \" heading for the new section\n\
         - do not repeat existing content\n\
         Output only the new section.",
        sections.join("\n")
    )
}

fn description_prompt(title: &str, body: &str) -> String {
    format!(
        "Write a meta description for the article below.\n\n\
         Title: {title}\n\
         Opening: {}\n\n\
         Requirements:\n\
         - 120 to 155 characters\n\
         - summarize the benefit to the reader, no hype\n\
         Output only the description.",
        excerpt(body, 300)
    )
}

fn keywords_prompt(title: &str, sections: &[String]) -> String {
    format!(
        "Suggest photo search keywords for a blog article titled \"{title}\".\n\n\
         Sections:\n{}\n\n\
         Output up to {MAX_IMAGE_KEYWORDS} keywords in English, one per line, \
         each 1-2 words, concrete and photographable \
         (\"laptop desk\", not \"productivity concepts\").",
        sections.join("\n")
    )
}

fn excerpt(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Strip list decoration a model tends to add: numbering, bullets,
/// heading markers, bold, quotes.
fn clean_list_item(line: &str) -> String {
    let mut text = line.trim();
    text = text.trim_start_matches(['#', '*', '-', '•']).trim_start();

    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &text[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            text = rest.trim_start();
        }
    }

    text.trim_matches(['"', '*']).trim().to_string()
}

fn parse_structure(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_list_item)
        .filter(|line| !line.is_empty())
        .take(MAX_SECTIONS)
        .collect()
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let prefix = line.get(..label.len())?;
    if prefix.eq_ignore_ascii_case(label) {
        line.get(label.len()..)
    } else {
        None
    }
}

fn split_terms(raw: &str, limit: usize) -> Vec<String> {
    raw.split(',')
        .map(|term| term.trim().trim_matches(['"', '#']).to_lowercase().replace(' ', "-"))
        .filter(|term| !term.is_empty())
        .take(limit)
        .collect()
}

/// Pick `Categories:` and `Tags:` lines out of a taxonomy answer.
/// Anything unparseable yields empty lists; the caller falls back to
/// topic defaults.
fn parse_taxonomy(raw: &str) -> (Vec<String>, Vec<String>) {
    let mut categories = Vec::new();
    let mut tags = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = strip_label(line, "categories:") {
            categories = split_terms(rest, MAX_CATEGORIES);
        } else if let Some(rest) = strip_label(line, "tags:") {
            tags = split_terms(rest, MAX_TAGS);
        }
    }
    (categories, tags)
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_list_item)
        .filter(|line| !line.is_empty())
        .take(MAX_IMAGE_KEYWORDS)
        .collect()
}

// =============================================================================
// Slugs and filenames
// =============================================================================

/// Lowercased ASCII slug, words joined by single dashes, truncated at
/// a word boundary. Titles without any ASCII alphanumerics come back
/// empty.
fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut previous_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            previous_dash = false;
        } else if !previous_dash && !slug.is_empty() {
            slug.push('-');
            previous_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.len() <= MAX_SLUG_LEN {
        return slug.to_string();
    }
    let cut = &slug[..MAX_SLUG_LEN];
    match cut.rfind('-') {
        Some(position) => cut[..position].to_string(),
        None => cut.to_string(),
    }
}

/// Jekyll draft filename: `YYYY-MM-DD-slug.md`. Unsluggable titles
/// get a random `article-NNNN` stand-in.
pub fn draft_filename(date: NaiveDate, title: &str) -> String {
    let slug = slugify_title(title);
    if slug.is_empty() {
        let n: u32 = rand::rng().random_range(1000..10000);
        return format!("{}-article-{n}.md", date.format("%Y-%m-%d"));
    }
    format!("{}-{slug}.md", date.format("%Y-%m-%d"))
}

fn unique_draft_path(dir: &Path, date: NaiveDate, title: &str) -> Result<PathBuf, ComposeError> {
    let filename = draft_filename(date, title);
    let candidate = dir.join(&filename);
    if !candidate.exists() {
        return Ok(candidate);
    }
    let stem = filename.trim_end_matches(".md").to_string();
    let mut rng = rand::rng();
    for _ in 0..NAME_ATTEMPTS {
        let alternative = dir.join(format!("{stem}-{}.md", rng.random_range(100..1000)));
        if !alternative.exists() {
            return Ok(alternative);
        }
    }
    Err(ComposeError::NameExhausted(filename))
}

// =============================================================================
// Building the article text
// =============================================================================

/// Run the completion stages for one article. No filesystem access;
/// images and the final write happen in [`compose_article`].
pub fn build_article(
    model: &dyn CompletionModel,
    request: &ComposeRequest,
    generation: &GenerationConfig,
) -> Result<ComposedArticle, ComposeError> {
    let subject = request.brief.subject();
    let system = request.tone.system();
    let mut skipped = Vec::new();

    let sections: Vec<String> = match request.template {
        Some(template) => template.sections.iter().map(|s| s.to_string()).collect(),
        None => {
            let raw = model.complete(
                &CompletionRequest::new(&system, structure_prompt(subject)).with_max_tokens(300),
            )?;
            let parsed = parse_structure(&raw);
            if parsed.is_empty() {
                return Err(ComposeError::EmptyStructure);
            }
            parsed
        }
    };

    let title = model.complete(
        &CompletionRequest::new(&system, title_prompt(subject, &sections)).with_max_tokens(100),
    )?;

    let (mut categories, mut tags) = match model.complete(
        &CompletionRequest::new(&system, taxonomy_prompt(&title, subject)).with_max_tokens(120),
    ) {
        Ok(raw) => parse_taxonomy(&raw),
        Err(err) => {
            skipped.push(format!("taxonomy: {err}"));
            (Vec::new(), Vec::new())
        }
    };
    if let Brief::Topic(topic) = &request.brief {
        if categories.is_empty() {
            categories = topic.categories.clone();
        }
        if tags.is_empty() {
            tags = topic.tags.clone();
        }
    }

    let mut body = String::new();
    match model.complete(&CompletionRequest::new(&system, intro_prompt(&title, subject))) {
        Ok(text) => {
            body.push_str(text.trim());
            body.push_str("\n\n");
        }
        Err(err) => skipped.push(format!("introduction: {err}")),
    }

    let total = sections.len();
    for (index, heading) in sections.iter().enumerate() {
        let role = section_role(heading, index, total);
        match model.complete(&CompletionRequest::new(
            &system,
            section_prompt(&title, heading, role, subject),
        )) {
            Ok(text) => {
                body.push_str(&format!("## {heading}\n\n{}\n\n", text.trim()));
            }
            Err(err) => skipped.push(format!("section \"{heading}\": {err}")),
        }
    }

    let description = match model.complete(
        &CompletionRequest::new(&system, description_prompt(&title, &body)).with_max_tokens(300),
    ) {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            skipped.push(format!("description: {err}"));
            format!("{title}: what it is, why it matters, and how to put it to work.")
        }
    };

    let image_keywords = match model.complete(
        &CompletionRequest::new(&system, keywords_prompt(&title, &sections)).with_max_tokens(120),
    ) {
        Ok(raw) => parse_keywords(&raw),
        Err(err) => {
            skipped.push(format!("image keywords: {err}"));
            Vec::new()
        }
    };

    if body.chars().count() < generation.min_body_chars {
        match model.complete(
            &CompletionRequest::new(&system, extension_prompt(&title, &sections))
                .with_max_tokens(800),
        ) {
            Ok(text) => {
                body.push_str(text.trim());
                body.push_str("\n\n");
            }
            Err(err) => skipped.push(format!("extension: {err}")),
        }
    }

    Ok(ComposedArticle {
        title,
        sections,
        body: body.trim_end().to_string(),
        categories,
        tags,
        description,
        image_keywords,
        skipped,
    })
}

// =============================================================================
// Images
// =============================================================================

/// A photo fetched, optimized, and placed in the assets directory.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub public_path: String,
    pub alt: String,
    pub credit_html: String,
    pub credit_markdown: String,
}

#[derive(Debug, Default)]
pub struct ArticleImages {
    pub cover: Option<StoredImage>,
    pub inline: Vec<StoredImage>,
    /// Search, download, or optimize failures. The article ships anyway.
    pub failures: Vec<String>,
}

/// One inline image per 1500 body characters, at least one, at most
/// three.
pub fn plan_inline_count(body_chars: usize) -> usize {
    (body_chars / CHARS_PER_INLINE_IMAGE).clamp(1, 3)
}

fn fetch_one(
    photos: &UnsplashClient,
    optimizer: &ImageOptimizer,
    keyword: &str,
    stem: String,
    mode: FitMode,
) -> Result<Option<(RemotePhoto, OptimizedImage)>, String> {
    let photo = photos
        .search_first(keyword)
        .map_err(|err| format!("search \"{keyword}\": {err}"))?;
    let Some(photo) = photo else {
        return Ok(None);
    };
    let data = photos
        .download(&photo)
        .map_err(|err| format!("download \"{keyword}\": {err}"))?;
    let job = ImageJob {
        source: ImageSource::Bytes {
            data,
            origin: photo.url.clone(),
        },
        mode,
        stem: Some(stem),
    };
    let stored = optimizer
        .optimize(&job)
        .map_err(|err| format!("optimize \"{keyword}\": {err}"))?;
    Ok(Some((photo, stored)))
}

fn stored_image(photo: &RemotePhoto, optimized: &OptimizedImage, fallback_alt: &str) -> StoredImage {
    StoredImage {
        public_path: optimized.public_path.clone(),
        alt: photo
            .description
            .clone()
            .unwrap_or_else(|| fallback_alt.to_string()),
        credit_html: photos::credit_html(photo),
        credit_markdown: photos::credit_markdown(photo),
    }
}

/// Cover first (trying the first two keywords), then inline images
/// from the remaining keywords. Each failure is recorded and the next
/// keyword gets its chance.
fn fetch_article_images(
    photos: &UnsplashClient,
    optimizer: &ImageOptimizer,
    article: &ComposedArticle,
    stem_base: &str,
) -> ArticleImages {
    let mut images = ArticleImages::default();
    let mut cover_keyword: Option<&str> = None;

    for keyword in article.image_keywords.iter().take(2) {
        match fetch_one(
            photos,
            optimizer,
            keyword,
            format!("{stem_base}-thumb"),
            FitMode::Thumbnail,
        ) {
            Ok(Some((photo, optimized))) => {
                images.cover = Some(stored_image(&photo, &optimized, &article.title));
                cover_keyword = Some(keyword);
                break;
            }
            Ok(None) => continue,
            Err(reason) => images.failures.push(reason),
        }
    }

    let count = plan_inline_count(article.body.chars().count());
    let mut rng = rand::rng();
    let pool: Vec<&String> = article
        .image_keywords
        .iter()
        .filter(|keyword| Some(keyword.as_str()) != cover_keyword)
        .collect();
    for keyword in pool.into_iter().take(count) {
        let stem = format!(
            "{stem_base}-{}-{}",
            chrono::Local::now().format("%H%M%S"),
            rng.random_range(100..1000)
        );
        match fetch_one(photos, optimizer, keyword, stem, FitMode::Inline) {
            Ok(Some((photo, optimized))) => {
                images.inline.push(stored_image(&photo, &optimized, keyword));
            }
            Ok(None) => {}
            Err(reason) => images.failures.push(reason),
        }
    }

    images
}

// =============================================================================
// Assembly and orchestration
// =============================================================================

/// Merge the composed text and fetched images into a writable post.
/// Inline images land after section headings with their credit lines;
/// the cover fills the `image*` front matter keys.
pub fn assemble_draft(
    article: &ComposedArticle,
    images: &ArticleImages,
    author: &str,
    date: NaiveDate,
) -> PostDocument {
    let mut body = article.body.clone();
    if !images.inline.is_empty() {
        let blocks: Vec<String> = images
            .inline
            .iter()
            .map(|image| {
                format!(
                    "![{}]({})\n\n{}",
                    image.alt, image.public_path, image.credit_markdown
                )
            })
            .collect();
        body = markdown::insert_after_sections(&body, &blocks);
    }

    let front = FrontMatter {
        layout: Some("post".to_string()),
        title: Some(article.title.clone()),
        categories: article.categories.clone(),
        tags: article.tags.clone(),
        author: Some(author.to_string()),
        date: Some(date.format("%Y-%m-%d").to_string()),
        description: Some(article.description.clone()),
        image: images.cover.as_ref().map(|cover| cover.public_path.clone()),
        image_alt: images.cover.as_ref().map(|cover| cover.alt.clone()),
        image_credit: images.cover.as_ref().map(|cover| cover.credit_html.clone()),
    };

    PostDocument { front, body }
}

/// Compose one article end to end and write it into the drafts
/// directory.
pub fn compose_article(
    ctx: &ComposeContext,
    request: &ComposeRequest,
) -> Result<DraftRecord, ComposeError> {
    let article = build_article(ctx.model, request, &ctx.config.generation)?;

    let images = match (request.with_images, ctx.photos) {
        (true, Some(photos)) if !article.image_keywords.is_empty() => {
            let mut stem_base = slugify_title(&article.title);
            if stem_base.is_empty() {
                stem_base = "article".to_string();
            }
            fetch_article_images(photos, ctx.optimizer, &article, &stem_base)
        }
        _ => ArticleImages::default(),
    };

    let date = chrono::Local::now().date_naive();
    let document = assemble_draft(&article, &images, &ctx.config.author, date);

    let drafts_dir = ctx.site_root.join(&ctx.config.dirs.drafts);
    fs::create_dir_all(&drafts_dir)?;
    let path = unique_draft_path(&drafts_dir, date, &article.title)?;
    document.write_to(&path)?;

    Ok(DraftRecord {
        path,
        title: article.title,
        sections: article.sections.len(),
        skipped: article.skipped,
        body_chars: document.body.chars().count(),
        has_cover: images.cover.is_some(),
        inline_images: images.inline.len(),
        image_failures: images.failures,
    })
}

/// Draft `count` articles from randomly drawn configured topics. Every
/// article gets an outcome; a failure is recorded and the batch moves
/// on.
pub fn generate_batch(
    ctx: &ComposeContext,
    count: u32,
) -> Result<Vec<DraftOutcome>, ComposeError> {
    if ctx.config.topics.is_empty() {
        return Err(ComposeError::NoTopics);
    }

    let tone = ToneProfile::by_name(&ctx.config.generation.tone);
    let mut rng = rand::rng();
    let mut outcomes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let topic = &ctx.config.topics[rng.random_range(0..ctx.config.topics.len())];
        let request = ComposeRequest {
            brief: Brief::Topic(topic.clone()),
            tone,
            template: None,
            with_images: true,
        };
        let result = compose_article(ctx, &request);
        outcomes.push(DraftOutcome {
            subject: topic.theme.clone(),
            result,
        });
    }
    Ok(outcomes)
}
