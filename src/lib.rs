//! # Draftsmith
//!
//! An AI-assisted drafting toolkit for Jekyll-style blogs. It composes
//! article drafts with an LLM, illustrates them with stock photos,
//! optimizes every image for the web, and scores the whole site
//! against an SEO checklist — all from the command line, writing plain
//! Markdown files the site generator already understands.
//!
//! # Architecture: Staged Composition
//!
//! Drafting one article is a fixed sequence of model calls followed by
//! filesystem work:
//!
//! ```text
//! 1. Structure    topic/overview  →  4-7 section headings (or a template)
//! 2. Title        headings        →  one 25-35 character title
//! 3. Taxonomy     title           →  categories + tags
//! 4. Body         per heading     →  intro + one completion per section
//! 5. Meta         body            →  description + photo keywords
//! 6. Top-up       short bodies    →  one extra section
//! 7. Photos       keywords        →  cover + inline images, optimized
//! 8. Write        everything      →  _drafts/YYYY-MM-DD-slug.md
//! ```
//!
//! Stages 1-2 are load-bearing: if the model cannot produce a
//! structure or a title, the article fails. Everything after degrades
//! instead — a failed section is skipped, a failed photo search ships
//! the draft without that image, and the returned record says exactly
//! what was dropped.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`compose`] | The staged pipeline above: prompts, response parsing, draft assembly |
//! | [`config`] | `draftsmith.toml` loading, validation, merging; API keys from the environment |
//! | [`frontmatter`] | YAML front matter parsing and rendering for Jekyll documents |
//! | [`imaging`] | Image optimization: EXIF-aware decode, cover crop, width cap, JPEG/PNG encode |
//! | [`llm`] | OpenAI chat client behind the [`llm::CompletionModel`] trait |
//! | [`markdown`] | Markdown inspection: headings, images, links, keyword counts, block insertion |
//! | [`output`] | CLI output formatting — per-item lines plus batch summaries |
//! | [`photos`] | Unsplash search, download tracking, and attribution lines |
//! | [`seo`] | Per-document scoring and the site-wide `seo_report.md` |
//!
//! # Design Decisions
//!
//! ## Explicit Clients Over Globals
//!
//! The OpenAI and Unsplash clients are constructed once in `main` and
//! passed down through [`compose::ComposeContext`]. The model sits
//! behind the [`llm::CompletionModel`] trait, so the whole composition
//! pipeline runs in tests against a scripted fake — no network, no
//! environment variables, no global state to reset between tests.
//!
//! ## Per-Item Outcomes Over Abort
//!
//! Batch operations (directory optimization, multi-article generation,
//! the site scan) never stop at the first failure. Each item gets its
//! own `Result` in the returned collection and the summary counts
//! successes against the total. A half-finished batch with a clear
//! report beats an aborted one, because every draft is reviewed by a
//! human before publishing anyway.
//!
//! ## One Composer, Many Tones
//!
//! Writing voice is data, not code: a [`compose::ToneProfile`] is a
//! persona plus style rules sent as the system message of every
//! completion in a run. Adding a voice means adding a profile, and one
//! article can never mix voices because the profile is fixed before
//! the first call.
//!
//! ## JPEG and PNG Only
//!
//! Output images are JPEG, or PNG when the source is a PNG with real
//! transparency. Blog posts embed photos, not art prints; JPEG at
//! quality 85-90 is what every CDN and social card renderer expects,
//! and the 1200x630 cover crop matches the OGP card size. Sources with
//! alpha are flattened onto white before JPEG encoding so dark-mode
//! viewers never see garbage where transparency was.
//!
//! ## Sequential By Design
//!
//! All HTTP uses `reqwest`'s blocking client. Drafting is a batch job
//! that runs for minutes and is rate-limited by the OpenAI API;
//! parallel requests would only trip the limiter faster and interleave
//! the progress output. One article at a time, top to bottom, is both
//! simpler and exactly as fast in practice.

pub mod compose;
pub mod config;
pub mod frontmatter;
pub mod imaging;
pub mod llm;
pub mod markdown;
pub mod output;
pub mod photos;
pub mod seo;
