//! Site configuration module.
//!
//! Handles loading, validating, and merging `draftsmith.toml`. Stock
//! defaults are the base layer; a config file in the site root
//! overrides just the keys it names.
//!
//! ## Config File Location
//!
//! Place `draftsmith.toml` in the site root, next to Jekyll's own
//! `_config.yml`:
//!
//! ```text
//! my-blog/
//! ├── _config.yml         # Jekyll's config (not ours)
//! ├── draftsmith.toml     # Overrides stock defaults
//! ├── _drafts/
//! ├── _posts/
//! └── assets/img/posts/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! author = "Kevin"          # Byline written into draft front matter
//!
//! [dirs]
//! drafts = "_drafts"        # Where new drafts land
//! posts = "_posts"          # Published posts (scanned by the SEO check)
//! assets = "assets/img/posts"  # Where optimized images land
//!
//! [images]
//! max_width = 1000          # Inline images wider than this are scaled down
//! inline_quality = 90       # JPEG quality for inline images (1-100)
//! thumbnail_quality = 85    # JPEG quality for cover thumbnails (1-100)
//! thumbnail_size = [1200, 630]  # Cover crop box (OGP card size)
//! preserve_png = true       # Keep PNG for sources with transparency
//!
//! [generation]
//! model = "gpt-4o-mini"     # OpenAI chat model
//! articles_per_run = 3      # Drafts per `generate` run
//! min_body_chars = 2000     # Shorter bodies get one top-up section
//! tone = "professional"     # professional | friendly | analytical
//!
//! [[topics]]
//! theme = "Practical AI tools for everyday work"
//! categories = ["ai"]
//! tags = ["ai", "tools", "productivity"]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only change the byline
//! author = "Alex"
//! ```
//!
//! The one exception is `[[topics]]`: listing any topic replaces the
//! whole stock topic list. Unknown keys are rejected to catch typos
//! early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config filename looked up in the site root.
pub const CONFIG_FILENAME: &str = "draftsmith.toml";

/// Environment variable holding the OpenAI API key. Required for
/// `compose` and `generate`.
pub const LLM_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable holding the Unsplash access key. Optional;
/// drafts are composed without images when it is absent.
pub const PHOTO_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("environment variable {0} is not set; export it or add it to a .env file")]
    MissingEnv(&'static str),
}

/// Site configuration loaded from `draftsmith.toml`.
///
/// All fields have sensible defaults. User config files need only
/// specify the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Byline written into the `author` front matter key.
    #[serde(default = "default_author")]
    pub author: String,
    /// Site directory layout.
    pub dirs: DirsConfig,
    /// Image optimization settings.
    pub images: ImagesConfig,
    /// Article generation settings.
    pub generation: GenerationConfig,
    /// Topic pool drawn from by `generate`. Any user-supplied list
    /// replaces this wholesale.
    pub topics: Vec<TopicProfile>,
}

fn default_author() -> String {
    "Kevin".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            dirs: DirsConfig::default(),
            images: ImagesConfig::default(),
            generation: GenerationConfig::default(),
            topics: default_topics(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.inline_quality) {
            return Err(ConfigError::Validation(
                "images.inline_quality must be 1-100".into(),
            ));
        }
        if !(1..=100).contains(&self.images.thumbnail_quality) {
            return Err(ConfigError::Validation(
                "images.thumbnail_quality must be 1-100".into(),
            ));
        }
        if self.images.max_width == 0 {
            return Err(ConfigError::Validation(
                "images.max_width must be non-zero".into(),
            ));
        }
        if self.images.thumbnail_size[0] == 0 || self.images.thumbnail_size[1] == 0 {
            return Err(ConfigError::Validation(
                "images.thumbnail_size values must be non-zero".into(),
            ));
        }
        if self.generation.articles_per_run == 0 {
            return Err(ConfigError::Validation(
                "generation.articles_per_run must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Site directory layout, relative to the site root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirsConfig {
    /// Where new drafts are written.
    pub drafts: String,
    /// Published posts, scanned by the SEO check alongside drafts.
    pub posts: String,
    /// Where optimized images are written; also the public URL prefix.
    pub assets: String,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            drafts: "_drafts".to_string(),
            posts: "_posts".to_string(),
            assets: "assets/img/posts".to_string(),
        }
    }
}

/// Image optimization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Inline images wider than this are scaled down to it.
    pub max_width: u32,
    /// JPEG quality for inline images (1 = worst, 100 = best).
    pub inline_quality: u32,
    /// JPEG quality for cover thumbnails (1 = worst, 100 = best).
    pub thumbnail_quality: u32,
    /// Cover crop box as `[width, height]`. The default is the OGP
    /// card size.
    pub thumbnail_size: [u32; 2],
    /// Keep PNG output for PNG sources with transparency instead of
    /// flattening to JPEG.
    pub preserve_png: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_width: 1000,
            inline_quality: 90,
            thumbnail_quality: 85,
            thumbnail_size: [1200, 630],
            preserve_png: true,
        }
    }
}

/// Article generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// OpenAI chat model name.
    pub model: String,
    /// How many drafts one `generate` run produces.
    pub articles_per_run: u32,
    /// Bodies shorter than this get one extra top-up section.
    pub min_body_chars: usize,
    /// Writing tone; unknown names fall back to the first built-in.
    pub tone: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            articles_per_run: 3,
            min_body_chars: 2000,
            tone: "professional".to_string(),
        }
    }
}

/// One entry in the topic pool. The theme seeds the article; the
/// categories and tags are fallbacks when the model's taxonomy answer
/// cannot be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicProfile {
    pub theme: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn topic(theme: &str, categories: &[&str], tags: &[&str]) -> TopicProfile {
    TopicProfile {
        theme: theme.to_string(),
        categories: categories.iter().map(|s| s.to_string()).collect(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
    }
}

fn default_topics() -> Vec<TopicProfile> {
    vec![
        topic(
            "Practical AI tools for everyday work",
            &["ai"],
            &["ai", "tools", "productivity"],
        ),
        topic(
            "Side projects that actually ship",
            &["programming"],
            &["side-projects", "indie", "shipping"],
        ),
        topic(
            "Personal finance for engineers",
            &["finance"],
            &["money", "saving", "investing"],
        ),
        topic(
            "Deep work and focus habits",
            &["productivity"],
            &["focus", "habits", "deep-work"],
        ),
        topic(
            "Learning to program as an adult",
            &["programming"],
            &["learning", "beginners", "career"],
        ),
    ]
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as
/// the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely; this
///   includes arrays, so a user `[[topics]]` list replaces the stock
///   one.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `draftsmith.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and
/// validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `draftsmith.toml` in the given site root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `draftsmith.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command. Parses back to exactly the
/// stock defaults.
pub fn stock_config_toml() -> &'static str {
    r##"# Draftsmith Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the site root, next to Jekyll's _config.yml.
# Unknown keys will cause an error.

# Byline written into the `author` front matter key of every draft.
author = "Kevin"

# ---------------------------------------------------------------------------
# Site directory layout (relative to the site root)
# ---------------------------------------------------------------------------
[dirs]
# Where new drafts are written.
drafts = "_drafts"

# Published posts; the SEO check scans these alongside drafts.
posts = "_posts"

# Where optimized images are written. Also the public URL prefix, so
# keep it aligned with how the site serves assets.
assets = "assets/img/posts"

# ---------------------------------------------------------------------------
# Image optimization
# ---------------------------------------------------------------------------
[images]
# Inline images wider than this (pixels) are scaled down to it.
max_width = 1000

# JPEG quality for inline images (1 = worst, 100 = best).
inline_quality = 90

# JPEG quality for cover thumbnails.
thumbnail_quality = 85

# Cover crop box as [width, height]. 1200x630 is the OGP card size.
thumbnail_size = [1200, 630]

# Keep PNG output for PNG sources with transparency. Set to false to
# flatten everything onto white and encode as JPEG.
preserve_png = true

# ---------------------------------------------------------------------------
# Article generation
# ---------------------------------------------------------------------------
[generation]
# OpenAI chat model name.
model = "gpt-4o-mini"

# How many drafts one `generate` run produces.
articles_per_run = 3

# Bodies shorter than this many characters get one extra section.
min_body_chars = 2000

# Writing tone: professional, friendly, or analytical.
tone = "professional"

# ---------------------------------------------------------------------------
# Topic pool for `generate`
# ---------------------------------------------------------------------------
# Listing any [[topics]] entry replaces this whole stock list, so copy
# the ones you want to keep. Categories and tags are fallbacks for when
# the model's taxonomy answer cannot be parsed.

[[topics]]
theme = "Practical AI tools for everyday work"
categories = ["ai"]
tags = ["ai", "tools", "productivity"]

[[topics]]
theme = "Side projects that actually ship"
categories = ["programming"]
tags = ["side-projects", "indie", "shipping"]

[[topics]]
theme = "Personal finance for engineers"
categories = ["finance"]
tags = ["money", "saving", "investing"]

[[topics]]
theme = "Deep work and focus habits"
categories = ["productivity"]
tags = ["focus", "habits", "deep-work"]

[[topics]]
theme = "Learning to program as an adult"
categories = ["programming"]
tags = ["learning", "beginners", "career"]
"##
}

// =============================================================================
// Credentials
// =============================================================================

/// API keys pulled from the environment, separate from the config file
/// so the file can be committed to the site repository.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub photo_access_key: Option<String>,
}

impl Credentials {
    /// Read keys from the environment, loading a `.env` file first
    /// when one exists. The LLM key is required; the photo key is
    /// optional and composing proceeds without images when it is
    /// absent. Keys that are set but blank count as absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let llm_api_key = std::env::var(LLM_KEY_VAR)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingEnv(LLM_KEY_VAR))?;
        let photo_access_key = std::env::var(PHOTO_KEY_VAR)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Ok(Credentials {
            llm_api_key,
            photo_access_key,
        })
    }
}
