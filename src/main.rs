use clap::{Parser, Subcommand};
use draftsmith::compose::{self, Brief, ComposeContext, ComposeRequest, ToneProfile};
use draftsmith::config::{self, Credentials, SiteConfig};
use draftsmith::imaging::{FitMode, ImageOptimizer, OptimizeOptions, OptimizeOutcome};
use draftsmith::llm::OpenAiClient;
use draftsmith::output;
use draftsmith::photos::UnsplashClient;
use draftsmith::seo;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "draftsmith")]
#[command(about = "AI-assisted drafting toolkit for Jekyll-style blogs")]
#[command(long_about = "\
AI-assisted drafting toolkit for Jekyll-style blogs

Drafts are composed with an LLM, illustrated from Unsplash, optimized
for the web, and written as plain Markdown your site generator already
understands. Nothing is published: every draft lands in _drafts/ for
human review.

Site structure:

  my-blog/
  ├── _config.yml                  # Jekyll's config (untouched)
  ├── draftsmith.toml              # Our config (optional)
  ├── .env                         # API keys (optional, see below)
  ├── _drafts/
  │   └── 2026-08-26-some-slug.md  # Composed drafts land here
  ├── _posts/
  │   └── 2026-07-01-older-post.md # Published posts (scanned by `seo`)
  ├── assets/img/posts/            # Optimized images land here
  └── seo_report.md                # Written by `seo`

Credentials come from the environment or a .env file in the working
directory:

  OPENAI_API_KEY       required for compose and generate
  UNSPLASH_ACCESS_KEY  optional; without it drafts have no images

Run 'draftsmith gen-config' to generate a documented draftsmith.toml.")]
#[command(version)]
struct Cli {
    /// Site root directory (where _drafts, _posts, and assets live)
    #[arg(long, default_value = ".", global = true)]
    site_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose one draft from a free-text overview
    Compose {
        /// What the article should be about
        #[arg(long)]
        overview: String,

        /// Fixed section skeleton: how-to, listicle, case-study, comparison
        #[arg(long)]
        template: Option<String>,

        /// Skip photo search and embedding
        #[arg(long)]
        no_images: bool,
    },
    /// Draft articles from the configured topic pool
    Generate {
        /// How many drafts to produce (default: generation.articles_per_run)
        #[arg(long)]
        count: Option<u32>,
    },
    /// Optimize one image, or every image directly inside a directory
    Optimize {
        /// Image file or directory
        path: PathBuf,

        /// Cover-crop to the thumbnail box instead of capping the width
        #[arg(long)]
        thumbnail: bool,
    },
    /// Score posts and drafts against the SEO checklist, write seo_report.md
    Seo,
    /// Print a stock draftsmith.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compose {
            overview,
            template,
            no_images,
        } => {
            let config = config::load_config(&cli.site_dir)?;
            let template = match template.as_deref() {
                Some(name) => Some(compose::template_by_name(name).ok_or_else(|| {
                    format!(
                        "unknown template \"{name}\"; available: how-to, listicle, case-study, comparison"
                    )
                })?),
                None => None,
            };

            let credentials = Credentials::from_env()?;
            let model = new_model(&credentials, &config);
            let photos = photo_client(&credentials);
            let optimizer = new_optimizer(&cli.site_dir, &config);
            let ctx = ComposeContext {
                model: &model,
                photos: photos.as_ref(),
                optimizer: &optimizer,
                config: &config,
                site_root: &cli.site_dir,
            };

            let request = ComposeRequest {
                brief: Brief::Overview(overview),
                tone: ToneProfile::by_name(&config.generation.tone),
                template,
                with_images: !no_images,
            };
            let record = compose::compose_article(&ctx, &request)?;
            output::print_compose_summary(&record);
        }
        Command::Generate { count } => {
            let config = config::load_config(&cli.site_dir)?;
            let credentials = Credentials::from_env()?;
            let model = new_model(&credentials, &config);
            let photos = photo_client(&credentials);
            let optimizer = new_optimizer(&cli.site_dir, &config);
            let ctx = ComposeContext {
                model: &model,
                photos: photos.as_ref(),
                optimizer: &optimizer,
                config: &config,
                site_root: &cli.site_dir,
            };

            let count = count.unwrap_or(config.generation.articles_per_run);
            let outcomes = compose::generate_batch(&ctx, count)?;
            output::print_draft_outcomes(&outcomes);
        }
        Command::Optimize { path, thumbnail } => {
            let config = config::load_config(&cli.site_dir)?;
            let optimizer = new_optimizer(&cli.site_dir, &config);
            let mode = if thumbnail {
                FitMode::Thumbnail
            } else {
                FitMode::Inline
            };

            let outcomes = if path.is_dir() {
                optimizer.optimize_directory(&path, mode)?
            } else {
                vec![OptimizeOutcome {
                    source: path.clone(),
                    result: optimizer.optimize_file(&path, mode),
                }]
            };
            output::print_optimize_outcomes(&outcomes);
        }
        Command::Seo => {
            let config = config::load_config(&cli.site_dir)?;
            let batch = seo::analyze_site(&cli.site_dir, &config);
            let report_path = seo::write_report(&batch, &cli.site_dir)?;
            output::print_seo_summary(&batch, &report_path);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn new_model(credentials: &Credentials, config: &SiteConfig) -> OpenAiClient {
    OpenAiClient::new(credentials.llm_api_key.clone(), config.generation.model.clone())
}

fn new_optimizer(site_dir: &Path, config: &SiteConfig) -> ImageOptimizer {
    ImageOptimizer::new(
        site_dir,
        &config.dirs.assets,
        OptimizeOptions::from_images_config(&config.images),
    )
}

/// Build the Unsplash client when an access key is configured. Says so
/// once when there is none, so image-less drafts are not a surprise.
fn photo_client(credentials: &Credentials) -> Option<UnsplashClient> {
    match &credentials.photo_access_key {
        Some(key) => Some(UnsplashClient::new(key.clone())),
        None => {
            println!("No photo API key configured; drafting without images");
            None
        }
    }
}
