//! Decode, normalize, fit, and re-encode images for publishing.
//!
//! Every source image goes through the same pipeline regardless of
//! where it came from (a local file or bytes downloaded from a photo
//! API):
//!
//! 1. decode, guessing the format from content
//! 2. apply the EXIF orientation so pixels match how the photo is meant
//!    to be viewed
//! 3. fit by role: thumbnails cover-crop to an exact box, inline images
//!    get width-capped
//! 4. flatten transparency onto white, unless the source is a PNG with
//!    an alpha channel and PNG preservation is enabled
//! 5. encode in memory, then write
//!
//! The encode happens fully in memory and the destination file is only
//! created after it succeeds, so a failed conversion never leaves a
//! truncated file in the assets directory.

use crate::config::ImagesConfig;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage, imageops};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::fit;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("image not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("failed to decode {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode {origin}: {source}")]
    Encode {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    #[error("no free filename for {0}; clear out the suffixed copies")]
    NameExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JPEG quality setting (1-100). Values outside the valid range are
/// clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Quality(value.clamp(1, 100))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality(90)
    }
}

/// How an image is fitted to its published size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Cover-crop to the exact thumbnail box (social-card size).
    Thumbnail,
    /// Cap the width, no height limit, never upscale.
    Inline,
}

/// Where the source pixels come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    File(PathBuf),
    /// Bytes already in memory, e.g. downloaded from a photo API.
    /// `origin` is a human-readable label used in errors and hashing.
    Bytes { data: Vec<u8>, origin: String },
}

/// One image to optimize.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub source: ImageSource,
    pub mode: FitMode,
    /// Output filename stem. When `None` a stem is derived from the
    /// current time and a content hash.
    pub stem: Option<String>,
}

/// Tuning knobs for the pipeline, usually mapped from `[images]` in
/// the site config.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub max_width: u32,
    pub thumbnail_box: (u32, u32),
    pub thumbnail_quality: Quality,
    pub inline_quality: Quality,
    /// Keep PNGs with transparency as PNG instead of flattening to JPEG.
    pub preserve_png: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        OptimizeOptions {
            max_width: 1000,
            thumbnail_box: (1200, 630),
            thumbnail_quality: Quality::new(85),
            inline_quality: Quality::new(90),
            preserve_png: true,
        }
    }
}

impl OptimizeOptions {
    pub fn from_images_config(config: &ImagesConfig) -> Self {
        OptimizeOptions {
            max_width: config.max_width,
            thumbnail_box: (config.thumbnail_size[0], config.thumbnail_size[1]),
            thumbnail_quality: Quality::new(config.thumbnail_quality),
            inline_quality: Quality::new(config.inline_quality),
            preserve_png: config.preserve_png,
        }
    }

    fn quality_for(&self, mode: FitMode) -> Quality {
        match mode {
            FitMode::Thumbnail => self.thumbnail_quality,
            FitMode::Inline => self.inline_quality,
        }
    }
}

/// Output format of an optimized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// A successfully optimized image and its vital statistics.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    /// Where the file landed on disk.
    pub file_path: PathBuf,
    /// Root-relative URL for use in Markdown and front matter.
    pub public_path: String,
    pub format: OutputFormat,
    pub original_dimensions: (u32, u32),
    pub output_dimensions: (u32, u32),
    pub original_bytes: u64,
    pub optimized_bytes: u64,
    /// Size reduction in percent. Negative when the output grew.
    pub compression_ratio: f64,
}

/// Per-file result of a directory batch. Failures are carried, not
/// raised, so one broken file never stops the rest.
#[derive(Debug)]
pub struct OptimizeOutcome {
    pub source: PathBuf,
    pub result: Result<OptimizedImage, ImagingError>,
}

/// File extensions picked up by directory scans.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Random suffixes tried per filename collision before giving up.
const NAME_ATTEMPTS: u32 = 100;

pub fn is_source_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Runs the optimization pipeline and places outputs in the assets
/// directory, handing back root-relative public paths.
pub struct ImageOptimizer {
    assets_dir: PathBuf,
    public_prefix: String,
    options: OptimizeOptions,
}

impl ImageOptimizer {
    /// `assets_rel` is the assets directory relative to the site root,
    /// e.g. `assets/img/posts`; it doubles as the public URL prefix.
    pub fn new(site_root: &Path, assets_rel: &str, options: OptimizeOptions) -> Self {
        let trimmed = assets_rel.trim_matches('/');
        ImageOptimizer {
            assets_dir: site_root.join(trimmed),
            public_prefix: format!("/{trimmed}"),
            options,
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Optimize a single local file.
    pub fn optimize_file(&self, path: &Path, mode: FitMode) -> Result<OptimizedImage, ImagingError> {
        self.optimize(&ImageJob {
            source: ImageSource::File(path.to_path_buf()),
            mode,
            stem: None,
        })
    }

    /// Optimize every supported image directly inside `dir`. Results
    /// come back in filename order, one entry per candidate file.
    pub fn optimize_directory(
        &self,
        dir: &Path,
        mode: FitMode,
    ) -> Result<Vec<OptimizeOutcome>, ImagingError> {
        if !dir.is_dir() {
            return Err(ImagingError::SourceNotFound(dir.to_path_buf()));
        }

        let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_source_image(path))
            .collect();
        candidates.sort();

        Ok(candidates
            .into_iter()
            .map(|path| {
                let result = self.optimize_file(&path, mode);
                OptimizeOutcome {
                    source: path,
                    result,
                }
            })
            .collect())
    }

    /// Run the full pipeline for one job.
    pub fn optimize(&self, job: &ImageJob) -> Result<OptimizedImage, ImagingError> {
        let (bytes, origin) = match &job.source {
            ImageSource::File(path) => {
                if !path.is_file() {
                    return Err(ImagingError::SourceNotFound(path.clone()));
                }
                (fs::read(path)?, path.display().to_string())
            }
            ImageSource::Bytes { data, origin } => (data.clone(), origin.clone()),
        };
        let original_bytes = bytes.len() as u64;

        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let source_format = reader.format();
        let mut decoder = reader.into_decoder().map_err(|source| ImagingError::Decode {
            origin: origin.clone(),
            source,
        })?;
        // A missing or unparseable orientation tag means "leave as is".
        let orientation = decoder
            .orientation()
            .unwrap_or(Orientation::NoTransforms);
        let mut img =
            DynamicImage::from_decoder(decoder).map_err(|source| ImagingError::Decode {
                origin: origin.clone(),
                source,
            })?;
        let original_dimensions = (img.width(), img.height());
        img.apply_orientation(orientation);

        let fitted = match job.mode {
            FitMode::Thumbnail => cover_crop(&img, self.options.thumbnail_box),
            FitMode::Inline => cap_width(img, self.options.max_width),
        };
        let output_dimensions = (fitted.width(), fitted.height());

        let keep_png = self.options.preserve_png
            && source_format == Some(ImageFormat::Png)
            && fitted.color().has_alpha();
        let (encoded, format) = if keep_png {
            let encoded = encode_png(&fitted).map_err(|source| ImagingError::Encode {
                origin: origin.clone(),
                source,
            })?;
            (encoded, OutputFormat::Png)
        } else {
            let flattened = flatten_onto_white(fitted);
            let quality = self.options.quality_for(job.mode);
            let encoded =
                encode_jpeg(&flattened, quality).map_err(|source| ImagingError::Encode {
                    origin: origin.clone(),
                    source,
                })?;
            (encoded, OutputFormat::Jpeg)
        };

        let stem = match &job.stem {
            Some(stem) => stem.clone(),
            None => derived_stem(&bytes),
        };
        fs::create_dir_all(&self.assets_dir)?;
        let filename = self.collision_free_name(&stem, format.extension())?;
        let file_path = self.assets_dir.join(&filename);
        fs::write(&file_path, &encoded)?;

        let optimized_bytes = encoded.len() as u64;
        Ok(OptimizedImage {
            file_path,
            public_path: format!("{}/{}", self.public_prefix, filename),
            format,
            original_dimensions,
            output_dimensions,
            original_bytes,
            optimized_bytes,
            compression_ratio: compression_ratio(original_bytes, optimized_bytes),
        })
    }

    /// First choice is `{stem}.{ext}`; on collision a random 3-digit
    /// suffix is appended, up to [`NAME_ATTEMPTS`] tries.
    fn collision_free_name(&self, stem: &str, ext: &str) -> Result<String, ImagingError> {
        let plain = format!("{stem}.{ext}");
        if !self.assets_dir.join(&plain).exists() {
            return Ok(plain);
        }
        let mut rng = rand::rng();
        for _ in 0..NAME_ATTEMPTS {
            let candidate = format!("{stem}-{}.{ext}", rng.random_range(100..1000));
            if !self.assets_dir.join(&candidate).exists() {
                return Ok(candidate);
            }
        }
        Err(ImagingError::NameExhausted(plain))
    }
}

/// Stem for sources that did not bring a name: capture time plus the
/// first 8 hex chars of the content hash.
fn derived_stem(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex = format!("{digest:x}");
    let now = chrono::Local::now();
    format!("img_{}_{}", now.format("%Y%m%d_%H%M%S"), &hex[..8])
}

/// Size reduction in percent, rounded to one decimal place.
fn compression_ratio(original: u64, optimized: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let ratio = (1.0 - optimized as f64 / original as f64) * 100.0;
    (ratio * 10.0).round() / 10.0
}

fn cover_crop(img: &DynamicImage, target: (u32, u32)) -> DynamicImage {
    let (scaled_w, scaled_h) = fit::cover_dimensions((img.width(), img.height()), target);
    let scaled = img.resize_exact(scaled_w, scaled_h, FilterType::Lanczos3);
    let (x, y) = fit::crop_origin((scaled_w, scaled_h), target);
    scaled.crop_imm(x, y, target.0, target.1)
}

fn cap_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    match fit::width_capped((img.width(), img.height()), max_width) {
        Some((w, h)) => img.resize_exact(w, h, FilterType::Lanczos3),
        None => img,
    }
}

/// Composite any transparency onto a white background and drop the
/// alpha channel. Opaque images just lose their alpha cheaply.
fn flatten_onto_white(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return DynamicImage::ImageRgb8(img.to_rgb8());
    }
    let rgba = img.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality.value() as u8);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut buf),
        CompressionType::Best,
        PngFilter::Adaptive,
    );
    img.write_with_encoder(encoder)?;
    Ok(buf)
}
