//! Sprite optimizer for foreground assets.
//!
//! Fits every sprite inside a fixed square (256×256 by default), centers it
//! on a transparent background when it does not fill the square, and writes
//! the smallest PNG the encoder can produce. JPEG sources have no alpha, so
//! they are flattened onto white and padded with white instead.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{
    DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, Rgba, RgbaImage, imageops,
};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::convert::flatten_on_white;
use crate::imaging::fit_within;

#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("source directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("sprite size must be at least 1 px")]
    ZeroSize,
}

/// Outcome for one sprite of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub error: Option<String>,
}

/// Batch summary, in file name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteReport {
    pub outcomes: Vec<SpriteOutcome>,
}

impl SpriteReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

fn is_jpeg_name(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ["jpg", "jpeg", "jfif"].iter().any(|j| e.eq_ignore_ascii_case(j)))
}

/// Fit one sprite into a `size`×`size` PNG at `dst`.
pub fn optimize_sprite(src: &Path, dst: &Path, size: u32) -> Result<(), SpriteError> {
    if size == 0 {
        return Err(SpriteError::ZeroSize);
    }
    let reader = ImageReader::open(src)?.with_guessed_format()?;
    let jpeg = reader.format() == Some(ImageFormat::Jpeg) || is_jpeg_name(src);
    let mut img = reader.decode()?;
    if jpeg {
        img = DynamicImage::ImageRgb8(flatten_on_white(&img));
    }

    let (w, h) = fit_within((img.width(), img.height()), size as f64);
    let resized = img.resize_exact(w, h, imageops::FilterType::Lanczos3);
    let (x, y) = (((size - w) / 2) as i64, ((size - h) / 2) as i64);

    let squared = if (w, h) == (size, size) {
        resized
    } else if resized.color().has_alpha() {
        let mut square = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 0]));
        imageops::replace(&mut square, &resized.to_rgba8(), x, y);
        DynamicImage::ImageRgba8(square)
    } else {
        let mut square = RgbImage::from_pixel(size, size, Rgb([255, 255, 255]));
        imageops::replace(&mut square, &resized.to_rgb8(), x, y);
        DynamicImage::ImageRgb8(square)
    };

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(dst)?);
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilter::Adaptive);
    squared.write_with_encoder(encoder)?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), width = w, height = h, "optimized sprite");
    Ok(())
}

/// `*.png` files (any case) directly inside `dir`, sorted by name.
fn png_files(dir: &Path) -> Result<Vec<PathBuf>, SpriteError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let is_png = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if entry.file_type().is_file() && is_png {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Optimize every PNG in `src_dir` into `out_dir/{stem}.png`, in parallel.
///
/// A zero size or a missing source directory is an error; an empty
/// directory yields an empty report. Individual failures are recorded and the batch continues.
pub fn optimize_dir(src_dir: &Path, out_dir: &Path, size: u32) -> Result<SpriteReport, SpriteError> {
    if size == 0 {
        return Err(SpriteError::ZeroSize);
    }
    if !src_dir.is_dir() {
        return Err(SpriteError::MissingDir(src_dir.to_path_buf()));
    }
    let files = png_files(src_dir)?;
    if files.is_empty() {
        tracing::info!(dir = %src_dir.display(), "no PNG sprites found");
        return Ok(SpriteReport::default());
    }
    std::fs::create_dir_all(out_dir)?;

    let outcomes = files
        .par_iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let output = out_dir.join(format!("{stem}.png"));
            let error = optimize_sprite(source, &output, size).err().map(|e| {
                tracing::warn!(file = %source.display(), error = %e, "sprite not optimized");
                e.to_string()
            });
            SpriteOutcome {
                source: source.clone(),
                output,
                error,
            }
        })
        .collect();
    Ok(SpriteReport { outcomes })
}
