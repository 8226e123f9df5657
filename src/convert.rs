//! Format conversion: anything decodable → PNG, PNG → multi-size ICO.
//!
//! Decoding sniffs the content, so a `.jfif` (JPEG) or a misnamed file
//! converts without help from its extension. ICO output is flattened on
//! white because favicons are shown on light browser chrome.

use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, imageops};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("refusing to convert .{0} files onto themselves")]
    SameFormat(String),
    #[error("icon sizes must be non-empty and each within 1-256, got {0:?}")]
    IconSizes(Vec<u32>),
}

/// Result of converting one file in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub source: PathBuf,
    pub output: PathBuf,
    pub error: Option<String>,
}

/// Composite an image over opaque white, dropping the alpha channel.
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u32;
        let over = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

fn decode(path: &Path) -> Result<DynamicImage, ConvertError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Decode `src` (format sniffed) and write it to `dst` as PNG.
pub fn convert_to_png(src: &Path, dst: &Path) -> Result<(), ConvertError> {
    let img = decode(src)?;
    img.save_with_format(dst, ImageFormat::Png)?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), "converted to png");
    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Convert every `*.{ext}` file in `dir` (non-recursive) to a PNG next to it.
///
/// Per-file failures are reported in the result, not returned as errors.
pub fn convert_dir_to_png(dir: &Path, ext: &str) -> Result<Vec<Converted>, ConvertError> {
    let ext = ext.trim_start_matches('.');
    if ext.eq_ignore_ascii_case("png") {
        return Err(ConvertError::SameFormat(ext.to_string()));
    }
    if !dir.is_dir() {
        return Err(ConvertError::MissingDir(dir.to_path_buf()));
    }

    let mut results = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let source = entry.path();
        if !entry.file_type().is_file() || !has_extension(source, ext) {
            continue;
        }
        let output = source.with_extension("png");
        let error = convert_to_png(source, &output).err().map(|e| {
            tracing::warn!(file = %source.display(), error = %e, "conversion failed");
            e.to_string()
        });
        results.push(Converted {
            source: source.to_path_buf(),
            output,
            error,
        });
    }
    Ok(results)
}

/// Write `src` as an ICO holding one square, white-flattened entry per size.
pub fn png_to_ico(src: &Path, dst: &Path, sizes: &[u32]) -> Result<(), ConvertError> {
    if sizes.is_empty() || sizes.iter().any(|&s| s == 0 || s > 256) {
        return Err(ConvertError::IconSizes(sizes.to_vec()));
    }
    let flat = DynamicImage::ImageRgb8(flatten_on_white(&decode(src)?));

    let mut icon_dir = IconDir::new(ResourceType::Icon);
    for &size in sizes {
        let resized = imageops::resize(&flat.to_rgba8(), size, size, imageops::FilterType::Lanczos3);
        let image = IconImage::from_rgba_data(size, size, resized.into_raw());
        icon_dir.add_entry(IconDirEntry::encode(&image)?);
    }

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    icon_dir.write(BufWriter::new(File::create(dst)?))?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), ?sizes, "wrote icon");
    Ok(())
}
