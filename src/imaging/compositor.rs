//! Foreground compositing: fit an asset into a region and paste it.
//!
//! Raster assets (PNG/JPEG/WebP, format sniffed from content) are resized
//! with Lanczos3. SVG assets are rasterized directly at the fitted size.
//! Assets with transparency are alpha-blended; opaque assets overwrite.
//!
//! Compositing is never fatal for an illustration: [`place_asset`] logs
//! failures and leaves the canvas as it was.

use image::{ImageReader, RgbaImage, imageops};
use resvg::tiny_skia::{Pixmap, Transform};
use std::path::Path;
use thiserror::Error;

use super::calculations::{fit_limit, fit_within, place_in_region};
use super::canvas::{Canvas, pixmap_to_image};
use super::params::{Anchor, Region};

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("SVG error: {0}")]
    Svg(String),
}

/// Where an asset ended up on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

fn load_svg(path: &Path, limit: f64) -> Result<RgbaImage, CompositeError> {
    let data = std::fs::read(path)?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
        .map_err(|e| CompositeError::Svg(e.to_string()))?;
    let size = tree.size();
    let (w, h) = fit_within(
        (size.width().ceil() as u32, size.height().ceil() as u32),
        limit,
    );
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| CompositeError::Svg(format!("cannot allocate {w}x{h} pixmap")))?;
    let transform = Transform::from_scale(w as f32 / size.width(), h as f32 / size.height());
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap_to_image(&pixmap))
}

/// Load an asset scaled to fit inside a `limit`×`limit` square.
pub fn load_fitted(path: &Path, limit: f64) -> Result<RgbaImage, CompositeError> {
    if is_svg(path) {
        return load_svg(path, limit);
    }
    let source = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let (w, h) = fit_within((source.width(), source.height()), limit);
    Ok(imageops::resize(
        &source.to_rgba8(),
        w,
        h,
        imageops::FilterType::Lanczos3,
    ))
}

/// Fit an asset to `limit` and paste it where `position` says.
///
/// `position` receives the fitted `(width, height)` and returns the absolute
/// top-left corner on the canvas.
pub fn composite_asset<F>(
    canvas: &mut Canvas,
    path: &Path,
    limit: f64,
    position: F,
) -> Result<Placement, CompositeError>
where
    F: FnOnce((u32, u32)) -> (i64, i64),
{
    let asset = load_fitted(path, limit)?;
    let (width, height) = asset.dimensions();
    let (x, y) = position((width, height));
    canvas.paste(&asset, x, y);
    Ok(Placement {
        x,
        y,
        width,
        height,
    })
}

/// Fit an asset to `fraction` of the region's shorter side and paste it at
/// `anchor`, clamped inside the region.
///
/// Failures are logged and leave the canvas untouched.
pub fn place_asset(
    canvas: &mut Canvas,
    path: &Path,
    region: Region,
    anchor: Anchor,
    fraction: f64,
) -> Option<Placement> {
    let limit = fit_limit(region, fraction);
    match composite_asset(canvas, path, limit, |size| {
        place_in_region(region, size, anchor)
    }) {
        Ok(placement) => Some(placement),
        Err(e) => {
            tracing::warn!(asset = %path.display(), error = %e, "could not place asset");
            None
        }
    }
}
