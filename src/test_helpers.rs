//! Shared test utilities for the picturebook test suite.
//!
//! Provides fixture writers (PNG, JPEG, SVG assets in temp directories),
//! story builders, and pixel assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_assets(&["bear", "girl"]);
//! let story = story("goldilocks", "Goldilocks", &["Once upon a time"]);
//! ```

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::types::{StoryPage, StoryRequest};

// =========================================================================
// Fixture writers
// =========================================================================

/// Write a PNG whose center is `color` and whose 2 px border is transparent.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for y in 2..height.saturating_sub(2) {
        for x in 2..width.saturating_sub(2) {
            img.put_pixel(x, y, Rgba(color));
        }
    }
    let path = dir.join(name);
    img.save(&path)
        .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
    path
}

/// Write a solid opaque PNG with no alpha channel.
pub fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) -> PathBuf {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let path = dir.join(name);
    img.save(&path)
        .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
    path
}

/// Write a solid JPEG (the file name decides the extension, e.g. `.jfif`).
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) -> PathBuf {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Jpeg)
        .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
    path
}

/// Write an SVG with a single filled circle.
pub fn write_svg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let r = width.min(height) / 2;
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">
  <circle cx="{}" cy="{}" r="{r}" fill="#c86400"/>
</svg>"##,
        width / 2,
        height / 2
    );
    let path = dir.join(name);
    std::fs::write(&path, svg)
        .unwrap_or_else(|e| panic!("failed to write fixture {}: {e}", path.display()));
    path
}

/// Temp directory holding one 80×60 PNG per name (`{name}.png`).
pub fn setup_assets(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (i, name) in names.iter().enumerate() {
        let shade = 40 + (i as u8 % 5) * 40;
        write_png(tmp.path(), &format!("{name}.png"), 80, 60, [shade, 80, 160, 255]);
    }
    tmp
}

// =========================================================================
// Story builders
// =========================================================================

/// A minimal story with the given page texts.
pub fn story(id: &str, title: &str, pages: &[&str]) -> StoryRequest {
    StoryRequest {
        id: id.to_string(),
        title: title.to_string(),
        recommended_age: None,
        category: None,
        description: None,
        pages: pages
            .iter()
            .map(|text| StoryPage {
                text: text.to_string(),
                image: None,
            })
            .collect(),
    }
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Bounding box `(x0, y0, x1, y1)` (exclusive end) of pixels matching `pred`.
/// Panics if nothing matches.
pub fn bounding_box<F>(img: &RgbaImage, pred: F) -> (u32, u32, u32, u32)
where
    F: Fn(&Rgba<u8>) -> bool,
{
    let mut bbox: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in img.enumerate_pixels() {
        if pred(px) {
            bbox = Some(match bbox {
                None => (x, y, x + 1, y + 1),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
            });
        }
    }
    bbox.unwrap_or_else(|| panic!("no pixel matched the predicate"))
}
