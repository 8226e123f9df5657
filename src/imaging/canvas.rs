//! The mutable raster every illustration is built on.
//!
//! Storage is a straight-alpha [`RgbaImage`]. Vector drawing (shapes, caption
//! cards, glyph outlines) goes through tiny-skia: [`Canvas::draw`] lends the
//! pixels out as a premultiplied [`Pixmap`] and copies them back afterwards.
//! Raster pastes and tone adjustments work on the `RgbaImage` directly.
//!
//! A canvas created by [`Canvas::filled`] is opaque and stays opaque through
//! every operation in this crate; it is written out as RGB.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use resvg::tiny_skia::{IntSize, Pixmap, PremultipliedColorU8};
use std::io::{Seek, Write};
use thiserror::Error;

use super::calculations::{enhance_channel, luma};
use crate::config::Rgb;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("canvas has zero size")]
    Empty,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// An opaque canvas filled with `color`.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let [r, g, b] = color;
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Pixel at `(x, y)` as `[r, g, b, a]`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Run vector drawing against a premultiplied pixmap view of the canvas.
    pub fn draw<F>(&mut self, paint: F) -> Result<(), CanvasError>
    where
        F: FnOnce(&mut Pixmap),
    {
        let (w, h) = self.dimensions();
        let size = IntSize::from_wh(w, h).ok_or(CanvasError::Empty)?;
        let mut data = self.image.as_raw().clone();
        for px in data.chunks_exact_mut(4) {
            premultiply(px);
        }
        let mut pixmap = Pixmap::from_vec(data, size).ok_or(CanvasError::Empty)?;

        paint(&mut pixmap);

        for (dst, src) in self.image.pixels_mut().zip(pixmap.pixels()) {
            *dst = straight(src);
        }
        Ok(())
    }

    /// Overwrite every pixel with an opaque color computed from its position.
    pub fn fill_with<F>(&mut self, color_at: F)
    where
        F: Fn(u32, u32) -> Rgb,
    {
        for (x, y, px) in self.image.enumerate_pixels_mut() {
            let [r, g, b] = color_at(x, y);
            *px = Rgba([r, g, b, 255]);
        }
    }

    /// Alpha-blend `layer` with its top-left corner at `(x, y)`.
    ///
    /// Parts of the layer outside the canvas are dropped. A layer without
    /// transparency overwrites the pixels it covers.
    pub fn paste(&mut self, layer: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.image, layer, x, y);
    }

    /// Brightness then contrast enhancement.
    ///
    /// Brightness scales every channel toward black by `brightness`. Contrast
    /// scales every channel away from the mean luma of the brightened image
    /// (rounded) by `contrast`. Alpha is left alone.
    pub fn enhance(&mut self, brightness: f32, contrast: f32) {
        for px in self.image.pixels_mut() {
            for c in &mut px.0[..3] {
                *c = enhance_channel(*c, 0, brightness);
            }
        }

        let count = self.image.pixels().len() as u64;
        if count == 0 {
            return;
        }
        let total: u64 = self
            .image
            .pixels()
            .map(|p| luma(p.0[0], p.0[1], p.0[2]) as u64)
            .sum();
        let mean = (total as f64 / count as f64 + 0.5) as u8;

        for px in self.image.pixels_mut() {
            for c in &mut px.0[..3] {
                *c = enhance_channel(*c, mean, contrast);
            }
        }
    }

    /// Encode the canvas as an RGB PNG into `writer`.
    pub fn write_png<W: Write + Seek>(&self, writer: &mut W) -> Result<(), CanvasError> {
        let rgb = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        rgb.write_to(writer, ImageFormat::Png)?;
        Ok(())
    }
}

fn straight(px: &PremultipliedColorU8) -> Rgba<u8> {
    let c = px.demultiply();
    Rgba([c.red(), c.green(), c.blue(), c.alpha()])
}

/// Copy a premultiplied pixmap into a straight-alpha image.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        *dst = straight(src);
    }
    image
}

fn premultiply(px: &mut [u8]) {
    let a = px[3] as u32;
    if a == 255 {
        return;
    }
    for c in &mut px[..3] {
        *c = ((*c as u32 * a + 127) / 255) as u8;
    }
}
