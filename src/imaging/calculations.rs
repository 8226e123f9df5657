//! Pure calculation functions for layout and pattern geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Integer results truncate the same way the drawing code expects them to,
//! so the tests below double as a record of the rounding rules.

use super::params::{Anchor, Region};

/// Fit a source box inside a square of side `limit`, preserving aspect ratio.
///
/// The scale factor is `min(limit / w, limit / h)`; both output dimensions
/// are truncated and never drop below one pixel.
///
/// # Examples
/// ```
/// # use picturebook::imaging::fit_within;
/// // 400×200 into 240 → 240×120
/// assert_eq!(fit_within((400, 200), 240.0), (240, 120));
/// ```
pub fn fit_within(source: (u32, u32), limit: f64) -> (u32, u32) {
    let (sw, sh) = source;
    if sw == 0 || sh == 0 {
        return (1, 1);
    }
    let scale = (limit / sw as f64).min(limit / sh as f64);
    let w = ((sw as f64 * scale) as u32).max(1);
    let h = ((sh as f64 * scale) as u32).max(1);
    (w, h)
}

/// Side of the square an asset is fitted into for a region.
///
/// `min(region width, region height) × fraction`.
pub fn fit_limit(region: Region, fraction: f64) -> f64 {
    region.width.min(region.height) as f64 * fraction
}

/// Raw anchor offset of an asset inside a region, relative to the region.
///
/// Center uses the midpoint; left/right sit on the 1/5 and 4/5 verticals;
/// top/bottom sit on the 1/5 and 4/5 horizontals. The result may be negative
/// or overflow the region; see [`place_in_region`] for the clamped version.
pub fn anchor_offset(region: (u32, u32), asset: (u32, u32), anchor: Anchor) -> (i64, i64) {
    let (rw, rh) = (region.0 as i64, region.1 as i64);
    let (aw, ah) = (asset.0 as i64, asset.1 as i64);
    let center_x = (rw - aw).div_euclid(2);
    let center_y = (rh - ah).div_euclid(2);
    match anchor {
        Anchor::Center => (center_x, center_y),
        Anchor::Left => (rw / 5 - aw / 2, center_y),
        Anchor::Right => (rw * 4 / 5 - aw / 2, center_y),
        Anchor::Top => (center_x, rh / 5 - ah / 2),
        Anchor::Bottom => (center_x, rh * 4 / 5 - ah / 2),
    }
}

/// Clamp one axis of an offset so `[offset, offset + size)` stays in `[0, extent)`.
///
/// When the asset is larger than the extent it is centered instead.
fn clamp_axis(offset: i64, size: i64, extent: i64) -> i64 {
    if size <= extent {
        offset.clamp(0, extent - size)
    } else {
        (extent - size).div_euclid(2)
    }
}

/// Absolute canvas position of an asset placed at `anchor` in `region`.
///
/// The anchor offset is clamped so the asset box lies inside the region
/// whenever it fits.
pub fn place_in_region(region: Region, asset: (u32, u32), anchor: Anchor) -> (i64, i64) {
    let (ox, oy) = anchor_offset((region.width, region.height), asset, anchor);
    let x = clamp_axis(ox, asset.0 as i64, region.width as i64);
    let y = clamp_axis(oy, asset.1 as i64, region.height as i64);
    (region.x as i64 + x, region.y as i64 + y)
}

/// Split a cover into the title band (top) and the asset zone (the rest).
///
/// The title band height is `⌊H × title_ratio⌋`.
pub fn cover_zones(canvas: (u32, u32), title_ratio: f64) -> (Region, Region) {
    let (w, h) = canvas;
    let title_h = (h as f64 * title_ratio) as u32;
    (
        Region::new(0, 0, w, title_h),
        Region::new(0, title_h, w, h - title_h),
    )
}

/// Caption anchor for a 1-based page number: bottom on even pages, top on odd.
pub fn page_text_anchor(page_number: usize) -> Anchor {
    if page_number % 2 == 0 {
        Anchor::Bottom
    } else {
        Anchor::Top
    }
}

/// Split a page into the text band and the asset zone.
///
/// The text band is `⌊H × text_ratio⌋` high and sits at the edge named by
/// `text_anchor` (top or bottom); the asset zone is the remainder.
pub fn page_zones(canvas: (u32, u32), text_ratio: f64, text_anchor: Anchor) -> (Region, Region) {
    let (w, h) = canvas;
    let text_h = (h as f64 * text_ratio) as u32;
    let asset_h = h - text_h;
    match text_anchor {
        Anchor::Bottom => (
            Region::new(0, asset_h, w, text_h),
            Region::new(0, 0, w, asset_h),
        ),
        _ => (
            Region::new(0, 0, w, text_h),
            Region::new(0, text_h, w, asset_h),
        ),
    }
}

/// Inclusive range of x positions for a page asset kept `margin` px from both
/// canvas edges. `None` when the asset is too wide for any such position.
pub fn horizontal_range(canvas_width: u32, asset_width: u32, margin: u32) -> Option<(u32, u32)> {
    let hi = canvas_width as i64 - asset_width as i64 - margin as i64;
    if hi < margin as i64 {
        None
    } else {
        Some((margin, hi as u32))
    }
}

/// Linear interpolation between two channel values at `num / den`, truncated.
pub fn lerp_channel(from: u8, to: u8, num: u32, den: u32) -> u8 {
    if den == 0 {
        return from;
    }
    let v = from as f64 + (to as f64 - from as f64) * num as f64 / den as f64;
    v.clamp(0.0, 255.0) as u8
}

/// The ten vertices of a five-pointed star, starting at the top and
/// alternating outer and inner radius at 36° steps.
///
/// The inner radius is half the outer radius (integer division).
pub fn star_points(cx: f32, cy: f32, outer: u32) -> [(f32, f32); 10] {
    let inner = outer / 2;
    let mut points = [(0.0, 0.0); 10];
    for (i, point) in points.iter_mut().enumerate() {
        let r = (if i % 2 == 0 { outer } else { inner }) as f32;
        let angle = std::f32::consts::PI * i as f32 / 5.0;
        *point = (cx + r * angle.sin(), cy - r * angle.cos());
    }
    points
}

/// Centers of a brick-offset polka dot grid.
///
/// Spacing is three times the dot radius. Columns run `x = 0, s, 2s, …`
/// while `x < w + s`; odd columns start `s / 2` lower. Rows run while
/// `y < h + s`.
pub fn polka_dot_centers(width: u32, height: u32, radius: u32) -> Vec<(u32, u32)> {
    let spacing = (radius * 3).max(1);
    let mut centers = Vec::new();
    for (col, x) in (0..width + spacing).step_by(spacing as usize).enumerate() {
        let offset = if col % 2 == 0 { 0 } else { spacing / 2 };
        for y in (offset..height + spacing).step_by(spacing as usize) {
            centers.push((x, y));
        }
    }
    centers
}

/// One vertical stripe bar on the square stripe canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripeBar {
    /// Left edge of the bar (may be negative).
    pub x: i64,
    /// Bar width: half the stripe period.
    pub width: u32,
    /// Index into the stripe palette.
    pub color_index: usize,
}

/// Stripe bars for a square of side `side`: one bar every `period` px from
/// `-side` up to `side`, colors cycling through `palette_len` entries.
pub fn stripe_bars(side: u32, period: u32, palette_len: usize) -> Vec<StripeBar> {
    let period = period.max(1) as i64;
    let side = side as i64;
    let len = palette_len.max(1) as i64;
    (-side..side)
        .step_by(period as usize)
        .map(|x| StripeBar {
            x,
            width: (period / 2) as u32,
            color_index: x.div_euclid(period).rem_euclid(len) as usize,
        })
        .collect()
}

/// Luma of an RGB pixel: `(299R + 587G + 114B) / 1000`.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Blend a channel away from `degenerate` by `factor`.
///
/// `degenerate + factor × (value − degenerate)`, clamped to 0–255 and
/// truncated. Brightness uses black as the degenerate value; contrast uses
/// the mean luma.
pub fn enhance_channel(value: u8, degenerate: u8, factor: f32) -> u8 {
    let v = degenerate as f32 + factor * (value as f32 - degenerate as f32);
    v.clamp(0.0, 255.0) as u8
}

/// Total height of a caption block: line heights plus `spacing` between
/// lines (not after the last).
pub fn block_height(line_heights: &[f32], spacing: f32) -> f32 {
    if line_heights.is_empty() {
        return 0.0;
    }
    line_heights.iter().sum::<f32>() + spacing * (line_heights.len() - 1) as f32
}

/// Top-left of a caption block on the canvas.
///
/// `x = ⌊(W − block_width) / 2⌋`; `y` is `top_margin` for top,
/// `H − block − bottom_margin` for bottom and `⌊(H − block) / 2⌋` otherwise.
pub fn caption_origin(
    canvas: (u32, u32),
    block_width: f32,
    block: f32,
    anchor: Anchor,
    top_margin: u32,
    bottom_margin: u32,
) -> (f32, f32) {
    let (w, h) = (canvas.0 as f32, canvas.1 as f32);
    let x = ((w - block_width) / 2.0).floor();
    let y = match anchor {
        Anchor::Top => top_margin as f32,
        Anchor::Bottom => h - block - bottom_margin as f32,
        _ => ((h - block) / 2.0).floor(),
    };
    (x, y)
}

/// Card rectangle `(left, top, right, bottom)` around a caption block.
///
/// The block is padded by `padding` on every side and then clamped to stay
/// at least `margin` px away from each canvas edge.
pub fn card_rect(
    origin: (f32, f32),
    block: (f32, f32),
    padding: u32,
    margin: u32,
    canvas: (u32, u32),
) -> (f32, f32, f32, f32) {
    let (x, y) = origin;
    let (bw, bh) = block;
    let (p, m) = (padding as f32, margin as f32);
    let left = (x - p).max(m);
    let top = (y - p).max(m);
    let right = (x + bw + p).min(canvas.0 as f32 - m);
    let bottom = (y + bh + p).min(canvas.1 as f32 - m);
    (left, top, right, bottom)
}
