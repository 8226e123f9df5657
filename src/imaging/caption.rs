//! Caption cards: word-wrapped text on a rounded, semi-transparent card.
//!
//! Layout is computed first ([`layout_caption`]) and drawn second
//! ([`draw_caption`]), so tests can check geometry against a fixed-width
//! [`Typeface`] without rasterizing glyphs.

use resvg::tiny_skia::{FillRule, Paint, Path, PathBuilder, Stroke, Transform};

use super::calculations::{block_height, caption_origin, card_rect};
use super::canvas::{Canvas, CanvasError};
use super::font::Typeface;
use super::params::Anchor;
use crate::config::{CaptionStyle, Rgba};

/// Where every piece of a caption goes.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLayout {
    pub lines: Vec<String>,
    pub line_heights: Vec<f32>,
    pub line_widths: Vec<f32>,
    /// Top-left of the text block.
    pub origin: (f32, f32),
    /// Width of the text block (the wrap limit).
    pub block_width: f32,
    pub block_height: f32,
    /// Gap between consecutive lines.
    pub spacing: f32,
    /// Card as `(left, top, right, bottom)`.
    pub card: (f32, f32, f32, f32),
}

/// Greedy word wrap.
///
/// A line keeps taking words while `line + " " + word` measures at most
/// `max_width`. A single word wider than the limit gets a line of its own.
pub fn wrap_text(text: &str, font: &dyn Typeface, size: f32, max_width: f32) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    for word in words {
        let candidate = format!("{current} {word}");
        if font.measure(&candidate, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    lines.push(current);
    lines
}

/// Cut `text` to its first `limit` characters and append `...` when longer.
pub fn truncate_text(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Compute the caption layout, or `None` for empty / whitespace-only text.
///
/// `Left` and `Right` anchors are treated as `Center`.
pub fn layout_caption(
    canvas: (u32, u32),
    text: &str,
    anchor: Anchor,
    size: u32,
    style: &CaptionStyle,
    font: &dyn Typeface,
) -> Option<CaptionLayout> {
    let size_px = size as f32;
    let block_width = canvas.0 as f32 * style.max_width_ratio as f32;
    let lines = wrap_text(text, font, size_px, block_width);
    if lines.is_empty() {
        return None;
    }

    let line_heights: Vec<f32> = lines.iter().map(|_| font.line_height(size_px)).collect();
    let line_widths: Vec<f32> = lines.iter().map(|l| font.measure(l, size_px)).collect();
    let spacing = size_px * style.line_spacing as f32;
    let height = block_height(&line_heights, spacing);

    let origin = caption_origin(
        canvas,
        block_width,
        height,
        anchor,
        style.top_margin,
        style.bottom_margin,
    );
    let card = card_rect(
        origin,
        (block_width, height),
        style.padding,
        style.edge_margin,
        canvas,
    );

    Some(CaptionLayout {
        lines,
        line_heights,
        line_widths,
        origin,
        block_width,
        block_height: height,
        spacing,
        card,
    })
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Rounded rectangle path; the radius shrinks to fit small cards.
fn rounded_rect(rect: (f32, f32, f32, f32), radius: f32) -> Option<Path> {
    let (l, t, r, b) = rect;
    if r <= l || b <= t {
        return None;
    }
    let rad = radius.min((r - l) / 2.0).min((b - t) / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(l + rad, t);
    pb.line_to(r - rad, t);
    pb.quad_to(r, t, r, t + rad);
    pb.line_to(r, b - rad);
    pb.quad_to(r, b, r - rad, b);
    pb.line_to(l + rad, b);
    pb.quad_to(l, b, l, b - rad);
    pb.line_to(l, t + rad);
    pb.quad_to(l, t, l + rad, t);
    pb.close();
    pb.finish()
}

/// Draw a caption card and its text onto the canvas.
///
/// Returns the layout that was drawn, or `None` (canvas untouched) for
/// empty text.
pub fn draw_caption(
    canvas: &mut Canvas,
    text: &str,
    anchor: Anchor,
    size: u32,
    style: &CaptionStyle,
    font: &dyn Typeface,
) -> Result<Option<CaptionLayout>, CanvasError> {
    let Some(layout) = layout_caption(canvas.dimensions(), text, anchor, size, style, font) else {
        return Ok(None);
    };

    canvas.draw(|pixmap| {
        if let Some(card) = rounded_rect(layout.card, style.corner_radius as f32) {
            pixmap.fill_path(
                &card,
                &paint_for(style.card_color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
            if style.border_width > 0 {
                let stroke = Stroke {
                    width: style.border_width as f32,
                    ..Stroke::default()
                };
                pixmap.stroke_path(
                    &card,
                    &paint_for(style.border_color),
                    &stroke,
                    Transform::identity(),
                    None,
                );
            }
        }

        let (x, mut y) = layout.origin;
        for ((line, width), height) in layout
            .lines
            .iter()
            .zip(&layout.line_widths)
            .zip(&layout.line_heights)
        {
            let line_x = x + ((layout.block_width - width) / 2.0).floor();
            font.draw(pixmap, line, line_x, y, size as f32, style.text_color);
            y += height + layout.spacing;
        }
    })?;

    tracing::trace!(lines = layout.lines.len(), ?anchor, "caption drawn");
    Ok(Some(layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::bitmap_font::BitmapFont;
    use crate::imaging::font::tests::FixedWidth;

    const STORY: &str = "Once upon a time there was a little girl called Goldilocks who \
                         went for a walk in the forest and found a house";

    // =========================================================================
    // wrap_text tests
    // =========================================================================

    #[test]
    fn wrap_respects_max_width() {
        // 40px font → 20px per char; 640px → 32 chars per line at most
        let lines = wrap_text(STORY, &FixedWidth, 40.0, 640.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(FixedWidth.measure(line, 40.0) <= 640.0, "too wide: {line:?}");
        }
        assert_eq!(lines.join(" "), STORY.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn wrap_long_word_gets_own_line() {
        let long = "a".repeat(50);
        let text = format!("tiny {long} end");
        let lines = wrap_text(&text, &FixedWidth, 40.0, 640.0);
        assert_eq!(lines, vec!["tiny".to_string(), long, "end".to_string()]);
    }

    #[test]
    fn wrap_only_single_words_exceed_limit() {
        let text = "supercalifragilisticexpialidocious is a very long word indeed";
        for line in wrap_text(text, &FixedWidth, 40.0, 400.0) {
            if FixedWidth.measure(&line, 40.0) > 400.0 {
                assert!(!line.contains(' '), "multi-word line exceeds: {line:?}");
            }
        }
    }

    #[test]
    fn wrap_collapses_whitespace() {
        let lines = wrap_text("  a \t b\n c ", &FixedWidth, 10.0, 1000.0);
        assert_eq!(lines, vec!["a b c".to_string()]);
    }

    #[test]
    fn wrap_empty_is_empty() {
        assert!(wrap_text("   ", &FixedWidth, 40.0, 640.0).is_empty());
    }

    // =========================================================================
    // truncate_text tests
    // =========================================================================

    #[test]
    fn truncate_long_text() {
        let text = "x".repeat(130);
        let out = truncate_text(&text, 120);
        assert_eq!(out.len(), 123);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..120], &text[..120]);
    }

    #[test]
    fn truncate_exact_limit_unchanged() {
        let text = "y".repeat(120);
        assert_eq!(truncate_text(&text, 120), text);
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let text = "é".repeat(5);
        assert_eq!(truncate_text(&text, 3), "ééé...");
    }

    // =========================================================================
    // layout tests
    // =========================================================================

    #[test]
    fn layout_top_anchor() {
        let style = CaptionStyle::default();
        let layout =
            layout_caption((600, 400), "Goldilocks", Anchor::Top, 65, &style, &FixedWidth)
                .unwrap();
        assert_eq!(layout.lines, vec!["Goldilocks".to_string()]);
        assert_eq!(layout.origin, (60.0, 40.0));
        assert_eq!(layout.block_height, 65.0);
        // 40 + 65 + 25 padding = 130
        assert_eq!(layout.card, (35.0, 15.0, 565.0, 130.0));
    }

    #[test]
    fn layout_bottom_anchor() {
        let style = CaptionStyle::default();
        let layout =
            layout_caption((800, 500), "The end", Anchor::Bottom, 40, &style, &FixedWidth)
                .unwrap();
        // 500 - 40 - 80
        assert_eq!(layout.origin.1, 380.0);
    }

    #[test]
    fn layout_multiline_height_includes_spacing() {
        let style = CaptionStyle::default();
        let layout =
            layout_caption((800, 500), STORY, Anchor::Center, 40, &style, &FixedWidth).unwrap();
        let n = layout.lines.len() as f32;
        let expected = n * 40.0 + (n - 1.0) * 12.0;
        assert!((layout.block_height - expected).abs() < 1e-3);
    }

    #[test]
    fn layout_card_stays_inside_margin() {
        let style = CaptionStyle::default();
        let text = "word ".repeat(60);
        let layout =
            layout_caption((600, 400), &text, Anchor::Center, 40, &style, &FixedWidth).unwrap();
        let (l, t, r, b) = layout.card;
        assert!(l >= 10.0 && t >= 10.0);
        assert!(r <= 590.0 && b <= 390.0);
    }

    #[test]
    fn layout_empty_text_is_none() {
        let style = CaptionStyle::default();
        assert!(layout_caption((600, 400), " \n ", Anchor::Top, 40, &style, &FixedWidth).is_none());
    }

    // =========================================================================
    // draw tests
    // =========================================================================

    #[test]
    fn draw_empty_leaves_canvas_untouched() {
        let mut canvas = Canvas::filled(100, 80, [10, 20, 30]);
        let before = canvas.clone();
        let drawn =
            draw_caption(&mut canvas, "", Anchor::Top, 20, &CaptionStyle::default(), &FixedWidth)
                .unwrap();
        assert!(drawn.is_none());
        assert_eq!(canvas, before);
    }

    #[test]
    fn draw_paints_card_inside_its_rect_only() {
        let style = CaptionStyle::default();
        let mut canvas = Canvas::filled(600, 400, [0, 0, 0]);
        let layout = draw_caption(&mut canvas, "Hello", Anchor::Top, 65, &style, &FixedWidth)
            .unwrap()
            .unwrap();

        let (l, t, r, b) = layout.card;
        let (cx, cy) = (((l + r) / 2.0) as u32, ((t + b) / 2.0) as u32);
        // White at alpha 220 over black
        let [red, ..] = canvas.pixel(cx, cy);
        assert!(red > 200, "card center is {red}");
        // Well below the card nothing changed
        assert_eq!(canvas.pixel(300, 300), [0, 0, 0, 255]);
    }

    #[test]
    fn draw_with_bitmap_font_inks_text() {
        let style = CaptionStyle {
            card_color: [255, 255, 255, 255],
            ..CaptionStyle::default()
        };
        let mut canvas = Canvas::filled(600, 400, [255, 255, 255]);
        draw_caption(&mut canvas, "HELLO", Anchor::Top, 40, &style, &BitmapFont).unwrap();
        let dark = canvas
            .as_image()
            .pixels()
            .filter(|p| p.0[0] < 50 && p.0[1] < 50 && p.0[2] < 50)
            .count();
        assert!(dark > 0);
    }
}
