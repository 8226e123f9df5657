//! Built-in 5×7 bitmap font, the last resort when no outline font resolves.
//!
//! Covers printable ASCII (`' '` through `'~'`). Each glyph is five column
//! bytes, bit 0 at the top. A glyph cell is 6×8 units (one unit of spacing
//! to the right and below), and a unit is `size / 8` px, so the line height
//! equals the requested font size.

use resvg::tiny_skia::{Paint, Pixmap, Rect, Transform};

use super::font::Typeface;
use crate::config::Rgba;

const FIRST: u8 = b' ';
const CELL_W: f32 = 6.0;
const CELL_H: f32 = 8.0;

#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x08, 0x14, 0x54, 0x54, 0x3C], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];

/// Column bytes for a character; anything outside printable ASCII draws as `?`.
fn glyph(c: char) -> &'static [u8; 5] {
    let idx = match u8::try_from(c) {
        Ok(b) if (FIRST..=b'~').contains(&b) => b - FIRST,
        _ => b'?' - FIRST,
    };
    &GLYPHS[idx as usize]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl Typeface for BitmapFont {
    fn name(&self) -> &str {
        "built-in 5x7"
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * CELL_W * size / CELL_H
    }

    fn line_height(&self, size: f32) -> f32 {
        size
    }

    fn draw(&self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, color: Rgba) {
        let unit = size / CELL_H;
        let [r, g, b, a] = color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);

        for (i, c) in text.chars().enumerate() {
            let left = x + i as f32 * CELL_W * unit;
            for (col, bits) in glyph(c).iter().enumerate() {
                for row in 0..7 {
                    if bits & (1 << row) == 0 {
                        continue;
                    }
                    let px = left + col as f32 * unit;
                    let py = y + row as f32 * unit;
                    if let Some(rect) = Rect::from_xywh(px, py, unit, unit) {
                        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_printable_ascii() {
        assert_eq!(GLYPHS.len(), (b'~' - b' ' + 1) as usize);
    }

    #[test]
    fn space_is_blank() {
        assert!(glyph(' ').iter().all(|&b| b == 0));
    }

    #[test]
    fn non_ascii_draws_question_mark() {
        assert_eq!(glyph('é'), glyph('?'));
    }

    #[test]
    fn measure_scales_with_size_and_length() {
        let font = BitmapFont;
        assert_eq!(font.measure("abcd", 8.0), 24.0);
        assert_eq!(font.measure("ab", 40.0), 60.0);
        assert_eq!(font.line_height(40.0), 40.0);
    }

    #[test]
    fn draw_marks_pixels_inside_measured_box() {
        let font = BitmapFont;
        let mut pixmap = Pixmap::new(40, 20).unwrap();
        font.draw(&mut pixmap, "Hi", 2.0, 2.0, 16.0, [0, 0, 0, 255]);

        let width = font.measure("Hi", 16.0);
        let mut inked = 0;
        for (i, px) in pixmap.pixels().iter().enumerate() {
            if px.alpha() > 0 {
                inked += 1;
                let (x, y) = ((i % 40) as f32, (i / 40) as f32);
                assert!(x >= 2.0 && x < 2.0 + width, "ink at x={x}");
                assert!(y >= 2.0 && y < 2.0 + 16.0, "ink at y={y}");
            }
        }
        assert!(inked > 0);
    }
}
