//! Background synthesis.
//!
//! A background is a pastel base color plus one of five decorative patterns,
//! brightened ×1.1 and contrast-boosted ×1.05 at the end. Synthesis is split
//! in two:
//!
//! - [`choose_background`] draws every random number from the caller's RNG
//!   and returns a [`BackgroundSpec`].
//! - [`render_background`] turns a spec into pixels and is deterministic.
//!
//! Semi-transparent shapes are alpha-blended over what is already drawn.

use rand::Rng;
use rand::seq::SliceRandom;
use resvg::tiny_skia::{
    FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};

use super::calculations::{lerp_channel, polka_dot_centers, star_points, stripe_bars};
use super::canvas::Canvas;
use super::params::{BackgroundSpec, Circle, GradientDirection, PatternSpec, Star};
use crate::config::{Palette, Rgb, Rgba};

pub const BRIGHTNESS: f32 = 1.1;
pub const CONTRAST: f32 = 1.05;

const CIRCLE_COUNT: usize = 15;
const STAR_COUNT: usize = 20;

fn pick<T: Copy>(rng: &mut impl Rng, items: &[T], fallback: T) -> T {
    items.choose(rng).copied().unwrap_or(fallback)
}

/// Draw all random choices for one background.
pub fn choose_background(
    width: u32,
    height: u32,
    palette: &Palette,
    rng: &mut impl Rng,
) -> BackgroundSpec {
    const WHITE: Rgb = [255, 255, 255];
    const CLEAR: Rgba = [255, 255, 255, 0];

    let base = pick(rng, &palette.backgrounds, WHITE);
    let (w, h) = (width as i32, height as i32);

    let pattern = match rng.gen_range(0..5) {
        0 => PatternSpec::Circles(
            (0..CIRCLE_COUNT)
                .map(|_| Circle {
                    x: rng.gen_range(-50..=w + 50),
                    y: rng.gen_range(-50..=h + 50),
                    radius: rng.gen_range(40..=120),
                    color: [
                        rng.gen_range(180..=255),
                        rng.gen_range(180..=255),
                        rng.gen_range(180..=255),
                        rng.gen_range(30..=90),
                    ],
                })
                .collect(),
        ),
        1 => PatternSpec::Stars(
            (0..STAR_COUNT)
                .map(|_| Star {
                    x: rng.gen_range(0..=width),
                    y: rng.gen_range(0..=height),
                    size: rng.gen_range(15..=50),
                    color: pick(rng, &palette.stars, CLEAR),
                })
                .collect(),
        ),
        2 => {
            let radius = rng.gen_range(8..=15);
            let count = polka_dot_centers(width, height, radius).len();
            PatternSpec::PolkaDots {
                radius,
                colors: (0..count).map(|_| pick(rng, &palette.dots, CLEAR)).collect(),
            }
        }
        3 => {
            let direction = match rng.gen_range(0..3) {
                0 => GradientDirection::Horizontal,
                1 => GradientDirection::Vertical,
                _ => GradientDirection::Diagonal,
            };
            PatternSpec::Gradient {
                direction,
                from: pick(rng, &palette.backgrounds, WHITE),
                to: pick(rng, &palette.backgrounds, WHITE),
            }
        }
        _ => PatternSpec::Stripes {
            period: rng.gen_range(20..=40),
            angle: pick(rng, &[0, 45, 90, 135], 0),
            palette: palette.stripes.clone(),
        },
    };

    BackgroundSpec { base, pattern }
}

/// Render a chosen background, including the final enhancement.
pub fn render_background(width: u32, height: u32, spec: &BackgroundSpec) -> Canvas {
    let mut canvas = Canvas::filled(width, height, spec.base);

    match &spec.pattern {
        PatternSpec::Gradient {
            direction,
            from,
            to,
        } => paint_gradient(&mut canvas, *direction, *from, *to),
        pattern => {
            let drawn = canvas.draw(|pixmap| match pattern {
                PatternSpec::Circles(circles) => {
                    for c in circles {
                        fill_circle(pixmap, c.x as f32, c.y as f32, c.radius as f32, c.color);
                    }
                }
                PatternSpec::Stars(stars) => {
                    for s in stars {
                        fill_star(pixmap, s);
                    }
                }
                PatternSpec::PolkaDots { radius, colors } => {
                    let centers = polka_dot_centers(width, height, *radius);
                    for ((x, y), color) in centers.into_iter().zip(colors) {
                        fill_circle(pixmap, x as f32, y as f32, *radius as f32, *color);
                    }
                }
                PatternSpec::Stripes {
                    period,
                    angle,
                    palette,
                } => draw_stripes(pixmap, *period, *angle, palette),
                PatternSpec::Gradient { .. } => {}
            });
            if let Err(e) = drawn {
                tracing::warn!(pattern = spec.pattern.kind(), error = %e, "pattern not drawn");
            }
        }
    }

    canvas.enhance(BRIGHTNESS, CONTRAST);
    canvas
}

/// Choose and render a background in one step.
pub fn synthesize_background(
    width: u32,
    height: u32,
    palette: &Palette,
    rng: &mut impl Rng,
) -> Canvas {
    let spec = choose_background(width, height, palette, rng);
    tracing::trace!(pattern = spec.pattern.kind(), base = ?spec.base, "background chosen");
    render_background(width, height, &spec)
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn fill_circle(pixmap: &mut Pixmap, x: f32, y: f32, radius: f32, color: Rgba) {
    if let Some(path) = PathBuilder::from_circle(x, y, radius) {
        pixmap.fill_path(
            &path,
            &paint_for(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn fill_star(pixmap: &mut Pixmap, star: &Star) {
    let points = star_points(star.x as f32, star.y as f32, star.size);
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].0, points[0].1);
    for &(x, y) in &points[1..] {
        pb.line_to(x, y);
    }
    pb.close();
    if let Some(path) = pb.finish() {
        pixmap.fill_path(
            &path,
            &paint_for(star.color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn paint_gradient(canvas: &mut Canvas, direction: GradientDirection, from: Rgb, to: Rgb) {
    let (w, h) = canvas.dimensions();
    let mix = |num: u32, den: u32| -> Rgb {
        [
            lerp_channel(from[0], to[0], num, den),
            lerp_channel(from[1], to[1], num, den),
            lerp_channel(from[2], to[2], num, den),
        ]
    };
    match direction {
        GradientDirection::Horizontal => canvas.fill_with(|x, _| mix(x, w)),
        GradientDirection::Vertical => canvas.fill_with(|_, y| mix(y, h)),
        GradientDirection::Diagonal => canvas.fill_with(|x, y| mix(x + y, w + h)),
    }
}

/// Vertical bars on a square of side `2·max(w, h)`, rotated about its center
/// and composited so the square's center lands on the canvas center.
fn draw_stripes(pixmap: &mut Pixmap, period: u32, angle: u32, palette: &[Rgba]) {
    if palette.is_empty() {
        return;
    }
    let (w, h) = (pixmap.width(), pixmap.height());
    let side = w.max(h) * 2;
    let Some(mut layer) = Pixmap::new(side, side) else {
        return;
    };

    for bar in stripe_bars(side, period, palette.len()) {
        let left = bar.x.max(0) as f32;
        let right = (bar.x + bar.width as i64).min(side as i64) as f32;
        if right <= left {
            continue;
        }
        if let Some(rect) = Rect::from_ltrb(left, 0.0, right, side as f32) {
            layer.fill_rect(
                rect,
                &paint_for(palette[bar.color_index]),
                Transform::identity(),
                None,
            );
        }
    }

    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let half = side as f32 / 2.0;
    // Counter-clockwise on screen is a negative angle in a y-down space.
    let transform =
        Transform::from_rotate_at(-(angle as f32), cx, cy).pre_translate(cx - half, cy - half);
    pixmap.draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &PixmapPaint::default(),
        transform,
        None,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn palette() -> Palette {
        Palette::default()
    }

    #[test]
    fn same_seed_same_pixels() {
        let a = synthesize_background(120, 80, &palette(), &mut StdRng::seed_from_u64(7));
        let b = synthesize_background(120, 80, &palette(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn every_seed_gives_opaque_canvas_of_requested_size() {
        for seed in 0..25 {
            let canvas = synthesize_background(64, 48, &palette(), &mut StdRng::seed_from_u64(seed));
            assert_eq!(canvas.dimensions(), (64, 48));
            assert!(
                canvas.as_image().pixels().all(|p| p.0[3] == 255),
                "seed {seed} produced transparency"
            );
        }
    }

    #[test]
    fn choose_covers_all_pattern_kinds() {
        let mut kinds = std::collections::HashSet::new();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            kinds.insert(choose_background(50, 50, &palette(), &mut rng).pattern.kind());
        }
        assert_eq!(kinds.len(), 5, "saw only {kinds:?}");
    }

    #[test]
    fn choose_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let spec = choose_background(200, 100, &palette(), &mut rng);
            assert!(palette().backgrounds.contains(&spec.base));
            match spec.pattern {
                PatternSpec::Circles(circles) => {
                    assert_eq!(circles.len(), 15);
                    for c in circles {
                        assert!((-50..=250).contains(&c.x));
                        assert!((-50..=150).contains(&c.y));
                        assert!((40..=120).contains(&c.radius));
                        assert!((30..=90).contains(&c.color[3]));
                        assert!(c.color[..3].iter().all(|&v| v >= 180));
                    }
                }
                PatternSpec::Stars(stars) => {
                    assert_eq!(stars.len(), 20);
                    for s in stars {
                        assert!(s.x <= 200 && s.y <= 100);
                        assert!((15..=50).contains(&s.size));
                        assert!(palette().stars.contains(&s.color));
                    }
                }
                PatternSpec::PolkaDots { radius, colors } => {
                    assert!((8..=15).contains(&radius));
                    assert_eq!(colors.len(), polka_dot_centers(200, 100, radius).len());
                }
                PatternSpec::Gradient { from, to, .. } => {
                    assert!(palette().backgrounds.contains(&from));
                    assert!(palette().backgrounds.contains(&to));
                }
                PatternSpec::Stripes { period, angle, .. } => {
                    assert!((20..=40).contains(&period));
                    assert!([0, 45, 90, 135].contains(&angle));
                }
            }
        }
    }

    #[test]
    fn horizontal_gradient_runs_left_to_right() {
        let spec = BackgroundSpec {
            base: [0, 0, 0],
            pattern: PatternSpec::Gradient {
                direction: GradientDirection::Horizontal,
                from: [0, 0, 0],
                to: [200, 200, 200],
            },
        };
        let canvas = render_background(100, 10, &spec);
        let left = canvas.pixel(0, 5)[0];
        let right = canvas.pixel(99, 5)[0];
        assert!(left < right, "left {left} right {right}");
        // Columns are uniform
        assert_eq!(canvas.pixel(50, 0), canvas.pixel(50, 9));
    }

    #[test]
    fn vertical_gradient_rows_uniform() {
        let spec = BackgroundSpec {
            base: [0, 0, 0],
            pattern: PatternSpec::Gradient {
                direction: GradientDirection::Vertical,
                from: [255, 223, 186],
                to: [200, 230, 255],
            },
        };
        let canvas = render_background(30, 30, &spec);
        assert_eq!(canvas.pixel(0, 12), canvas.pixel(29, 12));
    }

    #[test]
    fn stripes_change_canvas() {
        let spec = BackgroundSpec {
            base: [100, 100, 100],
            pattern: PatternSpec::Stripes {
                period: 20,
                angle: 0,
                palette: vec![[255, 255, 255, 255]],
            },
        };
        let canvas = render_background(80, 40, &spec);
        let distinct: std::collections::HashSet<[u8; 4]> =
            canvas.as_image().pixels().map(|p| p.0).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn empty_circle_list_is_flat_base() {
        let spec = BackgroundSpec {
            base: [100, 100, 100],
            pattern: PatternSpec::Circles(vec![]),
        };
        let canvas = render_background(10, 10, &spec);
        // 100 × 1.1 = 110, uniform so contrast is a no-op
        assert_eq!(canvas.pixel(4, 4), [110, 110, 110, 255]);
    }
}
