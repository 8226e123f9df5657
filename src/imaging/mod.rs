//! Image synthesis and compositing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Shapes, cards, glyphs** | `tiny-skia` paths via `resvg` |
//! | **Asset decode / resize** | `image` (sniffed format, Lanczos3) |
//! | **SVG assets** | `usvg` + `resvg::render` |
//! | **Fonts** | `usvg::fontdb` discovery, `ttf-parser` metrics and outlines |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for layout and pattern geometry (unit testable)
//! - **Parameters**: Anchors, regions and pattern specs
//! - **Canvas**: The RGBA raster illustrations are built on
//! - **Pattern / Compositor / Caption**: The three drawing stages
//! - **Font / Bitmap font**: Caption typefaces
//! - **Backend**: [`OutputStore`] trait + [`FsStore`]

pub mod backend;
pub(crate) mod bitmap_font;
mod calculations;
pub mod canvas;
pub mod caption;
pub mod compositor;
pub mod font;
mod params;
pub mod pattern;

pub use backend::{FsStore, OutputStore, StoreError};
pub use calculations::{
    cover_zones, fit_limit, fit_within, horizontal_range, page_text_anchor, page_zones,
    place_in_region,
};
pub use canvas::{Canvas, CanvasError};
pub use caption::{CaptionLayout, draw_caption, layout_caption, truncate_text, wrap_text};
pub use compositor::{CompositeError, Placement, composite_asset, place_asset};
pub use font::{Typeface, resolve_typeface};
pub use params::{Anchor, BackgroundSpec, Circle, GradientDirection, PatternSpec, Region, Star};
pub use pattern::{choose_background, render_background, synthesize_background};
