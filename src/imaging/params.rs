//! Parameter types for drawing operations.
//!
//! These structs describe *what* to draw, not *how*. Random choices are made
//! once into a [`BackgroundSpec`] and the renderer only reads it, so tests can
//! hand the renderer a fixed spec and the batch can log or reproduce one.
//!
//! ## Types
//!
//! - [`Anchor`]: Placement of an asset or caption inside a region.
//! - [`Region`]: Rectangle on the canvas (a layout zone).
//! - [`BackgroundSpec`] / [`PatternSpec`]: Base color plus one decorative pattern.

use crate::config::{Rgb, Rgba};

/// Placement inside a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::Center,
        Anchor::Left,
        Anchor::Right,
        Anchor::Top,
        Anchor::Bottom,
    ];
}

/// Axis-aligned rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole canvas as a region.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// A filled circle of the `circles` pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub radius: u32,
    pub color: Rgba,
}

/// A five-pointed star of the `stars` pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: u32,
    pub y: u32,
    /// Outer radius; the inner radius is half of it.
    pub size: u32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    Horizontal,
    Vertical,
    /// Top-left to bottom-right, banded along anti-diagonals.
    Diagonal,
}

/// One decorative pattern with all of its random choices made.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternSpec {
    Circles(Vec<Circle>),
    Stars(Vec<Star>),
    PolkaDots {
        radius: u32,
        /// One color per grid center, in grid order.
        colors: Vec<Rgba>,
    },
    Gradient {
        direction: GradientDirection,
        from: Rgb,
        to: Rgb,
    },
    Stripes {
        /// Stripe period in px; each bar is half of it.
        period: u32,
        /// Rotation in degrees, counter-clockwise.
        angle: u32,
        palette: Vec<Rgba>,
    },
}

impl PatternSpec {
    /// Short pattern name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PatternSpec::Circles(_) => "circles",
            PatternSpec::Stars(_) => "stars",
            PatternSpec::PolkaDots { .. } => "polka_dots",
            PatternSpec::Gradient { .. } => "gradient",
            PatternSpec::Stripes { .. } => "stripes",
        }
    }
}

/// A fully chosen background: base color plus pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSpec {
    pub base: Rgb,
    pub pattern: PatternSpec,
}
