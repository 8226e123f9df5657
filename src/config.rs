//! Studio configuration.
//!
//! Everything that used to be a process-wide constant in the asset scripts
//! (canvas sizes, palettes, caption styling, the story theme table, prompt
//! style tables) is a value here and gets passed to the component that needs
//! it.
//!
//! ## Loading
//!
//! Configuration lives in a single `picturebook.toml`. The file is sparse:
//! stock defaults are serialized to a TOML table, the user file is merged on
//! top of it key by key ([`merge_toml`]), and the result is deserialized and
//! validated. A missing file means "all defaults".
//!
//! ```toml
//! # Only make covers wider and add a theme for a new story
//! [canvas]
//! cover = [720, 400]
//!
//! [themes.stories]
//! owl-babies = ["owl", "tree", "moon"]
//! ```
//!
//! Unknown keys are rejected to catch typos early. Run `picturebook
//! gen-config` for a fully commented stock file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// An RGB color as `[r, g, b]`.
pub type Rgb = [u8; 3];
/// An RGBA color as `[r, g, b, a]`.
pub type Rgba = [u8; 4];

/// Complete tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Output canvas sizes for covers and pages.
    pub canvas: CanvasConfig,
    /// Zone splits and asset fit fractions for the two recipes.
    pub layout: LayoutConfig,
    /// Caption card and text styling.
    pub caption: CaptionStyle,
    /// Caption font candidates.
    pub fonts: FontConfig,
    /// Background and pattern colors.
    pub palette: Palette,
    /// Story id → theme keywords used to pick foreground assets.
    pub themes: ThemeConfig,
    /// Prompt sheet wording.
    pub prompts: PromptConfig,
    /// Sprite optimizer and icon settings.
    pub sprites: SpriteConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Validation(msg.to_string()));

        for (name, [w, h]) in [("cover", self.canvas.cover), ("page", self.canvas.page)] {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation(format!(
                    "canvas.{name} dimensions must be non-zero"
                )));
            }
        }
        let unit = |v: f64| v > 0.0 && v < 1.0;
        if !unit(self.layout.cover_title_ratio) || !unit(self.layout.page_text_ratio) {
            return fail("layout zone ratios must be between 0 and 1 (exclusive)");
        }
        let fraction = |v: f64| v > 0.0 && v <= 1.0;
        if !fraction(self.layout.cover_asset_fraction) || !fraction(self.layout.page_asset_fraction)
        {
            return fail("layout asset fractions must be in (0, 1]");
        }
        if self.layout.page_text_limit == 0 {
            return fail("layout.page_text_limit must be non-zero");
        }
        if self.caption.title_font_size == 0 || self.caption.page_font_size == 0 {
            return fail("caption font sizes must be non-zero");
        }
        if !fraction(self.caption.max_width_ratio) {
            return fail("caption.max_width_ratio must be in (0, 1]");
        }
        if self.caption.line_spacing < 0.0 {
            return fail("caption.line_spacing must not be negative");
        }
        if self.palette.backgrounds.is_empty()
            || self.palette.stars.is_empty()
            || self.palette.dots.is_empty()
            || self.palette.stripes.is_empty()
        {
            return fail("palette color lists must not be empty");
        }
        if self.themes.default.is_empty() {
            return fail("themes.default must list at least one keyword");
        }
        if let Some((id, _)) = self.themes.stories.iter().find(|(_, k)| k.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "themes.stories.{id} must list at least one keyword"
            )));
        }
        if self.sprites.size == 0 {
            return fail("sprites.size must be non-zero");
        }
        if self.sprites.ico_sizes.is_empty()
            || self.sprites.ico_sizes.iter().any(|&s| s == 0 || s > 256)
        {
            return fail("sprites.ico_sizes must be non-empty and each within 1-256");
        }
        Ok(())
    }
}

/// Canvas dimensions as `[width, height]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub cover: [u32; 2],
    pub page: [u32; 2],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            cover: [600, 400],
            page: [800, 500],
        }
    }
}

/// Zone splits for the cover and page recipes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Share of the cover height reserved for the title (top band).
    pub cover_title_ratio: f64,
    /// Asset size as a fraction of the cover asset zone's limiting dimension.
    pub cover_asset_fraction: f64,
    /// Share of the page height reserved for the text band.
    pub page_text_ratio: f64,
    /// Asset size as a fraction of the page asset zone's limiting dimension.
    pub page_asset_fraction: f64,
    /// Minimum horizontal distance between a page asset and the canvas edge.
    pub page_asset_margin: u32,
    /// Page text longer than this many characters is cut and gets `...`.
    pub page_text_limit: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cover_title_ratio: 0.25,
            cover_asset_fraction: 0.8,
            page_text_ratio: 0.35,
            page_asset_fraction: 0.75,
            page_asset_margin: 50,
            page_text_limit: 120,
        }
    }
}

/// Caption card and text styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionStyle {
    pub title_font_size: u32,
    pub page_font_size: u32,
    /// Wrap width as a fraction of the canvas width.
    pub max_width_ratio: f64,
    /// Gap between lines as a fraction of the font size.
    pub line_spacing: f64,
    /// Distance from the top edge for top-anchored captions.
    pub top_margin: u32,
    /// Distance from the bottom edge for bottom-anchored captions.
    pub bottom_margin: u32,
    /// Card padding around the text block.
    pub padding: u32,
    /// Minimum distance between the card and the canvas edges.
    pub edge_margin: u32,
    pub corner_radius: u32,
    pub border_width: u32,
    pub card_color: Rgba,
    pub border_color: Rgba,
    pub text_color: Rgba,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            title_font_size: 65,
            page_font_size: 40,
            max_width_ratio: 0.8,
            line_spacing: 0.3,
            top_margin: 40,
            bottom_margin: 80,
            padding: 25,
            edge_margin: 10,
            corner_radius: 20,
            border_width: 2,
            card_color: [255, 255, 255, 220],
            border_color: [0, 153, 204, 255],
            text_color: [0, 0, 0, 255],
        }
    }
}

/// Caption font candidates, tried in order.
///
/// An entry containing a path separator or ending in `.ttf`/`.otf` is read
/// as a font file; anything else is looked up as a family name in the
/// system font database. After the list, the generic sans-serif family and
/// finally the built-in bitmap font are used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    pub candidates: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                "Comic Sans MS".to_string(),
                "Arial".to_string(),
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            ],
        }
    }
}

/// Background and pattern colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    /// Pastel base colors; also the gradient endpoints.
    pub backgrounds: Vec<Rgb>,
    pub stars: Vec<Rgba>,
    pub dots: Vec<Rgba>,
    pub stripes: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            backgrounds: vec![
                [255, 223, 186], // peach
                [200, 230, 255], // light blue
                [255, 200, 200], // light pink
                [200, 255, 200], // light green
                [230, 230, 255], // lavender
                [255, 255, 200], // light yellow
                [200, 255, 230], // mint
            ],
            stars: vec![
                [255, 223, 0, 100],
                [255, 120, 180, 100],
                [100, 200, 255, 100],
                [180, 255, 140, 100],
            ],
            dots: vec![
                [255, 255, 255, 120],
                [255, 220, 100, 120],
                [255, 150, 150, 120],
                [150, 220, 255, 120],
            ],
            stripes: vec![
                [255, 255, 255, 60],
                [255, 220, 100, 60],
                [150, 220, 255, 60],
                [255, 150, 150, 60],
            ],
        }
    }
}

/// Theme keywords per story.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Keywords for stories missing from `stories`.
    pub default: Vec<String>,
    pub stories: BTreeMap<String, Vec<String>>,
}

impl ThemeConfig {
    /// Ordered theme keywords for a story.
    pub fn keywords(&self, story_id: &str) -> &[String] {
        self.stories
            .get(story_id)
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let table: &[(&str, [&str; 3])] = &[
            ("red-riding-hood", ["forest", "girl", "wolf"]),
            ("three-little-pigs", ["pig", "wolf", "house"]),
            ("tortoise-and-hare", ["turtle", "rabbit", "race"]),
            ("gingerbread-man", ["cookie", "fox", "run"]),
            ("brown-bear", ["bear", "bird", "duck"]),
            ("five-little-monkeys", ["monkey", "bed", "doctor"]),
            ("hungry-caterpillar", ["butterfly", "fruit", "leaf"]),
            ("goldilocks", ["bear", "girl", "house"]),
            ("itsy-bitsy-spider", ["spider", "rain", "sun"]),
            ("three-billy-goats", ["goat", "bridge", "troll"]),
            ("ugly-duckling", ["duck", "swan", "pond"]),
            ("boy-who-cried-wolf", ["wolf", "sheep", "boy"]),
        ];
        Self {
            default: vec!["animal".to_string()],
            stories: table
                .iter()
                .map(|(id, words)| {
                    (
                        id.to_string(),
                        words.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Prompt sheet wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptConfig {
    /// Public URL prefix of story images in the web app.
    pub public_prefix: String,
    /// Base style when a story's category has no entry.
    pub default_style: String,
    /// Story category → base illustration style.
    pub category_styles: BTreeMap<String, String>,
    /// Recommended age (as a string key) → extra style elements.
    pub age_styles: BTreeMap<String, String>,
}

const STYLE_CUTE: &str =
    "cute, children's book illustration style, bright colors, simple shapes, friendly";
const STYLE_WATERCOLOR: &str =
    "watercolor illustration, soft edges, gentle colors, dreamy, children's book style";
const STYLE_CARTOON: &str =
    "cartoon style, vibrant colors, clean lines, friendly characters, appealing to children";
const STYLE_CLAYMATION: &str =
    "claymation style, 3D-like, textured, colorful, child-friendly, rounded shapes";

impl Default for PromptConfig {
    fn default() -> Self {
        let categories = [
            ("fairy-tale", STYLE_WATERCOLOR),
            ("fable", STYLE_CARTOON),
            ("animals", STYLE_CUTE),
            ("rhymes", STYLE_CLAYMATION),
        ];
        let ages = [
            (
                "3",
                "extra simple shapes, very bright primary colors, round friendly faces, ultra-safe for toddlers",
            ),
            (
                "4",
                "simple but more detailed, cheerful colors, friendly characters, safe for preschoolers",
            ),
            (
                "5",
                "moderate detail, balanced colors, approachable characters, kindergarten-appropriate",
            ),
            (
                "6",
                "more intricate details, varied color palette, engaging expressions, early elementary-appropriate",
            ),
        ];
        Self {
            public_prefix: "/images/stories".to_string(),
            default_style: STYLE_CARTOON.to_string(),
            category_styles: categories
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            age_styles: ages
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Sprite optimizer and icon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    /// Square edge length of optimized sprites.
    pub size: u32,
    /// Square sizes embedded in generated ICO files.
    pub ico_sizes: Vec<u32>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            size: 256,
            ico_sizes: vec![16, 32],
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(StudioConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path` on top of the stock defaults.
pub fn load_config(path: &Path) -> Result<StudioConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config overlay");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `picturebook.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# picturebook configuration
# =========================
# All settings are optional. Values shown are the defaults.
# Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Canvas sizes as [width, height]
# ---------------------------------------------------------------------------
[canvas]
cover = [600, 400]
page = [800, 500]

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Covers: the title takes the top band, the asset sits in the rest.
cover_title_ratio = 0.25
cover_asset_fraction = 0.8
# Pages: text band height; it alternates top (odd pages) / bottom (even).
page_text_ratio = 0.35
page_asset_fraction = 0.75
page_asset_margin = 50
# Longer page text is cut and gets "..."
page_text_limit = 120

# ---------------------------------------------------------------------------
# Caption card
# ---------------------------------------------------------------------------
[caption]
title_font_size = 65
page_font_size = 40
max_width_ratio = 0.8
line_spacing = 0.3
top_margin = 40
bottom_margin = 80
padding = 25
edge_margin = 10
corner_radius = 20
border_width = 2
card_color = [255, 255, 255, 220]
border_color = [0, 153, 204, 255]
text_color = [0, 0, 0, 255]

# ---------------------------------------------------------------------------
# Fonts: family names or font file paths, tried in order. The generic
# sans-serif family and a built-in bitmap font always follow.
# ---------------------------------------------------------------------------
[fonts]
candidates = ["Comic Sans MS", "Arial", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"]

# ---------------------------------------------------------------------------
# Palette
# ---------------------------------------------------------------------------
[palette]
backgrounds = [
    [255, 223, 186],
    [200, 230, 255],
    [255, 200, 200],
    [200, 255, 200],
    [230, 230, 255],
    [255, 255, 200],
    [200, 255, 230],
]
stars = [[255, 223, 0, 100], [255, 120, 180, 100], [100, 200, 255, 100], [180, 255, 140, 100]]
dots = [[255, 255, 255, 120], [255, 220, 100, 120], [255, 150, 150, 120], [150, 220, 255, 120]]
stripes = [[255, 255, 255, 60], [255, 220, 100, 60], [150, 220, 255, 60], [255, 150, 150, 60]]

# ---------------------------------------------------------------------------
# Theme keywords used to pick a foreground asset for each story
# ---------------------------------------------------------------------------
[themes]
default = ["animal"]

[themes.stories]
boy-who-cried-wolf = ["wolf", "sheep", "boy"]
brown-bear = ["bear", "bird", "duck"]
five-little-monkeys = ["monkey", "bed", "doctor"]
gingerbread-man = ["cookie", "fox", "run"]
goldilocks = ["bear", "girl", "house"]
hungry-caterpillar = ["butterfly", "fruit", "leaf"]
itsy-bitsy-spider = ["spider", "rain", "sun"]
red-riding-hood = ["forest", "girl", "wolf"]
three-billy-goats = ["goat", "bridge", "troll"]
three-little-pigs = ["pig", "wolf", "house"]
tortoise-and-hare = ["turtle", "rabbit", "race"]
ugly-duckling = ["duck", "swan", "pond"]

# ---------------------------------------------------------------------------
# Prompt sheets
# ---------------------------------------------------------------------------
[prompts]
public_prefix = "/images/stories"
default_style = "cartoon style, vibrant colors, clean lines, friendly characters, appealing to children"

[prompts.category_styles]
animals = "cute, children's book illustration style, bright colors, simple shapes, friendly"
fable = "cartoon style, vibrant colors, clean lines, friendly characters, appealing to children"
fairy-tale = "watercolor illustration, soft edges, gentle colors, dreamy, children's book style"
rhymes = "claymation style, 3D-like, textured, colorful, child-friendly, rounded shapes"

[prompts.age_styles]
3 = "extra simple shapes, very bright primary colors, round friendly faces, ultra-safe for toddlers"
4 = "simple but more detailed, cheerful colors, friendly characters, safe for preschoolers"
5 = "moderate detail, balanced colors, approachable characters, kindergarten-appropriate"
6 = "more intricate details, varied color palette, engaging expressions, early elementary-appropriate"

# ---------------------------------------------------------------------------
# Sprites and icons
# ---------------------------------------------------------------------------
[sprites]
size = 256
ico_sizes = [16, 32]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit to use every CPU core.
# max_processes = 4
"##
}
