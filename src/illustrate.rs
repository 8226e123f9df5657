//! Illustration assembly.
//!
//! Turns stories into PNG illustrations: one cover per story plus one image
//! per page. Every image is built by a [`Job`] that walks a fixed sequence of
//! stages:
//!
//! ```text
//! NotStarted → BackgroundReady → AssetPlaced → CaptionPlaced → Saved
//!      └──────────────────────────────────────────────────────→ Skipped
//! ```
//!
//! `Skipped` is taken before any work when the output already exists, so a
//! rerun performs zero writes.
//!
//! ## Recipes
//!
//! | | Cover | Page *n* |
//! |---|---|---|
//! | Canvas | 600×400 | 800×500 |
//! | Asset zone | bottom 75% | the 65% not used by text |
//! | Asset size | 80% of the zone's short side | 75% of min(W, zone height) |
//! | Asset position | centered | random x in [50, W − aw − 50], centered vertically |
//! | Caption | title, top, 65 px | page text (≤120 chars), top on odd / bottom on even pages, 40 px |
//! | Theme keyword | keyword 0 | keyword *n* mod len |
//!
//! ## Parallelism and reproducibility
//!
//! Stories run in parallel on the rayon pool. Each output path is claimed
//! once per run through [`PathClaims`], and each image draws its randomness
//! from a `StdRng` seeded with SHA-256(base seed ‖ output file name), so the
//! pixels do not depend on scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::assets::{AssetError, AssetIndex};
use crate::catalog;
use crate::config::StudioConfig;
use crate::imaging::{
    Anchor, Canvas, FsStore, OutputStore, Typeface, composite_asset, cover_zones, draw_caption,
    fit_limit, horizontal_range, page_text_anchor, page_zones, place_asset, resolve_typeface,
    synthesize_background, truncate_text,
};
use crate::naming::{output_file_name, output_path};
use crate::types::{ImageSlot, StoryRequest};

#[derive(Error, Debug)]
pub enum IllustrateError {
    #[error("Asset error: {0}")]
    Assets(#[from] AssetError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Job state machine
// ============================================================================

/// Progress of a single illustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    BackgroundReady,
    AssetPlaced,
    CaptionPlaced,
    Saved,
    Skipped,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Saved | Stage::Skipped)
    }

    /// Whether `next` directly follows `self`.
    pub fn may_enter(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::NotStarted, Stage::BackgroundReady)
                | (Stage::NotStarted, Stage::Skipped)
                | (Stage::BackgroundReady, Stage::AssetPlaced)
                | (Stage::AssetPlaced, Stage::CaptionPlaced)
                | (Stage::CaptionPlaced, Stage::Saved)
        )
    }
}

/// One illustration being built.
#[derive(Debug)]
pub struct Job {
    pub slot: ImageSlot,
    pub path: PathBuf,
    history: Vec<Stage>,
}

impl Job {
    fn new(slot: ImageSlot, path: PathBuf) -> Self {
        Self {
            slot,
            path,
            history: vec![Stage::NotStarted],
        }
    }

    pub fn stage(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::NotStarted)
    }

    /// Every stage entered so far, starting with `NotStarted`.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    fn advance(&mut self, next: Stage) {
        let current = self.stage();
        debug_assert!(
            current.may_enter(next),
            "illegal transition {current:?} → {next:?}"
        );
        tracing::trace!(path = %self.path.display(), from = ?current, to = ?next, "stage");
        self.history.push(next);
    }
}

// ============================================================================
// Outcomes and reports
// ============================================================================

/// What happened to one illustration.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus {
    /// Written; `asset` is the foreground used, if one could be placed.
    Created { asset: Option<PathBuf> },
    /// Output existed already.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOutcome {
    pub slot: ImageSlot,
    pub path: PathBuf,
    pub stage: Stage,
    pub status: ImageStatus,
}

/// Per-story summary.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryReport {
    pub id: String,
    pub title: String,
    pub images: Vec<ImageOutcome>,
}

impl StoryReport {
    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, ImageStatus::Created { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ImageStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ImageStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ImageStatus) -> bool) -> usize {
        self.images.iter().filter(|i| pred(&i.status)).count()
    }
}

/// Whole-run summary, stories in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub seed: u64,
    pub stories: Vec<StoryReport>,
}

impl BatchReport {
    pub fn created(&self) -> usize {
        self.stories.iter().map(StoryReport::created).sum()
    }

    pub fn skipped(&self) -> usize {
        self.stories.iter().map(StoryReport::skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.stories.iter().map(StoryReport::failed).sum()
    }

    pub fn total(&self) -> usize {
        self.stories.iter().map(|s| s.images.len()).sum()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed() > 0 {
            write!(
                f,
                "{} created, {} skipped, {} failed ({} total)",
                self.created(),
                self.skipped(),
                self.failed(),
                self.total()
            )
        } else {
            write!(
                f,
                "{} created, {} skipped ({} total)",
                self.created(),
                self.skipped(),
                self.total()
            )
        }
    }
}

/// Progress streamed to the CLI as each story finishes.
#[derive(Debug, Clone)]
pub struct StoryProgress {
    /// 1-based position in the catalog.
    pub index: usize,
    pub report: StoryReport,
}

// ============================================================================
// Claims and seeds
// ============================================================================

/// Output paths claimed during one run.
///
/// A path can be claimed once; later claims are refused for the rest of the
/// run.
#[derive(Debug, Default)]
pub struct PathClaims {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl PathClaims {
    /// Claim `path`. Returns `false` if it was already claimed.
    pub fn claim(&self, path: &Path) -> bool {
        let mut claimed = match self.claimed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        claimed.insert(path.to_path_buf())
    }
}

/// Per-image seed: the first 8 bytes of SHA-256(base seed ‖ file name).
pub fn job_seed(base: u64, file_name: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(file_name.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// The run's base seed: the given one, or a fresh one from the OS RNG.
pub fn base_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            tracing::info!(seed, "no seed given, rerun with --seed {seed} to reproduce");
            seed
        }
    }
}

// ============================================================================
// Illustrator
// ============================================================================

/// Builds illustrations for stories.
pub struct Illustrator<'a, S: OutputStore> {
    config: &'a StudioConfig,
    assets: &'a AssetIndex,
    store: &'a S,
    stories_dir: PathBuf,
    seed: u64,
    font: Arc<dyn Typeface>,
    claims: PathClaims,
}

impl<'a, S: OutputStore> Illustrator<'a, S> {
    /// Create an illustrator; the caption typeface is resolved from the
    /// configured font candidates.
    pub fn new(
        config: &'a StudioConfig,
        assets: &'a AssetIndex,
        store: &'a S,
        stories_dir: impl Into<PathBuf>,
        seed: u64,
    ) -> Self {
        let font = resolve_typeface(&config.fonts.candidates);
        Self::with_font(config, assets, store, stories_dir, seed, font)
    }

    pub fn with_font(
        config: &'a StudioConfig,
        assets: &'a AssetIndex,
        store: &'a S,
        stories_dir: impl Into<PathBuf>,
        seed: u64,
        font: Arc<dyn Typeface>,
    ) -> Self {
        Self {
            config,
            assets,
            store,
            stories_dir: stories_dir.into(),
            seed,
            font,
            claims: PathClaims::default(),
        }
    }

    /// Theme keyword for a slot: keyword 0 for the cover, `n mod len` for page `n`.
    pub fn keyword_for(&self, story_id: &str, slot: ImageSlot) -> Option<&str> {
        let keywords = self.config.themes.keywords(story_id);
        if keywords.is_empty() {
            return None;
        }
        let index = match slot {
            ImageSlot::Cover => 0,
            ImageSlot::Page(n) => n % keywords.len(),
        };
        Some(keywords[index].as_str())
    }

    /// Build the cover of a story.
    pub fn cover(&self, story: &StoryRequest) -> ImageOutcome {
        self.illustrate(story, ImageSlot::Cover, "")
    }

    /// Build page `n` (1-based) of a story.
    pub fn page(&self, story: &StoryRequest, n: usize, text: &str) -> ImageOutcome {
        self.illustrate(story, ImageSlot::Page(n), text)
    }

    /// Cover, then pages in order.
    pub fn story(&self, story: &StoryRequest) -> StoryReport {
        let mut images = Vec::with_capacity(story.pages.len() + 1);
        images.push(self.cover(story));
        for (i, text) in story.page_texts().enumerate() {
            images.push(self.page(story, i + 1, text));
        }
        StoryReport {
            id: story.id.clone(),
            title: story.title.clone(),
            images,
        }
    }

    /// Illustrate every story, in parallel, reporting in catalog order.
    pub fn run(
        &self,
        stories: &[StoryRequest],
        progress: Option<Sender<StoryProgress>>,
    ) -> BatchReport {
        let reports = stories
            .par_iter()
            .enumerate()
            .map_with(progress, |tx, (i, story)| {
                let report = self.story(story);
                if let Some(tx) = tx {
                    tx.send(StoryProgress {
                        index: i + 1,
                        report: report.clone(),
                    })
                    .ok();
                }
                report
            })
            .collect();
        BatchReport {
            seed: self.seed,
            stories: reports,
        }
    }

    fn illustrate(&self, story: &StoryRequest, slot: ImageSlot, text: &str) -> ImageOutcome {
        let mut job = Job::new(slot, output_path(&self.stories_dir, &story.id, slot));

        if self.store.exists(&job.path) {
            tracing::debug!(path = %job.path.display(), "already exists, skipping");
            job.advance(Stage::Skipped);
            return finish(job, ImageStatus::Skipped);
        }
        if !self.claims.claim(&job.path) {
            let reason = format!("{} was already claimed in this run", job.path.display());
            tracing::warn!(story = %story.id, %slot, "{reason}");
            return finish(job, ImageStatus::Failed(reason));
        }

        let mut rng = StdRng::seed_from_u64(job_seed(
            self.seed,
            &output_file_name(&story.id, slot),
        ));
        let (canvas, asset) = match slot {
            ImageSlot::Cover => self.build_cover(&mut job, story, &mut rng),
            ImageSlot::Page(n) => self.build_page(&mut job, story, n, text, &mut rng),
        };

        match self.store.save(&job.path, &canvas) {
            Ok(()) => {
                job.advance(Stage::Saved);
                tracing::debug!(path = %job.path.display(), "saved");
                finish(job, ImageStatus::Created { asset })
            }
            Err(e) => {
                tracing::error!(path = %job.path.display(), error = %e, "could not save illustration");
                finish(job, ImageStatus::Failed(e.to_string()))
            }
        }
    }

    fn build_cover(
        &self,
        job: &mut Job,
        story: &StoryRequest,
        rng: &mut StdRng,
    ) -> (Canvas, Option<PathBuf>) {
        let [width, height] = self.config.canvas.cover;
        let layout = &self.config.layout;

        let mut canvas = synthesize_background(width, height, &self.config.palette, rng);
        job.advance(Stage::BackgroundReady);

        let (_, asset_zone) = cover_zones((width, height), layout.cover_title_ratio);
        let asset = self.resolve_asset(story, job.slot, rng).and_then(|path| {
            place_asset(
                &mut canvas,
                &path,
                asset_zone,
                Anchor::Center,
                layout.cover_asset_fraction,
            )
            .map(|_| path)
        });
        job.advance(Stage::AssetPlaced);

        self.caption(
            &mut canvas,
            &story.title,
            Anchor::Top,
            self.config.caption.title_font_size,
        );
        job.advance(Stage::CaptionPlaced);

        (canvas, asset)
    }

    fn build_page(
        &self,
        job: &mut Job,
        story: &StoryRequest,
        n: usize,
        text: &str,
        rng: &mut StdRng,
    ) -> (Canvas, Option<PathBuf>) {
        let [width, height] = self.config.canvas.page;
        let layout = &self.config.layout;

        let mut canvas = synthesize_background(width, height, &self.config.palette, rng);
        job.advance(Stage::BackgroundReady);

        let text_anchor = page_text_anchor(n);
        let (_, zone) = page_zones((width, height), layout.page_text_ratio, text_anchor);
        let asset = self.resolve_asset(story, job.slot, rng).and_then(|path| {
            let limit = fit_limit(zone, layout.page_asset_fraction);
            let placed = composite_asset(&mut canvas, &path, limit, |(aw, ah)| {
                let x = match horizontal_range(width, aw, layout.page_asset_margin) {
                    Some((lo, hi)) => rng.gen_range(lo..=hi) as i64,
                    None => (width as i64 - aw as i64) / 2,
                };
                let y = zone.y as i64 + (zone.height as i64 - ah as i64) / 2;
                (x, y)
            });
            match placed {
                Ok(_) => Some(path),
                Err(e) => {
                    tracing::warn!(asset = %path.display(), error = %e, "could not place asset");
                    None
                }
            }
        });
        job.advance(Stage::AssetPlaced);

        let text = page_caption_text(text, layout.page_text_limit);
        self.caption(
            &mut canvas,
            &text,
            text_anchor,
            self.config.caption.page_font_size,
        );
        job.advance(Stage::CaptionPlaced);

        (canvas, asset)
    }

    fn resolve_asset(
        &self,
        story: &StoryRequest,
        slot: ImageSlot,
        rng: &mut StdRng,
    ) -> Option<PathBuf> {
        let keyword = self.keyword_for(&story.id, slot).unwrap_or_default();
        let found = self.assets.resolve(keyword, rng).map(Path::to_path_buf);
        if found.is_none() {
            tracing::warn!(story = %story.id, %slot, keyword, "no foreground asset available");
        }
        found
    }

    fn caption(&self, canvas: &mut Canvas, text: &str, anchor: Anchor, size: u32) {
        if let Err(e) = draw_caption(
            canvas,
            text,
            anchor,
            size,
            &self.config.caption,
            self.font.as_ref(),
        ) {
            tracing::warn!(error = %e, "caption not drawn");
        }
    }
}

/// Page caption: the raw page text cut to `limit` characters. Surrounding
/// whitespace counts toward the limit; wrapping drops it later.
fn page_caption_text(text: &str, limit: usize) -> String {
    truncate_text(text, limit)
}

fn finish(job: Job, status: ImageStatus) -> ImageOutcome {
    ImageOutcome {
        slot: job.slot,
        stage: job.stage(),
        path: job.path,
        status,
    }
}

/// Illustrate a story catalog into `stories_dir` on the filesystem.
///
/// A missing or empty asset directory aborts the batch. A catalog that does
/// not load is logged and treated as empty.
pub fn illustrate_catalog(
    config: &StudioConfig,
    assets_dir: &Path,
    catalog_path: &Path,
    stories_dir: &Path,
    seed: u64,
    progress: Option<Sender<StoryProgress>>,
) -> Result<BatchReport, IllustrateError> {
    let assets = AssetIndex::scan(assets_dir)?;
    let stories = catalog::load_or_empty(catalog_path);
    std::fs::create_dir_all(stories_dir)?;
    let illustrator = Illustrator::new(config, &assets, &FsStore, stories_dir, seed);
    Ok(illustrator.run(&stories, progress))
}
