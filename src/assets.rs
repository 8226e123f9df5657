//! Foreground asset index.
//!
//! One directory, one level deep. Every `png`/`webp`/`svg` file becomes an
//! entry keyed by [`asset_key`](crate::naming::asset_key), so `Bear.png`
//! and `bear.cute.png` both answer to `bear`. Entries are visited in file
//! name order and the last one wins, which keeps the winner stable across
//! runs.
//!
//! Keyword resolution tries, in order:
//! 1. An exact key match.
//! 2. The first key (sorted) that contains the keyword or is contained by it.
//! 3. A uniform random asset.

use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::naming::asset_key;

/// File extensions accepted as foreground assets (compared case-insensitively).
pub const ASSET_EXTENSIONS: &[&str] = &["png", "webp", "svg"];

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("asset directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("no foreground assets (png, webp, svg) in {0}")]
    Empty(PathBuf),
}

/// Keyword → asset path, read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetIndex {
    entries: BTreeMap<String, PathBuf>,
}

fn is_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ASSET_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

impl AssetIndex {
    /// Scan `dir` (non-recursive) for foreground assets.
    ///
    /// A missing directory and a directory without any asset are both
    /// errors: nothing can be illustrated without foregrounds.
    pub fn scan(dir: &Path) -> Result<Self, AssetError> {
        if !dir.is_dir() {
            return Err(AssetError::MissingDir(dir.to_path_buf()));
        }

        let mut entries = BTreeMap::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') || !is_asset(entry.path()) {
                continue;
            }
            if let Some(key) = asset_key(&name) {
                if let Some(previous) = entries.insert(key.clone(), entry.path().to_path_buf()) {
                    tracing::debug!(
                        %key,
                        replaced = %previous.display(),
                        by = %entry.path().display(),
                        "duplicate asset key"
                    );
                }
            }
        }

        if entries.is_empty() {
            return Err(AssetError::Empty(dir.to_path_buf()));
        }
        tracing::info!(count = entries.len(), dir = %dir.display(), "indexed foreground assets");
        Ok(Self { entries })
    }

    /// Build an index from explicit `(key, path)` pairs. Later pairs win.
    pub fn from_entries<I, K, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Exact or substring match, without the random fallback.
    pub fn find(&self, keyword: &str) -> Option<&Path> {
        let keyword = keyword.to_lowercase();
        if let Some(path) = self.get(&keyword) {
            return Some(path);
        }
        self.entries
            .iter()
            .find(|(key, _)| key.contains(keyword.as_str()) || keyword.contains(key.as_str()))
            .map(|(_, path)| path.as_path())
    }

    /// Resolve a theme keyword to an asset, falling back to a random one.
    ///
    /// Returns `None` only for an empty index.
    pub fn resolve(&self, keyword: &str, rng: &mut impl Rng) -> Option<&Path> {
        if let Some(path) = self.find(keyword) {
            return Some(path);
        }
        let fallback = self.entries.values().choose(rng).map(PathBuf::as_path);
        if let Some(path) = fallback {
            tracing::debug!(keyword, asset = %path.display(), "no asset matches keyword, picked at random");
        }
        fallback
    }
}
