//! Story catalog loading.
//!
//! The catalog is a JSON array of stories in the web app's camelCase shape:
//!
//! ```json
//! [{"id": "goldilocks", "title": "Goldilocks", "recommendedAge": 4,
//!   "category": "fairy-tale", "pages": [{"text": "Once upon a time..."}]}]
//! ```
//!
//! Validation rejects the whole catalog on the first problem: empty ids or
//! titles, ids that are not usable as file name prefixes, and duplicate ids.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::naming::is_filename_safe;
use crate::types::StoryRequest;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog validation error: {0}")]
    Validation(String),
}

/// Check every story and the catalog as a whole.
pub fn validate(stories: &[StoryRequest]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for (i, story) in stories.iter().enumerate() {
        if story.id.trim().is_empty() {
            return Err(CatalogError::Validation(format!("story #{} has no id", i + 1)));
        }
        if !is_filename_safe(&story.id) {
            return Err(CatalogError::Validation(format!(
                "story id {:?} must use only letters, digits, '-' and '_'",
                story.id
            )));
        }
        if story.title.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "story {:?} has no title",
                story.id
            )));
        }
        if !seen.insert(story.id.as_str()) {
            return Err(CatalogError::Validation(format!(
                "duplicate story id {:?}",
                story.id
            )));
        }
    }
    Ok(())
}

/// Parse and validate a catalog from JSON text.
pub fn parse_catalog(json: &str) -> Result<Vec<StoryRequest>, CatalogError> {
    let stories: Vec<StoryRequest> = serde_json::from_str(json)?;
    validate(&stories)?;
    Ok(stories)
}

/// Load and validate the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Vec<StoryRequest>, CatalogError> {
    let content = fs::read_to_string(path)?;
    let stories = parse_catalog(&content)?;
    tracing::debug!(path = %path.display(), stories = stories.len(), "loaded story catalog");
    Ok(stories)
}

/// Load the catalog, or log the failure and return no stories.
pub fn load_or_empty(path: &Path) -> Vec<StoryRequest> {
    match load_catalog(path) {
        Ok(stories) => stories,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not load story catalog");
            Vec::new()
        }
    }
}
