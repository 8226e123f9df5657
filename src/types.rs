//! Shared types used across the catalog, assembler and prompt sheets.
//!
//! The story types mirror the web app's `Story` shape so a catalog exported
//! from the app deserializes without translation (camelCase keys).

use serde::{Deserialize, Serialize};

/// One story to illustrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    /// Filename-safe identifier, e.g. `goldilocks`.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Pages in reading order. Page numbers are 1-based positions here.
    #[serde(default)]
    pub pages: Vec<StoryPage>,
}

/// A single story page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub text: String,
    /// Image path as referenced by the web app, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl StoryRequest {
    /// Page texts in order.
    pub fn page_texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.text.as_str())
    }
}

/// Which image of a story is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Cover,
    /// 1-based page number.
    Page(usize),
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSlot::Cover => write!(f, "cover"),
            ImageSlot::Page(n) => write!(f, "page {n}"),
        }
    }
}
