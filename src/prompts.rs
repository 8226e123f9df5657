//! Prompt sheets for hand-made illustrations.
//!
//! Two Markdown documents are produced from the story catalog:
//!
//! - `story_image_prompts.md`: one section per story with an image
//!   generation prompt for the cover and every page, plus the file each
//!   image must be saved as.
//! - `story_images_required.md`: a checklist of every image path.
//!
//! Prompt style comes from the story category (base style) and the
//! recommended age (extra style elements), both configurable.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PromptConfig;
use crate::naming::public_image_path;
use crate::types::{ImageSlot, StoryRequest};

pub const PROMPTS_FILE: &str = "story_image_prompts.md";
pub const REQUIRED_FILE: &str = "story_images_required.md";

/// `"{base style}, {age style}"`, or just the base style when the age has no entry.
fn style_for(story: &StoryRequest, config: &PromptConfig) -> String {
    let base = story
        .category
        .as_deref()
        .and_then(|c| config.category_styles.get(c))
        .unwrap_or(&config.default_style);
    let age = story
        .recommended_age
        .and_then(|a| config.age_styles.get(&a.to_string()));
    match age {
        Some(age) => format!("{base}, {age}"),
        None => base.clone(),
    }
}

pub fn cover_prompt(story: &StoryRequest, config: &PromptConfig) -> String {
    let mut prompt = format!("Create a cover illustration for '{}'. ", story.title);
    if let Some(description) = &story.description {
        prompt.push_str(&format!(
            "The image should capture the essence of this story: {description} "
        ));
    }
    prompt.push_str(&format!("Style: {}. ", style_for(story, config)));
    prompt.push_str(
        "The illustration should be appealing to young children and include the main character(s). ",
    );
    prompt.push_str(
        "Include space at the top for the title text. Composition should be centered and balanced.",
    );
    prompt
}

/// Prompt for page `page_number` (1-based).
pub fn page_prompt(
    story: &StoryRequest,
    text: &str,
    page_number: usize,
    config: &PromptConfig,
) -> String {
    let mut prompt = format!(
        "Create an illustration for page {page_number} of '{}'. ",
        story.title
    );
    prompt.push_str(&format!("This scene depicts: {text} "));
    prompt.push_str(&format!("Style: {}. ", style_for(story, config)));
    prompt.push_str(
        "The illustration should clearly communicate the story text to young children. ",
    );
    prompt.push_str("Include ample space for text placement either at the top or bottom. ");
    prompt.push_str(
        "The characters should have friendly, appealing expressions appropriate for children.",
    );
    prompt
}

fn story_heading(story: &StoryRequest) -> String {
    format!("## {} (ID: {})\n\n", story.title, story.id)
}

/// Render `story_image_prompts.md`.
pub fn prompts_markdown(stories: &[StoryRequest], config: &PromptConfig) -> String {
    let mut out = String::from("# Story Image Generation Prompts\n\n");
    out.push_str("Use these prompts with your preferred image generation tool.\n\n");

    for story in stories {
        out.push_str(&story_heading(story));
        if let (Some(age), Some(category)) = (story.recommended_age, &story.category) {
            out.push_str(&format!("Age: {age}+, Category: {category}\n\n"));
        }
        if let Some(description) = &story.description {
            out.push_str(&format!("Description: {description}\n\n"));
        }

        out.push_str("### Cover Image\n\n");
        let cover = public_image_path(&config.public_prefix, &story.id, ImageSlot::Cover);
        out.push_str(&format!("**File:** `{cover}`\n\n"));
        out.push_str(&format!("**Prompt:**\n\n{}\n\n", cover_prompt(story, config)));

        out.push_str("### Page Images\n\n");
        for (i, text) in story.page_texts().enumerate() {
            let n = i + 1;
            let file = public_image_path(&config.public_prefix, &story.id, ImageSlot::Page(n));
            out.push_str(&format!("#### Page {n}\n\n"));
            out.push_str(&format!("**Text:** \"{text}\"\n\n"));
            out.push_str(&format!("**File:** `{file}`\n\n"));
            out.push_str(&format!(
                "**Prompt:**\n\n{}\n\n",
                page_prompt(story, text, n, config)
            ));
        }
        out.push_str("\n---\n\n");
    }
    out
}

/// Render `story_images_required.md`.
pub fn required_markdown(stories: &[StoryRequest], config: &PromptConfig) -> String {
    let mut out = String::from("# Required Story Images\n\n");
    out.push_str("This file lists all the image files that need to be created.\n\n");

    for story in stories {
        out.push_str(&story_heading(story));
        let slots = std::iter::once(ImageSlot::Cover).chain((1..=story.pages.len()).map(ImageSlot::Page));
        for slot in slots {
            out.push_str(&format!(
                "- [ ] {}\n",
                public_image_path(&config.public_prefix, &story.id, slot)
            ));
        }
        out.push('\n');
    }
    out
}

/// Write both prompt sheets into `out_dir`; returns the written paths.
pub fn write_prompt_sheets(
    stories: &[StoryRequest],
    config: &PromptConfig,
    out_dir: &Path,
) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let prompts = out_dir.join(PROMPTS_FILE);
    fs::write(&prompts, prompts_markdown(stories, config))?;
    let required = out_dir.join(REQUIRED_FILE);
    fs::write(&required, required_markdown(stories, config))?;
    tracing::debug!(stories = stories.len(), dir = %out_dir.display(), "wrote prompt sheets");
    Ok(vec![prompts, required])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::story;
    use tempfile::TempDir;

    fn goldilocks() -> StoryRequest {
        let mut s = story(
            "goldilocks",
            "Goldilocks",
            &["Once upon a time", "She tried the porridge"],
        );
        s.recommended_age = Some(4);
        s.category = Some("fairy-tale".to_string());
        s.description = Some("A girl visits the home of three bears.".to_string());
        s
    }

    // =========================================================================
    // Prompt text tests
    // =========================================================================

    #[test]
    fn cover_prompt_uses_category_and_age_style() {
        let prompt = cover_prompt(&goldilocks(), &PromptConfig::default());
        assert!(prompt.starts_with("Create a cover illustration for 'Goldilocks'. "));
        assert!(prompt.contains(
            "The image should capture the essence of this story: A girl visits the home of three bears. "
        ));
        assert!(prompt.contains("Style: watercolor illustration"));
        assert!(prompt.contains("safe for preschoolers. "));
        assert!(prompt.ends_with("Composition should be centered and balanced."));
    }

    #[test]
    fn page_prompt_wording() {
        let prompt = page_prompt(&goldilocks(), "She tried the porridge", 2, &PromptConfig::default());
        assert!(prompt.starts_with("Create an illustration for page 2 of 'Goldilocks'. "));
        assert!(prompt.contains("This scene depicts: She tried the porridge "));
        assert!(prompt.ends_with("appropriate for children."));
    }

    #[test]
    fn unknown_category_and_age_fall_back() {
        let mut s = story("owl", "Owl", &[]);
        s.category = Some("poems".to_string());
        s.recommended_age = Some(9);
        let config = PromptConfig::default();
        assert_eq!(style_for(&s, &config), config.default_style);
        let prompt = cover_prompt(&s, &config);
        assert!(prompt.contains(&format!("Style: {}. ", config.default_style)));
        assert!(!prompt.contains("capture the essence"));
    }

    // =========================================================================
    // Markdown tests
    // =========================================================================

    #[test]
    fn prompts_markdown_layout() {
        let md = prompts_markdown(&[goldilocks()], &PromptConfig::default());
        assert!(md.starts_with("# Story Image Generation Prompts\n\n"));
        assert!(md.contains("## Goldilocks (ID: goldilocks)\n\n"));
        assert!(md.contains("Age: 4+, Category: fairy-tale\n\n"));
        assert!(md.contains("Description: A girl visits the home of three bears.\n\n"));
        assert!(md.contains("### Cover Image\n\n**File:** `/images/stories/goldilocks-cover.png`\n\n"));
        assert!(md.contains("#### Page 2\n\n**Text:** \"She tried the porridge\"\n\n"));
        assert!(md.contains("**File:** `/images/stories/goldilocks-2.png`"));
        assert!(md.ends_with("\n---\n\n"));
    }

    #[test]
    fn prompts_markdown_omits_partial_age_line() {
        let mut s = goldilocks();
        s.category = None;
        let md = prompts_markdown(&[s], &PromptConfig::default());
        assert!(!md.contains("Age: "));
    }

    #[test]
    fn required_markdown_checklist() {
        let md = required_markdown(&[goldilocks()], &PromptConfig::default());
        assert_eq!(
            md,
            "# Required Story Images\n\n\
             This file lists all the image files that need to be created.\n\n\
             ## Goldilocks (ID: goldilocks)\n\n\
             - [ ] /images/stories/goldilocks-cover.png\n\
             - [ ] /images/stories/goldilocks-1.png\n\
             - [ ] /images/stories/goldilocks-2.png\n\n"
        );
    }

    #[test]
    fn custom_public_prefix() {
        let config = PromptConfig {
            public_prefix: "/static/art/".to_string(),
            ..PromptConfig::default()
        };
        let md = required_markdown(&[story("owl", "Owl", &[])], &config);
        assert!(md.contains("- [ ] /static/art/owl-cover.png\n"));
    }

    #[test]
    fn write_prompt_sheets_creates_both_files() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("docs");
        let written = write_prompt_sheets(&[goldilocks()], &PromptConfig::default(), &out).unwrap();
        assert_eq!(written, vec![out.join(PROMPTS_FILE), out.join(REQUIRED_FILE)]);
        let required = std::fs::read_to_string(out.join(REQUIRED_FILE)).unwrap();
        assert!(required.contains("goldilocks-cover.png"));
    }
}
