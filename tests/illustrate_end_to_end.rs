//! End-to-end runs through the public API: assets and catalog on disk in,
//! PNG illustrations and prompt sheets out.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use picturebook::config::StudioConfig;
use picturebook::illustrate::{ImageStatus, illustrate_catalog};
use picturebook::prompts::{PROMPTS_FILE, REQUIRED_FILE, write_prompt_sheets};
use std::path::Path;
use tempfile::TempDir;

const CATALOG: &str = r#"[
    {
        "id": "goldilocks",
        "title": "Goldilocks",
        "recommendedAge": 4,
        "category": "fairy-tale",
        "description": "A girl visits the home of three bears.",
        "pages": [
            {"text": "Once upon a time there was a girl called Goldilocks."},
            {"text": "She found a little house in the woods."}
        ]
    }
]"#;

fn solid_png(dir: &Path, name: &str, color: [u8; 3]) {
    RgbImage::from_pixel(100, 100, Rgb(color))
        .save(dir.join(name))
        .unwrap();
}

/// Bounding box `(x0, y0, x1, y1)`, exclusive end, of matching pixels.
fn bounding_box(img: &RgbaImage, pred: impl Fn(&Rgba<u8>) -> bool) -> Option<(u32, u32, u32, u32)> {
    img.enumerate_pixels()
        .filter(|(_, _, px)| pred(px))
        .fold(None, |acc, (x, y, _)| {
            Some(match acc {
                None => (x, y, x + 1, y + 1),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
            })
        })
}

struct Site {
    _tmp: TempDir,
    assets: std::path::PathBuf,
    catalog: std::path::PathBuf,
    stories: std::path::PathBuf,
}

fn site() -> Site {
    let tmp = TempDir::new().unwrap();
    let assets = tmp.path().join("animals");
    std::fs::create_dir(&assets).unwrap();
    solid_png(&assets, "bear.png", [220, 30, 30]);
    solid_png(&assets, "girl.png", [30, 200, 30]);
    let catalog = tmp.path().join("stories.json");
    std::fs::write(&catalog, CATALOG).unwrap();
    let stories = tmp.path().join("stories");
    Site {
        assets,
        catalog,
        stories,
        _tmp: tmp,
    }
}

#[test]
fn goldilocks_cover_layout() {
    let site = site();
    let report = illustrate_catalog(
        &StudioConfig::default(),
        &site.assets,
        &site.catalog,
        &site.stories,
        42,
        None,
    )
    .unwrap();
    assert_eq!(report.created(), 3);
    assert_eq!(report.failed(), 0);

    let cover_path = site.stories.join("goldilocks-cover.png");
    let cover = image::open(&cover_path).unwrap();
    assert_eq!((cover.width(), cover.height()), (600, 400));
    let cover = cover.to_rgba8();

    // Title card border (accent blue) starts inside the top 100 px band
    let (cx0, cy0, cx1, _) = bounding_box(&cover, |p| {
        p.0[0] < 60 && (120..=190).contains(&p.0[1]) && p.0[2] > 170
    })
    .expect("caption card border not found");
    assert!(cy0 < 100, "card starts at y={cy0}");
    assert!(cx0 >= 10 && cx1 <= 590, "card spans {cx0}..{cx1}");

    // The bear (red) is 240×240, centered in the 300 px band below the title
    let (x0, y0, x1, y1) = bounding_box(&cover, |p| p.0[0] > 180 && p.0[1] < 80 && p.0[2] < 80)
        .expect("bear asset not found");
    assert!(x0.abs_diff(180) <= 2 && x1.abs_diff(420) <= 2, "asset x {x0}..{x1}");
    assert!(y1.abs_diff(370) <= 2, "asset bottom {y1}");
    assert!(y0 >= 100, "asset reaches into the title band: {y0}");

    let page = image::open(site.stories.join("goldilocks-1.png")).unwrap();
    assert_eq!((page.width(), page.height()), (800, 500));
    assert!(site.stories.join("goldilocks-2.png").exists());
}

#[test]
fn rerun_leaves_files_untouched() {
    let site = site();
    let config = StudioConfig::default();
    illustrate_catalog(&config, &site.assets, &site.catalog, &site.stories, 1, None).unwrap();
    let before = std::fs::read(site.stories.join("goldilocks-cover.png")).unwrap();

    // A different seed would paint a different cover if anything were redrawn
    let report =
        illustrate_catalog(&config, &site.assets, &site.catalog, &site.stories, 2, None).unwrap();
    assert_eq!(report.skipped(), 3);
    assert_eq!(report.created(), 0);
    assert_eq!(
        std::fs::read(site.stories.join("goldilocks-cover.png")).unwrap(),
        before
    );
}

#[test]
fn same_seed_reproduces_pixels() {
    let a = site();
    let b = site();
    let config = StudioConfig::default();
    illustrate_catalog(&config, &a.assets, &a.catalog, &a.stories, 9, None).unwrap();
    illustrate_catalog(&config, &b.assets, &b.catalog, &b.stories, 9, None).unwrap();
    for name in ["goldilocks-cover.png", "goldilocks-1.png", "goldilocks-2.png"] {
        let pa = image::open(a.stories.join(name)).unwrap().to_rgb8();
        let pb = image::open(b.stories.join(name)).unwrap().to_rgb8();
        assert!(pa == pb, "{name} differs between identical runs");
    }
}

#[test]
fn broken_catalog_produces_nothing() {
    let site = site();
    std::fs::write(&site.catalog, "{ not json").unwrap();
    let report = illustrate_catalog(
        &StudioConfig::default(),
        &site.assets,
        &site.catalog,
        &site.stories,
        1,
        None,
    )
    .unwrap();
    assert!(report.stories.is_empty());
    assert_eq!(std::fs::read_dir(&site.stories).unwrap().count(), 0);
}

#[test]
fn cover_records_the_asset_used() {
    let site = site();
    let report = illustrate_catalog(
        &StudioConfig::default(),
        &site.assets,
        &site.catalog,
        &site.stories,
        3,
        None,
    )
    .unwrap();
    // goldilocks themes: bear, girl, house; page 1 uses "girl"
    let images = &report.stories[0].images;
    assert_eq!(
        images[0].status,
        ImageStatus::Created {
            asset: Some(site.assets.join("bear.png"))
        }
    );
    assert_eq!(
        images[1].status,
        ImageStatus::Created {
            asset: Some(site.assets.join("girl.png"))
        }
    );
}

#[test]
fn prompt_sheets_from_catalog() {
    let site = site();
    let stories = picturebook::catalog::load_catalog(&site.catalog).unwrap();
    let out = site.stories.parent().unwrap().join("docs");
    write_prompt_sheets(&stories, &StudioConfig::default().prompts, &out).unwrap();

    let prompts = std::fs::read_to_string(out.join(PROMPTS_FILE)).unwrap();
    assert!(prompts.contains("## Goldilocks (ID: goldilocks)"));
    assert!(prompts.contains("Age: 4+, Category: fairy-tale"));
    assert!(prompts.contains("**File:** `/images/stories/goldilocks-2.png`"));

    let required = std::fs::read_to_string(out.join(REQUIRED_FILE)).unwrap();
    assert_eq!(required.matches("- [ ] ").count(), 3);
}
