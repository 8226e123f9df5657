use clap::{Parser, Subcommand};
use picturebook::{catalog, config, convert, illustrate, output, prompts, sprites};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("PICTUREBOOK_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("PICTUREBOOK_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "picturebook")]
#[command(about = "Placeholder story illustrations and asset tools")]
#[command(long_about = "\
Placeholder story illustrations and asset tools

Paints a cover and one image per page for every story in a JSON catalog:
a patterned pastel background, a foreground animal picked by the story's
theme, and a caption card with the title or page text.

Layout:

  public/images/
  ├── animals/                     # Foreground assets (png, webp, svg)
  │   ├── bear.png                 # Keyword \"bear\"
  │   └── girl.png
  └── stories/                     # Output, never overwritten
      ├── goldilocks-cover.png
      ├── goldilocks-1.png
      └── ...

Existing images are skipped, so reruns only fill gaps. Pass --seed to
reproduce a previous run exactly.

Run 'picturebook gen-config' to generate a documented picturebook.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "picturebook.toml", global = true)]
    config: PathBuf,

    /// Base seed for all random choices
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Paint missing covers and page images for every story
    Illustrate {
        /// Foreground asset directory
        #[arg(long, default_value = "public/images/animals")]
        assets: PathBuf,
        /// Story catalog (JSON)
        #[arg(long, default_value = "stories.json")]
        catalog: PathBuf,
        /// Output directory for illustrations
        #[arg(long, default_value = "public/images/stories")]
        out: PathBuf,
    },
    /// Write image-generation prompt sheets for every story
    Prompts {
        /// Story catalog (JSON)
        #[arg(long, default_value = "stories.json")]
        catalog: PathBuf,
        /// Directory receiving the Markdown files
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Fit PNG sprites into squares with maximum compression
    OptimizeSprites {
        /// Directory with raw sprites
        #[arg(long, default_value = "src/resources/images/animals")]
        src: PathBuf,
        /// Directory receiving optimized sprites
        #[arg(long, default_value = "public/images/animals")]
        out: PathBuf,
        /// Square size in pixels (overrides the config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        size: Option<u32>,
    },
    /// Convert a file, or every file with an extension in a directory, to PNG
    ToPng {
        /// File or directory
        path: PathBuf,
        /// Extension to convert when PATH is a directory
        #[arg(long, default_value = "jfif")]
        ext: String,
    },
    /// Convert a PNG into a multi-size ICO
    Icon {
        /// Source image
        src: PathBuf,
        /// Destination .ico file
        dst: PathBuf,
        /// Square sizes, comma separated (overrides the config)
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<u32>,
    },
    /// Print a stock picturebook.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Illustrate {
            assets,
            catalog,
            out,
        } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let seed = illustrate::base_seed(cli.seed);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for progress in rx {
                    for line in output::format_story_progress(&progress) {
                        println!("{}", line);
                    }
                }
            });
            let result =
                illustrate::illustrate_catalog(&config, &assets, &catalog, &out, seed, Some(tx));
            join_printer(printer);
            output::print_batch_summary(&result?);
        }
        Command::Prompts { catalog, out } => {
            let config = config::load_config(&cli.config)?;
            let stories = catalog::load_or_empty(&catalog);
            let written = prompts::write_prompt_sheets(&stories, &config.prompts, &out)?;
            output::print_prompt_sheets(stories.len(), &written);
        }
        Command::OptimizeSprites { src, out, size } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let size = size.unwrap_or(config.sprites.size);
            let report = sprites::optimize_dir(&src, &out, size)?;
            output::print_sprite_report(&report);
        }
        Command::ToPng { path, ext } => {
            let results = if path.is_dir() {
                convert::convert_dir_to_png(&path, &ext)?
            } else {
                vec![convert_one(&path)]
            };
            output::print_conversions(&results);
        }
        Command::Icon { src, dst, sizes } => {
            let config = config::load_config(&cli.config)?;
            let sizes = if sizes.is_empty() {
                config.sprites.ico_sizes
            } else {
                sizes
            };
            convert::png_to_ico(&src, &dst, &sizes)?;
            println!("{} \u{2192} {}", src.display(), dst.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn join_printer(printer: std::thread::JoinHandle<()>) {
    if printer.join().is_err() {
        tracing::error!("progress printer panicked");
    }
}

fn convert_one(path: &Path) -> convert::Converted {
    let output = path.with_extension("png");
    let error = convert::convert_to_png(path, &output)
        .err()
        .map(|e| e.to_string());
    convert::Converted {
        source: path.to_path_buf(),
        output,
        error,
    }
}
