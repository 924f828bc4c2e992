//! Command-line driver: fetch images, merge them into a collage, write PNGs.
//!
//! Settings come from defaults, then `.env` / environment variables, then
//! command-line flags.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::MergeConfig;
use config::defaults::DEFAULT_SETTINGS;
use config::merge_config::render_failure_policy;
use config::validation::validate_setting;
use image_merge::{MergeLayout, Size};

/// Merge images (local paths or http(s) URLs) into one collage.
#[derive(Parser, Debug)]
#[command(name = "merge-cli", version)]
struct Args {
    /// Layout name, e.g. `four-grid`, `FourGrid` or `Merge4S`.
    #[arg(long, short)]
    layout: Option<MergeLayout>,

    /// Canvas width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Output file (single-layout mode only).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Directory for generated files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// File name prefix for generated files.
    #[arg(long, default_value = "merged")]
    prefix: String,

    /// Use every file in this directory as an input, sorted by name.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Render every layout instead of one.
    #[arg(long)]
    all: bool,

    /// Per-image fetch timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Draw unscaled sources instead of failing when rendering fails.
    #[arg(long)]
    render_fallback: bool,

    /// Print the layout catalog and settings, then exit.
    #[arg(long)]
    list: bool,

    /// Images to merge, in cell order.
    inputs: Vec<String>,
}

impl Args {
    /// Command-line flags take precedence over environment settings and are
    /// held to the same validation rules.
    fn apply(&self, mut config: MergeConfig) -> anyhow::Result<MergeConfig> {
        let check = |key: &str, value: String| {
            validate_setting(key, &value).map_err(|e| anyhow!("invalid value for {key}: {e}"))
        };

        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(width) = self.width {
            check("MERGE_WIDTH", width.to_string())?;
            config.canvas.width = width;
        }
        if let Some(height) = self.height {
            check("MERGE_HEIGHT", height.to_string())?;
            config.canvas.height = height;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(secs) = self.timeout {
            check("MERGE_FETCH_TIMEOUT_SECS", secs.to_string())?;
            config.fetch_timeout = std::time::Duration::from_secs(secs);
        }
        if self.render_fallback {
            config.render_failure = render_failure_policy(true);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.list {
        print_catalog();
        return Ok(());
    }

    let config = args.apply(MergeConfig::from_env()?)?;
    tracing::debug!(?config, "Configuration loaded");

    let mut inputs = args.inputs.clone();
    if let Some(dir) = &args.dir {
        inputs.extend(pipeline::list_dir(dir).await?);
    }
    if inputs.is_empty() {
        anyhow::bail!("no input images given");
    }

    let job = pipeline::Job {
        inputs,
        layouts: if args.all {
            MergeLayout::ALL.to_vec()
        } else {
            vec![config.layout]
        },
        output: if args.all { None } else { args.output.clone() },
        prefix: args.prefix.clone(),
    };
    let written = pipeline::run(&config, job).await?;
    tracing::info!(files = written.len(), "Done");
    Ok(())
}

fn print_catalog() {
    println!("Layouts:");
    for layout in MergeLayout::ALL {
        println!(
            "  {:<18} {:<11} {} images",
            layout.name(),
            layout.legacy_tag(),
            layout.required_images()
        );
    }

    println!("Settings:");
    let mut defs: Vec<_> = DEFAULT_SETTINGS.values().collect();
    defs.sort_by_key(|d| d.key);
    for def in defs {
        println!("  {:<26} {:<10} {}", def.key, def.default, def.description);
    }
}
