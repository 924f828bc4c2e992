//! Fetch → decode → merge → write, for one or more layouts.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image_merge::{Compositor, MergeLayout, MergeOptions, Size};
use image_source::Fetcher;
use tracing::{info, warn};

use crate::config::MergeConfig;

/// One invocation's worth of work.
#[derive(Debug, Clone)]
pub struct Job {
    pub inputs: Vec<String>,
    pub layouts: Vec<MergeLayout>,
    /// Explicit output file; only honored for a single layout.
    pub output: Option<PathBuf>,
    pub prefix: String,
}

/// Run `job` and return the paths written.
///
/// With several layouts, layouts needing more images than were given are
/// skipped. With a single layout, that is an error.
pub async fn run(config: &MergeConfig, job: Job) -> anyhow::Result<Vec<PathBuf>> {
    let fetcher = Fetcher::new(config.fetch_timeout)?;
    let needed = job
        .layouts
        .iter()
        .map(|l| l.required_images())
        .max()
        .unwrap_or(0)
        .min(job.inputs.len());
    let payloads = fetcher
        .fetch_all(&job.inputs[..needed])
        .await
        .context("failed to fetch images")?;

    let compositor = Compositor::default()
        .with_options(MergeOptions::new().with_render_failure(config.render_failure));
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    let batch = job.layouts.len() > 1;
    let mut written = Vec::with_capacity(job.layouts.len());
    for layout in job.layouts {
        if batch && payloads.len() < layout.required_images() {
            warn!(
                %layout,
                required = layout.required_images(),
                provided = payloads.len(),
                "Skipping layout, not enough images"
            );
            continue;
        }

        let path = match (&job.output, batch) {
            (Some(path), false) => path.clone(),
            _ => output_path(&config.output_dir, &job.prefix, layout),
        };
        let bytes = merge_one(&compositor, &payloads, layout, config.canvas)
            .await
            .with_context(|| format!("failed to merge layout {layout}"))?;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(%layout, path = %path.display(), bytes = bytes.len(), "Wrote collage");
        written.push(path);
    }
    Ok(written)
}

/// Decode and merge off the async runtime.
async fn merge_one(
    compositor: &Compositor,
    payloads: &[Vec<u8>],
    layout: MergeLayout,
    canvas: Size,
) -> anyhow::Result<Vec<u8>> {
    let compositor = compositor.clone();
    let take = layout.required_images().min(payloads.len());
    let payloads = payloads[..take].to_vec();
    let bytes = tokio::task::spawn_blocking(move || {
        let images = compositor.decode_all(&payloads)?;
        compositor.merge(images, layout, canvas)
    })
    .await??;
    Ok(bytes)
}

/// `<dir>/<prefix>-<layout>.png`
pub fn output_path(dir: &Path, prefix: &str, layout: MergeLayout) -> PathBuf {
    dir.join(format!("{prefix}-{layout}.png"))
}

/// Regular files in `dir`, sorted by path.
pub async fn list_dir(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read {}", dir.display()))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect())
}
