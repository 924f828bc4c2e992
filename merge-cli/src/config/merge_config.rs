//! Runtime configuration loaded from defaults + environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use image_merge::{MergeLayout, RenderFailurePolicy, Size};

use super::defaults::get_default;
use super::validation::validate_setting;

/// Settings shared by every merge of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    pub layout: MergeLayout,
    pub canvas: Size,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub render_failure: RenderFailurePolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            layout: MergeLayout::FourGrid,
            canvas: Size::new(400, 400),
            output_dir: PathBuf::from("."),
            fetch_timeout: Duration::from_secs(30),
            render_failure: RenderFailurePolicy::Fail,
        }
    }
}

impl MergeConfig {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration, reading overrides through `lookup`.
    ///
    /// Unset or empty values fall back to the defaults; set values must pass
    /// validation.
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> Result<String, anyhow::Error> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(value) => {
                    validate_setting(key, &value)
                        .map_err(|e| anyhow!("validation error for {key}: {e}"))?;
                    Ok(value)
                }
                None => get_default(key)
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("setting not found: {key}")),
            }
        };

        let layout = g("MERGE_LAYOUT")?.parse::<MergeLayout>()?;
        let width = g("MERGE_WIDTH")?.parse::<u32>().context("MERGE_WIDTH")?;
        let height = g("MERGE_HEIGHT")?.parse::<u32>().context("MERGE_HEIGHT")?;
        let timeout = g("MERGE_FETCH_TIMEOUT_SECS")?
            .parse::<u64>()
            .context("MERGE_FETCH_TIMEOUT_SECS")?;

        Ok(Self {
            layout,
            canvas: Size::new(width, height),
            output_dir: PathBuf::from(g("MERGE_OUTPUT_DIR")?),
            fetch_timeout: Duration::from_secs(timeout),
            render_failure: render_failure_policy(g("MERGE_RENDER_FALLBACK")? == "true"),
        })
    }
}

pub fn render_failure_policy(fallback: bool) -> RenderFailurePolicy {
    if fallback {
        RenderFailurePolicy::PassThrough
    } else {
        RenderFailurePolicy::Fail
    }
}
