//! CLI command handling

pub mod check_config;
pub mod forward;

use anyhow::{Context, Result};
use flowrelay_core::models::NotifierOptions;
use std::path::PathBuf;

/// Load notifier options from `path`, or from the default config location.
pub fn load_options(path: Option<PathBuf>) -> Result<(PathBuf, NotifierOptions)> {
    let path = match path {
        Some(path) => path,
        None => NotifierOptions::default_config_path()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to determine default config path")?,
    };
    let options = NotifierOptions::load_from_file(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    Ok((path, options))
}
