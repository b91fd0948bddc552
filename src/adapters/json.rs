//! JSON dataset file
//!
//! The whole dataset lives in one pretty-printed JSON document,
//! `.ecotrack/survey.json` by default.

use std::fs;
use std::path::Path;

use anyhow::Context;

use super::local::Dataset;

/// Load a dataset file, or an empty dataset if the file does not exist
pub fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    if !path.exists() {
        log::debug!("no dataset at {}, starting empty", path.display());
        return Ok(Dataset::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut dataset: Dataset =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    dataset.reconcile_sequences();
    Ok(dataset)
}

/// Write a dataset file, creating parent directories as needed
pub fn save_dataset(path: &Path, dataset: &Dataset) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(dataset)?;
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
