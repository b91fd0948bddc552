//! Centralized path definitions for ecotrack
//!
//! Single source of truth for every filesystem path the tool touches.
//!
//! ## Storage Layout
//!
//! ### Per-Project (working directory)
//!
//! ```text
//! survey/
//! ├── ecotrack.toml              # Project config (rules, report knobs)
//! └── .ecotrack/
//!     └── survey.json            # Dataset: surveyors, students, expenses, anomalies
//! ```
//!
//! ### Global (User-Level)
//!
//! ```text
//! $XDG_CONFIG_HOME/ecotrack/
//! └── config.toml                # Defaults shared by every project
//! ```

use std::path::{Path, PathBuf};

// =============================================================================
// Project-level paths
// =============================================================================

/// Directory name for local ecotrack state
pub const STATE_DIR: &str = ".ecotrack";

/// Project configuration filename
pub const PROJECT_TOML: &str = "ecotrack.toml";

/// Dataset filename
const DATASET_FILE: &str = "survey.json";

/// Get the project root directory.
#[must_use]
pub fn project_root() -> PathBuf {
    PathBuf::from(".")
}

/// Get path to `ecotrack.toml` in `root`.
#[must_use]
pub fn project_config(root: &Path) -> PathBuf {
    root.join(PROJECT_TOML)
}

/// Get path to the `.ecotrack/` state directory in `root`.
#[must_use]
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

/// Get path to the default dataset file in `root`.
///
/// Used unless `[store] path` or `--data` names another file.
#[must_use]
pub fn dataset(root: &Path) -> PathBuf {
    state_dir(root).join(DATASET_FILE)
}

// =============================================================================
// Global paths (user-level)
// =============================================================================

/// Global config directory name
const GLOBAL_DIR: &str = "ecotrack";

/// Global config filename
const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Get the global ecotrack directory.
///
/// Returns `<config dir>/ecotrack/`, e.g. `~/.config/ecotrack/` on Linux.
#[must_use]
pub fn global_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config")).join(GLOBAL_DIR)
}

/// Get the global config file path.
#[must_use]
pub fn global_config() -> PathBuf {
    global_config_dir().join(GLOBAL_CONFIG_FILE)
}
