//! Layered configuration
//!
//! Settings come from two TOML files, the later overriding the earlier key by
//! key:
//!
//! 1. the global file, `<config dir>/ecotrack/config.toml`
//! 2. the project file, `ecotrack.toml`
//!
//! Every field has a default, so both files are optional.
//!
//! ```toml
//! [survey]
//! default_surveyor = "USER001"
//!
//! [store]
//! path = ".ecotrack/survey.json"
//!
//! [report]
//! trailing_days = 7
//! recent_anomalies = 5
//! top_districts = 10
//!
//! [rules.categories.housing]
//! max = 60000
//!
//! [rules.levels.bachelor-1]
//! min_age = 17
//! max_age = 25
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{SurveyError, SurveyResult};
use crate::core::models::{EducationLevel, ExpenseCategory};
use crate::core::services::{AgeBand, AmountBand, ReportOptions, RuleCatalog};
use crate::paths;

/// Effective ecotrack configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Survey defaults
    #[serde(default)]
    pub survey: SurveyConfig,
    /// Dataset location
    #[serde(default)]
    pub store: StoreConfig,
    /// Dashboard knobs
    #[serde(default)]
    pub report: ReportConfig,
    /// Rule catalog overrides
    #[serde(default)]
    pub rules: RulesConfig,
}

/// `[survey]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Surveyor used when `--surveyor` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_surveyor: Option<String>,
}

/// `[store]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Dataset file, relative to the project root unless absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// `[report]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Length of the daily series
    #[serde(default = "default_trailing_days")]
    pub trailing_days: u32,
    /// Recent anomalies shown on the dashboard
    #[serde(default = "default_recent_anomalies")]
    pub recent_anomalies: usize,
    /// Districts ranked on the dashboard
    #[serde(default = "default_top_districts")]
    pub top_districts: usize,
}

const fn default_trailing_days() -> u32 {
    7
}

const fn default_recent_anomalies() -> usize {
    5
}

const fn default_top_districts() -> usize {
    10
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            trailing_days: default_trailing_days(),
            recent_anomalies: default_recent_anomalies(),
            top_districts: default_top_districts(),
        }
    }
}

/// `[rules]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Amount bands keyed by category code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, BandOverride>,
    /// Age bands keyed by level code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<String, AgeOverride>,
    /// Band for categories without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<BandOverride>,
}

/// Partial amount band; missing bounds keep the built-in value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandOverride {
    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Partial age band; missing bounds keep the built-in value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeOverride {
    /// Youngest expected age
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    /// Oldest expected age
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
}

impl BandOverride {
    fn apply(self, base: AmountBand, what: &str) -> SurveyResult<AmountBand> {
        let band = AmountBand::new(self.min.unwrap_or(base.min), self.max.unwrap_or(base.max));
        if !(band.min.is_finite() && band.max.is_finite()) || band.min < 0.0 || band.min > band.max
        {
            return Err(SurveyError::Config(format!(
                "invalid amount band for {what}: min {} max {}",
                band.min, band.max
            )));
        }
        Ok(band)
    }
}

impl AgeOverride {
    fn apply(self, base: Option<AgeBand>, what: &str) -> SurveyResult<AgeBand> {
        let min_age = self.min_age.or(base.map(|b| b.min_age));
        let max_age = self.max_age.or(base.map(|b| b.max_age));
        let (Some(min_age), Some(max_age)) = (min_age, max_age) else {
            return Err(SurveyError::Config(format!(
                "age band for {what} needs both min_age and max_age"
            )));
        };
        if min_age > max_age {
            return Err(SurveyError::Config(format!(
                "invalid age band for {what}: min_age {min_age} max_age {max_age}"
            )));
        }
        Ok(AgeBand::new(min_age, max_age))
    }
}

impl Config {
    /// Load global then project configuration for `root`
    pub fn load(root: &Path) -> SurveyResult<Self> {
        Self::load_from(Some(&paths::global_config()), &paths::project_config(root))
    }

    /// Load from explicit files; later layers override earlier ones
    pub fn load_from(global: Option<&Path>, project: &Path) -> SurveyResult<Self> {
        let mut merged = toml::Table::new();
        for path in global.into_iter().chain(std::iter::once(project)) {
            if let Some(layer) = read_layer(path)? {
                merge(&mut merged, layer);
            }
        }
        toml::Value::Table(merged)
            .try_into::<Self>()
            .map_err(|e| SurveyError::Config(format!("invalid configuration: {e}")))
    }

    /// Parse a single TOML document
    pub fn parse(content: &str) -> SurveyResult<Self> {
        toml::from_str(content).map_err(|e| SurveyError::Config(e.to_string()))
    }

    /// Write this configuration as TOML
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Dataset file for a project rooted at `root`
    #[must_use]
    pub fn dataset_path(&self, root: &Path) -> PathBuf {
        self.store.path.as_ref().map_or_else(|| paths::dataset(root), |p| root.join(p))
    }

    /// Dashboard knobs
    #[must_use]
    pub const fn report_options(&self) -> ReportOptions {
        ReportOptions {
            trailing_days: self.report.trailing_days,
            recent_anomalies: self.report.recent_anomalies,
            top_districts: self.report.top_districts,
        }
    }

    /// Built-in catalog with the `[rules]` overrides applied
    pub fn rule_catalog(&self) -> SurveyResult<RuleCatalog> {
        let mut catalog = RuleCatalog::standard();

        if let Some(fallback) = self.rules.fallback {
            let band = fallback.apply(catalog.fallback(), "fallback")?;
            catalog = catalog.with_fallback(band);
        }

        for (code, band) in &self.rules.categories {
            let category: ExpenseCategory = code
                .parse()
                .map_err(|e| SurveyError::Config(format!("[rules.categories]: {e}")))?;
            let band = band.apply(catalog.amount_band(category), code)?;
            catalog = catalog.with_amount_band(category, band);
        }

        for (code, band) in &self.rules.levels {
            let level: EducationLevel =
                code.parse().map_err(|e| SurveyError::Config(format!("[rules.levels]: {e}")))?;
            let band = band.apply(catalog.age_band(level), code)?;
            catalog = catalog.with_age_band(level, band);
        }

        Ok(catalog)
    }
}

fn read_layer(path: &Path) -> SurveyResult<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("skipping unreadable config {}: {err}", path.display());
            return Ok(None);
        },
    };
    log::debug!("loading config layer {}", path.display());
    content
        .parse::<toml::Table>()
        .map(Some)
        .map_err(|e| SurveyError::Config(format!("{}: {e}", path.display())))
}

/// Merge `layer` into `base`, recursing into tables
fn merge(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge(existing, incoming);
            },
            (_, value) => {
                base.insert(key, value);
            },
        }
    }
}
