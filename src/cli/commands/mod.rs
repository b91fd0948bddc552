//! Command implementations

mod anomaly;
mod expense;
mod init;
mod report;
mod student;
mod surveyor;

use std::path::PathBuf;

use anyhow::Context as _;

use ecotrack::adapters::LocalStore;
use ecotrack::config::Config;
use ecotrack::core::models::Surveyor;
use ecotrack::core::services::{RuleCatalog, resolve_surveyor};
use ecotrack::output::OutputMode;
use ecotrack::paths;

pub use anomaly::anomaly;
pub use expense::expense;
pub use init::init;
pub use report::{compare, dashboard};
pub use student::student;
pub use surveyor::surveyor;

/// Everything a command needs: configuration, store and output mode
#[derive(Debug)]
pub struct Context {
    /// Project root
    pub root: PathBuf,
    /// Effective configuration
    pub config: Config,
    /// Dataset store
    pub store: LocalStore,
    /// How to print results
    pub mode: OutputMode,
    surveyor_key: Option<String>,
}

impl Context {
    /// Load configuration and open the dataset
    pub fn open(
        data: Option<PathBuf>,
        surveyor_key: Option<String>,
        mode: OutputMode,
    ) -> anyhow::Result<Self> {
        let root = paths::project_root();
        let config = Config::load(&root)?;
        let dataset = data.unwrap_or_else(|| config.dataset_path(&root));
        log::debug!("using dataset {}", dataset.display());
        let store = LocalStore::open(&dataset)
            .with_context(|| format!("opening dataset {}", dataset.display()))?;

        Ok(Self {
            root,
            config,
            store,
            mode,
            surveyor_key,
        })
    }

    /// The surveyor this command acts for
    pub fn surveyor(&self) -> anyhow::Result<Surveyor> {
        let key = self
            .surveyor_key
            .as_deref()
            .or(self.config.survey.default_surveyor.as_deref())
            .context(
                "no surveyor selected; pass --surveyor or set [survey] default_surveyor in \
                 ecotrack.toml",
            )?;
        Ok(resolve_surveyor(&self.store, key)?)
    }

    /// Rule catalog with configured overrides
    pub fn catalog(&self) -> anyhow::Result<RuleCatalog> {
        Ok(self.config.rule_catalog()?)
    }
}
