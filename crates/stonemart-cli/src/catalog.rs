//! Catalog file arguments shared by every subcommand.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use stonemart_core::CountMode;
use stonemart_search::{load_engine, CatalogPaths, FilterEngine};

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Listings JSON file
    #[arg(long, env = "STONEMART_CATALOG_PATH")]
    pub catalog: PathBuf,
    /// Categories JSON file
    #[arg(long, env = "STONEMART_CATEGORIES_PATH")]
    pub categories: Option<PathBuf>,
    /// Location taxonomy YAML file (defaults to the built-in South African table)
    #[arg(long, env = "STONEMART_TAXONOMY_PATH")]
    pub taxonomy: Option<PathBuf>,
    /// How option counts are computed: independent or cross-filtered
    #[arg(long, env = "STONEMART_COUNT_MODE", default_value = "independent")]
    pub count_mode: CountMode,
}

impl CatalogArgs {
    /// Loads and validates the catalog files into a shared engine.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read, parsed, or validated.
    pub(crate) fn load(&self) -> anyhow::Result<Arc<FilterEngine>> {
        let paths = CatalogPaths {
            listings: &self.catalog,
            categories: self.categories.as_deref(),
            taxonomy: self.taxonomy.as_deref(),
        };
        let engine = load_engine(paths, self.count_mode).map_err(|e| {
            anyhow::anyhow!("failed to load catalog {}: {e}", self.catalog.display())
        })?;
        Ok(Arc::new(engine))
    }
}
