//! Assembles a [`FilterEngine`] from catalog, category, and taxonomy files.

use std::path::Path;

use stonemart_core::{load_categories, load_listings, load_taxonomy, AppConfig, CountMode};

use crate::engine::FilterEngine;
use crate::error::LoadError;
use crate::taxonomy::LocationTaxonomy;

#[derive(Debug, Clone, Copy)]
pub struct CatalogPaths<'a> {
    pub listings: &'a Path,
    pub categories: Option<&'a Path>,
    /// `None` selects the built-in South African table.
    pub taxonomy: Option<&'a Path>,
}

impl<'a> CatalogPaths<'a> {
    #[must_use]
    pub fn from_config(config: &'a AppConfig) -> Self {
        Self {
            listings: &config.catalog_path,
            categories: config.categories_path.as_deref(),
            taxonomy: config.taxonomy_path.as_deref(),
        }
    }
}

/// Loads and validates every input, then builds the engine.
///
/// # Errors
///
/// Returns [`LoadError`] when any file cannot be read, parsed, or validated.
pub fn load_engine(paths: CatalogPaths<'_>, count_mode: CountMode) -> Result<FilterEngine, LoadError> {
    let listings = load_listings(paths.listings)?;
    let categories = match paths.categories {
        Some(path) => load_categories(path)?,
        None => Vec::new(),
    };
    let taxonomy = match paths.taxonomy {
        Some(path) => {
            let file = load_taxonomy(path)?;
            tracing::info!(path = %path.display(), provinces = file.provinces.len(), "loaded taxonomy");
            LocationTaxonomy::from_file(&file)
        }
        None => LocationTaxonomy::south_africa(),
    };

    Ok(FilterEngine::new(listings, categories, taxonomy).with_count_mode(count_mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "stonemart-loader-{}-{name}",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        path
    }

    #[test]
    fn loads_catalog_with_builtin_taxonomy() {
        let listings = write_temp(
            "listings.json",
            r#"[{"id":"1","title":"Angel","company":{"location":"Sandton, GP"}}]"#,
        );
        let categories = write_temp("categories.json", r#"[{"name":"Headstones"}]"#);
        let engine = load_engine(
            CatalogPaths {
                listings: &listings,
                categories: Some(&categories),
                taxonomy: None,
            },
            CountMode::CrossFiltered,
        )
        .expect("engine loads");

        assert_eq!(engine.listings().len(), 1);
        assert_eq!(engine.categories().len(), 1);
        assert_eq!(engine.count_mode(), CountMode::CrossFiltered);
        assert_eq!(engine.taxonomy().canonical_province("gp"), Some("Gauteng"));
    }

    #[test]
    fn loads_custom_taxonomy() {
        let listings = write_temp("custom-listings.json", "[]");
        let taxonomy = write_temp(
            "taxonomy.yaml",
            "provinces:\n  - name: Otjozondjupa\n    abbreviations: [OD]\n",
        );
        let engine = load_engine(
            CatalogPaths {
                listings: &listings,
                categories: None,
                taxonomy: Some(&taxonomy),
            },
            CountMode::Independent,
        )
        .expect("engine loads");
        assert_eq!(engine.taxonomy().province_names().collect::<Vec<_>>(), vec!["Otjozondjupa"]);
    }

    #[test]
    fn duplicate_listing_ids_fail_to_load() {
        let listings = write_temp("dupes.json", r#"[{"id":"1"},{"id":"1"}]"#);
        let err = load_engine(
            CatalogPaths {
                listings: &listings,
                categories: None,
                taxonomy: None,
            },
            CountMode::Independent,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Catalog(_)));
    }

    #[test]
    fn invalid_taxonomy_fails_to_load() {
        let listings = write_temp("ok.json", "[]");
        let taxonomy = write_temp(
            "bad-taxonomy.yaml",
            "provinces:\n  - name: Alpha\n    abbreviations: [AB]\n  - name: Beta\n    abbreviations: [ab]\n",
        );
        let err = load_engine(
            CatalogPaths {
                listings: &listings,
                categories: None,
                taxonomy: Some(&taxonomy),
            },
            CountMode::Independent,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Taxonomy(_)));
    }
}
