pub mod app_config;
pub mod catalog;
pub mod config;
pub mod listing;
pub mod taxonomy;

pub use app_config::{AppConfig, CountMode, Environment};
pub use catalog::{load_categories, load_listings, parse_categories, parse_listings};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{
    Branch, BranchListing, Category, Company, DetailEntry, DetailField, Listing, ListingCategory,
    ProductDetails,
};
pub use taxonomy::{
    load_taxonomy, normalize_key, validate_taxonomy, CityConfig, ProvinceConfig, TaxonomyFile,
    TownConfig,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read taxonomy file {path}: {source}")]
    TaxonomyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy file: {0}")]
    TaxonomyFileParse(#[from] serde_yaml::Error),

    #[error("taxonomy validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
