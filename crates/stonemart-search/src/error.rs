use thiserror::Error;

use crate::facet::{Facet, FacetKind};

/// Programmer-misuse errors raised by the selection mutators.
///
/// Data problems (bad prices, unknown values, missing fields) never surface
/// here; they degrade to "unconstrained" or "no match" instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("unknown facet name: \"{0}\"")]
    UnknownFacet(String),

    #[error("facet {facet} is {actual}, cannot be used as {expected}")]
    WrongFacetKind {
        facet: Facet,
        expected: FacetKind,
        actual: FacetKind,
    },
}

/// Failure to assemble an engine from files on disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Catalog(#[from] stonemart_core::CatalogError),

    #[error(transparent)]
    Taxonomy(#[from] stonemart_core::ConfigError),
}
