pub mod debounce;
pub mod engine;
pub mod error;
pub mod facet;
pub mod geo;
pub mod loader;
pub mod predicate;
pub mod price;
pub mod selection;
pub mod session;
pub mod sort;
pub mod taxonomy;
pub mod url_sync;

pub use debounce::Debouncer;
pub use engine::{FacetVocabulary, FilterEngine, OptionCounts, SearchOutcome};
pub use error::{LoadError, SearchError};
pub use facet::{Facet, FacetKind};
pub use geo::{distance_km, haversine_km, GeoPoint};
pub use loader::{load_engine, CatalogPaths};
pub use predicate::ListingPredicate;
pub use price::{format_currency, parse_price_bound};
pub use selection::{FacetSelection, FacetValue};
pub use session::{SearchSession, SettledText};
pub use sort::{sort_listings, SortKey};
pub use taxonomy::{LocationMatcher, LocationNode, LocationTaxonomy};
pub use url_sync::{encode_component, extra_param, parse_query, UrlCodec, HOST_PARAMS};
