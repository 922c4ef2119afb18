use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How facet option counts relate to the active selection.
///
/// `Independent` counts every option against the full catalog, ignoring the
/// other selected facets. `CrossFiltered` counts each facet's options against
/// the catalog filtered by all *other* active facets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    #[default]
    Independent,
    CrossFiltered,
}

impl std::fmt::Display for CountMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountMode::Independent => write!(f, "independent"),
            CountMode::CrossFiltered => write!(f, "cross-filtered"),
        }
    }
}

impl std::str::FromStr for CountMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(CountMode::Independent),
            "cross-filtered" | "cross_filtered" => Ok(CountMode::CrossFiltered),
            other => Err(format!(
                "expected 'independent' or 'cross-filtered', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub categories_path: Option<PathBuf>,
    pub taxonomy_path: Option<PathBuf>,
    pub count_mode: CountMode,
    pub rate_limit_per_minute: usize,
}
