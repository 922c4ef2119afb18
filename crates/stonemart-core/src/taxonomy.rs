use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A location table as stored in a taxonomy YAML file.
///
/// ```yaml
/// provinces:
///   - name: Gauteng
///     abbreviations: [GP]
///     lat: -26.27
///     lng: 28.11
///     cities:
///       - name: Johannesburg
///         towns:
///           - name: Sandton
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyFile {
    pub provinces: Vec<ProvinceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceConfig {
    pub name: String,
    #[serde(default)]
    pub abbreviations: Vec<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub cities: Vec<CityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub towns: Vec<TownConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownConfig {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Normalize a location name into a lookup key: lowercase, trimmed, with
/// internal whitespace runs collapsed to a single space.
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load and validate a location taxonomy from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_taxonomy(path: &Path) -> Result<TaxonomyFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TaxonomyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let taxonomy: TaxonomyFile = serde_yaml::from_str(&content)?;

    validate_taxonomy(&taxonomy)?;

    Ok(taxonomy)
}

/// Check that province names are present and unique and that every surface
/// form (name or abbreviation) identifies exactly one province.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first violation found.
pub fn validate_taxonomy(taxonomy: &TaxonomyFile) -> Result<(), ConfigError> {
    let mut seen_provinces = HashSet::new();
    let mut surface_owner: HashMap<String, &str> = HashMap::new();

    for province in &taxonomy.provinces {
        let key = normalize_key(&province.name);
        if key.is_empty() {
            return Err(ConfigError::Validation(
                "province name must be non-empty".to_string(),
            ));
        }

        if !seen_provinces.insert(key.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate province: '{}'",
                province.name
            )));
        }

        let forms = std::iter::once(key).chain(
            province
                .abbreviations
                .iter()
                .map(|a| normalize_key(a))
                .filter(|a| !a.is_empty()),
        );

        for form in forms {
            if let Some(owner) = surface_owner.get(&form) {
                if *owner != province.name {
                    return Err(ConfigError::Validation(format!(
                        "surface form '{form}' is claimed by both '{owner}' and '{}'",
                        province.name
                    )));
                }
            }
            surface_owner.insert(form, province.name.as_str());
        }

        for city in &province.cities {
            if city.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "province '{}' has a city with an empty name",
                    province.name
                )));
            }
        }
    }

    Ok(())
}
