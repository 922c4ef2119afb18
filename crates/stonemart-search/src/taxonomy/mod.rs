//! Province / city / town taxonomy with province synonym resolution.
//!
//! Listings carry a free-form `company.location` string such as
//! `"123 Main Rd, Johannesburg, Gauteng"`. A selected location facet value is
//! resolved to its surface forms (full name plus abbreviations) and matches a
//! listing when any form occurs in the normalized location string.
//!
//! Full names and multi-word synonyms match as substrings. Single-token
//! abbreviations (`GP`, `EC`, `KZN`) must appear as a whole token, so `ec`
//! does not match inside `"Secunda"`.

mod za;

use std::collections::HashMap;

use serde::Serialize;
use stonemart_core::{normalize_key, Listing, TaxonomyFile};

/// One node of the location tree with a materialized listing count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationNode {
    pub name: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LocationNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SurfaceForm {
    text: String,
    whole_word: bool,
}

impl SurfaceForm {
    fn occurs_in(&self, haystack: &str) -> bool {
        if self.whole_word {
            haystack
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == self.text)
        } else {
            haystack.contains(self.text.as_str())
        }
    }
}

/// Pre-resolved matcher for one selected location value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMatcher {
    /// Empty means unconstrained.
    forms: Vec<SurfaceForm>,
}

impl LocationMatcher {
    #[must_use]
    pub fn matches(&self, location: &str) -> bool {
        if self.forms.is_empty() {
            return true;
        }
        let haystack = normalize_key(location);
        self.forms.iter().any(|form| form.occurs_in(&haystack))
    }
}

#[derive(Debug, Clone)]
struct Province {
    config: stonemart_core::ProvinceConfig,
    forms: Vec<SurfaceForm>,
}

#[derive(Debug, Clone)]
pub struct LocationTaxonomy {
    provinces: Vec<Province>,
    /// Normalized surface form to province index.
    index: HashMap<String, usize>,
}

impl Default for LocationTaxonomy {
    fn default() -> Self {
        Self::south_africa()
    }
}

impl LocationTaxonomy {
    /// The built-in South African table.
    #[must_use]
    pub fn south_africa() -> Self {
        Self::from_file(&za::south_africa())
    }

    /// Builds a taxonomy from a (validated) taxonomy file. If two provinces
    /// claim the same surface form, the first one keeps it.
    #[must_use]
    pub fn from_file(file: &TaxonomyFile) -> Self {
        let mut provinces = Vec::with_capacity(file.provinces.len());
        let mut index = HashMap::new();

        for config in &file.provinces {
            let key = normalize_key(&config.name);
            if key.is_empty() {
                continue;
            }

            let mut forms = vec![SurfaceForm {
                text: key,
                whole_word: false,
            }];
            for abbreviation in &config.abbreviations {
                let text = normalize_key(abbreviation);
                if text.is_empty() || forms.iter().any(|f| f.text == text) {
                    continue;
                }
                let whole_word = !text.contains(' ');
                forms.push(SurfaceForm { text, whole_word });
            }

            let position = provinces.len();
            for form in &forms {
                index.entry(form.text.clone()).or_insert(position);
            }
            provinces.push(Province {
                config: config.clone(),
                forms,
            });
        }

        Self { provinces, index }
    }

    /// Lowercase, trimmed, whitespace-collapsed lookup key.
    #[must_use]
    pub fn normalize(name: &str) -> String {
        normalize_key(name)
    }

    /// Canonical name followed by abbreviation forms, all normalized, for
    /// any surface form of a known province. Unknown keys resolve to
    /// themselves.
    #[must_use]
    pub fn resolve_synonyms(&self, key: &str) -> Vec<String> {
        let key = normalize_key(key);
        match self.index.get(&key) {
            Some(&position) => self.provinces[position]
                .forms
                .iter()
                .map(|f| f.text.clone())
                .collect(),
            None => vec![key],
        }
    }

    /// Canonical province name for any of its surface forms.
    #[must_use]
    pub fn canonical_province(&self, value: &str) -> Option<&str> {
        self.index
            .get(&normalize_key(value))
            .map(|&position| self.provinces[position].config.name.as_str())
    }

    pub fn province_names(&self) -> impl Iterator<Item = &str> {
        self.provinces.iter().map(|p| p.config.name.as_str())
    }

    /// Resolves `selected` once so it can be tested against many locations.
    #[must_use]
    pub fn matcher(&self, selected: &str) -> LocationMatcher {
        if crate::selection::is_unconstrained_value(selected) {
            return LocationMatcher { forms: Vec::new() };
        }

        let key = normalize_key(selected);
        let forms = match self.index.get(&key) {
            Some(&position) => self.provinces[position].forms.clone(),
            None => vec![SurfaceForm {
                text: key,
                whole_word: false,
            }],
        };
        LocationMatcher { forms }
    }

    /// `true` when `location` matches the selected province, city, or town.
    /// An empty or `"Any"` selection always matches.
    #[must_use]
    pub fn matches(&self, location: &str, selected: &str) -> bool {
        self.matcher(selected).matches(location)
    }

    /// Number of catalog listings whose company location matches `node`,
    /// independent of any other active facet.
    #[must_use]
    pub fn count_for_node(&self, node: &LocationNode, catalog: &[Listing]) -> usize {
        let matcher = self.matcher(&node.name);
        catalog
            .iter()
            .filter(|listing| {
                listing
                    .company_location()
                    .is_some_and(|location| matcher.matches(location))
            })
            .count()
    }

    /// The full province / city / town tree with counts materialized from
    /// `catalog`.
    #[must_use]
    pub fn tree(&self, catalog: &[Listing]) -> Vec<LocationNode> {
        let with_count = |mut node: LocationNode| {
            node.count = self.count_for_node(&node, catalog);
            node
        };

        self.provinces
            .iter()
            .map(|province| {
                let cities = province
                    .config
                    .cities
                    .iter()
                    .map(|city| {
                        let towns = city
                            .towns
                            .iter()
                            .map(|town| {
                                with_count(LocationNode {
                                    name: town.name.clone(),
                                    count: 0,
                                    lat: town.lat,
                                    lng: town.lng,
                                    children: Vec::new(),
                                })
                            })
                            .collect();
                        with_count(LocationNode {
                            name: city.name.clone(),
                            count: 0,
                            lat: city.lat,
                            lng: city.lng,
                            children: towns,
                        })
                    })
                    .collect();
                with_count(LocationNode {
                    name: province.config.name.clone(),
                    count: 0,
                    lat: province.config.lat,
                    lng: province.config.lng,
                    children: cities,
                })
            })
            .collect()
    }
}
