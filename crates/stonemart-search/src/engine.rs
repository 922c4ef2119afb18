//! The filter engine: an immutable catalog plus everything derived from it.
//!
//! Built once per catalog and shared behind an `Arc` by every consumer.
//! Filtering and counting are pure functions of the engine and a
//! [`FacetSelection`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use stonemart_core::{normalize_key, Category, CountMode, Listing};

use crate::facet::Facet;
use crate::predicate::ListingPredicate;
use crate::selection::{FacetSelection, FacetValue};
use crate::sort::SortKey;
use crate::taxonomy::{LocationNode, LocationTaxonomy};

/// Per-facet, per-option listing counts.
pub type OptionCounts = BTreeMap<Facet, BTreeMap<String, usize>>;

/// Known candidate values for each counted facet.
///
/// Values are deduplicated case-insensitively; the first surface form seen
/// wins. Location values are province names, and every province surface
/// form (`"GP"`, `"gauteng"`) canonicalizes to the province name.
#[derive(Debug, Clone, Default)]
pub struct FacetVocabulary {
    options: BTreeMap<Facet, Vec<String>>,
    lookup: HashMap<Facet, HashMap<String, String>>,
}

impl FacetVocabulary {
    #[must_use]
    pub fn from_catalog(
        listings: &[Listing],
        categories: &[Category],
        taxonomy: &LocationTaxonomy,
    ) -> Self {
        let mut vocabulary = Self::default();

        for listing in listings {
            if let Some(name) = listing.category_name() {
                vocabulary.insert(Facet::Category, name);
            }
            for facet in Facet::COUNTED {
                if let Some(value) = facet.detail_field().and_then(|f| listing.primary_detail(f)) {
                    vocabulary.insert(facet, value);
                }
            }
        }
        for category in categories {
            vocabulary.insert(Facet::Category, &category.name);
        }
        for province in taxonomy.province_names() {
            vocabulary.insert(Facet::Location, province);
            for form in taxonomy.resolve_synonyms(province) {
                vocabulary.alias(Facet::Location, &form, province);
            }
        }

        vocabulary
    }

    fn insert(&mut self, facet: Facet, value: &str) {
        let value = value.trim();
        let key = normalize_key(value);
        if key.is_empty() {
            return;
        }
        let lookup = self.lookup.entry(facet).or_default();
        if lookup.contains_key(&key) {
            return;
        }
        lookup.insert(key, value.to_string());
        self.options.entry(facet).or_default().push(value.to_string());
    }

    fn alias(&mut self, facet: Facet, form: &str, canonical: &str) {
        self.lookup
            .entry(facet)
            .or_default()
            .entry(normalize_key(form))
            .or_insert_with(|| canonical.to_string());
    }

    /// Facet whose option list backs `facet`. The tab shares the category
    /// vocabulary.
    fn backing(facet: Facet) -> Facet {
        if facet == Facet::Tab {
            Facet::Category
        } else {
            facet
        }
    }

    /// `true` when values of `facet` are checked against this vocabulary.
    #[must_use]
    pub fn covers(facet: Facet) -> bool {
        Facet::COUNTED.contains(&Self::backing(facet))
    }

    /// Candidate options for `facet` in first-seen order.
    #[must_use]
    pub fn options(&self, facet: Facet) -> &[String] {
        self.options
            .get(&Self::backing(facet))
            .map_or(&[], Vec::as_slice)
    }

    /// The vocabulary's surface form for `value`, matched case-insensitively.
    #[must_use]
    pub fn canonical(&self, facet: Facet, value: &str) -> Option<&str> {
        self.lookup
            .get(&Self::backing(facet))?
            .get(&normalize_key(value))
            .map(String::as_str)
    }
}

/// Filtered, sorted catalog positions plus option counts for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Positions into [`FilterEngine::listings`].
    pub indices: Vec<usize>,
    pub option_counts: OptionCounts,
}

impl SearchOutcome {
    #[must_use]
    pub fn total(&self) -> usize {
        self.indices.len()
    }

    pub fn listings<'a>(&'a self, engine: &'a FilterEngine) -> impl Iterator<Item = &'a Listing> {
        self.indices.iter().filter_map(|&i| engine.listings().get(i))
    }
}

#[derive(Debug, Clone)]
pub struct FilterEngine {
    listings: Vec<Listing>,
    categories: Vec<Category>,
    taxonomy: LocationTaxonomy,
    vocabulary: FacetVocabulary,
    base_counts: OptionCounts,
    location_tree: Vec<LocationNode>,
    count_mode: CountMode,
}

impl FilterEngine {
    #[must_use]
    pub fn new(listings: Vec<Listing>, categories: Vec<Category>, taxonomy: LocationTaxonomy) -> Self {
        let vocabulary = FacetVocabulary::from_catalog(&listings, &categories, &taxonomy);
        let base_counts = Facet::COUNTED
            .into_iter()
            .map(|facet| {
                let counts = vocabulary
                    .options(facet)
                    .iter()
                    .map(|option| {
                        let predicate = ListingPredicate::option(facet, option, &taxonomy);
                        (option.clone(), count_where(&listings, &predicate))
                    })
                    .collect();
                (facet, counts)
            })
            .collect();
        let location_tree = taxonomy.tree(&listings);

        tracing::info!(
            listings = listings.len(),
            categories = categories.len(),
            "filter engine built"
        );

        Self {
            listings,
            categories,
            taxonomy,
            vocabulary,
            base_counts,
            location_tree,
            count_mode: CountMode::default(),
        }
    }

    #[must_use]
    pub fn with_count_mode(mut self, count_mode: CountMode) -> Self {
        self.count_mode = count_mode;
        self
    }

    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn taxonomy(&self) -> &LocationTaxonomy {
        &self.taxonomy
    }

    #[must_use]
    pub fn vocabulary(&self) -> &FacetVocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    #[must_use]
    pub fn compile(&self, selection: &FacetSelection) -> ListingPredicate {
        ListingPredicate::compile(selection, &self.taxonomy)
    }

    /// Catalog positions of matching listings, in catalog order.
    #[must_use]
    pub fn filter_indices(&self, selection: &FacetSelection) -> Vec<usize> {
        let predicate = self.compile(selection);
        if predicate.is_unconstrained() {
            return (0..self.listings.len()).collect();
        }
        self.listings
            .iter()
            .enumerate()
            .filter(|(_, listing)| predicate.matches(listing))
            .map(|(i, _)| i)
            .collect()
    }

    /// Matching listings in catalog order.
    #[must_use]
    pub fn filter(&self, selection: &FacetSelection) -> Vec<&Listing> {
        let predicate = self.compile(selection);
        self.listings.iter().filter(|l| predicate.matches(l)).collect()
    }

    #[must_use]
    pub fn count_matches(&self, selection: &FacetSelection) -> usize {
        count_where(&self.listings, &self.compile(selection))
    }

    /// Option counts for every counted facet.
    ///
    /// In [`CountMode::Independent`] each count is evaluated against the full
    /// catalog, so the precomputed table is returned unless the selection
    /// holds values the catalog never produced. In
    /// [`CountMode::CrossFiltered`] each facet is counted against the catalog
    /// filtered by every other active facet.
    #[must_use]
    pub fn option_counts(&self, selection: &FacetSelection) -> Cow<'_, OptionCounts> {
        match self.count_mode {
            CountMode::Independent => {
                let extra = self.unlisted_selected(selection);
                if extra.is_empty() {
                    return Cow::Borrowed(&self.base_counts);
                }
                let mut counts = self.base_counts.clone();
                for (facet, value) in extra {
                    let predicate = ListingPredicate::option(facet, &value, &self.taxonomy);
                    let count = count_where(&self.listings, &predicate);
                    counts.entry(facet).or_default().insert(value, count);
                }
                Cow::Owned(counts)
            }
            CountMode::CrossFiltered => Cow::Owned(self.cross_filtered_counts(selection)),
        }
    }

    fn cross_filtered_counts(&self, selection: &FacetSelection) -> OptionCounts {
        let extra = self.unlisted_selected(selection);
        Facet::COUNTED
            .into_iter()
            .map(|facet| {
                let others = ListingPredicate::compile_except(selection, &self.taxonomy, Some(facet));
                let scoped: Vec<&Listing> =
                    self.listings.iter().filter(|l| others.matches(l)).collect();
                let options = self
                    .vocabulary
                    .options(facet)
                    .iter()
                    .cloned()
                    .chain(extra.iter().filter(|(f, _)| *f == facet).map(|(_, v)| v.clone()));
                let counts = options
                    .map(|option| {
                        let predicate = ListingPredicate::option(facet, &option, &self.taxonomy);
                        let count = scoped.iter().filter(|l| predicate.matches(l)).count();
                        (option, count)
                    })
                    .collect();
                (facet, counts)
            })
            .collect()
    }

    /// Selected values of counted facets that the vocabulary does not know.
    fn unlisted_selected(&self, selection: &FacetSelection) -> Vec<(Facet, String)> {
        selection
            .active()
            .filter(|(facet, _)| Facet::COUNTED.contains(facet))
            .flat_map(|(facet, value)| {
                let values: Vec<&String> = match value {
                    FacetValue::Single(v) => vec![v],
                    FacetValue::Multi(vs) => vs.iter().collect(),
                };
                values
                    .into_iter()
                    .filter(move |v| self.vocabulary.canonical(facet, v).is_none())
                    .map(move |v| (facet, v.clone()))
            })
            .collect()
    }

    /// Filters, sorts, and counts in one pass over the selection.
    #[must_use]
    pub fn search(&self, selection: &FacetSelection, sort: Option<SortKey>) -> SearchOutcome {
        let mut matched: Vec<(usize, &Listing)> = self
            .filter_indices(selection)
            .into_iter()
            .filter_map(|i| self.listings.get(i).map(|l| (i, l)))
            .collect();
        if let Some(key) = sort {
            matched.sort_by(|(_, a), (_, b)| key.compare(a, b));
        }

        let option_counts = self.option_counts(selection).into_owned();
        tracing::debug!(
            matched = matched.len(),
            total = self.listings.len(),
            sort = sort.map(SortKey::slug),
            "search recomputed"
        );

        SearchOutcome {
            indices: matched.into_iter().map(|(i, _)| i).collect(),
            option_counts,
        }
    }

    /// The province / city / town tree with counts over the full catalog.
    #[must_use]
    pub fn location_tree(&self) -> &[LocationNode] {
        &self.location_tree
    }

    /// Lowest and highest listed price, if any listing has one.
    #[must_use]
    pub fn price_range(&self) -> Option<(Decimal, Decimal)> {
        self.listings
            .iter()
            .filter_map(|l| l.price)
            .fold(None, |range, price| match range {
                None => Some((price, price)),
                Some((lo, hi)) => Some((lo.min(price), hi.max(price))),
            })
    }
}

fn count_where(listings: &[Listing], predicate: &ListingPredicate) -> usize {
    listings.iter().filter(|l| predicate.matches(l)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stonemart_core::{Company, DetailEntry, ListingCategory, ProductDetails};

    fn listing(id: &str, stone: &str, category: &str, location: &str, price: i64) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Listing {id}"),
            price: Some(Decimal::from(price)),
            created_at: None,
            company: Some(Company {
                location: Some(location.to_string()),
                ..Company::default()
            }),
            listing_category: Some(ListingCategory {
                name: Some(category.to_string()),
            }),
            product_details: Some(ProductDetails {
                stone_type: vec![DetailEntry {
                    value: Some(stone.to_string()),
                }],
                ..ProductDetails::default()
            }),
            branches: vec![],
            branch_listings: vec![],
        }
    }

    fn engine() -> FilterEngine {
        FilterEngine::new(
            vec![
                listing("1", "Granite", "Headstones", "Johannesburg, Gauteng", 9_000),
                listing("2", "Marble", "Headstones", "Cape Town, Western Cape", 4_000),
                listing("3", "granite", "Tombstones", "Pretoria, GP", 12_000),
                listing("4", "Wood", "Plaques", "Durban, KZN", 1_500),
            ],
            vec![
                Category {
                    name: "Headstones".to_string(),
                },
                Category {
                    name: "Urns".to_string(),
                },
            ],
            LocationTaxonomy::south_africa(),
        )
    }

    #[test]
    fn vocabulary_dedupes_case_insensitively_keeping_first_form() {
        let engine = engine();
        assert_eq!(
            engine.vocabulary().options(Facet::StoneType),
            ["Granite", "Marble", "Wood"]
        );
        assert_eq!(
            engine.vocabulary().canonical(Facet::StoneType, "GRANITE"),
            Some("Granite")
        );
    }

    #[test]
    fn vocabulary_seeds_categories_from_category_list() {
        let engine = engine();
        let options = engine.vocabulary().options(Facet::Category);
        assert!(options.iter().any(|o| o == "Urns"));
        assert_eq!(engine.option_counts(&FacetSelection::new())[&Facet::Category]["Urns"], 0);
    }

    #[test]
    fn vocabulary_canonicalizes_province_abbreviations() {
        let engine = engine();
        assert_eq!(
            engine.vocabulary().canonical(Facet::Location, "kzn"),
            Some("KwaZulu-Natal")
        );
        assert_eq!(engine.vocabulary().canonical(Facet::Tab, "urns"), Some("Urns"));
    }

    #[test]
    fn empty_selection_returns_whole_catalog_in_order() {
        let engine = engine();
        assert_eq!(engine.filter_indices(&FacetSelection::new()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn independent_counts_ignore_active_selection() {
        let engine = engine();
        let selection = FacetSelection::new()
            .toggle_multi(Facet::Location, "Western Cape")
            .unwrap();
        let counts = engine.option_counts(&selection);
        assert!(matches!(counts, Cow::Borrowed(_)));
        assert_eq!(counts[&Facet::StoneType]["Granite"], 2);
        assert_eq!(counts[&Facet::Location]["Gauteng"], 2);
    }

    #[test]
    fn selected_value_outside_vocabulary_gets_a_count() {
        let engine = engine();
        let selection = FacetSelection::new()
            .toggle_multi(Facet::StoneType, "Sandstone")
            .unwrap();
        let counts = engine.option_counts(&selection);
        assert_eq!(counts[&Facet::StoneType]["Sandstone"], 0);
    }

    #[test]
    fn cross_filtered_counts_apply_other_facets() {
        let engine = engine().with_count_mode(CountMode::CrossFiltered);
        let selection = FacetSelection::new()
            .toggle_multi(Facet::Location, "Gauteng")
            .unwrap()
            .toggle_multi(Facet::StoneType, "Granite")
            .unwrap();
        let counts = engine.option_counts(&selection);
        assert_eq!(counts[&Facet::StoneType]["Granite"], 2);
        assert_eq!(counts[&Facet::StoneType]["Marble"], 0);
        // Location counts are scoped by stone type but not by location itself.
        assert_eq!(counts[&Facet::Location]["Gauteng"], 2);
        assert_eq!(counts[&Facet::Location]["Western Cape"], 0);
    }

    #[test]
    fn search_sorts_and_reports_catalog_positions() {
        let engine = engine();
        let outcome = engine.search(&FacetSelection::new(), Some(SortKey::Price));
        assert_eq!(outcome.indices, vec![3, 1, 0, 2]);
        let ids: Vec<&str> = outcome.listings(&engine).map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn count_matches_agrees_with_filter() {
        let engine = engine();
        let selection = FacetSelection::new()
            .set_single(Facet::Category, "Headstones")
            .unwrap();
        assert_eq!(engine.count_matches(&selection), engine.filter(&selection).len());
        assert_eq!(engine.count_matches(&selection), 2);
    }

    #[test]
    fn price_range_spans_catalog() {
        assert_eq!(
            engine().price_range(),
            Some((Decimal::from(1_500), Decimal::from(12_000)))
        );
        let empty = FilterEngine::new(vec![], vec![], LocationTaxonomy::south_africa());
        assert_eq!(empty.price_range(), None);
    }

    #[test]
    fn empty_catalog_yields_empty_results() {
        let empty = FilterEngine::new(vec![], vec![], LocationTaxonomy::south_africa());
        let selection = FacetSelection::new()
            .toggle_multi(Facet::Style, "Upright")
            .unwrap();
        let outcome = empty.search(&selection, Some(SortKey::Alphabetical));
        assert!(outcome.indices.is_empty());
    }

    #[test]
    fn location_tree_is_materialized_at_build() {
        let engine = engine();
        let gauteng = engine
            .location_tree()
            .iter()
            .find(|n| n.name == "Gauteng")
            .unwrap();
        assert_eq!(gauteng.count, 2);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FilterEngine>();
        assert_send_sync::<FacetSelection>();
        assert_send_sync::<LocationTaxonomy>();
    }
}
