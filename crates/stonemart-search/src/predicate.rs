//! Compiles a [`FacetSelection`] into one composite predicate over listings.
//!
//! Clauses are ANDed. Within a multi-select facet the selected values are
//! ORed. Unconstrained facets contribute no clause, so the empty selection
//! compiles to a predicate that accepts every listing.

use rust_decimal::Decimal;
use stonemart_core::{DetailField, Listing};

use crate::facet::Facet;
use crate::price::parse_price_bound;
use crate::selection::{is_unconstrained_value, FacetSelection, FacetValue};
use crate::taxonomy::{LocationMatcher, LocationTaxonomy};

#[derive(Debug, Clone)]
enum Clause {
    /// Lowercased needle matched against title or company name.
    Text(String),
    /// Lowercased category name, compared for equality. Used for both the
    /// `category` facet and the active tab.
    Category(String),
    /// Any of the lowercased needles occurs in the first detail entry.
    Detail {
        field: DetailField,
        needles: Vec<String>,
    },
    Location(Vec<LocationMatcher>),
    MinPrice(Decimal),
    MaxPrice(Decimal),
}

impl Clause {
    fn matches(&self, listing: &Listing) -> bool {
        match self {
            Clause::Text(needle) => {
                contains_folded(&listing.title, needle)
                    || listing
                        .company_name()
                        .is_some_and(|name| contains_folded(name, needle))
            }
            Clause::Category(name) => listing
                .category_name()
                .is_some_and(|category| category.trim().to_lowercase() == *name),
            Clause::Detail { field, needles } => {
                listing.primary_detail(*field).is_some_and(|value| {
                    let value = value.to_lowercase();
                    needles.iter().any(|needle| value.contains(needle.as_str()))
                })
            }
            Clause::Location(matchers) => listing
                .company_location()
                .is_some_and(|location| matchers.iter().any(|m| m.matches(location))),
            Clause::MinPrice(bound) => listing.price.is_some_and(|price| price >= *bound),
            Clause::MaxPrice(bound) => listing.price.is_some_and(|price| price <= *bound),
        }
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Builds the clause for one facet holding the given values. Returns `None`
/// when the values impose no constraint.
fn clause_for<'a, I>(facet: Facet, values: I, taxonomy: &LocationTaxonomy) -> Option<Clause>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = values
        .into_iter()
        .filter(|v| !is_unconstrained_value(v))
        .map(str::trim)
        .peekable();
    values.peek()?;

    match facet {
        Facet::Search => values.next().map(|v| Clause::Text(v.to_lowercase())),
        Facet::Category | Facet::Tab => values.next().map(|v| Clause::Category(v.to_lowercase())),
        Facet::MinPrice => values.next().and_then(parse_price_bound).map(Clause::MinPrice),
        Facet::MaxPrice => values.next().and_then(parse_price_bound).map(Clause::MaxPrice),
        Facet::Location => Some(Clause::Location(
            values.map(|v| taxonomy.matcher(v)).collect(),
        )),
        Facet::Colour | Facet::Style | Facet::SlabStyle | Facet::StoneType | Facet::Custom => {
            let field = facet.detail_field()?;
            Some(Clause::Detail {
                field,
                needles: values.map(str::to_lowercase).collect(),
            })
        }
    }
}

/// A compiled, reusable listing predicate.
#[derive(Debug, Clone, Default)]
pub struct ListingPredicate {
    clauses: Vec<Clause>,
}

impl ListingPredicate {
    /// The predicate that accepts every listing.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn compile(selection: &FacetSelection, taxonomy: &LocationTaxonomy) -> Self {
        Self::compile_except(selection, taxonomy, None)
    }

    /// Compiles every active facet except `skip`. Used for cross-filtered
    /// option counts.
    #[must_use]
    pub fn compile_except(
        selection: &FacetSelection,
        taxonomy: &LocationTaxonomy,
        skip: Option<Facet>,
    ) -> Self {
        let clauses = selection
            .active()
            .filter(|(facet, _)| Some(*facet) != skip)
            .filter_map(|(facet, value)| match value {
                FacetValue::Single(v) => clause_for(facet, [v.as_str()], taxonomy),
                FacetValue::Multi(vs) => clause_for(facet, vs.iter().map(String::as_str), taxonomy),
            })
            .collect();
        Self { clauses }
    }

    /// Predicate for a single candidate option of one facet, ignoring every
    /// other facet.
    #[must_use]
    pub fn option(facet: Facet, value: &str, taxonomy: &LocationTaxonomy) -> Self {
        Self {
            clauses: clause_for(facet, [value], taxonomy).into_iter().collect(),
        }
    }

    /// Conjunction of two predicates.
    #[must_use]
    pub fn and(mut self, other: ListingPredicate) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        self.clauses.iter().all(|clause| clause.matches(listing))
    }
}
