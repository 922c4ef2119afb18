//! Facet identities and their mapping to listing fields and URL parameters.

use std::str::FromStr;

use serde::{Serialize, Serializer};
use stonemart_core::DetailField;

use crate::error::SearchError;

/// A named filterable dimension.
///
/// Declaration order is the canonical order used when serializing a
/// selection into a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Facet {
    Search,
    Category,
    Tab,
    Colour,
    Style,
    SlabStyle,
    StoneType,
    Custom,
    Location,
    MinPrice,
    MaxPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    Single,
    Multi,
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetKind::Single => write!(f, "single-select"),
            FacetKind::Multi => write!(f, "multi-select"),
        }
    }
}

impl Facet {
    pub const ALL: [Facet; 11] = [
        Facet::Search,
        Facet::Category,
        Facet::Tab,
        Facet::Colour,
        Facet::Style,
        Facet::SlabStyle,
        Facet::StoneType,
        Facet::Custom,
        Facet::Location,
        Facet::MinPrice,
        Facet::MaxPrice,
    ];

    /// Facets that get per-option counts.
    pub const COUNTED: [Facet; 7] = [
        Facet::Category,
        Facet::Colour,
        Facet::Style,
        Facet::SlabStyle,
        Facet::StoneType,
        Facet::Custom,
        Facet::Location,
    ];

    #[must_use]
    pub fn kind(self) -> FacetKind {
        match self {
            Facet::Search | Facet::Category | Facet::Tab | Facet::MinPrice | Facet::MaxPrice => {
                FacetKind::Single
            }
            Facet::Colour
            | Facet::Style
            | Facet::SlabStyle
            | Facet::StoneType
            | Facet::Custom
            | Facet::Location => FacetKind::Multi,
        }
    }

    /// Canonical facet name used in API payloads and error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Facet::Search => "search",
            Facet::Category => "category",
            Facet::Tab => "tab",
            Facet::Colour => "colour",
            Facet::Style => "style",
            Facet::SlabStyle => "slabStyle",
            Facet::StoneType => "stoneType",
            Facet::Custom => "custom",
            Facet::Location => "location",
            Facet::MinPrice => "minPrice",
            Facet::MaxPrice => "maxPrice",
        }
    }

    /// Query parameter names accepted for this facet. The first entry is the
    /// one emitted on serialization.
    #[must_use]
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            Facet::Search => &["search"],
            Facet::Category => &["category"],
            Facet::Tab => &["tab"],
            Facet::Colour => &["color", "colour"],
            Facet::Style => &["style"],
            Facet::SlabStyle => &["slabStyle"],
            Facet::StoneType => &["material", "stoneType"],
            Facet::Custom => &["customization", "custom"],
            Facet::Location => &["location"],
            Facet::MinPrice => &["minPrice"],
            Facet::MaxPrice => &["maxPrice"],
        }
    }

    #[must_use]
    pub fn from_param(param: &str) -> Option<Facet> {
        Facet::ALL
            .into_iter()
            .find(|facet| facet.param_names().contains(&param))
    }

    /// The product-detail array a facet filters on, if any.
    #[must_use]
    pub fn detail_field(self) -> Option<DetailField> {
        match self {
            Facet::Colour => Some(DetailField::Color),
            Facet::Style => Some(DetailField::Style),
            Facet::SlabStyle => Some(DetailField::SlabStyle),
            Facet::StoneType => Some(DetailField::StoneType),
            Facet::Custom => Some(DetailField::Customization),
            _ => None,
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facet {
    type Err = SearchError;

    /// Accepts canonical facet names and every query parameter alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facet::ALL
            .into_iter()
            .find(|facet| facet.name() == s)
            .or_else(|| Facet::from_param(s))
            .ok_or_else(|| SearchError::UnknownFacet(s.to_string()))
    }
}

impl Serialize for Facet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_facet_has_a_unique_primary_param() {
        let mut seen = std::collections::HashSet::new();
        for facet in Facet::ALL {
            assert!(seen.insert(facet.param_names()[0]), "duplicate for {facet}");
        }
    }

    #[test]
    fn from_param_accepts_aliases() {
        assert_eq!(Facet::from_param("color"), Some(Facet::Colour));
        assert_eq!(Facet::from_param("colour"), Some(Facet::Colour));
        assert_eq!(Facet::from_param("material"), Some(Facet::StoneType));
        assert_eq!(Facet::from_param("stoneType"), Some(Facet::StoneType));
        assert_eq!(Facet::from_param("customization"), Some(Facet::Custom));
        assert_eq!(Facet::from_param("sort"), None);
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert_eq!("slabStyle".parse::<Facet>(), Ok(Facet::SlabStyle));
        assert_eq!(
            "engraving".parse::<Facet>(),
            Err(SearchError::UnknownFacet("engraving".to_string()))
        );
    }

    #[test]
    fn detail_facets_are_multi_select() {
        for facet in Facet::ALL {
            if facet.detail_field().is_some() {
                assert_eq!(facet.kind(), FacetKind::Multi, "{facet}");
            }
        }
    }

    #[test]
    fn serializes_as_canonical_name() {
        let json = serde_json::to_string(&Facet::StoneType).unwrap();
        assert_eq!(json, "\"stoneType\"");
    }
}
