//! Result ordering applied after filtering.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use stonemart_core::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Ascending price.
    Price,
    /// Oldest listing first.
    ListingDate,
    Alphabetical,
}

impl SortKey {
    /// URL slug emitted in the `sort` query parameter.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::ListingDate => "listing-date",
            SortKey::Alphabetical => "alphabetical",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Price => "Price",
            SortKey::ListingDate => "Listing Date",
            SortKey::Alphabetical => "Alphabetical Order",
        }
    }

    /// Parses a display label or URL slug. Unrecognized values mean "no
    /// sort" and return `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<SortKey> {
        raw.parse().ok()
    }

    pub(crate) fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortKey::Price => missing_last(a.price.as_ref(), b.price.as_ref()),
            SortKey::ListingDate => missing_last(a.created_at.as_ref(), b.created_at.as_ref()),
            SortKey::Alphabetical => {
                let (ta, tb) = (a.title.trim(), b.title.trim());
                match (ta.is_empty(), tb.is_empty()) {
                    (false, true) => Ordering::Less,
                    (true, false) => Ordering::Greater,
                    _ => ta
                        .to_lowercase()
                        .cmp(&tb.to_lowercase())
                        .then_with(|| ta.cmp(tb)),
                }
            }
        }
    }
}

fn missing_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort key: \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "price" => Ok(SortKey::Price),
            "listing-date" | "date" | "newest" => Ok(SortKey::ListingDate),
            "alphabetical" | "alphabetical-order" | "title" => Ok(SortKey::Alphabetical),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Stable in-place sort. `None` keeps catalog order.
pub fn sort_listings<L>(listings: &mut [L], key: Option<SortKey>)
where
    L: Borrow<Listing>,
{
    if let Some(key) = key {
        listings.sort_by(|a, b| key.compare(a.borrow(), b.borrow()));
    }
}
