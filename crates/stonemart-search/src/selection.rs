//! Immutable facet selection snapshots.
//!
//! Every mutator returns a new [`FacetSelection`] and leaves the receiver
//! untouched. Mutations that change nothing hand back a snapshot sharing the
//! receiver's storage, so [`FacetSelection::same_snapshot`] lets consumers
//! skip recomputation with a pointer comparison.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::SearchError;
use crate::facet::{Facet, FacetKind};

/// The value of one constrained facet. Unconstrained facets are absent from
/// the selection entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FacetValue {
    Single(String),
    /// Never empty; an emptied set is removed from the selection.
    Multi(BTreeSet<String>),
}

#[derive(Debug, Clone, Default)]
pub struct FacetSelection {
    values: Arc<BTreeMap<Facet, FacetValue>>,
}

/// `"Any"` and blank strings mean "no constraint" in every facet.
pub(crate) fn is_unconstrained_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any")
}

impl FacetSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no facet is constrained.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.values.is_empty()
    }

    /// `true` when both handles point at the same snapshot storage.
    #[must_use]
    pub fn same_snapshot(&self, other: &FacetSelection) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    #[must_use]
    pub fn get(&self, facet: Facet) -> Option<&FacetValue> {
        self.values.get(&facet)
    }

    #[must_use]
    pub fn single(&self, facet: Facet) -> Option<&str> {
        match self.values.get(&facet) {
            Some(FacetValue::Single(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn multi(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        match self.values.get(&facet) {
            Some(FacetValue::Multi(values)) => Some(values),
            _ => None,
        }
    }

    /// Constrained facets in canonical order.
    pub fn active(&self) -> impl Iterator<Item = (Facet, &FacetValue)> {
        self.values.iter().map(|(facet, value)| (*facet, value))
    }

    /// Sets a single-select facet. `"Any"` or a blank value clears it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::WrongFacetKind`] when `facet` is multi-select.
    pub fn set_single(&self, facet: Facet, value: &str) -> Result<Self, SearchError> {
        expect_kind(facet, FacetKind::Single)?;

        if is_unconstrained_value(value) {
            return Ok(self.clear(facet));
        }

        let value = value.trim();
        if self.single(facet) == Some(value) {
            return Ok(self.clone());
        }

        Ok(self.with(facet, Some(FacetValue::Single(value.to_string()))))
    }

    /// Adds `value` to a multi-select facet if absent, removes it if present.
    /// Removing the last value reverts the facet to unconstrained. Toggling
    /// `"Any"` or a blank value changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::WrongFacetKind`] when `facet` is single-select.
    pub fn toggle_multi(&self, facet: Facet, value: &str) -> Result<Self, SearchError> {
        expect_kind(facet, FacetKind::Multi)?;

        if is_unconstrained_value(value) {
            return Ok(self.clone());
        }

        let value = value.trim();
        let mut values = self.multi(facet).cloned().unwrap_or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }

        Ok(self.with(facet, non_empty(values)))
    }

    /// Replaces the whole value set of a multi-select facet. Blank and
    /// `"Any"` entries are ignored; an empty result clears the facet.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::WrongFacetKind`] when `facet` is single-select.
    pub fn set_multi<I, S>(&self, facet: Facet, values: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        expect_kind(facet, FacetKind::Multi)?;

        let values: BTreeSet<String> = values
            .into_iter()
            .filter(|v| !is_unconstrained_value(v.as_ref()))
            .map(|v| v.as_ref().trim().to_string())
            .collect();

        if self.multi(facet) == Some(&values) || (values.is_empty() && self.get(facet).is_none())
        {
            return Ok(self.clone());
        }

        Ok(self.with(facet, non_empty(values)))
    }

    /// Builds a selection from already-normalized values. Empty sets and
    /// values held under the wrong facet kind are dropped.
    pub(crate) fn from_values(values: BTreeMap<Facet, FacetValue>) -> Self {
        let values = values
            .into_iter()
            .filter(|(facet, value)| match value {
                FacetValue::Single(v) => facet.kind() == FacetKind::Single && !v.is_empty(),
                FacetValue::Multi(vs) => facet.kind() == FacetKind::Multi && !vs.is_empty(),
            })
            .collect();
        Self {
            values: Arc::new(values),
        }
    }

    #[must_use]
    pub fn clear(&self, facet: Facet) -> Self {
        if self.values.contains_key(&facet) {
            self.with(facet, None)
        } else {
            self.clone()
        }
    }

    #[must_use]
    pub fn clear_all(&self) -> Self {
        if self.is_unconstrained() {
            self.clone()
        } else {
            Self::new()
        }
    }

    fn with(&self, facet: Facet, value: Option<FacetValue>) -> Self {
        let mut values = (*self.values).clone();
        match value {
            Some(value) => {
                values.insert(facet, value);
            }
            None => {
                values.remove(&facet);
            }
        }
        Self {
            values: Arc::new(values),
        }
    }
}

fn expect_kind(facet: Facet, expected: FacetKind) -> Result<(), SearchError> {
    let actual = facet.kind();
    if actual == expected {
        Ok(())
    } else {
        Err(SearchError::WrongFacetKind {
            facet,
            expected,
            actual,
        })
    }
}

fn non_empty(values: BTreeSet<String>) -> Option<FacetValue> {
    if values.is_empty() {
        None
    } else {
        Some(FacetValue::Multi(values))
    }
}

impl PartialEq for FacetSelection {
    fn eq(&self, other: &Self) -> bool {
        self.same_snapshot(other) || self.values == other.values
    }
}

impl Eq for FacetSelection {}

impl Serialize for FacetSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (facet, value) in self.values.iter() {
            map.serialize_entry(facet.name(), value)?;
        }
        map.end()
    }
}
