//! Bidirectional mapping between a [`FacetSelection`] and query parameters.
//!
//! Multi-select facets are written as repeated keys
//! (`style=Upright&style=Flat`). Output is canonical: facets in declaration
//! order, values sorted, each facet under its primary parameter name. That
//! makes `serialize(hydrate(q)) == q` for any `q` produced by `serialize`.

use std::collections::{BTreeMap, BTreeSet};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::engine::FacetVocabulary;
use crate::facet::{Facet, FacetKind};
use crate::selection::{is_unconstrained_value, FacetSelection, FacetValue};

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Host-level parameters that share the query string but are not facets.
pub const HOST_PARAMS: [&str; 4] = ["sort", "limit", "offset", "near"];

/// Splits a raw query string into decoded `(name, value)` pairs.
///
/// A leading `?` and any `#fragment` are ignored. `+` decodes to a space and
/// `%XX` sequences are decoded; invalid UTF-8 is replaced rather than
/// rejected.
#[must_use]
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let query = query.split('#').next().unwrap_or(query);

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode_component(name);
            if name.is_empty() {
                return None;
            }
            Some((name, decode_component(value)))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[must_use]
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// First value of a non-facet parameter such as `sort` or `limit`.
#[must_use]
pub fn extra_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Query-string codec, optionally backed by a vocabulary of known options.
#[derive(Debug, Clone, Default)]
pub struct UrlCodec {
    vocabulary: Option<FacetVocabulary>,
}

impl UrlCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a vocabulary, values of vocabulary-backed facets are
    /// canonicalized to the known surface form and unknown values are
    /// dropped.
    #[must_use]
    pub fn with_vocabulary(vocabulary: FacetVocabulary) -> Self {
        Self {
            vocabulary: Some(vocabulary),
        }
    }

    /// Builds a selection from decoded parameters. Unrecognized parameters
    /// and unusable values leave their facet unconstrained. For single-select
    /// facets the first usable value wins.
    pub fn hydrate<'a, I>(&self, params: I) -> FacetSelection
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values: BTreeMap<Facet, FacetValue> = BTreeMap::new();

        for (name, raw) in params {
            let Some(facet) = Facet::from_param(name) else {
                if !HOST_PARAMS.contains(&name) {
                    tracing::debug!(param = name, "ignoring unrecognized query parameter");
                }
                continue;
            };
            let Some(value) = self.accept(facet, raw) else {
                continue;
            };

            match facet.kind() {
                FacetKind::Single => {
                    values.entry(facet).or_insert(FacetValue::Single(value));
                }
                FacetKind::Multi => {
                    let entry = values
                        .entry(facet)
                        .or_insert_with(|| FacetValue::Multi(BTreeSet::new()));
                    if let FacetValue::Multi(set) = entry {
                        set.insert(value);
                    }
                }
            }
        }

        FacetSelection::from_values(values)
    }

    /// Parses and hydrates a raw query string.
    #[must_use]
    pub fn hydrate_query(&self, query: &str) -> FacetSelection {
        let params = parse_query(query);
        self.hydrate(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn accept(&self, facet: Facet, raw: &str) -> Option<String> {
        if is_unconstrained_value(raw) {
            return None;
        }
        let value = raw.trim();

        match &self.vocabulary {
            Some(vocabulary) if FacetVocabulary::covers(facet) => {
                let known = vocabulary.canonical(facet, value).map(ToString::to_string);
                if known.is_none() {
                    tracing::debug!(facet = facet.name(), value, "dropping unknown facet value");
                }
                known
            }
            _ => Some(value.to_string()),
        }
    }

    /// Canonical query string for `selection`, without a leading `?`.
    /// Unconstrained facets are omitted; the empty selection yields `""`.
    #[must_use]
    pub fn serialize(&self, selection: &FacetSelection) -> String {
        let mut pairs = Vec::new();
        for (facet, value) in selection.active() {
            let name = facet.param_names()[0];
            match value {
                FacetValue::Single(v) => pairs.push(format!("{name}={}", encode_component(v))),
                FacetValue::Multi(vs) => {
                    pairs.extend(vs.iter().map(|v| format!("{name}={}", encode_component(v))));
                }
            }
        }
        pairs.join("&")
    }
}
