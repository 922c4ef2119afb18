//! One-shot query handlers: `search`, `facets`, and `locations`.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use stonemart_core::Listing;
use stonemart_search::{
    format_currency, Facet, FacetSelection, FilterEngine, LocationNode, OptionCounts,
    SearchSession, SortKey,
};

#[derive(Debug, Serialize)]
struct SearchReport<'a> {
    total: usize,
    query: String,
    selection: &'a FacetSelection,
    sort: Option<SortKey>,
    listings: Vec<&'a Listing>,
    option_counts: &'a OptionCounts,
}

#[derive(Debug, Serialize)]
struct FacetsReport<'a> {
    count_mode: String,
    option_counts: &'a OptionCounts,
    price_range: Option<PriceRange>,
}

#[derive(Debug, Serialize)]
struct PriceRange {
    min_label: String,
    max_label: String,
}

/// Builds a session from a storefront query string plus optional free text.
pub(crate) fn session_for(engine: Arc<FilterEngine>, query: &str, text: Option<&str>) -> SearchSession {
    let mut session = SearchSession::new(engine);
    session.hydrate(query);
    if let Some(text) = text {
        session.set_search_text(text);
    }
    session
}

/// Filter, sort, and print the catalog for one query.
///
/// `sort` overrides any `sort=` parameter carried in `query`.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub(crate) fn run_search(
    engine: &Arc<FilterEngine>,
    query: &str,
    text: Option<&str>,
    sort: Option<SortKey>,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = session_for(Arc::clone(engine), query, text);
    if sort.is_some() {
        session.set_sort(sort);
    }
    let outcome = session.outcome();

    if json {
        let report = SearchReport {
            total: outcome.total(),
            query: session.query_string(),
            selection: session.selection(),
            sort: session.sort(),
            listings: outcome.listings(engine).take(limit).collect(),
            option_counts: &outcome.option_counts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if outcome.total() == 0 {
        println!("no listings match `{}`", session.query_string());
        return Ok(());
    }

    print!("{}", listing_table(outcome.listings(engine).take(limit)));
    println!(
        "showing {} of {} listings",
        outcome.total().min(limit),
        outcome.total()
    );
    Ok(())
}

/// Print option counts for every counted facet under one query.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub(crate) fn run_facets(engine: &Arc<FilterEngine>, query: &str, json: bool) -> anyhow::Result<()> {
    let session = session_for(Arc::clone(engine), query, None);
    let counts = engine.option_counts(session.selection());
    let price_range = engine.price_range().map(|(min, max)| PriceRange {
        min_label: format_currency(min),
        max_label: format_currency(max),
    });

    if json {
        let report = FacetsReport {
            count_mode: engine.count_mode().to_string(),
            option_counts: &counts,
            price_range,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", counts_table(&counts));
    if let Some(range) = price_range {
        println!("price range: {} to {}", range.min_label, range.max_label);
    }
    Ok(())
}

/// Print the location tree with per-node listing counts.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub(crate) fn run_locations(engine: &Arc<FilterEngine>, json: bool) -> anyhow::Result<()> {
    let tree = engine.location_tree();
    if json {
        println!("{}", serde_json::to_string_pretty(tree)?);
    } else {
        print!("{}", location_outline(tree));
    }
    Ok(())
}

pub(crate) fn listing_table<'a>(listings: impl Iterator<Item = &'a Listing>) -> String {
    let mut out = format!("{:<20}{:<32}{:<12}LOCATION\n", "ID", "TITLE", "PRICE");
    for listing in listings {
        let price = listing.price.map_or_else(|| "-".to_string(), format_currency);
        let _ = writeln!(
            out,
            "{:<20}{:<32}{:<12}{}",
            listing.id,
            listing.title,
            price,
            listing.company_location().unwrap_or("-")
        );
    }
    out
}

fn counts_table(counts: &OptionCounts) -> String {
    let mut out = format!("{:<18}{:<28}COUNT\n", "FACET", "OPTION");
    for facet in Facet::COUNTED {
        let Some(options) = counts.get(&facet) else {
            continue;
        };
        for (option, count) in options {
            let _ = writeln!(out, "{:<18}{option:<28}{count}", facet.name());
        }
    }
    out
}

fn location_outline(nodes: &[LocationNode]) -> String {
    fn walk(out: &mut String, nodes: &[LocationNode], depth: usize) {
        for node in nodes {
            let _ = writeln!(out, "{:indent$}{} ({})", "", node.name, node.count, indent = depth * 2);
            walk(out, &node.children, depth + 1);
        }
    }

    let mut out = String::new();
    walk(&mut out, nodes, 0);
    out
}
