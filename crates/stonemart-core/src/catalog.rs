//! Catalog ingestion: the one place where raw listing and category JSON is
//! read, typed, and validated before the search engine sees it.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::listing::{Category, Listing};
use crate::CatalogError;

/// Load and validate the listing catalog from a JSON file.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read, parsed, or fails validation.
pub fn load_listings(path: &Path) -> Result<Vec<Listing>, CatalogError> {
    let content = read_file(path)?;
    let listings = parse_listings(&content)?;
    tracing::info!(
        path = %path.display(),
        count = listings.len(),
        "loaded listing catalog"
    );
    Ok(listings)
}

/// Load the category list from a JSON file.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed.
pub fn load_categories(path: &Path) -> Result<Vec<Category>, CatalogError> {
    let content = read_file(path)?;
    parse_categories(&content)
}

/// Parse and validate listings from a JSON document.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] for malformed JSON or a listing of the
/// wrong shape, naming the listing, and [`CatalogError::Validation`] for an
/// unrecognized document shape or blank or duplicate listing ids.
pub fn parse_listings(json: &str) -> Result<Vec<Listing>, CatalogError> {
    let listings = document_items(json, "listings", "listing catalog")?
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let context = match item.get("id").and_then(Value::as_str) {
                Some(id) => format!("listing {index} (id '{id}')"),
                None => format!("listing {index}"),
            };
            serde_json::from_value(item).map_err(|source| CatalogError::Parse { context, source })
        })
        .collect::<Result<Vec<Listing>, _>>()?;

    validate_listings(&listings)?;
    Ok(listings)
}

/// Parse categories from a JSON document, dropping blank names and
/// case-insensitive duplicates (first occurrence wins).
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] for malformed JSON and
/// [`CatalogError::Validation`] when the document has neither accepted shape.
pub fn parse_categories(json: &str) -> Result<Vec<Category>, CatalogError> {
    let categories = document_items(json, "categories", "category list")?
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Category>(item).map_err(|source| CatalogError::Parse {
                context: format!("category {index}"),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    Ok(categories
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .filter(|c| seen.insert(c.name.trim().to_lowercase()))
        .collect())
}

/// Feeds arrive either as a bare array or as an object wrapping the array
/// under `key`. Items are returned untyped so each one can be deserialized
/// with its own error context.
fn document_items(json: &str, key: &str, context: &str) -> Result<Vec<Value>, CatalogError> {
    let document: Value = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        context: context.to_string(),
        source,
    })?;

    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut fields) => match fields.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CatalogError::Validation(format!(
                "{context}: expected a `{key}` array"
            ))),
        },
        _ => Err(CatalogError::Validation(format!(
            "{context}: expected an array or an object with a `{key}` array"
        ))),
    }
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn validate_listings(listings: &[Listing]) -> Result<(), CatalogError> {
    let mut seen_ids = HashSet::new();

    for listing in listings {
        if listing.id.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "listing '{}' has a blank id",
                listing.title
            )));
        }

        if !seen_ids.insert(listing.id.as_str()) {
            return Err(CatalogError::Validation(format!(
                "duplicate listing id: '{}'",
                listing.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_listings_accepts_bare_array() {
        let listings = parse_listings(r#"[{ "id": "1", "title": "A" }, { "id": "2" }]"#).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].title, "");
    }

    #[test]
    fn parse_listings_accepts_wrapped_object() {
        let listings = parse_listings(r#"{ "listings": [{ "id": "1", "title": "A" }] }"#).unwrap();
        assert_eq!(listings.len(), 1);
    }

    #[test]
    fn parse_listings_empty_catalog_is_valid() {
        assert!(parse_listings("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_listings_rejects_duplicate_ids() {
        let err = parse_listings(r#"[{ "id": "1" }, { "id": "1" }]"#).unwrap_err();
        assert!(
            matches!(err, CatalogError::Validation(ref msg) if msg.contains("duplicate")),
            "expected duplicate id validation error, got: {err:?}"
        );
    }

    #[test]
    fn parse_listings_rejects_blank_id() {
        let err = parse_listings(r#"[{ "id": "  ", "title": "Nameless" }]"#).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref msg) if msg.contains("blank id")));
    }

    #[test]
    fn parse_listings_reports_malformed_json() {
        let err = parse_listings("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn parse_categories_drops_blank_and_duplicate_names() {
        let categories = parse_categories(
            r#"[{ "name": "Headstones" }, { "name": " " }, { "name": "headstones" }, { "name": "Urns" }]"#,
        )
        .unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Headstones", "Urns"]);
    }

    #[test]
    fn load_listings_reports_missing_file() {
        let err = load_listings(Path::new("/nonexistent/stonemart/listings.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn malformed_prices_do_not_reject_the_catalog() {
        let listings =
            parse_listings(r#"[{ "id": "a", "price": "R 9,500" }, { "id": "b", "price": "n/a" }, { "id": "c", "price": 5000 }]"#)
                .unwrap();
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].price, Some(rust_decimal::Decimal::new(9_500, 0)));
        assert_eq!(listings[1].price, None);
        assert_eq!(listings[2].price, Some(rust_decimal::Decimal::new(5_000, 0)));
    }

    #[test]
    fn parse_error_names_the_offending_listing() {
        let err = parse_listings(r#"[{ "id": "ok" }, { "id": "slab-9", "title": 42 }]"#).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(message.contains("listing 1 (id 'slab-9')"), "got: {message}");
        assert!(message.contains("invalid type"), "got: {message}");
    }

    #[test]
    fn parse_listings_rejects_unknown_document_shape() {
        let err = parse_listings(r#"{ "items": [] }"#).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref msg) if msg.contains("`listings` array")));
        assert!(matches!(parse_listings("42"), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn parse_categories_accepts_wrapped_object() {
        let categories = parse_categories(r#"{ "categories": [{ "name": "Urns" }] }"#).unwrap();
        assert_eq!(categories.len(), 1);
    }
}
