use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A memorial product listing as supplied by the storefront's catalog feed.
///
/// Field names follow the feed's JSON shape (`createdAt`, `productDetails`,
/// `listing_category`). Everything except `id` is optional: a listing with
/// missing nested data is still a valid catalog entry and only drops out of
/// results when a facet actively requires the missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Decimal>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub company: Option<Company>,
    #[serde(default)]
    pub listing_category: Option<ListingCategory>,
    #[serde(default, rename = "productDetails")]
    pub product_details: Option<ProductDetails>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub branch_listings: Vec<BranchListing>,
}

impl Listing {
    #[must_use]
    pub fn company_name(&self) -> Option<&str> {
        self.company.as_ref().and_then(|c| c.name.as_deref())
    }

    /// Free-form company address, e.g. `"123 Main Rd, Johannesburg, Gauteng"`.
    #[must_use]
    pub fn company_location(&self) -> Option<&str> {
        self.company.as_ref().and_then(|c| c.location.as_deref())
    }

    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.listing_category
            .as_ref()
            .and_then(|c| c.name.as_deref())
    }

    /// Returns the first entry of the given product-detail array.
    ///
    /// Only the first entry participates in filtering; listings carry a
    /// single primary value per detail in practice.
    #[must_use]
    pub fn primary_detail(&self, field: DetailField) -> Option<&str> {
        self.product_details
            .as_ref()
            .and_then(|d| d.entries(field).first())
            .and_then(|entry| entry.value.as_deref())
    }

    /// Company coordinates as `(latitude, longitude)` when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let company = self.company.as_ref()?;
        Some((company.latitude?, company.longitude?))
    }
}

/// Reads a feed price from a number or a formatted string (`"R 9,500"`).
///
/// Currency symbols, spaces, and thousands separators are dropped before the
/// remainder is read as a decimal. Anything still unusable becomes `None`,
/// which excludes the listing from explicit price bounds only.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let price = price_from_value(&raw);
    if price.is_none() {
        tracing::warn!(price = %raw, "ignoring unparseable listing price");
    }
    Ok(price)
}

fn price_from_value(raw: &serde_json::Value) -> Option<Decimal> {
    match raw {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            text.parse()
                .ok()
                .or_else(|| Decimal::from_scientific(&text).ok())
        }
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCategory {
    #[serde(default)]
    pub name: Option<String>,
}

/// A single `{ value }` entry in one of the product-detail arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailEntry {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default)]
    pub style: Vec<DetailEntry>,
    #[serde(default)]
    pub color: Vec<DetailEntry>,
    #[serde(default, rename = "stoneType")]
    pub stone_type: Vec<DetailEntry>,
    #[serde(default, rename = "slabStyle")]
    pub slab_style: Vec<DetailEntry>,
    #[serde(default)]
    pub customization: Vec<DetailEntry>,
}

impl ProductDetails {
    #[must_use]
    pub fn entries(&self, field: DetailField) -> &[DetailEntry] {
        match field {
            DetailField::Style => &self.style,
            DetailField::Color => &self.color,
            DetailField::StoneType => &self.stone_type,
            DetailField::SlabStyle => &self.slab_style,
            DetailField::Customization => &self.customization,
        }
    }
}

/// The product-detail arrays a listing carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetailField {
    Style,
    Color,
    StoneType,
    SlabStyle,
    Customization,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchListing {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub branch: Option<Branch>,
}

/// A listing category as supplied by the category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}
