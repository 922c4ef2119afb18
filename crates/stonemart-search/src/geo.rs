//! Great-circle distance enrichment. Display data only; never a filter input.

use stonemart_core::Listing;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A `(latitude, longitude)` origin parsed from `near=lat,lng`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Parses `"lat,lng"`. Returns `None` for malformed or out-of-range
    /// coordinates.
    #[must_use]
    pub fn parse(raw: &str) -> Option<GeoPoint> {
        let (lat, lng) = raw.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(GeoPoint { lat, lng })
    }
}

/// Haversine distance in kilometres.
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Distance from `origin` to the listing's company, when the company has
/// coordinates.
#[must_use]
pub fn distance_km(origin: GeoPoint, listing: &Listing) -> Option<f64> {
    let (lat, lng) = listing.coordinates()?;
    Some(haversine_km(origin, GeoPoint { lat, lng }))
}
