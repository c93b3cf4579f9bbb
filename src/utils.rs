use geo::{Distance, Geodesic, Point};

use crate::model::{Coordinates, LatLon};

pub const METERS_PER_MILE: f64 = 1609.34;
pub const METERS_PER_KM: f64 = 1000.0;

/// Geodesic (WGS84 ellipsoid) distance between two coordinates in kilometres.
pub fn geodesic_distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let a = Point::new(a.0, a.1);
    let b = Point::new(b.0, b.1);
    Geodesic.distance(a, b) / METERS_PER_KM
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

/// Create a LineString GeoJSON geometry from `(lat, lon)` path points.
pub fn create_linestring_geojson(path: &[LatLon]) -> String {
    let coord_pairs: Vec<String> = path
        .iter()
        .map(|(lat, lon)| format!("[{},{}]", lon, lat))
        .collect();

    format!(
        r#"{{"type": "LineString", "coordinates": [{}]}}"#,
        coord_pairs.join(",")
    )
}

/// South-west and north-east corners covering every point, as `(lat, lon)`.
pub fn bounds_of(points: &[LatLon]) -> Option<(LatLon, LatLon)> {
    let (first, rest) = points.split_first()?;
    let mut sw = *first;
    let mut ne = *first;
    for &(lat, lon) in rest {
        sw = (sw.0.min(lat), sw.1.min(lon));
        ne = (ne.0.max(lat), ne.1.max(lon));
    }
    Some((sw, ne))
}

/// Generate a cache key for a place lookup.
/// Rounds the anchor to 4 decimal places (~11m precision) so nearby city
/// centers share entries. `scope` separates providers configured differently.
pub fn generate_lookup_cache_key(query: &str, anchor: Coordinates, scope: &str) -> String {
    let key = format!(
        "lookup:{}@{:.4},{:.4}",
        query.trim().to_lowercase(),
        anchor.0,
        anchor.1
    );
    if scope.is_empty() {
        key
    } else {
        format!("{key}#{scope}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geodesic_distance() {
        // NYC to LA is roughly 3940 km
        let nyc = (-74.0059, 40.7128);
        let la = (-118.2437, 34.0522);
        let distance = geodesic_distance_km(nyc, la);

        assert!((distance - 3940.0).abs() < 30.0);
    }

    #[test]
    fn test_geodesic_distance_is_symmetric() {
        let eiffel = (2.2945, 48.8584);
        let sacre_coeur = (2.3431, 48.8867);
        assert_relative_eq!(
            geodesic_distance_km(eiffel, sacre_coeur),
            geodesic_distance_km(sacre_coeur, eiffel),
            epsilon = 1e-9
        );
        assert_eq!(geodesic_distance_km(eiffel, eiffel), 0.0);
    }

    #[test]
    fn test_unit_conversion() {
        assert_relative_eq!(meters_to_miles(1609.34), 1.0);
        assert_relative_eq!(meters_to_km(7250.0), 7.25);
    }

    #[test]
    fn test_linestring_swaps_to_lon_lat() {
        let geojson = create_linestring_geojson(&[(48.85, 2.29), (48.86, 2.33)]);
        assert_eq!(
            geojson,
            r#"{"type": "LineString", "coordinates": [[2.29,48.85],[2.33,48.86]]}"#
        );
    }

    #[test]
    fn test_bounds() {
        let bounds = bounds_of(&[(48.85, 2.29), (48.88, 2.27), (48.86, 2.35)]);
        assert_eq!(bounds, Some(((48.85, 2.27), (48.88, 2.35))));
        assert_eq!(bounds_of(&[]), None);
    }

    #[test]
    fn test_cache_key_generation() {
        let key = generate_lookup_cache_key("  Louvre Museum ", (2.352222, 48.856614), "");
        assert_eq!(key, "lookup:louvre museum@2.3522,48.8566");

        let scoped = generate_lookup_cache_key("Louvre", (2.3522, 48.8566), "bbox=true");
        assert_eq!(scoped, "lookup:louvre@2.3522,48.8566#bbox=true");
    }
}
