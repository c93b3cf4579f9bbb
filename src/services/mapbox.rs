use reqwest::blocking::Client;

use super::http::{client, send_json};
use super::{CitySearch, CitySuggestion, MIN_CITY_QUERY_LEN, PlaceLookup, RouteOptimizer};
use crate::model::{BoundingBox, CityAnchor, Coordinates, OptimizedRoute};
use crate::{Error, Result};

const SEARCH_BASE: &str = "https://api.mapbox.com/search/searchbox/v1";
const OPTIMIZE_BASE: &str = "https://api.mapbox.com/optimized-trips/v1";

/// The Optimization v1 API accepts between 2 and 12 coordinates.
pub const MAX_TRIP_POINTS: usize = 12;

/// Mapbox Search Box: city autocomplete, city details and POI lookup.
pub struct MapboxSearch {
    client: Client,
    token: String,
    session_token: String,
    poi_categories: String,
    within_bounding_box: bool,
}

impl MapboxSearch {
    pub fn new(token: impl Into<String>, poi_categories: &[String]) -> Result<Self> {
        Ok(Self {
            client: client()?,
            token: token.into(),
            session_token: uuid::Uuid::new_v4().to_string(),
            poi_categories: poi_categories.join(","),
            within_bounding_box: false,
        })
    }

    /// Also pass the city bounding box to POI lookups.
    pub fn within_bounding_box(mut self, enabled: bool) -> Self {
        self.within_bounding_box = enabled;
        self
    }
}

impl CitySearch for MapboxSearch {
    fn suggest(&self, query: &str) -> Result<Vec<CitySuggestion>> {
        if query.chars().count() < MIN_CITY_QUERY_LEN {
            return Ok(Vec::new());
        }
        let request = self.client.get(format!("{SEARCH_BASE}/suggest")).query(&[
            ("q", query),
            ("access_token", self.token.as_str()),
            ("session_token", self.session_token.as_str()),
            ("types", "place"),
        ]);
        let resp: search::SuggestResponse = send_json("city search", request)?;
        Ok(suggestions_from(resp))
    }

    fn retrieve(&self, id: &str) -> Result<CityAnchor> {
        let url = format!("{SEARCH_BASE}/retrieve/{}", urlencoding::encode(id));
        let request = self.client.get(url).query(&[
            ("access_token", self.token.as_str()),
            ("session_token", self.session_token.as_str()),
        ]);
        let resp: search::FeatureResponse = send_json("city search", request)?;
        city_from(resp)
    }
}

impl MapboxSearch {
    fn forward_params(&self, query: &str, anchor: &CityAnchor) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("access_token", self.token.clone()),
            ("q", query.to_string()),
            ("proximity", anchor.proximity()),
            ("types", "poi".to_string()),
            ("poi_category", self.poi_categories.clone()),
        ];
        if self.within_bounding_box
            && let Some(bbox) = &anchor.bounding_box
        {
            params.push(("bbox", bbox.to_query()));
        }
        params
    }
}

impl PlaceLookup for MapboxSearch {
    fn lookup(&self, query: &str, anchor: &CityAnchor) -> Result<Option<Coordinates>> {
        let request = self
            .client
            .get(format!("{SEARCH_BASE}/forward"))
            .query(&self.forward_params(query, anchor));
        let resp: search::FeatureResponse = send_json("place lookup", request)?;
        Ok(first_point(&resp))
    }

    fn cache_scope(&self) -> String {
        format!(
            "poi={};bbox={}",
            self.poi_categories, self.within_bounding_box
        )
    }
}

/// Mapbox Optimization v1 (`optimized-trips`).
pub struct MapboxOptimizer {
    client: Client,
    token: String,
    profile: String,
}

impl MapboxOptimizer {
    pub fn new(token: impl Into<String>, profile: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: client()?,
            token: token.into(),
            profile: profile.into(),
        })
    }
}

impl RouteOptimizer for MapboxOptimizer {
    fn optimize(&self, points: &[Coordinates]) -> Result<OptimizedRoute> {
        if points.len() < 2 {
            return Err(Error::NotEnoughStops(points.len()));
        }
        if points.len() > MAX_TRIP_POINTS {
            return Err(Error::optimizer(format!(
                "at most {MAX_TRIP_POINTS} stops can be optimized, got {}",
                points.len()
            )));
        }

        let coord_strings: Vec<String> = points
            .iter()
            .map(|(lon, lat)| format!("{},{}", lon, lat))
            .collect();
        let url = format!(
            "{OPTIMIZE_BASE}/{}/{}",
            self.profile,
            coord_strings.join(";")
        );
        let request = self.client.get(url).query(&[
            ("access_token", self.token.as_str()),
            ("geometries", "geojson"),
        ]);

        let resp: optimize::TripsResponse = match send_json("route optimizer", request) {
            Ok(resp) => resp,
            Err(Error::Status { status, .. }) => {
                return Err(Error::optimizer(format!(
                    "API request failed with status code {status}"
                )));
            }
            Err(Error::Json(e)) => {
                return Err(Error::optimizer(format!("malformed response: {e}")));
            }
            Err(e) => return Err(e),
        };
        route_from(resp, points.len())
    }
}

fn suggestions_from(resp: search::SuggestResponse) -> Vec<CitySuggestion> {
    resp.suggestions
        .into_iter()
        .map(|s| {
            let label = match s.place_formatted.as_deref() {
                Some(place) if !place.is_empty() => format!("{}, {}", s.name, place),
                _ => s.name,
            };
            CitySuggestion {
                label,
                id: s.mapbox_id,
            }
        })
        .collect()
}

fn city_from(resp: search::FeatureResponse) -> Result<CityAnchor> {
    let feature = resp
        .features
        .into_iter()
        .next()
        .ok_or_else(|| Error::other("no features returned for the city"))?;
    let (longitude, latitude) = feature.geometry.point()?;
    let name = feature
        .properties
        .full_address
        .or(feature.properties.name)
        .unwrap_or_default();

    let mut anchor = CityAnchor::new(name, longitude, latitude);
    if let Some(bbox) = feature
        .properties
        .bbox
        .as_deref()
        .and_then(BoundingBox::from_slice)
    {
        anchor = anchor.with_bounding_box(bbox);
    }
    Ok(anchor)
}

fn first_point(resp: &search::FeatureResponse) -> Option<Coordinates> {
    resp.features.first().and_then(|f| f.geometry.point().ok())
}

fn route_from(resp: optimize::TripsResponse, submitted: usize) -> Result<OptimizedRoute> {
    let trip = resp
        .trips
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| Error::optimizer("no trips found in the API response"))?;
    let geometry = trip
        .geometry
        .ok_or_else(|| Error::optimizer("no geometry found in the trip data"))?;
    let line: optimize::LineString = serde_json::from_value(geometry)
        .map_err(|_| Error::optimizer("unexpected geometry format in the API response"))?;

    let path_geometry = line.coordinates.iter().map(|[lon, lat]| (*lat, *lon)).collect();
    let order = visiting_order(&resp.waypoints, submitted);

    Ok(OptimizedRoute {
        order,
        path_geometry,
        total_distance_meters: trip.distance,
    })
}

/// Each waypoint, listed in input order, carries its position in the trip.
/// Invert that into "input index visited at step i". Malformed positions
/// leave holes, which shorten the order so the reconciler rejects it.
fn visiting_order(waypoints: &[optimize::Waypoint], submitted: usize) -> Vec<usize> {
    let mut slots: Vec<Option<usize>> = vec![None; submitted];
    for (input_idx, wp) in waypoints.iter().enumerate() {
        if let Some(slot) = slots.get_mut(wp.waypoint_index) {
            *slot = Some(input_idx);
        }
    }
    slots.into_iter().flatten().collect()
}

mod search {
    use serde::Deserialize;

    use crate::model::Coordinates;
    use crate::{Error, Result};

    #[derive(Debug, Deserialize)]
    pub struct SuggestResponse {
        #[serde(default)]
        pub suggestions: Vec<Suggestion>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Suggestion {
        pub name: String,
        pub place_formatted: Option<String>,
        pub mapbox_id: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct FeatureResponse {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        pub geometry: Geometry,
        #[serde(default)]
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub coordinates: Vec<f64>,
    }

    impl Geometry {
        pub fn point(&self) -> Result<Coordinates> {
            match self.coordinates.as_slice() {
                [lon, lat, ..] => Ok((*lon, *lat)),
                _ => Err(Error::other("feature geometry has no coordinates")),
            }
        }
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Properties {
        pub name: Option<String>,
        pub full_address: Option<String>,
        pub bbox: Option<Vec<f64>>,
    }
}

mod optimize {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct TripsResponse {
        pub trips: Option<Vec<Trip>>,
        #[serde(default)]
        pub waypoints: Vec<Waypoint>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Trip {
        pub geometry: Option<serde_json::Value>,
        #[serde(default)]
        pub distance: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Waypoint {
        pub waypoint_index: usize,
    }

    #[derive(Debug, Deserialize)]
    pub struct LineString {
        pub coordinates: Vec<[f64; 2]>,
    }
}
