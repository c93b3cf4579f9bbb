use serde::{Deserialize, Serialize};

/// A `(longitude, latitude)` pair, the order the place and routing APIs use.
pub type Coordinates = (f64, f64);

/// A `(latitude, longitude)` pair, the order map polylines use.
pub type LatLon = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Builds a box from the `[min_lon, min_lat, max_lon, max_lat]` array
    /// returned by the search API.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [min_lon, min_lat, max_lon, max_lat] => {
                Some(Self::new(*min_lon, *min_lat, *max_lon, *max_lat))
            }
            _ => None,
        }
    }

    pub fn contains(&self, (lon, lat): Coordinates) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    /// Query-string form `min_lon,min_lat,max_lon,max_lat`.
    pub fn to_query(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// The chosen city. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAnchor {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl CityAnchor {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            name: name.into(),
            longitude,
            latitude,
            bounding_box: None,
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        (self.longitude, self.latitude)
    }

    /// `lon,lat` as the search API expects for `proximity`.
    pub fn proximity(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

/// One row of the landmark table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub include: bool,
}

impl Candidate {
    pub fn new(name: impl Into<String>, (longitude, latitude): Coordinates) -> Self {
        Self {
            name: name.into(),
            longitude,
            latitude,
            include: true,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        (self.longitude, self.latitude)
    }

    pub fn lat_lon(&self) -> LatLon {
        (self.latitude, self.longitude)
    }
}

/// What the route optimizer returns for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRoute {
    /// Visiting order as indices into the submitted points.
    pub order: Vec<usize>,
    pub path_geometry: Vec<LatLon>,
    pub total_distance_meters: f64,
}
