//! The hosted services the planner talks to, behind small traits so the
//! pipeline can run against fakes.

mod cache;
mod cloudflare;
mod http;
mod mapbox;

pub use cache::CachedLookup;
pub use cloudflare::WorkersAi;
pub use mapbox::{MapboxOptimizer, MapboxSearch};

use serde::{Deserialize, Serialize};

use crate::model::{CityAnchor, Coordinates, OptimizedRoute};
use crate::{Error, Result};

/// Free-form text generation.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Geocoding of a landmark name near a city.
pub trait PlaceLookup {
    /// Zero or one `(lon, lat)` for `query`.
    fn lookup(&self, query: &str, anchor: &CityAnchor) -> Result<Option<Coordinates>>;

    /// Like [`PlaceLookup::lookup`] with a miss reported as [`Error::LookupMiss`].
    fn locate(&self, query: &str, anchor: &CityAnchor) -> Result<Coordinates> {
        self.lookup(query, anchor)?
            .ok_or_else(|| Error::LookupMiss(query.to_string()))
    }

    /// Provider settings that change the answer for the same query.
    /// Cached answers are only shared between lookups with the same scope.
    fn cache_scope(&self) -> String {
        String::new()
    }
}

impl<T: PlaceLookup + ?Sized> PlaceLookup for &T {
    fn lookup(&self, query: &str, anchor: &CityAnchor) -> Result<Option<Coordinates>> {
        (**self).lookup(query, anchor)
    }

    fn cache_scope(&self) -> String {
        (**self).cache_scope()
    }
}

/// Multi-stop route optimization.
pub trait RouteOptimizer {
    fn optimize(&self, points: &[Coordinates]) -> Result<OptimizedRoute>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub label: String,
    pub id: String,
}

/// City autocomplete and detail retrieval.
pub trait CitySearch {
    fn suggest(&self, query: &str) -> Result<Vec<CitySuggestion>>;
    fn retrieve(&self, id: &str) -> Result<CityAnchor>;
}

/// Queries shorter than this never reach the city search.
pub const MIN_CITY_QUERY_LEN: usize = 3;
