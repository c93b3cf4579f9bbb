//! Plan a sightseeing tour: ask a language model for a city's landmarks,
//! geocode and filter them, let the user pick, then order the picks with a
//! hosted route optimizer and draw the result.

pub mod config;
mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod narrate;
pub mod normalize;
pub mod reconcile;
pub mod resolve;
pub mod selection;
pub mod services;
pub mod session;
pub mod utils;

pub use config::{Credentials, Settings};
pub use error::{Error, Result};
pub use model::{BoundingBox, Candidate, CityAnchor, Coordinates, LatLon, OptimizedRoute};
pub use normalize::normalize;
pub use reconcile::{ReconciledRoute, reconcile};
pub use resolve::{Resolution, SearchArea, SkipReason, Skipped, resolve, resolve_with_report};
pub use selection::SelectionStore;
pub use session::{Planner, Session};
