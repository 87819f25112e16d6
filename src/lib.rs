mod aemet;
mod cache;
mod error;
mod fetch;
mod geo;
mod types;

pub use error::AemetError;

pub use aemet::{Aemet, ClimateDate, DEFAULT_BASE_URL};

pub use cache::response_cache::{CacheTtl, MemoryCache, ResponseCache};
pub use fetch::backoff::RetryPolicy;
pub use fetch::error::FetchError;

pub use geo::coordinates::parse_coordinate;
pub use geo::nearest::{distance_km, find_nearest};

pub use types::observation::{ClimateDay, ClimateNormal, Observation};
pub use types::station::{LatLon, NearestStation, Station};
