//! Station inventory data structures.
//!
//! AEMET's inventory is only loosely schematized: identifiers come under two
//! different keys depending on the dataset, coordinates are strings in mixed
//! encodings, and fields appear and disappear between stations. The structs
//! here pin down the fields the client reasons about and keep everything
//! else in a flattened map.

use crate::geo::coordinates::parse_coordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geographical coordinate pair in decimal degrees.
///
/// Latitude is the first element, longitude the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// A weather station from the AEMET inventory.
///
/// `idema` is the primary identifier used by the observation endpoints;
/// climatology datasets key stations by `indicativo` instead. [`Station::id`]
/// abstracts over the two.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Station {
    #[serde(default)]
    pub idema: Option<String>,
    #[serde(default)]
    pub indicativo: Option<String>,
    /// Display name, e.g. `MADRID, RETIRO`.
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub provincia: Option<String>,
    /// Raw latitude as served upstream (decimal or DMS).
    #[serde(default)]
    pub latitud: Option<String>,
    /// Raw longitude as served upstream (decimal or DMS).
    #[serde(default)]
    pub longitud: Option<String>,
    /// Remaining upstream fields (elevation, synop indicative, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Station {
    /// The station identifier: `idema` where present, `indicativo` otherwise.
    pub fn id(&self) -> Option<&str> {
        self.idema.as_deref().or(self.indicativo.as_deref())
    }

    /// Decimal-degree coordinates derived from the raw strings.
    ///
    /// `None` when either raw field is absent. Unparseable raw values pass
    /// through [`parse_coordinate`]'s `0.0` sentinel rather than failing.
    pub fn coordinates(&self) -> Option<LatLon> {
        let latitude = self.latitud.as_deref()?;
        let longitude = self.longitud.as_deref()?;
        Some(LatLon(
            parse_coordinate(latitude),
            parse_coordinate(longitude),
        ))
    }
}

/// Result of a nearest-station search: the station plus its great-circle
/// distance from the query point, in kilometers rounded to two decimals.
#[derive(Debug, Clone, Serialize)]
pub struct NearestStation {
    #[serde(flatten)]
    pub station: Station,
    pub distance_km: f64,
}
