//! Observation and climatology payload structures.
//!
//! The four dataset categories share no schema, so each struct pins its
//! identifying fields and keeps the meteorological variables in a flattened
//! map, read through a numeric accessor. Climatology datasets encode
//! decimals with commas (`"15,4"`); the accessor normalizes that.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// A single near-real-time observation from the conventional network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Station identifier.
    #[serde(default)]
    pub idema: Option<String>,
    /// End of the observation interval, e.g. `2024-03-01T12:00:00`.
    #[serde(default)]
    pub fint: Option<String>,
    /// Meteorological variable codes to values (`ta`, `hr`, `prec`, `vv`,
    /// `pres`, ...).
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Observation {
    /// Numeric value of a variable code, if present and numeric.
    pub fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).and_then(numeric_value)
    }

    /// Observation timestamp parsed from `fint`.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.fint.as_deref()?;
        NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S").ok()
    }
}

/// One day of a daily climatological series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateDay {
    /// Station identifier (climatology datasets use `indicativo`).
    #[serde(default)]
    pub indicativo: Option<String>,
    /// Day of the record, e.g. `2023-01-01`.
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl ClimateDay {
    /// Numeric value of a daily variable (`tmax`, `tmin`, `prec`, ...),
    /// with comma decimals normalized.
    pub fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).and_then(numeric_value)
    }

    /// Record date parsed from `fecha`.
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.fecha.as_deref()?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
    }
}

/// Climate normal values for a station over the fixed reference period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateNormal {
    #[serde(default)]
    pub indicativo: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl ClimateNormal {
    /// Reference period of the normals dataset.
    pub const REFERENCE_PERIOD: (i32, i32) = (1991, 2020);

    /// Numeric value of a normal, with comma decimals normalized.
    pub fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).and_then(numeric_value)
    }
}
