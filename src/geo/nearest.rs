//! Nearest-station lookup over the station inventory.

use crate::types::station::{LatLon, NearestStation, Station};
use haversine::{distance, Location, Units};

/// Great-circle distance between two points in kilometers (Haversine,
/// Earth radius 6371 km).
pub fn distance_km(from: LatLon, to: LatLon) -> f64 {
    distance(
        Location {
            latitude: from.0,
            longitude: from.1,
        },
        Location {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}

/// Finds the station closest to `(latitude, longitude)`.
///
/// Linear scan over every station that carries both raw coordinate fields.
/// Ties go to the first-encountered station. The returned distance is
/// rounded to two decimal places. Returns `None` when no station has
/// coordinates.
pub fn find_nearest(latitude: f64, longitude: f64, stations: &[Station]) -> Option<NearestStation> {
    let query = LatLon(latitude, longitude);
    let mut nearest: Option<(&Station, f64)> = None;

    for station in stations {
        let Some(coordinates) = station.coordinates() else {
            continue;
        };
        let km = distance_km(query, coordinates);
        match nearest {
            Some((_, best)) if km >= best => {}
            _ => nearest = Some((station, km)),
        }
    }

    nearest.map(|(station, km)| NearestStation {
        station: station.clone(),
        distance_km: (km * 100.0).round() / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, name: &str, lat: &str, lon: &str) -> Station {
        Station {
            idema: Some(id.to_string()),
            nombre: Some(name.to_string()),
            latitud: Some(lat.to_string()),
            longitud: Some(lon.to_string()),
            ..Station::default()
        }
    }

    #[test]
    fn distance_between_identical_points_is_zero() {
        let madrid = LatLon(40.4167, -3.7038);
        assert_eq!(distance_km(madrid, madrid), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let madrid = LatLon(40.4167, -3.7038);
        let barcelona = LatLon(41.3879, 2.1699);
        let there = distance_km(madrid, barcelona);
        let back = distance_km(barcelona, madrid);
        assert!((there - back).abs() < 1e-9);
        // Sanity: Madrid-Barcelona is roughly 500 km.
        assert!(there > 400.0 && there < 600.0);
    }

    #[test]
    fn query_next_to_madrid_returns_madrid() {
        let stations = vec![
            station("3195", "MADRID RETIRO", "40.4167", "-3.7038"),
            station("0201D", "BARCELONA", "41.3879", "2.1699"),
        ];

        let nearest = find_nearest(40.4168, -3.7038, &stations).expect("a nearest station");
        assert_eq!(nearest.station.id(), Some("3195"));
        assert!(nearest.distance_km <= 0.02); // ~11 m away, ≈ 0 km
    }

    #[test]
    fn stations_without_coordinates_are_skipped() {
        let mut no_coords = station("X", "NOWHERE", "0", "0");
        no_coords.latitud = None;
        no_coords.longitud = None;

        assert!(find_nearest(40.0, -3.0, &[no_coords.clone()]).is_none());

        let stations = vec![no_coords, station("3195", "MADRID RETIRO", "40.4167", "-3.7038")];
        let nearest = find_nearest(40.4167, -3.7038, &stations).expect("a nearest station");
        assert_eq!(nearest.station.id(), Some("3195"));
    }

    #[test]
    fn ties_resolve_to_first_encountered() {
        let stations = vec![
            station("FIRST", "A", "40.0", "-3.0"),
            station("SECOND", "B", "40.0", "-3.0"),
        ];
        let nearest = find_nearest(40.0, -3.0, &stations).expect("a nearest station");
        assert_eq!(nearest.station.id(), Some("FIRST"));
    }
}
