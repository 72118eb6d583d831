use crate::problem::{coordinate::Coordinate, kilometers::Kilometers};

/// Mean Earth radius
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    let h = s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2;

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn haversine(a: &Coordinate, b: &Coordinate) -> Kilometers {
    Kilometers::new(haversine_km(a, b))
}

/// Sum of consecutive hops along a `(lng, lat)` path.
pub fn path_length(path: &geo::LineString<f64>) -> Kilometers {
    path.lines()
        .map(|line| haversine(&line.start.into(), &line.end.into()))
        .sum()
}
