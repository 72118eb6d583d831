use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `None` unless both components are finite and within WGS84 bounds.
    pub fn try_new(lat: f64, lng: f64) -> Option<Self> {
        let coordinate = Self::new(lat, lng);
        coordinate.is_valid().then_some(coordinate)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// `(0, 0)` is what spreadsheets leave behind for an empty cell.
    pub fn is_null_island(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo::Point::new(coordinate.lng, coordinate.lat)
    }
}

impl From<&Coordinate> for geo::Point<f64> {
    fn from(coordinate: &Coordinate) -> Self {
        geo::Point::new(coordinate.lng, coordinate.lat)
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo::Coord {
            x: coordinate.lng,
            y: coordinate.lat,
        }
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Self {
        Coordinate::new(point.y(), point.x())
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(coord: geo::Coord<f64>) -> Self {
        Coordinate::new(coord.y, coord.x)
    }
}
