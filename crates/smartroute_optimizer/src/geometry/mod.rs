pub mod haversine;
pub mod polyline;
