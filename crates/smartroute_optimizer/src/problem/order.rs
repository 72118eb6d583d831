use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// A delivery stop. Everything except `coordinates` is opaque to the optimizer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,

    /// Cash on delivery
    #[serde(default)]
    pub cod: f64,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub phone_number: String,

    #[serde(default)]
    pub note: String,
}

impl Order {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            coordinates: None,
            cod: 0.0,
            customer_name: String::new(),
            phone_number: String::new(),
            note: String::new(),
        }
    }

    pub fn with_coordinates(mut self, coordinates: Coordinate) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Coordinates usable for clustering and solving, if any.
    pub fn location(&self) -> Option<Coordinate> {
        self.coordinates
            .filter(|coordinates| coordinates.is_valid() && !coordinates.is_null_island())
    }

    pub fn is_located(&self) -> bool {
        self.location().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_order() {
        let order: Order =
            serde_json::from_str(r#"{ "id": "ORD-001", "address": "123 Le Loi District 1" }"#)
                .unwrap();

        assert_eq!(order.id, "ORD-001");
        assert_eq!(order.coordinates, None);
        assert_eq!(order.cod, 0.0);
        assert!(!order.is_located());
    }

    #[test]
    fn test_deserialize_camel_case_fields() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "ORD-002",
                "address": "456 Nguyen Hue",
                "customerName": "Tran Thi B",
                "phoneNumber": "0902345678",
                "cod": 250000,
                "coordinates": { "lat": 10.7769, "lng": 106.7009 }
            }"#,
        )
        .unwrap();

        assert_eq!(order.customer_name, "Tran Thi B");
        assert_eq!(order.cod, 250000.0);
        assert_eq!(order.location(), Some(Coordinate::new(10.7769, 106.7009)));
    }

    #[test]
    fn test_null_island_is_not_a_location() {
        let order = Order::new("A", "x").with_coordinates(Coordinate::new(0.0, 0.0));

        assert!(!order.is_located());
    }
}
