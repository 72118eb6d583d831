use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::polyline::{POLYLINE_PRECISION, PolylineError, decode_polyline};

use super::{coordinate::Coordinate, kilometers::Kilometers, order::Order};

pub const ROUTE_COLORS: [&str; 12] = [
    "#2DE1C2", "#5B67C9", "#F6E05E", "#F687B3", "#68D391", "#63B3ED", "#ED8936", "#9F7AEA",
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4",
];

pub const UNASSIGNED_COLOR: &str = "#A0AEC0";
pub const UNASSIGNED_ROUTE_NAME: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Sequenced by the external solver
    Optimized,
    /// Sequenced locally by nearest neighbor
    Sequenced,
    /// Orders the solver could not place
    Unassigned,
}

/// An ordered stop sequence. Orders are shared, read-only views of the run's input.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    pub kind: RouteKind,
    pub orders: Vec<Arc<Order>>,
    pub total_distance_km: Kilometers,
    pub estimated_cost: f64,

    /// Flat fee paid to the shipper on top of `estimated_cost`
    #[serde(default)]
    pub extra_fee: f64,
    pub centroid: Coordinate,

    /// Encoded polyline, empty when there's no path
    pub geometry: String,
    pub color: String,
}

impl Route {
    pub fn unassigned(
        id: impl Into<String>,
        orders: Vec<Arc<Order>>,
        centroid: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: UNASSIGNED_ROUTE_NAME.to_owned(),
            kind: RouteKind::Unassigned,
            orders,
            total_distance_km: Kilometers::ZERO,
            estimated_cost: 0.0,
            extra_fee: 0.0,
            centroid,
            geometry: String::new(),
            color: UNASSIGNED_COLOR.to_owned(),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn is_unassigned(&self) -> bool {
        self.kind == RouteKind::Unassigned
    }

    pub fn order_ids(&self) -> impl Iterator<Item = &str> {
        self.orders.iter().map(|order| order.id.as_str())
    }

    pub fn position_of(&self, order_id: &str) -> Option<usize> {
        self.orders.iter().position(|order| order.id == order_id)
    }

    pub fn path(&self) -> Result<geo::LineString<f64>, PolylineError> {
        decode_polyline(&self.geometry, POLYLINE_PRECISION)
    }

    /// Cash the shipper collects on this route.
    pub fn total_cod(&self) -> f64 {
        self.orders.iter().map(|order| order.cod).sum()
    }

    pub fn shipping_fee(&self) -> f64 {
        self.estimated_cost + self.extra_fee
    }

    /// What the shipper hands back after keeping the shipping fee. Negative
    /// when the fee exceeds the collected cash.
    pub fn net_collection(&self) -> f64 {
        self.total_cod() - self.shipping_fee()
    }
}
