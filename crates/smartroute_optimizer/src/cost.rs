use crate::problem::{kilometers::Kilometers, route::Route, route_config::RouteConfig};

/// `distance * cost_per_km + stops * cost_per_point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub cost_per_km: f64,
    pub cost_per_point: f64,
}

impl From<&RouteConfig> for CostModel {
    fn from(config: &RouteConfig) -> Self {
        Self {
            cost_per_km: config.cost_per_km,
            cost_per_point: config.cost_per_point,
        }
    }
}

impl CostModel {
    pub fn estimate(&self, distance: Kilometers, stops: usize) -> f64 {
        distance.value() * self.cost_per_km + stops as f64 * self.cost_per_point
    }

    /// Recomputes the route's cost from its current distance and stop count.
    /// Unassigned orders aren't driven, so they cost nothing.
    pub fn annotate(&self, route: &mut Route) {
        route.estimated_cost = if route.is_unassigned() {
            0.0
        } else {
            self.estimate(route.total_distance_km, route.len())
        };
    }
}
