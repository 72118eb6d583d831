use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Per-run knobs. Immutable for the duration of one optimization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteConfig {
    /// Stop-count capacity of one vehicle
    pub max_orders_per_shipper: usize,
    pub cost_per_km: f64,
    pub cost_per_point: f64,

    /// Produce exactly one route containing every order
    pub force_single_vehicle: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            max_orders_per_shipper: 10,
            cost_per_km: 5000.0,
            cost_per_point: 0.0,
            force_single_vehicle: false,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_orders_per_shipper == 0 {
            return Err(PlanError::InvalidConfig(String::from(
                "maxOrdersPerShipper must be greater than 0",
            )));
        }

        for (name, value) in [
            ("costPerKm", self.cost_per_km),
            ("costPerPoint", self.cost_per_point),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        Ok(())
    }
}
