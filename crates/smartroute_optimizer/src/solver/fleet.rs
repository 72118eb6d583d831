use tracing::debug;

use crate::problem::route_config::RouteConfig;

use super::settings::SolverSettings;

/// How many vehicles to offer the solver, and with what capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetPlan {
    /// Vehicles strictly needed to carry every order
    pub min_vehicles: usize,
    pub vehicle_count: usize,

    /// Stop-count capacity, `None` when capacity must never reject a job
    pub capacity: Option<u32>,
}

impl FleetPlan {
    pub fn new(order_count: usize, config: &RouteConfig, settings: &SolverSettings) -> Self {
        let max_orders = config.max_orders_per_shipper.max(1);

        if config.force_single_vehicle {
            debug!(
                effective_capacity = order_count.max(max_orders),
                "Single vehicle without capacity"
            );

            return Self {
                min_vehicles: 1,
                vehicle_count: 1,
                capacity: None,
            };
        }

        let min_vehicles = order_count.div_ceil(max_orders);
        let provisioned = (min_vehicles as f64 * settings.over_provision_factor).ceil() as usize;

        Self {
            min_vehicles,
            vehicle_count: provisioned.max(settings.min_fleet_size),
            capacity: Some(u32::try_from(max_orders).unwrap_or(u32::MAX)),
        }
    }

    pub fn enforces_capacity(&self) -> bool {
        self.capacity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_orders_per_shipper: usize, force_single_vehicle: bool) -> RouteConfig {
        RouteConfig {
            max_orders_per_shipper,
            force_single_vehicle,
            ..RouteConfig::default()
        }
    }

    #[test]
    fn test_over_provisions_vehicles() {
        let plan = FleetPlan::new(23, &config(10, false), &SolverSettings::default());

        assert_eq!(plan.min_vehicles, 3);
        assert_eq!(plan.vehicle_count, 5);
        assert_eq!(plan.capacity, Some(10));
    }

    #[test]
    fn test_large_cluster_exceeds_min_fleet() {
        let plan = FleetPlan::new(95, &config(10, false), &SolverSettings::default());

        assert_eq!(plan.min_vehicles, 10);
        assert_eq!(plan.vehicle_count, 15);
    }

    #[test]
    fn test_forced_single_vehicle() {
        let plan = FleetPlan::new(23, &config(10, true), &SolverSettings::default());

        assert_eq!(plan.vehicle_count, 1);
        assert_eq!(plan.capacity, None);
        assert!(!plan.enforces_capacity());
    }
}
