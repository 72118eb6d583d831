use std::sync::Arc;

use smartroute_providers::vrp::RouteSolver;
use tracing::{debug, info, instrument, warn};

use crate::{
    cost::CostModel,
    error::{Exclusion, ExclusionReason, PlanError},
    geometry::polyline::{POLYLINE_PRECISION, encode_polyline},
    problem::{
        coordinate::Coordinate,
        order::Order,
        route::{ROUTE_COLORS, Route, RouteKind},
        route_config::RouteConfig,
    },
};

use super::{
    fleet::FleetPlan,
    job_id_map::{Job, JobIdMap},
    merge::{RouteFragment, merge_fragments},
    request::build_request,
    response::parse_response,
    settings::SolverSettings,
};

#[derive(Debug, Clone, Default)]
pub struct ClusterSolution {
    /// Solver routes in solver order, then the unassigned route if any
    pub routes: Vec<Route>,
    pub excluded: Vec<Exclusion>,
}

/// Runs one cluster through the external solver and normalizes the answer.
pub struct SolverOrchestrator<'a, S> {
    solver: &'a S,
    settings: &'a SolverSettings,
}

impl<'a, S> SolverOrchestrator<'a, S>
where
    S: RouteSolver + Sync,
{
    pub fn new(solver: &'a S, settings: &'a SolverSettings) -> Self {
        Self { solver, settings }
    }

    #[instrument(skip_all, level = "debug", fields(cluster = cluster_index))]
    pub async fn solve_cluster(
        &self,
        cluster_index: usize,
        orders: &[Arc<Order>],
        origin: Coordinate,
        config: &RouteConfig,
    ) -> Result<ClusterSolution, PlanError> {
        let mut excluded = vec![];
        let mut located = Vec::with_capacity(orders.len());

        for order in orders {
            match order.location() {
                Some(location) => located.push(Job {
                    order: Arc::clone(order),
                    location,
                }),
                None => {
                    warn!(order_id = %order.id, "Order has no coordinates, not sent to solver");
                    excluded.push(Exclusion::new(
                        order.id.clone(),
                        ExclusionReason::MissingCoordinates,
                    ));
                }
            }
        }

        if located.is_empty() {
            return Ok(ClusterSolution {
                routes: vec![],
                excluded,
            });
        }

        let jobs = JobIdMap::new(located);
        let fleet = FleetPlan::new(jobs.len(), config, self.settings);
        let request = build_request(&jobs, origin, &fleet, self.settings);

        debug!(
            jobs = request.jobs.len(),
            vehicles = request.vehicles.len(),
            min_vehicles = fleet.min_vehicles,
            "Sending cluster to solver"
        );

        let response = self.solver.solve(&request).await.map_err(|error| {
            PlanError::SolverUnavailable {
                reason: error.to_string(),
            }
        })?;

        let parsed = parse_response(&jobs, response)?;
        let unassigned = parsed
            .unassigned
            .iter()
            .map(|&index| {
                let job = jobs.job(index);
                (Arc::clone(&job.order), job.location)
            })
            .collect::<Vec<_>>();

        let mut routes = if config.force_single_vehicle {
            if parsed.fragments.len() > 1 {
                info!(
                    routes = parsed.fragments.len(),
                    "Solver returned several routes for a single vehicle, merging"
                );
            }

            let mut fragment =
                merge_fragments(parsed.fragments).unwrap_or_else(|| RouteFragment::empty(origin));

            if !unassigned.is_empty() {
                warn!(
                    count = unassigned.len(),
                    "Appending unassigned orders to the single route"
                );
                fragment.absorb(origin, unassigned);
            }

            vec![optimized_route(cluster_index, 0, fragment, origin)]
        } else {
            let mut routes = parsed
                .fragments
                .into_iter()
                .enumerate()
                .map(|(position, fragment)| {
                    optimized_route(cluster_index, position, fragment, origin)
                })
                .collect::<Vec<_>>();

            if !unassigned.is_empty() {
                warn!(count = unassigned.len(), "Solver left orders unassigned");
                routes.push(Route::unassigned(
                    format!("R{cluster_index}-unassigned"),
                    unassigned.into_iter().map(|(order, _)| order).collect(),
                    origin,
                ));
            }

            routes
        };

        let cost_model = CostModel::from(config);
        for route in &mut routes {
            cost_model.annotate(route);
        }

        Ok(ClusterSolution { routes, excluded })
    }
}

fn optimized_route(
    cluster_index: usize,
    position: usize,
    fragment: RouteFragment,
    origin: Coordinate,
) -> Route {
    Route {
        id: format!("R{cluster_index}-{}", position + 1),
        name: format!("Route {}", position + 1),
        kind: RouteKind::Optimized,
        orders: fragment.orders,
        total_distance_km: fragment.distance,
        estimated_cost: 0.0,
        extra_fee: 0.0,
        centroid: origin,
        geometry: encode_polyline(&fragment.path, POLYLINE_PRECISION),
        color: ROUTE_COLORS[position % ROUTE_COLORS.len()].to_owned(),
    }
}
