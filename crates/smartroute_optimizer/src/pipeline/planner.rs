//! Drives one optimization run: geocode, cluster, solve each cluster, finalize.

use std::sync::Arc;

use futures::{StreamExt, stream::FuturesUnordered};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use smartroute_providers::{geocoding::Geocoder, vrp::RouteSolver};
use tracing::{info, instrument, warn};

use crate::{
    clustering::{KMeansParams, OrderCluster, cluster_count, kmeans, nearest_neighbor_sequence},
    cost::CostModel,
    error::{Exclusion, PlanError, PlanStage, SolverFallback},
    geometry::polyline::{POLYLINE_PRECISION, encode_polyline},
    problem::{
        coordinate::Coordinate,
        kilometers::Kilometers,
        order::Order,
        route::{ROUTE_COLORS, Route, RouteKind},
        route_config::RouteConfig,
    },
    solver::{
        orchestrator::{ClusterSolution, SolverOrchestrator},
        settings::SolverSettings,
    },
};

use super::{
    cancel::CancelToken,
    geocode_stage::{GeocodeSettings, geocode_orders},
};

pub const UNASSIGNED_ROUTE_ID: &str = "unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanProgress {
    Geocoding { done: usize, total: usize },
    Clustering { k: usize },
    Solving { done: usize, total: usize },
}

pub type ProgressCallback = Box<dyn Fn(PlanProgress) + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct PlannerParams {
    pub config: RouteConfig,
    pub solver: SolverSettings,
    pub geocode: GeocodeSettings,
    pub kmeans: KMeansParams,

    /// Seeds centroid sampling, OS entropy when unset
    pub seed: Option<u64>,

    /// Sequence every cluster locally instead of calling the solver
    pub skip_solver: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub requested: usize,

    /// Orders with usable coordinates after geocoding
    pub geocoded: usize,
    pub excluded: Vec<Exclusion>,
    pub fallbacks: Vec<SolverFallback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// Routes a vehicle drives, the unassigned route isn't counted
    pub route_count: usize,
    pub unassigned_count: usize,
    pub total_distance_km: Kilometers,
    pub total_cost: f64,

    /// Cash collected on driven routes
    pub total_cod: f64,
    pub total_extra_fee: f64,
    pub net_collection: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub routes: Vec<Route>,
    pub report: PlanReport,
}

impl PlanOutcome {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        let driven = self.routes.iter().filter(|route| !route.is_unassigned());

        PlanSummary {
            route_count: driven.clone().count(),
            unassigned_count: self
                .routes
                .iter()
                .filter(|route| route.is_unassigned())
                .map(Route::len)
                .sum(),
            total_distance_km: driven.clone().map(|route| route.total_distance_km).sum(),
            total_cost: driven.clone().map(|route| route.estimated_cost).sum(),
            total_cod: driven.clone().map(Route::total_cod).sum(),
            total_extra_fee: driven.clone().map(|route| route.extra_fee).sum(),
            net_collection: driven.map(Route::net_collection).sum(),
        }
    }
}

struct ClusterOutcome {
    solution: ClusterSolution,
    fallback: Option<SolverFallback>,
}

pub struct Planner<G, S> {
    geocoder: G,
    solver: S,
    params: PlannerParams,
    cancel: CancelToken,
    on_progress: Option<ProgressCallback>,
}

impl<G, S> Planner<G, S> {
    pub fn new(geocoder: G, solver: S, params: PlannerParams) -> Self {
        Self {
            geocoder,
            solver,
            params,
            cancel: CancelToken::new(),
            on_progress: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(
        mut self,
        on_progress: impl Fn(PlanProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn report_progress(&self, progress: PlanProgress) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(progress);
        }
    }

    fn ensure_not_cancelled(&self, stage: PlanStage) -> Result<(), PlanError> {
        if self.cancel.is_cancelled() {
            return Err(PlanError::Cancelled { stage });
        }

        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl<G, S> Planner<G, S>
where
    G: Geocoder + Sync,
    S: RouteSolver + Sync,
{
    /// Plans routes for `orders` from `origin`.
    ///
    /// Coordinates found while geocoding are written back onto `orders`, also
    /// when the run is cancelled. Orders that can't be located are left out
    /// and listed in the report.
    #[instrument(skip_all, level = "debug", fields(orders = orders.len()))]
    pub async fn plan(
        &self,
        orders: &mut [Order],
        origin: Coordinate,
    ) -> Result<PlanOutcome, PlanError> {
        let config = &self.params.config;
        config.validate()?;

        if !origin.is_valid() {
            return Err(PlanError::InvalidConfig(format!(
                "Origin ({}, {}) is not a valid coordinate",
                origin.lat, origin.lng
            )));
        }

        if orders.is_empty() {
            info!("No orders to plan");
            return Ok(PlanOutcome::default());
        }

        self.ensure_not_cancelled(PlanStage::Geocoding)?;

        let geocoding = geocode_orders(
            &self.geocoder,
            orders,
            &self.params.geocode,
            &self.cancel,
            |done, total| self.report_progress(PlanProgress::Geocoding { done, total }),
        )
        .await?;

        self.ensure_not_cancelled(PlanStage::Clustering)?;

        let located = orders
            .iter()
            .filter(|order| order.is_located())
            .cloned()
            .map(Arc::new)
            .collect::<Vec<_>>();

        let mut report = PlanReport {
            requested: orders.len(),
            geocoded: located.len(),
            excluded: geocoding.excluded,
            fallbacks: vec![],
        };

        if located.is_empty() {
            warn!(requested = report.requested, "No order could be located");
            return Ok(PlanOutcome {
                routes: vec![],
                report,
            });
        }

        let k = if config.force_single_vehicle {
            1
        } else {
            cluster_count(located.len(), config.max_orders_per_shipper)
        };
        self.report_progress(PlanProgress::Clustering { k });

        let clustering = kmeans(&located, origin, k, &self.params.kmeans, &mut self.rng());
        report.excluded.extend(clustering.excluded);

        info!(
            k,
            clusters = clustering.clusters.len(),
            iterations = clustering.iterations,
            "Clustered orders"
        );

        self.ensure_not_cancelled(PlanStage::Solving)?;

        let mut routes = vec![];
        for outcome in self.solve_clusters(&clustering.clusters, origin).await? {
            routes.extend(outcome.solution.routes);
            report.excluded.extend(outcome.solution.excluded);
            report.fallbacks.extend(outcome.fallback);
        }

        let routes = finalize_routes(routes, origin);

        info!(
            routes = routes.len(),
            excluded = report.excluded.len(),
            fallbacks = report.fallbacks.len(),
            "Planning finished"
        );

        Ok(PlanOutcome { routes, report })
    }

    /// Re-solves one route as a single vehicle starting at its centroid. The
    /// route keeps its id, name and color.
    #[instrument(skip_all, level = "debug", fields(route = %route.id))]
    pub async fn reoptimize_route(&self, route: &Route) -> Result<Route, PlanError> {
        if let Some(order) = route.orders.iter().find(|order| !order.is_located()) {
            return Err(PlanError::MissingCoordinates {
                order_id: order.id.clone(),
            });
        }

        if route.is_empty() {
            return Ok(route.clone());
        }

        let config = RouteConfig {
            force_single_vehicle: true,
            ..self.params.config.clone()
        };
        let orchestrator = SolverOrchestrator::new(&self.solver, &self.params.solver);
        let solution = orchestrator
            .solve_cluster(0, &route.orders, route.centroid, &config)
            .await?;

        let Some(solved) = solution.routes.into_iter().next() else {
            return Err(PlanError::SolverUnavailable {
                reason: String::from("Solver returned no route"),
            });
        };

        Ok(Route {
            id: route.id.clone(),
            name: route.name.clone(),
            color: route.color.clone(),
            centroid: route.centroid,
            extra_fee: route.extra_fee,
            ..solved
        })
    }

    async fn solve_clusters(
        &self,
        clusters: &[OrderCluster],
        origin: Coordinate,
    ) -> Result<Vec<ClusterOutcome>, PlanError> {
        let orchestrator = SolverOrchestrator::new(&self.solver, &self.params.solver);
        let total = clusters.len();

        let mut pending = clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| {
                let orchestrator = &orchestrator;
                async move {
                    let outcome = self
                        .solve_cluster(orchestrator, index, cluster, origin)
                        .await;
                    (index, outcome)
                }
            })
            .collect::<FuturesUnordered<_>>();

        let mut outcomes = Vec::with_capacity(total);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    return Err(PlanError::Cancelled { stage: PlanStage::Solving });
                }

                next = pending.next() => match next {
                    Some(outcome) => {
                        outcomes.push(outcome);
                        self.report_progress(PlanProgress::Solving { done: outcomes.len(), total });
                    }
                    None => break,
                }
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);

        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }

    async fn solve_cluster(
        &self,
        orchestrator: &SolverOrchestrator<'_, S>,
        index: usize,
        cluster: &OrderCluster,
        origin: Coordinate,
    ) -> ClusterOutcome {
        let config = &self.params.config;

        if self.params.skip_solver {
            return ClusterOutcome {
                solution: sequence_cluster(index, cluster, origin, config),
                fallback: None,
            };
        }

        match orchestrator
            .solve_cluster(index, &cluster.orders, origin, config)
            .await
        {
            Ok(solution) => ClusterOutcome {
                solution,
                fallback: None,
            },
            Err(error) => {
                warn!(
                    cluster = index,
                    %error,
                    "Solver failed, sequencing cluster by nearest neighbor"
                );

                ClusterOutcome {
                    solution: sequence_cluster(index, cluster, origin, config),
                    fallback: Some(SolverFallback {
                        cluster_index: index,
                        reason: error.to_string(),
                    }),
                }
            }
        }
    }
}

fn sequence_cluster(
    index: usize,
    cluster: &OrderCluster,
    origin: Coordinate,
    config: &RouteConfig,
) -> ClusterSolution {
    let sequence = nearest_neighbor_sequence(&cluster.orders, origin);

    if sequence.orders.is_empty() {
        return ClusterSolution {
            routes: vec![],
            excluded: sequence.excluded,
        };
    }

    let mut route = Route {
        id: format!("R{index}-1"),
        name: String::from("Route 1"),
        kind: RouteKind::Sequenced,
        orders: sequence.orders,
        total_distance_km: sequence.distance,
        estimated_cost: 0.0,
        extra_fee: 0.0,
        centroid: cluster.centroid,
        geometry: encode_polyline(&sequence.path, POLYLINE_PRECISION),
        color: ROUTE_COLORS[0].to_owned(),
    };
    CostModel::from(config).annotate(&mut route);

    ClusterSolution {
        routes: vec![route],
        excluded: sequence.excluded,
    }
}

/// Numbers driven routes in output order, cycles the palette, and gathers
/// every unassigned order into one trailing route.
fn finalize_routes(routes: Vec<Route>, origin: Coordinate) -> Vec<Route> {
    let mut unassigned = vec![];
    let mut driven = vec![];

    for route in routes {
        if route.is_unassigned() {
            unassigned.extend(route.orders);
        } else if !route.is_empty() {
            driven.push(route);
        }
    }

    for (position, route) in driven.iter_mut().enumerate() {
        route.name = format!("Route {}", position + 1);
        route.color = ROUTE_COLORS[position % ROUTE_COLORS.len()].to_owned();
    }

    if !unassigned.is_empty() {
        driven.push(Route::unassigned(UNASSIGNED_ROUTE_ID, unassigned, origin));
    }

    driven
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use fxhash::FxHashMap;
    use smartroute_providers::{track_asia_api::ProviderError, vrp::VrpResponse};

    use crate::{
        problem::route::UNASSIGNED_ROUTE_NAME,
        test_utils::{FakeGeocoder, FakeSolver, chunked_response, order_with_cod, route_with},
    };

    use super::*;

    const ORIGIN: Coordinate = Coordinate::new(10.769034, 106.694945);

    fn three_zone_orders() -> Vec<Order> {
        [
            ("A1", 10.7700, 106.6960),
            ("A2", 10.7710, 106.6970),
            ("B1", 10.8500, 106.7500),
            ("B2", 10.8510, 106.7510),
            ("C1", 10.7000, 106.6200),
            ("C2", 10.7010, 106.6210),
        ]
        .into_iter()
        .map(|(id, lat, lng)| {
            Order::new(id, format!("{id} street")).with_coordinates(Coordinate::new(lat, lng))
        })
        .collect()
    }

    fn params(config: RouteConfig) -> PlannerParams {
        PlannerParams {
            config,
            seed: Some(11),
            ..PlannerParams::default()
        }
    }

    fn occurrences(outcome: &PlanOutcome) -> FxHashMap<String, usize> {
        let mut seen = FxHashMap::default();
        for route in &outcome.routes {
            for id in route.order_ids() {
                *seen.entry(id.to_owned()).or_default() += 1;
            }
        }
        seen
    }

    #[tokio::test]
    async fn test_empty_input() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| Ok(chunked_response(request, 10))),
            PlannerParams::default(),
        );

        let outcome = planner.plan(&mut [], ORIGIN).await.unwrap();

        assert!(outcome.is_empty());
        assert_eq!(outcome.report, PlanReport::default());
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| Ok(chunked_response(request, 10))),
            params(RouteConfig {
                max_orders_per_shipper: 0,
                ..RouteConfig::default()
            }),
        );

        let result = planner.plan(&mut three_zone_orders(), ORIGIN).await;

        assert!(matches!(result, Err(PlanError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_every_order_routed_once() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| Ok(chunked_response(request, 2))),
            params(RouteConfig {
                max_orders_per_shipper: 2,
                ..RouteConfig::default()
            }),
        );
        let mut orders = three_zone_orders();

        let outcome = planner.plan(&mut orders, ORIGIN).await.unwrap();

        let seen = occurrences(&outcome);
        assert_eq!(seen.len(), 6);
        assert!(seen.values().all(|&count| count == 1));
        assert!(outcome.routes.iter().all(|route| route.len() <= 2));
        assert!(outcome.routes.iter().all(|route| route.kind == RouteKind::Optimized));

        for (position, route) in outcome.routes.iter().enumerate() {
            assert_eq!(route.name, format!("Route {}", position + 1));
            assert_eq!(route.color, ROUTE_COLORS[position % ROUTE_COLORS.len()]);
        }

        let summary = outcome.summary();
        assert_eq!(summary.route_count, outcome.routes.len());
        assert_eq!(summary.unassigned_count, 0);
        let expected: f64 = outcome
            .routes
            .iter()
            .map(|route| route.total_distance_km.value())
            .sum();
        assert!((summary.total_distance_km.value() - expected).abs() < 1e-9);

        assert_eq!(outcome.report.requested, 6);
        assert_eq!(outcome.report.geocoded, 6);
        assert!(outcome.report.excluded.is_empty());
        assert!(planner.solver.requests().len() <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_geocodes_and_reports_unresolved_orders() {
        let geocoder = FakeGeocoder::default()
            .with_address("1 Le Loi", 10.7756, 106.7004)
            .with_address("2 Nguyen Hue", 10.7740, 106.7038);
        let planner = Planner::new(
            geocoder,
            FakeSolver::new(|request| Ok(chunked_response(request, 10))),
            params(RouteConfig::default()),
        );
        let mut orders = vec![
            Order::new("A", "1 Le Loi"),
            Order::new("B", "2 Nguyen Hue"),
            Order::new("C", "somewhere unknown"),
        ];

        let outcome = planner.plan(&mut orders, ORIGIN).await.unwrap();

        assert_eq!(outcome.report.requested, 3);
        assert_eq!(outcome.report.geocoded, 2);
        assert_eq!(
            outcome.report.excluded,
            vec![Exclusion::new("C", crate::error::ExclusionReason::GeocodeNotFound)]
        );
        assert_eq!(occurrences(&outcome).len(), 2);
        assert!(orders[0].is_located());
        assert!(!orders[2].is_located());
    }

    #[tokio::test]
    async fn test_solver_failure_falls_back_per_cluster() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|_| {
                Err(ProviderError::Api {
                    status: 503,
                    message: String::from("Service Unavailable"),
                })
            }),
            params(RouteConfig {
                max_orders_per_shipper: 2,
                ..RouteConfig::default()
            }),
        );

        let outcome = planner.plan(&mut three_zone_orders(), ORIGIN).await.unwrap();

        assert_eq!(occurrences(&outcome).len(), 6);
        assert!(outcome.routes.iter().all(|route| route.kind == RouteKind::Sequenced));
        assert_eq!(outcome.report.fallbacks.len(), planner.solver.requests().len());
        assert!(!outcome.report.fallbacks.is_empty());
    }

    #[tokio::test]
    async fn test_skip_solver_sequences_locally() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| Ok(chunked_response(request, 10))),
            PlannerParams {
                skip_solver: true,
                ..params(RouteConfig::default())
            },
        );

        let outcome = planner.plan(&mut three_zone_orders(), ORIGIN).await.unwrap();

        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.routes[0].kind, RouteKind::Sequenced);
        assert!(outcome.report.fallbacks.is_empty());
        assert!(planner.solver.requests().is_empty());
    }

    #[tokio::test]
    async fn test_single_vehicle_contains_every_order() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            // Two jobs per route and the last two left out
            FakeSolver::new(|request| {
                let mut placed = request.clone();
                placed.jobs.truncate(request.jobs.len().saturating_sub(2));
                Ok(chunked_response(&placed, 2))
            }),
            params(RouteConfig {
                max_orders_per_shipper: 2,
                force_single_vehicle: true,
                ..RouteConfig::default()
            }),
        );

        let outcome = planner.plan(&mut three_zone_orders(), ORIGIN).await.unwrap();

        assert_eq!(outcome.routes.len(), 1);
        assert_eq!(outcome.routes[0].len(), 6);
        assert_eq!(occurrences(&outcome).len(), 6);
        assert_eq!(planner.solver.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unassigned_orders_gathered_in_one_route() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| {
                let mut placed = request.clone();
                placed.jobs.truncate(request.jobs.len() - 1);
                Ok(chunked_response(&placed, 2))
            }),
            params(RouteConfig {
                max_orders_per_shipper: 2,
                ..RouteConfig::default()
            }),
        );

        let outcome = planner.plan(&mut three_zone_orders(), ORIGIN).await.unwrap();

        let unassigned = outcome
            .routes
            .iter()
            .filter(|route| route.is_unassigned())
            .collect::<Vec<_>>();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].name, UNASSIGNED_ROUTE_NAME);
        assert_eq!(unassigned[0].len(), planner.solver.requests().len());
        assert!(outcome.routes.last().unwrap().is_unassigned());
        assert_eq!(occurrences(&outcome).len(), 6);
        assert_eq!(
            outcome.summary().unassigned_count,
            planner.solver.requests().len()
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| Ok(chunked_response(request, 10))),
            params(RouteConfig::default()),
        );
        planner.cancel_token().cancel();

        let result = planner.plan(&mut three_zone_orders(), ORIGIN).await;

        assert!(matches!(
            result,
            Err(PlanError::Cancelled {
                stage: PlanStage::Geocoding
            })
        ));
    }

    #[tokio::test]
    async fn test_progress_events() {
        let events = Arc::new(Mutex::new(vec![]));
        let recorded = events.clone();
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| Ok(chunked_response(request, 2))),
            params(RouteConfig {
                max_orders_per_shipper: 2,
                ..RouteConfig::default()
            }),
        )
        .with_progress(move |progress| recorded.lock().unwrap().push(progress));

        planner.plan(&mut three_zone_orders(), ORIGIN).await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events[0], PlanProgress::Clustering { k: 3 });
        assert!(matches!(
            events.last(),
            Some(PlanProgress::Solving { done, total }) if done == total
        ));
    }

    #[tokio::test]
    async fn test_reoptimize_route_keeps_identity() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|request| {
                let mut reversed = request.clone();
                reversed.jobs.reverse();
                Ok(chunked_response(&reversed, 1))
            }),
            params(RouteConfig::default()),
        );
        let orders = three_zone_orders().into_iter().map(Arc::new).collect();
        let route = Route {
            id: String::from("R0-1"),
            name: String::from("Route 4"),
            kind: RouteKind::Sequenced,
            orders,
            total_distance_km: Kilometers::ZERO,
            estimated_cost: 0.0,
            extra_fee: 15_000.0,
            centroid: ORIGIN,
            geometry: String::new(),
            color: String::from("#123456"),
        };

        let reoptimized = planner.reoptimize_route(&route).await.unwrap();

        assert_eq!(reoptimized.id, "R0-1");
        assert_eq!(reoptimized.name, "Route 4");
        assert_eq!(reoptimized.color, "#123456");
        assert_eq!(reoptimized.extra_fee, 15_000.0);
        assert_eq!(reoptimized.kind, RouteKind::Optimized);
        assert_eq!(
            reoptimized.order_ids().collect::<Vec<_>>(),
            vec!["C2", "C1", "B2", "B1", "A2", "A1"]
        );
        assert!(reoptimized.total_distance_km.value() > 0.0);
        assert!(reoptimized.estimated_cost > 0.0);

        let requests = planner.solver.requests();
        assert_eq!(requests[0].vehicles.len(), 1);
        assert_eq!(requests[0].vehicles[0].start, ORIGIN.lng_lat());
    }

    #[tokio::test]
    async fn test_reoptimize_requires_coordinates() {
        let planner = Planner::new(
            FakeGeocoder::default(),
            FakeSolver::new(|_| Ok(VrpResponse::default())),
            params(RouteConfig::default()),
        );
        let route = Route::unassigned(
            "U",
            vec![Arc::new(Order::new("X", "no coordinates"))],
            ORIGIN,
        );

        let result = planner.reoptimize_route(&route).await;

        assert!(matches!(
            result,
            Err(PlanError::MissingCoordinates { order_id }) if order_id == "X"
        ));
    }

    #[test]
    fn test_summary_reconciles_cod_on_driven_routes() {
        let mut first = route_with(
            "R0-1",
            vec![order_with_cod("A", 300_000.0), order_with_cod("B", 50_000.0)],
            Kilometers::new(4.0),
        );
        first.estimated_cost = 20_000.0;
        first.extra_fee = 5_000.0;

        let mut second = route_with(
            "R1-1",
            vec![order_with_cod("C", 10_000.0)],
            Kilometers::new(3.0),
        );
        second.estimated_cost = 15_000.0;

        let unassigned = Route::unassigned(
            UNASSIGNED_ROUTE_ID,
            vec![order_with_cod("D", 999_000.0)],
            ORIGIN,
        );

        let outcome = PlanOutcome {
            routes: vec![first, second, unassigned],
            report: PlanReport::default(),
        };
        let summary = outcome.summary();

        assert_eq!(summary.route_count, 2);
        assert_eq!(summary.unassigned_count, 1);
        assert_eq!(summary.total_cod, 360_000.0);
        assert_eq!(summary.total_extra_fee, 5_000.0);
        assert_eq!(summary.net_collection, 320_000.0);
    }
}
