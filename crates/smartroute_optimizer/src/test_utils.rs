use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use fxhash::{FxHashMap, FxHashSet};
use geo::LineString;
use parking_lot::Mutex;
use rand::RngCore;
use smartroute_providers::{
    geocoding::Geocoder,
    track_asia_api::ProviderError,
    vrp::{RouteSolver, VrpRequest, VrpResponse, VrpRoute, VrpStep, VrpStepType},
};

use crate::{
    geometry::{
        haversine::path_length,
        polyline::{POLYLINE_PRECISION, encode_polyline},
    },
    problem::{
        coordinate::Coordinate,
        kilometers::Kilometers,
        order::Order,
        route::{ROUTE_COLORS, Route, RouteKind},
    },
};

pub fn located_order(id: &str, lat: f64, lng: f64) -> Arc<Order> {
    Arc::new(Order::new(id, format!("{id} address")).with_coordinates(Coordinate::new(lat, lng)))
}

pub fn order_with_cod(id: &str, cod: f64) -> Arc<Order> {
    let mut order = Order::new(id, format!("{id} address"));
    order.coordinates = Some(Coordinate::new(10.8, 106.7));
    order.cod = cod;
    Arc::new(order)
}

pub fn unlocated_order(id: &str) -> Arc<Order> {
    Arc::new(Order::new(id, format!("{id} address")))
}

pub fn route_with(id: &str, orders: Vec<Arc<Order>>, distance: Kilometers) -> Route {
    Route {
        id: id.to_owned(),
        name: id.to_owned(),
        kind: RouteKind::Optimized,
        orders,
        total_distance_km: distance,
        estimated_cost: 0.0,
        extra_fee: 0.0,
        centroid: Coordinate::new(10.769034, 106.694945),
        geometry: String::new(),
        color: ROUTE_COLORS[0].to_owned(),
    }
}

/// A solver route visiting `job_ids` in order, without geometry.
pub fn vrp_route(job_ids: &[u64], distance_meters: f64) -> VrpRoute {
    let step = |step_type, id| VrpStep {
        step_type,
        id,
        job: None,
        location: None,
    };

    let mut steps = vec![step(VrpStepType::Start, None)];
    steps.extend(job_ids.iter().map(|&id| step(VrpStepType::Job, Some(id))));
    steps.push(step(VrpStepType::End, None));

    VrpRoute {
        vehicle: None,
        distance: distance_meters,
        steps,
        geometry: None,
    }
}

/// Places jobs in request order, `per_route` per route, with straight-line
/// geometry from the first vehicle's start.
pub fn chunked_response(request: &VrpRequest, per_route: usize) -> VrpResponse {
    let start = request
        .vehicles
        .first()
        .map(|vehicle| vehicle.start)
        .unwrap_or_default();

    let routes = request
        .jobs
        .chunks(per_route.max(1))
        .enumerate()
        .map(|(index, jobs)| {
            let coords = std::iter::once(start)
                .chain(jobs.iter().map(|job| job.location))
                .map(|[lng, lat]| (lng, lat))
                .collect::<Vec<_>>();
            let path = LineString::from(coords);
            let job_ids = jobs.iter().map(|job| job.id).collect::<Vec<_>>();

            let mut route = vrp_route(&job_ids, path_length(&path).value() * 1000.0);
            route.vehicle = request.vehicles.get(index).map(|vehicle| vehicle.id);
            route.geometry = Some(encode_polyline(&path, POLYLINE_PRECISION));
            route
        })
        .collect();

    VrpResponse {
        code: Some(0),
        routes: Some(routes),
        ..VrpResponse::default()
    }
}

pub struct FakeSolver<F> {
    respond: F,
    requests: Mutex<Vec<VrpRequest>>,
}

impl<F> FakeSolver<F>
where
    F: Fn(&VrpRequest) -> Result<VrpResponse, ProviderError> + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn requests(&self) -> Vec<VrpRequest> {
        self.requests.lock().clone()
    }
}

impl<F> RouteSolver for FakeSolver<F>
where
    F: Fn(&VrpRequest) -> Result<VrpResponse, ProviderError> + Send + Sync,
{
    async fn solve(&self, request: &VrpRequest) -> Result<VrpResponse, ProviderError> {
        self.requests.lock().push(request.clone());
        (self.respond)(request)
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    known: FxHashMap<String, geo::Point>,
    failing: FxHashSet<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn with_address(mut self, address: &str, lat: f64, lng: f64) -> Self {
        self.known
            .insert(address.to_owned(), geo::Point::new(lng, lat));
        self
    }

    pub fn failing_on(mut self, address: &str) -> Self {
        self.failing.insert(address.to_owned());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<geo::Point>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.contains(address) {
            return Err(ProviderError::Api {
                status: 500,
                message: String::from("Internal Server Error"),
            });
        }

        Ok(self.known.get(address).copied())
    }
}

pub struct MockRng {
    data: Vec<u64>,
    index: usize,
}

impl MockRng {
    pub fn new(data: Vec<u64>) -> Self {
        MockRng { data, index: 0 }
    }
}

impl RngCore for MockRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.data[self.index % self.data.len()];
        self.index = (self.index + 1) % self.data.len();
        value
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_rng_cycles() {
        let data = vec![5, 6, 7];
        let mut rng = MockRng::new(data.clone());

        for &expected in data.iter().cycle().take(7) {
            assert_eq!(rng.next_u64(), expected);
        }
    }

    #[test]
    fn test_chunked_response_places_every_job() {
        let request = VrpRequest {
            jobs: (1..=5)
                .map(|id| smartroute_providers::vrp::VrpJob {
                    id,
                    location: [106.7, 10.7 + id as f64 * 0.01],
                    service: 300,
                    delivery: None,
                })
                .collect(),
            vehicles: vec![],
            options: smartroute_providers::vrp::VrpOptions { geometry: true },
        };

        let response = chunked_response(&request, 2);
        let routes = response.routes.unwrap();

        assert_eq!(routes.len(), 3);
        assert_eq!(
            routes
                .iter()
                .flat_map(|route| route.steps.iter().filter_map(VrpStep::job_id))
                .collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }
}
