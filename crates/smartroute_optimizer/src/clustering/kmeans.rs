//! Lloyd's k-means over haversine distance, seeded with the origin.

use std::sync::Arc;

use geo::{Centroid, MultiPoint, Point};
use rand::{Rng, seq::SliceRandom};
use tracing::{debug, warn};

use crate::{
    error::{Exclusion, ExclusionReason},
    geometry::haversine::haversine_km,
    problem::{coordinate::Coordinate, order::Order},
};

/// Used for seeds when there are fewer located orders than clusters.
pub const DEFAULT_SEED_COORDINATE: Coordinate = Coordinate::new(10.762622, 106.660172);

#[derive(Debug, Clone)]
pub struct KMeansParams {
    pub max_iterations: usize,

    /// Degrees a centroid may still move, on either axis, once converged
    pub tolerance: f64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderCluster {
    pub centroid: Coordinate,
    pub orders: Vec<Arc<Order>>,
}

#[derive(Debug, Clone, Default)]
pub struct Clustering {
    /// Non-empty clusters only
    pub clusters: Vec<OrderCluster>,
    pub iterations: usize,
    pub excluded: Vec<Exclusion>,
}

/// Number of vehicle-sized groups for `order_count` orders, at least one.
pub fn cluster_count(order_count: usize, max_orders_per_shipper: usize) -> usize {
    order_count.div_ceil(max_orders_per_shipper.max(1)).max(1)
}

pub fn kmeans<R>(
    orders: &[Arc<Order>],
    origin: Coordinate,
    k: usize,
    params: &KMeansParams,
    rng: &mut R,
) -> Clustering
where
    R: Rng + ?Sized,
{
    let mut excluded = vec![];
    let mut located = Vec::with_capacity(orders.len());

    for order in orders {
        match order.location() {
            Some(location) => located.push((Arc::clone(order), location)),
            None => {
                warn!(order_id = %order.id, "Order has no coordinates, excluded from clustering");
                excluded.push(Exclusion::new(
                    order.id.clone(),
                    ExclusionReason::MissingCoordinates,
                ));
            }
        }
    }

    if located.is_empty() || k == 0 {
        return Clustering {
            clusters: vec![],
            iterations: 0,
            excluded,
        };
    }

    let centroids = seed_centroids(&located, origin, k, rng);
    let (clusters, iterations) = refine(located, centroids, params);

    Clustering {
        clusters,
        iterations,
        excluded,
    }
}

/// Lloyd iterations from the given seeds. Returns the non-empty clusters and
/// the number of iterations run.
fn refine(
    located: Vec<(Arc<Order>, Coordinate)>,
    mut centroids: Vec<Coordinate>,
    params: &KMeansParams,
) -> (Vec<OrderCluster>, usize) {
    let mut assignment = vec![0; located.len()];
    let mut iterations = 0;

    while iterations < params.max_iterations {
        iterations += 1;

        for (slot, (_, location)) in assignment.iter_mut().zip(&located) {
            *slot = nearest_centroid(location, &centroids);
        }

        let mut moved = false;
        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            let members = assignment
                .iter()
                .zip(&located)
                .filter(|(slot, _)| **slot == cluster)
                .map(|(_, (_, location))| Point::from(location))
                .collect::<Vec<_>>();

            // An empty cluster keeps its previous centroid
            let Some(mean) = MultiPoint::from(members).centroid() else {
                continue;
            };
            let mean = Coordinate::from(mean);

            if (mean.lat - centroid.lat).abs() > params.tolerance
                || (mean.lng - centroid.lng).abs() > params.tolerance
            {
                moved = true;
            }

            *centroid = mean;
        }

        if !moved {
            break;
        }
    }

    debug!(k = centroids.len(), iterations, "K-means finished");

    let mut clusters = centroids
        .into_iter()
        .map(|centroid| OrderCluster {
            centroid,
            orders: vec![],
        })
        .collect::<Vec<_>>();

    for (cluster, (order, _)) in assignment.into_iter().zip(located) {
        clusters[cluster].orders.push(order);
    }

    clusters.retain(|cluster| !cluster.orders.is_empty());

    (clusters, iterations)
}

fn seed_centroids<R>(
    located: &[(Arc<Order>, Coordinate)],
    origin: Coordinate,
    k: usize,
    rng: &mut R,
) -> Vec<Coordinate>
where
    R: Rng + ?Sized,
{
    let mut shuffled = located
        .iter()
        .map(|(_, location)| *location)
        .collect::<Vec<_>>();
    shuffled.shuffle(rng);

    let mut centroids = Vec::with_capacity(k);
    centroids.push(origin);

    for i in 1..k {
        centroids.push(shuffled.get(i).copied().unwrap_or(DEFAULT_SEED_COORDINATE));
    }

    centroids
}

fn nearest_centroid(location: &Coordinate, centroids: &[Coordinate]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;

    for (index, centroid) in centroids.iter().enumerate() {
        let distance = haversine_km(location, centroid);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }

    best
}
