use std::sync::Arc;

use fixedbitset::FixedBitSet;
use geo::LineString;
use tracing::warn;

use crate::{
    error::{Exclusion, ExclusionReason},
    geometry::haversine::haversine,
    problem::{coordinate::Coordinate, kilometers::Kilometers, order::Order},
};

/// A locally sequenced tour. `path` starts at the start position.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub orders: Vec<Arc<Order>>,
    pub distance: Kilometers,
    pub path: LineString<f64>,
    pub excluded: Vec<Exclusion>,
}

/// Greedy tour from `start`, always driving to the closest unvisited order.
/// Ties go to the order listed first. There's no return leg.
pub fn nearest_neighbor_sequence(orders: &[Arc<Order>], start: Coordinate) -> Sequence {
    let mut excluded = vec![];
    let mut candidates = Vec::with_capacity(orders.len());

    for order in orders {
        match order.location() {
            Some(location) => candidates.push((order, location)),
            None => {
                warn!(order_id = %order.id, "Order has no coordinates, excluded from sequencing");
                excluded.push(Exclusion::new(
                    order.id.clone(),
                    ExclusionReason::MissingCoordinates,
                ));
            }
        }
    }

    let mut visited = FixedBitSet::with_capacity(candidates.len());
    let mut sequence = Vec::with_capacity(candidates.len());
    let mut coords = Vec::with_capacity(candidates.len() + 1);
    let mut distance = Kilometers::ZERO;
    let mut current = start;

    coords.push(geo::Coord::from(start));

    while sequence.len() < candidates.len() {
        let next = candidates
            .iter()
            .enumerate()
            .filter(|(index, _)| !visited.contains(*index))
            .map(|(index, (_, location))| (index, haversine(&current, location)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b));

        let Some((index, hop)) = next else {
            break;
        };

        let (order, location) = candidates[index];
        visited.insert(index);
        distance += hop;
        current = location;
        sequence.push(Arc::clone(order));
        coords.push(geo::Coord::from(location));
    }

    Sequence {
        orders: sequence,
        distance,
        path: LineString::new(coords),
        excluded,
    }
}
