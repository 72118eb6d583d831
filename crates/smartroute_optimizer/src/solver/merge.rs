//! Combining solver routes into one continuous route.

use std::sync::Arc;

use geo::{Coord, LineString};

use crate::{
    geometry::haversine::haversine,
    problem::{coordinate::Coordinate, kilometers::Kilometers, order::Order},
};

/// A sequenced piece of a route: its orders, driven distance and `(lng, lat)` path.
#[derive(Debug, Clone)]
pub struct RouteFragment {
    pub orders: Vec<Arc<Order>>,
    pub distance: Kilometers,
    pub path: LineString<f64>,
}

impl RouteFragment {
    /// No orders, with the path parked at `start`.
    pub fn empty(start: Coordinate) -> Self {
        Self {
            orders: vec![],
            distance: Kilometers::ZERO,
            path: LineString::new(vec![Coord::from(start)]),
        }
    }

    /// Appends `next` after `self`.
    ///
    /// Seam rule: the paths are concatenated, so the last point of `self` is
    /// joined to the first point of `next` by a straight segment. An
    /// identical seam point is kept once. Distances are summed as reported,
    /// the connector adds nothing.
    pub fn join(mut self, next: RouteFragment) -> Self {
        let shared_seam = match (self.path.0.last(), next.path.0.first()) {
            (Some(last), Some(first)) => last == first,
            _ => false,
        };

        self.path
            .0
            .extend(next.path.0.into_iter().skip(usize::from(shared_seam)));
        self.orders.extend(next.orders);
        self.distance += next.distance;
        self
    }

    /// Appends a straight hop to each order, in the given order, adding the
    /// great-circle length of every hop. An empty path starts at `start`.
    pub fn absorb(
        &mut self,
        start: Coordinate,
        orders: impl IntoIterator<Item = (Arc<Order>, Coordinate)>,
    ) {
        let mut current = self
            .path
            .0
            .last()
            .copied()
            .map(Coordinate::from)
            .unwrap_or(start);

        if self.path.0.is_empty() {
            self.path.0.push(Coord::from(start));
        }

        for (order, location) in orders {
            self.distance += haversine(&current, &location);
            self.path.0.push(Coord::from(location));
            self.orders.push(order);
            current = location;
        }
    }
}

/// Folds fragments into one, in the given order. `None` when there are none.
pub fn merge_fragments(
    fragments: impl IntoIterator<Item = RouteFragment>,
) -> Option<RouteFragment> {
    fragments.into_iter().reduce(RouteFragment::join)
}
