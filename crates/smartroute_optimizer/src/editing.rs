//! Manual changes to a finished plan.

use thiserror::Error;
use tracing::debug;

use crate::{cost::CostModel, problem::route::Route};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteEditError {
    #[error("Route {0} not found")]
    RouteNotFound(String),

    #[error("Extra fee must be a non-negative amount, got {0}")]
    InvalidFee(f64),

    #[error("Order {order_id} is not on route {route_id}")]
    OrderNotFound { route_id: String, order_id: String },
}

/// Moves `order_id` from `from_route` to `to_route`, before `before` when
/// given, otherwise last. Moving within one route reorders it.
///
/// Distances are left as they are; both routes' costs are recomputed from
/// their distance and new stop count. Nothing changes when an error is
/// returned.
pub fn move_order(
    routes: &mut [Route],
    order_id: &str,
    from_route: &str,
    to_route: &str,
    before: Option<&str>,
    cost_model: &CostModel,
) -> Result<(), RouteEditError> {
    let from = route_index(routes, from_route)?;
    let to = route_index(routes, to_route)?;

    let position = routes[from]
        .position_of(order_id)
        .ok_or_else(|| RouteEditError::OrderNotFound {
            route_id: from_route.to_owned(),
            order_id: order_id.to_owned(),
        })?;

    if let Some(before) = before
        && routes[to].position_of(before).is_none()
    {
        return Err(RouteEditError::OrderNotFound {
            route_id: to_route.to_owned(),
            order_id: before.to_owned(),
        });
    }

    if before == Some(order_id) {
        return Ok(());
    }

    let order = routes[from].orders.remove(position);

    let target = &mut routes[to];
    let insert_at = before
        .and_then(|before| target.position_of(before))
        .unwrap_or(target.orders.len());
    target.orders.insert(insert_at, order);

    cost_model.annotate(&mut routes[from]);
    cost_model.annotate(&mut routes[to]);

    debug!(order_id, from_route, to_route, "Moved order");

    Ok(())
}

/// Sets the flat fee paid to the shipper of `route_id` on top of the
/// distance-based cost.
pub fn set_extra_fee(routes: &mut [Route], route_id: &str, fee: f64) -> Result<(), RouteEditError> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(RouteEditError::InvalidFee(fee));
    }

    let index = route_index(routes, route_id)?;
    routes[index].extra_fee = fee;

    debug!(route_id, fee, "Set extra fee");

    Ok(())
}

fn route_index(routes: &[Route], route_id: &str) -> Result<usize, RouteEditError> {
    routes
        .iter()
        .position(|route| route.id == route_id)
        .ok_or_else(|| RouteEditError::RouteNotFound(route_id.to_owned()))
}
