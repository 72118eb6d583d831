use fixedbitset::FixedBitSet;
use smartroute_providers::vrp::{VrpResponse, VrpRoute};
use tracing::{debug, warn};

use crate::{
    error::PlanError,
    geometry::polyline::{POLYLINE_PRECISION, decode_polyline},
    problem::kilometers::Kilometers,
};

use super::{
    job_id_map::{JobIdMap, JobIdx},
    merge::RouteFragment,
};

/// Solver answer translated back into orders.
#[derive(Debug, Clone)]
pub struct ParsedSolution {
    /// One per returned route with at least one job, in solver order
    pub fragments: Vec<RouteFragment>,

    /// Jobs on no route, in request order
    pub unassigned: Vec<JobIdx>,
}

pub fn parse_response(
    jobs: &JobIdMap,
    response: VrpResponse,
) -> Result<ParsedSolution, PlanError> {
    let Some(routes) = response.routes.as_deref() else {
        return Err(PlanError::SolverUnavailable {
            reason: response.failure_reason(),
        });
    };

    let mut assigned = FixedBitSet::with_capacity(jobs.len());
    let mut fragments = Vec::with_capacity(routes.len());

    for route in routes {
        if let Some(fragment) = parse_route(jobs, route, &mut assigned)? {
            fragments.push(fragment);
        }
    }

    for unassigned in &response.unassigned {
        debug!(
            job = unassigned.id,
            description = unassigned.description.as_deref().unwrap_or_default(),
            "Solver could not place job"
        );
    }

    let unassigned = jobs
        .iter()
        .map(|(index, _)| index)
        .filter(|index| !assigned.contains(index.get()))
        .collect::<Vec<_>>();

    let reported = response.unassigned.len();
    if unassigned.len() > reported {
        warn!(
            missing = unassigned.len() - reported,
            "Solver dropped jobs without reporting them unassigned"
        );
    }

    Ok(ParsedSolution {
        fragments,
        unassigned,
    })
}

fn parse_route(
    jobs: &JobIdMap,
    route: &VrpRoute,
    assigned: &mut FixedBitSet,
) -> Result<Option<RouteFragment>, PlanError> {
    if !route.distance.is_finite() || route.distance < 0.0 {
        return Err(PlanError::SolverUnavailable {
            reason: format!("Invalid route distance: {}", route.distance),
        });
    }

    let mut orders = vec![];

    for wire_id in route.steps.iter().filter_map(|step| step.job_id()) {
        let Some(index) = jobs.resolve(wire_id) else {
            warn!(job = wire_id, "Solver returned an unknown job id");
            continue;
        };

        if assigned.put(index.get()) {
            warn!(job = wire_id, "Solver returned a job twice");
            continue;
        }

        orders.push(jobs.job(index).order.clone());
    }

    if orders.is_empty() {
        return Ok(None);
    }

    let path = match route.geometry.as_deref() {
        Some(geometry) => decode_polyline(geometry, POLYLINE_PRECISION).map_err(|error| {
            PlanError::SolverUnavailable {
                reason: format!("Invalid route geometry: {error}"),
            }
        })?,
        None => geo::LineString::new(vec![]),
    };

    Ok(Some(RouteFragment {
        orders,
        distance: Kilometers::from_meters(route.distance),
        path,
    }))
}
