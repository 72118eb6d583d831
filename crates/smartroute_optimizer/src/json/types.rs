use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    pipeline::planner::{PlanOutcome, PlanReport, PlanSummary},
    problem::{
        coordinate::Coordinate, order::Order, route::Route, route_config::RouteConfig,
    },
};

/// Input file of the `optimize` command.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename = "PlanningInput", rename_all = "camelCase")]
pub struct JsonPlanningInput {
    /// Warehouse all vehicles start from
    pub origin: Option<Coordinate>,

    /// Geocoded when `origin` is missing
    pub origin_address: Option<String>,

    #[serde(default)]
    pub config: Option<RouteConfig>,

    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlanningOutput {
    pub origin: Coordinate,
    pub summary: PlanSummary,
    pub report: PlanReport,
    pub routes: Vec<Route>,
}

impl JsonPlanningOutput {
    pub fn new(origin: Coordinate, outcome: PlanOutcome) -> Self {
        Self {
            origin,
            summary: outcome.summary(),
            report: outcome.report,
            routes: outcome.routes,
        }
    }
}
