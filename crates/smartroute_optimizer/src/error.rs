use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Solver unavailable: {reason}")]
    SolverUnavailable { reason: String },

    #[error("Order {order_id} has no usable coordinates")]
    MissingCoordinates { order_id: String },

    #[error("Planning cancelled during {stage}")]
    Cancelled { stage: PlanStage },

    #[error("Invalid route configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStage {
    Geocoding,
    Clustering,
    Solving,
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStage::Geocoding => write!(f, "geocoding"),
            PlanStage::Clustering => write!(f, "clustering"),
            PlanStage::Solving => write!(f, "solving"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The geocoder found nothing or failed
    GeocodeNotFound,
    MissingCoordinates,
}

/// An order left out of every route for this run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub order_id: String,
    pub reason: ExclusionReason,
}

impl Exclusion {
    pub fn new(order_id: impl Into<String>, reason: ExclusionReason) -> Self {
        Self {
            order_id: order_id.into(),
            reason,
        }
    }
}

/// A cluster sequenced by nearest neighbor because its solver call failed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverFallback {
    pub cluster_index: usize,
    pub reason: String,
}
