use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::track_asia_api::{ProviderError, TrackAsiaClient};

/// `[lng, lat]`, the order every VROOM-style endpoint expects.
pub type LngLat = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrpRequest {
    pub jobs: Vec<VrpJob>,
    pub vehicles: Vec<VrpVehicle>,
    pub options: VrpOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrpJob {
    pub id: u64,
    pub location: LngLat,

    /// Service duration in seconds
    pub service: u64,

    /// Unit demand, omitted when capacity is not enforced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrpVehicle {
    pub id: u64,
    pub start: LngLat,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Vec<u32>>,

    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrpOptions {
    /// Ask the solver to return encoded route geometry
    #[serde(rename = "g")]
    pub geometry: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VrpResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Absent when the solver rejected the problem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<VrpRoute>>,

    #[serde(default)]
    pub unassigned: Vec<VrpUnassigned>,
}

impl VrpResponse {
    /// Best-effort explanation for a response that carries no routes.
    pub fn failure_reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| String::from("Unknown error"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VrpRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<u64>,

    /// Meters
    #[serde(default)]
    pub distance: f64,

    #[serde(default)]
    pub steps: Vec<VrpStep>,

    /// Encoded polyline, precision 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VrpStepType {
    Start,
    Job,
    Pickup,
    Delivery,
    Break,
    End,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrpStep {
    #[serde(rename = "type")]
    pub step_type: VrpStepType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Older solver versions only report the job id here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LngLat>,
}

impl VrpStep {
    pub fn job_id(&self) -> Option<u64> {
        match self.step_type {
            VrpStepType::Job => self.job.or(self.id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrpUnassigned {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub trait RouteSolver {
    fn solve(
        &self,
        request: &VrpRequest,
    ) -> impl Future<Output = Result<VrpResponse, ProviderError>> + Send;
}

impl RouteSolver for TrackAsiaClient {
    async fn solve(&self, request: &VrpRequest) -> Result<VrpResponse, ProviderError> {
        self.vrp(request).await
    }
}
