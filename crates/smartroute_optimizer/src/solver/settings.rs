use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

/// Constants sent with every solver request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverSettings {
    /// Time spent at each stop
    pub service_duration: SignedDuration,
    pub profile: String,

    /// Vehicles requested per vehicle strictly needed
    pub over_provision_factor: f64,

    /// Never request fewer vehicles than this, outside single-vehicle mode
    pub min_fleet_size: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            service_duration: SignedDuration::from_secs(300),
            profile: String::from("car"),
            over_provision_factor: 1.5,
            min_fleet_size: 5,
        }
    }
}

impl SolverSettings {
    pub fn service_seconds(&self) -> u64 {
        self.service_duration.as_secs().max(0) as u64
    }
}
