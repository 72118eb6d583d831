use smartroute_providers::vrp::{VrpJob, VrpOptions, VrpRequest, VrpVehicle};

use crate::problem::coordinate::Coordinate;

use super::{fleet::FleetPlan, job_id_map::JobIdMap, settings::SolverSettings};

/// Every vehicle starts at `origin`; demand is only attached when the fleet
/// enforces capacity.
pub fn build_request(
    jobs: &JobIdMap,
    origin: Coordinate,
    fleet: &FleetPlan,
    settings: &SolverSettings,
) -> VrpRequest {
    let service = settings.service_seconds();

    let jobs_payload = jobs
        .iter()
        .map(|(index, job)| VrpJob {
            id: JobIdMap::wire_id(index),
            location: job.location.lng_lat(),
            service,
            delivery: fleet.enforces_capacity().then(|| vec![1]),
        })
        .collect();

    let first_vehicle_id = jobs.next_wire_id();
    let vehicles = (0..fleet.vehicle_count as u64)
        .map(|offset| VrpVehicle {
            id: first_vehicle_id + offset,
            start: origin.lng_lat(),
            capacity: fleet.capacity.map(|capacity| vec![capacity]),
            profile: settings.profile.clone(),
        })
        .collect();

    VrpRequest {
        jobs: jobs_payload,
        vehicles,
        options: VrpOptions { geometry: true },
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        problem::route_config::RouteConfig,
        solver::job_id_map::Job,
        test_utils::located_order,
    };

    use super::*;

    const ORIGIN: Coordinate = Coordinate::new(10.769034, 106.694945);

    fn jobs(count: usize) -> JobIdMap {
        JobIdMap::new(
            (0..count)
                .map(|i| {
                    let location = Coordinate::new(10.77 + i as f64 * 0.001, 106.70);
                    Job {
                        order: located_order(&format!("ORD-{i}"), location.lat, location.lng),
                        location,
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_capacitated_request() {
        let jobs = jobs(3);
        let settings = SolverSettings::default();
        let fleet = FleetPlan::new(3, &RouteConfig::default(), &settings);

        let request = build_request(&jobs, ORIGIN, &fleet, &settings);

        assert_eq!(
            request.jobs.iter().map(|job| job.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(request.jobs[0].location, [106.70, 10.77]);
        assert_eq!(request.jobs[0].service, 300);
        assert_eq!(request.jobs[0].delivery, Some(vec![1]));

        assert_eq!(request.vehicles.len(), 5);
        assert_eq!(request.vehicles[0].id, 4);
        assert_eq!(request.vehicles[4].id, 8);
        assert_eq!(request.vehicles[0].start, [106.694945, 10.769034]);
        assert_eq!(request.vehicles[0].capacity, Some(vec![10]));
        assert_eq!(request.vehicles[0].profile, "car");
        assert!(request.options.geometry);
    }

    #[test]
    fn test_single_vehicle_request() {
        let jobs = jobs(12);
        let settings = SolverSettings::default();
        let config = RouteConfig {
            force_single_vehicle: true,
            ..RouteConfig::default()
        };
        let fleet = FleetPlan::new(12, &config, &settings);

        let request = build_request(&jobs, ORIGIN, &fleet, &settings);

        assert_eq!(request.vehicles.len(), 1);
        assert_eq!(request.vehicles[0].capacity, None);
        assert!(request.jobs.iter().all(|job| job.delivery.is_none()));
    }
}
