use futures::{StreamExt, stream::FuturesUnordered};
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use smartroute_providers::geocoding::Geocoder;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Exclusion, ExclusionReason, PlanError, PlanStage},
    problem::{coordinate::Coordinate, order::Order},
};

use super::cancel::CancelToken;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeocodeSettings {
    /// Minimum gap between two successive geocoder calls
    pub request_delay: SignedDuration,
    pub max_in_flight: usize,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            request_delay: SignedDuration::from_millis(100),
            max_in_flight: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeStageReport {
    /// Addresses sent to the geocoder
    pub attempted: usize,
    pub resolved: usize,
    pub excluded: Vec<Exclusion>,
}

/// Attaches coordinates to every order that has none.
///
/// Calls are started at most once per `request_delay` with no more than
/// `max_in_flight` outstanding. Each answer is written onto its order as soon
/// as it arrives, so on cancellation the orders keep whatever was resolved.
/// Misses and failures are reported, never retried.
#[instrument(skip_all, level = "debug")]
pub async fn geocode_orders<G>(
    geocoder: &G,
    orders: &mut [Order],
    settings: &GeocodeSettings,
    cancel: &CancelToken,
    on_progress: impl Fn(usize, usize),
) -> Result<GeocodeStageReport, PlanError>
where
    G: Geocoder + Sync,
{
    let pending = orders
        .iter()
        .enumerate()
        .filter(|(_, order)| !order.is_located())
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    let total = pending.len();
    let mut report = GeocodeStageReport {
        attempted: total,
        ..GeocodeStageReport::default()
    };

    if total == 0 {
        return Ok(report);
    }

    debug!(total, "Geocoding orders");

    let delay = settings
        .request_delay
        .unsigned_abs()
        .max(std::time::Duration::from_millis(1));
    let mut ticker = tokio::time::interval(delay);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let max_in_flight = settings.max_in_flight.max(1);
    let mut queue = pending.into_iter();
    let mut in_flight = FuturesUnordered::new();
    let mut done = 0;

    loop {
        let can_launch = in_flight.len() < max_in_flight && queue.len() > 0;

        if !can_launch && in_flight.is_empty() {
            break;
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                warn!(done, total, "Geocoding cancelled");
                return Err(PlanError::Cancelled { stage: PlanStage::Geocoding });
            }

            Some((index, result)) = in_flight.next(), if !in_flight.is_empty() => {
                let order: &mut Order = &mut orders[index];

                let usable = match result {
                    Ok(Some(point)) => {
                        let coordinates = Coordinate::from(point);

                        if coordinates.is_valid() && !coordinates.is_null_island() {
                            Some(coordinates)
                        } else {
                            warn!(
                                order_id = %order.id,
                                ?coordinates,
                                "Geocoder returned unusable coordinates"
                            );
                            None
                        }
                    }
                    Ok(None) => {
                        warn!(
                            order_id = %order.id,
                            address = %order.address,
                            "Address not found"
                        );
                        None
                    }
                    Err(error) => {
                        warn!(
                            order_id = %order.id,
                            address = %order.address,
                            %error,
                            "Geocoding failed"
                        );
                        None
                    }
                };

                match usable {
                    Some(coordinates) => {
                        order.coordinates = Some(coordinates);
                        report.resolved += 1;
                    }
                    None => report.excluded.push(Exclusion::new(
                        order.id.clone(),
                        ExclusionReason::GeocodeNotFound,
                    )),
                }

                done += 1;
                on_progress(done, total);
            }

            _ = ticker.tick(), if can_launch => {
                if let Some(index) = queue.next() {
                    let address = orders[index].address.clone();

                    in_flight.push(async move {
                        let result = geocoder.geocode(&address).await;
                        (index, result)
                    });
                }
            }
        }
    }

    debug!(
        resolved = report.resolved,
        excluded = report.excluded.len(),
        "Geocoding finished"
    );

    Ok(report)
}
