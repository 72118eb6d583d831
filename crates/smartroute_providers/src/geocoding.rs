use std::future::Future;

use geojson::FeatureCollection;
use tracing::{debug, warn};

use crate::track_asia_api::{ProviderError, TrackAsiaClient};

pub const DEFAULT_COUNTRY_HINT: &str = "Việt Nam";

/// Turns free text into a point (`x = lng`, `y = lat`).
///
/// `Ok(None)` means the collaborator answered but found nothing. Callers that
/// don't care about the difference can treat errors the same way.
pub trait Geocoder {
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<geo_types::Point>, ProviderError>> + Send;
}

/// Trims the address and appends the country hint unless the text already
/// names the country. Returns `None` for blank input.
pub fn normalize_query(address: &str, country_hint: Option<&str>) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    let Some(country) = country_hint else {
        return Some(address.to_owned());
    };

    let lower = address.to_lowercase();
    if lower.contains("vietnam") || lower.contains(&country.to_lowercase()) {
        Some(address.to_owned())
    } else {
        Some(format!("{address}, {country}"))
    }
}

/// First feature's `[lng, lat]`, if any.
pub fn first_point(collection: &FeatureCollection) -> Option<geo_types::Point> {
    let geometry = collection.features.first()?.geometry.as_ref()?;

    match &geometry.value {
        geojson::Value::Point(position) => match position.as_slice() {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => {
                Some(geo_types::Point::new(*lng, *lat))
            }
            _ => None,
        },
        _ => None,
    }
}

impl Geocoder for TrackAsiaClient {
    async fn geocode(&self, address: &str) -> Result<Option<geo_types::Point>, ProviderError> {
        let Some(query) = normalize_query(address, self.params().country_hint.as_deref()) else {
            return Ok(None);
        };

        let collection = self.autocomplete(&query).await?;
        let point = first_point(&collection);

        if point.is_none() {
            debug!("TrackAsiaApi: No feature for {:?}", query);
        }

        Ok(point)
    }
}

/// Consults `secondary` when `primary` misses or fails.
pub struct FallbackGeocoder<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackGeocoder<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P, S> Geocoder for FallbackGeocoder<P, S>
where
    P: Geocoder + Sync,
    S: Geocoder + Sync,
{
    async fn geocode(&self, address: &str) -> Result<Option<geo_types::Point>, ProviderError> {
        match self.primary.geocode(address).await {
            Ok(Some(point)) => Ok(Some(point)),
            Ok(None) => self.secondary.geocode(address).await,
            Err(error) => {
                warn!("Primary geocoder failed for {:?}: {}", address, error);
                self.secondary.geocode(address).await
            }
        }
    }
}
