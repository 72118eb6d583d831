use tracing::warn;

use crate::{
    cache::{FileCache, GeocodeCache, NoCache},
    geocoding::{Geocoder, normalize_query},
    track_asia_api::{ProviderError, TrackAsiaClient},
};

/// TrackAsia geocoding behind a cache. Cache failures are logged and
/// otherwise ignored, they never fail a lookup.
pub struct GeocodingClient<C: GeocodeCache> {
    client: TrackAsiaClient,
    cache: C,
}

impl<C: GeocodeCache> GeocodingClient<C> {
    pub fn new(client: TrackAsiaClient, cache: C) -> Self {
        Self { client, cache }
    }
}

impl GeocodingClient<NoCache> {
    pub fn uncached(client: TrackAsiaClient) -> Self {
        Self::new(client, NoCache)
    }
}

impl GeocodingClient<FileCache> {
    pub fn from_env(client: TrackAsiaClient) -> Result<Self, anyhow::Error> {
        Ok(Self::new(client, FileCache::from_env()?))
    }
}

impl<C> Geocoder for GeocodingClient<C>
where
    C: GeocodeCache + Sync,
{
    async fn geocode(&self, address: &str) -> Result<Option<geo_types::Point>, ProviderError> {
        let Some(query) = normalize_query(address, self.client.params().country_hint.as_deref())
        else {
            return Ok(None);
        };

        match self.cache.get_cached(&query) {
            Ok(Some(point)) => return Ok(Some(point)),
            Ok(None) => {}
            Err(err) => warn!("Failed to read geocode cache: {}", err),
        }

        let point = self.client.geocode(&query).await?;

        if let Some(point) = point
            && let Err(err) = self.cache.cache(&query, point)
        {
            warn!("Failed to cache geocode: {}", err);
        }

        Ok(point)
    }
}
