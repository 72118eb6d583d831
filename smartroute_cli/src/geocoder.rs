use smartroute_providers::{
    cache::{FileCache, GeocodeCache, NoCache},
    district::DistrictGeocoder,
    geocoding::FallbackGeocoder,
    geocoding_client::GeocodingClient,
    track_asia_api::TrackAsiaClient,
};
use tracing::{debug, info};

pub type CliGeocoder =
    FallbackGeocoder<GeocodingClient<Box<dyn GeocodeCache + Send + Sync>>, DistrictGeocoder>;

/// TrackAsia behind the on-disk cache when `SMARTROUTE_CACHE_FOLDER` is set,
/// falling back to district centres.
pub fn build_geocoder(client: TrackAsiaClient) -> CliGeocoder {
    let cache: Box<dyn GeocodeCache + Send + Sync> = match FileCache::from_env() {
        Ok(cache) => {
            info!("Geocode cache enabled");
            Box::new(cache)
        }
        Err(error) => {
            debug!("Geocode cache disabled: {}", error);
            Box::new(NoCache)
        }
    };

    FallbackGeocoder::new(
        GeocodingClient::new(client, cache),
        DistrictGeocoder::default(),
    )
}
