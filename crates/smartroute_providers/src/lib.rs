pub mod cache;
pub mod district;
pub mod geocoding;
pub mod geocoding_client;
pub mod track_asia_api;
pub mod vrp;
