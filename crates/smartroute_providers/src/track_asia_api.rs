use geojson::FeatureCollection;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    geocoding::DEFAULT_COUNTRY_HINT,
    vrp::{VrpRequest, VrpResponse},
};

pub const TRACK_ASIA_DEFAULT_BASE_URL: &str = "https://maps.track-asia.com";
pub const TRACK_ASIA_AUTOCOMPLETE_PATH: &str = "/api/v1/autocomplete";
pub const TRACK_ASIA_VRP_PATH: &str = "/api/v1/vrp";

const API_KEY_ENV_VAR: &str = "TRACK_ASIA_API_KEY";
const BASE_URL_ENV_VAR: &str = "TRACK_ASIA_BASE_URL";
const LANG_ENV_VAR: &str = "TRACK_ASIA_LANG";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Missing API key, set TRACK_ASIA_API_KEY")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct TrackAsiaClientParams {
    pub api_key: String,
    pub base_url: String,
    pub lang: String,

    /// Appended to geocoding queries that don't already name the country
    pub country_hint: Option<String>,
}

impl TrackAsiaClientParams {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TRACK_ASIA_DEFAULT_BASE_URL.to_owned(),
            lang: String::from("vi"),
            country_hint: Some(DEFAULT_COUNTRY_HINT.to_owned()),
        }
    }

    /// Reads `TRACK_ASIA_API_KEY`, `TRACK_ASIA_BASE_URL` and `TRACK_ASIA_LANG`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let mut params = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV_VAR) {
            params.base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Ok(lang) = std::env::var(LANG_ENV_VAR) {
            params.lang = lang;
        }

        Ok(params)
    }
}

/// Thin HTTP client over the TrackAsia text search and VRP endpoints.
/// Cloning is cheap, the underlying connection pool is shared.
#[derive(Clone)]
pub struct TrackAsiaClient {
    params: TrackAsiaClientParams,
    client: reqwest::Client,
}

impl TrackAsiaClient {
    pub fn new(params: TrackAsiaClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub fn params(&self) -> &TrackAsiaClientParams {
        &self.params
    }

    pub async fn autocomplete(&self, text: &str) -> Result<FeatureCollection, ProviderError> {
        let url = format!("{}{}", self.params.base_url, TRACK_ASIA_AUTOCOMPLETE_PATH);
        let response = self
            .client
            .get(url)
            .query(&[
                ("text", text),
                ("key", self.params.api_key.as_str()),
                ("lang", self.params.lang.as_str()),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn vrp(&self, body: &VrpRequest) -> Result<VrpResponse, ProviderError> {
        let url = format!("{}{}", self.params.base_url, TRACK_ASIA_VRP_PATH);

        debug!(
            "TrackAsiaApi: Posting VRP request, jobs = {}, vehicles = {}",
            body.jobs.len(),
            body.vehicles.len()
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", &self.params.api_key)])
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            let text = response.text().await?;
            Ok(serde_json::from_str(&text)?)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(ProviderError::Api { status, message })
        }
    }
}
