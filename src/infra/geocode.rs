//! Best-effort reverse geocoding for the composer's location prefill.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::application::gateway::{GatewayError, GeocodeGateway};
use crate::infra::rest::user_agent;

#[derive(Clone, Debug)]
pub struct ReverseGeocoder {
    client: Client,
    base: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted: String,
}

impl ReverseGeocoder {
    pub fn new(base: &str, api_key: String) -> Result<Self, GatewayError> {
        let base = Url::parse(base)
            .and_then(|url| url.join("/"))
            .map_err(GatewayError::transport)?;
        let client = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(GatewayError::transport)?;
        Ok(Self {
            client,
            base,
            api_key,
        })
    }
}

#[async_trait]
impl GeocodeGateway for ReverseGeocoder {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, GatewayError> {
        let mut url = self
            .base
            .join("geocode/v1/json")
            .map_err(GatewayError::transport)?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{latitude}+{longitude}"))
            .append_pair("key", &self.api_key)
            .append_pair("limit", "1");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(GatewayError::transport)?;
        if !resp.status().is_success() {
            return Err(GatewayError::Backend {
                message: format!("geocoding failed with status {}", resp.status()),
                code: None,
                details: None,
                hint: None,
            });
        }

        let body: GeocodeResponse = resp.json().await.map_err(GatewayError::decode)?;
        Ok(body.results.into_iter().next().map(|result| result.formatted))
    }
}
