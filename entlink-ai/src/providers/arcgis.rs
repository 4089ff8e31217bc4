//! ArcGIS World Geocoding Service client (secondary provider)

use super::http::ProviderHttp;
use crate::config::{ProviderId, ProviderSettings};
use crate::geocoding::Geocoder;
use crate::types::{GeoHit, LookupError, LookupResult};
use async_trait::async_trait;
use serde::Deserialize;

const FIND_CANDIDATES_PATH: &str =
    "/arcgis/rest/services/World/GeocodeServer/findAddressCandidates";

#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    address: String,
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    x: f64,
    y: f64,
}

pub struct ArcGisClient {
    http: ProviderHttp,
}

impl ArcGisClient {
    pub fn new(settings: &ProviderSettings, user_agent: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http: ProviderHttp::new(ProviderId::Arcgis.as_str(), settings, user_agent)?,
        })
    }
}

#[async_trait]
impl Geocoder for ArcGisClient {
    fn name(&self) -> &'static str {
        self.http.name()
    }

    async fn geocode(&self, query: &str) -> LookupResult<GeoHit> {
        let response: CandidatesResponse = self
            .http
            .get_json(
                FIND_CANDIDATES_PATH,
                &[("SingleLine", query), ("f", "json"), ("maxLocations", "1")],
            )
            .await?;

        Ok(response.candidates.into_iter().next().map(|c| GeoHit {
            latitude: c.location.y,
            longitude: c.location.x,
            display_name: c.address,
        }))
    }
}
