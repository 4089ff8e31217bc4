//! Nominatim (OpenStreetMap) search client
//!
//! Serves two roles in the geocoding resolver: the primary provider of the
//! provider chain and the direct map-search endpoint. One instance is shared
//! between both roles so the 1 req/sec usage policy holds across them.

use super::http::ProviderHttp;
use crate::config::{ProviderId, ProviderSettings};
use crate::geocoding::Geocoder;
use crate::types::{GeoHit, LookupError, LookupResult};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

pub struct NominatimClient {
    http: ProviderHttp,
    language: String,
    country_codes: Option<String>,
}

impl NominatimClient {
    pub fn new(
        settings: &ProviderSettings,
        language: &str,
        country_codes: Option<String>,
        user_agent: &str,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            http: ProviderHttp::new(ProviderId::Nominatim.as_str(), settings, user_agent)?,
            language: language.to_string(),
            country_codes,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    fn name(&self) -> &'static str {
        self.http.name()
    }

    async fn geocode(&self, query: &str) -> LookupResult<GeoHit> {
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("addressdetails", "1"),
            ("accept-language", self.language.as_str()),
        ];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.as_str()));
        }

        let places: Vec<Place> = self.http.get_json("/search", &params).await?;
        let Some(top) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = parse_coordinate(&top.lat, "lat")?;
        let longitude = parse_coordinate(&top.lon, "lon")?;

        Ok(Some(GeoHit {
            latitude,
            longitude,
            display_name: top.display_name,
        }))
    }
}

fn parse_coordinate(value: &str, field: &str) -> Result<f64, LookupError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| LookupError::Parse(format!("invalid {} '{}': {}", field, value, e)))
}
