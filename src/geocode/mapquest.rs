use crate::geocode::Geocoder;
use crate::model::{Coordinate, GeocodeError};
use reqwest::Client;
use serde::Deserialize;

const MAPQUEST_URL: &str = "https://open.mapquestapi.com/geocoding/v1/address";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    locations: Vec<GeocodeLocation>,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    #[serde(rename = "latLng")]
    lat_lng: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct MapQuestGeocoder {
    client: Client,
    api_key: String,
}

impl MapQuestGeocoder {
    pub fn new(api_key: String) -> Result<Self, GeocodeError> {
        let client = Client::builder().build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait::async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let response: GeocodeResponse = self
            .client
            .get(MAPQUEST_URL)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .next()
            .map(|loc| Coordinate::new(loc.lat_lng.lat, loc.lat_lng.lng))
            .ok_or_else(|| GeocodeError::NoResult(address.to_string()))
    }
}
