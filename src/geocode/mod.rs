// Address -> coordinate resolution, memoized in the store
pub mod mapquest;

pub use mapquest::MapQuestGeocoder;

use crate::model::{Coordinate, GeocodeError, Restaurant};
use crate::utils::normalize_address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// External address lookup.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

/// Write-only memo of geocoding results, keyed by normalized address.
/// Entries are never evicted; the cache lives and dies with the [`Store`](crate::model::Store).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeocodeCache {
    entries: BTreeMap<String, Coordinate>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<Coordinate> {
        self.entries.get(&normalize_address(address)).copied()
    }

    /// Returns the cached coordinate or asks `geocoder`, caching a success.
    /// Failures leave the cache untouched.
    pub async fn resolve(
        &mut self,
        address: &str,
        geocoder: &dyn Geocoder,
    ) -> Result<Coordinate, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }

        let key = normalize_address(address);
        if let Some(cached) = self.entries.get(&key) {
            debug!("Geocode cache hit: {}", key);
            return Ok(*cached);
        }

        info!("GEOCODE: {}", key);
        let coordinate = geocoder.geocode(&key).await?;
        self.entries.insert(key, coordinate);
        Ok(coordinate)
    }
}

/// Sequential geocoding pass. Only restaurants in `communities` are coded
/// (all of them when the list is empty). The first failure aborts the pass.
pub async fn geocode_restaurants(
    restaurants: &mut [Restaurant],
    cache: &mut GeocodeCache,
    geocoder: &dyn Geocoder,
    communities: &[String],
) -> Result<(), GeocodeError> {
    info!("Geocoding {} restaurants...", restaurants.len());
    for (i, restaurant) in restaurants.iter_mut().enumerate() {
        if !communities.is_empty() && !communities.contains(&restaurant.community) {
            continue;
        }
        debug!("Coding {} ({})", i, restaurant.name);
        restaurant.location = cache.resolve(&restaurant.address, geocoder).await?;
    }
    info!("Geocode cache holds {} addresses", cache.len());
    Ok(())
}
