// Core structs: Restaurant, Inspection, Store, and the error types
use crate::geocode::GeocodeCache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Latitude/longitude pair. The zero value means "not yet geocoded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_set(&self) -> bool {
        *self != Coordinate::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inspection {
    /// `DD-Mon-YYYY`, exactly as published.
    pub date: String,
    pub identifier: String,
    pub reason: String,
    pub noncritical_count: i32,
    pub critical_count: i32,
}

impl Inspection {
    pub fn infractions(&self) -> i32 {
        self.critical_count.saturating_add(self.noncritical_count)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub facility_type: String,
    pub community: String,
    pub address: String,
    pub phone: String,
    pub detail_url: String,
    pub outstanding_noncritical: i32,
    pub outstanding_critical: i32,
    /// Empty until the detail page has been fetched.
    pub inspections: Vec<Inspection>,
    pub location: Coordinate,
    pub infractions_past_year: i32,
    pub infractions_total: i32,
}

impl Restaurant {
    pub fn has_details(&self) -> bool {
        !self.inspections.is_empty()
    }
}

/// Unit of durability: everything that survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub restaurants: Vec<Restaurant>,
    pub geocode_cache: GeocodeCache,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    InvalidResponse { url: String, status: u16 },
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("html parse error: {0}")]
    HtmlParseError(String),
    #[error("missing field: {0}")]
    MissingField(String),
}

/// Failure to retrieve or parse one restaurant's detail page.
#[derive(Debug, Error)]
pub enum DetailError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Parser(#[from] ParserError),
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("address empty")]
    EmptyAddress,
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no geocoding result for {0:?}")]
    NoResult(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("restaurant {restaurant}: cannot parse inspection date {date:?}: {source}")]
    DateParse {
        restaurant: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("listing fetch failed: {0}")]
    Scraper(#[from] ScraperError),
    #[error("listing parse failed: {0}")]
    Parser(#[from] ParserError),
    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}
