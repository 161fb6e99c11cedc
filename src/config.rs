use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

pub const DEFAULT_LISTING_URL: &str =
    "https://inspections.vcha.ca/FoodPremises/Table?SortMode=FacilityName&page=1&PageSize=100000";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listing_url: String,
    pub store_path: String,
    /// Restaurants strictly west of this longitude get their details fetched.
    pub border_longitude: f64,
    pub workers: usize,
    /// A worker that hits a fetch/parse error stops taking work.
    pub stop_worker_on_error: bool,
    /// Only these communities are geocoded. Empty means all of them.
    pub geocode_communities: Vec<String>,
    pub geocoder_api_key: Option<String>,
    /// Value of the `ASP.NET_SessionId` cookie sent with page requests.
    pub session_cookie: Option<String>,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            store_path: "restaurants.json".to_string(),
            border_longitude: -123.227883,
            workers: 16,
            stop_worker_on_error: true,
            geocode_communities: vec!["Vancouver - Westside".to_string()],
            geocoder_api_key: None,
            session_cookie: None,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) InspectionRanker/0.1".to_string(),
        }
    }
}

/// Reads the JSON config. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let mut config: AppConfig = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    if let Ok(key) = std::env::var("MAPQUEST_API_KEY") {
        config.geocoder_api_key = Some(key);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("nope.json")).unwrap();
        assert_eq!(config.workers, 16);
        assert!(config.stop_worker_on_error);
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "workers": 4, "stop_worker_on_error": false }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.workers, 4);
        assert!(!config.stop_worker_on_error);
        assert_eq!(config.store_path, "restaurants.json");
        assert_eq!(config.border_longitude, -123.227883);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
