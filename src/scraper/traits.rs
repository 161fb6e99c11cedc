use crate::model::ScraperError;

/// Retrieves raw page content for a URL.
#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}
