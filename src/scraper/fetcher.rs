use crate::config::AppConfig;
use crate::model::ScraperError;
use crate::scraper::traits::Scraper;

use reqwest::Client;
use reqwest::header::COOKIE;
use tracing::info;

pub struct ScraperImpl {
    client: Client,
    session_cookie: Option<String>,
}

impl ScraperImpl {
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            session_cookie: config.session_cookie.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Scraper for ScraperImpl {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        info!("Fetching: {}", url);

        let mut request = self.client.get(url);
        if let Some(session) = &self.session_cookie {
            request = request.header(COOKIE, format!("ASP.NET_SessionId={}", session));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ScraperError::InvalidResponse {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
