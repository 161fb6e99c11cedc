// Load -> listing -> geocode -> filter -> fetch details -> stats -> save -> report
use crate::analyzer::{compute_infraction_stats, rank_by_recent_infractions, select_subset, select_subset_mut};
use crate::config::AppConfig;
use crate::geocode::{Geocoder, geocode_restaurants};
use crate::model::{PipelineError, Store};
use crate::normalizer::{merge_by_id, restaurants_from_listing};
use crate::parser::PageParser;
use crate::report::render_markdown;
use crate::scheduler::{DetailScheduler, FetchSummary};
use crate::scraper::Scraper;
use crate::storage::JsonStorage;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: String,
    pub fetch: FetchSummary,
}

pub struct Pipeline {
    config: AppConfig,
    scraper: Arc<dyn Scraper>,
    parser: Arc<dyn PageParser>,
    geocoder: Arc<dyn Geocoder>,
    storage: JsonStorage,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        scraper: Arc<dyn Scraper>,
        parser: Arc<dyn PageParser>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let storage = JsonStorage::new(&config.store_path);
        Self {
            config,
            scraper,
            parser,
            geocoder,
            storage,
        }
    }

    /// Runs one full pass. The store is saved whatever happens after it
    /// loaded; a save failure is logged and never replaces the run's result.
    pub async fn run(&self, force_refetch: bool, as_of: NaiveDate) -> Result<RunOutcome, PipelineError> {
        let mut store = self.storage.load()?;

        let result = self.process(&mut store, force_refetch, as_of).await;

        if let Err(e) = self.storage.save(&store) {
            error!("Failed to save store to {}: {}", self.storage.path().display(), e);
        }
        result
    }

    async fn process(
        &self,
        store: &mut Store,
        force_refetch: bool,
        as_of: NaiveDate,
    ) -> Result<RunOutcome, PipelineError> {
        if store.restaurants.is_empty() || force_refetch {
            self.refresh_listing(store).await?;
        }

        geocode_restaurants(
            &mut store.restaurants,
            &mut store.geocode_cache,
            self.geocoder.as_ref(),
            &self.config.geocode_communities,
        )
        .await?;

        let border = self.config.border_longitude;
        let selected = select_subset_mut(&mut store.restaurants, border);
        info!("{} restaurants west of {}", selected.len(), border);

        let scheduler = DetailScheduler::new(self.scraper.clone(), self.parser.clone())
            .with_workers(self.config.workers)
            .stop_worker_on_error(self.config.stop_worker_on_error);
        let fetch = scheduler.run(selected, force_refetch).await;

        compute_infraction_stats(&mut store.restaurants, as_of)?;

        let mut ranked = select_subset(&store.restaurants, border);
        rank_by_recent_infractions(&mut ranked);

        Ok(RunOutcome {
            report: render_markdown(&ranked),
            fetch,
        })
    }

    async fn refresh_listing(&self, store: &mut Store) -> Result<(), PipelineError> {
        let url = &self.config.listing_url;
        let html = self.scraper.fetch(url).await?;
        let rows = self.parser.parse_listing(&html)?;
        info!("Listing returned {} restaurants", rows.len());

        let fresh = restaurants_from_listing(rows, url);
        let previous = std::mem::take(&mut store.restaurants);
        store.restaurants = merge_by_id(previous, fresh);
        Ok(())
    }
}
