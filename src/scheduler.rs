// Bounded worker pool fetching per-restaurant detail pages
use crate::model::{DetailError, Restaurant};
use crate::normalizer::apply_detail;
use crate::parser::PageParser;
use crate::scraper::Scraper;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};

pub const DEFAULT_WORKERS: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub scheduled: usize,
    pub fetched: usize,
    pub failed: usize,
    /// Workers that quit early because of an error.
    pub stopped_workers: usize,
}

impl FetchSummary {
    /// Queued restaurants nobody got to.
    pub fn unprocessed(&self) -> usize {
        self.scheduled - self.fetched - self.failed
    }
}

#[derive(Debug, Default)]
struct WorkerOutcome {
    fetched: usize,
    failed: usize,
    stopped: bool,
}

pub struct DetailScheduler {
    scraper: Arc<dyn Scraper>,
    parser: Arc<dyn PageParser>,
    workers: usize,
    stop_worker_on_error: bool,
}

impl DetailScheduler {
    pub fn new(scraper: Arc<dyn Scraper>, parser: Arc<dyn PageParser>) -> Self {
        Self {
            scraper,
            parser,
            workers: DEFAULT_WORKERS,
            stop_worker_on_error: true,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn stop_worker_on_error(mut self, stop: bool) -> Self {
        self.stop_worker_on_error = stop;
        self
    }

    /// Fetches details for every restaurant that has none yet, or for all of
    /// them when `force_refetch` is set. Returns once every worker has exited.
    ///
    /// Each queued `&mut Restaurant` is handed to exactly one worker, which
    /// writes the parsed page straight onto it. Errors never propagate; with
    /// `stop_worker_on_error` the failing worker stops consuming the queue.
    pub async fn run<'a, I>(&self, restaurants: I, force_refetch: bool) -> FetchSummary
    where
        I: IntoIterator<Item = &'a mut Restaurant>,
    {
        let (tx, rx) = mpsc::channel::<&'a mut Restaurant>(self.workers);
        let queue = Mutex::new(rx);
        let active = AtomicUsize::new(self.workers);

        let producer = async move {
            let mut scheduled = 0;
            for restaurant in restaurants {
                if restaurant.has_details() && !force_refetch {
                    continue;
                }
                if tx.send(restaurant).await.is_err() {
                    warn!("All detail workers stopped; {} restaurants left unqueued", scheduled);
                    break;
                }
                scheduled += 1;
            }
            scheduled
        };

        let pool = join_all((0..self.workers).map(|id| self.worker(id, &queue, &active)));
        let (scheduled, outcomes) = tokio::join!(producer, pool);

        let mut summary = FetchSummary {
            scheduled,
            ..FetchSummary::default()
        };
        for outcome in outcomes {
            summary.fetched += outcome.fetched;
            summary.failed += outcome.failed;
            summary.stopped_workers += outcome.stopped as usize;
        }

        info!(
            "Detail fetch: {} scheduled, {} fetched, {} failed, {} unprocessed, {}/{} workers stopped",
            summary.scheduled,
            summary.fetched,
            summary.failed,
            summary.unprocessed(),
            summary.stopped_workers,
            self.workers
        );
        summary
    }

    async fn worker<'a>(
        &self,
        id: usize,
        queue: &Mutex<mpsc::Receiver<&'a mut Restaurant>>,
        active: &AtomicUsize,
    ) -> WorkerOutcome {
        let mut outcome = WorkerOutcome::default();

        loop {
            let next = queue.lock().await.recv().await;
            let Some(restaurant) = next else { break };

            match self.fetch_detail(restaurant).await {
                Ok(()) => outcome.fetched += 1,
                Err(e) => {
                    outcome.failed += 1;
                    error!("worker {}: {} ({}): {}", id, restaurant.name, restaurant.detail_url, e);
                    if self.stop_worker_on_error {
                        warn!("worker {} stopping after error", id);
                        outcome.stopped = true;
                        break;
                    }
                }
            }
        }

        // The last worker out closes the queue so the producer cannot block on it.
        if active.fetch_sub(1, Ordering::SeqCst) == 1 {
            queue.lock().await.close();
        }
        outcome
    }

    async fn fetch_detail(&self, restaurant: &mut Restaurant) -> Result<(), DetailError> {
        let html = self.scraper.fetch(&restaurant.detail_url).await?;
        let page = self.parser.parse_detail(&html)?;
        apply_detail(restaurant, page);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParserError, ScraperError};
    use crate::parser::{DetailPage, InspectionRow, ListingRow};
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    /// Serves `<url>` back as the page body; URLs in `failing` error out.
    #[derive(Default)]
    struct StubScraper {
        failing: HashSet<String>,
        calls: StdMutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Scraper for StubScraper {
        async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            self.calls.lock().unwrap().push(url.to_string());
            tokio::task::yield_now().await;
            if self.failing.contains(url) {
                return Err(ScraperError::Other(format!("boom: {}", url)));
            }
            Ok(url.to_string())
        }
    }

    /// Every page holds one inspection whose number is the page body.
    struct EchoParser;

    impl PageParser for EchoParser {
        fn parse_listing(&self, _html: &str) -> Result<Vec<ListingRow>, ParserError> {
            Ok(Vec::new())
        }

        fn parse_detail(&self, html: &str) -> Result<DetailPage, ParserError> {
            if html.contains("unparseable") {
                return Err(ParserError::MissingField("inspections".into()));
            }
            Ok(DetailPage {
                outstanding_critical: Some("1".into()),
                outstanding_noncritical: None,
                inspections: vec![InspectionRow {
                    date: "01-Jan-2024".into(),
                    number: html.to_string(),
                    critical: "1".into(),
                    noncritical: "0".into(),
                    ..InspectionRow::default()
                }],
            })
        }
    }

    fn restaurants(n: usize) -> Vec<Restaurant> {
        (0..n)
            .map(|i| Restaurant {
                id: format!("r{}", i),
                name: format!("R{}", i),
                detail_url: format!("https://example.org/d/{}", i),
                ..Restaurant::default()
            })
            .collect()
    }

    fn scheduler(scraper: Arc<StubScraper>, workers: usize) -> DetailScheduler {
        DetailScheduler::new(scraper, Arc::new(EchoParser)).with_workers(workers)
    }

    #[tokio::test]
    async fn fetches_every_empty_record_once() {
        let scraper = Arc::new(StubScraper::default());
        let mut rs = restaurants(40);

        let summary = scheduler(scraper.clone(), 16).run(rs.iter_mut(), false).await;

        assert_eq!(summary.scheduled, 40);
        assert_eq!(summary.fetched, 40);
        assert_eq!(summary.failed, 0);
        for r in &rs {
            assert_eq!(r.inspections.len(), 1);
            assert_eq!(r.inspections[0].identifier, r.detail_url);
            assert_eq!(r.outstanding_critical, 1);
        }
        let calls = scraper.calls.lock().unwrap();
        assert_eq!(calls.iter().collect::<HashSet<_>>().len(), 40);
    }

    #[tokio::test]
    async fn second_run_without_force_issues_no_fetches() {
        let scraper = Arc::new(StubScraper::default());
        let mut rs = restaurants(10);
        let scheduler = scheduler(scraper.clone(), 4);

        scheduler.run(rs.iter_mut(), false).await;
        let first = scraper.calls.lock().unwrap().len();
        let summary = scheduler.run(rs.iter_mut(), false).await;

        assert_eq!(first, 10);
        assert_eq!(summary.scheduled, 0);
        assert_eq!(scraper.calls.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn force_refetch_fetches_populated_records() {
        let scraper = Arc::new(StubScraper::default());
        let mut rs = restaurants(3);
        let scheduler = scheduler(scraper.clone(), 2);

        scheduler.run(rs.iter_mut(), false).await;
        let summary = scheduler.run(rs.iter_mut(), true).await;

        assert_eq!(summary.fetched, 3);
        assert_eq!(scraper.calls.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn failing_worker_stops_and_record_stays_empty() {
        let mut failing = HashSet::new();
        failing.insert("https://example.org/d/0".to_string());
        let scraper = Arc::new(StubScraper { failing, ..StubScraper::default() });
        let mut rs = restaurants(6);

        let summary = scheduler(scraper, 2).run(rs.iter_mut(), false).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.stopped_workers, 1);
        assert_eq!(summary.fetched, 5);
        assert!(rs[0].inspections.is_empty());
        assert!(rs[1..].iter().all(|r| r.has_details()));
    }

    #[tokio::test]
    async fn all_workers_stopping_does_not_hang_the_producer() {
        let failing = (0..20).map(|i| format!("https://example.org/d/{}", i)).collect();
        let scraper = Arc::new(StubScraper { failing, ..StubScraper::default() });
        let mut rs = restaurants(20);

        let summary = scheduler(scraper.clone(), 2).run(rs.iter_mut(), false).await;

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.stopped_workers, 2);
        assert_eq!(scraper.calls.lock().unwrap().len(), 2);
        assert!(rs.iter().all(|r| r.inspections.is_empty()));
    }

    #[tokio::test]
    async fn continuing_policy_keeps_workers_alive() {
        let failing = ["https://example.org/d/1", "https://example.org/d/3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let scraper = Arc::new(StubScraper { failing, ..StubScraper::default() });
        let mut rs = restaurants(8);

        let summary = scheduler(scraper, 1)
            .stop_worker_on_error(false)
            .run(rs.iter_mut(), false)
            .await;

        assert_eq!(summary.fetched, 6);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.stopped_workers, 0);
        assert_eq!(summary.unprocessed(), 0);
    }

    #[tokio::test]
    async fn parse_error_counts_as_failure() {
        let scraper = Arc::new(StubScraper::default());
        let mut rs = restaurants(1);
        rs[0].detail_url = "https://example.org/unparseable".into();

        let summary = scheduler(scraper, 1).run(rs.iter_mut(), false).await;

        assert_eq!(summary.failed, 1);
        assert!(rs[0].inspections.is_empty());
    }
}
