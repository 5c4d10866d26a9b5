use crate::cache::RatingCache;
use crate::error::Result;
use crate::result::{LookupOutcome, RatingRecord};
use crate::search::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, ServiceSearch, TosdrClient, record_from_service};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_DELAY_MS: u64 = 300;

/// Knobs for talking to the rating service.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Pause after every cache miss.
    pub delay: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

/// Cached, rate-limited rating lookups over any [`ServiceSearch`].
pub struct RatingClient<S> {
    search: S,
    delay: Duration,
}

impl RatingClient<TosdrClient> {
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        let search = TosdrClient::with_endpoint(config.endpoint.clone(), config.timeout)?;
        Ok(Self::new(search).with_delay(config.delay))
    }
}

impl<S: ServiceSearch> RatingClient<S> {
    pub fn new(search: S) -> Self {
        Self {
            search,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    /// Ask the search endpoint about `domain`, keeping "no match" and
    /// "request failed" apart.
    pub async fn query(&self, domain: &str) -> LookupOutcome {
        match self.search.search(domain).await {
            Ok(response) => match response.best_match(domain) {
                Some(service) => LookupOutcome::Found(record_from_service(domain, service)),
                None => LookupOutcome::NoMatch,
            },
            Err(e) => LookupOutcome::Failed(e),
        }
    }

    /// Rating for `domain`. Never fails: a cache hit returns immediately
    /// with no request and no delay, anything else is queried, cached
    /// (even when `Unknown`), persisted and followed by the rate-limit pause.
    pub async fn lookup(&self, cache: &mut RatingCache, domain: &str) -> RatingRecord {
        if let Some(record) = cache.get(domain) {
            debug!("Cache hit for {}", domain);
            return record;
        }

        let outcome = self.query(domain).await;
        match &outcome {
            LookupOutcome::Found(record) => {
                info!("{} rated {} ({})", domain, record.grade, record.name)
            }
            LookupOutcome::NoMatch => info!("No ToS;DR service matched {}", domain),
            LookupOutcome::Failed(e) => warn!("Lookup for {} failed: {}", domain, e),
        }
        let record = outcome.into_record(domain);

        cache.insert(&record);
        if let Err(e) = cache.save() {
            warn!("Could not persist rating cache {}: {}", cache.path().display(), e);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        record
    }
}
