use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::feed::FeedDecoder;
use crate::fetcher::{ConcurrentFetcher, FetchOptions};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::providers::{
    FeedRulesProvider, OfflineWeekendProvider, RulesProvider, DEFAULT_FEED_URL, DEFAULT_START_YEAR,
};
use crate::{Calendar, CalendarError};

/// Builder assembling the default provider chain: the yearly feed first,
/// then the offline weekend fallback.
///
/// # Environment Variables
///
/// | Variable | Effect |
/// |----------|--------|
/// | `PRODCAL_FEED_URL` | Feed URL template containing `{year}` |
/// | `PRODCAL_START_YEAR` | First year requested from the feed |
/// | `PRODCAL_TIMEOUT_SECS` | Per-request timeout |
/// | `PRODCAL_CONNECT_TIMEOUT_SECS` | Per-request connect timeout |
/// | `PRODCAL_FAIL_ON_STATUS` | `true`/`false`, reject non-2xx responses |
/// | `PRODCAL_OFFLINE_FALLBACK` | `true`/`false`, append the offline fallback |
///
/// # Example
///
/// ```rust,ignore
/// use prodcal_core::CalendarBuilder;
///
/// let calendar = CalendarBuilder::new()
///     .with_env_overrides()
///     .build()
///     .await?;
/// println!("offline: {}", calendar.is_offline_derived());
/// ```
pub struct CalendarBuilder {
    feed_url: String,
    start_year: i32,
    end_year: Option<i32>,
    options: FetchOptions,
    offline_fallback: bool,
    http_client: Option<Arc<dyn HttpClient>>,
    decoder: Option<Arc<dyn FeedDecoder>>,
}

impl Default for CalendarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarBuilder {
    pub fn new() -> Self {
        Self {
            feed_url: String::from(DEFAULT_FEED_URL),
            start_year: DEFAULT_START_YEAR,
            end_year: None,
            options: FetchOptions::default(),
            offline_fallback: true,
            http_client: None,
            decoder: None,
        }
    }

    /// Apply `PRODCAL_*` environment variables on top of the current settings.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("PRODCAL_FEED_URL") {
            self.feed_url = url;
        }
        if let Some(year) = env_value::<i32>("PRODCAL_START_YEAR") {
            self.start_year = year;
        }
        if let Some(seconds) = env_value::<u64>("PRODCAL_TIMEOUT_SECS") {
            self.options.timeout = Duration::from_secs(seconds);
        }
        if let Some(seconds) = env_value::<u64>("PRODCAL_CONNECT_TIMEOUT_SECS") {
            self.options.connect_timeout = Duration::from_secs(seconds);
        }
        if let Some(fail) = env_value::<bool>("PRODCAL_FAIL_ON_STATUS") {
            self.options.fail_on_non_success_status = fail;
        }
        if let Some(enabled) = env_value::<bool>("PRODCAL_OFFLINE_FALLBACK") {
            self.offline_fallback = enabled;
        }
        self
    }

    pub fn with_feed_url(mut self, template: impl Into<String>) -> Self {
        self.feed_url = template.into();
        self
    }

    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    pub fn with_end_year(mut self, year: i32) -> Self {
        self.end_year = Some(year);
        self
    }

    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable or disable the offline weekend fallback.
    pub fn with_offline_fallback(mut self, enabled: bool) -> Self {
        self.offline_fallback = enabled;
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn FeedDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn fetch_options(&self) -> FetchOptions {
        self.options
    }

    pub fn feed_provider(&self) -> FeedRulesProvider {
        let client = self
            .http_client
            .clone()
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new(&self.options)));
        let mut provider = FeedRulesProvider::new(ConcurrentFetcher::new(client, self.options))
            .with_url_template(self.feed_url.as_str())
            .with_start_year(self.start_year);
        if let Some(year) = self.end_year {
            provider = provider.with_end_year(year);
        }
        if let Some(decoder) = &self.decoder {
            provider = provider.with_decoder(Arc::clone(decoder));
        }
        provider
    }

    /// Run the chain and build the calendar.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::AllProvidersFailed`] if the feed fails and
    /// the offline fallback is disabled.
    pub async fn build(self) -> Result<Calendar, CalendarError> {
        let feed = self.feed_provider();
        let offline = OfflineWeekendProvider::new();
        let fallback: Vec<&dyn RulesProvider> = if self.offline_fallback {
            vec![&offline]
        } else {
            Vec::new()
        };
        Calendar::from_providers(&feed, &fallback).await
    }
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = raw.as_str(), "ignoring unparseable setting");
            None
        }
    }
}
