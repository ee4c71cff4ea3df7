use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{RulesFuture, RulesProvider};
use crate::feed::{day_type_for_code, FeedDecoder, XmlCalendarDecoder};
use crate::fetcher::ConcurrentFetcher;
use crate::rules::STANDARD_WEEK_REST_DAYS;
use crate::{CalendarError, FetchOptions, Rules};

/// Yearly document URL; `{year}` is replaced with the four-digit year.
pub const DEFAULT_FEED_URL: &str = "http://xmlcalendar.ru/data/ru/{year}/calendar.xml";

/// First year published by the default feed.
pub const DEFAULT_START_YEAR: i32 = 2013;

/// Rules assembled from one feed document per year.
///
/// All years are requested in a single concurrent batch. Years whose request
/// failed while others succeeded are left without explicit rules; a document
/// that arrives but cannot be decoded fails the whole provider.
#[derive(Clone)]
pub struct FeedRulesProvider {
    fetcher: ConcurrentFetcher,
    decoder: Arc<dyn FeedDecoder>,
    url_template: String,
    start_year: i32,
    end_year: Option<i32>,
}

impl FeedRulesProvider {
    pub fn new(fetcher: ConcurrentFetcher) -> Self {
        Self {
            fetcher,
            decoder: Arc::new(XmlCalendarDecoder),
            url_template: String::from(DEFAULT_FEED_URL),
            start_year: DEFAULT_START_YEAR,
            end_year: None,
        }
    }

    /// Provider over the default feed using a reqwest transport.
    pub fn with_options(options: FetchOptions) -> Self {
        Self::new(ConcurrentFetcher::with_reqwest(options))
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    /// Last year to request. Defaults to the current UTC year.
    pub fn with_end_year(mut self, year: i32) -> Self {
        self.end_year = Some(year);
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn FeedDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// URLs of every requested year, oldest first.
    pub fn urls(&self) -> Vec<String> {
        let end_year = self
            .end_year
            .unwrap_or_else(|| OffsetDateTime::now_utc().year());
        (self.start_year..=end_year)
            .map(|year| self.url_template.replace("{year}", &year.to_string()))
            .collect()
    }

    async fn fetch_rules(&self) -> Result<Rules, CalendarError> {
        let urls = self.urls();
        let requested = urls.len();
        let documents = self
            .fetcher
            .query(urls)
            .await
            .map_err(|error| CalendarError::source_unavailable(self.name(), error))?;

        if documents.len() < requested {
            warn!(
                requested,
                received = documents.len(),
                "feed is missing some years, they fall back to weekday defaults"
            );
        }

        let mut rules = Rules::new();
        for (url, body) in &documents {
            let document = self
                .decoder
                .decode(body)
                .map_err(|error| CalendarError::source_unavailable(self.name(), error))?;
            debug!(
                url = url.as_str(),
                year = document.year,
                days = document.days.len(),
                "decoded feed document"
            );

            for entry in document.days {
                rules.add_day(
                    document.year,
                    entry.month,
                    entry.day,
                    day_type_for_code(&entry.code),
                );
            }
        }

        rules.set_week_rest_days(STANDARD_WEEK_REST_DAYS);
        Ok(rules)
    }
}

impl RulesProvider for FeedRulesProvider {
    fn name(&self) -> &str {
        "xml_feed"
    }

    fn load_rules(&self) -> RulesFuture<'_> {
        Box::pin(self.fetch_rules())
    }
}
