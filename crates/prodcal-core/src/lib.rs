//! # Prodcal Core
//!
//! Production calendar: classifies days as workdays, regular weekends,
//! holidays or pre-holidays and answers range queries over them.
//!
//! ## Overview
//!
//! - **Rules** hold explicit per-date classifications and the weekly rest days
//! - **Calendar** resolves a day's type and walks date ranges
//! - **Providers** produce rules from the yearly feed or offline
//! - **Provider chain** picks the first provider that succeeds
//! - **Concurrent fetcher** downloads all yearly documents in one batch
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`builder`] | Default chain assembly and environment configuration |
//! | [`calendar`] | Day classification and range queries |
//! | [`chain`] | Ordered provider fallback |
//! | [`day_type`] | Day classification enum |
//! | [`error`] | Error types |
//! | [`feed`] | Feed document decoding |
//! | [`fetcher`] | Concurrent multi-URL fetching |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`providers`] | Rules providers (feed, offline weekends) |
//! | [`rules`] | Rules data model |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ CalendarBuilder │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Provider Chain  │────▶│ Offline Weekends │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Feed Provider   │────▶│ Concurrent       │
//! │ (XML decoder)   │     │ Fetcher (tokio)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Rules → Calendar│
//! └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prodcal_core::{CalendarBuilder, DayType};
//! use time::macros::date;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prodcal_core::CalendarError> {
//!     let calendar = CalendarBuilder::new().with_env_overrides().build().await?;
//!
//!     let workdays = calendar.work_days_count(date!(2024 - 04 - 29), date!(2024 - 05 - 05));
//!     println!("workdays: {workdays}, offline: {}", calendar.is_offline_derived());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Construction only ever surfaces [`CalendarError::AllProvidersFailed`];
//! individual provider failures are retried against the next provider.
//!
//! ```rust
//! use prodcal_core::CalendarError;
//!
//! fn report(error: &CalendarError) -> String {
//!     match error {
//!         CalendarError::AllProvidersFailed { failures } => {
//!             format!("{} providers failed", failures.len())
//!         }
//!         other => other.to_string(),
//!     }
//! }
//! ```

pub mod builder;
pub mod calendar;
pub mod chain;
pub mod day_type;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod http_client;
pub mod providers;
pub mod rules;

pub use builder::CalendarBuilder;
pub use calendar::{Calendar, CalendarDate};
pub use day_type::DayType;
pub use error::{CalendarError, DecodeError, FetchError, ProviderFailure, SourceCause};
pub use feed::{FeedDay, FeedDecoder, FeedDocument, XmlCalendarDecoder};
pub use fetcher::{ConcurrentFetcher, FetchOptions, FetchResults};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
    StaticHttpClient,
};
pub use providers::{FeedRulesProvider, OfflineWeekendProvider, RulesFuture, RulesProvider};
pub use rules::{DayKey, Rules};
