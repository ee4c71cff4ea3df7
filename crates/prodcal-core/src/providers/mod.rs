//! Rules providers.
//!
//! | Provider | I/O | Fails |
//! |----------|-----|-------|
//! | [`FeedRulesProvider`] | one concurrent fetch batch | when the batch or a decode fails |
//! | [`OfflineWeekendProvider`] | none | never |

mod offline;
mod remote;

use std::future::Future;
use std::pin::Pin;

pub use offline::{OfflineWeekendProvider, OFFLINE_EPOCH, OFFLINE_HORIZON_YEARS};
pub use remote::{FeedRulesProvider, DEFAULT_FEED_URL, DEFAULT_START_YEAR};

use crate::{CalendarError, Rules};

/// Future returned by [`RulesProvider::load_rules`].
pub type RulesFuture<'a> = Pin<Box<dyn Future<Output = Result<Rules, CalendarError>> + Send + 'a>>;

/// Source of a complete [`Rules`] set.
///
/// Implementations must be `Send + Sync` so a chain can be driven from any
/// task.
pub trait RulesProvider: Send + Sync {
    /// Short identifier used in logs and aggregate errors.
    fn name(&self) -> &str;

    /// Whether this provider only synthesizes weekends without real data.
    fn is_offline(&self) -> bool {
        false
    }

    /// Produce rules.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::SourceUnavailable`] when the source cannot
    /// produce data.
    fn load_rules(&self) -> RulesFuture<'_>;
}
