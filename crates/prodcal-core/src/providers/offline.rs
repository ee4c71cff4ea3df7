use time::macros::date;
use time::{Date, OffsetDateTime};

use super::{RulesFuture, RulesProvider};
use crate::rules::STANDARD_WEEK_REST_DAYS;
use crate::{DayType, Rules};

/// First day covered by the offline fallback.
pub const OFFLINE_EPOCH: Date = date!(2000 - 01 - 01);

/// How far past its reference date the fallback generates weekends.
pub const OFFLINE_HORIZON_YEARS: i32 = 5;

/// Weekend-only rules computed without any I/O.
///
/// Every Saturday and Sunday from [`OFFLINE_EPOCH`] through five years past
/// the reference date is recorded as [`DayType::RegularRest`].
#[derive(Debug, Clone, Copy)]
pub struct OfflineWeekendProvider {
    reference_date: Date,
}

impl OfflineWeekendProvider {
    /// Provider whose horizon is anchored at today's UTC date.
    pub fn new() -> Self {
        Self::with_reference_date(OffsetDateTime::now_utc().date())
    }

    pub const fn with_reference_date(reference_date: Date) -> Self {
        Self { reference_date }
    }

    /// Last day with a generated entry.
    pub fn horizon_end(&self) -> Date {
        let year = self.reference_date.year() + OFFLINE_HORIZON_YEARS;
        let month = self.reference_date.month();
        Date::from_calendar_date(year, month, self.reference_date.day())
            .or_else(|_| Date::from_calendar_date(year, month, 28))
            .unwrap_or(Date::MAX)
    }

    pub fn generate(&self) -> Rules {
        let mut rules = Rules::new();
        let end = self.horizon_end();
        let mut current = OFFLINE_EPOCH;

        while current <= end {
            if STANDARD_WEEK_REST_DAYS.contains(&current.weekday().number_from_monday()) {
                rules.add_day(
                    current.year(),
                    u8::from(current.month()),
                    current.day(),
                    DayType::RegularRest,
                );
            }
            match current.next_day() {
                Some(next) => current = next,
                None => break,
            }
        }

        rules.set_week_rest_days(STANDARD_WEEK_REST_DAYS);
        rules
    }
}

impl Default for OfflineWeekendProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesProvider for OfflineWeekendProvider {
    fn name(&self) -> &str {
        "offline_weekends"
    }

    fn is_offline(&self) -> bool {
        true
    }

    fn load_rules(&self) -> RulesFuture<'_> {
        Box::pin(async move { Ok(self.generate()) })
    }
}
