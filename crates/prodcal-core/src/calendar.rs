//! Day classification and range queries over a [`Rules`] set.
//!
//! Resolution is two-tier: an explicit rule for the date wins, otherwise the
//! weekday decides between [`DayType::RegularRest`] and [`DayType::Regular`].
//!
//! ```rust
//! use prodcal_core::{Calendar, DayType, Rules};
//! use time::macros::date;
//!
//! let mut rules = Rules::new();
//! rules.add_day(2024, 5, 1, DayType::Holiday);
//! rules.set_week_rest_days([6, 7]);
//!
//! let calendar = Calendar::new(rules);
//! assert_eq!(calendar.day_type(date!(2024 - 05 - 01)), DayType::Holiday);
//! assert_eq!(calendar.work_days_count(date!(2024 - 04 - 29), date!(2024 - 05 - 05)), 4);
//! ```

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

use crate::{CalendarError, DayType, Rules};

/// Anything that can be reduced to a calendar date.
///
/// Only the date part is used; no timezone conversion happens.
pub trait CalendarDate: Copy {
    fn calendar_date(self) -> Date;
}

impl CalendarDate for Date {
    fn calendar_date(self) -> Date {
        self
    }
}

impl CalendarDate for PrimitiveDateTime {
    fn calendar_date(self) -> Date {
        self.date()
    }
}

impl CalendarDate for OffsetDateTime {
    fn calendar_date(self) -> Date {
        self.date()
    }
}

/// Read-only query engine over one rules set.
#[derive(Debug, Clone)]
pub struct Calendar {
    rules: Rules,
    offline_derived: bool,
    provider: Option<String>,
}

impl Calendar {
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            offline_derived: false,
            provider: None,
        }
    }

    pub(crate) fn from_provider_rules(
        rules: Rules,
        provider: impl Into<String>,
        offline_derived: bool,
    ) -> Self {
        Self {
            rules,
            offline_derived,
            provider: Some(provider.into()),
        }
    }

    /// Whether the rules came from the weekend-only offline fallback.
    pub const fn is_offline_derived(&self) -> bool {
        self.offline_derived
    }

    /// Name of the provider that supplied the rules, if built from a chain.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn day_type<D: CalendarDate>(&self, day: D) -> DayType {
        let date = day.calendar_date();
        match self
            .rules
            .day(date.year(), u8::from(date.month()), date.day())
        {
            DayType::Unknown if self.is_regular_rest_day(date) => DayType::RegularRest,
            DayType::Unknown => DayType::Regular,
            explicit => explicit,
        }
    }

    pub fn is_day<D: CalendarDate>(&self, day: D, types: &[DayType]) -> bool {
        types.contains(&self.day_type(day))
    }

    /// Membership test against raw [`DayType::code`] values.
    ///
    /// # Errors
    ///
    /// With `validate_type` set, returns [`CalendarError::InvalidArgument`]
    /// if any code is not a known day type. Without it, unknown codes never
    /// match.
    pub fn is_day_code<D: CalendarDate>(
        &self,
        day: D,
        codes: &[u8],
        validate_type: bool,
    ) -> Result<bool, CalendarError> {
        if validate_type {
            if let Some(bad) = codes.iter().find(|code| DayType::from_code(**code).is_none()) {
                return Err(CalendarError::invalid_argument(format!(
                    "incorrect day type code {bad} in {codes:?}"
                )));
            }
        }
        Ok(codes.contains(&self.day_type(day).code()))
    }

    /// Holiday or regular weekend.
    pub fn is_free_day<D: CalendarDate>(&self, day: D) -> bool {
        self.is_day(day, &DayType::FREE)
    }

    /// Weekday-only check; explicit rules are ignored.
    pub fn is_regular_rest_day<D: CalendarDate>(&self, day: D) -> bool {
        self.rules
            .is_week_rest_day(day.calendar_date().weekday().number_from_monday())
    }

    /// Dates in `[from, to]` whose type is in `types`, ascending.
    ///
    /// Reversed bounds are accepted and swapped.
    pub fn days<D: CalendarDate>(&self, types: &[DayType], from: D, to: D) -> Vec<Date> {
        let (mut current, end) = {
            let from = from.calendar_date();
            let to = to.calendar_date();
            if from > to {
                (to, from)
            } else {
                (from, to)
            }
        };

        let mut days = Vec::new();
        loop {
            if self.is_day(current, types) {
                days.push(current);
            }
            match current.next_day() {
                Some(next) if next <= end => current = next,
                _ => break,
            }
        }
        days
    }

    pub fn days_count<D: CalendarDate>(&self, types: &[DayType], from: D, to: D) -> usize {
        self.days(types, from, to).len()
    }

    pub fn work_days_count<D: CalendarDate>(&self, from: D, to: D) -> usize {
        self.days_count(&DayType::WORK, from, to)
    }

    /// Matching dates of the given month.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidArgument`] if the year is outside the
    /// representable date range.
    pub fn month_days(
        &self,
        types: &[DayType],
        year: i32,
        month: Month,
    ) -> Result<Vec<Date>, CalendarError> {
        let first = Date::from_calendar_date(year, month, 1).map_err(|error| {
            CalendarError::invalid_argument(format!("cannot resolve {month} {year}: {error}"))
        })?;
        Ok(self.month_days_of(types, first))
    }

    /// Matching dates of the month containing `day`.
    pub fn month_days_of<D: CalendarDate>(&self, types: &[DayType], day: D) -> Vec<Date> {
        let (first, last) = month_bounds(day.calendar_date());
        self.days(types, first, last)
    }

    pub fn month_days_count(
        &self,
        types: &[DayType],
        year: i32,
        month: Month,
    ) -> Result<usize, CalendarError> {
        self.month_days(types, year, month).map(|days| days.len())
    }

    pub fn month_days_count_of<D: CalendarDate>(&self, types: &[DayType], day: D) -> usize {
        self.month_days_of(types, day).len()
    }

    pub fn month_work_days_count(&self, year: i32, month: Month) -> Result<usize, CalendarError> {
        self.month_days_count(&DayType::WORK, year, month)
    }

    pub fn month_work_days_count_of<D: CalendarDate>(&self, day: D) -> usize {
        self.month_days_count_of(&DayType::WORK, day)
    }
}

/// First and last date of the month containing `date`.
fn month_bounds(date: Date) -> (Date, Date) {
    let first = date.replace_day(1).unwrap_or(date);
    let mut last = date;
    while let Some(next) = last.next_day() {
        if next.month() != date.month() {
            break;
        }
        last = next;
    }
    (first, last)
}
