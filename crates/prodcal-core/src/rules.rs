//! In-memory day classification rules.
//!
//! [`Rules`] holds explicit per-date overrides plus the weekly rest pattern.
//! Providers build it once; a [`Calendar`](crate::Calendar) then owns it
//! read-only.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::DayType;

/// Saturday and Sunday as ISO weekday numbers.
pub const STANDARD_WEEK_REST_DAYS: [u8; 2] = [6, 7];

/// Calendar date key of an explicit rule. Not validated as a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl DayKey {
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

/// Explicit per-date classifications and the default weekly rest days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RulesSnapshot", into = "RulesSnapshot")]
pub struct Rules {
    explicit_days: BTreeMap<DayKey, DayType>,
    week_rest_days: BTreeSet<u8>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the classification of one date.
    ///
    /// `Unknown` is accepted and behaves like a missing entry on lookup.
    pub fn add_day(&mut self, year: i32, month: u8, day: u8, day_type: DayType) {
        self.explicit_days
            .insert(DayKey::new(year, month, day), day_type);
    }

    /// Stored classification, or `Unknown` when the date has no entry.
    pub fn day(&self, year: i32, month: u8, day: u8) -> DayType {
        self.explicit_days
            .get(&DayKey::new(year, month, day))
            .copied()
            .unwrap_or(DayType::Unknown)
    }

    /// Replace the set of ISO weekday numbers (1 = Monday .. 7 = Sunday)
    /// treated as rest days by default.
    pub fn set_week_rest_days<I>(&mut self, weekdays: I)
    where
        I: IntoIterator<Item = u8>,
    {
        self.week_rest_days = weekdays.into_iter().collect();
    }

    pub fn week_rest_days(&self) -> &BTreeSet<u8> {
        &self.week_rest_days
    }

    pub fn is_week_rest_day(&self, iso_weekday: u8) -> bool {
        self.week_rest_days.contains(&iso_weekday)
    }

    /// Explicit entries in chronological order.
    pub fn explicit_days(&self) -> impl Iterator<Item = (DayKey, DayType)> + '_ {
        self.explicit_days.iter().map(|(key, value)| (*key, *value))
    }

    pub fn len(&self) -> usize {
        self.explicit_days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit_days.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct RulesSnapshot {
    days: Vec<DayEntry>,
    week_rest_days: BTreeSet<u8>,
}

#[derive(Serialize, Deserialize)]
struct DayEntry {
    #[serde(flatten)]
    key: DayKey,
    day_type: DayType,
}

impl From<RulesSnapshot> for Rules {
    fn from(snapshot: RulesSnapshot) -> Self {
        Self {
            explicit_days: snapshot
                .days
                .into_iter()
                .map(|entry| (entry.key, entry.day_type))
                .collect(),
            week_rest_days: snapshot.week_rest_days,
        }
    }
}

impl From<Rules> for RulesSnapshot {
    fn from(rules: Rules) -> Self {
        Self {
            days: rules
                .explicit_days
                .into_iter()
                .map(|(key, day_type)| DayEntry { key, day_type })
                .collect(),
            week_rest_days: rules.week_rest_days,
        }
    }
}
