use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Classification of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// No rule known; resolved through the weekly rest pattern.
    Unknown,
    /// Ordinary workday.
    Regular,
    /// Ordinary weekend day.
    RegularRest,
    Holiday,
    /// Shortened workday before a holiday.
    PreHoliday,
}

impl DayType {
    pub const ALL: [Self; 5] = [
        Self::Unknown,
        Self::Regular,
        Self::RegularRest,
        Self::Holiday,
        Self::PreHoliday,
    ];

    /// Days on which work happens, shortened or not.
    pub const WORK: [Self; 2] = [Self::Regular, Self::PreHoliday];

    /// Days off, whether a holiday or an ordinary weekend.
    pub const FREE: [Self; 2] = [Self::Holiday, Self::RegularRest];

    /// Stable numeric code used by the raw query API.
    pub const fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Regular => 1,
            Self::RegularRest => 2,
            Self::Holiday => 3,
            Self::PreHoliday => 4,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Regular),
            2 => Some(Self::RegularRest),
            3 => Some(Self::Holiday),
            4 => Some(Self::PreHoliday),
            _ => None,
        }
    }

    pub const fn is_work(self) -> bool {
        matches!(self, Self::Regular | Self::PreHoliday)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Regular => "regular",
            Self::RegularRest => "regular_rest",
            Self::Holiday => "holiday",
            Self::PreHoliday => "pre_holiday",
        }
    }
}

impl Display for DayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
