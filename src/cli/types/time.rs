//! Season and scoring-week types.

use crate::error::{LakeError, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for Season years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Season(pub u16);

impl Season {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    pub fn as_i32(&self) -> i32 {
        i32::from(self.0)
    }

    /// NFL season a calendar date belongs to.
    ///
    /// The season opens on the Thursday after Labor Day (first Monday of
    /// September); anything earlier belongs to the previous year's season.
    pub fn for_date(date: NaiveDate) -> Self {
        let year = date.year();
        match season_kickoff(year) {
            Some(kickoff) if date >= kickoff => Self(year as u16),
            _ => Self((year - 1) as u16),
        }
    }
}

/// Thursday after the first Monday of September.
pub fn season_kickoff(year: i32) -> Option<NaiveDate> {
    let labor_day = NaiveDate::from_weekday_of_month_opt(year, 9, Weekday::Mon, 1)?;
    labor_day.checked_add_days(Days::new(3))
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Season {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Sleeper scoring week ("leg").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Leg(pub u16);

impl Leg {
    pub fn new(leg: u16) -> Self {
        Self(leg)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Leg {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Leg {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}
