use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ParseError;

/// Academic year spanning two consecutive calendar years, written `YYYY-YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchoolYear {
    start: i32,
}

impl SchoolYear {
    pub fn new(start_year: i32) -> Self {
        Self { start: start_year }
    }

    /// The school year that began in the calendar year before `today`.
    pub fn default_for(today: NaiveDate) -> Self {
        Self::new(today.year() - 1)
    }

    pub fn current() -> Self {
        Self::default_for(Utc::now().date_naive())
    }

    /// Calendar year holidays are pinned to.
    pub fn start_year(&self) -> i32 {
        self.start
    }

    pub fn end_year(&self) -> i32 {
        self.start + 1
    }
}

impl fmt::Display for SchoolYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:04}", self.start, self.end_year())
    }
}

impl FromStr for SchoolYear {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::SchoolYear(s.to_string());

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = parse_year(start).ok_or_else(invalid)?;
        let end = parse_year(end).ok_or_else(invalid)?;

        if end != start + 1 {
            return Err(invalid());
        }

        Ok(Self::new(start))
    }
}

impl Serialize for SchoolYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn succ(&self) -> Self {
        match self.month {
            12 => Self {
                year: self.year + 1,
                month: 1,
            },
            month => Self {
                year: self.year,
                month: month + 1,
            },
        }
    }

    pub fn pred(&self) -> Self {
        match self.month {
            1 => Self {
                year: self.year - 1,
                month: 12,
            },
            month => Self {
                year: self.year,
                month: month - 1,
            },
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::Month(s.to_string());

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = parse_year(year).ok_or_else(invalid)?;
        if month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let month = month.parse::<u32>().map_err(|_| invalid())?;

        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Query parameters as they arrive over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCalendarQuery {
    pub school_year: Option<String>,
    pub semester: Option<String>,
    pub event_type: Option<String>,
}

/// Validated filter for the event aggregator. Semester and event type match
/// exactly when present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalendarQuery {
    pub school_year: SchoolYear,
    pub semester: Option<String>,
    pub event_type: Option<String>,
}

impl CalendarQuery {
    pub fn new(school_year: SchoolYear) -> Self {
        Self {
            school_year,
            semester: None,
            event_type: None,
        }
    }

    #[must_use]
    pub fn semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    #[must_use]
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Validates raw parameters, falling back to the school year derived from
    /// `today` when none is given. Empty values count as absent.
    pub fn from_raw(raw: RawCalendarQuery, today: NaiveDate) -> Result<Self, ParseError> {
        let school_year = match non_empty(raw.school_year) {
            Some(school_year) => school_year.parse()?,
            None => SchoolYear::default_for(today),
        };

        Ok(Self {
            school_year,
            semester: non_empty(raw.semester),
            event_type: non_empty(raw.event_type),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
