use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EventError;

pub const HOLIDAY_EVENT_TYPE: &str = "holiday";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    University,
    Holiday,
}

/// An all-day event covering `start_date..=end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub semester: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_type: String,
    pub source: EventSource,
}

impl CalendarEvent {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        event_type: impl Into<String>,
        source: EventSource,
    ) -> Result<Self, EventError> {
        let title = title.into();
        if end_date < start_date {
            return Err(EventError::InvertedRange {
                title,
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            id,
            title,
            semester: None,
            start_date,
            end_date,
            event_type: event_type.into(),
            source,
        })
    }

    #[must_use]
    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn is_single_day(&self) -> bool {
        self.start_date == self.end_date
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.start_date <= last && first <= self.end_date
    }

    /// Human readable range, e.g. `January 05` or `January 05 - 09`.
    pub fn range_label(&self) -> String {
        let start = self.start_date.format("%B %d");
        if self.is_single_day() {
            return start.to_string();
        }

        let same_month = self.start_date.year() == self.end_date.year()
            && self.start_date.month() == self.end_date.month();

        if same_month {
            format!("{start} - {}", self.end_date.format("%d"))
        } else {
            format!("{start} - {}", self.end_date.format("%B %d"))
        }
    }
}

/// A holiday recurring every year on the same month and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: i64,
    pub title: String,
    pub month: u32,
    pub day: u32,
}

impl Holiday {
    pub fn new(id: i64, title: impl Into<String>, month: u32, day: u32) -> Self {
        Self {
            id,
            title: title.into(),
            month,
            day,
        }
    }

    /// Pins the holiday to a concrete single-day event in `year`.
    pub fn materialize(&self, year: i32) -> Result<CalendarEvent, EventError> {
        let date = NaiveDate::from_ymd_opt(year, self.month, self.day).ok_or_else(|| {
            EventError::NonexistentHolidayDate {
                title: self.title.clone(),
                year,
                month: self.month,
                day: self.day,
            }
        })?;

        CalendarEvent::new(
            self.id,
            self.title.clone(),
            date,
            date,
            HOLIDAY_EVENT_TYPE,
            EventSource::Holiday,
        )
    }
}
